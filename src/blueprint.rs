//! Blueprints: declared constructor metadata for autowired types.
//!
//! Runtime reflection does not exist in Rust, so the container cannot walk a
//! constructor signature at resolution time. Instead, a type opts into
//! autowiring by implementing [`Injectable`]: its `parameters()` method is
//! the constructor signature the container matches arguments against, and
//! its `methods()` table lists the setters reachable through method-call
//! injection. Registering the type records a type-erased [`Blueprint`] under
//! the type path, which is what makes a definition's `class` "loadable".

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::value::ParamValue;

/// Type-erased shared service instance.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased owned service instance, mutable until caching.
pub(crate) type AnyBox = Box<dyn Any + Send + Sync>;

/// A type that the container can construct from resolved arguments.
///
/// Implementing this trait is what the container understands as "the class
/// exists and is loadable": `parameters()` declares the constructor
/// signature in positional order, `construct()` consumes the resolved
/// arguments, and `methods()` optionally exposes setters for
/// post-construction method-call injection.
///
/// # Examples
///
/// ```rust
/// use cinder_di::{Container, DiResult, Injectable, ParamSpec, ResolvedArgs};
/// use std::sync::Arc;
///
/// struct Connection {
///     dsn: String,
/// }
///
/// impl Injectable for Connection {
///     fn parameters() -> Vec<ParamSpec> {
///         vec![ParamSpec::value_or("dsn", "sqlite::memory:")]
///     }
///
///     fn construct(args: &mut ResolvedArgs) -> DiResult<Self> {
///         Ok(Connection { dsn: args.take_string()? })
///     }
/// }
///
/// struct Repository {
///     connection: Arc<Connection>,
/// }
///
/// impl Injectable for Repository {
///     fn parameters() -> Vec<ParamSpec> {
///         vec![ParamSpec::service::<Connection>("connection")]
///     }
///
///     fn construct(args: &mut ResolvedArgs) -> DiResult<Self> {
///         Ok(Repository { connection: args.take_service()? })
///     }
/// }
///
/// let container = Container::new();
/// // Repository depends on Connection; neither needs prior registration.
/// container.register_type::<Connection>();
/// let repo = container.get_type::<Repository>().unwrap();
/// assert_eq!(repo.connection.dsn, "sqlite::memory:");
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Declared constructor parameters, in positional order.
    fn parameters() -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Build the value from the resolved positional arguments.
    fn construct(args: &mut ResolvedArgs) -> DiResult<Self>;

    /// Methods reachable through method-call injection.
    fn methods() -> Vec<MethodSpec<Self>> {
        Vec::new()
    }
}

/// One declared constructor or method parameter.
///
/// A parameter is either a *service* slot (filled by type-matching, by a
/// named explicit argument, or by autowiring the declared type) or a *value*
/// slot (filled by a named explicit argument or its declared default).
#[derive(Clone)]
pub struct ParamSpec {
    pub(crate) name: &'static str,
    pub(crate) ty: ParamTy,
}

#[derive(Clone)]
pub(crate) enum ParamTy {
    Service {
        id: TypeId,
        type_name: &'static str,
    },
    Value {
        default: Option<ParamValue>,
    },
}

impl ParamSpec {
    /// A slot filled with a service of type `T`.
    pub fn service<T: Send + Sync + 'static>(name: &'static str) -> Self {
        ParamSpec {
            name,
            ty: ParamTy::Service {
                id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            },
        }
    }

    /// A slot filled with a literal or parameter value. Unmatched slots
    /// without a default fail resolution with `MissingArgument`.
    pub fn value(name: &'static str) -> Self {
        ParamSpec {
            name,
            ty: ParamTy::Value { default: None },
        }
    }

    /// A value slot with a default used when no explicit argument matches.
    pub fn value_or(name: &'static str, default: impl Into<ParamValue>) -> Self {
        ParamSpec {
            name,
            ty: ParamTy::Value {
                default: Some(default.into()),
            },
        }
    }

    /// The declared parameter name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this slot expects a service.
    pub fn is_service(&self) -> bool {
        matches!(self.ty, ParamTy::Service { .. })
    }
}

impl fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ty {
            ParamTy::Service { type_name, .. } => {
                write!(f, "ParamSpec({}: {})", self.name, type_name)
            }
            ParamTy::Value { default } => {
                write!(f, "ParamSpec({}: value, default={:?})", self.name, default)
            }
        }
    }
}

/// A method exposed for post-construction method-call injection.
///
/// The invoker receives the partially-built value and the resolved
/// arguments for this call. Calls run before the instance is cached, so
/// the value is still exclusively owned and mutable.
pub struct MethodSpec<T> {
    pub(crate) name: &'static str,
    pub(crate) parameters: Vec<ParamSpec>,
    pub(crate) invoke: Arc<dyn Fn(&mut T, &mut ResolvedArgs) -> DiResult<()> + Send + Sync>,
}

impl<T: 'static> MethodSpec<T> {
    /// Declare a callable method with its parameter signature.
    pub fn new<F>(name: &'static str, parameters: Vec<ParamSpec>, invoke: F) -> Self
    where
        F: Fn(&mut T, &mut ResolvedArgs) -> DiResult<()> + Send + Sync + 'static,
    {
        MethodSpec {
            name,
            parameters,
            invoke: Arc::new(invoke),
        }
    }
}

/// Type-erased method entry stored in a [`Blueprint`].
#[derive(Clone)]
pub(crate) struct ErasedMethod {
    pub(crate) parameters: Vec<ParamSpec>,
    pub(crate) invoke: Arc<dyn Fn(&mut dyn Any, &mut ResolvedArgs) -> DiResult<()> + Send + Sync>,
}

/// Type-erased recipe for building one concrete type.
///
/// This is the container's stand-in for a reflected class: parameter
/// metadata, a constructor, and a method table, all keyed by the type path.
#[derive(Clone)]
pub(crate) struct Blueprint {
    pub(crate) type_name: &'static str,
    pub(crate) parameters: Vec<ParamSpec>,
    pub(crate) ctor: Arc<dyn Fn(&mut ResolvedArgs) -> DiResult<AnyBox> + Send + Sync>,
    pub(crate) methods: HashMap<&'static str, ErasedMethod>,
}

impl Blueprint {
    pub(crate) fn of<T: Injectable>() -> Self {
        let methods = T::methods()
            .into_iter()
            .map(|spec| {
                let invoke = spec.invoke;
                let erased = ErasedMethod {
                    parameters: spec.parameters,
                    invoke: Arc::new(move |any, args| {
                        let target = any
                            .downcast_mut::<T>()
                            .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))?;
                        (invoke)(target, args)
                    }),
                };
                (spec.name, erased)
            })
            .collect();

        Blueprint {
            type_name: std::any::type_name::<T>(),
            parameters: T::parameters(),
            ctor: Arc::new(|args| Ok(Box::new(T::construct(args)?) as AnyBox)),
            methods,
        }
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("type_name", &self.type_name)
            .field("parameters", &self.parameters.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// One resolved argument, ready to be consumed by a constructor or method.
#[derive(Clone)]
pub enum ResolvedArg {
    /// A resolved service instance
    Service(AnyArc),
    /// A literal or parameter value
    Value(ParamValue),
    /// A resolved nested argument list
    List(Vec<ResolvedArg>),
}

impl fmt::Debug for ResolvedArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedArg::Service(_) => f.write_str("Service(..)"),
            ResolvedArg::Value(v) => write!(f, "Value({:?})", v),
            ResolvedArg::List(items) => write!(f, "List({} items)", items.len()),
        }
    }
}

/// Resolved positional arguments handed to [`Injectable::construct`] and
/// method invokers.
///
/// Arguments are consumed front to back with the `take_*` accessors, in the
/// same order they were declared by [`Injectable::parameters`].
///
/// # Examples
///
/// ```rust
/// use cinder_di::{DiResult, Injectable, ParamSpec, ResolvedArgs};
///
/// struct Server {
///     host: String,
///     port: i64,
/// }
///
/// impl Injectable for Server {
///     fn parameters() -> Vec<ParamSpec> {
///         vec![
///             ParamSpec::value_or("host", "127.0.0.1"),
///             ParamSpec::value_or("port", 8080),
///         ]
///     }
///
///     fn construct(args: &mut ResolvedArgs) -> DiResult<Self> {
///         Ok(Server {
///             host: args.take_string()?,
///             port: args.take_i64()?,
///         })
///     }
/// }
/// ```
pub struct ResolvedArgs {
    target: &'static str,
    items: std::collections::VecDeque<ResolvedArg>,
    taken: usize,
}

impl ResolvedArgs {
    pub(crate) fn new(target: &'static str, items: Vec<ResolvedArg>) -> Self {
        ResolvedArgs {
            target,
            items: items.into(),
            taken: 0,
        }
    }

    /// Number of arguments not yet consumed.
    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Whether all arguments have been consumed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take the next positional argument as-is.
    pub fn take_arg(&mut self) -> DiResult<ResolvedArg> {
        let position = self.taken;
        self.taken += 1;
        self.items
            .pop_front()
            .ok_or_else(|| DiError::MissingArgument {
                target: self.target.to_string(),
                parameter: format!("#{}", position),
            })
    }

    /// Take the next argument as a service of type `T`.
    pub fn take_service<T: Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        match self.take_arg()? {
            ResolvedArg::Service(any) => any
                .downcast::<T>()
                .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>())),
            _ => Err(DiError::TypeMismatch(std::any::type_name::<T>())),
        }
    }

    /// Take the next argument as a literal or parameter value.
    pub fn take_value(&mut self) -> DiResult<ParamValue> {
        match self.take_arg()? {
            ResolvedArg::Value(v) => Ok(v),
            _ => Err(DiError::TypeMismatch("argument is not a value")),
        }
    }

    /// Take the next argument as a resolved nested list.
    pub fn take_list(&mut self) -> DiResult<Vec<ResolvedArg>> {
        match self.take_arg()? {
            ResolvedArg::List(items) => Ok(items),
            _ => Err(DiError::TypeMismatch("argument is not a list")),
        }
    }

    /// Take the next argument as a string value.
    pub fn take_string(&mut self) -> DiResult<String> {
        match self.take_value()? {
            ParamValue::String(s) => Ok(s),
            _ => Err(DiError::TypeMismatch("argument is not a string")),
        }
    }

    /// Take the next argument as an integer value.
    pub fn take_i64(&mut self) -> DiResult<i64> {
        self.take_value()?.as_i64()
    }

    /// Take the next argument as a boolean value.
    pub fn take_bool(&mut self) -> DiResult<bool> {
        self.take_value()?.as_bool()
    }

    /// Take the next argument as a float value.
    pub fn take_f64(&mut self) -> DiResult<f64> {
        self.take_value()?.as_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_in_declaration_order() {
        let mut args = ResolvedArgs::new(
            "test",
            vec![
                ResolvedArg::Value(ParamValue::from("a")),
                ResolvedArg::Value(ParamValue::from(2)),
            ],
        );
        assert_eq!(args.take_string().unwrap(), "a");
        assert_eq!(args.take_i64().unwrap(), 2);
        assert!(matches!(
            args.take_value(),
            Err(DiError::MissingArgument { .. })
        ));
    }

    #[test]
    fn take_service_downcasts() {
        struct Dep(u32);
        let mut args = ResolvedArgs::new("test", vec![ResolvedArg::Service(Arc::new(Dep(9)))]);
        let dep = args.take_service::<Dep>().unwrap();
        assert_eq!(dep.0, 9);
    }

    #[test]
    fn take_service_rejects_values() {
        struct Dep;
        let mut args =
            ResolvedArgs::new("test", vec![ResolvedArg::Value(ParamValue::from(1))]);
        assert!(matches!(
            args.take_service::<Dep>(),
            Err(DiError::TypeMismatch(_))
        ));
    }
}
