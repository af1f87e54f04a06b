//! Service definitions: the recipes the container builds services from.

use crate::blueprint::{Blueprint, Injectable};
use crate::key::ServiceKey;
use crate::value::ParamValue;

/// One constructor or method argument in a service definition.
///
/// Arguments come in three kinds, mirroring the textual convention used in
/// configuration documents:
///
/// - `@name` — a *service reference*, resolved through the container;
/// - `%name%` — a *parameter reference*, resolved through the parameter bag;
/// - anything else — a literal value, passed through unchanged.
///
/// Arguments may also be nested lists, and may carry a name used by the
/// heuristic back-fill when fewer arguments than constructor parameters are
/// declared.
///
/// # Examples
///
/// ```rust
/// use cinder_di::Argument;
///
/// let service = Argument::parse("@database");
/// let param = Argument::parse("%database.host%");
/// let literal = Argument::parse("localhost");
/// let named = Argument::value(5432).named("port");
/// # let _ = (service, param, literal, named);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub(crate) name: Option<String>,
    pub(crate) kind: ArgumentKind,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ArgumentKind {
    Value(ParamValue),
    Service(ServiceKey),
    Parameter(String),
    List(Vec<Argument>),
}

impl Argument {
    /// A literal value argument.
    pub fn value(value: impl Into<ParamValue>) -> Self {
        Argument {
            name: None,
            kind: ArgumentKind::Value(value.into()),
        }
    }

    /// A service reference argument.
    pub fn service(key: impl Into<ServiceKey>) -> Self {
        Argument {
            name: None,
            kind: ArgumentKind::Service(key.into()),
        }
    }

    /// A parameter reference argument.
    pub fn parameter(path: impl Into<String>) -> Self {
        Argument {
            name: None,
            kind: ArgumentKind::Parameter(path.into()),
        }
    }

    /// A nested argument list.
    pub fn list(items: impl IntoIterator<Item = Argument>) -> Self {
        Argument {
            name: None,
            kind: ArgumentKind::List(items.into_iter().collect()),
        }
    }

    /// Classify a raw string by its marker: `@key` is a service reference,
    /// `%path%` a parameter reference, anything else a string literal.
    pub fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix('@') {
            if !rest.is_empty() {
                return Argument::service(rest);
            }
        }
        if raw.len() > 2 && raw.starts_with('%') && raw.ends_with('%') {
            return Argument::parameter(&raw[1..raw.len() - 1]);
        }
        Argument::value(raw)
    }

    /// Attach a name, making this argument eligible for name-matching
    /// against a declared constructor parameter.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The attached name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A post-construction method call configured on a definition.
///
/// Calls run in declaration order against the freshly constructed instance,
/// before it is cached. Each call resolves its own argument list through the
/// same routine as constructor arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub(crate) method: String,
    pub(crate) arguments: Vec<Argument>,
}

impl MethodCall {
    /// A call to `method` with no arguments.
    pub fn new(method: impl Into<String>) -> Self {
        MethodCall {
            method: method.into(),
            arguments: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Append several arguments.
    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = Argument>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    /// The target method name.
    pub fn method(&self) -> &str {
        &self.method
    }
}

/// The recipe describing how to build one service.
///
/// A definition names the class to instantiate, the explicit constructor
/// arguments (possibly fewer than the constructor declares — the rest are
/// back-filled heuristically), post-construction method calls, and an
/// optional alias. Registering a definition never validates that the class
/// is buildable; that check is deferred to construction time, which permits
/// forward references between services.
///
/// # Examples
///
/// ```rust
/// use cinder_di::{Argument, Container, DiResult, Injectable, ParamSpec,
///                 ResolvedArgs, ServiceDefinition};
///
/// struct Mailer {
///     transport: String,
/// }
///
/// impl Injectable for Mailer {
///     fn parameters() -> Vec<ParamSpec> {
///         vec![ParamSpec::value("transport")]
///     }
///
///     fn construct(args: &mut ResolvedArgs) -> DiResult<Self> {
///         Ok(Mailer { transport: args.take_string()? })
///     }
/// }
///
/// let container = Container::new();
/// container.register_parameter("mail.transport", "smtp");
/// container.register_service(
///     "mailer",
///     ServiceDefinition::new::<Mailer>()
///         .with_argument(Argument::parse("%mail.transport%")),
/// );
///
/// let mailer = container.get::<Mailer>("mailer").unwrap();
/// assert_eq!(mailer.transport, "smtp");
/// ```
#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    pub(crate) class: String,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) calls: Vec<MethodCall>,
    pub(crate) alias: Option<String>,
    pub(crate) blueprint: Option<Blueprint>,
}

impl ServiceDefinition {
    /// A definition for the injectable type `T`, carrying its blueprint.
    pub fn new<T: Injectable>() -> Self {
        ServiceDefinition {
            class: std::any::type_name::<T>().to_string(),
            arguments: Vec::new(),
            calls: Vec::new(),
            alias: None,
            blueprint: Some(Blueprint::of::<T>()),
        }
    }

    /// A definition referring to a class by name only. The named type must
    /// be made loadable separately (see
    /// [`Container::register_type`](crate::Container::register_type)) before
    /// the service is first resolved.
    pub fn for_class(class: impl Into<String>) -> Self {
        ServiceDefinition {
            class: class.into(),
            arguments: Vec::new(),
            calls: Vec::new(),
            alias: None,
            blueprint: None,
        }
    }

    /// Append one explicit constructor argument.
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Append several explicit constructor arguments.
    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = Argument>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    /// Append a post-construction method call.
    pub fn with_call(mut self, call: MethodCall) -> Self {
        self.calls.push(call);
        self
    }

    /// Set the alternate identifier this definition is also reachable under.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The class this definition instantiates.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The configured alias, if any.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_markers() {
        assert_eq!(
            Argument::parse("@db").kind,
            ArgumentKind::Service(ServiceKey::from("db"))
        );
        assert_eq!(
            Argument::parse("%db.host%").kind,
            ArgumentKind::Parameter("db.host".to_string())
        );
        assert_eq!(
            Argument::parse("plain").kind,
            ArgumentKind::Value(ParamValue::from("plain"))
        );
    }

    #[test]
    fn parse_degenerate_markers_are_literals() {
        // A bare marker char or an empty reference carries no target.
        assert!(matches!(Argument::parse("@").kind, ArgumentKind::Value(_)));
        assert!(matches!(Argument::parse("%").kind, ArgumentKind::Value(_)));
        assert!(matches!(Argument::parse("%%").kind, ArgumentKind::Value(_)));
    }

    #[test]
    fn builder_accumulates() {
        let def = ServiceDefinition::for_class("app::Db")
            .with_argument(Argument::parse("@pool"))
            .with_call(MethodCall::new("warm_up"))
            .with_alias("database");
        assert_eq!(def.class(), "app::Db");
        assert_eq!(def.arguments.len(), 1);
        assert_eq!(def.calls.len(), 1);
        assert_eq!(def.alias(), Some("database"));
    }
}
