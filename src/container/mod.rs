//! The service container: registry maps, caches, and the registration API.
//!
//! The container holds three maps — service definitions, resolved instances,
//! and parameters — plus the alias table and blueprint registry that bridge
//! string-keyed configuration data with typed construction. Reads dominate
//! (every `get`), writes are rare and front-loaded during bootstrap, so every
//! map sits behind its own `RwLock` and singleton construction synchronizes
//! per key, never globally.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use once_cell::sync::OnceCell;

use crate::blueprint::{AnyArc, Blueprint, Injectable};
use crate::definition::{Argument, MethodCall, ServiceDefinition};
use crate::error::{DiError, DiResult};
use crate::internal::{BoxFutureUnit, DisposeBag};
use crate::key::{key_of_type, ServiceKey};
use crate::observer::{DiObserver, Observers};
use crate::parameters::ParameterBag;
use crate::value::ParamValue;

pub mod context;
mod resolve;

pub use context::ResolverContext;

/// Factory closure stored for factory-registered services.
pub(crate) type FactoryFn =
    Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// How a registered service gets built.
pub(crate) enum Recipe {
    /// Blueprint-driven construction from a definition.
    Definition {
        class: String,
        arguments: Vec<Argument>,
        calls: Vec<MethodCall>,
    },
    /// An explicit factory closure.
    Factory(FactoryFn),
    /// A pre-built instance installed directly.
    Instance(AnyArc),
}

/// One registered service: its recipe plus the singleton cell that
/// guarantees at-most-once construction per key.
pub(crate) struct ServiceEntry {
    pub(crate) recipe: Recipe,
    pub(crate) class: Option<String>,
    pub(crate) cell: OnceCell<AnyArc>,
}

pub(crate) struct ContainerInner {
    pub(crate) definitions: RwLock<HashMap<ServiceKey, Arc<ServiceEntry>>>,
    pub(crate) instances: RwLock<HashMap<ServiceKey, AnyArc>>,
    pub(crate) aliases: RwLock<HashMap<ServiceKey, ServiceKey>>,
    pub(crate) blueprints: RwLock<HashMap<String, Arc<Blueprint>>>,
    pub(crate) parameters: ParameterBag,
    pub(crate) observers: Observers,
    pub(crate) disposers: Mutex<DisposeBag>,
}

/// String-keyed dependency injection container.
///
/// A `Container` is an explicitly constructed value — there is no process
/// global. Cloning produces another handle to the same shared state, so the
/// container can be handed to whatever owns the process lifecycle and passed
/// into factories cheaply. Instances live as long as the container; there is
/// no scoped or transient lifetime in this model.
///
/// # Thread safety
///
/// All registration and resolution methods take `&self` and are safe to call
/// from multiple threads. Two concurrent `get` calls for an unbuilt key run
/// the constructor exactly once; the second caller blocks and receives the
/// first caller's instance.
///
/// # Examples
///
/// ```rust
/// use cinder_di::{Container, DiResult};
/// use std::sync::Arc;
///
/// struct Database {
///     dsn: String,
/// }
///
/// struct UserService {
///     db: Arc<Database>,
/// }
///
/// let container = Container::new();
/// container.register_parameter("database.dsn", "postgres://localhost");
/// container.register_factory("database", |ctx| {
///     DiResult::Ok(Database {
///         dsn: ctx.get_parameter("database.dsn")?.as_str()?.to_string(),
///     })
/// });
/// container.register_factory("users", |ctx| {
///     DiResult::Ok(UserService {
///         db: ctx.get::<Database>("database")?,
///     })
/// });
///
/// let users = container.get::<UserService>("users").unwrap();
/// assert_eq!(users.db.dsn, "postgres://localhost");
/// ```
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    /// Creates a new, empty container.
    pub fn new() -> Self {
        Container {
            inner: Arc::new(ContainerInner {
                definitions: RwLock::new(HashMap::new()),
                instances: RwLock::new(HashMap::new()),
                aliases: RwLock::new(HashMap::new()),
                blueprints: RwLock::new(HashMap::new()),
                parameters: ParameterBag::new(),
                observers: Observers::new(),
                disposers: Mutex::new(DisposeBag::default()),
            }),
        }
    }

    #[inline]
    pub(crate) fn inner(&self) -> &ContainerInner {
        &self.inner
    }

    // ----- Service registration -----

    /// Stores (or overwrites) a definition under `key`.
    ///
    /// Also updates the alias table so that the definition's alias — or,
    /// absent one, its class name — maps back to `key`. The class is not
    /// validated here; a definition may reference services and types that
    /// only become available later.
    pub fn register_service(&self, key: impl Into<ServiceKey>, definition: ServiceDefinition) {
        let key = key.into();
        let ServiceDefinition {
            class,
            arguments,
            calls,
            alias,
            blueprint,
        } = definition;

        if let Some(blueprint) = blueprint {
            self.install_blueprint(blueprint);
        }

        let alias_key = ServiceKey::from(alias.unwrap_or_else(|| class.clone()));
        self.inner
            .aliases
            .write()
            .unwrap()
            .insert(alias_key, key.clone());

        let entry = ServiceEntry {
            class: Some(class.clone()),
            recipe: Recipe::Definition {
                class,
                arguments,
                calls,
            },
            cell: OnceCell::new(),
        };
        self.inner
            .definitions
            .write()
            .unwrap()
            .insert(key, Arc::new(entry));
    }

    /// Registers the injectable type `T` under `key`, autowired entirely
    /// from its declared parameters.
    ///
    /// Shorthand for `register_service(key, ServiceDefinition::new::<T>())`.
    pub fn register<T: Injectable>(&self, key: impl Into<ServiceKey>) {
        self.register_service(key, ServiceDefinition::new::<T>());
    }

    /// Records the blueprint for `T` without defining a service, making the
    /// type loadable for definitions that reference it by class name and for
    /// autowired constructor parameters.
    pub fn register_type<T: Injectable>(&self) {
        self.install_blueprint(Blueprint::of::<T>());
    }

    fn install_blueprint(&self, blueprint: Blueprint) {
        self.inner
            .blueprints
            .write()
            .unwrap()
            .entry(blueprint.type_name.to_string())
            .or_insert_with(|| Arc::new(blueprint));
    }

    /// Registers a service built by `factory` on first request.
    ///
    /// The factory receives a [`ResolverContext`] for resolving dependencies
    /// and parameters; its result is cached for the container's lifetime.
    pub fn register_factory<T, F>(&self, key: impl Into<ServiceKey>, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext) -> DiResult<T> + Send + Sync + 'static,
    {
        let key = key.into();
        let ctor: FactoryFn = Arc::new(move |ctx| Ok(Arc::new(factory(ctx)?) as AnyArc));

        let type_key = key_of_type::<T>();
        self.inner
            .aliases
            .write()
            .unwrap()
            .insert(type_key, key.clone());

        let entry = ServiceEntry {
            class: Some(std::any::type_name::<T>().to_string()),
            recipe: Recipe::Factory(ctor),
            cell: OnceCell::new(),
        };
        self.inner
            .definitions
            .write()
            .unwrap()
            .insert(key, Arc::new(entry));
    }

    /// Installs a fully constructed object under `key`.
    ///
    /// When no definition exists for the key yet, one is synthesized from
    /// the value's runtime type so that `has` and alias resolution work
    /// uniformly. Overwriting is idempotent and never re-runs constructor
    /// or method calls.
    pub fn register_instance<T: Send + Sync + 'static>(
        &self,
        key: impl Into<ServiceKey>,
        value: T,
    ) {
        let key = key.into();
        let instance: AnyArc = Arc::new(value);

        self.inner
            .instances
            .write()
            .unwrap()
            .insert(key.clone(), instance.clone());

        let mut definitions = self.inner.definitions.write().unwrap();
        if !definitions.contains_key(&key) {
            definitions.insert(
                key.clone(),
                Arc::new(ServiceEntry {
                    class: Some(std::any::type_name::<T>().to_string()),
                    recipe: Recipe::Instance(instance),
                    cell: OnceCell::new(),
                }),
            );
            drop(definitions);
            self.inner
                .aliases
                .write()
                .unwrap()
                .insert(key_of_type::<T>(), key);
        }
    }

    /// Installs a fully constructed object, deriving the key from its type.
    pub fn register_typed_instance<T: Send + Sync + 'static>(&self, value: T) {
        self.register_instance(key_of_type::<T>(), value);
    }

    /// Records `alias` as an alternate identifier for `target`.
    ///
    /// Fails with `NotFound` when `target` is not registered.
    pub fn set_alias(
        &self,
        alias: impl Into<ServiceKey>,
        target: impl Into<ServiceKey>,
    ) -> DiResult<()> {
        let target = target.into();
        if !self.has(target.as_str()) {
            return Err(DiError::NotFound(target.to_string()));
        }
        self.inner
            .aliases
            .write()
            .unwrap()
            .insert(alias.into(), target);
        Ok(())
    }

    /// Whether `key` is a registered definition or a known alias.
    pub fn has(&self, key: impl AsRef<str>) -> bool {
        let key = key.as_ref();
        self.inner.definitions.read().unwrap().contains_key(key)
            || self.inner.aliases.read().unwrap().contains_key(key)
    }

    // ----- Parameters -----

    /// Stores a configuration parameter under `key`.
    ///
    /// Registering an existing key merges additively: the old value is
    /// coerced into an array when necessary and the new value appended.
    /// Callers wanting replacement must use a fresh key.
    pub fn register_parameter(&self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.inner.parameters.register(key, value);
    }

    /// Resolves the parameter at the dotted `path`.
    ///
    /// String values of the form `%other%` are resolved transitively; the
    /// fully-resolved result is cached per path. Fails with
    /// `ParameterNotFound` when any segment is absent.
    pub fn get_parameter(&self, path: &str) -> DiResult<ParamValue> {
        self.inner.parameters.get(path)
    }

    /// Whether the dotted `path` resolves to a parameter value.
    pub fn has_parameter(&self, path: &str) -> bool {
        self.inner.parameters.has(path)
    }

    // ----- Observation and lifecycle -----

    /// Registers an observer notified around every service construction.
    pub fn add_observer(&self, observer: Arc<dyn DiObserver>) {
        self.inner.observers.add(observer);
    }

    pub(crate) fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.inner.disposers.lock().unwrap().push_sync(f);
    }

    pub(crate) fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.inner.disposers.lock().unwrap().push_async(move || (f)());
    }

    /// Runs all registered disposal hooks in LIFO order.
    ///
    /// Async hooks run first (reversed), then sync hooks (reversed). Hooks
    /// are consumed: a second call is a no-op unless new hooks were
    /// registered in between.
    pub async fn dispose_all(&self) {
        let mut bag = std::mem::take(&mut *self.inner.disposers.lock().unwrap());
        bag.run_all_async_reverse().await;
        bag.run_all_sync_reverse();
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str("Definitions:\n");
        for (key, entry) in self.inner.definitions.read().unwrap().iter() {
            let kind = match &entry.recipe {
                Recipe::Definition { class, .. } => format!("definition({})", class),
                Recipe::Factory(_) => "factory".to_string(),
                Recipe::Instance(_) => "instance".to_string(),
            };
            s.push_str(&format!("  {}: {}\n", key, kind));
        }
        s.push_str("Aliases:\n");
        for (alias, target) in self.inner.aliases.read().unwrap().iter() {
            s.push_str(&format!("  {} -> {}\n", alias, target));
        }
        s.push_str("Instances:\n");
        for key in self.inner.instances.read().unwrap().keys() {
            s.push_str(&format!("  {}\n", key));
        }
        s
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Container {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            if let Ok(bag) = self.inner.disposers.try_lock() {
                if !bag.is_empty() {
                    tracing::warn!(
                        "Container dropped with undisposed resources; call dispose_all().await before dropping"
                    );
                }
            }
        }
    }
}
