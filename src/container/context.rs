//! Resolver context handed to factory functions.

use std::sync::Arc;

use crate::blueprint::Injectable;
use crate::error::DiResult;
use crate::key::ServiceKey;
use crate::traits::{AsyncDispose, Dispose};
use crate::value::ParamValue;

use super::Container;

/// Context passed to factory functions for resolving dependencies.
///
/// A `ResolverContext` borrows the container for the duration of one
/// construction, exposing the same resolution surface: services by key or
/// type, and parameters by dotted path. It also lets factories register
/// disposal hooks for the values they create.
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
/// struct Repository {
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
/// container.register_factory("repository", |ctx| {
///     DiResult::Ok(Repository {
///         db: ctx.get::<Database>("database")?,
///     })
/// });
///
/// let repo = container.get::<Repository>("repository").unwrap();
/// assert_eq!(repo.db.dsn, "postgres://localhost");
/// ```
pub struct ResolverContext<'a> {
    container: &'a Container,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(container: &'a Container) -> Self {
        ResolverContext { container }
    }

    /// The container this context resolves against.
    pub fn container(&self) -> &Container {
        self.container
    }

    /// Resolves the service under `key`, downcast to `T`.
    pub fn get<T: Send + Sync + 'static>(&self, key: impl Into<ServiceKey>) -> DiResult<Arc<T>> {
        self.container.get(key)
    }

    /// Resolves the service under `key` without downcasting.
    pub fn get_any(
        &self,
        key: impl Into<ServiceKey>,
    ) -> DiResult<Arc<dyn std::any::Any + Send + Sync>> {
        self.container.get_any(key)
    }

    /// Resolves a service by type, autowiring it when unknown.
    pub fn get_type<T: Injectable>(&self) -> DiResult<Arc<T>> {
        self.container.get_type::<T>()
    }

    /// Whether `key` is a registered definition or known alias.
    pub fn has(&self, key: impl AsRef<str>) -> bool {
        self.container.has(key)
    }

    /// Resolves the parameter at the dotted `path`.
    pub fn get_parameter(&self, path: &str) -> DiResult<ParamValue> {
        self.container.get_parameter(path)
    }

    /// Whether the dotted `path` resolves to a parameter value.
    pub fn has_parameter(&self, path: &str) -> bool {
        self.container.has_parameter(path)
    }

    /// Registers a synchronous disposal hook for `service`.
    pub fn register_disposer<T>(&self, service: Arc<T>)
    where
        T: Dispose + 'static,
    {
        self.container
            .push_sync_disposer(Box::new(move || service.dispose()));
    }

    /// Registers an asynchronous disposal hook for `service`.
    pub fn register_async_disposer<T>(&self, service: Arc<T>)
    where
        T: AsyncDispose + 'static,
    {
        self.container.push_async_disposer(Box::new(move || {
            Box::pin(async move { service.dispose().await })
        }));
    }
}
