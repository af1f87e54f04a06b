//! Disposal traits for resource cleanup.

/// Trait for synchronous resource disposal.
///
/// Implement this for services that need structured teardown (flushing
/// caches, closing connections). Hooks registered through
/// [`ResolverContext::register_disposer`](crate::ResolverContext::register_disposer)
/// run in LIFO order when
/// [`Container::dispose_all`](crate::Container::dispose_all) is called.
///
/// # Examples
///
/// ```rust
/// use cinder_di::{Container, Dispose, DiResult};
/// use std::sync::Arc;
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         println!("Flushing cache: {}", self.name);
///     }
/// }
///
/// let container = Container::new();
/// container.register_factory("cache", |ctx| {
///     let cache = Arc::new(Cache { name: "users".to_string() });
///     ctx.register_disposer(cache.clone());
///     DiResult::Ok(Cache { name: "users".to_string() })
/// });
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}

/// Trait for asynchronous resource disposal.
///
/// Implement this for services that require async teardown (graceful
/// connection shutdown, async I/O cleanup). Async hooks run before sync
/// hooks, both in LIFO order.
///
/// # Examples
///
/// ```rust
/// use cinder_di::AsyncDispose;
/// use async_trait::async_trait;
///
/// struct DatabaseClient {
///     connection_id: String,
/// }
///
/// #[async_trait]
/// impl AsyncDispose for DatabaseClient {
///     async fn dispose(&self) {
///         println!("Closing connection: {}", self.connection_id);
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync + 'static {
    /// Perform asynchronous cleanup of resources.
    async fn dispose(&self);
}
