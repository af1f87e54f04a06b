//! Service key type for the dependency injection container.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifier for service storage and lookup.
///
/// Keys are plain strings: a service registered as `"database"` is requested
/// as `"database"`. Autowired services use their Rust type path as the key
/// (see [`key_of_type`]), which is what allows a constructor parameter typed
/// as `Database` to find a service registered under any key, through the
/// alias table.
///
/// Cloning a key is cheap (the backing string is shared), so keys can be
/// passed around freely during resolution.
///
/// # Examples
///
/// ```rust
/// use cinder_di::{ServiceKey, key_of_type};
///
/// let key = ServiceKey::from("database");
/// assert_eq!(key.as_str(), "database");
///
/// struct Database;
/// let typed = key_of_type::<Database>();
/// assert!(typed.as_str().ends_with("Database"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceKey(Arc<str>);

impl ServiceKey {
    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ServiceKey {
    fn from(s: &str) -> Self {
        ServiceKey(Arc::from(s))
    }
}

impl From<String> for ServiceKey {
    fn from(s: String) -> Self {
        ServiceKey(Arc::from(s.as_str()))
    }
}

impl From<&String> for ServiceKey {
    fn from(s: &String) -> Self {
        ServiceKey(Arc::from(s.as_str()))
    }
}

impl From<&ServiceKey> for ServiceKey {
    fn from(k: &ServiceKey) -> Self {
        k.clone()
    }
}

// Enables map lookups by &str without allocating a key.
impl Borrow<str> for ServiceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServiceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceKey({:?})", &*self.0)
    }
}

impl PartialEq<str> for ServiceKey {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ServiceKey {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Key for a concrete type, derived from its type path.
///
/// This is the key under which autowired services are registered, and the
/// alias recorded for every typed registration so that type-hinted
/// constructor parameters can locate them.
#[inline]
pub fn key_of_type<T: 'static>() -> ServiceKey {
    ServiceKey::from(std::any::type_name::<T>())
}
