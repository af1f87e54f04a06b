//! # cinder-di
//!
//! String-keyed, definition-driven dependency injection for Rust.
//!
//! ## Features
//!
//! - **String-keyed services**: register and resolve by name, the way
//!   configuration files describe an object graph
//! - **Definitions**: `class + arguments + calls + alias` recipes with
//!   `@service` and `%parameter%` references
//! - **Autowiring**: constructor parameters declared by [`Injectable`]
//!   types are back-filled by type, by name, or by registering the declared
//!   type on the fly
//! - **Parameters**: dotted-path configuration values with transitive
//!   `%ref%` resolution and additive merge
//! - **Thread-safe**: at-most-once construction per key under concurrency
//! - **Circular dependency detection**: full dependency path in the error
//!
//! ## Quick Start
//!
//! ```rust
//! use cinder_di::{Container, DiResult};
//! use std::sync::Arc;
//!
//! struct Database {
//!     dsn: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = Container::new();
//! container.register_parameter("database.dsn", "postgres://localhost");
//!
//! container.register_factory("database", |ctx| {
//!     DiResult::Ok(Database {
//!         dsn: ctx.get_parameter("database.dsn")?.as_str()?.to_string(),
//!     })
//! });
//! container.register_factory("users", |ctx| {
//!     DiResult::Ok(UserService {
//!         db: ctx.get::<Database>("database")?,
//!     })
//! });
//!
//! let users = container.get::<UserService>("users").unwrap();
//! let again = container.get::<UserService>("users").unwrap();
//! assert_eq!(users.db.dsn, "postgres://localhost");
//! assert!(Arc::ptr_eq(&users, &again)); // same instance every time
//! ```
//!
//! ## Definitions and autowiring
//!
//! Factories are the primary registration mode. Where the object graph is
//! described by configuration data instead, a [`ServiceDefinition`] names a
//! class and its arguments, and the class declares its constructor through
//! the [`Injectable`] trait:
//!
//! ```rust
//! use cinder_di::{Argument, Container, DiResult, Injectable, ParamSpec,
//!                 ResolvedArgs, ServiceDefinition};
//!
//! struct Cache {
//!     prefix: String,
//!     capacity: i64,
//! }
//!
//! impl Injectable for Cache {
//!     fn parameters() -> Vec<ParamSpec> {
//!         vec![
//!             ParamSpec::value("prefix"),
//!             ParamSpec::value_or("capacity", 1024),
//!         ]
//!     }
//!
//!     fn construct(args: &mut ResolvedArgs) -> DiResult<Self> {
//!         Ok(Cache {
//!             prefix: args.take_string()?,
//!             capacity: args.take_i64()?,
//!         })
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_parameter("cache.prefix", "app");
//! container.register_service(
//!     "cache",
//!     ServiceDefinition::new::<Cache>()
//!         .with_argument(Argument::parse("%cache.prefix%").named("prefix")),
//! );
//!
//! let cache = container.get::<Cache>("cache").unwrap();
//! assert_eq!(cache.prefix, "app");
//! assert_eq!(cache.capacity, 1024); // declared default back-filled
//! ```
//!
//! ## Aliases
//!
//! Every definition is also reachable under its alias (or, absent one, its
//! class name), and further aliases can be added explicitly:
//!
//! ```rust
//! use cinder_di::{Container, DiResult};
//! use std::sync::Arc;
//!
//! let container = Container::new();
//! container.register_factory("primary-store", |_| DiResult::Ok(42u32));
//! container.set_alias("store", "primary-store").unwrap();
//!
//! let a = container.get::<u32>("store").unwrap();
//! let b = container.get::<u32>("primary-store").unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//! ```

// Module declarations
pub mod blueprint;
pub mod container;
pub mod definition;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod observer;
pub mod validation;
pub mod value;

#[cfg(feature = "config")]
pub mod config;

pub mod traits;

// Internal modules
mod internal;
mod parameters;

// Re-export core types
pub use blueprint::{Injectable, MethodSpec, ParamSpec, ResolvedArg, ResolvedArgs};
pub use container::{Container, ResolverContext};
pub use definition::{Argument, MethodCall, ServiceDefinition};
pub use descriptors::{ServiceDescriptor, ServiceKind};
pub use error::{DiError, DiResult};
pub use internal::CircularPanic;
pub use key::{key_of_type, ServiceKey};
pub use observer::{DiObserver, LoggingObserver};
pub use traits::{AsyncDispose, Dispose};
pub use validation::{ValidationError, ValidationReport, ValidationWarning};
pub use value::ParamValue;

#[cfg(feature = "config")]
pub use config::{load_json_file, load_json_str};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_singleton_resolution() {
        let container = Container::new();
        container.register_factory("answer", |_| DiResult::Ok(42usize));

        let a = container.get::<usize>("answer").unwrap();
        let b = container.get::<usize>("answer").unwrap();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b)); // Same instance
    }

    #[test]
    fn test_unknown_key() {
        let container = Container::new();
        match container.get::<usize>("missing") {
            Err(DiError::NotFound(key)) => assert_eq!(key, "missing"),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_typed_instance_registration() {
        struct Config {
            name: &'static str,
        }

        let container = Container::new();
        container.register_typed_instance(Config { name: "demo" });

        let key = key_of_type::<Config>();
        assert!(container.has(key.as_str()));
        let config = container.get::<Config>(key).unwrap();
        assert_eq!(config.name, "demo");
    }

    #[test]
    fn test_alias_and_class_reachability() {
        struct Store;

        let container = Container::new();
        container.register_factory("kv", |_| DiResult::Ok(Store));

        // The factory's concrete type name aliases back to the key.
        let by_type = container.get::<Store>(key_of_type::<Store>()).unwrap();
        let by_key = container.get::<Store>("kv").unwrap();
        assert!(Arc::ptr_eq(&by_type, &by_key));
    }

    #[test]
    fn test_parameter_roundtrip() {
        let container = Container::new();
        container.register_parameter("db.host", "localhost");

        assert!(container.has_parameter("db.host"));
        assert!(!container.has_parameter("db.missing"));
        assert_eq!(
            container.get_parameter("db.host").unwrap(),
            ParamValue::from("localhost")
        );
        assert!(matches!(
            container.get_parameter("db.missing"),
            Err(DiError::ParameterNotFound(_))
        ));
    }
}
