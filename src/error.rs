//! Error types for the dependency injection container.

use std::fmt;

/// Dependency injection errors
///
/// Represents the error conditions that can occur during service
/// registration, resolution, or parameter lookup.
///
/// All failures are fatal to the `get()` or `get_parameter()` call that
/// produced them and propagate synchronously to the caller; the container
/// never retries, logs, or substitutes defaults (the single exception is
/// [`Container::has_parameter`](crate::Container::has_parameter), which
/// converts `ParameterNotFound` into `false`).
///
/// # Examples
///
/// ```rust
/// use cinder_di::{Container, DiError};
///
/// let container = Container::new();
/// match container.get_any("missing") {
///     Err(DiError::NotFound(key)) => assert_eq!(key, "missing"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DiError {
    /// Requested key is neither a registered definition nor a known alias
    NotFound(String),
    /// Dotted parameter path has a missing segment
    ParameterNotFound(String),
    /// Class named by a definition is not registered as buildable
    NotInstantiable(String),
    /// Dependency cycle detected (includes the full path)
    Circular(Vec<String>),
    /// Method-call definition targets a method the class does not expose
    UnknownMethod {
        /// Class the call was configured against
        class: String,
        /// Method name that could not be found
        method: String,
    },
    /// Heuristic back-fill found no value for a declared parameter
    MissingArgument {
        /// Type being constructed or method being invoked
        target: String,
        /// Declared parameter that stayed unresolved
        parameter: String,
    },
    /// Downcast to the requested type failed
    TypeMismatch(&'static str),
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
    /// Configuration document could not be loaded or parsed
    Configuration(String),
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotFound(key) => write!(f, "Service not found: {}", key),
            DiError::ParameterNotFound(path) => write!(f, "Parameter not found: {}", path),
            DiError::NotInstantiable(class) => {
                write!(f, "Class is not instantiable (no blueprint registered): {}", class)
            }
            DiError::Circular(path) => {
                write!(f, "Circular reference: {}", path.join(" -> "))
            }
            DiError::UnknownMethod { class, method } => {
                write!(f, "Unknown method {}::{}", class, method)
            }
            DiError::MissingArgument { target, parameter } => {
                write!(f, "Missing argument `{}` for {}", parameter, target)
            }
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
            DiError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for DI operations
///
/// A convenience alias for `Result<T, DiError>` used throughout the crate.
///
/// # Examples
///
/// ```rust
/// use cinder_di::{DiResult, DiError};
///
/// fn lookup(found: bool) -> DiResult<&'static str> {
///     if found {
///         Ok("service")
///     } else {
///         Err(DiError::NotFound("service".to_string()))
///     }
/// }
///
/// assert!(lookup(true).is_ok());
/// assert!(lookup(false).is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
