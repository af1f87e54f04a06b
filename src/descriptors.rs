//! Service descriptors for introspection and diagnostics.

use crate::container::{Container, Recipe};
use crate::key::ServiceKey;

/// How a registered service gets built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// Blueprint-driven construction from a definition
    Definition,
    /// An explicit factory closure
    Factory,
    /// A pre-built instance installed directly
    Instance,
}

/// Metadata about one registered service.
///
/// Useful for debugging, startup health checks, and documenting what a
/// configured container actually holds.
///
/// # Examples
///
/// ```rust
/// use cinder_di::{Container, DiResult, ServiceKind};
///
/// let container = Container::new();
/// container.register_factory("answer", |_| DiResult::Ok(42u32));
/// container.register_instance("greeting", "hello".to_string());
///
/// let descriptors = container.service_descriptors();
/// assert_eq!(descriptors.len(), 2);
///
/// let answer = descriptors.iter().find(|d| d.key == "answer").unwrap();
/// assert_eq!(answer.kind, ServiceKind::Factory);
/// assert!(!answer.installed);
///
/// let greeting = descriptors.iter().find(|d| d.key == "greeting").unwrap();
/// assert_eq!(greeting.kind, ServiceKind::Instance);
/// assert!(greeting.installed);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// The key the service is registered under
    pub key: ServiceKey,
    /// The class the service instantiates, when known
    pub class: Option<String>,
    /// How the service gets built
    pub kind: ServiceKind,
    /// Whether an instance is already cached for this key
    pub installed: bool,
    /// Number of explicit constructor arguments in the definition
    pub arguments: usize,
    /// Number of configured post-construction method calls
    pub calls: usize,
}

impl Container {
    /// Snapshot of every registered service, sorted by key.
    pub fn service_descriptors(&self) -> Vec<ServiceDescriptor> {
        let instances = self.inner().instances.read().unwrap();
        let definitions = self.inner().definitions.read().unwrap();

        let mut descriptors: Vec<ServiceDescriptor> = definitions
            .iter()
            .map(|(key, entry)| {
                let (kind, arguments, calls) = match &entry.recipe {
                    Recipe::Definition {
                        arguments, calls, ..
                    } => (ServiceKind::Definition, arguments.len(), calls.len()),
                    Recipe::Factory(_) => (ServiceKind::Factory, 0, 0),
                    Recipe::Instance(_) => (ServiceKind::Instance, 0, 0),
                };
                ServiceDescriptor {
                    key: key.clone(),
                    class: entry.class.clone(),
                    kind,
                    installed: instances.contains_key(key),
                    arguments,
                    calls,
                }
            })
            .collect();

        descriptors.sort_by(|a, b| a.key.cmp(&b.key));
        descriptors
    }
}
