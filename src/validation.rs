//! Startup validation of a configured container.
//!
//! Resolution validates lazily: a dangling alias or a missing class only
//! fails when the service is first requested. `Container::validate` walks
//! the whole configuration eagerly instead, so deployments can fail fast at
//! bootstrap rather than on the first unlucky request.

use std::collections::{HashMap, HashSet};

use crate::blueprint::ParamTy;
use crate::container::{Container, Recipe};
use crate::definition::{Argument, ArgumentKind};
use crate::key::ServiceKey;

/// A configuration error that will fail resolution at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An alias chain never reaches a registered definition
    DanglingAlias {
        /// The alias that cannot be resolved
        alias: String,
        /// The target the chain dead-ends at
        target: String,
    },
    /// A definition names a class with no registered blueprint
    UnknownClass {
        /// The service whose definition is broken
        service: String,
        /// The class that is not loadable
        class: String,
    },
    /// A method call targets a method the blueprint does not expose
    UnknownMethod {
        /// The service whose definition is broken
        service: String,
        /// The class the call was configured against
        class: String,
        /// The missing method
        method: String,
    },
    /// An argument references a parameter path that does not resolve
    MissingParameter {
        /// The service whose definition is broken
        service: String,
        /// The unresolvable dotted path
        path: String,
    },
    /// The dependency graph contains a cycle
    CircularDependency {
        /// The cycle, starting and ending at the same key
        cycle: Vec<String>,
    },
}

/// A configuration smell that resolves but probably not as intended.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// An alias equals a definition key; the direct definition always wins
    /// and the alias target is unreachable through this name
    AliasShadowsDefinition {
        /// The shadowed alias
        alias: String,
    },
}

/// Outcome of [`Container::validate`].
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Errors that will fail resolution at runtime
    pub errors: Vec<ValidationError>,
    /// Suspicious but functional configuration
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Whether the configuration is free of errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Container {
    /// Eagerly checks the registered configuration for problems that lazy
    /// resolution would only surface at request time.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        let definitions = self.inner().definitions.read().unwrap();
        let aliases = self.inner().aliases.read().unwrap();
        let blueprints = self.inner().blueprints.read().unwrap();

        // Alias chains must terminate at a definition.
        for (alias, target) in aliases.iter() {
            if definitions.contains_key(alias) {
                // Self-aliases are how self-registered keys look; only an
                // alias pointing elsewhere is shadowed by the definition.
                if alias != target {
                    report.warnings.push(ValidationWarning::AliasShadowsDefinition {
                        alias: alias.to_string(),
                    });
                }
                continue;
            }
            let mut seen: HashSet<&ServiceKey> = HashSet::new();
            let mut current = target;
            loop {
                if definitions.contains_key(current) {
                    break;
                }
                if !seen.insert(current) {
                    report.errors.push(ValidationError::DanglingAlias {
                        alias: alias.to_string(),
                        target: current.to_string(),
                    });
                    break;
                }
                match aliases.get(current) {
                    Some(next) => current = next,
                    None => {
                        report.errors.push(ValidationError::DanglingAlias {
                            alias: alias.to_string(),
                            target: current.to_string(),
                        });
                        break;
                    }
                }
            }
        }

        // Definitions must name loadable classes, callable methods, and
        // resolvable parameters.
        let mut edges: HashMap<String, Vec<String>> = HashMap::new();
        for (key, entry) in definitions.iter() {
            let Recipe::Definition {
                class,
                arguments,
                calls,
            } = &entry.recipe
            else {
                continue;
            };

            let blueprint = blueprints.get(class);
            if blueprint.is_none() {
                report.errors.push(ValidationError::UnknownClass {
                    service: key.to_string(),
                    class: class.clone(),
                });
            }

            let mut targets: Vec<String> = Vec::new();
            self.collect_argument_issues(key, arguments, &mut targets, &mut report);

            if let Some(blueprint) = blueprint {
                for call in calls {
                    if !blueprint.methods.contains_key(call.method.as_str()) {
                        report.errors.push(ValidationError::UnknownMethod {
                            service: key.to_string(),
                            class: class.clone(),
                            method: call.method.clone(),
                        });
                    }
                    self.collect_argument_issues(key, &call.arguments, &mut targets, &mut report);
                }

                // Heuristic back-fill only runs when arities differ; its
                // autowired service slots are dependency edges too.
                if arguments.len() != blueprint.parameters.len() {
                    for spec in &blueprint.parameters {
                        if let ParamTy::Service { type_name, .. } = &spec.ty {
                            targets.push((*type_name).to_string());
                        }
                    }
                }
            }

            edges.insert(key.to_string(), targets);
        }

        // Release the registry guards before the cycle walk re-reads the
        // alias table.
        drop(definitions);
        drop(aliases);
        drop(blueprints);

        self.detect_cycles(&edges, &mut report);
        report
    }

    fn collect_argument_issues(
        &self,
        service: &ServiceKey,
        arguments: &[Argument],
        targets: &mut Vec<String>,
        report: &mut ValidationReport,
    ) {
        for argument in arguments {
            match &argument.kind {
                ArgumentKind::Service(key) => targets.push(key.to_string()),
                ArgumentKind::Parameter(path) => {
                    if !self.has_parameter(path) {
                        report.errors.push(ValidationError::MissingParameter {
                            service: service.to_string(),
                            path: path.clone(),
                        });
                    }
                }
                ArgumentKind::List(items) => {
                    self.collect_argument_issues(service, items, targets, report);
                }
                ArgumentKind::Value(_) => {}
            }
        }
    }

    /// Depth-first search for cycles over the static dependency edges,
    /// following aliases to their canonical keys.
    fn detect_cycles(&self, edges: &HashMap<String, Vec<String>>, report: &mut ValidationReport) {
        let aliases = self.inner().aliases.read().unwrap();
        let canonical = |name: &str| -> String {
            let mut current = name.to_string();
            let mut hops = 0;
            while !edges.contains_key(&current) && hops < aliases.len() {
                match aliases.get(current.as_str()) {
                    Some(next) => {
                        current = next.to_string();
                        hops += 1;
                    }
                    None => break,
                }
            }
            current
        };

        let mut finished: HashSet<String> = HashSet::new();
        for start in edges.keys() {
            if finished.contains(start) {
                continue;
            }
            let mut stack: Vec<String> = Vec::new();
            self.visit(start, edges, &canonical, &mut stack, &mut finished, report);
        }
    }

    fn visit(
        &self,
        node: &str,
        edges: &HashMap<String, Vec<String>>,
        canonical: &dyn Fn(&str) -> String,
        stack: &mut Vec<String>,
        finished: &mut HashSet<String>,
        report: &mut ValidationReport,
    ) {
        if finished.contains(node) {
            return;
        }
        if let Some(position) = stack.iter().position(|entry| entry == node) {
            let mut cycle: Vec<String> = stack[position..].to_vec();
            cycle.push(node.to_string());
            if !report
                .errors
                .iter()
                .any(|e| matches!(e, ValidationError::CircularDependency { cycle: c } if sorted(c) == sorted(&cycle)))
            {
                report
                    .errors
                    .push(ValidationError::CircularDependency { cycle });
            }
            return;
        }

        let Some(targets) = edges.get(node) else {
            return;
        };
        stack.push(node.to_string());
        for target in targets {
            let target = canonical(target);
            self.visit(&target, edges, canonical, stack, finished, report);
        }
        stack.pop();
        finished.insert(node.to_string());
    }
}

fn sorted(cycle: &[String]) -> Vec<&String> {
    let mut entries: Vec<&String> = cycle.iter().collect();
    entries.sort();
    entries.dedup();
    entries
}
