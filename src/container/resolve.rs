//! Service resolution: alias walking, instantiation, and argument matching.

use std::any::TypeId;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;

use crate::blueprint::{AnyArc, Injectable, ParamSpec, ParamTy, ResolvedArg, ResolvedArgs};
use crate::definition::{Argument, ArgumentKind, ServiceDefinition};
use crate::error::{DiError, DiResult};
use crate::internal::with_circular_catch;
use crate::key::{key_of_type, ServiceKey};

use super::{Container, Recipe, ResolverContext, ServiceEntry};

impl Container {
    /// Resolves the service registered under `key`, downcast to `T`.
    ///
    /// Repeated calls return the identical instance (`Arc::ptr_eq`); the
    /// first call through any alias pays for construction once and every
    /// later call is a map lookup.
    pub fn get<T: Send + Sync + 'static>(&self, key: impl Into<ServiceKey>) -> DiResult<Arc<T>> {
        let any = self.get_any(key)?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves the service registered under `key` without downcasting.
    ///
    /// The resolution path:
    ///
    /// 1. unknown key (neither definition nor alias) fails with `NotFound`;
    /// 2. an instance cached under the requested key returns immediately;
    /// 3. the alias table is walked to the canonical key, checking the
    ///    instance cache and memoizing at every hop actually visited;
    /// 4. otherwise the canonical definition is constructed — at most once
    ///    per key, even under concurrent callers — and the result is cached
    ///    under both the canonical and the requested key.
    pub fn get_any(
        &self,
        key: impl Into<ServiceKey>,
    ) -> DiResult<Arc<dyn std::any::Any + Send + Sync>> {
        let requested = key.into();

        if !self.has(requested.as_str()) {
            return Err(DiError::NotFound(requested.to_string()));
        }

        if let Some(hit) = self.inner().instances.read().unwrap().get(&requested) {
            return Ok(hit.clone());
        }

        let mut visited: Vec<ServiceKey> = vec![requested.clone()];
        let mut canonical = requested.clone();
        loop {
            if self
                .inner()
                .definitions
                .read()
                .unwrap()
                .contains_key(&canonical)
            {
                break;
            }
            let next = match self.inner().aliases.read().unwrap().get(&canonical) {
                Some(next) => next.clone(),
                // Dangling alias: only surfaced here, at resolution time.
                None => return Err(DiError::NotFound(requested.to_string())),
            };
            if next == canonical || visited.contains(&next) {
                return Err(DiError::NotFound(requested.to_string()));
            }
            if let Some(hit) = self.inner().instances.read().unwrap().get(&next) {
                let value = hit.clone();
                self.memoize(&visited, &value);
                return Ok(value);
            }
            visited.push(next.clone());
            canonical = next;
        }

        if let Some(hit) = self.inner().instances.read().unwrap().get(&canonical) {
            let value = hit.clone();
            self.memoize(&visited, &value);
            return Ok(value);
        }

        let entry = match self.inner().definitions.read().unwrap().get(&canonical) {
            Some(entry) => entry.clone(),
            None => return Err(DiError::NotFound(requested.to_string())),
        };

        let value = self.construct_entry(&canonical, &entry)?;
        self.memoize(&visited, &value);
        Ok(value)
    }

    /// Resolves a service by its type, autowiring it when unknown.
    ///
    /// When no service answers to the type's key, the type is registered on
    /// the fly (`class` = type path) and constructed from its declared
    /// parameters — afterwards `has` reports the type key as registered.
    pub fn get_type<T: Injectable>(&self) -> DiResult<Arc<T>> {
        let key = key_of_type::<T>();
        if !self.has(key.as_str()) {
            self.register_type::<T>();
            self.register_definition_if_absent(
                key.clone(),
                ServiceDefinition::for_class(std::any::type_name::<T>()),
            );
        }
        self.get(key)
    }

    /// Populate the instance cache for every key visited during resolution.
    fn memoize(&self, keys: &[ServiceKey], value: &AnyArc) {
        let mut instances = self.inner().instances.write().unwrap();
        for key in keys {
            instances.insert(key.clone(), value.clone());
        }
    }

    /// Auto-registration entry point: inserts a definition only when the
    /// key is still free, so concurrent autowiring never replaces an entry
    /// another thread is already constructing from.
    pub(crate) fn register_definition_if_absent(
        &self,
        key: ServiceKey,
        definition: ServiceDefinition,
    ) {
        let ServiceDefinition {
            class,
            arguments,
            calls,
            ..
        } = definition;

        let mut definitions = self.inner().definitions.write().unwrap();
        if definitions.contains_key(&key) {
            return;
        }
        definitions.insert(
            key,
            Arc::new(ServiceEntry {
                class: Some(class.clone()),
                recipe: Recipe::Definition {
                    class,
                    arguments,
                    calls,
                },
                cell: OnceCell::new(),
            }),
        );
    }

    fn construct_entry(&self, key: &ServiceKey, entry: &ServiceEntry) -> DiResult<AnyArc> {
        let observers = &self.inner().observers;
        if observers.is_empty() {
            return self.construct_guarded(key, entry);
        }

        observers.resolving(key);
        let start = Instant::now();
        match self.construct_guarded(key, entry) {
            Ok(value) => {
                observers.resolved(key, start.elapsed());
                Ok(value)
            }
            Err(error) => {
                observers.failed(key, &error);
                Err(error)
            }
        }
    }

    /// At-most-once construction: the cycle guard is entered before the
    /// cell so a re-entrant resolution of the same key on this thread is
    /// reported as a circular reference instead of deadlocking the cell.
    fn construct_guarded(&self, key: &ServiceKey, entry: &ServiceEntry) -> DiResult<AnyArc> {
        with_circular_catch(key, || {
            entry
                .cell
                .get_or_try_init(|| self.instantiate(entry))
                .cloned()
        })
    }

    fn instantiate(&self, entry: &ServiceEntry) -> DiResult<AnyArc> {
        match &entry.recipe {
            Recipe::Instance(value) => Ok(value.clone()),
            Recipe::Factory(factory) => {
                let ctx = ResolverContext::new(self);
                factory(&ctx)
            }
            Recipe::Definition {
                class,
                arguments,
                calls,
            } => {
                let blueprint = match self.inner().blueprints.read().unwrap().get(class) {
                    Some(blueprint) => blueprint.clone(),
                    None => return Err(DiError::NotInstantiable(class.clone())),
                };

                let mut args =
                    self.resolve_arguments(arguments, &blueprint.parameters, blueprint.type_name)?;
                let mut value = (blueprint.ctor)(&mut args)?;

                // Every configured call runs, in declaration order, against
                // the still-mutable instance before it is cached.
                for call in calls {
                    let method = blueprint.methods.get(call.method.as_str()).ok_or_else(|| {
                        DiError::UnknownMethod {
                            class: class.clone(),
                            method: call.method.clone(),
                        }
                    })?;
                    let mut call_args = self.resolve_arguments(
                        &call.arguments,
                        &method.parameters,
                        blueprint.type_name,
                    )?;
                    (method.invoke)(value.as_mut(), &mut call_args)?;
                }

                Ok(Arc::from(value))
            }
        }
    }

    /// Matches explicit argument definitions against declared parameters.
    ///
    /// When the explicit count equals the declared count the explicit list
    /// is used positionally, unchanged. Otherwise each declared parameter is
    /// back-filled in order: a type-matching explicit service first, then a
    /// name-matching explicit value, then — for service slots — autowiring
    /// the declared type; value slots fall back to their declared default.
    pub(crate) fn resolve_arguments(
        &self,
        explicit: &[Argument],
        declared: &[ParamSpec],
        target: &'static str,
    ) -> DiResult<ResolvedArgs> {
        let mut resolved_explicit: Vec<(Option<String>, ResolvedArg)> =
            Vec::with_capacity(explicit.len());
        for argument in explicit {
            resolved_explicit.push((argument.name.clone(), self.resolve_argument(argument)?));
        }

        // Exact arity, or nothing declared to match against: the explicit
        // list is the final positional argument list.
        if explicit.len() == declared.len() || declared.is_empty() {
            let values = resolved_explicit.into_iter().map(|(_, arg)| arg).collect();
            return Ok(ResolvedArgs::new(target, values));
        }

        let mut resolved = Vec::with_capacity(declared.len());
        for spec in declared {
            let slot = match &spec.ty {
                ParamTy::Service { id, type_name } => {
                    if let Some((_, arg)) = resolved_explicit
                        .iter()
                        .find(|(_, arg)| service_matches(arg, *id))
                    {
                        arg.clone()
                    } else if let Some((_, arg)) = resolved_explicit.iter().find(|(name, arg)| {
                        name.as_deref() == Some(spec.name)
                            && !matches!(arg, ResolvedArg::Service(_))
                    }) {
                        arg.clone()
                    } else {
                        self.resolve_service_by_type(type_name)?
                    }
                }
                ParamTy::Value { default } => {
                    if let Some((_, arg)) = resolved_explicit
                        .iter()
                        .find(|(name, _)| name.as_deref() == Some(spec.name))
                    {
                        arg.clone()
                    } else if let Some(default) = default {
                        ResolvedArg::Value(default.clone())
                    } else {
                        return Err(DiError::MissingArgument {
                            target: target.to_string(),
                            parameter: spec.name.to_string(),
                        });
                    }
                }
            };
            resolved.push(slot);
        }

        Ok(ResolvedArgs::new(target, resolved))
    }

    fn resolve_argument(&self, argument: &Argument) -> DiResult<ResolvedArg> {
        match &argument.kind {
            ArgumentKind::Value(value) => Ok(ResolvedArg::Value(value.clone())),
            ArgumentKind::Service(key) => Ok(ResolvedArg::Service(self.get_any(key.clone())?)),
            ArgumentKind::Parameter(path) => {
                Ok(ResolvedArg::Value(self.get_parameter(path)?))
            }
            ArgumentKind::List(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    resolved.push(self.resolve_argument(item)?);
                }
                Ok(ResolvedArg::List(resolved))
            }
        }
    }

    /// The autowiring convenience: resolve a declared type as a service,
    /// registering it on the fly when its blueprint is known.
    fn resolve_service_by_type(&self, type_name: &'static str) -> DiResult<ResolvedArg> {
        let key = ServiceKey::from(type_name);
        if !self.has(type_name) {
            if !self
                .inner()
                .blueprints
                .read()
                .unwrap()
                .contains_key(type_name)
            {
                return Err(DiError::NotInstantiable(type_name.to_string()));
            }
            self.register_definition_if_absent(key.clone(), ServiceDefinition::for_class(type_name));
        }
        Ok(ResolvedArg::Service(self.get_any(key)?))
    }
}

fn service_matches(arg: &ResolvedArg, id: TypeId) -> bool {
    match arg {
        ResolvedArg::Service(value) => (**value).type_id() == id,
        _ => false,
    }
}
