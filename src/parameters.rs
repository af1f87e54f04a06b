//! Parameter storage with dotted-path lookup and transitive references.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{DiError, DiResult};
use crate::value::ParamValue;

/// Storage for configuration parameters.
///
/// Keys registered here are retrievable by dotted path: a value stored under
/// `"database"` as an object with a `"host"` entry answers to
/// `"database.host"`, and a value stored flat under `"database.host"`
/// answers to the same path directly. String values of the form `%other%`
/// resolve transitively at lookup time. Fully-resolved values are cached per
/// full path string; registration invalidates the cache, which is cheap
/// because writes are rare and front-loaded.
///
/// Re-registering an existing key merges additively rather than replacing:
/// a non-array value is coerced into an array and the new value appended.
pub(crate) struct ParameterBag {
    values: RwLock<HashMap<String, ParamValue>>,
    resolved: RwLock<HashMap<String, ParamValue>>,
}

impl ParameterBag {
    pub(crate) fn new() -> Self {
        ParameterBag {
            values: RwLock::new(HashMap::new()),
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Store `value` under `key`, merging additively when the key exists.
    pub(crate) fn register(&self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        {
            let mut store = self.values.write().unwrap();
            match store.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(mut slot) => merge(slot.get_mut(), value),
            }
        }
        // Resolved values may embed the merged key transitively.
        self.resolved.write().unwrap().clear();
    }

    /// Look up and fully resolve the value at `path`.
    pub(crate) fn get(&self, path: &str) -> DiResult<ParamValue> {
        if let Some(cached) = self.resolved.read().unwrap().get(path) {
            return Ok(cached.clone());
        }

        let raw = self.lookup(path)?;
        let mut chain = vec![path.to_string()];
        let value = self.expand(raw, &mut chain)?;

        self.resolved
            .write()
            .unwrap()
            .insert(path.to_string(), value.clone());
        Ok(value)
    }

    /// Whether `path` resolves to a value.
    pub(crate) fn has(&self, path: &str) -> bool {
        self.get(path).is_ok()
    }

    /// Structural lookup: exact key first, then dotted traversal through
    /// nested objects.
    fn lookup(&self, path: &str) -> DiResult<ParamValue> {
        let store = self.values.read().unwrap();
        if let Some(value) = store.get(path) {
            return Ok(value.clone());
        }

        let mut segments = path.split('.');
        let head = segments.next().unwrap_or_default();
        let mut current = store
            .get(head)
            .cloned()
            .ok_or_else(|| DiError::ParameterNotFound(path.to_string()))?;
        drop(store);

        for segment in segments {
            current = match current {
                ParamValue::Object(mut map) => map
                    .remove(segment)
                    .ok_or_else(|| DiError::ParameterNotFound(path.to_string()))?,
                _ => return Err(DiError::ParameterNotFound(path.to_string())),
            };
        }
        Ok(current)
    }

    /// Resolve `%ref%` strings transitively, descending into arrays and
    /// objects. `chain` carries the reference path for cycle reporting.
    fn expand(&self, value: ParamValue, chain: &mut Vec<String>) -> DiResult<ParamValue> {
        match value {
            ParamValue::String(s) => {
                if let Some(target) = reference_target(&s) {
                    if chain.iter().any(|seen| seen == target) {
                        let mut path = chain.clone();
                        path.push(target.to_string());
                        return Err(DiError::Circular(path));
                    }
                    chain.push(target.to_string());
                    let raw = self.lookup(target)?;
                    let resolved = self.expand(raw, chain)?;
                    chain.pop();
                    Ok(resolved)
                } else {
                    Ok(ParamValue::String(s))
                }
            }
            ParamValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.expand(item, chain)?);
                }
                Ok(ParamValue::Array(out))
            }
            ParamValue::Object(map) => {
                let mut out = HashMap::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k, self.expand(v, chain)?);
                }
                Ok(ParamValue::Object(out))
            }
            other => Ok(other),
        }
    }
}

/// The referenced path when `s` is of the form `%path%`.
fn reference_target(s: &str) -> Option<&str> {
    if s.len() > 2 && s.starts_with('%') && s.ends_with('%') {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

/// Additive merge: arrays append, everything else is coerced into an array
/// first. Replacement is deliberately not offered — callers wanting a fresh
/// value must use a fresh key.
fn merge(existing: &mut ParamValue, incoming: ParamValue) {
    if let ParamValue::Array(items) = existing {
        match incoming {
            ParamValue::Array(more) => items.extend(more),
            other => items.push(other),
        }
        return;
    }

    let old = std::mem::replace(existing, ParamValue::Null);
    let mut items = vec![old];
    match incoming {
        ParamValue::Array(more) => items.extend(more),
        other => items.push(other),
    }
    *existing = ParamValue::Array(items);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_key_lookup() {
        let bag = ParameterBag::new();
        bag.register("db.host", "localhost");
        assert_eq!(bag.get("db.host").unwrap(), ParamValue::from("localhost"));
    }

    #[test]
    fn nested_object_traversal() {
        let bag = ParameterBag::new();
        let mut db = HashMap::new();
        db.insert("host".to_string(), ParamValue::from("localhost"));
        db.insert("port".to_string(), ParamValue::from(5432));
        bag.register("database", ParamValue::Object(db));

        assert_eq!(
            bag.get("database.host").unwrap(),
            ParamValue::from("localhost")
        );
        assert_eq!(bag.get("database.port").unwrap(), ParamValue::from(5432));
        assert!(matches!(
            bag.get("database.missing"),
            Err(DiError::ParameterNotFound(_))
        ));
    }

    #[test]
    fn transitive_references() {
        let bag = ParameterBag::new();
        bag.register("primary", "%fallback%");
        bag.register("fallback", "value");
        assert_eq!(bag.get("primary").unwrap(), ParamValue::from("value"));
    }

    #[test]
    fn reference_cycle_is_an_error() {
        let bag = ParameterBag::new();
        bag.register("a", "%b%");
        bag.register("b", "%a%");
        assert!(matches!(bag.get("a"), Err(DiError::Circular(_))));
    }

    #[test]
    fn additive_merge_preserves_order() {
        let bag = ParameterBag::new();
        bag.register("tags", "a");
        bag.register("tags", "b");
        bag.register("tags", ParamValue::Array(vec!["c".into(), "d".into()]));
        assert_eq!(
            bag.get("tags").unwrap(),
            ParamValue::Array(vec!["a".into(), "b".into(), "c".into(), "d".into()])
        );
    }

    #[test]
    fn registration_invalidates_cache() {
        let bag = ParameterBag::new();
        bag.register("greeting", "hello");
        assert_eq!(bag.get("greeting").unwrap(), ParamValue::from("hello"));
        bag.register("greeting", "world");
        assert_eq!(
            bag.get("greeting").unwrap(),
            ParamValue::Array(vec!["hello".into(), "world".into()])
        );
    }
}
