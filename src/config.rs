//! JSON configuration loading for parameters and service definitions.
//!
//! A configuration document has two optional top-level sections:
//!
//! ```json
//! {
//!   "parameters": {
//!     "database": { "host": "localhost", "port": 5432 },
//!     "app.name": "demo"
//!   },
//!   "services": {
//!     "database": {
//!       "class": "app::Database",
//!       "arguments": ["%database.host%", "%database.port%"],
//!       "calls": [ { "method": "warm_up", "arguments": [] } ],
//!       "alias": "db"
//!     }
//!   }
//! }
//! ```
//!
//! Strings in argument position are classified by their marker (`@service`,
//! `%parameter%`, literal otherwise); an object in argument position expands
//! into named arguments for the back-fill heuristic. Classes referenced here
//! must be made loadable with
//! [`Container::register_type`](crate::Container::register_type) before the
//! services are first resolved.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::container::Container;
use crate::definition::{Argument, MethodCall, ServiceDefinition};
use crate::error::{DiError, DiResult};
use crate::value::ParamValue;

/// Applies a JSON configuration document to the container.
pub fn load_json_str(container: &Container, document: &str) -> DiResult<()> {
    let root: JsonValue = serde_json::from_str(document)
        .map_err(|e| DiError::Configuration(format!("invalid JSON document: {}", e)))?;

    let JsonValue::Object(root) = root else {
        return Err(DiError::Configuration(
            "top level of a configuration document must be an object".to_string(),
        ));
    };

    if let Some(parameters) = root.get("parameters") {
        let JsonValue::Object(parameters) = parameters else {
            return Err(DiError::Configuration(
                "`parameters` must be an object".to_string(),
            ));
        };
        for (key, value) in parameters {
            container.register_parameter(key.clone(), param_value(value));
        }
    }

    if let Some(services) = root.get("services") {
        let JsonValue::Object(services) = services else {
            return Err(DiError::Configuration(
                "`services` must be an object".to_string(),
            ));
        };
        for (key, raw) in services {
            let definition = service_definition(key, raw)?;
            container.register_service(key.as_str(), definition);
        }
    }

    Ok(())
}

/// Reads and applies a JSON configuration file.
pub fn load_json_file(container: &Container, path: impl AsRef<Path>) -> DiResult<()> {
    let path = path.as_ref();
    let document = std::fs::read_to_string(path)
        .map_err(|e| DiError::Configuration(format!("cannot read {}: {}", path.display(), e)))?;
    load_json_str(container, &document)
}

fn service_definition(key: &str, raw: &JsonValue) -> DiResult<ServiceDefinition> {
    let JsonValue::Object(raw) = raw else {
        return Err(DiError::Configuration(format!(
            "service `{}` must be an object",
            key
        )));
    };

    let class = raw
        .get("class")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| {
            DiError::Configuration(format!("service `{}` is missing a `class` string", key))
        })?;

    let mut definition = ServiceDefinition::for_class(class);

    if let Some(arguments) = raw.get("arguments") {
        definition = definition.with_arguments(argument_list(key, arguments)?);
    }

    if let Some(calls) = raw.get("calls") {
        let JsonValue::Array(calls) = calls else {
            return Err(DiError::Configuration(format!(
                "service `{}`: `calls` must be an array",
                key
            )));
        };
        for call in calls {
            definition = definition.with_call(method_call(key, call)?);
        }
    }

    if let Some(alias) = raw.get("alias") {
        let alias = alias.as_str().ok_or_else(|| {
            DiError::Configuration(format!("service `{}`: `alias` must be a string", key))
        })?;
        definition = definition.with_alias(alias);
    }

    Ok(definition)
}

fn method_call(service: &str, raw: &JsonValue) -> DiResult<MethodCall> {
    let JsonValue::Object(raw) = raw else {
        return Err(DiError::Configuration(format!(
            "service `{}`: each call must be an object",
            service
        )));
    };

    let method = raw
        .get("method")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| {
            DiError::Configuration(format!(
                "service `{}`: call is missing a `method` string",
                service
            ))
        })?;

    let mut call = MethodCall::new(method);
    if let Some(arguments) = raw.get("arguments") {
        call = call.with_arguments(argument_list(service, arguments)?);
    }
    Ok(call)
}

fn argument_list(service: &str, raw: &JsonValue) -> DiResult<Vec<Argument>> {
    let JsonValue::Array(raw) = raw else {
        return Err(DiError::Configuration(format!(
            "service `{}`: `arguments` must be an array",
            service
        )));
    };

    let mut arguments = Vec::with_capacity(raw.len());
    for element in raw {
        match element {
            // An object in argument position is a named-argument map.
            JsonValue::Object(map) => {
                for (name, value) in map {
                    arguments.push(argument(value).named(name.clone()));
                }
            }
            other => arguments.push(argument(other)),
        }
    }
    Ok(arguments)
}

fn argument(raw: &JsonValue) -> Argument {
    match raw {
        JsonValue::String(s) => Argument::parse(s),
        JsonValue::Array(items) => Argument::list(items.iter().map(argument)),
        other => Argument::value(param_value(other)),
    }
}

fn param_value(raw: &JsonValue) -> ParamValue {
    match raw {
        JsonValue::Null => ParamValue::Null,
        JsonValue::Bool(b) => ParamValue::Boolean(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                ParamValue::Integer(i)
            } else {
                ParamValue::Float(n.as_f64().unwrap_or_default())
            }
        }
        JsonValue::String(s) => ParamValue::String(s.clone()),
        JsonValue::Array(items) => ParamValue::Array(items.iter().map(param_value).collect()),
        JsonValue::Object(map) => {
            let mut out = HashMap::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), param_value(v));
            }
            ParamValue::Object(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{Injectable, ParamSpec, ResolvedArgs};

    struct Database {
        host: String,
        port: i64,
    }

    impl Injectable for Database {
        fn parameters() -> Vec<ParamSpec> {
            vec![ParamSpec::value("host"), ParamSpec::value("port")]
        }

        fn construct(args: &mut ResolvedArgs) -> DiResult<Self> {
            Ok(Database {
                host: args.take_string()?,
                port: args.take_i64()?,
            })
        }
    }

    #[test]
    fn loads_parameters_and_services() {
        let container = Container::new();
        container.register_type::<Database>();

        let document = format!(
            r#"{{
                "parameters": {{
                    "database": {{ "host": "localhost", "port": 5432 }}
                }},
                "services": {{
                    "database": {{
                        "class": "{class}",
                        "arguments": ["%database.host%", "%database.port%"],
                        "alias": "db"
                    }}
                }}
            }}"#,
            class = std::any::type_name::<Database>()
        );

        load_json_str(&container, &document).unwrap();

        assert_eq!(
            container.get_parameter("database.host").unwrap(),
            ParamValue::from("localhost")
        );

        let db = container.get::<Database>("db").unwrap();
        assert_eq!(db.host, "localhost");
        assert_eq!(db.port, 5432);
    }

    #[test]
    fn rejects_malformed_documents() {
        let container = Container::new();
        assert!(matches!(
            load_json_str(&container, "not json"),
            Err(DiError::Configuration(_))
        ));
        assert!(matches!(
            load_json_str(&container, r#"{"services": {"x": {"arguments": []}}}"#),
            Err(DiError::Configuration(_))
        ));
    }

    #[test]
    fn named_argument_objects_expand() {
        let document = r#"{
            "services": {
                "svc": {
                    "class": "app::Svc",
                    "arguments": [ { "host": "localhost", "port": 99 } ]
                }
            }
        }"#;
        let container = Container::new();
        load_json_str(&container, document).unwrap();
        assert!(container.has("svc"));
    }
}
