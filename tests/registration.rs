use cinder_di::{
    key_of_type, Container, DiError, DiResult, Injectable, ParamSpec, ResolvedArgs,
    ServiceDefinition, ServiceKind,
};
use std::sync::Arc;

struct Widget {
    label: String,
}

impl Injectable for Widget {
    fn parameters() -> Vec<ParamSpec> {
        vec![ParamSpec::value_or("label", "default")]
    }

    fn construct(args: &mut ResolvedArgs) -> DiResult<Self> {
        Ok(Widget {
            label: args.take_string()?,
        })
    }
}

#[test]
fn has_covers_definitions_and_aliases() {
    let container = Container::new();
    assert!(!container.has("widget"));

    container.register::<Widget>("widget");
    assert!(container.has("widget"));
    // The class name aliases back to the key.
    assert!(container.has(key_of_type::<Widget>().as_str()));
}

#[test]
fn definition_alias_side_effect() {
    let container = Container::new();
    container.register_service(
        "widget",
        ServiceDefinition::new::<Widget>().with_alias("the-widget"),
    );

    assert!(container.has("the-widget"));
    let a = container.get::<Widget>("widget").unwrap();
    let b = container.get::<Widget>("the-widget").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn set_alias_requires_registered_target() {
    let container = Container::new();
    match container.set_alias("w", "widget") {
        Err(DiError::NotFound(key)) => assert_eq!(key, "widget"),
        other => panic!("expected NotFound, got {:?}", other),
    }

    container.register::<Widget>("widget");
    container.set_alias("w", "widget").unwrap();
    assert!(container.has("w"));
}

#[test]
fn alias_chains_resolve() {
    let container = Container::new();
    container.register::<Widget>("widget");
    container.set_alias("w1", "widget").unwrap();
    container.set_alias("w2", "w1").unwrap();

    let direct = container.get::<Widget>("widget").unwrap();
    let chained = container.get::<Widget>("w2").unwrap();
    assert!(Arc::ptr_eq(&direct, &chained));
}

#[test]
fn instance_registration_synthesizes_definition() {
    struct Prebuilt {
        id: u32,
    }

    let container = Container::new();
    container.register_instance("prebuilt", Prebuilt { id: 7 });

    assert!(container.has("prebuilt"));
    assert!(container.has(key_of_type::<Prebuilt>().as_str()));

    let value = container.get::<Prebuilt>("prebuilt").unwrap();
    assert_eq!(value.id, 7);

    // The type path reaches the same instance through the alias table.
    let by_type = container.get::<Prebuilt>(key_of_type::<Prebuilt>()).unwrap();
    assert!(Arc::ptr_eq(&value, &by_type));
}

#[test]
fn instance_overwrite_is_idempotent() {
    struct Counter {
        n: u32,
    }

    let container = Container::new();
    container.register_instance("counter", Counter { n: 1 });
    let first = container.get::<Counter>("counter").unwrap();
    assert_eq!(first.n, 1);

    container.register_instance("counter", Counter { n: 2 });
    let second = container.get::<Counter>("counter").unwrap();
    assert_eq!(second.n, 2);
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn typed_instance_derives_key_from_runtime_type() {
    struct AppConfig {
        env: &'static str,
    }

    let container = Container::new();
    container.register_typed_instance(AppConfig { env: "test" });

    let config = container.get::<AppConfig>(key_of_type::<AppConfig>()).unwrap();
    assert_eq!(config.env, "test");
}

#[test]
fn definition_overwrite_replaces_recipe() {
    let container = Container::new();
    container.register_service(
        "widget",
        ServiceDefinition::new::<Widget>()
            .with_argument(cinder_di::Argument::value("first").named("label")),
    );
    container.register_service(
        "widget",
        ServiceDefinition::new::<Widget>()
            .with_argument(cinder_di::Argument::value("second").named("label")),
    );

    let widget = container.get::<Widget>("widget").unwrap();
    assert_eq!(widget.label, "second");
}

#[test]
fn instance_cache_outlives_definition_overwrite() {
    let container = Container::new();
    container.register::<Widget>("widget");
    let built = container.get::<Widget>("widget").unwrap();

    // A later definition does not invalidate the already-cached instance.
    container.register_service(
        "widget",
        ServiceDefinition::new::<Widget>()
            .with_argument(cinder_di::Argument::value("replaced").named("label")),
    );
    let again = container.get::<Widget>("widget").unwrap();
    assert!(Arc::ptr_eq(&built, &again));
}

#[test]
fn descriptors_reflect_the_registry() {
    let container = Container::new();
    container.register::<Widget>("widget");
    container.register_factory("answer", |_| DiResult::Ok(42u32));
    container.register_instance("greeting", "hello".to_string());

    let descriptors = container.service_descriptors();
    assert_eq!(descriptors.len(), 3);

    let widget = descriptors.iter().find(|d| d.key == "widget").unwrap();
    assert_eq!(widget.kind, ServiceKind::Definition);
    assert!(widget.class.as_deref().unwrap().contains("Widget"));
    assert!(!widget.installed);

    let greeting = descriptors.iter().find(|d| d.key == "greeting").unwrap();
    assert_eq!(greeting.kind, ServiceKind::Instance);
    assert!(greeting.installed);

    let _ = container.get::<Widget>("widget").unwrap();
    let descriptors = container.service_descriptors();
    let widget = descriptors.iter().find(|d| d.key == "widget").unwrap();
    assert!(widget.installed);
}
