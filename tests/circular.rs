use cinder_di::{
    Container, DiError, DiResult, Injectable, ParamSpec, ResolvedArgs, ServiceDefinition,
};
use std::sync::Arc;

#[test]
fn factory_cycle_is_detected() {
    struct A(#[allow(dead_code)] Arc<B>);
    struct B(#[allow(dead_code)] Arc<A>);

    let container = Container::new();
    container.register_factory("a", |ctx| DiResult::Ok(A(ctx.get::<B>("b")?)));
    container.register_factory("b", |ctx| DiResult::Ok(B(ctx.get::<A>("a")?)));

    match container.get::<A>("a") {
        Err(DiError::Circular(path)) => {
            assert_eq!(path, vec!["a", "b", "a"]);
        }
        other => panic!("expected circular error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn self_cycle_is_detected() {
    struct Selfish;

    let container = Container::new();
    container.register_factory("selfish", |ctx| {
        let _ = ctx.get::<Selfish>("selfish")?;
        DiResult::Ok(Selfish)
    });

    match container.get::<Selfish>("selfish") {
        Err(DiError::Circular(path)) => {
            assert_eq!(path, vec!["selfish", "selfish"]);
        }
        other => panic!("expected circular error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn definition_cycle_is_detected() {
    struct Alpha(#[allow(dead_code)] Arc<Beta>);
    struct Beta(#[allow(dead_code)] Arc<Alpha>);

    impl Injectable for Alpha {
        fn parameters() -> Vec<ParamSpec> {
            vec![ParamSpec::service::<Beta>("beta")]
        }

        fn construct(args: &mut ResolvedArgs) -> DiResult<Self> {
            Ok(Alpha(args.take_service()?))
        }
    }

    impl Injectable for Beta {
        fn parameters() -> Vec<ParamSpec> {
            vec![ParamSpec::service::<Alpha>("alpha")]
        }

        fn construct(args: &mut ResolvedArgs) -> DiResult<Self> {
            Ok(Beta(args.take_service()?))
        }
    }

    let container = Container::new();
    container.register_service("alpha", ServiceDefinition::new::<Alpha>());
    container.register_service("beta", ServiceDefinition::new::<Beta>());

    assert!(matches!(
        container.get_any("alpha"),
        Err(DiError::Circular(_))
    ));
}

#[test]
fn resolution_recovers_after_a_cycle_failure() {
    struct A(#[allow(dead_code)] Arc<B>);
    struct B(#[allow(dead_code)] Arc<A>);
    struct Healthy;

    let container = Container::new();
    container.register_factory("a", |ctx| DiResult::Ok(A(ctx.get::<B>("b")?)));
    container.register_factory("b", |ctx| DiResult::Ok(B(ctx.get::<A>("a")?)));
    container.register_factory("healthy", |_| DiResult::Ok(Healthy));

    assert!(matches!(
        container.get::<A>("a"),
        Err(DiError::Circular(_))
    ));

    // The in-progress markers from the failed resolution must be gone.
    assert!(container.get::<Healthy>("healthy").is_ok());
    assert!(matches!(
        container.get::<A>("a"),
        Err(DiError::Circular(_))
    ));
}

#[test]
fn diamond_graphs_are_not_cycles() {
    struct Shared;
    struct Left(#[allow(dead_code)] Arc<Shared>);
    struct Right(#[allow(dead_code)] Arc<Shared>);
    struct Top {
        left: Arc<Left>,
        right: Arc<Right>,
    }

    let container = Container::new();
    container.register_factory("shared", |_| DiResult::Ok(Shared));
    container.register_factory("left", |ctx| DiResult::Ok(Left(ctx.get::<Shared>("shared")?)));
    container.register_factory("right", |ctx| {
        DiResult::Ok(Right(ctx.get::<Shared>("shared")?))
    });
    container.register_factory("top", |ctx| {
        DiResult::Ok(Top {
            left: ctx.get::<Left>("left")?,
            right: ctx.get::<Right>("right")?,
        })
    });

    let top = container.get::<Top>("top").unwrap();
    assert!(Arc::ptr_eq(&top.left.0, &top.right.0));
}

#[test]
fn validate_reports_static_cycles() {
    use cinder_di::{Argument, ValidationError};

    struct Chicken;
    struct Egg;

    impl Injectable for Chicken {
        fn construct(_args: &mut ResolvedArgs) -> DiResult<Self> {
            Ok(Chicken)
        }
    }

    impl Injectable for Egg {
        fn construct(_args: &mut ResolvedArgs) -> DiResult<Self> {
            Ok(Egg)
        }
    }

    let container = Container::new();
    container.register_service(
        "chicken",
        ServiceDefinition::new::<Chicken>().with_argument(Argument::service("egg")),
    );
    container.register_service(
        "egg",
        ServiceDefinition::new::<Egg>().with_argument(Argument::service("chicken")),
    );

    let report = container.validate();
    assert!(report
        .errors
        .iter()
        .any(|e| matches!(e, ValidationError::CircularDependency { .. })));
}
