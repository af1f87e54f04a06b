//! Property-based tests for parameter storage and argument classification.

use cinder_di::{Argument, Container, ParamValue};
use proptest::prelude::*;

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

fn plain_text() -> impl Strategy<Value = String> {
    // Literal strings free of reference markers.
    "[a-zA-Z0-9 _.:/-]{0,24}"
}

proptest! {
    // Registering the same key repeatedly accumulates every value, in order.
    #[test]
    fn additive_merge_keeps_every_value(key in ident(), values in prop::collection::vec(plain_text(), 2..8)) {
        let container = Container::new();
        for value in &values {
            container.register_parameter(key.clone(), value.clone());
        }

        let expected: Vec<ParamValue> = values.iter().map(|v| ParamValue::from(v.clone())).collect();
        prop_assert_eq!(container.get_parameter(&key).unwrap(), ParamValue::Array(expected));
    }

    // A value registered under a dotted key comes back exactly, however many
    // segments the key has.
    #[test]
    fn dotted_keys_round_trip(segments in prop::collection::vec(ident(), 1..4), value in plain_text()) {
        let path = segments.join(".");
        let container = Container::new();
        container.register_parameter(path.clone(), value.clone());

        prop_assert_eq!(container.get_parameter(&path).unwrap(), ParamValue::from(value));
        prop_assert!(container.has_parameter(&path));
    }

    // A missing path is reported consistently by both accessors.
    #[test]
    fn missing_paths_are_consistent(path in ident(), probe in ident()) {
        prop_assume!(path != probe);
        let container = Container::new();
        container.register_parameter(path, "present");

        prop_assert!(!container.has_parameter(&probe));
        prop_assert!(container.get_parameter(&probe).is_err());
    }

    // Marker classification: `@x` is a service reference, `%x%` a parameter
    // reference, and unmarked text a literal.
    #[test]
    fn argument_markers_classify(name in ident()) {
        let service = Argument::parse(&format!("@{}", name));
        prop_assert_eq!(service, Argument::service(name.as_str()));

        let parameter = Argument::parse(&format!("%{}%", name));
        prop_assert_eq!(parameter, Argument::parameter(name.clone()));

        let literal = Argument::parse(&name);
        prop_assert_eq!(literal, Argument::value(name.as_str()));
    }

    // Single registrations stay scalar; the array coercion only happens on
    // the second registration of a key.
    #[test]
    fn first_registration_stays_scalar(key in ident(), value in plain_text()) {
        let container = Container::new();
        container.register_parameter(key.clone(), value.clone());
        prop_assert_eq!(container.get_parameter(&key).unwrap(), ParamValue::from(value));
    }
}
