use proptest::prelude::*;
use transit_core::query::{namespace_for, serialize};
use transit_core::{classify, ArgValue, Arguments, Namespace, Operation};

fn endpoints() -> impl Strategy<Value = &'static str> {
    prop::sample::select(Operation::ALL.map(Operation::endpoint).to_vec())
}

fn value() -> impl Strategy<Value = ArgValue> {
    prop_oneof![
        "[A-Za-z0-9_-]{1,12}".prop_map(ArgValue::Text),
        (1i64..10_000).prop_map(ArgValue::Integer),
        prop::collection::vec("[A-Za-z0-9-]{1,8}", 1..4).prop_map(ArgValue::List),
    ]
}

proptest! {
    #[test]
    fn bare_names_pass_through(endpoint in endpoints(), name in prop::sample::select(vec!["sort", "include"]), v in value()) {
        let out = classify(endpoint, &Arguments::new().set(name, v.clone())).unwrap();
        let expected = serialize(&v);
        prop_assert_eq!(out.len(), 1);
        prop_assert_eq!(out.get(name), expected.as_ref());
    }

    #[test]
    fn paging_names_are_paginated(endpoint in endpoints(), name in prop::sample::select(vec!["offset", "limit"]), v in value()) {
        let out = classify(endpoint, &Arguments::new().set(name, v.clone())).unwrap();
        let expected = serialize(&v);
        prop_assert_eq!(out.get(&format!("page[{name}]")), expected.as_ref());
    }

    #[test]
    fn field_selectors_ignore_endpoint(
        endpoint in endpoints(),
        name in prop::sample::select(vec!["alert", "line", "prediction", "schedule", "shape", "vehicle"]),
        v in value(),
    ) {
        let out = classify(endpoint, &Arguments::new().set(name, v.clone())).unwrap();
        let expected = serialize(&v);
        prop_assert_eq!(out.get(&format!("fields[{name}]")), expected.as_ref());
    }

    #[test]
    fn every_key_has_one_namespace(endpoint in endpoints(), name in "[a-z_]{1,16}", v in value()) {
        let out = classify(endpoint, &Arguments::new().set(&name, v)).unwrap();
        prop_assert_eq!(out.len(), 1);
        let (key, value) = out.iter().next().unwrap();
        prop_assert!(!value.is_empty());
        let namespace = namespace_for(endpoint, &name);
        prop_assert_eq!(Namespace::of_key(key), namespace);
        let expected_key = namespace.key(&name);
        prop_assert_eq!(key, &expected_key);
    }

    #[test]
    fn classify_is_pure(endpoint in endpoints(), pairs in prop::collection::vec(("[a-z_]{1,10}", value()), 0..6)) {
        let args: Arguments = pairs.into_iter().collect();
        prop_assert_eq!(classify(endpoint, &args).unwrap(), classify(endpoint, &args).unwrap());
    }
}
