//! Property-based tests for the pointer codec and the path resolver
//!
//! These tests verify that pointers round-trip and that resolution always
//! terminates with a pointer that addresses the returned subschema.

use proptest::prelude::*;
use serde_json::{json, Value};
use schemanav_schemas::pointer::{self, PathSegment};
use schemanav_schemas::resolver::{lookup, resolve};

/// Segments: names with pointer-special characters, or indices.
/// Names never contain digits, so they cannot look like indices.
fn segment_strategy() -> impl Strategy<Value = PathSegment> {
    prop_oneof![
        "[a-zA-Z~/_ .$-]{0,12}".prop_map(PathSegment::Key),
        (0usize..10_000).prop_map(PathSegment::Index),
    ]
}

fn path_strategy() -> impl Strategy<Value = Vec<PathSegment>> {
    proptest::collection::vec(segment_strategy(), 0..8)
}

/// Small schemas built from the keywords the resolver understands,
/// with same-document references that may form cycles
fn schema_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(json!(true)),
        Just(json!(false)),
        Just(json!({"type": "string"})),
        prop_oneof![
            Just("#"),
            Just("#/properties/a"),
            Just("#/$defs/node"),
            Just("#/allOf/0"),
            Just("#/missing"),
            Just("other.json#/x"),
        ]
        .prop_map(|target| json!({ "$ref": target })),
    ];

    leaf.prop_recursive(4, 32, 4, |inner| {
        let keyword = prop_oneof![
            Just("items"),
            Just("contains"),
            Just("additionalProperties"),
            Just("unevaluatedItems"),
            Just("then"),
            Just("else"),
        ];
        prop_oneof![
            proptest::collection::btree_map("[ab]", inner.clone(), 0..3)
                .prop_map(|m| json!({ "properties": Value::Object(m.into_iter().collect()) })),
            proptest::collection::vec(inner.clone(), 0..3).prop_map(|v| json!({ "allOf": v })),
            proptest::collection::vec(inner.clone(), 0..3).prop_map(|v| json!({ "prefixItems": v })),
            (keyword, inner.clone()).prop_map(|(k, s)| json!({ k: s })),
            (inner.clone(), inner).prop_map(|(root, node)| {
                let mut root = match root {
                    Value::Object(map) => map,
                    _ => serde_json::Map::new(),
                };
                root.insert("$defs".to_string(), json!({ "node": node }));
                Value::Object(root)
            }),
        ]
    })
}

fn resolvable_path_strategy() -> impl Strategy<Value = Vec<PathSegment>> {
    proptest::collection::vec(
        prop_oneof![
            Just(PathSegment::from("a")),
            Just(PathSegment::from("b")),
            Just(PathSegment::from("c")),
            (0usize..3).prop_map(PathSegment::Index),
        ],
        0..6,
    )
}

proptest! {
    #[test]
    fn prop_decode_encode_round_trip(path in path_strategy()) {
        prop_assert_eq!(pointer::decode(&pointer::encode(&path)), path.clone());
        prop_assert_eq!(pointer::decode(&pointer::to_instance_pointer(&path)), path);
    }

    #[test]
    fn prop_encoded_pointers_are_valid(path in path_strategy()) {
        prop_assert!(pointer::validate(&pointer::encode(&path)).is_ok());
    }

    #[test]
    fn prop_join_matches_encode(base in path_strategy(), tail in path_strategy()) {
        let joined = pointer::join(&pointer::encode(&base), &tail);
        let mut full = base;
        full.extend(tail);
        prop_assert_eq!(joined, pointer::encode(&full));
    }

    #[test]
    fn prop_resolution_pointer_addresses_schema(schema in schema_strategy(), path in resolvable_path_strategy()) {
        if let Some(resolution) = resolve(&schema, &path) {
            let target = lookup(&schema, &pointer::decode(&resolution.pointer));
            prop_assert_eq!(target, Some(&resolution.schema));
        }
    }

    #[test]
    fn prop_resolution_is_deterministic(schema in schema_strategy(), path in resolvable_path_strategy()) {
        prop_assert_eq!(resolve(&schema, &path), resolve(&schema, &path));
    }
}
