//! Property tests for strategic-merge patching.

use proptest::prelude::*;
use serde_yaml_ng::{Mapping, Value};

use kovl::patch::merge;

/// Arbitrary YAML trees (bounded depth/size).
fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[a-z]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
            arb_mapping_of(inner),
        ]
    })
}

/// Arbitrary patch fragments whose sequences hold scalars only, so the
/// merge-by-name list rules (which depend on element order and duplicate
/// keys) don't apply.
fn arb_scalar_seq_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[a-z]{0,8}".prop_map(Value::String),
    ];
    let scalar = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[a-z]{0,8}".prop_map(Value::String),
    ];
    let scalar_seq = prop::collection::vec(scalar, 0..4).prop_map(Value::Sequence);
    leaf.prop_recursive(3, 24, 4, move |inner| {
        prop_oneof![scalar_seq.clone(), arb_mapping_of(inner)]
    })
}

fn arb_mapping_of(inner: impl Strategy<Value = Value> + 'static) -> BoxedStrategy<Value> {
    prop::collection::vec(("[a-z]{1,6}", inner), 0..4)
        .prop_map(|entries| {
            let mut map = Mapping::new();
            for (key, value) in entries {
                map.insert(Value::String(key), value);
            }
            Value::Mapping(map)
        })
        .boxed()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: merging never panics, whatever the shapes involved.
    #[test]
    fn property_merge_never_panics(
        mut target in arb_value(),
        patch in arb_value(),
    ) {
        merge(&mut target, &patch);
    }

    /// PROPERTY: the same patch applied to independent copies of the same
    /// input yields identical output.
    #[test]
    fn property_merge_deterministic(
        target in arb_value(),
        patch in arb_value(),
    ) {
        let mut a = target.clone();
        let mut b = target;
        merge(&mut a, &patch);
        merge(&mut b, &patch);
        prop_assert_eq!(a, b);
    }

    /// PROPERTY: applying a patch twice is the same as applying it once
    /// (for patches without merge-key lists).
    #[test]
    fn property_merge_idempotent(
        target in arb_value(),
        patch in arb_scalar_seq_value(),
    ) {
        let mut once = target;
        merge(&mut once, &patch);
        let mut twice = once.clone();
        merge(&mut twice, &patch);
        prop_assert_eq!(once, twice);
    }

    /// PROPERTY: a null value always deletes the field, whatever was there.
    #[test]
    fn property_null_deletes_field(
        target_value in arb_value(),
        key in "[a-z]{1,6}",
    ) {
        let mut target_map = Mapping::new();
        target_map.insert(Value::String(key.clone()), target_value);
        let mut target = Value::Mapping(target_map);

        let mut patch_map = Mapping::new();
        patch_map.insert(Value::String(key.clone()), Value::Null);
        let patch = Value::Mapping(patch_map);

        merge(&mut target, &patch);
        let map = target.as_mapping().unwrap();
        prop_assert!(map.get(key.as_str()).is_none());
    }

    /// PROPERTY: merging a mapping patch never drops unrelated target keys.
    #[test]
    fn property_merge_keeps_unrelated_keys(
        unrelated in arb_value(),
        patch in arb_mapping_of(arb_value()),
    ) {
        let mut target_map = Mapping::new();
        // A key the generated patch can never produce (digits only)
        target_map.insert(Value::String("0untouched".to_string()), unrelated.clone());
        let mut target = Value::Mapping(target_map);

        merge(&mut target, &patch);
        let map = target.as_mapping().unwrap();
        prop_assert_eq!(map.get("0untouched"), Some(&unrelated));
    }
}
