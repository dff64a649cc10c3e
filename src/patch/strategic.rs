//! Strategic-merge patching
//!
//! A patch fragment is compiled into a small operation set and applied by
//! an explicit interpreter over the YAML value tree. This keeps the merge
//! algorithm free of reflection and exhaustively testable:
//!
//! - scalar fields overwrite the target field
//! - mapping fields merge key-by-key, recursively
//! - sequence fields replace wholesale, unless both sides are lists of
//!   mappings carrying a scalar `name` - then elements merge by `name`
//!   (the Kubernetes merge-key convention), patch-only elements appended
//! - an explicit `null` deletes the target field
//!
//! Callers should warn users about the sequence rule: a patch that lists
//! one element of an unnamed sequence replaces the whole sequence.

use serde_yaml_ng::{Mapping, Sequence, Value};

/// Merge key recognized in sequences of mappings
const MERGE_KEY: &str = "name";

/// One compiled merge operation
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOp {
    /// Overwrite the target field with this value
    Set(Value),
    /// Merge into the target mapping key-by-key
    MergeMapping(Vec<(Value, MergeOp)>),
    /// Merge elements by their `name` field, appending unmatched ones
    MergeListByName(Sequence),
    /// Replace the target sequence wholesale
    ReplaceSequence(Sequence),
    /// Delete the target field
    Delete,
}

/// Compile a patch fragment into its operation tree.
pub fn plan(patch: &Value) -> MergeOp {
    match patch {
        Value::Null => MergeOp::Delete,
        Value::Mapping(m) => MergeOp::MergeMapping(
            m.iter().map(|(k, v)| (k.clone(), plan(v))).collect(),
        ),
        Value::Sequence(s) => {
            if is_named_list(s) {
                MergeOp::MergeListByName(s.clone())
            } else {
                MergeOp::ReplaceSequence(s.clone())
            }
        }
        other => MergeOp::Set(other.clone()),
    }
}

/// Interpret an operation tree against a target value.
pub fn apply(target: &mut Value, op: &MergeOp) {
    match op {
        MergeOp::Set(value) => *target = value.clone(),
        MergeOp::Delete => *target = Value::Null,
        MergeOp::ReplaceSequence(seq) => *target = Value::Sequence(seq.clone()),
        MergeOp::MergeMapping(entries) => {
            if !target.is_mapping() {
                *target = materialize_mapping(entries);
                return;
            }
            if let Some(map) = target.as_mapping_mut() {
                apply_mapping(map, entries);
            }
        }
        MergeOp::MergeListByName(patch_seq) => {
            let mergeable = target
                .as_sequence()
                .map(|s| is_named_list(s))
                .unwrap_or(false);
            if !mergeable {
                *target = Value::Sequence(patch_seq.clone());
                return;
            }
            if let Some(seq) = target.as_sequence_mut() {
                apply_named_list(seq, patch_seq);
            }
        }
    }
}

/// Merge a patch fragment into a target in one step.
pub fn merge(target: &mut Value, patch: &Value) {
    apply(target, &plan(patch));
}

fn apply_mapping(target: &mut Mapping, entries: &[(Value, MergeOp)]) {
    for (key, op) in entries {
        match op {
            MergeOp::Delete => {
                target.remove(key);
            }
            _ => match target.get_mut(key) {
                Some(existing) => apply(existing, op),
                None => {
                    if let Some(value) = materialize(op) {
                        target.insert(key.clone(), value);
                    }
                }
            },
        }
    }
}

fn apply_named_list(target: &mut Sequence, patch_seq: &Sequence) {
    for patch_elem in patch_seq {
        let name = element_name(patch_elem);
        let existing = target.iter_mut().find(|e| element_name(e) == name);
        match existing {
            Some(elem) => merge(elem, patch_elem),
            None => target.push(patch_elem.clone()),
        }
    }
}

/// The value a patch op produces when the target field does not exist.
/// Deletes of absent fields produce nothing.
fn materialize(op: &MergeOp) -> Option<Value> {
    match op {
        MergeOp::Set(v) => Some(v.clone()),
        MergeOp::Delete => None,
        MergeOp::ReplaceSequence(s) | MergeOp::MergeListByName(s) => {
            Some(Value::Sequence(s.clone()))
        }
        MergeOp::MergeMapping(entries) => Some(materialize_mapping(entries)),
    }
}

fn materialize_mapping(entries: &[(Value, MergeOp)]) -> Value {
    let mut map = Mapping::new();
    for (key, op) in entries {
        if let Some(value) = materialize(op) {
            map.insert(key.clone(), value);
        }
    }
    Value::Mapping(map)
}

/// True when every element is a mapping with a scalar `name` field.
fn is_named_list(seq: &Sequence) -> bool {
    !seq.is_empty()
        && seq.iter().all(|e| {
            e.as_mapping()
                .and_then(|m| m.get(MERGE_KEY))
                .map(|n| matches!(n, Value::String(_) | Value::Number(_)))
                .unwrap_or(false)
        })
}

fn element_name(elem: &Value) -> Option<&Value> {
    elem.as_mapping().and_then(|m| m.get(MERGE_KEY))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml_ng::from_str(s).unwrap()
    }

    #[test]
    fn test_scalar_overwrites() {
        let mut target = yaml("replicas: 2\nimage: nginx");
        merge(&mut target, &yaml("replicas: 3"));
        assert_eq!(target, yaml("replicas: 3\nimage: nginx"));
    }

    #[test]
    fn test_mapping_merges_recursively() {
        let mut target = yaml("spec:\n  replicas: 2\n  paused: false");
        merge(&mut target, &yaml("spec:\n  replicas: 3"));
        assert_eq!(target, yaml("spec:\n  replicas: 3\n  paused: false"));
    }

    #[test]
    fn test_new_keys_are_added() {
        let mut target = yaml("a: 1");
        merge(&mut target, &yaml("b:\n  c: 2"));
        assert_eq!(target, yaml("a: 1\nb:\n  c: 2"));
    }

    #[test]
    fn test_null_deletes_field() {
        let mut target = yaml("a: 1\nb: 2");
        merge(&mut target, &yaml("b: null"));
        assert_eq!(target, yaml("a: 1"));
    }

    #[test]
    fn test_null_delete_of_absent_field_is_noop() {
        let mut target = yaml("a: 1");
        merge(&mut target, &yaml("missing: null"));
        assert_eq!(target, yaml("a: 1"));
    }

    #[test]
    fn test_nested_delete_not_materialized() {
        // Deleting inside a mapping that doesn't exist must not create
        // an empty shell containing nothing.
        let mut target = yaml("a: 1");
        merge(&mut target, &yaml("b:\n  gone: null"));
        assert_eq!(target, yaml("a: 1\nb: {}"));
    }

    #[test]
    fn test_unnamed_sequence_replaced_wholesale() {
        let mut target = yaml("args: [--a, --b, --c]");
        merge(&mut target, &yaml("args: [--d]"));
        assert_eq!(target, yaml("args: [--d]"));
    }

    #[test]
    fn test_named_list_merges_by_name() {
        let mut target = yaml(
            r#"
containers:
  - name: app
    image: nginx:1.25
    ports:
      - name: http
        containerPort: 80
  - name: sidecar
    image: envoy
"#,
        );
        merge(
            &mut target,
            &yaml("containers:\n  - name: app\n    image: nginx:1.26"),
        );

        let containers = target["containers"].as_sequence().unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0]["image"], yaml("nginx:1.26"));
        // Untouched fields of the merged element survive
        assert_eq!(containers[0]["ports"][0]["containerPort"], yaml("80"));
        assert_eq!(containers[1]["image"], yaml("envoy"));
    }

    #[test]
    fn test_named_list_appends_new_elements() {
        let mut target = yaml("containers:\n  - name: app\n    image: nginx");
        merge(
            &mut target,
            &yaml("containers:\n  - name: logger\n    image: fluentd"),
        );
        let containers = target["containers"].as_sequence().unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[1]["name"], yaml("logger"));
    }

    #[test]
    fn test_named_patch_into_unnamed_target_replaces() {
        // Target elements lack the merge key, so no merge is possible.
        let mut target = yaml("items:\n  - just-a-string");
        merge(
            &mut target,
            &yaml("items:\n  - name: a\n    value: 1"),
        );
        assert_eq!(target["items"].as_sequence().unwrap().len(), 1);
        assert_eq!(target["items"][0]["name"], yaml("a"));
    }

    #[test]
    fn test_type_mismatch_patch_wins() {
        let mut target = yaml("field: [1, 2]");
        merge(&mut target, &yaml("field:\n  key: value"));
        assert_eq!(target, yaml("field:\n  key: value"));
    }

    #[test]
    fn test_merge_is_deterministic() {
        let target = yaml("spec:\n  replicas: 2\n  template:\n    metadata:\n      labels:\n        app: web");
        let patch = yaml("spec:\n  replicas: 3");

        let mut a = target.clone();
        let mut b = target;
        merge(&mut a, &patch);
        merge(&mut b, &patch);
        assert_eq!(a, b);
    }

    #[test]
    fn test_plan_compiles_expected_ops() {
        let op = plan(&yaml("a: null"));
        match op {
            MergeOp::MergeMapping(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].1, MergeOp::Delete);
            }
            other => panic!("expected MergeMapping, got {:?}", other),
        }

        assert!(matches!(plan(&yaml("[1, 2]")), MergeOp::ReplaceSequence(_)));
        assert!(matches!(
            plan(&yaml("- name: a\n- name: b")),
            MergeOp::MergeListByName(_)
        ));
        assert!(matches!(plan(&yaml("42")), MergeOp::Set(_)));
    }
}
