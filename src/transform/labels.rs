//! Common labels and annotations
//!
//! Labels are merged into `metadata.labels` on every document, and
//! additionally into selector and pod-template label fields so that a
//! Deployment keeps matching its pods and a Service keeps matching its
//! backends after injection. Skipping the selector propagation breaks
//! workload selection silently, which is why it lives here and not in
//! callers.

use std::collections::BTreeMap;

use serde_yaml_ng::{Mapping, Value};

use crate::model::ResourceSet;

/// Kinds whose `spec.selector.matchLabels` must track common labels,
/// created if absent (their API requires a selector anyway)
const SELECTOR_KINDS: &[&str] = &["Deployment", "StatefulSet", "DaemonSet", "ReplicaSet"];

/// Merge labels into metadata, selectors and pod templates.
pub fn apply_common_labels(set: &mut ResourceSet, labels: &BTreeMap<String, String>) {
    if labels.is_empty() {
        return;
    }
    for doc in set.iter_mut() {
        let kind = doc.kind().to_string();
        merge_into(ensure_mapping(doc.metadata_mut(), "labels"), labels);

        let Some(spec) = doc
            .root_mut()
            .get_mut("spec")
            .and_then(Value::as_mapping_mut)
        else {
            continue;
        };

        if SELECTOR_KINDS.contains(&kind.as_str()) {
            let selector = ensure_mapping(spec, "selector");
            merge_into(ensure_mapping(selector, "matchLabels"), labels);
        } else if kind == "Service" {
            // Only propagate into selectors that exist; a selector-less
            // Service (e.g. ExternalName) must stay selector-less.
            if let Some(selector) = spec.get_mut("selector").and_then(Value::as_mapping_mut) {
                merge_into(selector, labels);
            }
        } else if let Some(match_labels) = spec
            .get_mut("selector")
            .and_then(Value::as_mapping_mut)
            .and_then(|s| s.get_mut("matchLabels"))
            .and_then(Value::as_mapping_mut)
        {
            // Jobs and other kinds: merge only into selectors already
            // declared, never invent one
            merge_into(match_labels, labels);
        }

        if let Some(template) = spec.get_mut("template").and_then(Value::as_mapping_mut) {
            let metadata = ensure_mapping(template, "metadata");
            merge_into(ensure_mapping(metadata, "labels"), labels);
        }
    }
}

/// Merge annotations into metadata and pod templates.
pub fn apply_common_annotations(set: &mut ResourceSet, annotations: &BTreeMap<String, String>) {
    if annotations.is_empty() {
        return;
    }
    for doc in set.iter_mut() {
        merge_into(ensure_mapping(doc.metadata_mut(), "annotations"), annotations);

        let template = doc
            .root_mut()
            .get_mut("spec")
            .and_then(Value::as_mapping_mut)
            .and_then(|spec| spec.get_mut("template"))
            .and_then(Value::as_mapping_mut);
        if let Some(template) = template {
            let metadata = ensure_mapping(template, "metadata");
            merge_into(ensure_mapping(metadata, "annotations"), annotations);
        }
    }
}

fn ensure_mapping<'a>(parent: &'a mut Mapping, key: &str) -> &'a mut Mapping {
    let entry = parent
        .entry(Value::from(key))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !entry.is_mapping() {
        *entry = Value::Mapping(Mapping::new());
    }
    entry.as_mapping_mut().expect("entry forced to mapping")
}

fn merge_into(target: &mut Mapping, entries: &BTreeMap<String, String>) {
    for (key, value) in entries {
        target.insert(Value::from(key.as_str()), Value::from(value.as_str()));
    }
}
