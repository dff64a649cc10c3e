//! Name-reference fixups
//!
//! After generators hash names and prefix/suffix renaming runs, documents
//! that referenced a ConfigMap or Secret by its original name would point
//! at nothing. This walker rewrites the known reference fields using the
//! rename map built by the earlier pipeline steps.

use serde_yaml_ng::Value;

use crate::model::ResourceSet;

use super::RenameMap;

/// Mapping keys whose `name` field references a ConfigMap
const CONFIGMAP_NAME_REFS: &[&str] = &["configMap", "configMapRef", "configMapKeyRef"];

/// Mapping keys whose `name` field references a Secret
const SECRET_NAME_REFS: &[&str] = &["secretRef", "secretKeyRef"];

/// Rewrite all known name references in the set.
pub fn apply_name_reference_fixups(set: &mut ResourceSet, renames: &RenameMap) {
    if renames.is_empty() {
        return;
    }
    for doc in set.iter_mut() {
        let mut value = doc.as_value();
        rewrite(&mut value, renames);
        if let Value::Mapping(root) = value {
            *doc.root_mut() = root;
        }
    }
}

fn rewrite(value: &mut Value, renames: &RenameMap) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map.iter_mut() {
                if let Some(key) = key.as_str() {
                    if CONFIGMAP_NAME_REFS.contains(&key) {
                        rewrite_name_field(child, "name", "ConfigMap", renames);
                    } else if SECRET_NAME_REFS.contains(&key) {
                        rewrite_name_field(child, "name", "Secret", renames);
                    } else if key == "secret" {
                        rewrite_name_field(child, "secretName", "Secret", renames);
                    } else if key == "imagePullSecrets" {
                        if let Some(seq) = child.as_sequence_mut() {
                            for elem in seq {
                                rewrite_name_field(elem, "name", "Secret", renames);
                            }
                        }
                    }
                }
                rewrite(child, renames);
            }
        }
        Value::Sequence(seq) => {
            for elem in seq {
                rewrite(elem, renames);
            }
        }
        _ => {}
    }
}

fn rewrite_name_field(holder: &mut Value, field: &str, kind: &str, renames: &RenameMap) {
    let Some(map) = holder.as_mapping_mut() else {
        return;
    };
    let Some(name_value) = map.get_mut(field) else {
        return;
    };
    let Some(name) = name_value.as_str() else {
        return;
    };
    if let Some(new_name) = renames.get(&(kind.to_string(), name.to_string())) {
        *name_value = Value::from(new_name.as_str());
    }
}
