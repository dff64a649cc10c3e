//! Emitter
//!
//! Serializes a resolved set as a multi-document YAML stream. Documents
//! keep their set order; mapping keys are recursively sorted (lexical) so
//! identical inputs always emit byte-identical output.

use serde_yaml_ng::{Mapping, Value};

use crate::error::KovlResult;
use crate::model::ResourceSet;

/// Serialize the set in order, one YAML document per resource.
pub fn emit(set: &ResourceSet) -> KovlResult<String> {
    let mut out = String::new();
    for (i, doc) in set.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n");
        }
        let sorted = sort_keys(doc.as_value());
        out.push_str(&serde_yaml_ng::to_string(&sorted)?);
    }
    Ok(out)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(Value, Value)> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            entries.sort_by(|(a, _), (b, _)| key_ordinal(a).cmp(&key_ordinal(b)));
            let mut sorted = Mapping::new();
            for (k, v) in entries {
                sorted.insert(k, v);
            }
            Value::Mapping(sorted)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Mapping keys are almost always strings; anything else sorts by its
/// serialized form.
fn key_ordinal(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml_ng::to_string(other)
            .unwrap_or_default()
            .trim_end()
            .to_string(),
    }
}
