//! ConfigMap/Secret generators
//!
//! Materializes synthetic documents from generator specs. The generated
//! name carries a content-derived suffix so that changed content becomes a
//! new resource, and downstream name references are rewritten to match.

use std::collections::BTreeMap;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_yaml_ng::{Mapping, Value};

use crate::error::{KovlError, KovlResult};
use crate::hash::ContentHash;
use crate::kustomization::GeneratorSpec;
use crate::loader::ContentSource;
use crate::model::Document;

/// What a generator spec materializes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedKind {
    ConfigMap,
    Secret,
}

impl GeneratedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GeneratedKind::ConfigMap => "ConfigMap",
            GeneratedKind::Secret => "Secret",
        }
    }
}

/// A materialized generator output: the document plus the rename mapping
/// from the declared name to the hashed one.
#[derive(Debug, Clone)]
pub struct Generated {
    pub doc: Document,
    pub declared_name: String,
    pub hashed_name: String,
}

/// Materialize one generator spec.
pub fn generate(
    spec: &GeneratorSpec,
    kind: GeneratedKind,
    source: &dyn ContentSource,
    unit_dir: &Path,
) -> KovlResult<Generated> {
    if spec.name.is_empty() {
        return Err(KovlError::InvalidGeneratorSpec {
            name: String::new(),
            message: "generator needs a name".to_string(),
        });
    }

    let data = collect_data(spec, source, unit_dir)?;
    let hash = content_hash(&spec.name, kind, &data, spec.secret_type.as_deref());
    let hashed_name = format!("{}-{}", spec.name, hash.short());

    let mut root = Mapping::new();
    root.insert(Value::from("apiVersion"), Value::from("v1"));
    root.insert(Value::from("kind"), Value::from(kind.as_str()));

    let mut metadata = Mapping::new();
    metadata.insert(Value::from("name"), Value::from(hashed_name.as_str()));
    root.insert(Value::from("metadata"), Value::Mapping(metadata));

    if kind == GeneratedKind::Secret {
        let secret_type = spec.secret_type.as_deref().unwrap_or("Opaque");
        root.insert(Value::from("type"), Value::from(secret_type));
    }

    let mut data_map = Mapping::new();
    for (key, value) in &data {
        let rendered = match kind {
            GeneratedKind::ConfigMap => value.clone(),
            GeneratedKind::Secret => BASE64.encode(value.as_bytes()),
        };
        data_map.insert(Value::from(key.as_str()), Value::from(rendered));
    }
    root.insert(Value::from("data"), Value::Mapping(data_map));

    Ok(Generated {
        doc: Document::from_mapping_unchecked(root),
        declared_name: spec.name.clone(),
        hashed_name,
    })
}

/// Gather literal and file inputs into one key-value map.
fn collect_data(
    spec: &GeneratorSpec,
    source: &dyn ContentSource,
    unit_dir: &Path,
) -> KovlResult<BTreeMap<String, String>> {
    let mut data = BTreeMap::new();

    for literal in &spec.literals {
        let (key, value) = literal.split_once('=').ok_or_else(|| {
            KovlError::InvalidGeneratorSpec {
                name: spec.name.clone(),
                message: format!("literal '{}' is not key=value", literal),
            }
        })?;
        insert_unique(&mut data, key, value.to_string(), &spec.name)?;
    }

    for file_ref in &spec.files {
        // "key=path" assigns an explicit key; bare "path" keys by file name
        let (key, rel_path) = match file_ref.split_once('=') {
            Some((key, path)) => (key.to_string(), path),
            None => {
                let key = Path::new(file_ref)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| KovlError::InvalidGeneratorSpec {
                        name: spec.name.clone(),
                        message: format!("file reference '{}' has no file name", file_ref),
                    })?;
                (key.to_string(), file_ref.as_str())
            }
        };
        let content =
            source
                .read(&unit_dir.join(rel_path))
                .map_err(|e| KovlError::InvalidGeneratorSpec {
                    name: spec.name.clone(),
                    message: e.to_string(),
                })?;
        insert_unique(&mut data, &key, content, &spec.name)?;
    }

    Ok(data)
}

fn insert_unique(
    data: &mut BTreeMap<String, String>,
    key: &str,
    value: String,
    generator: &str,
) -> KovlResult<()> {
    if key.is_empty() {
        return Err(KovlError::InvalidGeneratorSpec {
            name: generator.to_string(),
            message: "empty data key".to_string(),
        });
    }
    if data.insert(key.to_string(), value).is_some() {
        return Err(KovlError::InvalidGeneratorSpec {
            name: generator.to_string(),
            message: format!("duplicate data key '{}'", key),
        });
    }
    Ok(())
}

/// Hash over a canonical rendering of everything that affects the output
/// document. BTreeMap iteration gives a stable key order.
fn content_hash(
    name: &str,
    kind: GeneratedKind,
    data: &BTreeMap<String, String>,
    secret_type: Option<&str>,
) -> ContentHash {
    let mut canonical = format!("{}\n{}\n", kind.as_str(), name);
    if let Some(t) = secret_type {
        canonical.push_str(t);
        canonical.push('\n');
    }
    for (key, value) in data {
        canonical.push_str(key);
        canonical.push('=');
        canonical.push_str(value);
        canonical.push('\n');
    }
    ContentHash::from_content(&canonical)
}
