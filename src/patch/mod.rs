//! Patch engine
//!
//! Resolves declared patches into one of two bodies - a strategic-merge
//! fragment or a JSON-patch style op list - and applies each to exactly
//! one document in a resolved set, matched by kind/name/namespace.

pub mod ops;
pub mod strategic;

use std::path::Path;

use serde_yaml_ng::Value;

use crate::error::{KovlError, KovlResult};
use crate::kustomization::{PatchSpec, TargetSelector};
use crate::loader::ContentSource;
use crate::model::{Document, ResourceSet, DEFAULT_NAMESPACE};

pub use ops::PatchOp;
pub use strategic::{merge, MergeOp};

/// A fully resolved patch, ready to apply
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub target: TargetSelector,
    pub body: PatchBody,
}

/// The two supported patch bodies
#[derive(Debug, Clone, PartialEq)]
pub enum PatchBody {
    StrategicMerge(Value),
    Ops(Vec<PatchOp>),
}

impl Patch {
    /// Resolve a declared patch: load its body (file or inline), classify
    /// it, and determine its target.
    pub fn resolve(
        spec: &PatchSpec,
        source: &dyn ContentSource,
        unit_dir: &Path,
        unit_file: &Path,
    ) -> KovlResult<Patch> {
        let body_text = match (&spec.path, &spec.patch) {
            (Some(_), Some(_)) => {
                return Err(KovlError::InvalidPatch {
                    unit: unit_file.to_path_buf(),
                    message: "'path' and 'patch' are mutually exclusive".to_string(),
                })
            }
            (Some(path), None) => source.read(&unit_dir.join(path))?,
            (None, Some(inline)) => inline.clone(),
            (None, None) => {
                return Err(KovlError::InvalidPatch {
                    unit: unit_file.to_path_buf(),
                    message: "patch needs either 'path' or an inline 'patch'".to_string(),
                })
            }
        };

        let body: Value =
            serde_yaml_ng::from_str(&body_text).map_err(|e| KovlError::InvalidPatch {
                unit: unit_file.to_path_buf(),
                message: format!("patch body did not parse: {}", e),
            })?;

        match body {
            Value::Sequence(_) => {
                let ops = ops::parse_ops(&body).map_err(|message| KovlError::InvalidPatch {
                    unit: unit_file.to_path_buf(),
                    message,
                })?;
                let target = spec.target.clone().ok_or_else(|| KovlError::InvalidPatch {
                    unit: unit_file.to_path_buf(),
                    message: "op-list patches need an explicit target".to_string(),
                })?;
                Ok(Patch {
                    target,
                    body: PatchBody::Ops(ops),
                })
            }
            Value::Mapping(_) => {
                let target = match &spec.target {
                    Some(t) => t.clone(),
                    None => infer_target(&body).ok_or_else(|| KovlError::InvalidPatch {
                        unit: unit_file.to_path_buf(),
                        message:
                            "cannot infer target: fragment lacks kind/metadata.name and no 'target' given"
                                .to_string(),
                    })?,
                };
                Ok(Patch {
                    target,
                    body: PatchBody::StrategicMerge(body),
                })
            }
            _ => Err(KovlError::InvalidPatch {
                unit: unit_file.to_path_buf(),
                message: "patch body must be a mapping or an op list".to_string(),
            }),
        }
    }
}

/// A strategic-merge fragment that names its own kind and metadata.name
/// selects its target implicitly.
fn infer_target(body: &Value) -> Option<TargetSelector> {
    let kind = body.get("kind")?.as_str()?;
    let metadata = body.get("metadata")?.as_mapping()?;
    let name = metadata.get("name")?.as_str()?;
    let namespace = metadata
        .get("namespace")
        .and_then(Value::as_str)
        .map(String::from);
    Some(TargetSelector {
        kind: Some(kind.to_string()),
        name: Some(name.to_string()),
        namespace,
    })
}

/// True when the selector matches the document. Absent fields match
/// anything.
pub fn selector_matches(selector: &TargetSelector, doc: &Document) -> bool {
    if let Some(kind) = &selector.kind {
        if doc.kind() != kind {
            return false;
        }
    }
    if let Some(name) = &selector.name {
        if doc.name() != name {
            return false;
        }
    }
    if let Some(namespace) = &selector.namespace {
        if doc.namespace().unwrap_or(DEFAULT_NAMESPACE) != namespace {
            return false;
        }
    }
    true
}

/// Apply one patch to the set. Exactly one document must match.
pub fn apply_patch(set: &mut ResourceSet, patch: &Patch, unit_file: &Path) -> KovlResult<()> {
    let matches: Vec<usize> = set
        .iter()
        .enumerate()
        .filter(|(_, doc)| selector_matches(&patch.target, doc))
        .map(|(i, _)| i)
        .collect();

    let index = match matches.as_slice() {
        [] => {
            return Err(KovlError::PatchTargetNotFound {
                target: patch.target.to_string(),
            })
        }
        [index] => *index,
        _ => {
            return Err(KovlError::AmbiguousPatchTarget {
                target: patch.target.to_string(),
                count: matches.len(),
            })
        }
    };

    let doc = &mut set.docs_mut()[index];
    let mut value = doc.as_value();

    match &patch.body {
        PatchBody::StrategicMerge(fragment) => strategic::merge(&mut value, fragment),
        PatchBody::Ops(ops) => {
            ops::apply_ops(&mut value, ops).map_err(|message| KovlError::InvalidPatch {
                unit: unit_file.to_path_buf(),
                message,
            })?
        }
    }

    // A patch must not destroy the document's identity.
    *doc = Document::from_value(value, unit_file)?;
    Ok(())
}
