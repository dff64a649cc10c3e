//! Kustomization unit model
//!
//! A kustomization declares the resources a unit is composed of, the
//! patches it applies, and the cross-cutting transformations that run over
//! the resolved set. Unknown fields are surfaced as warnings rather than
//! silently dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KovlError, KovlResult};
use crate::suggest::suggest_key;

/// Fields a kustomization file may carry; used for typo suggestions.
const KNOWN_FIELDS: &[&str] = &[
    "apiVersion",
    "kind",
    "resources",
    "bases",
    "patches",
    "namePrefix",
    "nameSuffix",
    "namespace",
    "commonLabels",
    "commonAnnotations",
    "configMapGenerator",
    "secretGenerator",
    "path",
    "patch",
    "target",
    "name",
    "literals",
    "files",
    "type",
];

/// A parsed kustomization unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Kustomization {
    /// Optional `kustomize.config.k8s.io/v1beta1` header, carried but unused
    pub api_version: Option<String>,
    pub kind: Option<String>,

    /// References to resource files or nested units, in declared order
    pub resources: Vec<String>,

    /// Legacy alias for unit references; appended after `resources`
    pub bases: Vec<String>,

    pub patches: Vec<PatchSpec>,

    pub name_prefix: Option<String>,
    pub name_suffix: Option<String>,
    pub namespace: Option<String>,

    pub common_labels: BTreeMap<String, String>,
    pub common_annotations: BTreeMap<String, String>,

    pub config_map_generator: Vec<GeneratorSpec>,
    pub secret_generator: Vec<GeneratorSpec>,
}

impl Kustomization {
    /// True if the unit declares any patch or transformation at all.
    ///
    /// A unit without these is a pure aggregation: resolving it yields
    /// exactly its resources, order preserved.
    pub fn is_pass_through(&self) -> bool {
        self.patches.is_empty()
            && self.name_prefix.is_none()
            && self.name_suffix.is_none()
            && self.namespace.is_none()
            && self.common_labels.is_empty()
            && self.common_annotations.is_empty()
            && self.config_map_generator.is_empty()
            && self.secret_generator.is_empty()
    }
}

/// A patch declaration: inline body or file reference, plus an optional
/// explicit target selector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchSpec {
    /// Path to a patch file, relative to the unit
    pub path: Option<String>,

    /// Inline patch body (strategic-merge fragment or JSON-style op list)
    pub patch: Option<String>,

    /// Explicit target; may be omitted for strategic-merge fragments that
    /// name their own kind and metadata.name
    pub target: Option<TargetSelector>,
}

/// Selects the single document a patch applies to
///
/// Absent fields are wildcards; matching more than one document is an
/// error, not a broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSelector {
    pub kind: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
}

impl std::fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}{}",
            self.kind.as_deref().unwrap_or("*"),
            self.name.as_deref().unwrap_or("*"),
            match &self.namespace {
                Some(ns) => format!(" in {}", ns),
                None => String::new(),
            }
        )
    }
}

/// ConfigMap/Secret generator spec
///
/// `type` only applies to secret generators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSpec {
    pub name: String,
    pub literals: Vec<String>,
    pub files: Vec<String>,
    #[serde(rename = "type")]
    pub secret_type: Option<String>,
}

/// Non-fatal warning for an unrecognized kustomization field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitWarning {
    pub key: String,
    pub file: PathBuf,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for UnitWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown field '{}' in {}", self.key, self.file.display())?;
        if let Some(s) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", s)?;
        }
        Ok(())
    }
}

/// Parse a kustomization file, collecting warnings for unknown fields.
pub fn parse_kustomization(
    content: &str,
    file: &Path,
) -> KovlResult<(Kustomization, Vec<UnitWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = serde_yaml_ng::Deserializer::from_str(content);

    let unit: Kustomization = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| KovlError::MalformedDocument {
        file: file.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            let suggestion = suggest_key(&key, KNOWN_FIELDS);
            UnitWarning {
                key,
                file: file.to_path_buf(),
                suggestion,
            }
        })
        .collect();

    Ok((unit, warnings))
}
