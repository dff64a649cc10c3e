//! Core data model for kovl
//!
//! Defines the fundamental structures the whole pipeline operates on:
//! - `Document`: a single Kubernetes resource as a YAML mapping
//! - `ResourceId`: the identity key `(kind, namespace-or-default, name)`
//! - `ResourceSet`: an ordered, identity-unique sequence of documents

use std::fmt;
use std::path::Path;

use serde_yaml_ng::{Mapping, Value};

use crate::error::{KovlError, KovlResult};

/// Namespace used in identity keys when a document declares none
pub const DEFAULT_NAMESPACE: &str = "default";

/// Identity key of a resource document
///
/// Two documents with the same identity key are the same resource as far
/// as patch targeting and duplicate detection are concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ResourceId {
    pub fn new(
        kind: impl Into<String>,
        namespace: Option<&str>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.unwrap_or(DEFAULT_NAMESPACE).to_string(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// A single Kubernetes resource document
///
/// Wraps the raw YAML mapping and guarantees `kind` and `metadata.name`
/// are present (enforced at construction). All other fields are carried
/// verbatim; nothing is dropped or reordered until the emitter runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Mapping,
}

impl Document {
    /// Build a document from a parsed YAML value, validating the minimum
    /// structure the identity key needs.
    pub fn from_value(value: Value, file: &Path) -> KovlResult<Self> {
        let root = match value {
            Value::Mapping(m) => m,
            other => {
                return Err(KovlError::MalformedDocument {
                    file: file.to_path_buf(),
                    message: format!("document root must be a mapping, got {}", value_kind(&other)),
                })
            }
        };

        let doc = Self { root };

        if doc.kind().is_empty() {
            return Err(KovlError::MalformedDocument {
                file: file.to_path_buf(),
                message: "missing required field 'kind'".to_string(),
            });
        }
        if doc.name().is_empty() {
            return Err(KovlError::MalformedDocument {
                file: file.to_path_buf(),
                message: "missing required field 'metadata.name'".to_string(),
            });
        }

        Ok(doc)
    }

    /// Construct without validation, for documents kovl synthesizes itself
    /// (generators). Callers must set `kind` and `metadata.name`.
    pub(crate) fn from_mapping_unchecked(root: Mapping) -> Self {
        Self { root }
    }

    pub fn kind(&self) -> &str {
        self.root.get("kind").and_then(Value::as_str).unwrap_or("")
    }

    pub fn api_version(&self) -> &str {
        self.root
            .get("apiVersion")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.root
            .get("metadata")
            .and_then(Value::as_mapping)
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.root
            .get("metadata")
            .and_then(Value::as_mapping)
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
    }

    pub fn id(&self) -> ResourceId {
        ResourceId::new(self.kind(), self.namespace(), self.name())
    }

    pub fn set_name(&mut self, name: &str) {
        self.metadata_mut()
            .insert(Value::from("name"), Value::from(name));
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        self.metadata_mut()
            .insert(Value::from("namespace"), Value::from(namespace));
    }

    /// The `metadata` mapping, created empty if absent.
    pub fn metadata_mut(&mut self) -> &mut Mapping {
        let entry = self
            .root
            .entry(Value::from("metadata"))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !entry.is_mapping() {
            *entry = Value::Mapping(Mapping::new());
        }
        entry.as_mapping_mut().expect("metadata forced to mapping")
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Mapping {
        &mut self.root
    }

    pub fn into_value(self) -> Value {
        Value::Mapping(self.root)
    }

    pub fn as_value(&self) -> Value {
        Value::Mapping(self.root.clone())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// An ordered set of documents produced by resolving one kustomization unit
///
/// Order is insertion order from declaration and is preserved through every
/// transformation so output stays deterministic. Identity keys are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSet {
    docs: Vec<Document>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document, rejecting identity collisions.
    pub fn push(&mut self, doc: Document, unit: &Path) -> KovlResult<()> {
        let id = doc.id();
        if self.docs.iter().any(|d| d.id() == id) {
            return Err(KovlError::DuplicateIdentity {
                id: id.to_string(),
                unit: unit.to_path_buf(),
            });
        }
        self.docs.push(doc);
        Ok(())
    }

    /// Append all documents from another set, in order.
    pub fn extend(&mut self, other: ResourceSet, unit: &Path) -> KovlResult<()> {
        for doc in other.docs {
            self.push(doc, unit)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.docs.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Document> {
        self.docs.iter_mut()
    }

    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    pub fn docs_mut(&mut self) -> &mut [Document] {
        &mut self.docs
    }

    pub fn into_docs(self) -> Vec<Document> {
        self.docs
    }
}

impl IntoIterator for ResourceSet {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.into_iter()
    }
}
