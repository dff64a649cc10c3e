//! Error types for kovl
//!
//! Uses `thiserror` for library errors; the binary edge converts to
//! `anyhow` for display.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for kovl operations
pub type KovlResult<T> = Result<T, KovlError>;

/// Main error type for kovl operations
#[derive(Error, Debug)]
pub enum KovlError {
    /// A referenced file or directory could not be located
    #[error("not found: {path}")]
    NotFound { path: PathBuf },

    /// A document could not be parsed into the resource model
    #[error("malformed document in {file}: {message}")]
    MalformedDocument { file: PathBuf, message: String },

    /// A kustomization references itself, directly or transitively
    #[error("cyclic reference: {unit} is already being resolved ({stack})")]
    CyclicReference { unit: PathBuf, stack: String },

    /// Reference chain exceeds the recursion limit
    #[error("max resolution depth {limit} exceeded at {unit}")]
    MaxDepthExceeded { unit: PathBuf, limit: usize },

    /// A patch matched no document in the resolved set
    #[error("patch target not found: {target}")]
    PatchTargetNotFound { target: String },

    /// A patch matched more than one document
    #[error("ambiguous patch target {target}: matches {count} documents")]
    AmbiguousPatchTarget { target: String, count: usize },

    /// A patch body is neither a strategic-merge fragment nor an op list
    #[error("invalid patch in {unit}: {message}")]
    InvalidPatch { unit: PathBuf, message: String },

    /// A ConfigMap/Secret generator spec is malformed
    #[error("invalid generator spec '{name}': {message}")]
    InvalidGeneratorSpec { name: String, message: String },

    /// Two documents in one resolved set share an identity key
    #[error("duplicate identity {id} (from {unit})")]
    DuplicateIdentity { id: String, unit: PathBuf },

    /// `bases:` used while legacy support is disabled in config
    #[error("legacy 'bases' field used in {unit} but disabled by config - move entries to 'resources'")]
    LegacyBasesRejected { unit: PathBuf },

    /// Invalid kovl.toml configuration
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (emit side)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization error (`--json` output)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
