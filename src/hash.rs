//! Content Hash Value Object
//!
//! A validated, immutable hash of generated ConfigMap/Secret content.
//! The short form is appended to generated names so that content changes
//! roll out as new resources.

use std::fmt;

/// Number of hex characters appended to generated resource names
pub const NAME_SUFFIX_LEN: usize = 10;

/// SHA-256 content hash
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Compute the SHA-256 of content
    pub fn from_content(content: &str) -> Self {
        use sha2::{Digest, Sha256};
        let hash = Sha256::digest(content.as_bytes());
        Self(format!("{:x}", hash))
    }

    /// Full hex digest
    pub fn hex(&self) -> &str {
        &self.0
    }

    /// Short form used as a generated-name suffix
    pub fn short(&self) -> &str {
        &self.0[..NAME_SUFFIX_LEN]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
