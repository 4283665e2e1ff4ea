//! Short stable identifiers for question content.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
const CODE_LEN: usize = 12;

/// A short code identifying a question by its text.
///
/// Users and games remember which questions they have seen by code, so the
/// same text always yields the same code. Codes are the first 48 bits of the
/// SHA-256 digest of the question text, rendered as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionCode(String);

impl QuestionCode {
    /// Derives the code for a question text.
    #[must_use]
    pub fn derive(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        let mut code = String::with_capacity(CODE_LEN);
        for byte in digest.iter().take(CODE_LEN / 2) {
            code.push_str(&format!("{byte:02x}"));
        }
        Self(code)
    }

    /// Wraps a code read back from storage.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
