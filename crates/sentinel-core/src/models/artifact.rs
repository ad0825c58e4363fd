//! Generated test artifact.

use serde::{Deserialize, Serialize};

/// A runnable test unit compiled from a step sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artifact {
    /// Test source text
    pub source_text: String,

    /// Hex SHA-256 over the ordered steps and the environment's
    /// `BASE_URL`/`BROWSER`
    pub fingerprint: String,

    /// Deterministic test name
    pub test_name: String,

    /// Deterministic relative file path
    pub file_path: String,
}
