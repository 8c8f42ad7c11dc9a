//! Error types for reading evidence at the boundary

use std::path::PathBuf;

use thiserror::Error;

/// Error type for loading a Layer 1 evidence bundle
///
/// Evaluation itself cannot fail; these cover turning bytes into evidence.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvidenceError {
    /// Evidence JSON did not match the bundle shape
    #[error("Invalid evidence JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Evidence or note source could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
