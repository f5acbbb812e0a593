//! Error types for the intervention council
//!
//! The core only surfaces errors it cannot recover from locally. Input defects
//! (unknown difficulty labels, missing context fields) never reach this type;
//! they degrade to documented defaults where they are read.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for council operations
#[derive(Error, Debug)]
pub enum CouncilError {
    /// `select` was called with an empty strategy catalog
    #[error("No candidate strategies: the catalog is empty")]
    NoCandidate,

    /// Writing an expert's state file failed
    #[error("Failed to persist {expert} state to {}: {source}", path.display())]
    Persist {
        expert: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding an expert's state failed
    #[error("Failed to serialize {expert} state: {source}")]
    Serialize {
        expert: String,
        #[source]
        source: serde_json::Error,
    },

    /// A state mutex was poisoned by a panicking writer
    #[error("State lock poisoned for expert {0}")]
    StateLock(String),
}

/// Result type alias for council operations
pub type Result<T> = std::result::Result<T, CouncilError>;
