//! Shared foundation of the ticket triage workspace: domain types, the
//! error taxonomy, component traits, and the configuration loader.

pub mod config;
pub mod traits;
pub mod types;

use thiserror::Error;

/// Error taxonomy shared by every stage of the ticket analysis pipeline.
///
/// `EmptyInput` maps to a caller validation failure, `ModelUnavailable`
/// marks a capability as permanently unusable for the process lifetime,
/// and `IndexCorrupt` always triggers a full index rebuild rather than
/// a partial repair.
#[derive(Debug, Error)]
pub enum Error {
    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index corrupt: {0}")]
    IndexCorrupt(String),

    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("operation failed: {0}")]
    Operation(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
