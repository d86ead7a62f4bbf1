//! Error types for synergy resolution

use thiserror::Error;

/// Result type for synergy operations
pub type SynergyResult<T> = std::result::Result<T, SynergyError>;

/// Errors that can occur while resolving relationships or loading knowledge
#[derive(Error, Debug)]
pub enum SynergyError {
    #[error("Storage error: {0}")]
    Storage(#[from] cardex_storage::StorageError),

    #[error("Knowledge file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Knowledge parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
