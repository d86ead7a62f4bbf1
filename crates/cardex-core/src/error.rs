//! Error types for Cardex Core

use thiserror::Error;

/// Result type alias using Cardex's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Cardex error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Unknown rarity: {0}")]
    UnknownRarity(String),

    #[error("Unknown competitive tier: {0}")]
    UnknownTier(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
