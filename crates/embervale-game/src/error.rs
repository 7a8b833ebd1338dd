//! Error types for Embervale.

use thiserror::Error;

use crate::api::ApiError;
use crate::inventory::InventoryError;

/// Top-level error type for Embervale operations.
///
/// Wraps the per-module error enums so callers driving [`crate::state::GameState`]
/// handle one type. Battle and harvest have no error enum of their own:
/// their failure modes (attacking with no battle, harvesting a vanished
/// node) are timer races, guarded as no-ops rather than surfaced as errors.
#[derive(Debug, Clone, Error)]
pub enum EmbervaleError {
    /// Inventory, equipment, or economy errors
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// API boundary errors
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EmbervaleError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Result type alias for Embervale operations.
pub type EmbervaleResult<T> = Result<T, EmbervaleError>;
