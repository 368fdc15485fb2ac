//! Error types for the store's fallible collaborators.

/// Errors produced by the equality collaborators.
///
/// Core store operations never fail; only comparison strategies that need to
/// serialize state (see [`crate::equality`]) can.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A value could not be converted into a JSON tree for comparison.
    #[error("failed to serialize state for comparison: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
