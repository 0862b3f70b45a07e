//! Error types shared by the encoder, forest and pipeline layers

use thiserror::Error;

/// Errors raised while loading data, training, or serving recommendations
#[derive(Error, Debug)]
pub enum OutfitError {
    /// Dataset is missing, empty, malformed, or lacks a required column
    #[error("dataset error: {0}")]
    DatasetLoad(String),

    /// A categorical value was not seen when the encoder was fitted
    #[error("unknown {column} category: {value:?}")]
    UnknownCategory { column: String, value: String },

    /// A code outside `[0, size)` was passed to `decode`
    #[error("invalid {column} code {code} (vocabulary size {size})")]
    InvalidCode {
        column: String,
        code: usize,
        size: usize,
    },

    /// Numeric input outside its declared domain
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Prediction requested before any model was trained or installed
    #[error("model has not been fitted")]
    NotFitted,

    /// Training could not produce a model
    #[error("training error: {0}")]
    Training(String),

    /// Persisted model artifact is malformed or fails verification
    #[error("artifact error: {0}")]
    Artifact(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OutfitError {
    pub fn unknown_category(column: &str, value: &str) -> Self {
        Self::UnknownCategory {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    /// True for errors that reject a single request but leave the service usable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownCategory { .. } | Self::InvalidInput(_) | Self::NotFitted
        )
    }
}

/// Result type for outfit operations
pub type Result<T> = std::result::Result<T, OutfitError>;
