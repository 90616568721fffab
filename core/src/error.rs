//! Error types for detachment.
//!
//! Both variants carry the codec's own error untouched; the variant only
//! records which half of the round trip failed.

use thiserror::Error;

/// Errors that can occur while producing a detached copy.
#[derive(Debug, Error)]
pub enum DetachError {
    /// The source value could not be written as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The intermediate JSON could not be read back into the target type.
    #[error("deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl DetachError {
    /// Returns the underlying codec error.
    pub fn codec_error(&self) -> &serde_json::Error {
        match self {
            Self::Serialization(err) | Self::Deserialization(err) => err,
        }
    }
}

/// Convenience alias for results with [`DetachError`].
pub type Result<T> = std::result::Result<T, DetachError>;
