//! Error types for the store.

use crate::id::RecordId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity encoding failed.
    #[error("encode failed in collection {collection}: {message}")]
    Encode {
        /// Collection being written.
        collection: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// Entity decoding failed.
    #[error("decode failed for {record_id} in collection {collection}: {message}")]
    Decode {
        /// Collection being read.
        collection: &'static str,
        /// The record that failed to decode.
        record_id: RecordId,
        /// Description of the failure.
        message: String,
    },

    /// A unique index rejected an insert.
    #[error("unique index violation: {index} in collection {collection}")]
    UniqueViolation {
        /// Collection the index belongs to.
        collection: &'static str,
        /// Name of the violated index.
        index: &'static str,
    },
}

impl StoreError {
    /// Creates an encode error.
    pub fn encode(collection: &'static str, message: impl Into<String>) -> Self {
        Self::Encode {
            collection,
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(
        collection: &'static str,
        record_id: RecordId,
        message: impl Into<String>,
    ) -> Self {
        Self::Decode {
            collection,
            record_id,
            message: message.into(),
        }
    }
}
