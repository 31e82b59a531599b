//! Errors raised by the key-value medium.
//!
//! Only genuine medium failures surface as [`StoreError`]. Missing records are
//! reported as `None`/`false` by [`crate::RecordStore`], and unreadable data is
//! logged and treated as empty.

/// A failure of the underlying key-value medium.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The medium could not be read.
    #[error("failed to read `{key}`: {message}")]
    Read { key: String, message: String },

    /// The medium rejected a write (quota exceeded, read-only disk, ...).
    #[error("failed to write `{key}`: {message}")]
    Write { key: String, message: String },

    /// A record could not be encoded as JSON.
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No medium is available in this environment.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn read(key: &str, message: impl ToString) -> Self {
        Self::Read {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn write(key: &str, message: impl ToString) -> Self {
        Self::Write {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}
