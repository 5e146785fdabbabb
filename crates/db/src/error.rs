/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend failed to read or write.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized for writing.
    #[error("Failed to serialize stored data: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Stored data could not be parsed. Recovered locally by treating the
    /// collection as empty; never returned from the public repository API.
    #[error("Stored data under '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The write would exceed the backend's capacity.
    #[error("Storage quota exceeded: need {needed} bytes, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },
}
