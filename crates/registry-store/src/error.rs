use thiserror::Error;

/// Storage-layer failures. Maps onto spec.md §7's `StorageConnectionError`
/// / `StorageNotFound` taxonomy.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage connection error: {0}")]
    Connection(#[from] sled::Error),

    #[error("row serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no schema registered for namespace '{0}'")]
    SchemaNotFound(String),
}
