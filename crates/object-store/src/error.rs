use thiserror::Error;

/// Object-store failures (§7: `BucketConnectionError` / `BucketOperationError`
/// / `ObjectNotFound`).
#[derive(Error, Debug)]
pub enum ObjectStoreError {
    #[error("bucket connection error: {0}")]
    BucketConnection(String),

    #[error("bucket operation error: {0}")]
    BucketOperation(String),

    #[error("object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },
}
