//! The unifying error taxonomy for one `EvaluateJob` run (§7). Everything
//! a port can fail with funnels through here so the worker has one switch
//! to decide retry-vs-drop.

use object_store_port::ObjectStoreError;
use registry_store::StoreError;
use thiserror::Error;
use validation_core::ValidatorError;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// No schema registered for the namespace being evaluated. Preserved
    /// as a whole-job failure (see the crate-level note on this being a
    /// known quirk rather than a deliberate design choice).
    #[error("no schema registered for namespace {0}")]
    SchemaNotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("object store error: {0}")]
    ObjectStore(#[from] ObjectStoreError),

    #[error("broker error: {0}")]
    Broker(#[from] broker::BrokerError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidatorError> for PipelineError {
    fn from(err: ValidatorError) -> Self {
        PipelineError::Internal(err.to_string())
    }
}

impl PipelineError {
    /// Whether the worker should retry this failure (reject-with-retry)
    /// or treat it as permanent. Resolves the open question of whether
    /// `SchemaNotFound` should be retried: it never resolves itself by
    /// waiting, so it is classified as non-retryable even though the
    /// current job-abort behaviour still routes it through the retry
    /// queue at the broker layer until the attempt budget is spent.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::SchemaNotFound(_) => false,
            PipelineError::Storage(_) => true,
            PipelineError::ObjectStore(_) => true,
            PipelineError::Broker(_) => true,
            PipelineError::Internal(_) => false,
        }
    }
}
