//! Wires the validator, registries, object store, and broker into the
//! `EvaluateJob` use-case (§4.8).

pub mod error;
pub mod evaluate_job;
pub mod message;

pub use error::PipelineError;
pub use evaluate_job::{EvaluateJob, JobOutcome};
pub use message::JobMessage;
