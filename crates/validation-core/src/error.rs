//! Error types for the validation engine and JSON ingestion.

use thiserror::Error;

/// Errors the validator itself can raise. Data problems (extra/missing/
/// wrong-type fields, malformed schemas) are never errors — they become
/// findings. This type only covers violations of the validator's own
/// calling contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidatorError {
    /// §4.1 step 2: the record handed to `validate` was not a mapping.
    #[error("expected an object record, received a {0}")]
    NotAnObject(&'static str),
}

/// Errors from converting a raw blob into one or more records.
#[derive(Error, Debug, Clone)]
pub enum ConvertError {
    #[error("malformed {format} payload: {detail}")]
    ParseError { format: String, detail: String },
}

/// Errors from resolving a validator by file extension.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    #[error("no validator registered for file extension '{0}'")]
    UnsupportedFormat(String),
}
