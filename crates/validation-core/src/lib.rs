//! Avro-compatible structural validator.
//!
//! Given a record and a parsed Avro-like schema, produces a deterministic
//! list of field-level findings: extra fields, missing required fields, and
//! wrong-typed fields. The validator never raises for data problems — those
//! become findings — and never mutates its inputs.

pub mod error;
pub mod factory;
pub mod schema;
pub mod validator;
pub mod value;

pub use error::{ConvertError, FactoryError, ValidatorError};
pub use factory::{FormatValidator, JsonValidator, ValidatorFactory};
pub use schema::{FieldType, Schema, SchemaField, SchemaMalformed};
pub use validator::{validate, Finding};
pub use value::Value;
