//! Maps domain errors onto HTTP status codes per the error-handling design.

use crate::response::{ApiResponse, ErrorInfo};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use broker::BrokerError;
use registry_store::StoreError;
use validation_core::SchemaMalformed;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    /// A request body failed basic shape validation before it ever reached
    /// a use-case (e.g. a schema document missing its `namespace` field).
    MalformedRequest(String),
    SchemaInvalid(SchemaMalformed),
    Storage(StoreError),
    Broker(BrokerError),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MalformedRequest(_) => "MALFORMED_REQUEST",
            ApiError::SchemaInvalid(_) => "SCHEMA_MALFORMED",
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::Broker(_) => "BROKER_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MalformedRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::SchemaInvalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Broker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "{msg}"),
            ApiError::MalformedRequest(msg) => write!(f, "{msg}"),
            ApiError::SchemaInvalid(err) => write!(f, "malformed schema: {}", err.detail),
            ApiError::Storage(err) => write!(f, "{err}"),
            ApiError::Broker(err) => write!(f, "{err}"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Storage(err)
    }
}

impl From<BrokerError> for ApiError {
    fn from(err: BrokerError) -> Self {
        ApiError::Broker(err)
    }
}

impl From<SchemaMalformed> for ApiError {
    fn from(err: SchemaMalformed) -> Self {
        ApiError::SchemaInvalid(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let error_info = ErrorInfo::new(self.code(), message);
        let response = ApiResponse::<()>::error(error_info, uuid::Uuid::new_v4().to_string());
        (status, Json(response)).into_response()
    }
}
