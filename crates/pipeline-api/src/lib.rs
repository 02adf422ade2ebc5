//! The control-plane HTTP surface (§4.9, §6): a thin `axum` adapter over
//! `registry-store` and `broker`. No business logic lives here — every
//! handler deserializes, calls a use-case function, and serializes the
//! result.

pub mod error;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use response::{ApiResponse, ErrorInfo, ResponseMetadata};
pub use state::AppState;

use axum::Router;

/// Build the full control-plane router bound to `state`.
pub fn router(state: AppState) -> Router {
    routes::router(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use broker::InMemoryBroker;
    use registry_store::{SchemaRegistry, StorageConnection};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let storage = StorageConnection::open_temporary().unwrap();
        let session = storage.session();
        SchemaRegistry::initialize(&session).unwrap();
        registry_store::MoveRegistry::initialize(&session).unwrap();
        let broker: Arc<dyn broker::Broker> = Arc::new(InMemoryBroker::new(Duration::from_millis(10)));
        AppState::new(storage, broker)
    }

    #[tokio::test]
    async fn put_schema_creates_a_new_row() {
        let app = router(test_state());
        let body = serde_json::json!({
            "type": "record",
            "namespace": "rfb.json",
            "name": "R",
            "fields": [{"name": "a", "type": "string"}]
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/schema")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn put_schema_without_namespace_is_unprocessable() {
        let app = router(test_state());
        let body = serde_json::json!({"fields": []});

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/schema")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn delete_all_schemas_returns_201() {
        let app = router(test_state());

        let response = app
            .oneshot(Request::builder().method("DELETE").uri("/schema/all").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn metrics_endpoint_returns_empty_list_when_no_jobs_ran() {
        let app = router(test_state());

        let response = app
            .oneshot(Request::builder().method("GET").uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn enqueue_validation_job_publishes_to_the_broker() {
        let app = router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/job/validate/namespace/rfb.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
