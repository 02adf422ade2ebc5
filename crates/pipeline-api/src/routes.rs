//! Route handlers for the control plane (§4.9, §6): schema CRUD, job
//! enqueue, and metrics. Each handler only deserializes the request, calls
//! the corresponding `registry-store`/`broker` function, and serializes the
//! result — no business logic lives here.

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;
use agentics_span::{ExecutionContextExtractor, ExecutionEnvelope, SpanTreeBuilder};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use pipeline_orchestrator::JobMessage;
use registry_store::{MoveRegistry, SchemaRegistry, SchemaRow};
use serde::Serialize;
use serde_json::Value as Json_;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/schema", axum::routing::put(put_schema))
        .route("/schema/all", get(list_all_schemas).delete(delete_all_schemas))
        .route("/schema/namespace/:namespace", get(list_schemas_by_namespace))
        .route("/schema/:namespace", delete(delete_schemas_by_namespace))
        .route("/job/validate/namespace/:namespace", post(enqueue_validation_job))
        .route(
            "/execution/job/validate/namespace/:namespace",
            post(enqueue_validation_job_instrumented),
        )
        .route("/metrics", get(list_metrics))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct SchemaCreated {
    id: String,
}

/// `PUT /schema` — register a new schema. The namespace is read from the
/// posted document's own `namespace` field (§3), matching the original's
/// schema-registry contract: the body *is* the Avro record document.
async fn put_schema(
    State(state): State<AppState>,
    Json(body): Json<Json_>,
) -> Result<(StatusCode, Json<ApiResponse<SchemaCreated>>), ApiError> {
    let namespace = body
        .get("namespace")
        .and_then(Json_::as_str)
        .ok_or_else(|| ApiError::MalformedRequest("schema document is missing a 'namespace' string field".to_string()))?
        .to_string();

    let session = state.storage.session();
    let id = SchemaRegistry::insert(&session, &namespace, &body.to_string())?;

    let response = ApiResponse::success(SchemaCreated { id }, uuid::Uuid::new_v4().to_string());
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /schema/all`
async fn list_all_schemas(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SchemaRow>>>, ApiError> {
    let session = state.storage.session();
    let rows = SchemaRegistry::get_all(&session)?;
    Ok(Json(ApiResponse::success(rows, uuid::Uuid::new_v4().to_string())))
}

/// `GET /schema/namespace/{ns}`
async fn list_schemas_by_namespace(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<ApiResponse<Vec<SchemaRow>>>, ApiError> {
    let session = state.storage.session();
    let rows = SchemaRegistry::get_by_namespace(&session, &namespace)?;
    Ok(Json(ApiResponse::success(rows, uuid::Uuid::new_v4().to_string())))
}

/// `DELETE /schema/all` — 201, per the original control plane's (unusual
/// but preserved, see O5) convention of answering deletions with 201.
async fn delete_all_schemas(
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let session = state.storage.session();
    SchemaRegistry::delete_all(&session)?;
    Ok(StatusCode::CREATED)
}

/// `DELETE /schema/{ns}` — 201, same convention as `delete_all_schemas`.
async fn delete_schemas_by_namespace(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session = state.storage.session();
    SchemaRegistry::delete_by_namespace(&session, &namespace)?;
    Ok(StatusCode::CREATED)
}

#[derive(Debug, Serialize)]
struct JobEnqueued {
    message: String,
}

/// `POST /job/validate/namespace/{ns}` — publish a validation job for
/// `namespace` onto the broker's main routing key.
async fn enqueue_validation_job(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<ApiResponse<JobEnqueued>>, ApiError> {
    publish_job(&state, &namespace).await?;
    let body = JobEnqueued { message: format!("validation job enqueued for namespace '{namespace}'") };
    Ok(Json(ApiResponse::success(body, uuid::Uuid::new_v4().to_string())))
}

/// `POST /execution/job/validate/namespace/{ns}` — the instrumented mirror
/// of `enqueue_validation_job`, requiring `X-Parent-Span-Id` and returning
/// a span tree, matching the teacher's `/execution/validate` precedent.
async fn enqueue_validation_job_instrumented(
    exec_ctx: ExecutionContextExtractor,
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<ExecutionEnvelope<JobEnqueued>>, ApiError> {
    let ctx = exec_ctx.0;
    let mut tree = SpanTreeBuilder::new(&ctx, "pipeline-api");
    let mut agent_span = tree.start_agent_span("job-enqueue");

    match publish_job(&state, &namespace).await {
        Ok(()) => {
            let body = JobEnqueued { message: format!("validation job enqueued for namespace '{namespace}'") };
            if let Ok(artifact) = serde_json::to_value(&body) {
                agent_span.attach_artifact(artifact);
            }
            agent_span.complete();
            tree.add_completed_agent_span(agent_span);
            Ok(Json(ExecutionEnvelope::success(body, tree.finalize())))
        }
        Err(err) => {
            let message = err.to_string();
            agent_span.fail(message.clone());
            tree.add_completed_agent_span(agent_span);
            Ok(Json(ExecutionEnvelope::failure(message, tree.finalize())))
        }
    }
}

async fn publish_job(state: &AppState, namespace: &str) -> Result<(), ApiError> {
    let message = JobMessage::new(namespace.to_string());
    let body = message
        .to_bytes()
        .map_err(|e| ApiError::MalformedRequest(e.to_string()))?;
    state.broker.publish(&body).await?;
    Ok(())
}

/// `GET /metrics` — the `metric` view: counts grouped by destination bucket.
async fn list_metrics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<registry_store::MetricRow>>>, ApiError> {
    let session = state.storage.session();
    let rows = MoveRegistry::get_metric_view(&session)?;
    Ok(Json(ApiResponse::success(rows, uuid::Uuid::new_v4().to_string())))
}
