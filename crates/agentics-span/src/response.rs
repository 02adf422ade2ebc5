//! Response envelope that wraps agent output with the execution span tree.

use serde::{Deserialize, Serialize};

use crate::span::{ExecutionSpan, SpanStatus};

/// Response envelope for instrumented endpoints.
///
/// Always includes the span tree, even on failure. The `success` field
/// reflects the repo span status — it is `false` if any agent failed
/// or if no agent spans were emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionEnvelope<T> {
    /// Whether the execution completed successfully.
    pub success: bool,
    /// The agent output data (present on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The complete execution span tree (always present).
    pub span_tree: ExecutionSpan,
}

impl<T: Serialize> ExecutionEnvelope<T> {
    /// Create a successful response. The `success` field is derived from
    /// the span tree status — if the tree was finalized as failed (e.g.
    /// no agent spans), this will still be `false`.
    pub fn success(data: T, span_tree: ExecutionSpan) -> Self {
        Self {
            success: span_tree.status == SpanStatus::Completed,
            data: Some(data),
            error: None,
            span_tree,
        }
    }

    /// Create a failure response. Span tree is always included.
    pub fn failure(error: String, span_tree: ExecutionSpan) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            span_tree,
        }
    }
}
