//! Core execution span types for the Agentics execution system.
//!
//! Defines `ExecutionSpan`, `SpanType`, and `SpanStatus` used to build
//! hierarchical execution graphs: Core -> Repo -> Agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Status of an execution span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStatus {
    Running,
    Completed,
    Failed,
}

/// Type of execution span in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanType {
    Repo,
    Agent,
}

/// A single execution span in the Agentics execution graph.
///
/// Spans form a tree: Core -> Repo -> Agent(s).
/// Each span is append-only, causally ordered via `parent_span_id`,
/// and JSON-serializable without loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSpan {
    pub span_id: Uuid,
    pub parent_span_id: Uuid,
    pub execution_id: Uuid,
    pub span_type: SpanType,
    pub status: SpanStatus,
    pub name: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub attributes: HashMap<String, serde_json::Value>,
    pub artifacts: Vec<serde_json::Value>,
    pub children: Vec<ExecutionSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionSpan {
    /// Create a new repo-level span.
    pub fn new_repo(execution_id: Uuid, parent_span_id: Uuid, repo_name: &str) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert(
            "repo_name".to_string(),
            serde_json::Value::String(repo_name.to_string()),
        );

        Self {
            span_id: Uuid::new_v4(),
            parent_span_id,
            execution_id,
            span_type: SpanType::Repo,
            status: SpanStatus::Running,
            name: repo_name.to_string(),
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: None,
            attributes,
            artifacts: Vec::new(),
            children: Vec::new(),
            error: None,
        }
    }

    /// Create a new agent-level span.
    pub fn new_agent(execution_id: Uuid, parent_span_id: Uuid, agent_name: &str) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert(
            "agent_name".to_string(),
            serde_json::Value::String(agent_name.to_string()),
        );

        Self {
            span_id: Uuid::new_v4(),
            parent_span_id,
            execution_id,
            span_type: SpanType::Agent,
            status: SpanStatus::Running,
            name: agent_name.to_string(),
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: None,
            attributes,
            artifacts: Vec::new(),
            children: Vec::new(),
            error: None,
        }
    }

    /// Mark the span as completed.
    pub fn complete(&mut self) {
        let now = Utc::now();
        self.status = SpanStatus::Completed;
        self.ended_at = Some(now);
        self.duration_ms = Some(
            (now - self.started_at)
                .num_milliseconds()
                .max(0) as u64,
        );
    }

    /// Mark the span as failed with an error message.
    pub fn fail(&mut self, error: String) {
        let now = Utc::now();
        self.status = SpanStatus::Failed;
        self.ended_at = Some(now);
        self.duration_ms = Some(
            (now - self.started_at)
                .num_milliseconds()
                .max(0) as u64,
        );
        self.error = Some(error);
    }

    /// Attach an artifact to this span.
    pub fn attach_artifact(&mut self, artifact: serde_json::Value) {
        self.artifacts.push(artifact);
    }

    /// Add a child span.
    pub fn add_child(&mut self, child: ExecutionSpan) {
        self.children.push(child);
    }
}
