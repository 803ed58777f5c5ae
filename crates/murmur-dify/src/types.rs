//! Workflow request and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of a `/workflows/run` request.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRequest<'a> {
    pub inputs: &'a serde_json::Map<String, serde_json::Value>,
    pub response_mode: &'static str,
    pub user: &'a str,
}

/// Outcome of one workflow call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowCallResult {
    pub success: bool,
    pub message: String,
    /// Parsed response body on success; `{status_code, content}` on an HTTP error.
    pub response_data: Option<serde_json::Value>,
    pub call_time: DateTime<Utc>,
}

impl WorkflowCallResult {
    pub fn succeeded(response_data: serde_json::Value, call_time: DateTime<Utc>) -> Self {
        Self {
            success: true,
            message: "workflow executed successfully".to_string(),
            response_data: Some(response_data),
            call_time,
        }
    }

    pub fn failed(
        message: impl Into<String>,
        response_data: Option<serde_json::Value>,
        call_time: DateTime<Utc>,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            response_data,
            call_time,
        }
    }

    /// HTTP status carried by a failed call, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        if self.success {
            return None;
        }
        self.response_data
            .as_ref()
            .and_then(|d| d.get("status_code"))
            .and_then(|s| s.as_u64())
            .and_then(|s| u16::try_from(s).ok())
    }
}
