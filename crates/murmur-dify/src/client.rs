//! Workflow HTTP client.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::{WorkflowCallResult, WorkflowRequest};

/// Base URL of a self-hosted Dify instance.
pub const DEFAULT_BASE_URL: &str = "http://localhost/v1";

/// Upper bound on a single workflow call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// End-user identifier sent with every call.
pub const WORKFLOW_USER: &str = "murmur";

/// Client for a Dify workflow app.
pub struct WorkflowClient {
    http: Client,
    base_url: RwLock<String>,
    api_key: String,
    timeout: Duration,
}

impl WorkflowClient {
    /// Create a new client for the given base URL and app API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: RwLock::new(normalize_base_url(base_url.into())),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current base URL.
    pub async fn base_url(&self) -> String {
        self.base_url.read().await.clone()
    }

    /// Point the client at a different Dify instance.
    pub async fn set_base_url(&self, base_url: impl Into<String>) {
        let base_url = normalize_base_url(base_url.into());
        info!(base_url = %base_url, "updated workflow base URL");
        *self.base_url.write().await = base_url;
    }

    /// Full `/workflows/run` URL.
    pub async fn endpoint(&self) -> String {
        format!("{}/workflows/run", self.base_url.read().await)
    }

    /// Run the workflow once in blocking mode.
    ///
    /// Never returns an error: timeouts, HTTP errors and transport failures
    /// all produce an unsuccessful [`WorkflowCallResult`].
    #[tracing::instrument(skip(self, inputs))]
    pub async fn call_workflow(
        &self,
        inputs: serde_json::Map<String, serde_json::Value>,
    ) -> WorkflowCallResult {
        let call_time = Utc::now();
        let url = self.endpoint().await;

        let body = WorkflowRequest {
            inputs: &inputs,
            response_mode: "blocking",
            user: WORKFLOW_USER,
        };

        info!(url = %url, "calling workflow");
        debug!(inputs = %serde_json::Value::Object(inputs.clone()), "workflow inputs");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return self.transport_failure(e, call_time),
        };

        let status = response.status();
        info!(status = status.as_u16(), "workflow responded");

        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => return self.transport_failure(e, call_time),
        };

        if !status.is_success() {
            let message = format!("workflow call failed with status {}", status.as_u16());
            error!(status = status.as_u16(), body = %text, "workflow call failed");
            return WorkflowCallResult::failed(
                message,
                Some(serde_json::json!({
                    "status_code": status.as_u16(),
                    "content": text,
                })),
                call_time,
            );
        }

        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(data) => {
                debug!(response = %data, "workflow succeeded");
                WorkflowCallResult::succeeded(data, call_time)
            }
            Err(e) => {
                error!(error = %e, "workflow returned invalid JSON");
                WorkflowCallResult::failed(
                    format!("workflow returned invalid JSON: {}", e),
                    None,
                    call_time,
                )
            }
        }
    }

    fn transport_failure(
        &self,
        e: reqwest::Error,
        call_time: chrono::DateTime<Utc>,
    ) -> WorkflowCallResult {
        if e.is_timeout() {
            let message = format!(
                "workflow call timed out after {}s",
                self.timeout.as_secs_f64()
            );
            error!(timeout_secs = self.timeout.as_secs_f64(), "workflow call timed out");
            WorkflowCallResult::failed(message, None, call_time)
        } else {
            error!(error = %e, "workflow call failed");
            WorkflowCallResult::failed(format!("workflow call failed: {}", e), None, call_time)
        }
    }
}

fn normalize_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}
