//! HTTP routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post, put},
};
use murmur_comments::{CommentService, ReplyOutcome, UnrepliedComments};
use murmur_dify::{WorkflowCallResult, WorkflowClient};
use murmur_scheduler::{Job, Scheduler, SchedulerStatus};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::WebError;

/// Shared state for the web server.
pub struct AppState {
    pub comments: CommentService,
    pub workflow: Arc<WorkflowClient>,
    pub scheduler: Arc<Scheduler>,
    /// Interval used when a start request names none.
    default_interval: RwLock<u32>,
}

impl AppState {
    pub fn new(
        comments: CommentService,
        workflow: Arc<WorkflowClient>,
        scheduler: Arc<Scheduler>,
        default_interval: u32,
    ) -> Self {
        Self {
            comments,
            workflow,
            scheduler,
            default_interval: RwLock::new(default_interval),
        }
    }

    pub async fn default_interval(&self) -> u32 {
        *self.default_interval.read().await
    }
}

/// Create the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        // Comments
        .route("/api/comments/unreplied", post(unreplied_comments))
        .route("/api/comments/reply", post(reply_to_comment))
        // Workflow
        .route("/api/dify/call", post(call_workflow))
        .route("/api/dify/scheduler/start", post(start_scheduler))
        .route("/api/dify/scheduler/stop", post(stop_scheduler))
        .route("/api/dify/scheduler/status", get(scheduler_status))
        .route("/api/dify/config", put(update_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "murmur comment assistant",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "message": "service is up",
    }))
}

async fn unreplied_comments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UnrepliedComments>, WebError> {
    let unreplied = state.comments.find_own_unreplied().await?;
    Ok(Json(unreplied))
}

/// Body of a reply request, in the remote API's terms.
#[derive(Debug, Deserialize)]
struct ReplyRequest {
    oid: i64,
    rpid: i64,
    message: String,
    #[serde(default)]
    root: i64,
}

async fn reply_to_comment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReplyRequest>,
) -> Json<ReplyOutcome> {
    let outcome = state
        .comments
        .submit_reply(req.oid, req.rpid, &req.message, req.root)
        .await;
    Json(outcome)
}

#[derive(Debug, Default, Deserialize)]
struct WorkflowCallRequest {
    #[serde(default)]
    inputs: Map<String, Value>,
}

/// Run the workflow once. The body is optional.
async fn call_workflow(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<WorkflowCallResult>, WebError> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        WorkflowCallRequest::default()
    } else {
        serde_json::from_slice::<WorkflowCallRequest>(&body)
            .map_err(|e| WebError::BadRequest(format!("invalid request body: {}", e)))?
    };

    Ok(Json(state.workflow.call_workflow(req.inputs).await))
}

#[derive(Debug, Deserialize)]
struct StartParams {
    interval_hours: Option<u32>,
}

async fn start_scheduler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StartParams>,
) -> Result<Json<Value>, WebError> {
    let interval_hours = match params.interval_hours {
        Some(h) => h,
        None => state.default_interval().await,
    };

    let job = state.scheduler.start(interval_hours).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("scheduler started, running {}", job.name),
        "interval_hours": job.interval_hours,
    })))
}

async fn stop_scheduler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, WebError> {
    state.scheduler.stop().await?;

    Ok(Json(json!({
        "success": true,
        "message": "scheduler stopped",
    })))
}

async fn scheduler_status(State(state): State<Arc<AppState>>) -> Json<SchedulerStatus> {
    Json(state.scheduler.status().await)
}

#[derive(Debug, Deserialize)]
struct ConfigUpdate {
    base_url: Option<String>,
    interval_hours: Option<u32>,
}

/// Update the workflow base URL and default interval. Not persisted.
async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ConfigUpdate>,
) -> Result<Json<Value>, WebError> {
    if let Some(hours) = update.interval_hours {
        // Validate before applying anything
        Job::every_hours(hours)?;
    }

    if let Some(base_url) = update.base_url.as_deref().map(str::trim) {
        if base_url.is_empty() {
            return Err(WebError::BadRequest("base_url must not be empty".to_string()));
        }
        state.workflow.set_base_url(base_url).await;
    }

    if let Some(hours) = update.interval_hours {
        *state.default_interval.write().await = hours;
        info!(interval_hours = hours, "updated default scheduler interval");
    }

    Ok(Json(json!({
        "success": true,
        "message": "configuration updated",
        "config": {
            "base_url": state.workflow.base_url().await,
            "interval_hours": state.default_interval().await,
        },
    })))
}
