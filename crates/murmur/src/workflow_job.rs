//! The scheduled job: one blocking workflow call per tick.

use std::sync::Arc;

use murmur_dify::WorkflowClient;
use murmur_scheduler::JobExecutor;
use tracing::debug;

/// Build an executor that runs the workflow with empty inputs.
///
/// An unsuccessful call is reported to the scheduler as an error carrying
/// the call's message.
pub fn executor(workflow: Arc<WorkflowClient>) -> JobExecutor {
    Arc::new(move |job| {
        let workflow = Arc::clone(&workflow);

        Box::pin(async move {
            debug!(name = %job.name, "running scheduled workflow");
            let result = workflow.call_workflow(serde_json::Map::new()).await;

            if result.success {
                Ok(())
            } else {
                Err(result.message)
            }
        })
    })
}
