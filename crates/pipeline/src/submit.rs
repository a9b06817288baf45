//! Fire-and-forget submission: queue the workflow and report what the
//! server answered.

use comfyrun_comfyui::api::ComfyUIApi;
use comfyrun_core::config::ComfyUIConfig;
use comfyrun_core::workflow::load_workflow;

use crate::error::PipelineError;

/// Load the configured workflow and queue it unchanged, without a
/// client ID.  Returns the server's answer as received.
pub async fn run(config: &ComfyUIConfig) -> Result<serde_json::Value, PipelineError> {
    let workflow = load_workflow(&config.workflow_path)?;
    tracing::debug!(workflow = %workflow, "Loaded workflow");

    let api = ComfyUIApi::new(config.api_url());
    let response = api
        .submit_workflow_raw(&workflow, None)
        .await
        .map_err(PipelineError::Submission)?;

    tracing::info!(
        prompt_id = ?response.get("prompt_id"),
        number = ?response.get("number"),
        "Workflow queued",
    );
    Ok(response)
}
