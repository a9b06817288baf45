//! Submit-wait-fetch pipeline.
//!
//! 1. Load the workflow and randomize the sampler seed.
//! 2. Open a WebSocket tagged with a fresh client ID.
//! 3. Submit the workflow with that client ID.
//! 4. Wait for the completion message for the returned prompt ID.
//! 5. Look up the prompt history and pick the first output image.
//! 6. Download the image and write it to the output directory.
//!
//! Any failure aborts the remaining steps.

use std::path::{Path, PathBuf};

use comfyrun_comfyui::api::ComfyUIApi;
use comfyrun_comfyui::client::ComfyUIClient;
use comfyrun_core::config::ComfyUIConfig;
use comfyrun_core::history::{first_output_image, ImageDescriptor};
use comfyrun_core::workflow::{load_workflow, randomize_seed};

use crate::error::PipelineError;
use crate::output::save_image;

/// Result of a successful generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub prompt_id: String,
    pub image: ImageDescriptor,
    /// Where the image was written locally.
    pub path: PathBuf,
}

/// Run the whole pipeline against the configured server.
pub async fn run(config: &ComfyUIConfig) -> Result<GenerationOutcome, PipelineError> {
    let mut workflow = load_workflow(&config.workflow_path)?;
    let seed = randomize_seed(&mut workflow, &config.seed_node_id)?;
    tracing::info!(seed, node = %config.seed_node_id, "Randomized seed");

    let api = ComfyUIApi::new(config.api_url());
    let client = ComfyUIClient::new(config.ws_url());

    let prompt_id = execute_workflow(&api, &client, &workflow).await?;
    let image = fetch_output_descriptor(&api, &prompt_id, &config.output_node_id).await?;

    let bytes = api
        .get_image(&image.filename, &image.subfolder, &image.folder_type)
        .await
        .map_err(PipelineError::Transport)?;
    let path = save_image(Path::new(&config.output_dir), &image.filename, &bytes).await?;

    tracing::info!(prompt_id = %prompt_id, path = %path.display(), "Image saved");
    Ok(GenerationOutcome {
        prompt_id,
        image,
        path,
    })
}

/// Submit `workflow` and wait until the server reports it finished.
///
/// The WebSocket is opened before submission so no completion message
/// can be missed. Returns the prompt ID.
pub async fn execute_workflow(
    api: &ComfyUIApi,
    client: &ComfyUIClient,
    workflow: &serde_json::Value,
) -> Result<String, PipelineError> {
    let conn = client.connect().await?;

    let response = api
        .submit_workflow(workflow, Some(&conn.client_id))
        .await
        .map_err(PipelineError::Submission)?;
    tracing::info!(
        prompt_id = %response.prompt_id,
        client_id = %conn.client_id,
        "Workflow submitted, waiting for completion",
    );

    conn.wait_for_completion(&response.prompt_id).await?;
    Ok(response.prompt_id)
}

/// Look up `prompt_id` in the history and return its first output image.
async fn fetch_output_descriptor(
    api: &ComfyUIApi,
    prompt_id: &str,
    output_node_id: &str,
) -> Result<ImageDescriptor, PipelineError> {
    let history = api
        .get_history(prompt_id)
        .await
        .map_err(PipelineError::Transport)?;
    Ok(first_output_image(&history, prompt_id, output_node_id)?)
}
