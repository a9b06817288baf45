//! `comfy-submit` -- queue a workflow on ComfyUI and print the response.
//!
//! Prints the server's JSON answer to stdout: the queued prompt on
//! success, or the error body when the server rejects the workflow.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default             | Description              |
//! |-------------------------|----------|---------------------|--------------------------|
//! | `COMFYUI_ADDRESS`       | no       | `127.0.0.1:8188`    | ComfyUI `host:port`      |
//! | `COMFYUI_WORKFLOW_PATH` | no       | `workflow_api.json` | API-format workflow file |

use comfyrun_core::config::ComfyUIConfig;
use comfyrun_pipeline::{logging, submit};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init();

    let config = ComfyUIConfig::from_env();
    tracing::info!(
        server = %config.server_address,
        workflow = %config.workflow_path,
        "Submitting workflow",
    );

    match submit::run(&config).await {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to render response"),
        },
        Err(e) => {
            if let Some(body) = e.submission_body() {
                println!("{body}");
            }
            tracing::error!(error = %e, "Submission failed");
            std::process::exit(1);
        }
    }
}
