//! `comfy-generate` -- run a workflow on ComfyUI and save the result.
//!
//! Randomizes the sampler seed, submits the workflow, waits for the
//! completion message over WebSocket, downloads the first image of the
//! output node and writes it to the output directory.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default             | Description                    |
//! |-------------------------|----------|---------------------|--------------------------------|
//! | `COMFYUI_ADDRESS`       | no       | `127.0.0.1:8188`    | ComfyUI `host:port`            |
//! | `COMFYUI_WORKFLOW_PATH` | no       | `workflow_api.json` | API-format workflow file       |
//! | `COMFYUI_OUTPUT_DIR`    | no       | `out`               | Directory images are saved to  |
//! | `COMFYUI_SEED_NODE`     | no       | `3`                 | Node whose seed is randomized  |
//! | `COMFYUI_OUTPUT_NODE`   | no       | `9`                 | Node whose image is downloaded |

use comfyrun_core::config::ComfyUIConfig;
use comfyrun_pipeline::{generate, logging};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init();

    let config = ComfyUIConfig::from_env();
    tracing::info!(
        server = %config.server_address,
        workflow = %config.workflow_path,
        output_dir = %config.output_dir,
        "Starting generation",
    );

    match generate::run(&config).await {
        Ok(outcome) => println!("Image saved to: {}", outcome.path.display()),
        Err(e) => {
            tracing::error!(error = %e, "Generation failed");
            std::process::exit(1);
        }
    }
}
