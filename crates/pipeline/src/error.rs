//! Errors surfaced by the runner flows.
//!
//! Every variant is fatal to the current run; nothing is retried.

use comfyrun_comfyui::api::ComfyUIApiError;
use comfyrun_comfyui::client::ComfyUIClientError;
use comfyrun_core::history::HistoryError;
use comfyrun_core::workflow::WorkflowError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The workflow file is missing, unreadable or malformed.
    #[error("Failed to load workflow: {0}")]
    Load(#[from] WorkflowError),

    /// `POST /prompt` failed or was rejected.
    #[error("Failed to submit workflow: {0}")]
    Submission(#[source] ComfyUIApiError),

    /// The server closed the WebSocket before the prompt completed.
    #[error("Connection closed by server before prompt {prompt_id} completed")]
    ConnectionClosed { prompt_id: String },

    /// Connecting to, or reading from, the WebSocket failed.
    #[error("WebSocket error: {0}")]
    WebSocket(#[source] ComfyUIClientError),

    /// History lookup or image download failed.
    #[error("Request to ComfyUI failed: {0}")]
    Transport(#[source] ComfyUIApiError),

    /// The history record is missing the expected output image.
    #[error("Unexpected history response: {0}")]
    ResponseShape(#[from] HistoryError),

    /// Writing the image to disk failed.
    #[error("Failed to save image: {0}")]
    Save(#[from] std::io::Error),
}

impl From<ComfyUIClientError> for PipelineError {
    fn from(err: ComfyUIClientError) -> Self {
        match err {
            ComfyUIClientError::ConnectionClosed { prompt_id } => Self::ConnectionClosed { prompt_id },
            other => Self::WebSocket(other),
        }
    }
}

impl PipelineError {
    /// The server's response body for a rejected submission, if any.
    pub fn submission_body(&self) -> Option<&str> {
        match self {
            Self::Submission(e) => e.response_body(),
            _ => None,
        }
    }
}
