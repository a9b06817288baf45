//! REST API client for the ComfyUI HTTP endpoints.
//!
//! Wraps the ComfyUI HTTP API (workflow submission, history retrieval,
//! image download) using [`reqwest`].

use serde::Deserialize;

/// HTTP client for a single ComfyUI instance.
pub struct ComfyUIApi {
    client: reqwest::Client,
    api_url: String,
}

/// Response returned by the ComfyUI `/prompt` endpoint after
/// successfully queuing a workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the queued prompt.
    pub prompt_id: String,
    /// Position in the execution queue.
    #[serde(default)]
    pub number: i64,
    /// Per-node validation problems reported alongside a queued prompt.
    #[serde(default)]
    pub node_errors: serde_json::Value,
}

/// Errors from the ComfyUI REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ComfyUIApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// ComfyUI returned a non-2xx status code.
    #[error("ComfyUI API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body, e.g. the node validation report for a
        /// rejected prompt.
        body: String,
    },
}

impl ComfyUIApiError {
    /// The server's response body, when the server answered at all.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::ApiError { body, .. } => Some(body),
            Self::Request(_) => None,
        }
    }
}

impl ComfyUIApi {
    /// Create a new API client for a ComfyUI instance.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:8188`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Submit a workflow for execution.
    ///
    /// Sends a `POST /prompt` request with the given workflow JSON.  When
    /// `client_id` is given it is included so that progress messages are
    /// routed to the matching WebSocket; otherwise the field is omitted.
    pub async fn submit_workflow(
        &self,
        workflow: &serde_json::Value,
        client_id: Option<&str>,
    ) -> Result<SubmitResponse, ComfyUIApiError> {
        let response = self.post_prompt(workflow, client_id).await?;
        Self::parse_response(response).await
    }

    /// Submit a workflow and return the success body exactly as the
    /// server sent it.
    pub async fn submit_workflow_raw(
        &self,
        workflow: &serde_json::Value,
        client_id: Option<&str>,
    ) -> Result<serde_json::Value, ComfyUIApiError> {
        let response = self.post_prompt(workflow, client_id).await?;
        Self::parse_response(response).await
    }

    /// Retrieve execution history for a specific prompt.
    ///
    /// Sends a `GET /history/{prompt_id}` request.  The returned JSON is
    /// keyed by prompt ID and contains per-node outputs.
    pub async fn get_history(&self, prompt_id: &str) -> Result<serde_json::Value, ComfyUIApiError> {
        let response = self
            .client
            .get(format!("{}/history/{}", self.api_url, prompt_id))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Download a file produced by a workflow.
    ///
    /// Sends a `GET /view?filename=&subfolder=&type=` request and returns
    /// the raw body bytes.
    pub async fn get_image(
        &self,
        filename: &str,
        subfolder: &str,
        folder_type: &str,
    ) -> Result<Vec<u8>, ComfyUIApiError> {
        let response = self
            .client
            .get(format!("{}/view", self.api_url))
            .query(&[
                ("filename", filename),
                ("subfolder", subfolder),
                ("type", folder_type),
            ])
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    async fn post_prompt(
        &self,
        workflow: &serde_json::Value,
        client_id: Option<&str>,
    ) -> Result<reqwest::Response, ComfyUIApiError> {
        let mut body = serde_json::json!({ "prompt": workflow });
        if let Some(client_id) = client_id {
            body["client_id"] = serde_json::Value::from(client_id);
        }

        Ok(self
            .client
            .post(format!("{}/prompt", self.api_url))
            .json(&body)
            .send()
            .await?)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ComfyUIApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ComfyUIApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ComfyUIApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ComfyUIApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
