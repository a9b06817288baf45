//! WebSocket client for connecting to a ComfyUI instance.
//!
//! [`ComfyUIClient`] holds the connection configuration for a single
//! ComfyUI instance.  Call [`ComfyUIClient::connect`] to establish a
//! live [`ComfyUIConnection`] over WebSocket.

use tokio_tungstenite::{connect_async, MaybeTlsStream};

use crate::listener;

/// WebSocket stream type produced by [`ComfyUIClient::connect`].
pub type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Configuration handle for a ComfyUI instance.
///
/// Create a [`ComfyUIConnection`] by calling [`connect`](Self::connect).
pub struct ComfyUIClient {
    ws_url: String,
}

/// A live WebSocket connection to a ComfyUI instance.
///
/// Owned by a single run: opened before the prompt is submitted and
/// consumed by [`wait_for_completion`](Self::wait_for_completion).
#[derive(Debug)]
pub struct ComfyUIConnection {
    /// Unique client ID sent during the WebSocket handshake.  Pass it
    /// along with the prompt so the server routes progress messages here.
    pub client_id: String,
    /// The raw WebSocket stream for reading/writing frames.
    pub ws_stream: WsStream,
}

impl ComfyUIClient {
    /// Create a new client targeting a ComfyUI instance.
    ///
    /// * `ws_url` - WebSocket base URL, e.g. `ws://host:8188`.
    pub fn new(ws_url: String) -> Self {
        Self { ws_url }
    }

    /// Connect to the ComfyUI WebSocket endpoint.
    ///
    /// Generates a unique `client_id` (UUID v4) and appends it as a
    /// query parameter so that ComfyUI can address messages back to
    /// this specific client.
    pub async fn connect(&self) -> Result<ComfyUIConnection, ComfyUIClientError> {
        let client_id = uuid::Uuid::new_v4().to_string();
        let url = format!("{}/ws?clientId={}", self.ws_url, client_id);

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            ComfyUIClientError::Connection(format!(
                "Failed to connect to ComfyUI at {}: {e}",
                self.ws_url
            ))
        })?;

        tracing::info!(client_id = %client_id, "Connected to ComfyUI at {}", self.ws_url);

        Ok(ComfyUIConnection {
            client_id,
            ws_stream,
        })
    }
}

impl ComfyUIConnection {
    /// Block until the server reports `prompt_id` finished, then close
    /// the connection.  See [`listener::wait_for_completion`].
    pub async fn wait_for_completion(mut self, prompt_id: &str) -> Result<(), ComfyUIClientError> {
        listener::wait_for_completion(&mut self.ws_stream, prompt_id).await
    }
}

/// Errors that can occur when working with the WebSocket client.
#[derive(Debug, thiserror::Error)]
pub enum ComfyUIClientError {
    /// Failed to establish the initial WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server closed the connection before the prompt completed.
    #[error("Connection closed by server before prompt {prompt_id} completed")]
    ConnectionClosed { prompt_id: String },

    /// A transport-level error on an already-established connection.
    #[error("Protocol error: {0}")]
    Protocol(#[from] tokio_tungstenite::tungstenite::Error),
}
