//! Completion listener for a single submitted prompt.
//!
//! Reads frames from a ComfyUI WebSocket connection until the
//! `executing` message with an empty `node` arrives for the awaited
//! prompt.  There is no timeout: the wait ends only on completion, a
//! remote close, or a transport error.

use futures::StreamExt;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::client::{ComfyUIClientError, WsStream};
use crate::messages::{parse_message, ComfyUIMessage};

/// Wait until the server reports `prompt_id` as finished.
///
/// On completion the connection is closed from this side and `Ok(())`
/// is returned.  Frames that fail to parse, messages of other types,
/// messages for other prompts and per-node `executing` messages are
/// skipped.
pub async fn wait_for_completion(
    ws_stream: &mut WsStream,
    prompt_id: &str,
) -> Result<(), ComfyUIClientError> {
    while let Some(msg_result) = ws_stream.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                if is_completion(&text, prompt_id) {
                    tracing::info!(prompt_id, "Execution completed (all nodes done)");
                    if let Err(e) = ws_stream.close(None).await {
                        tracing::debug!(error = %e, "Failed to close WebSocket cleanly");
                    }
                    return Ok(());
                }
            }
            Ok(Message::Binary(data)) => {
                // Preview images; not needed for the final result.
                tracing::trace!(bytes = data.len(), "Ignoring binary message");
            }
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
            Ok(Message::Close(frame)) => {
                tracing::warn!(prompt_id, ?frame, "ComfyUI closed the WebSocket");
                return Err(closed(prompt_id));
            }
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed)
            | Err(WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)) => {
                tracing::warn!(prompt_id, "ComfyUI dropped the WebSocket");
                return Err(closed(prompt_id));
            }
            Err(e) => {
                tracing::error!(prompt_id, error = %e, "WebSocket receive error");
                return Err(ComfyUIClientError::Protocol(e));
            }
        }
    }

    Err(closed(prompt_id))
}

fn closed(prompt_id: &str) -> ComfyUIClientError {
    ComfyUIClientError::ConnectionClosed {
        prompt_id: prompt_id.to_string(),
    }
}

/// Inspect one text frame, logging anything of interest, and report
/// whether it completes `prompt_id`.
fn is_completion(text: &str, prompt_id: &str) -> bool {
    let msg = match parse_message(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::trace!(error = %e, raw_message = %text, "Skipping unparseable message");
            return false;
        }
    };

    match msg {
        ComfyUIMessage::Executing(data) => {
            if data.completes(prompt_id) {
                return true;
            }
            if let Some(node) = data.node.as_deref().filter(|_| data.prompt_id == prompt_id) {
                tracing::debug!(prompt_id, node, "Executing node");
            }
        }
        ComfyUIMessage::Progress(data) => {
            tracing::debug!(
                value = data.value,
                max = data.max,
                percent = data.percent(),
                "Generation progress",
            );
        }
        ComfyUIMessage::ExecutionStart(data) if data.prompt_id == prompt_id => {
            tracing::info!(prompt_id, "Execution started");
        }
        ComfyUIMessage::ExecutionCached(data) if data.prompt_id == prompt_id => {
            tracing::debug!(prompt_id, cached = data.nodes.len(), "Execution used cache");
        }
        ComfyUIMessage::Executed(data) if data.prompt_id == prompt_id => {
            tracing::debug!(prompt_id, node = %data.node, "Node executed with output");
        }
        ComfyUIMessage::ExecutionError(data) if data.prompt_id == prompt_id => {
            tracing::error!(
                prompt_id,
                node_id = %data.node_id,
                error_type = %data.exception_type,
                error_message = %data.exception_message,
                "Execution error",
            );
        }
        ComfyUIMessage::ExecutionInterrupted(data) if data.prompt_id == prompt_id => {
            tracing::warn!(prompt_id, "Execution interrupted");
        }
        ComfyUIMessage::Status(data) => {
            tracing::debug!(
                queue_remaining = data.status.exec_info.queue_remaining,
                "ComfyUI queue status",
            );
        }
        _ => {}
    }

    false
}
