//! ComfyUI WebSocket message types and parser.
//!
//! ComfyUI pushes JSON messages over WebSocket with the shape
//! `{"type": "<kind>", "data": {...}}`. This module deserializes them
//! into a strongly-typed [`ComfyUIMessage`] enum.

use serde::Deserialize;

/// ComfyUI WebSocket message types the runner understands.
///
/// Deserialized via the adjacently-tagged `"type"` field with
/// associated `"data"` content.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ComfyUIMessage {
    /// Server status broadcast (queue depth, session ID).
    #[serde(rename = "status")]
    Status(StatusData),

    /// A prompt has started executing.
    #[serde(rename = "execution_start")]
    ExecutionStart(PromptData),

    /// Some nodes were skipped because their outputs are cached.
    #[serde(rename = "execution_cached")]
    ExecutionCached(ExecutionCachedData),

    /// A node is executing, or the whole prompt finished when `node` is empty.
    #[serde(rename = "executing")]
    Executing(ExecutingData),

    /// Step-level progress from a long-running node (e.g. KSampler).
    #[serde(rename = "progress")]
    Progress(ProgressData),

    /// A node has finished and produced output.
    #[serde(rename = "executed")]
    Executed(ExecutedData),

    /// Execution failed with an error.
    #[serde(rename = "execution_error")]
    ExecutionError(ErrorData),

    /// Execution was interrupted on the server.
    #[serde(rename = "execution_interrupted")]
    ExecutionInterrupted(PromptData),

    /// Sent by newer servers once every node of a prompt has run.
    #[serde(rename = "execution_success")]
    ExecutionSuccess(PromptData),
}

/// Queue status information.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusData {
    pub status: QueueStatus,
    /// Session ID; only present on the first status after connecting.
    #[serde(default)]
    pub sid: Option<String>,
}

/// Current queue state.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueStatus {
    pub exec_info: ExecInfo,
}

/// Execution queue statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecInfo {
    pub queue_remaining: i32,
}

/// Payload carrying only the prompt it refers to.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptData {
    pub prompt_id: String,
}

/// Payload for `execution_cached` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionCachedData {
    pub prompt_id: String,
    /// Node IDs whose outputs were served from cache.
    #[serde(default)]
    pub nodes: Vec<String>,
}

/// Payload for `executing` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutingData {
    #[serde(default)]
    pub node: Option<String>,
    pub prompt_id: String,
}

impl ExecutingData {
    /// True when this message signals the whole prompt has finished
    /// rather than a single node starting.
    pub fn is_finished(&self) -> bool {
        self.node.as_deref().map_or(true, str::is_empty)
    }

    /// True when this message signals completion of `prompt_id`.
    pub fn completes(&self, prompt_id: &str) -> bool {
        self.prompt_id == prompt_id && self.is_finished()
    }
}

/// Payload for `progress` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressData {
    /// Current step number.
    pub value: i32,
    /// Total number of steps.
    pub max: i32,
    #[serde(default)]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub node: Option<String>,
}

impl ProgressData {
    /// Completion percentage (0-100) of the current node.
    pub fn percent(&self) -> i16 {
        if self.max > 0 {
            ((self.value as f64 / self.max as f64) * 100.0) as i16
        } else {
            0
        }
    }
}

/// Payload for `executed` messages (node output).
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutedData {
    /// The node that produced this output.
    pub node: String,
    /// Raw output value (images, filenames, etc.).
    pub output: serde_json::Value,
    pub prompt_id: String,
}

/// Payload for `execution_error` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorData {
    pub prompt_id: String,
    pub node_id: String,
    pub exception_message: String,
    pub exception_type: String,
}

/// Parse a ComfyUI WebSocket text message into a typed enum.
///
/// Returns `Err` for malformed JSON or unknown `type` values.
pub fn parse_message(text: &str) -> Result<ComfyUIMessage, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executing(json: &str) -> ExecutingData {
        match parse_message(json).unwrap() {
            ComfyUIMessage::Executing(data) => data,
            other => panic!("Expected Executing, got {other:?}"),
        }
    }

    #[test]
    fn parse_initial_status_with_sid() {
        let json = r#"{"type":"status","data":{"status":{"exec_info":{"queue_remaining":0}},"sid":"abc"}}"#;
        match parse_message(json).unwrap() {
            ComfyUIMessage::Status(data) => {
                assert_eq!(data.status.exec_info.queue_remaining, 0);
                assert_eq!(data.sid.as_deref(), Some("abc"));
            }
            other => panic!("Expected Status, got {other:?}"),
        }
    }

    #[test]
    fn executing_node_is_not_finished() {
        let data = executing(r#"{"type":"executing","data":{"node":"42","prompt_id":"xyz"}}"#);
        assert_eq!(data.node.as_deref(), Some("42"));
        assert!(!data.is_finished());
        assert!(!data.completes("xyz"));
    }

    #[test]
    fn executing_null_node_completes_prompt() {
        let data = executing(r#"{"type":"executing","data":{"node":null,"prompt_id":"xyz"}}"#);
        assert!(data.is_finished());
        assert!(data.completes("xyz"));
        assert!(!data.completes("other"));
    }

    #[test]
    fn executing_missing_or_empty_node_completes_prompt() {
        assert!(executing(r#"{"type":"executing","data":{"prompt_id":"xyz"}}"#).completes("xyz"));
        assert!(executing(r#"{"type":"executing","data":{"node":"","prompt_id":"xyz"}}"#)
            .completes("xyz"));
    }

    #[test]
    fn progress_carries_percent() {
        let json = r#"{"type":"progress","data":{"value":5,"max":20,"prompt_id":"p","node":"3"}}"#;
        match parse_message(json).unwrap() {
            ComfyUIMessage::Progress(data) => {
                assert_eq!(data.percent(), 25);
                assert_eq!(data.node.as_deref(), Some("3"));
            }
            other => panic!("Expected Progress, got {other:?}"),
        }
    }

    #[test]
    fn progress_with_zero_max_is_zero_percent() {
        let data = ProgressData {
            value: 3,
            max: 0,
            prompt_id: None,
            node: None,
        };
        assert_eq!(data.percent(), 0);
    }

    #[test]
    fn parse_executed_message() {
        let json = r#"{"type":"executed","data":{"node":"9","output":{"images":[{"filename":"out.png"}]},"prompt_id":"abc"}}"#;
        match parse_message(json).unwrap() {
            ComfyUIMessage::Executed(data) => {
                assert_eq!(data.node, "9");
                assert!(data.output["images"].is_array());
            }
            other => panic!("Expected Executed, got {other:?}"),
        }
    }

    #[test]
    fn parse_execution_error_ignores_extra_fields() {
        let json = r#"{"type":"execution_error","data":{"prompt_id":"abc","node_id":"5","node_type":"KSampler","exception_message":"out of memory","exception_type":"RuntimeError","traceback":[]}}"#;
        match parse_message(json).unwrap() {
            ComfyUIMessage::ExecutionError(data) => {
                assert_eq!(data.node_id, "5");
                assert_eq!(data.exception_message, "out of memory");
            }
            other => panic!("Expected ExecutionError, got {other:?}"),
        }
    }

    #[test]
    fn parse_execution_success() {
        let json = r#"{"type":"execution_success","data":{"prompt_id":"abc","timestamp":1700000000}}"#;
        assert!(matches!(
            parse_message(json).unwrap(),
            ComfyUIMessage::ExecutionSuccess(PromptData { prompt_id }) if prompt_id == "abc"
        ));
    }

    #[test]
    fn unknown_type_and_garbage_are_errors() {
        assert!(parse_message(r#"{"type":"crystools.monitor","data":{}}"#).is_err());
        assert!(parse_message("not json at all").is_err());
    }
}
