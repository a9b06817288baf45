//! Interpretation of ComfyUI `/history/{prompt_id}` records.
//!
//! The record has the shape
//! `{ "<prompt_id>": { "outputs": { "<node_id>": { "images": [ {...} ] } } } }`.
//! Only the first image produced by one output node is of interest.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Location of a generated image on the ComfyUI server, as accepted by
/// the `/view` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub filename: String,
    /// Empty when the image sits directly in the folder; servers send
    /// either `""`, `null` or nothing for that case.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subfolder: String,
    /// Folder classifier: `output`, `temp` or `input`.
    #[serde(rename = "type")]
    pub folder_type: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The history record did not have the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("History has no entry for prompt {prompt_id}")]
    MissingPrompt { prompt_id: String },

    #[error("History entry for prompt {prompt_id} has no outputs")]
    MissingOutputs { prompt_id: String },

    #[error("History for prompt {prompt_id} has no outputs for node '{node_id}'")]
    MissingOutputNode { prompt_id: String, node_id: String },

    #[error("Node '{node_id}' of prompt {prompt_id} produced no images")]
    NoImages { prompt_id: String, node_id: String },

    #[error("Malformed image descriptor: {0}")]
    InvalidDescriptor(#[from] serde_json::Error),
}

/// Extract the first image produced by `node_id` for `prompt_id`.
pub fn first_output_image(
    history: &Value,
    prompt_id: &str,
    node_id: &str,
) -> Result<ImageDescriptor, HistoryError> {
    let entry = history
        .get(prompt_id)
        .ok_or_else(|| HistoryError::MissingPrompt {
            prompt_id: prompt_id.to_string(),
        })?;

    let outputs = entry
        .get("outputs")
        .ok_or_else(|| HistoryError::MissingOutputs {
            prompt_id: prompt_id.to_string(),
        })?;

    let node_output = outputs
        .get(node_id)
        .ok_or_else(|| HistoryError::MissingOutputNode {
            prompt_id: prompt_id.to_string(),
            node_id: node_id.to_string(),
        })?;

    let first = node_output
        .get("images")
        .and_then(Value::as_array)
        .and_then(|images| images.first())
        .ok_or_else(|| HistoryError::NoImages {
            prompt_id: prompt_id.to_string(),
            node_id: node_id.to_string(),
        })?;

    Ok(ImageDescriptor::deserialize(first)?)
}
