//! API-format workflow documents.
//!
//! A workflow is a JSON object mapping node IDs to node definitions, each
//! carrying an `inputs` object. The runner treats it as opaque apart from
//! the seed of one sampler node, which is overwritten before every
//! submission so repeated runs produce different images.

use std::path::{Path, PathBuf};

use rand::Rng;
use serde_json::Value;

/// Exclusive upper bound for randomized seeds.
pub const SEED_UPPER_BOUND: u64 = 1_000_000_000;

/// Errors raised while loading or mutating a workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The file could not be read.
    #[error("Failed to read workflow {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("Failed to parse workflow {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed but its top level is not a JSON object.
    #[error("Workflow {} must be a JSON object keyed by node ID", path.display())]
    NotAnObject { path: PathBuf },

    /// The node expected to carry the seed has no `inputs` object.
    #[error("Workflow node '{node_id}' has no inputs object")]
    MissingInputs { node_id: String },
}

/// Read and parse a workflow document from disk.
pub fn load_workflow(path: impl AsRef<Path>) -> Result<Value, WorkflowError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| WorkflowError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_workflow(&text, path)
}

/// Parse workflow JSON text. `origin` is only used in error messages.
pub fn parse_workflow(text: &str, origin: &Path) -> Result<Value, WorkflowError> {
    let workflow: Value = serde_json::from_str(text).map_err(|source| WorkflowError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    if !workflow.is_object() {
        return Err(WorkflowError::NotAnObject {
            path: origin.to_path_buf(),
        });
    }
    Ok(workflow)
}

/// Overwrite `inputs.seed` of `node_id` with `seed`.
pub fn set_seed(workflow: &mut Value, node_id: &str, seed: u64) -> Result<(), WorkflowError> {
    let inputs = workflow
        .get_mut(node_id)
        .and_then(|node| node.get_mut("inputs"))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| WorkflowError::MissingInputs {
            node_id: node_id.to_string(),
        })?;

    inputs.insert("seed".to_string(), Value::from(seed));
    Ok(())
}

/// Replace the seed of `node_id` with a fresh value in
/// `0..SEED_UPPER_BOUND` and return it.
pub fn randomize_seed(workflow: &mut Value, node_id: &str) -> Result<u64, WorkflowError> {
    let seed = rand::rng().random_range(0..SEED_UPPER_BOUND);
    set_seed(workflow, node_id, seed)?;
    Ok(seed)
}
