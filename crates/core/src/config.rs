//! Client configuration for a single ComfyUI server.

/// Default `host:port` of a locally running ComfyUI server.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8188";

/// Default location of the API-format workflow document.
pub const DEFAULT_WORKFLOW_PATH: &str = "workflow_api.json";

/// Default directory generated images are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Node whose `inputs.seed` is randomized before submission (the KSampler
/// in the stock text-to-image workflow).
pub const DEFAULT_SEED_NODE_ID: &str = "3";

/// Node whose history outputs hold the generated images (the SaveImage
/// node in the stock text-to-image workflow).
pub const DEFAULT_OUTPUT_NODE_ID: &str = "9";

/// Runner configuration, passed explicitly into every component.
///
/// All fields have defaults matching a stock local ComfyUI install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComfyUIConfig {
    /// Server `host:port`, without scheme.
    pub server_address: String,
    /// Path of the workflow JSON document.
    pub workflow_path: String,
    /// Directory images are saved into.
    pub output_dir: String,
    /// Node ID whose seed is randomized.
    pub seed_node_id: String,
    /// Node ID whose first image is downloaded.
    pub output_node_id: String,
}

impl Default for ComfyUIConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.into(),
            workflow_path: DEFAULT_WORKFLOW_PATH.into(),
            output_dir: DEFAULT_OUTPUT_DIR.into(),
            seed_node_id: DEFAULT_SEED_NODE_ID.into(),
            output_node_id: DEFAULT_OUTPUT_NODE_ID.into(),
        }
    }
}

impl ComfyUIConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default             |
    /// |-------------------------|---------------------|
    /// | `COMFYUI_ADDRESS`       | `127.0.0.1:8188`    |
    /// | `COMFYUI_WORKFLOW_PATH` | `workflow_api.json` |
    /// | `COMFYUI_OUTPUT_DIR`    | `out`               |
    /// | `COMFYUI_SEED_NODE`     | `3`                 |
    /// | `COMFYUI_OUTPUT_NODE`   | `9`                 |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup, falling back to
    /// defaults for missing or blank values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        Self {
            server_address: get("COMFYUI_ADDRESS", defaults.server_address),
            workflow_path: get("COMFYUI_WORKFLOW_PATH", defaults.workflow_path),
            output_dir: get("COMFYUI_OUTPUT_DIR", defaults.output_dir),
            seed_node_id: get("COMFYUI_SEED_NODE", defaults.seed_node_id),
            output_node_id: get("COMFYUI_OUTPUT_NODE", defaults.output_node_id),
        }
    }

    /// HTTP base URL, e.g. `http://127.0.0.1:8188`.
    pub fn api_url(&self) -> String {
        format!("http://{}", self.server_address)
    }

    /// WebSocket base URL, e.g. `ws://127.0.0.1:8188`.
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.server_address)
    }
}
