//! Tracing setup shared by the runner binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "comfyrun_pipeline=info,comfyrun_comfyui=info";

/// Install the global subscriber: `RUST_LOG` (or [`DEFAULT_LOG_FILTER`])
/// plus human-readable formatting.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
