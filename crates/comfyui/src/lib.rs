//! ComfyUI WebSocket and REST client library.
//!
//! Provides typed message parsing, the WebSocket connection handle,
//! HTTP API wrappers for prompt submission, history lookup and image
//! download, and the completion listener that waits for a submitted
//! prompt to finish.

pub mod api;
pub mod client;
pub mod listener;
pub mod messages;
