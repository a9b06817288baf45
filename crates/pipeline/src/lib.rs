//! `comfyrun-pipeline` library crate.
//!
//! The two runner flows: [`submit`] queues a workflow and hands back the
//! server's answer, [`generate`] queues it, waits for completion over
//! WebSocket, downloads the first output image and saves it locally.
//! The binaries in `src/bin` are thin wrappers around these.

pub mod error;
pub mod generate;
pub mod logging;
pub mod output;
pub mod submit;
