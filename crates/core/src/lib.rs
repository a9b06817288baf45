//! Network-free building blocks for the ComfyUI runner.
//!
//! Holds client configuration, workflow loading and seed mutation, and
//! interpretation of `/history` records into output image descriptors.

pub mod config;
pub mod history;
pub mod workflow;
