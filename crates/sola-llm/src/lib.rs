//! Text generation for the tiny-sola voice assistant.
//!
//! A thin client for an Ollama server: one non-streaming completion call per
//! prompt, plus a short reachability check for health reporting.

pub mod client;
pub mod config;
pub mod error;

pub use client::GenerationClient;
pub use config::GenerationConfig;
pub use error::GenerationError;
