//! Triarb Config
//!
//! Loads and validates the JSON configuration file at a given path,
//! producing a typed, immutable [`EngineConfig`]. Missing keys or malformed
//! JSON are fatal startup errors, surfaced here rather than deep inside the
//! engine.

mod engine_config;
mod error;
mod raw;

pub use engine_config::{
    EngineConfig, TelegramConfig, DEFAULT_COMPUTE_WORKERS, DEFAULT_DEPTH_WORKERS, DEFAULT_SOCKET_WORKERS,
};
pub use error::{ConfigError, Result};
