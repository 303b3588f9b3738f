//! Longhorn Core: error type and configuration shared by every crate.

pub mod config;
pub mod error;

pub use config::{DocumentConfig, GeminiConfig, LonghornConfig, ServerConfig};
pub use error::{Error, Result};
