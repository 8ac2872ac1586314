//! User preferences for votehud
//!
//! Supports:
//! - A validated preference model (scale, style, anchor, colors, compass timer)
//! - Best-effort loading from a JSON document, one key at a time
//! - Pluggable persistence backends (file, background writer, in-memory)
//! - Debounced saving so bursts of changes produce a single write

mod backend;
mod document;
mod preferences;
mod store;

pub use backend::*;
pub use document::*;
pub use preferences::*;
pub use store::*;

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access preferences file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse preferences JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Preferences document is not a JSON object")]
    NotAnObject,

    #[error("Preferences writer has shut down")]
    WriterClosed,

    #[error("Background write failed: {0}")]
    WriteFailed(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
