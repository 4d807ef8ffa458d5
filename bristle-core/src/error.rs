use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a stroke.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrokeError {
    /// A trace needs at least one path point to place its brush.
    #[error("trace path is empty")]
    EmptyPath,
}

/// Errors raised by [`crate::canvas::Canvas`].
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("invalid canvas size {width}x{height} at density {density}")]
    InvalidSize { width: u32, height: u32, density: u32 },

    #[error("failed to write PNG to {path}: {message}")]
    Png { path: PathBuf, message: String },
}

/// Errors raised while loading or validating a [`crate::config::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
