//! Error types for the verdict_vision engine

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for verdict_vision operations
pub type Result<T> = std::result::Result<T, VisionError>;

/// Every failure the engine and its surrounding plumbing can report.
///
/// None of these escape a classification call: the engine turns them into
/// `ERROR` results. They do surface from configuration loading, the producer
/// and the worker pool.
#[derive(Error, Debug)]
pub enum VisionError {
    /// The image-decode collaborator could not read the buffer
    #[error("Failed to decode image: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Decoding produced a raster with no pixels to analyze
    #[error("Decoded raster is empty ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },

    /// The payload is missing data the engine needs
    #[error("Malformed payload: {reason}")]
    InputMalformed { reason: String },

    /// Gaussian noise could not be configured
    #[error("Invalid noise parameter: std_dev = {std_dev}")]
    Noise { std_dev: f64 },

    /// Configuration failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// Encoding a generated image failed
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    /// The worker pool could not accept or answer a task
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl VisionError {
    /// Create a decode error with context
    pub fn decode<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Decode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    /// Whether the engine can still produce a meaningful label after this error.
    ///
    /// Decode failures fall back to neutral features; everything else ends the
    /// classification with an `ERROR` label.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VisionError::Decode { .. })
    }
}
