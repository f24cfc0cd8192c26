//! Error types for morphology and benchmark operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for morph_bench operations
#[derive(Error, Debug)]
pub enum MorphError {
    #[error("Invalid structuring element shape: {0:?} (expected \"square\" or \"disk\")")]
    InvalidShape(String),

    #[error("Invalid structuring element kernel: {0}")]
    InvalidKernel(String),

    #[error(
        "Structuring element {se_width}x{se_height} does not fit image {width}x{height}"
    )]
    DimensionMismatch {
        width: usize,
        height: usize,
        se_width: usize,
        se_height: usize,
    },

    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Pixel buffer of {actual} bytes does not match {width}x{height} image")]
    BufferSize {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("Pixel ({x}, {y}) has value {value}, expected {background} or {foreground}")]
    NonBinaryPixel {
        x: usize,
        y: usize,
        value: u8,
        background: u8,
        foreground: u8,
    },

    #[error("Failed to allocate {bytes} bytes for image buffer")]
    Allocation { bytes: usize },

    #[error("Tile size must be at least 1")]
    InvalidTileSize,

    #[error("Thread count must be at least 1")]
    InvalidThreadCount,

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid configuration: {name} ({reason})")]
    InvalidConfig { name: &'static str, reason: String },
}

/// Result type alias for morph_bench operations
pub type Result<T> = std::result::Result<T, MorphError>;
