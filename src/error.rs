use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by an [`ImageCodec`](crate::codec::ImageCodec) implementation.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("unsupported image type: {0}")]
    UnsupportedMimeType(String),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("WebP encoding error: {0}")]
    WebpEncoding(String),

    #[error("encoder produced no output")]
    EmptyOutput,
}

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("Failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: CodecError,
    },

    #[error("Failed to encode {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: CodecError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid size caps: {0}x{1}. Both dimensions must be greater than zero")]
    InvalidDimensions(u32, u32),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("No files found in input path: {0}")]
    NoFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
