use crate::codec::{ImageCodec, RasterCodec};
use crate::config::CompressorConfig;
use crate::error::{CompressionError, Result};
use crate::file::{CompressionResult, UploadFile};
use crate::formats::is_image_mime_type;
use crate::validation::{validate_upload, ValidationOutcome};
use image::GenericImageView;
use std::sync::Arc;
use tracing::debug;

/// Prepares upload files: downscales and re-encodes images, passes
/// everything else through.
///
/// Holds no per-call state; a single instance can be shared across threads.
#[derive(Clone)]
pub struct FileCompressor {
    config: CompressorConfig,
    codec: Arc<dyn ImageCodec>,
}

impl Default for FileCompressor {
    fn default() -> Self {
        Self::new(CompressorConfig::default())
    }
}

impl std::fmt::Debug for FileCompressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCompressor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FileCompressor {
    pub fn new(config: CompressorConfig) -> Self {
        Self::with_codec(config, RasterCodec::default())
    }

    pub fn with_codec(config: CompressorConfig, codec: impl ImageCodec + 'static) -> Self {
        Self {
            config,
            codec: Arc::new(codec),
        }
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Compress a single file.
    ///
    /// Non-image MIME types are returned unchanged with a ratio of 1. Images
    /// are decoded as their declared type, shrunk to fit within the
    /// configured caps (never enlarged), and re-encoded in the same MIME type
    /// at the configured quality. The output keeps the input's name and MIME
    /// type and gets a fresh timestamp.
    ///
    /// Compression is not idempotent: feeding an output back in may shrink it
    /// further.
    ///
    /// # Errors
    /// * `Decode` if the content is not a readable image of the declared type
    /// * `Encode` if re-encoding fails or yields no bytes
    ///
    /// # Example
    /// ```
    /// use upload_squeeze::{FileCompressor, UploadFile};
    ///
    /// let compressor = FileCompressor::default();
    /// let video = UploadFile::new("tour.mp4", "video/mp4", vec![0; 64]);
    /// let result = compressor.compress_image(&video).unwrap();
    /// assert_eq!(result.compression_ratio, 1.0);
    /// assert_eq!(result.file, video);
    /// ```
    pub fn compress_image(&self, input: &UploadFile) -> Result<CompressionResult> {
        if !is_image_mime_type(input.mime_type()) {
            return Ok(CompressionResult::pass_through(input.clone()));
        }

        let image = self
            .codec
            .decode(input.data(), input.mime_type())
            .map_err(|source| CompressionError::Decode {
                name: input.name().to_string(),
                source,
            })?;

        let (width, height) = image.dimensions();
        let (target_width, target_height) =
            fit_within(width, height, self.config.max_width(), self.config.max_height());

        let image = if (target_width, target_height) != (width, height) {
            debug!(
                file = input.name(),
                "resizing {}x{} -> {}x{}", width, height, target_width, target_height
            );
            self.codec.resize(&image, target_width, target_height)
        } else {
            image
        };

        let encoded = self
            .codec
            .encode(&image, input.mime_type(), self.config.quality())
            .map_err(|source| CompressionError::Encode {
                name: input.name().to_string(),
                source,
            })?;

        let output = UploadFile::new(input.name(), input.mime_type(), encoded);
        let result = CompressionResult::compressed(output, input.size_bytes());

        debug!(
            file = input.name(),
            original = result.original_size,
            compressed = result.compressed_size,
            "compressed image"
        );

        Ok(result)
    }

    /// Check a file against the size and type policy.
    pub fn validate_file(&self, input: &UploadFile) -> ValidationOutcome {
        validate_upload(input, &self.config)
    }

    /// Target dimensions for an image of `width` x `height` under this
    /// compressor's caps.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        fit_within(width, height, self.config.max_width(), self.config.max_height())
    }
}

/// Largest dimensions no bigger than `max_width` x `max_height` with the
/// aspect ratio of `width` x `height`. Images already within both caps are
/// returned unchanged. Each side is at least 1.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = f64::min(
        f64::from(max_width) / f64::from(width),
        f64::from(max_height) / f64::from(height),
    );

    let scaled_width = (f64::from(width) * scale).round() as u32;
    let scaled_height = (f64::from(height) * scale).round() as u32;

    (
        scaled_width.clamp(1, max_width.max(1)),
        scaled_height.clamp(1, max_height.max(1)),
    )
}
