use crate::constants::{
    DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH,
    DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY,
};
use crate::error::{CompressionError, Result};

/// Immutable upload policy bound to a [`FileCompressor`](crate::FileCompressor)
/// at construction.
///
/// Holds the resize caps, the lossy quality, and the validation limits
/// (maximum size and allowed MIME types).
#[derive(Debug, Clone, PartialEq)]
pub struct CompressorConfig {
    max_width: u32,
    max_height: u32,
    quality: u8,
    max_file_size: u64,
    allowed_mime_types: Vec<String>,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quality: DEFAULT_QUALITY,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|mime| mime.to_string())
                .collect(),
        }
    }
}

impl CompressorConfig {
    /// Build a config, overriding the resize caps and quality where given.
    ///
    /// # Errors
    /// * `InvalidQuality` if `quality` is outside 1-100
    /// * `InvalidDimensions` if either cap is zero
    pub fn new(
        max_width: Option<u32>,
        max_height: Option<u32>,
        quality: Option<u8>,
    ) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        let max_width = max_width.unwrap_or(DEFAULT_MAX_WIDTH);
        let max_height = max_height.unwrap_or(DEFAULT_MAX_HEIGHT);
        if max_width == 0 || max_height == 0 {
            return Err(CompressionError::InvalidDimensions(max_width, max_height));
        }

        Ok(Self {
            max_width,
            max_height,
            quality,
            ..Self::default()
        })
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_allowed_mime_types<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_mime_types = mime_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    /// Quality on the 1-100 scale.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Quality as a 0-1 factor.
    pub fn quality_factor(&self) -> f32 {
        f32::from(self.quality) / 100.0
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn allowed_mime_types(&self) -> &[String] {
        &self.allowed_mime_types
    }

    pub fn is_allowed_mime_type(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|allowed| allowed == mime_type)
    }
}
