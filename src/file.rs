use crate::error::{CompressionError, Result};
use crate::formats::mime_type_for_path;
use crate::utils::calculate_compression_ratio;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// An upload candidate: name, declared MIME type and its content.
///
/// Used for both the inputs handed to the compressor and the files it
/// produces. The compressor never mutates an `UploadFile`; outputs are new
/// values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    name: String,
    mime_type: String,
    last_modified: SystemTime,
    data: Vec<u8>,
}

impl UploadFile {
    /// Create a file stamped with the current time.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self::with_last_modified(name, mime_type, data, SystemTime::now())
    }

    pub fn with_last_modified(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: Vec<u8>,
        last_modified: SystemTime,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            last_modified,
            data,
        }
    }

    /// Read a file from disk, deriving the MIME type from its extension.
    ///
    /// # Errors
    /// * `FileNotFound` if nothing exists at `path`
    /// * `Io` if the file cannot be read
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CompressionError::FileNotFound(path.to_path_buf()));
        }

        let metadata = fs::metadata(path)?;
        let data = fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let last_modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());

        Ok(Self::with_last_modified(
            name,
            mime_type_for_path(path),
            data,
            last_modified,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Outcome of compressing a single [`UploadFile`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionResult {
    pub file: UploadFile,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
}

impl CompressionResult {
    /// Result for a file returned unchanged; sizes match and the ratio is 1.
    pub fn pass_through(file: UploadFile) -> Self {
        let size = file.size_bytes();
        Self {
            file,
            original_size: size,
            compressed_size: size,
            compression_ratio: 1.0,
        }
    }

    pub fn compressed(file: UploadFile, original_size: u64) -> Self {
        let compressed_size = file.size_bytes();
        Self {
            compression_ratio: calculate_compression_ratio(original_size, compressed_size),
            file,
            original_size,
            compressed_size,
        }
    }

    /// Bytes saved; zero when the output grew.
    pub fn bytes_saved(&self) -> u64 {
        self.original_size.saturating_sub(self.compressed_size)
    }
}
