use crate::config::CompressorConfig;
use crate::file::UploadFile;
use crate::utils::{format_megabytes, format_megabytes_trimmed};

/// Result of checking an upload against the size and type policy.
///
/// Validation never fails; a rejected file carries a message meant to be
/// shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

/// Check a file against the configured maximum size, then the MIME allow-list.
pub fn validate_upload(file: &UploadFile, config: &CompressorConfig) -> ValidationOutcome {
    if file.size_bytes() > config.max_file_size() {
        return ValidationOutcome::invalid(format!(
            "File size ({}MB) exceeds the maximum allowed size of {}MB",
            format_megabytes(file.size_bytes()),
            format_megabytes_trimmed(config.max_file_size()),
        ));
    }

    if !config.is_allowed_mime_type(file.mime_type()) {
        return ValidationOutcome::invalid(format!(
            "File type {} is not allowed. Allowed types: {}",
            display_mime_type(file.mime_type()),
            config.allowed_mime_types().join(", "),
        ));
    }

    ValidationOutcome::valid()
}

fn display_mime_type(mime_type: &str) -> &str {
    if mime_type.is_empty() {
        "(unknown)"
    } else {
        mime_type
    }
}
