/// Utility functions for common operations
///
/// Size accounting and formatting helpers shared by the compressor, the
/// validator and the CLI.
use crate::constants::{BYTES_PER_MIB, PROGRESS_BAR_TEMPLATE};
use crate::file::UploadFile;
use indicatif::{ProgressBar, ProgressStyle};

const SIZE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];
const THRESHOLD: f64 = 1024.0;

/// Format file size in human-readable format
///
/// Picks the largest unit (base 1024, up to GB) and prints at most two
/// decimals with trailing zeros trimmed.
///
/// # Example
/// ```
/// use upload_squeeze::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(1048576), "1 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < SIZE_UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    format!("{} {}", trim_decimals(size), SIZE_UNITS[unit_index])
}

/// Sum of `size_bytes` across the files; 0 for an empty slice.
pub fn get_total_size(files: &[UploadFile]) -> u64 {
    files.iter().map(UploadFile::size_bytes).sum()
}

/// Compressed size over original size. A zero-byte original reports 1.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 1.0;
    }
    compressed_size as f64 / original_size as f64
}

/// Size in MiB with exactly two decimals, e.g. `"5.00"`.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_MIB as f64)
}

/// Size in MiB with trailing zeros trimmed, e.g. `"4"` or `"2.5"`.
pub fn format_megabytes_trimmed(bytes: u64) -> String {
    trim_decimals(bytes as f64 / BYTES_PER_MIB as f64)
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Create a bar with consistent styling
pub fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
