use crate::error::Result;
use crate::file::UploadFile;
use crate::formats::{image_format_for_mime_type, is_image_mime_type};
use crate::processing::FileCompressor;
use crate::utils::format_file_size;
use crate::validation::ValidationOutcome;
use image::ImageReader;
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub validation: ValidationOutcome,
    /// Current dimensions, when the header can be read.
    pub dimensions: Option<(u32, u32)>,
    /// Dimensions after compression under the compressor's caps.
    pub target_dimensions: Option<(u32, u32)>,
}

/// Gather what the compressor would see for a file on disk.
///
/// Only the image header is read for dimensions; the raster is not decoded.
pub fn get_file_info(input_path: &Path, compressor: &FileCompressor) -> Result<FileInfo> {
    let file = UploadFile::from_path(input_path)?;

    let dimensions = if is_image_mime_type(file.mime_type()) {
        read_dimensions(&file)
    } else {
        None
    };
    let target_dimensions = dimensions.map(|(w, h)| compressor.target_dimensions(w, h));

    Ok(FileInfo {
        name: file.name().to_string(),
        mime_type: file.mime_type().to_string(),
        size_bytes: file.size_bytes(),
        validation: compressor.validate_file(&file),
        dimensions,
        target_dimensions,
    })
}

fn read_dimensions(file: &UploadFile) -> Option<(u32, u32)> {
    let format = image_format_for_mime_type(file.mime_type())?;
    ImageReader::with_format(Cursor::new(file.data()), format)
        .into_dimensions()
        .ok()
}

pub fn print_file_info(info: &FileInfo) {
    println!("📋 Basic Information:");
    println!("  📁 File: {}", info.name);
    println!("  🎭 Type: {}", info.mime_type);
    println!(
        "  📦 Size: {} ({} bytes)",
        format_file_size(info.size_bytes),
        info.size_bytes
    );

    if let Some((width, height)) = info.dimensions {
        println!("  📏 Dimensions: {}x{} pixels", width, height);
        let aspect_ratio = f64::from(width) / f64::from(height.max(1));
        println!("  📐 Aspect ratio: {:.2}:1", aspect_ratio);
    } else if is_image_mime_type(&info.mime_type) {
        println!("  ⚠️  Dimensions: unreadable");
    }

    println!("\n💡 Upload Preparation:");
    match &info.validation.error {
        None => println!("  ✅ Passes upload policy"),
        Some(error) => println!("  ❌ {}", error),
    }

    match (info.dimensions, info.target_dimensions) {
        (Some(current), Some(target)) if current != target => {
            println!("  🔄 Will be resized to {}x{}", target.0, target.1);
        }
        (Some(_), Some(_)) => println!("  📏 Within size caps, will only be re-encoded"),
        _ if is_image_mime_type(&info.mime_type) => {
            println!("  ⚠️  Cannot be decoded, will be uploaded as-is")
        }
        _ => println!("  📦 Not an image, will be uploaded as-is"),
    }
}
