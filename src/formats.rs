/// MIME type utilities
///
/// Maps file extensions to the MIME types uploads are declared with, and MIME
/// types to the `image` crate formats the default codec can handle.
use crate::constants::DEFAULT_MIME_TYPE;
use image::ImageFormat;
use std::path::Path;

const EXTENSION_MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("svg", "image/svg+xml"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
];

/// Returns true when the MIME type names an image (`image/*`).
pub fn is_image_mime_type(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// Guess the MIME type of a file on disk from its extension.
///
/// Unknown or missing extensions map to `application/octet-stream`.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            let ext = ext.to_lowercase();
            EXTENSION_MIME_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// Resolve the `image` crate format for a declared MIME type.
pub fn image_format_for_mime_type(mime_type: &str) -> Option<ImageFormat> {
    ImageFormat::from_mime_type(mime_type.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_mime_type() {
        assert!(is_image_mime_type("image/png"));
        assert!(is_image_mime_type("image/svg+xml"));
        assert!(!is_image_mime_type("video/mp4"));
        assert!(!is_image_mime_type("application/pdf"));
        assert!(!is_image_mime_type(""));
    }

    #[test]
    fn test_mime_type_for_path() {
        assert_eq!(mime_type_for_path(Path::new("photo.jpg")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("photo.JPEG")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("plan.png")), "image/png");
        assert_eq!(mime_type_for_path(Path::new("tour.MOV")), "video/quicktime");
        assert_eq!(mime_type_for_path(Path::new("tour.mkv")), "video/x-matroska");
        assert_eq!(mime_type_for_path(Path::new("lease.pdf")), "application/pdf");
    }

    #[test]
    fn test_mime_type_for_path_unknown() {
        assert_eq!(mime_type_for_path(Path::new("archive.xyz")), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for_path(Path::new("README")), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_image_format_for_mime_type() {
        assert_eq!(image_format_for_mime_type("image/jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(image_format_for_mime_type("image/png"), Some(ImageFormat::Png));
        assert_eq!(image_format_for_mime_type("IMAGE/WEBP"), Some(ImageFormat::WebP));
        assert_eq!(image_format_for_mime_type("image/gif"), Some(ImageFormat::Gif));
        assert_eq!(image_format_for_mime_type("video/mp4"), None);
    }
}
