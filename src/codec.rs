//! Raster decode / resize / encode capability.
//!
//! The compressor only talks to [`ImageCodec`]; [`RasterCodec`] is the
//! default implementation over the `image` crate, with PNG output run through
//! `oxipng` and lossy WebP produced by libwebp.

use crate::constants::{
    AVIF_ENCODER_SPEED, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, MAX_DECODE_ALLOC_BYTES,
    OXIPNG_PRESET, ZOPFLI_ITERATIONS,
};
use crate::error::CodecError;
use crate::formats::image_format_for_mime_type;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Limits};
use oxipng::{Deflaters, Options};
use std::io::Cursor;
use std::num::NonZeroU8;

pub type CodecResult<T> = std::result::Result<T, CodecError>;

pub trait ImageCodec: Send + Sync {
    /// Decode `bytes` as an image of the declared MIME type.
    fn decode(&self, bytes: &[u8], mime_type: &str) -> CodecResult<DynamicImage>;

    /// Render `image` onto a fresh raster of exactly `width` x `height`.
    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage;

    /// Encode `image` as `mime_type`; `quality` is on the 1-100 scale and is
    /// ignored by encoders without a lossy setting.
    fn encode(&self, image: &DynamicImage, mime_type: &str, quality: u8) -> CodecResult<Vec<u8>>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Clone)]
pub struct RasterCodec {
    filter: FilterType,
}

impl Default for RasterCodec {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl RasterCodec {
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl ImageCodec for RasterCodec {
    fn decode(&self, bytes: &[u8], mime_type: &str) -> CodecResult<DynamicImage> {
        let format = image_format_for_mime_type(mime_type)
            .ok_or_else(|| CodecError::UnsupportedMimeType(mime_type.to_string()))?;

        let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
        reader.limits(decode_limits());
        Ok(reader.decode()?)
    }

    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_exact(width, height, self.filter)
    }

    fn encode(&self, image: &DynamicImage, mime_type: &str, quality: u8) -> CodecResult<Vec<u8>> {
        let format = image_format_for_mime_type(mime_type)
            .ok_or_else(|| CodecError::UnsupportedMimeType(mime_type.to_string()))?;

        let mut buffer = Vec::new();
        match format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))?;
            }
            ImageFormat::Png => {
                image.write_with_encoder(PngEncoder::new(&mut buffer))?;
                buffer = optimize_png(&buffer, quality)?;
            }
            ImageFormat::WebP => {
                buffer = encode_webp(image, quality)?;
            }
            ImageFormat::Avif => {
                let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
                rgba.write_with_encoder(AvifEncoder::new_with_speed_quality(
                    &mut buffer,
                    AVIF_ENCODER_SPEED,
                    quality,
                ))?;
            }
            other => {
                let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
                rgba.write_to(&mut Cursor::new(&mut buffer), other)?;
            }
        }

        if buffer.is_empty() {
            return Err(CodecError::EmptyOutput);
        }
        Ok(buffer)
    }
}

/// Decode limits: a total allocation budget, no per-side cap.
fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_alloc = Some(MAX_DECODE_ALLOC_BYTES);
    limits
}

fn encode_webp(image: &DynamicImage, quality: u8) -> CodecResult<Vec<u8>> {
    // libwebp only accepts 8-bit RGB(A)
    let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
    let encoder = webp::Encoder::from_image(&rgba)
        .map_err(|e| CodecError::WebpEncoding(e.to_string()))?;
    Ok(encoder.encode(f32::from(quality)).to_vec())
}

fn optimize_png(data: &[u8], quality: u8) -> CodecResult<Vec<u8>> {
    let mut options = Options::from_preset(OXIPNG_PRESET);

    // Higher quality settings spend more time on deflate
    options.deflate = match NonZeroU8::new(ZOPFLI_ITERATIONS) {
        Some(iterations) if quality >= 90 => Deflaters::Zopfli { iterations },
        _ if quality >= 70 => Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        },
        _ => Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        },
    };

    oxipng::optimize_from_memory(data, &options)
        .map_err(|e| CodecError::PngOptimization(e.to_string()))
}
