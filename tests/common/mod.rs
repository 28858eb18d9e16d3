#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use upload_squeeze::UploadFile;

pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    }))
}

pub fn encode_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    gradient_image(width, height)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .unwrap();
    buffer
}

pub fn jpeg_upload(name: &str, width: u32, height: u32) -> UploadFile {
    UploadFile::new(name, "image/jpeg", encode_image(width, height, ImageFormat::Jpeg))
}

pub fn png_upload(name: &str, width: u32, height: u32) -> UploadFile {
    UploadFile::new(name, "image/png", encode_image(width, height, ImageFormat::Png))
}

pub fn decoded_dimensions(data: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory(data).unwrap();
    (image.width(), image.height())
}

/// Write a real image to `dir/name`, format chosen by extension.
pub fn write_image_file(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    gradient_image(width, height).save(&path).unwrap();
    path
}
