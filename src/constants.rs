pub const DEFAULT_MAX_WIDTH: u32 = 800;
pub const DEFAULT_MAX_HEIGHT: u32 = 600;

/// Lossy quality on the 1-100 scale (0.7 as a factor).
pub const DEFAULT_QUALITY: u8 = 70;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

pub const BYTES_PER_MIB: u64 = 1024 * 1024;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 4 * BYTES_PER_MIB;

pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/avif",
    "video/mp4",
    "video/quicktime",
    "video/x-matroska",
    "video/webm",
];

/// Allocation budget for a single decode.
pub const MAX_DECODE_ALLOC_BYTES: u64 = 1024 * BYTES_PER_MIB;

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;

/// AVIF encoder speed, 1 (slowest) to 10 (fastest).
pub const AVIF_ENCODER_SPEED: u8 = 8;

pub const MIN_AVAILABLE_MEMORY_MIB: u64 = 256;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
