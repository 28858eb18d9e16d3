pub mod batch;
pub mod cli;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod file;
pub mod formats;
pub mod info;
pub mod logger;
pub mod processing;
pub mod utils;
pub mod validation;

pub use batch::{collect_files, generate_output_path, is_image_file};
pub use codec::{ImageCodec, RasterCodec};
pub use config::CompressorConfig;
pub use error::{CodecError, CompressionError, Result};
pub use file::{CompressionResult, UploadFile};
pub use formats::{is_image_mime_type, mime_type_for_path};
pub use info::{get_file_info, print_file_info, FileInfo};
pub use processing::{fit_within, FileCompressor};
pub use utils::{calculate_compression_ratio, format_file_size, get_total_size};
pub use validation::ValidationOutcome;
