use crate::constants::{BYTES_PER_MIB, MIN_AVAILABLE_MEMORY_MIB};
use crate::error::{CompressionError, Result};
use crate::file::{CompressionResult, UploadFile};
use crate::formats::{is_image_mime_type, mime_type_for_path};
use crate::processing::FileCompressor;
use glob::glob;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use sysinfo::{MemoryRefreshKind, RefreshKind, System};
use tracing::{debug, warn};
use walkdir::WalkDir;

impl FileCompressor {
    /// Compress a batch of files, one result per input in input order.
    ///
    /// A file that fails to compress is logged and returned unchanged; a
    /// failure never affects other files or aborts the batch. Non-image
    /// files always pass through, with a warning when they exceed the size
    /// limit.
    pub fn compress_files(&self, inputs: &[UploadFile]) -> Vec<CompressionResult> {
        self.compress_batch(inputs, None)
    }

    /// Same as [`compress_files`](Self::compress_files), advancing `progress`
    /// once per finished file.
    pub fn compress_files_with_progress(
        &self,
        inputs: &[UploadFile],
        progress: &ProgressBar,
    ) -> Vec<CompressionResult> {
        self.compress_batch(inputs, Some(progress))
    }

    fn compress_batch(
        &self,
        inputs: &[UploadFile],
        progress: Option<&ProgressBar>,
    ) -> Vec<CompressionResult> {
        if inputs.is_empty() {
            return Vec::new();
        }

        let process = |input: &UploadFile| {
            let result = self.compress_one(input);
            if let Some(progress) = progress {
                progress.inc(1);
            }
            result
        };

        let parallelism = batch_parallelism(inputs);
        debug!(files = inputs.len(), parallelism, "compressing batch");

        // The ambient pool already runs at most this many files at once
        if parallelism >= rayon::current_num_threads().min(inputs.len()) {
            return inputs.par_iter().map(process).collect();
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .build()
        {
            Ok(pool) => pool.install(|| inputs.par_iter().map(process).collect::<Vec<_>>()),
            Err(e) => {
                warn!("failed to build thread pool, compressing sequentially: {}", e);
                inputs.iter().map(process).collect()
            }
        }
    }

    fn compress_one(&self, input: &UploadFile) -> CompressionResult {
        if !is_image_mime_type(input.mime_type()) {
            if input.size_bytes() > self.config().max_file_size() {
                warn!(
                    file = input.name(),
                    size = input.size_bytes(),
                    limit = self.config().max_file_size(),
                    "file exceeds size limit, passing through uncompressed"
                );
            }
            return CompressionResult::pass_through(input.clone());
        }

        match self.compress_image(input) {
            Ok(result) => result,
            Err(e) => {
                warn!(file = input.name(), error = %e, "compression failed, keeping original");
                CompressionResult::pass_through(input.clone())
            }
        }
    }
}

/// Estimates decoded memory for a file in MiB without decoding it.
///
/// Compressed formats expand considerably once rasterized.
fn estimate_memory_usage_mib(file: &UploadFile) -> f64 {
    let size_mib = file.size_bytes() as f64 / BYTES_PER_MIB as f64;

    let multiplier = match file.mime_type() {
        "image/jpeg" => 4.0,
        "image/png" => 3.0,
        "image/webp" => 3.5,
        "image/gif" => 2.0,
        "image/avif" | "image/heic" | "image/heif" => 4.0,
        "image/bmp" | "image/tiff" => 1.2,
        mime if !is_image_mime_type(mime) => 1.0,
        _ => 3.0,
    };

    size_mib * multiplier
}

/// Number of worker threads for a batch: bounded by rayon's thread count,
/// the batch size, and how many average-sized decodes fit in available
/// memory. Always at least 1.
fn batch_parallelism(inputs: &[UploadFile]) -> usize {
    let baseline = rayon::current_num_threads().min(inputs.len()).max(1);
    if baseline == 1 {
        return 1;
    }

    let total_mib: f64 = inputs.iter().map(estimate_memory_usage_mib).sum();
    let avg_per_file_mib = ((total_mib / inputs.len() as f64).ceil() as u64).max(1);

    let mut sys =
        System::new_with_specifics(RefreshKind::new().with_memory(MemoryRefreshKind::new()));
    sys.refresh_memory();
    let available_mib = sys.available_memory() / BYTES_PER_MIB;

    // Some platforms report no available memory; don't let that serialize
    // every batch
    if available_mib == 0 {
        return baseline;
    }

    let mem_cap = (available_mib.saturating_sub(MIN_AVAILABLE_MEMORY_MIB) / avg_per_file_mib)
        .clamp(1, baseline as u64) as usize;

    baseline.min(mem_cap)
}

/// Collect candidate upload files from a file path, a directory, or a glob
/// pattern. Hidden entries are skipped when walking directories.
pub fn collect_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path)
        } else {
            WalkDir::new(input_path).max_depth(1)
        };

        for entry in walker
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    } else if let Ok(pattern) = glob(input) {
        files.extend(pattern.flatten().filter(|path| path.is_file()));
    } else {
        return Err(CompressionError::NoFilesFound(input.to_string()));
    }

    Ok(files)
}

/// Whether a path on disk looks like an image by extension.
pub fn is_image_file(path: &Path) -> bool {
    is_image_mime_type(mime_type_for_path(path))
}

/// Output path for a batch file: the input's file name under `output_dir`.
pub fn generate_output_path(input_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let file_name = input_path
        .file_name()
        .ok_or_else(|| CompressionError::NoFilesFound(input_path.display().to_string()))?;
    Ok(output_dir.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecResult, ImageCodec};
    use crate::config::CompressorConfig;
    use crate::error::CodecError;
    use image::imageops::FilterType;
    use image::{DynamicImage, ImageFormat};
    use std::fs::File;
    use std::io::{Cursor, Write};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = Vec::new();
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    /// Fails to decode any content starting with `!`.
    struct PickyCodec;

    impl ImageCodec for PickyCodec {
        fn decode(&self, bytes: &[u8], mime_type: &str) -> CodecResult<DynamicImage> {
            if bytes.first() == Some(&b'!') {
                return Err(CodecError::UnsupportedMimeType(mime_type.to_string()));
            }
            Ok(DynamicImage::new_rgb8(4, 4))
        }

        fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
            image.resize_exact(width, height, FilterType::Nearest)
        }

        fn encode(&self, _image: &DynamicImage, _mime_type: &str, _quality: u8) -> CodecResult<Vec<u8>> {
            Ok(vec![0; 2])
        }
    }

    #[test]
    fn test_compress_files_empty() {
        assert!(FileCompressor::default().compress_files(&[]).is_empty());
    }

    #[test]
    fn test_compress_files_preserves_order() {
        let inputs = vec![
            UploadFile::new("a.png", "image/png", png(1000, 500)),
            UploadFile::new("b.mp4", "video/mp4", vec![1; 64]),
            UploadFile::new("c.png", "image/png", png(30, 30)),
        ];

        let results = FileCompressor::default().compress_files(&inputs);

        assert_eq!(results.len(), inputs.len());
        for (input, result) in inputs.iter().zip(&results) {
            assert_eq!(result.file.name(), input.name());
            assert_eq!(result.original_size, input.size_bytes());
        }
        assert_eq!(results[1].file, inputs[1]);
    }

    #[test]
    fn test_compress_files_isolates_decode_failure() {
        let compressor = FileCompressor::with_codec(CompressorConfig::default(), PickyCodec);
        let inputs = vec![
            UploadFile::new("ok-1.jpg", "image/jpeg", vec![1; 10]),
            UploadFile::new("bad.jpg", "image/jpeg", b"!broken".to_vec()),
            UploadFile::new("ok-2.jpg", "image/jpeg", vec![1; 10]),
        ];

        let results = compressor.compress_files(&inputs);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].compressed_size, 2);
        assert_eq!(results[1].file, inputs[1]);
        assert_eq!(results[1].compression_ratio, 1.0);
        assert_eq!(results[2].compressed_size, 2);
    }

    #[test]
    fn test_compress_files_real_garbage_falls_back() {
        let garbage = UploadFile::new("corrupt.png", "image/png", b"garbage".to_vec());
        let results = FileCompressor::default().compress_files(std::slice::from_ref(&garbage));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file, garbage);
        assert_eq!(results[0].compressed_size, results[0].original_size);
    }

    #[test]
    fn test_compress_files_oversized_non_image_passes_through() {
        let config = CompressorConfig::default().with_max_file_size(8);
        let video = UploadFile::new("tour.mov", "video/quicktime", vec![0; 64]);

        let results = FileCompressor::new(config).compress_files(std::slice::from_ref(&video));
        assert_eq!(results[0].file, video);
    }

    #[test]
    fn test_compress_files_with_progress_counts_every_file() {
        let inputs: Vec<UploadFile> = (0..5)
            .map(|i| UploadFile::new(format!("{}.txt", i), "text/plain", vec![0; 4]))
            .collect();
        let progress = ProgressBar::hidden();
        progress.set_length(inputs.len() as u64);

        let results = FileCompressor::default().compress_files_with_progress(&inputs, &progress);

        assert_eq!(results.len(), 5);
        assert_eq!(progress.position(), 5);
    }

    /// Records the name of every thread that decodes.
    struct ThreadRecorder(Arc<Mutex<Vec<Option<String>>>>);

    impl ImageCodec for ThreadRecorder {
        fn decode(&self, _bytes: &[u8], mime_type: &str) -> CodecResult<DynamicImage> {
            let name = std::thread::current().name().map(str::to_string);
            self.0.lock().unwrap().push(name);
            Err(CodecError::UnsupportedMimeType(mime_type.to_string()))
        }

        fn resize(&self, image: &DynamicImage, _width: u32, _height: u32) -> DynamicImage {
            image.clone()
        }

        fn encode(&self, _image: &DynamicImage, _mime_type: &str, _quality: u8) -> CodecResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_compress_files_runs_on_enclosing_pool() {
        let names = Arc::new(Mutex::new(Vec::new()));
        let compressor = FileCompressor::with_codec(
            CompressorConfig::default(),
            ThreadRecorder(Arc::clone(&names)),
        );
        let inputs: Vec<UploadFile> = (0..4)
            .map(|i| UploadFile::new(format!("{}.jpg", i), "image/jpeg", vec![1; 8]))
            .collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .thread_name(|i| format!("uploads-{}", i))
            .build()
            .unwrap();
        let results = pool.install(|| compressor.compress_files(&inputs));

        assert_eq!(results.len(), 4);
        let names = names.lock().unwrap();
        assert_eq!(names.len(), 4);
        for name in names.iter() {
            assert!(name.as_deref().is_some_and(|n| n.starts_with("uploads-")), "{:?}", name);
        }
    }

    #[test]
    fn test_estimate_memory_usage() {
        let jpeg = UploadFile::new("a.jpg", "image/jpeg", vec![0; 1024 * 1024]);
        assert_eq!(estimate_memory_usage_mib(&jpeg), 4.0);

        let png = UploadFile::new("a.png", "image/png", vec![0; 2 * 1024 * 1024]);
        assert_eq!(estimate_memory_usage_mib(&png), 6.0);

        let video = UploadFile::new("a.mp4", "video/mp4", vec![0; 1024 * 1024]);
        assert_eq!(estimate_memory_usage_mib(&video), 1.0);
    }

    #[test]
    fn test_batch_parallelism_bounds() {
        let inputs = vec![UploadFile::new("a.png", "image/png", vec![0; 16])];
        assert_eq!(batch_parallelism(&inputs), 1);

        let inputs: Vec<UploadFile> = (0..64)
            .map(|_| UploadFile::new("a.png", "image/png", vec![0; 16]))
            .collect();
        let parallelism = batch_parallelism(&inputs);
        assert!(parallelism >= 1);
        assert!(parallelism <= rayon::current_num_threads());
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("test.jpg")));
        assert!(is_image_file(Path::new("test.PnG")));
        assert!(is_image_file(Path::new("test.avif")));
        assert!(!is_image_file(Path::new("test.mp4")));
        assert!(!is_image_file(Path::new("test")));
    }

    #[test]
    fn test_generate_output_path() {
        let result =
            generate_output_path(Path::new("/in/photos/test.jpg"), Path::new("/tmp/output")).unwrap();
        assert_eq!(result, PathBuf::from("/tmp/output/test.jpg"));
    }

    #[test]
    fn test_collect_files_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.jpg");
        File::create(&test_file)
            .unwrap()
            .write_all(b"fake image data")
            .unwrap();

        let files = collect_files(&test_file.to_string_lossy(), false).unwrap();
        assert_eq!(files, vec![test_file]);
    }

    #[test]
    fn test_collect_files_directory_skips_hidden() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.jpg")).unwrap();
        File::create(temp_dir.path().join("b.mp4")).unwrap();
        File::create(temp_dir.path().join(".hidden.png")).unwrap();

        let files = collect_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.mp4"]);
    }

    #[test]
    fn test_collect_files_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        std::fs::create_dir(&subdir).unwrap();
        File::create(temp_dir.path().join("top.jpg")).unwrap();
        File::create(subdir.join("nested.png")).unwrap();

        let flat = collect_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = collect_files(&temp_dir.path().to_string_lossy(), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_collect_files_glob_pattern() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("test1.jpg")).unwrap();
        File::create(temp_dir.path().join("test2.png")).unwrap();
        File::create(temp_dir.path().join("other.txt")).unwrap();

        let pattern = format!("{}/*.jpg", temp_dir.path().to_string_lossy());
        let files = collect_files(&pattern, false).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_collect_files_nothing_matches() {
        let files = collect_files("/definitely/not/here/*.jpg", false).unwrap();
        assert!(files.is_empty());
    }
}
