use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use upload_squeeze::cli::{Args, Commands, PolicyArgs};
use upload_squeeze::utils::create_progress_bar;
use upload_squeeze::{
    collect_files, format_file_size, generate_output_path, get_file_info, get_total_size, logger,
    print_file_info, report, CompressionError, CompressorConfig, FileCompressor, UploadFile,
};

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    match args.command {
        Commands::Compress {
            input,
            output,
            policy,
        } => compress_file(&input, &output, &policy),
        Commands::Batch {
            input,
            output,
            policy,
            recursive,
            threads,
        } => {
            setup_thread_pool(threads);
            batch_compress(&input, &output, &policy, recursive)
        }
        Commands::Validate { inputs, max_size } => validate_files(&inputs, max_size),
        Commands::Info { input } => show_file_info(&input),
    }
}

fn setup_thread_pool(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        if let Err(e) = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            tracing::warn!("failed to set thread pool size: {}", e);
        }
    }
}

fn build_config(policy: &PolicyArgs) -> Result<CompressorConfig> {
    let mut config = CompressorConfig::new(policy.max_width, policy.max_height, policy.quality)?;
    if let Some(max_size) = policy.max_size {
        config = config.with_max_file_size(max_size);
    }
    Ok(config)
}

/// Write through a temp file in the destination directory so a failed write
/// never leaves a truncated output behind.
fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .map_err(|_| CompressionError::DirectoryCreationFailed(parent.clone()))?;

    let mut temp = NamedTempFile::new_in(&parent)
        .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
    temp.write_all(data)?;
    temp.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn compress_file(input: &Path, output: &Path, policy: &PolicyArgs) -> Result<()> {
    let compressor = FileCompressor::new(build_config(policy)?);

    report!("🗜️  Compressing: {}", input.display());
    report!("📁 Output: {}", output.display());

    let file = UploadFile::from_path(input)?;
    let validation = compressor.validate_file(&file);
    if let Some(error) = &validation.error {
        report!("⚠️  {}", error);
    }

    let result = compressor
        .compress_image(&file)
        .with_context(|| format!("failed to compress {}", input.display()))?;
    write_output(output, result.file.data())?;

    report!(
        "📊 Original size: {} ({} bytes)",
        format_file_size(result.original_size),
        result.original_size
    );
    report!(
        "📈 Compressed size: {} ({} bytes)",
        format_file_size(result.compressed_size),
        result.compressed_size
    );
    report!("🎯 Compression ratio: {:.3}", result.compression_ratio);

    if result.compressed_size < result.original_size {
        report!(
            "✅ Successfully reduced file size by {:.1}%",
            (1.0 - result.compression_ratio) * 100.0
        );
    } else if result.compressed_size > result.original_size {
        report!(
            "⚠️  File size increased by {:.1}%",
            (result.compression_ratio - 1.0) * 100.0
        );
    } else {
        report!("✅ File unchanged");
    }

    Ok(())
}

fn batch_compress(input: &str, output: &Path, policy: &PolicyArgs, recursive: bool) -> Result<()> {
    let compressor = FileCompressor::new(build_config(policy)?);

    report!("🚀 Starting batch compression...");
    report!("📁 Input: {}", input);
    report!("📁 Output: {}", output.display());

    let start_time = Instant::now();
    let paths = collect_files(input, recursive)?;

    if paths.is_empty() {
        report!("⚠️  No files found in the input path");
        return Ok(());
    }

    report!("📊 Found {} files", paths.len());

    let mut accepted_paths = Vec::new();
    let mut accepted = Vec::new();
    let mut rejected = 0usize;

    for path in paths {
        let file = match UploadFile::from_path(&path) {
            Ok(file) => file,
            Err(e) => {
                report!("❌ {}: {}", path.display(), e);
                rejected += 1;
                continue;
            }
        };

        let validation = compressor.validate_file(&file);
        match validation.error {
            None => {
                accepted_paths.push(path);
                accepted.push(file);
            }
            Some(error) => {
                report!("❌ {}: {}", file.name(), error);
                rejected += 1;
            }
        }
    }

    if accepted.is_empty() {
        report!("⚠️  No files passed validation");
        return Ok(());
    }

    fs::create_dir_all(output)
        .map_err(|_| CompressionError::DirectoryCreationFailed(output.to_path_buf()))?;

    let progress = create_progress_bar(accepted.len() as u64);
    if upload_squeeze::logger::is_quiet() {
        progress.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    let results = compressor.compress_files_with_progress(&accepted, &progress);
    progress.finish_with_message("✅ Batch compression complete");

    let mut write_failures = 0usize;
    for (path, result) in accepted_paths.iter().zip(&results) {
        let output_path = generate_output_path(path, output)?;
        if let Err(e) = write_output(&output_path, result.file.data()) {
            report!("❌ {}: {:#}", output_path.display(), e);
            write_failures += 1;
        }
    }

    let total_before = get_total_size(&accepted);
    let total_after: u64 = results.iter().map(|r| r.compressed_size).sum();
    let reduced = results
        .iter()
        .filter(|r| r.compressed_size < r.original_size)
        .count();
    let elapsed_time = start_time.elapsed();

    report!("\n📊 Batch Compression Summary:");
    report!("  📁 Files compressed: {}", results.len());
    report!("  📉 Files reduced: {}", reduced);
    report!("  📊 Total original size: {}", format_file_size(total_before));
    report!("  📊 Total compressed size: {}", format_file_size(total_after));
    if total_before > 0 {
        report!(
            "  🎯 Overall compression ratio: {:.3}",
            total_after as f64 / total_before as f64
        );
    }
    report!("  ⏱️  Total time: {:?}", elapsed_time);

    if rejected > 0 {
        report!("  ⚠️  Skipped files: {}", rejected);
    }
    if write_failures > 0 {
        bail!("failed to write {} output files", write_failures);
    }

    Ok(())
}

fn validate_files(inputs: &[PathBuf], max_size: Option<u64>) -> Result<()> {
    let mut config = CompressorConfig::default();
    if let Some(max_size) = max_size {
        config = config.with_max_file_size(max_size);
    }
    let compressor = FileCompressor::new(config);

    let mut invalid = 0usize;
    for path in inputs {
        let file = match UploadFile::from_path(path) {
            Ok(file) => file,
            Err(e) => {
                report!("❌ {}: {}", path.display(), e);
                invalid += 1;
                continue;
            }
        };

        match compressor.validate_file(&file).error {
            None => report!(
                "✅ {} ({}, {})",
                file.name(),
                file.mime_type(),
                format_file_size(file.size_bytes())
            ),
            Some(error) => {
                report!("❌ {}: {}", file.name(), error);
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        bail!("{} of {} files failed validation", invalid, inputs.len());
    }
    Ok(())
}

fn show_file_info(input: &Path) -> Result<()> {
    let info = get_file_info(input, &FileCompressor::default())?;
    print_file_info(&info);
    Ok(())
}
