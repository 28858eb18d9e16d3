use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "upload-squeeze",
    about = "Shrink listing photos before upload and check files against the upload policy",
    long_about = "upload-squeeze prepares files for a listing upload. Images are downscaled to fit \
                  within the size caps (800x600 by default) and re-encoded in their own format at a \
                  lossy quality; videos and other files pass through unchanged. Files can be checked \
                  against the upload policy (4MB limit and an allow-list of image and video types).",
    version,
    after_help = "EXAMPLES:\n  \
    upload-squeeze compress photo.jpg small.jpg\n  \
    upload-squeeze batch ./listing ./upload -r -Q 75\n  \
    upload-squeeze validate photo.jpg tour.mp4 lease.pdf\n  \
    upload-squeeze info photo.png"
)]
pub struct Args {
    #[arg(short = 'q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print debug diagnostics")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the compression policy shared by `compress` and `batch`.
#[derive(clap::Args, Debug, Clone)]
pub struct PolicyArgs {
    #[arg(
        short = 'W',
        long,
        help = "Maximum output width in pixels (default: 800)",
        long_help = "Images wider than this are scaled down, preserving aspect ratio. \
                     Smaller images are never enlarged."
    )]
    pub max_width: Option<u32>,

    #[arg(
        short = 'H',
        long,
        help = "Maximum output height in pixels (default: 600)",
        long_help = "Images taller than this are scaled down, preserving aspect ratio. \
                     Smaller images are never enlarged."
    )]
    pub max_height: Option<u32>,

    #[arg(
        short = 'Q',
        long,
        help = "Lossy quality (1-100, default: 70)",
        long_help = "Quality used when re-encoding JPEG, WebP and AVIF. \
                     For PNG: >=90 uses Zopfli, >=70 uses high compression, <70 uses standard compression."
    )]
    pub quality: Option<u8>,

    #[arg(long, help = "Maximum upload size in bytes (default: 4 MiB)")]
    pub max_size: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress a single file",
        long_about = "Compress a single file. Images are resized to fit the caps and re-encoded \
                      in their own format; other files are copied unchanged."
    )]
    Compress {
        #[arg(help = "Input file path")]
        input: PathBuf,

        #[arg(help = "Output file path")]
        output: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    #[command(
        about = "Validate and compress many files in parallel",
        long_about = "Collect files from a path, directory or glob, skip the ones that fail the upload \
                      policy, and compress the rest in parallel. One broken image never stops the batch."
    )]
    Batch {
        #[arg(
            help = "Input directory, file, or glob",
            long_help = "Input can be a file, a directory path, or a glob expression. \
                         Examples: './listing', '*.jpg', '/path/to/photos/*.png'"
        )]
        input: String,

        #[arg(help = "Output directory path")]
        output: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,

        #[arg(
            short = 'j',
            long,
            help = "Number of parallel threads (default: auto)",
            long_help = "Upper bound on worker threads. The batch may use fewer \
                         when available memory is low."
        )]
        threads: Option<usize>,
    },

    #[command(about = "Check files against the upload policy")]
    Validate {
        #[arg(required = true, help = "Files to check")]
        inputs: Vec<PathBuf>,

        #[arg(long, help = "Maximum upload size in bytes (default: 4 MiB)")]
        max_size: Option<u64>,
    },

    #[command(
        about = "Display file information",
        long_about = "Show the detected type, size, validation result and, for images, \
                      the current and target dimensions."
    )]
    Info {
        #[arg(help = "File path to analyze")]
        input: PathBuf,
    },
}
