//! cub-tfrecord: converts the CUB-200 birds dataset into sharded TFRecords.
//!
//! The converter reads the CUB manifests (classes, bounding boxes, the
//! train/test split and the image list), walks the per-class image
//! directories, and writes one directory of `tf.train.Example` shards per
//! split. Shards of a split are written in parallel, one worker per
//! contiguous range of images.
//!
//! # Modules
//!
//! - [`manifest`]: Parsers for the CUB text manifests
//! - [`enumerate`]: Image discovery and the deterministic shuffle
//! - [`filter`]: Per-split selection of images
//! - [`transcode`]: PNG to JPEG conversion and shape checks
//! - [`tfrecord`]: TFRecord framing and the `Example` message
//! - [`shard`]: Parallel shard writing
//! - [`pipeline`]: The end-to-end conversion
//! - [`inspect`]: Read-back verification of written shards
//! - [`error`]: Error types for cub-tfrecord operations

pub mod config;
pub mod dataset;
pub mod enumerate;
pub mod error;
pub mod filter;
pub mod inspect;
pub mod manifest;
pub mod pipeline;
pub mod shard;
pub mod tfrecord;
pub mod transcode;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use config::{Config, SplitSampling};
pub use error::CubError;
pub use pipeline::convert_dataset;

/// The cub-tfrecord CLI application.
#[derive(Parser)]
#[command(name = "cub-tfrecord")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert the dataset into sharded TFRecord files.
    Convert(ConvertArgs),
    /// Verify and summarize the shards in one split directory.
    Inspect(InspectArgs),
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Root directory holding one sub-directory per class.
    #[arg(long, env = "CUB_IMAGES_DIRECTORY", default_value = "/tmp/")]
    images_directory: PathBuf,

    /// Directory the per-split shard directories are created in.
    #[arg(long, env = "CUB_OUTPUT_DIRECTORY", default_value = "/tmp/")]
    output_directory: PathBuf,

    /// Class manifest ("<id> <class dir name>" per line).
    #[arg(long, env = "CUB_CLASSES_FILE", default_value = "classes.txt")]
    classes_file: PathBuf,

    /// Bounding box manifest ("<image> <xmin> <ymin> <xmax> <ymax>" per line).
    #[arg(long, env = "CUB_BOUNDING_BOXES_FILE", default_value = "bounding_boxes.txt")]
    bounding_boxes_file: PathBuf,

    /// Train/test flags, line-aligned with the images file.
    #[arg(long, env = "CUB_DATA_SPLIT_FILE", default_value = "train_test_split.txt")]
    data_split_file: PathBuf,

    /// Image list ("<id> <relative path>" per line).
    #[arg(long, env = "CUB_IMAGES_FILE", default_value = "images.txt")]
    images_file: PathBuf,

    /// Number of shards for the train split.
    #[arg(long, env = "CUB_TRAIN_SHARDS", default_value_t = 1024)]
    train_shards: usize,

    /// Number of shards for the validation split.
    #[arg(long, env = "CUB_VALIDATION_SHARDS", default_value_t = 128)]
    validation_shards: usize,

    /// Worker threads; must divide both shard counts.
    #[arg(long, env = "CUB_NUM_THREADS", default_value_t = 8)]
    num_threads: usize,

    /// Train rows drawing at most this value from 1..=101 move to validation.
    #[arg(long, env = "CUB_VALIDATION_THRESHOLD", default_value_t = 10)]
    validation_threshold: u32,

    /// Maximum number of rows moved to validation.
    #[arg(long, env = "CUB_VALIDATION_CAP", default_value_t = 400)]
    validation_cap: usize,

    /// Seed for the validation draw (random when omitted).
    #[arg(long, env = "CUB_SPLIT_SEED")]
    split_seed: Option<u64>,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

impl From<ConvertArgs> for Config {
    fn from(args: ConvertArgs) -> Self {
        Config {
            images_directory: args.images_directory,
            output_directory: args.output_directory,
            classes_file: args.classes_file,
            bounding_boxes_file: args.bounding_boxes_file,
            data_split_file: args.data_split_file,
            images_file: args.images_file,
            train_shards: args.train_shards,
            validation_shards: args.validation_shards,
            num_threads: args.num_threads,
            sampling: SplitSampling {
                validation_threshold: args.validation_threshold,
                validation_cap: args.validation_cap,
                seed: args.split_seed,
            },
        }
    }
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Split directory holding the shard files.
    dir: PathBuf,

    /// Number of top labels to show in the histogram.
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the cub-tfrecord CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CubError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        None => {
            println!("cub-tfrecord {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Converts the CUB-200 birds dataset into sharded TFRecord files.");
            println!();
            println!("Run 'cub-tfrecord --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), CubError> {
    let output = check_output_format(&args.output)?;
    let config = Config::from(args);
    let reports = convert_dataset(&config)?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                print!("{}", report);
            }
        }
    }

    Ok(())
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), CubError> {
    let output = check_output_format(&args.output)?;
    let opts = inspect::InspectOptions {
        top_labels: args.top,
        ..Default::default()
    };
    let report = inspect::inspect_shards(&args.dir, &opts)?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", report),
    }

    Ok(())
}

enum OutputFormat {
    Text,
    Json,
}

/// Rejects unknown formats before any work is done.
fn check_output_format(output: &str) -> Result<OutputFormat, CubError> {
    match output {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(CubError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            other
        ))),
    }
}
