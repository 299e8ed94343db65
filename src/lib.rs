//! Wastekit: dataset preparation tools for waste-sorting object detection.
//!
//! Wastekit takes loosely collected images through to a training-ready
//! YOLO dataset: it gathers images from several folders, checks label files,
//! splits image/label pairs into train and validation sets, and writes the
//! dataset descriptor a trainer consumes.
//!
//! # Modules
//!
//! - [`label`]: Label records, class table and keyword heuristic
//! - [`discover`]: Flat directory scanning and image/label pairing
//! - [`split`]: Train/validation partitioning and materialization
//! - [`descriptor`]: `dataset.yaml` writer and reader
//! - [`validation`]: Label syntax/range checks and pairing reports
//! - [`consolidate`]: Image consolidation, placeholder labels, cleanup
//! - [`fetch`]: Image downloading for the collector
//! - [`error`]: Error types for wastekit operations

pub mod consolidate;
pub mod descriptor;
pub mod discover;
pub mod error;
pub mod fetch;
pub mod label;
pub mod logging;
pub mod split;
pub mod validation;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

pub use error::WastekitError;

const DEFAULT_RAW_DIR: &str = consolidate::DEFAULT_RAW_DIR;
const DEFAULT_OUTPUT_DIR: &str = "data/labeled_data";

/// The wastekit CLI application.
#[derive(Parser)]
#[command(name = "wastekit")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Split image/label pairs into train and valid sets.
    Split(SplitArgs),
    /// Validate label files and check image/label pairing.
    Validate(ValidateArgs),
    /// Report images without labels and labels without images.
    Pairs(PairsArgs),
    /// Write the dataset descriptor (dataset.yaml).
    Descriptor(DescriptorArgs),
    /// Gather images from several source folders into one directory.
    Consolidate(ConsolidateArgs),
    /// Write rough placeholder labels for unlabeled images.
    PlaceholderLabels(PlaceholderArgs),
    /// Delete consolidated source folders.
    Cleanup(CleanupArgs),
    /// Consolidate, optionally label, split and describe in one go.
    Prepare(PrepareArgs),
    /// Download images from a list of URLs.
    Fetch(FetchArgs),
}

/// Report rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::Args)]
struct SplitArgs {
    /// Directory holding images and their .txt labels side by side.
    #[arg(long, default_value = DEFAULT_RAW_DIR)]
    source: PathBuf,

    /// Directory that receives train/ and valid/.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Fraction of pairs used for training; outside 0.1-0.9 falls back to 0.8.
    #[arg(long)]
    ratio: Option<f64>,

    /// Seed for a reproducible shuffle.
    #[arg(long)]
    seed: Option<u64>,

    /// Clear bucket directories in place instead of staging and renaming.
    #[arg(long)]
    in_place: bool,

    /// Also write dataset.yaml into the output directory.
    #[arg(long)]
    descriptor: bool,

    /// Prompt for the train ratio.
    #[arg(short, long)]
    interactive: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t)]
    format: ReportFormat,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Directory holding the label files.
    #[arg(default_value = DEFAULT_RAW_DIR)]
    dir: PathBuf,

    /// Number of classes; valid class ids are 0..num_classes.
    #[arg(long, default_value_t = label::DEFAULT_NUM_CLASSES)]
    num_classes: usize,

    /// Exit successfully even when label errors are found.
    #[arg(long)]
    allow_errors: bool,

    /// Prompt for the directory.
    #[arg(short, long)]
    interactive: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t)]
    format: ReportFormat,
}

#[derive(clap::Args)]
struct PairsArgs {
    /// Directory holding images and labels.
    #[arg(default_value = DEFAULT_RAW_DIR)]
    dir: PathBuf,

    /// Report format.
    #[arg(long, value_enum, default_value_t)]
    format: ReportFormat,
}

#[derive(clap::Args)]
struct DescriptorArgs {
    /// Dataset root that holds train/ and valid/.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Class names in id order (defaults to the waste classes).
    #[arg(long, value_delimiter = ',')]
    names: Vec<String>,
}

#[derive(clap::Args)]
struct ConsolidateArgs {
    /// Source folders (repeatable). Defaults to the collector folders.
    #[arg(long = "source")]
    sources: Vec<PathBuf>,

    /// Destination directory.
    #[arg(long, default_value = DEFAULT_RAW_DIR)]
    dest: PathBuf,

    /// Report format.
    #[arg(long, value_enum, default_value_t)]
    format: ReportFormat,
}

/// CLI mirror of [`consolidate::FallbackClass`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Fallback {
    #[default]
    Random,
    Skip,
}

impl From<Fallback> for consolidate::FallbackClass {
    fn from(value: Fallback) -> Self {
        match value {
            Fallback::Random => consolidate::FallbackClass::Random,
            Fallback::Skip => consolidate::FallbackClass::Skip,
        }
    }
}

#[derive(clap::Args)]
struct PlaceholderArgs {
    /// Directory holding the images.
    #[arg(default_value = DEFAULT_RAW_DIR)]
    dir: PathBuf,

    /// Class for images whose name matches no keyword.
    #[arg(long, value_enum, default_value_t)]
    fallback: Fallback,

    /// Seed for reproducible boxes.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(clap::Args)]
struct CleanupArgs {
    /// Folders to delete (repeatable). Defaults to the collector folders.
    #[arg(long = "source")]
    sources: Vec<PathBuf>,

    /// Actually delete; without this the folders are only listed.
    #[arg(long)]
    yes: bool,
}

#[derive(clap::Args)]
struct PrepareArgs {
    /// Source folders (repeatable). Defaults to the collector folders.
    #[arg(long = "source")]
    sources: Vec<PathBuf>,

    /// Consolidation directory.
    #[arg(long, default_value = DEFAULT_RAW_DIR)]
    raw: PathBuf,

    /// Split output directory.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Write placeholder labels before splitting.
    #[arg(long)]
    placeholder_labels: bool,

    /// Fraction of pairs used for training.
    #[arg(long)]
    ratio: Option<f64>,

    /// Seed for the shuffle and placeholder boxes.
    #[arg(long)]
    seed: Option<u64>,

    /// Delete the source folders afterwards.
    #[arg(long)]
    cleanup: bool,

    /// Confirm deletion for --cleanup.
    #[arg(long)]
    yes: bool,
}

#[derive(clap::Args)]
struct FetchArgs {
    /// Text file with one image URL per line.
    #[arg(long)]
    urls: PathBuf,

    /// Download directory.
    #[arg(long, default_value = DEFAULT_RAW_DIR)]
    dest: PathBuf,

    /// Stop after this many successful downloads.
    #[arg(long, default_value_t = fetch::DEFAULT_MAX_IMAGES)]
    max: usize,

    /// Discard downloads smaller than this many bytes.
    #[arg(long, default_value_t = fetch::DEFAULT_MIN_BYTES)]
    min_bytes: u64,

    /// Pause between downloads, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,
}

/// Run the wastekit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), WastekitError> {
    let cli = Cli::parse();

    let verbosity = if cli.quiet { -1 } else { cli.verbose.min(2) as i8 };
    logging::init(verbosity);

    match cli.command {
        Some(Commands::Split(args)) => run_split(args),
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Pairs(args)) => run_pairs(args),
        Some(Commands::Descriptor(args)) => run_descriptor(args),
        Some(Commands::Consolidate(args)) => run_consolidate(args),
        Some(Commands::PlaceholderLabels(args)) => run_placeholder(args),
        Some(Commands::Cleanup(args)) => run_cleanup(args),
        Some(Commands::Prepare(args)) => run_prepare(args),
        Some(Commands::Fetch(args)) => run_fetch(args),
        None => {
            println!("wastekit {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Dataset preparation tools for waste-sorting object detection.");
            println!();
            println!("Run 'wastekit --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the split subcommand.
fn run_split(args: SplitArgs) -> Result<(), WastekitError> {
    let ratio = if args.interactive {
        prompt_ratio(args.ratio)?
    } else {
        args.ratio
    };

    let mut opts = split::SplitOptions::lenient(ratio, args.seed);
    opts.atomic = !args.in_place;

    let report = match split::split(&args.source, &args.output, &opts) {
        Ok(report) => report,
        Err(err @ (WastekitError::NoImagesFound { .. } | WastekitError::NoPairsFound { .. })) => {
            println!("{}", err);
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    emit(&report, args.format)?;

    if args.descriptor {
        let path = descriptor::write_descriptor(&args.output, &label::CLASS_NAMES)?;
        println!("Descriptor: {}", path.display());
    }

    Ok(())
}

#[derive(Serialize)]
struct ValidateOutput<'a> {
    labels: &'a validation::DatasetReport,
    pairing: &'a validation::PairingReport,
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), WastekitError> {
    let dir = if args.interactive {
        prompt_line(&format!(
            "Directory to validate (default: {}): ",
            args.dir.display()
        ))?
        .map(PathBuf::from)
        .unwrap_or(args.dir)
    } else {
        args.dir
    };

    let opts = validation::ValidateOptions::new(args.num_classes)?;
    let labels = validation::validate_dataset(&dir, opts.num_classes)?;
    let pairing = validation::check_pairing(&dir)?;

    match args.format {
        ReportFormat::Json => {
            let output = ValidateOutput {
                labels: &labels,
                pairing: &pairing,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        ReportFormat::Text => {
            print!("{}", labels);
            println!();
            print!("{}", pairing);
        }
    }

    if labels.total_errors > 0 && !args.allow_errors {
        Err(WastekitError::ValidationFailed {
            error_count: labels.total_errors,
            file_count: labels.problem_file_count(),
        })
    } else {
        Ok(())
    }
}

/// Execute the pairs subcommand.
fn run_pairs(args: PairsArgs) -> Result<(), WastekitError> {
    let report = validation::check_pairing(&args.dir)?;
    emit(&report, args.format)
}

/// Execute the descriptor subcommand.
fn run_descriptor(args: DescriptorArgs) -> Result<(), WastekitError> {
    let names: Vec<&str> = if args.names.is_empty() {
        label::CLASS_NAMES.to_vec()
    } else {
        args.names.iter().map(String::as_str).collect()
    };

    let path = descriptor::write_descriptor(&args.output, &names)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Execute the consolidate subcommand.
fn run_consolidate(args: ConsolidateArgs) -> Result<(), WastekitError> {
    let sources = sources_or_default(args.sources);
    let report = consolidate::consolidate_images(&sources, &args.dest)?;
    emit(&report, args.format)
}

/// Execute the placeholder-labels subcommand.
fn run_placeholder(args: PlaceholderArgs) -> Result<(), WastekitError> {
    let report = placeholder_labels(&args.dir, args.fallback.into(), args.seed)?;
    print!("{}", report);
    Ok(())
}

fn placeholder_labels(
    dir: &std::path::Path,
    fallback: consolidate::FallbackClass,
    seed: Option<u64>,
) -> Result<consolidate::PlaceholderReport, WastekitError> {
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        consolidate::create_placeholder_labels(dir, fallback, &mut rng)
    } else {
        let mut rng = rand::rng();
        consolidate::create_placeholder_labels(dir, fallback, &mut rng)
    }
}

/// Execute the cleanup subcommand.
fn run_cleanup(args: CleanupArgs) -> Result<(), WastekitError> {
    let sources = sources_or_default(args.sources);
    let report = consolidate::remove_sources(&sources, args.yes);
    print!("{}", report);
    Ok(())
}

/// Execute the prepare pipeline.
fn run_prepare(args: PrepareArgs) -> Result<(), WastekitError> {
    let sources = sources_or_default(args.sources);

    let consolidated = consolidate::consolidate_images(&sources, &args.raw)?;
    print!("{}", consolidated);
    if consolidated.copied == 0 {
        println!("No images to consolidate.");
        return Ok(());
    }

    if args.placeholder_labels {
        let report =
            placeholder_labels(&args.raw, consolidate::FallbackClass::Random, args.seed)?;
        print!("{}", report);
    }

    let opts = split::SplitOptions::lenient(args.ratio, args.seed);
    let (train_count, valid_count) = match split::split(&args.raw, &args.output, &opts) {
        Ok(report) => {
            print!("{}", report);
            report.counts()
        }
        Err(err @ (WastekitError::NoImagesFound { .. } | WastekitError::NoPairsFound { .. })) => {
            println!("{}", err);
            (0, 0)
        }
        Err(err) => return Err(err),
    };

    let descriptor_path = descriptor::write_descriptor(&args.output, &label::CLASS_NAMES)?;

    if args.cleanup {
        print!("{}", consolidate::remove_sources(&sources, args.yes));
    }

    println!();
    println!("=== Summary ===");
    println!("Consolidated images: {}", consolidated.copied);
    println!("Train pairs: {}", train_count);
    println!("Valid pairs: {}", valid_count);
    println!("Descriptor: {}", descriptor_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Label the images with a bounding-box annotation tool");
    println!("  2. Run 'wastekit validate {}'", args.raw.display());
    println!("  3. Start training with {}", descriptor_path.display());
    Ok(())
}

/// Execute the fetch subcommand.
#[cfg(feature = "fetch")]
fn run_fetch(args: FetchArgs) -> Result<(), WastekitError> {
    let urls = fetch::read_url_list(&args.urls)?;
    let opts = fetch::FetchOptions {
        max_images: args.max,
        min_bytes: args.min_bytes,
        delay: std::time::Duration::from_millis(args.delay_ms),
        ..Default::default()
    };

    let report = fetch::fetch_images(&urls, &args.dest, &opts)?;
    print!("{}", report);
    Ok(())
}

/// Without the `fetch` feature, list the files a download would produce.
#[cfg(not(feature = "fetch"))]
fn run_fetch(args: FetchArgs) -> Result<(), WastekitError> {
    let urls = fetch::read_url_list(&args.urls)?;
    println!(
        "Built without the 'fetch' feature; planned downloads into {} (min {} bytes, {} ms apart):",
        args.dest.display(),
        args.min_bytes,
        args.delay_ms
    );

    let mut seen = std::collections::HashSet::new();
    for url in urls.iter().map(|u| fetch::upscale_pin_url(u)) {
        if seen.len() >= args.max {
            break;
        }
        if seen.insert(url.clone()) {
            println!("  {} <- {}", fetch::file_name_for_url(&url, seen.len()), url);
        }
    }
    println!("Duplicate URLs: {}", fetch::count_duplicates(&urls));
    Ok(())
}

fn sources_or_default(sources: Vec<PathBuf>) -> Vec<PathBuf> {
    if sources.is_empty() {
        consolidate::DEFAULT_SOURCE_DIRS
            .iter()
            .map(PathBuf::from)
            .collect()
    } else {
        sources
    }
}

fn emit<T: Serialize + std::fmt::Display>(
    report: &T,
    format: ReportFormat,
) -> Result<(), WastekitError> {
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        ReportFormat::Text => print!("{}", report),
    }
    Ok(())
}

/// Print `message` and read one trimmed line from stdin.
///
/// Returns `None` for an empty answer or end of input.
fn prompt_line(message: &str) -> Result<Option<String>, WastekitError> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

/// Ask for the train ratio. An empty or unparsable answer keeps `fallback`
/// (the `--ratio` value, if any).
fn prompt_ratio(fallback: Option<f64>) -> Result<Option<f64>, WastekitError> {
    let default = fallback.unwrap_or(split::DEFAULT_TRAIN_RATIO);
    let Some(answer) = prompt_line(&format!("Train data ratio (default: {default}): "))? else {
        return Ok(fallback);
    };

    match answer.parse::<f64>() {
        Ok(ratio) => Ok(Some(ratio)),
        Err(_) => {
            tracing::warn!("invalid ratio '{}'; using {}", answer, default);
            Ok(fallback)
        }
    }
}
