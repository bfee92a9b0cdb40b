//! Locoprep: preparation tooling for the LOCO warehouse dataset.
//!
//! LOCO ships its scene annotations as COCO JSON spread over five
//! recording subsets. Training a YOLO detector on it needs per-image
//! label files, a flat (or train/val/test) image tree, and a handful of
//! bookkeeping passes. Locoprep covers that pipeline:
//!
//! - [`convert`]: COCO JSON to one YOLO label file per image
//! - [`split`]: assign recording subsets to train/val/test
//! - [`flatten`]: pull images out of their per-subset subdirectories
//! - [`count`]: per-class instance counts over label files
//! - [`check`]: audit images against labels and the source JSON
//! - [`draw`]: render label boxes back onto an image
//! - [`relabel`]: strip a class and renumber the remaining ids

pub mod check;
pub mod convert;
pub mod count;
pub mod dataset;
pub mod draw;
pub mod error;
pub mod flatten;
pub mod relabel;
pub mod split;

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::LocoprepError;

/// The locoprep CLI application.
#[derive(Parser)]
#[command(name = "locoprep")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert COCO JSON annotations to YOLO label files.
    Convert(ConvertArgs),
    /// Merge the per-subset COCO JSON files into one per split.
    Aggregate(AggregateArgs),
    /// Assign recording subsets to train/val/test directories.
    Split(SplitArgs),
    /// Move images out of per-subset subdirectories.
    Flatten(FlattenArgs),
    /// Count class instances across label files.
    Count(CountArgs),
    /// Audit images, labels, and COCO JSON for consistency.
    Check(CheckArgs),
    /// Draw the label boxes of one image onto a copy.
    Draw(DrawArgs),
    /// Remove a class from all label files and renumber the rest.
    StripClass(StripClassArgs),
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Dataset root containing `labels/` and `images/`.
    #[arg(default_value = ".")]
    dataset_root: PathBuf,

    /// Keep the source JSON files instead of removing them.
    #[arg(long)]
    keep_json: bool,
}

/// Arguments for the aggregate subcommand.
#[derive(clap::Args)]
struct AggregateArgs {
    /// Dataset root containing `labels/`.
    #[arg(default_value = ".")]
    dataset_root: PathBuf,
}

/// Arguments for the split subcommand.
#[derive(clap::Args)]
struct SplitArgs {
    /// Dataset root containing `labels/` and `images/`.
    #[arg(default_value = ".")]
    dataset_root: PathBuf,

    /// Subset assignment as train/val/test lists, e.g. '2,3,5/1,4/'.
    #[arg(long, default_value = "2,3,5/1,4/")]
    subsets: String,
}

/// Arguments for the flatten subcommand.
#[derive(clap::Args)]
struct FlattenArgs {
    /// Dataset root containing `images/`.
    #[arg(default_value = ".")]
    dataset_root: PathBuf,
}

/// Arguments for the count subcommand.
#[derive(clap::Args)]
struct CountArgs {
    /// Dataset root containing `labels/`.
    #[arg(default_value = ".")]
    dataset_root: PathBuf,

    /// Only count these YOLO class ids. Repeatable.
    #[arg(long = "class", value_name = "ID")]
    classes: Vec<usize>,

    /// Write an InstancesIn_<split>.txt listing of matching label files.
    #[arg(long)]
    write_lists: bool,
}

/// Arguments for the check subcommand.
#[derive(clap::Args)]
struct CheckArgs {
    /// Dataset root containing `labels/` and `images/`.
    #[arg(default_value = ".")]
    dataset_root: PathBuf,

    /// COCO JSON file to cross-check against the labels on disk.
    #[arg(long)]
    coco_json: Option<PathBuf>,

    /// Compare image dimensions on disk against the COCO JSON.
    #[arg(long, requires = "coco_json")]
    verify_dims: bool,

    /// Only print the one-line summary.
    #[arg(short, long)]
    quiet: bool,
}

/// Arguments for the draw subcommand.
#[derive(clap::Args)]
struct DrawArgs {
    /// Image to draw on, by file name or stem.
    image: String,

    /// Dataset root containing `labels/` and `images/`.
    #[arg(long, default_value = ".")]
    dataset_root: PathBuf,

    /// Only draw these YOLO class ids. Repeatable.
    #[arg(long = "class", value_name = "ID")]
    classes: Vec<usize>,

    /// Outline thickness in pixels.
    #[arg(long, default_value_t = 2)]
    thickness: u32,

    /// Output path. Defaults to '<stem>_boxes.jpg' in the current
    /// directory.
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Arguments for the strip-class subcommand.
#[derive(clap::Args)]
struct StripClassArgs {
    /// Dataset root containing `labels/`.
    #[arg(default_value = ".")]
    dataset_root: PathBuf,

    /// YOLO class id to remove.
    #[arg(long, default_value_t = 0)]
    class: usize,
}

/// Run the locoprep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LocoprepError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Aggregate(args)) => run_aggregate(args),
        Some(Commands::Split(args)) => run_split(args),
        Some(Commands::Flatten(args)) => run_flatten(args),
        Some(Commands::Count(args)) => run_count(args),
        Some(Commands::Check(args)) => run_check(args),
        Some(Commands::Draw(args)) => run_draw(args),
        Some(Commands::StripClass(args)) => run_strip_class(args),
        None => {
            println!("locoprep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Preparation tooling for the LOCO warehouse dataset.");
            println!();
            println!("Run 'locoprep --help' for usage information.");
            Ok(())
        }
    }
}

fn run_convert(args: ConvertArgs) -> Result<(), LocoprepError> {
    let options = convert::ConvertOptions {
        keep_json: args.keep_json,
    };
    let report = convert::convert_labels_to_yolo(&args.dataset_root, &options)?;
    print!("{}", report);
    Ok(())
}

fn run_aggregate(args: AggregateArgs) -> Result<(), LocoprepError> {
    let report = convert::aggregate_coco(&args.dataset_root)?;
    print!("{}", report);
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<(), LocoprepError> {
    let subsets: split::SubsetSplit = args.subsets.parse()?;
    let report = split::assign_subsets(&args.dataset_root, &subsets)?;
    print!("{}", report);
    Ok(())
}

fn run_flatten(args: FlattenArgs) -> Result<(), LocoprepError> {
    let report = flatten::flatten_images(&args.dataset_root)?;
    print!("{}", report);
    Ok(())
}

fn run_count(args: CountArgs) -> Result<(), LocoprepError> {
    let options = count::CountOptions {
        class_ids: if args.classes.is_empty() {
            None
        } else {
            Some(args.classes.iter().copied().collect::<BTreeSet<_>>())
        },
        write_lists: args.write_lists,
    };
    let report = count::count_instances(&args.dataset_root, &options)?;
    print!("{}", report);
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), LocoprepError> {
    let options = check::CheckOptions {
        coco_json: args.coco_json,
        verify_dims: args.verify_dims,
    };
    let report = check::check_dataset(&args.dataset_root, &options)?;

    if args.quiet {
        println!("{}", report.summary());
    } else {
        print!("{}", report);
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(LocoprepError::CheckFailed {
            problems: report.problem_count(),
        })
    }
}

fn run_draw(args: DrawArgs) -> Result<(), LocoprepError> {
    let options = draw::DrawOptions {
        class_ids: if args.classes.is_empty() {
            None
        } else {
            Some(args.classes.iter().copied().collect::<BTreeSet<_>>())
        },
        thickness: args.thickness,
        output: args.output,
    };
    let report = draw::draw_boxes(&args.dataset_root, &args.image, &options)?;
    print!("{}", report);
    Ok(())
}

fn run_strip_class(args: StripClassArgs) -> Result<(), LocoprepError> {
    let report = relabel::strip_class(&args.dataset_root, args.class)?;
    print!("{}", report);
    Ok(())
}
