//! AirChar batch augmentation
//!
//! Rotates every sample file of a directory and writes the augmented copies
//! with updated names and headers.
//!
//! Usage:
//!   airchar-augment --input samples --output samplesAug --axes x,y --angles -30,30

use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use clap::Parser;

use airchar::augment::{self, Axis, DEFAULT_ANGLES};
use airchar::logging;

#[derive(Parser, Debug)]
#[command(name = "airchar-augment", about = "Generate rotated copies of IMU sample files")]
struct Args {
    /// Folder with original CSV files
    #[arg(short, long, default_value = "samples")]
    input: PathBuf,
    /// Folder for augmented files
    #[arg(short, long, default_value = "samplesAug")]
    output: PathBuf,
    /// Rotation axes
    #[arg(long, value_delimiter = ',', default_value = "x")]
    axes: Vec<String>,
    /// Rotation angles in degrees (defaults to -10..-90 and 10..80 in steps of 10)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    angles: Vec<i32>,
}

fn main() {
    logging::init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let axes = args
        .axes
        .iter()
        .map(|a| a.parse::<Axis>())
        .collect::<Result<Vec<_>, _>>()?;
    let angles = if args.angles.is_empty() {
        DEFAULT_ANGLES.to_vec()
    } else {
        args.angles
    };
    let rotations = augment::rotations(&axes, &angles);

    let report = augment::augment_directory(&args.input, &args.output, &rotations)
        .with_context(|| format!("Failed to augment {}", args.input.display()))?;

    println!(
        "Batch data augmentation completed: {} files, {} augmented files generated, {} failed.",
        report.files,
        report.generated,
        report.failed.len()
    );
    for path in &report.failed {
        println!("  failed: {}", path.display());
    }
    Ok(())
}
