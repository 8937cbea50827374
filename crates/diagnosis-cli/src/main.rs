//! Tumor diagnosis CLI - classifies one sample with the same artifacts the web front end uses.
//!
//! Usage:
//!   diagnose --radius-mean 14 --texture-mean 20 --perimeter-mean 90 --area-mean 600 --smoothness-mean 0.1
//!   diagnose --model model/breast_cancer_model.json --scaler model/scaler.json ... --format json

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use diagnosis_core::features::FeatureVector;
use diagnosis_core::report::{render, OutputFormat};
use diagnosis_core::service::{DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use diagnosis_core::{ArtifactPaths, DiagnosisError, DiagnosisService};

#[derive(Parser)]
#[command(name = "diagnose")]
#[command(about = "Classify a tumor sample as malignant or benign")]
struct Cli {
    /// Path to the classifier artifact
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Path to the scaler artifact
    #[arg(short, long, default_value = DEFAULT_SCALER_PATH)]
    scaler: PathBuf,

    #[arg(long, allow_negative_numbers = true)]
    radius_mean: f64,

    #[arg(long, allow_negative_numbers = true)]
    texture_mean: f64,

    #[arg(long, allow_negative_numbers = true)]
    perimeter_mean: f64,

    #[arg(long, allow_negative_numbers = true)]
    area_mean: f64,

    #[arg(long, allow_negative_numbers = true)]
    smoothness_mean: f64,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

/// Load the artifacts and classify the sample given on the command line.
/// Returns the rendered output and whether a diagnosis was produced.
fn run(cli: Cli) -> Result<(String, bool)> {
    eprintln!("[*] Loading model from {}...", cli.model.display());
    eprintln!("[*] Loading scaler from {}...", cli.scaler.display());

    let service = DiagnosisService::from_paths(&ArtifactPaths {
        model_path: cli.model,
        scaler_path: cli.scaler,
    })?;

    let outcome = if service.is_loaded() {
        FeatureVector::new([
            cli.radius_mean,
            cli.texture_mean,
            cli.perimeter_mean,
            cli.area_mean,
            cli.smoothness_mean,
        ])
        .and_then(|features| service.diagnose(&features))
    } else {
        Err(DiagnosisError::NotLoaded)
    };

    Ok((render(&outcome, cli.format), outcome.is_ok()))
}

fn main() -> Result<ExitCode> {
    let (output, ok) = run(Cli::parse())?;
    println!("{output}");

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
