//! CLI entry point for the car-data preprocessing pipeline.

use anyhow::{Result, anyhow};
use carprep::{Mode, OrdinalEncoder, Pipeline, PipelineConfig};
use clap::{Parser, ValueEnum};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Processing mode for a run.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    /// Fit encoder and scaler, remove outliers, emit features and target
    Train,
    /// Transform only, using a previously fitted encoder
    Infer,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Car-data preprocessing pipeline",
    long_about = "Prepares used-car listings for price-prediction models.\n\n\
                  EXAMPLES:\n  \
                  # Training run: writes features.csv, target.csv and the fitted encoder\n  \
                  carprep -i train.csv -m train -o outputs/\n\n  \
                  # Inference run: reuses the persisted encoder\n  \
                  carprep -i test.csv -m infer -o outputs/"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: String,

    /// Processing mode
    #[arg(short, long, value_enum, default_value = "train")]
    mode: CliMode,

    /// Output directory for results
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Path of the persisted encoder artifact
    #[arg(long, default_value = "models/ordinal_encoder.json")]
    encoder: PathBuf,

    /// Target column for training
    #[arg(short, long, default_value = "price")]
    target: String,

    /// Number of neighbors for KNN imputation
    #[arg(long, default_value = "25")]
    knn_neighbors: usize,

    /// Skip feature scaling during training preparation
    #[arg(long)]
    no_scale: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_csv(path: &str) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))?
        .finish()?;
    Ok(df)
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(df)?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let output_dir = PathBuf::from(&args.output);
    std::fs::create_dir_all(&output_dir)?;

    info!("Loading dataset from: {}", args.input);
    let data = load_csv(&args.input)?;
    info!("Dataset loaded: {:?}", data.shape());

    let config = PipelineConfig::builder()
        .knn_neighbors(args.knn_neighbors)
        .target_column(&args.target)
        .scale_features(!args.no_scale)
        .build()?;

    match args.mode {
        CliMode::Train => {
            // A fresh encoder is fit during training; an existing artifact
            // is reused so codes stay stable across retraining runs.
            let mut builder = Pipeline::builder().config(config);
            if let Some(encoder) = OrdinalEncoder::load(&args.encoder)? {
                info!("Reusing encoder artifact at {}", args.encoder.display());
                builder = builder.encoder(encoder);
            }
            let mut pipeline = builder.build()?;

            let set = pipeline.prepare_for_training(&data)?;

            let mut features = set.features;
            write_csv(&mut features, &output_dir.join("features.csv"))?;
            let mut target = DataFrame::new(vec![set.target.into_column()])?;
            write_csv(&mut target, &output_dir.join("target.csv"))?;

            pipeline.encoder().save(&args.encoder)?;
            info!("Saved encoder artifact to {}", args.encoder.display());
        }
        CliMode::Infer => {
            let encoder = OrdinalEncoder::load(&args.encoder)?.ok_or_else(|| {
                anyhow!(
                    "No encoder artifact at {}; run a training pass first",
                    args.encoder.display()
                )
            })?;
            let mut pipeline = Pipeline::builder().config(config).encoder(encoder).build()?;

            let mut processed = pipeline.preprocess(&data, Mode::Inference)?;
            write_csv(&mut processed, &output_dir.join("processed.csv"))?;
        }
    }

    Ok(())
}
