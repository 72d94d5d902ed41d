//! `emolens-analyze`: run the analysis pipeline on a local file.
//!
//! ```text
//! emolens-analyze speech.wav --models baseline,advanced --predictor random --seed 7
//! ```
//!
//! Prints the same JSON body `POST /api/analyze` would return.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use emolens_core::{Analyzer, AnalyzerConfig, AnalyzeResponse, PredictorKind, DEFAULT_SAMPLE_RATE};

#[derive(Parser, Debug)]
#[command(name = "emolens-analyze", about = "Analyse an audio file from the command line")]
struct CliArgs {
    /// Audio file to analyse (WAV, MP3, FLAC, OGG, ...).
    path: PathBuf,

    /// Comma-separated model ids.
    #[clap(long, value_delimiter = ',', default_value = "baseline")]
    models: Vec<String>,

    /// Emotion predictor implementation.
    #[clap(long, value_enum, default_value_t = PredictorKind::Random)]
    predictor: PredictorKind,

    /// Seed for the random predictor.
    #[clap(long)]
    seed: Option<u64>,

    /// Decode target sample rate (Hz).
    #[clap(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Pretty-print the JSON output.
    #[clap(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emolens_core=warn".into()),
        )
        .init();

    let args = CliArgs::parse();

    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;

    let config = AnalyzerConfig {
        target_sample_rate: args.sample_rate,
        predictor: args.predictor,
        seed: args.seed,
        ..AnalyzerConfig::default()
    };
    let analyzer = Analyzer::new(config)?;
    analyzer.warm_up()?;

    let spectrograms = analyzer.analyze(&bytes, &args.models)?;
    let response = AnalyzeResponse { spectrograms };

    let json = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{json}");
    Ok(())
}
