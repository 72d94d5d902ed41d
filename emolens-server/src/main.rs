//! Emolens HTTP service.
//!
//! Serves `POST /api/analyze`: an uploaded audio clip is decoded to 16 kHz
//! mono, summarised into a 100-point loudness curve and annotated with
//! emotion segments once per requested model.

mod server;
mod settings;

use std::path::PathBuf;

use clap::Parser;
use emolens_core::{Analyzer, PredictorKind};
use tracing::info;

use settings::{load_settings, SettingsOverrides};

#[derive(Parser, Debug)]
#[command(name = "emolens-server", about = "Audio emotion analysis API")]
struct CliArgs {
    /// Path to a JSON settings file.
    #[clap(long, env = "EMOLENS_CONFIG")]
    pub config: Option<PathBuf>,

    #[clap(long, env = "EMOLENS_HOST")]
    pub host: Option<String>,

    #[clap(short, long, env = "EMOLENS_PORT")]
    pub port: Option<u16>,

    /// Emotion predictor implementation.
    #[clap(long, value_enum, env = "EMOLENS_PREDICTOR")]
    pub predictor: Option<PredictorKind>,

    /// Fixed seed for the random predictor.
    #[clap(long, env = "EMOLENS_SEED")]
    pub seed: Option<u64>,

    /// Comma-separated browser origins allowed by CORS (`*` mirrors any origin).
    #[clap(long, value_delimiter = ',', env = "EMOLENS_ALLOWED_ORIGINS")]
    pub allowed_origins: Option<Vec<String>>,

    /// Maximum upload size in MiB.
    #[clap(long, env = "EMOLENS_MAX_UPLOAD_MB")]
    pub max_upload_mb: Option<usize>,
}

impl CliArgs {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            host: self.host.clone(),
            port: self.port,
            allowed_origins: self.allowed_origins.clone(),
            max_upload_mb: self.max_upload_mb,
            predictor: self.predictor,
            seed: self.seed,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "emolens=info,emolens_core=info,emolens_server=info,tower_http=info".into()
            }),
        )
        .init();

    let cli_args = CliArgs::parse();

    let mut settings = load_settings(cli_args.config.as_deref())?;
    settings.apply(cli_args.overrides());

    info!(
        predictor = %settings.analyzer.predictor,
        origins = ?settings.allowed_origins,
        max_upload_mb = settings.max_upload_mb,
        "Emolens starting"
    );

    let analyzer = Analyzer::new(settings.analyzer.clone())?;
    analyzer.warm_up()?;

    server::run_server(settings, analyzer).await
}
