//! Service settings: optional JSON file, normalized, then overridden by CLI
//! flags and environment variables.

use std::fs;
use std::path::Path;

use anyhow::Context;
use emolens_core::{AnalyzerConfig, PredictorKind};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser. `"*"` mirrors any origin.
    pub allowed_origins: Vec<String>,
    /// Upper bound on the request body, in MiB.
    pub max_upload_mb: usize,
    pub analyzer: AnalyzerConfig,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            allowed_origins: vec![DEFAULT_ORIGIN.into()],
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            analyzer: AnalyzerConfig::default(),
        }
    }
}

/// Values supplied on the command line or through `EMOLENS_*` variables.
/// `None` leaves the file/default value in place.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub allowed_origins: Option<Vec<String>>,
    pub max_upload_mb: Option<usize>,
    pub predictor: Option<PredictorKind>,
    pub seed: Option<u64>,
}

impl ServerSettings {
    pub fn normalize(&mut self) {
        self.host = self.host.trim().to_string();
        if self.host.is_empty() {
            self.host = DEFAULT_HOST.into();
        }
        self.allowed_origins = normalize_origins(&self.allowed_origins);
        self.max_upload_mb = self.max_upload_mb.clamp(1, 1024);
    }

    pub fn apply(&mut self, overrides: SettingsOverrides) {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(origins) = overrides.allowed_origins {
            self.allowed_origins = origins;
        }
        if let Some(mb) = overrides.max_upload_mb {
            self.max_upload_mb = mb;
        }
        if let Some(predictor) = overrides.predictor {
            self.analyzer.predictor = predictor;
        }
        if overrides.seed.is_some() {
            self.analyzer.seed = overrides.seed;
        }
        self.normalize();
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Trim, drop blanks and trailing slashes, dedupe case-insensitively.
fn normalize_origins(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for origin in raw {
        let normalized = origin.trim().trim_end_matches('/');
        if normalized.is_empty() {
            continue;
        }
        if out.iter().any(|o| o.eq_ignore_ascii_case(normalized)) {
            continue;
        }
        out.push(normalized.to_string());
    }
    out
}

/// Load settings from `path`, or defaults when no path is given.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ServerSettings> {
    let mut settings = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file {}", path.display()))?;
            serde_json::from_str::<ServerSettings>(&raw)
                .with_context(|| format!("invalid settings file {}", path.display()))?
        }
        None => ServerSettings::default(),
    };
    settings.normalize();
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings: ServerSettings =
            serde_json::from_str(r#"{"port":9100,"analyzer":{"predictor":"placeholder"}}"#)
                .unwrap();
        assert_eq!(settings.port, 9100);
        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.allowed_origins, vec![DEFAULT_ORIGIN.to_string()]);
        assert_eq!(settings.analyzer.predictor, PredictorKind::Placeholder);
        assert_eq!(settings.analyzer.target_sample_rate, 16_000);
    }

    #[test]
    fn normalize_cleans_values() {
        let mut settings = ServerSettings {
            host: "  ".into(),
            allowed_origins: vec![
                " http://localhost:5173/ ".into(),
                "HTTP://LOCALHOST:5173".into(),
                "".into(),
                "https://emolens.example".into(),
            ],
            max_upload_mb: 0,
            ..ServerSettings::default()
        };
        settings.normalize();
        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(
            settings.allowed_origins,
            vec!["http://localhost:5173", "https://emolens.example"]
        );
        assert_eq!(settings.max_upload_mb, 1);
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut settings = ServerSettings::default();
        settings.apply(SettingsOverrides {
            port: Some(8080),
            predictor: Some(PredictorKind::Placeholder),
            seed: Some(3),
            ..SettingsOverrides::default()
        });
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
        assert_eq!(settings.analyzer.predictor, PredictorKind::Placeholder);
        assert_eq!(settings.analyzer.seed, Some(3));
        assert_eq!(settings.max_upload_bytes(), 50 * 1024 * 1024);
    }

    #[test]
    fn missing_settings_file_is_an_error() {
        let path = Path::new("/nonexistent/emolens/settings.json");
        assert!(load_settings(Some(path)).is_err());
        assert_eq!(load_settings(None).unwrap(), ServerSettings::default());
    }
}
