//! `Analyzer`: request-level orchestration.
//!
//! ## Flow
//!
//! ```text
//! parse_model_ids(models_json)      → Validation error, nothing decoded
//!     └─► decode_audio(bytes)       → Waveform @ target_sample_rate
//!         └─► SpectrogramBuilder    → curve (computed once, shared by all models)
//!             └─► for each model id, in order:
//!                     predictor.predict → AnalysisResult
//! ```
//!
//! A request is all-or-nothing: the first failing model aborts it and no
//! partial list is returned.

pub mod report;

pub use report::{AnalysisResult, AnalyzeResponse, EmotionLabel, EmotionSegment};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    audio::{decode_audio, waveform::Waveform, DEFAULT_SAMPLE_RATE},
    error::{EmolensError, Result},
    models::model_name,
    predictor::{PredictorHandle, PredictorKind},
    spectrogram::{SpectrogramBuilder, SpectrogramConfig},
};

/// Configuration for `Analyzer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Rate every upload is decoded to (Hz). Default: 16000.
    pub target_sample_rate: u32,
    /// Spectrogram parameters. Default: 128 mels, 2048-point FFT, 100 points.
    pub spectrogram: SpectrogramConfig,
    /// Emotion predictor implementation. Default: random.
    pub predictor: PredictorKind,
    /// Seed for the random predictor; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: DEFAULT_SAMPLE_RATE,
            spectrogram: SpectrogramConfig::default(),
            predictor: PredictorKind::default(),
            seed: None,
        }
    }
}

/// Parse the `models` form field: a JSON array of model id strings.
///
/// # Errors
/// Returns `EmolensError::Validation` for anything that is not a JSON array
/// of strings.
pub fn parse_model_ids(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str::<Vec<String>>(raw).map_err(|e| {
        EmolensError::Validation(format!("`models` must be a JSON array of strings: {e}"))
    })
}

/// Stateless request processor. `Send + Sync`; share it behind an `Arc`.
#[derive(Debug)]
pub struct Analyzer {
    config: AnalyzerConfig,
    spectrogram: SpectrogramBuilder,
    predictor: PredictorHandle,
}

impl Analyzer {
    /// Build an analyzer with the predictor selected by `config.predictor`.
    ///
    /// # Errors
    /// Returns `EmolensError::Computation` for invalid spectrogram parameters.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let predictor = PredictorHandle::from_kind(config.predictor, config.seed);
        Self::with_predictor(config, predictor)
    }

    /// Build an analyzer around an externally supplied predictor.
    pub fn with_predictor(config: AnalyzerConfig, predictor: PredictorHandle) -> Result<Self> {
        if config.target_sample_rate == 0 {
            return Err(EmolensError::Validation(
                "target sample rate must be > 0".into(),
            ));
        }
        let spectrogram = SpectrogramBuilder::new(config.spectrogram.clone())?;
        Ok(Self {
            config,
            spectrogram,
            predictor,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Warm up the predictor. Call once before serving.
    pub fn warm_up(&self) -> Result<()> {
        info!(predictor = %self.config.predictor, "warming up predictor");
        self.predictor.warm_up()
    }

    /// Full request: validate `models_json`, then decode and analyse `audio`.
    pub fn analyze_request(&self, audio: &[u8], models_json: &str) -> Result<AnalyzeResponse> {
        let model_ids = parse_model_ids(models_json)?;
        let spectrograms = self.analyze(audio, &model_ids)?;
        Ok(AnalyzeResponse { spectrograms })
    }

    /// Decode `audio` and produce one result per model id, in order.
    pub fn analyze(&self, audio: &[u8], model_ids: &[String]) -> Result<Vec<AnalysisResult>> {
        let waveform = decode_audio(audio, self.config.target_sample_rate)?;
        self.analyze_waveform(&waveform, model_ids)
    }

    /// Analyse an already decoded waveform.
    pub fn analyze_waveform(
        &self,
        waveform: &Waveform,
        model_ids: &[String],
    ) -> Result<Vec<AnalysisResult>> {
        let duration = waveform.duration_secs();
        info!(
            models = model_ids.len(),
            duration,
            sample_rate = waveform.sample_rate,
            "analysing audio"
        );

        if model_ids.is_empty() {
            return Ok(Vec::new());
        }

        let curve = self
            .spectrogram
            .build(&waveform.samples, waveform.sample_rate)?;

        let mut results = Vec::with_capacity(model_ids.len());
        for model_id in model_ids {
            let emotions = self.predictor.predict(waveform, model_id)?;
            debug!(model_id = model_id.as_str(), segments = emotions.len(), "model done");
            results.push(AnalysisResult {
                model_id: model_id.clone(),
                model_name: model_name(model_id),
                spectrogram_data: curve.clone(),
                emotions,
                duration,
            });
        }
        Ok(results)
    }
}
