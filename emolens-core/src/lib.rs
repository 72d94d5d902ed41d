//! # emolens-core
//!
//! Audio emotion analysis engine.
//!
//! ## Architecture
//!
//! ```text
//! encoded bytes → audio::decode_audio → Waveform (mono, 16 kHz)
//!                                          │
//!                          ┌───────────────┴────────────────┐
//!                          │                                │
//!              SpectrogramBuilder::build        EmotionPredictor::predict
//!                          │                       (once per model id)
//!                          └───────────────┬────────────────┘
//!                                          │
//!                              Vec<AnalysisResult> (request order)
//! ```
//!
//! Everything here is synchronous and CPU-bound. Callers on an async runtime
//! should offload `Analyzer::analyze` with `spawn_blocking`.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod analysis;
pub mod audio;
pub mod error;
pub mod models;
pub mod predictor;
pub mod spectrogram;

// Convenience re-exports for downstream crates
pub use analysis::{
    parse_model_ids, AnalysisResult, AnalyzeResponse, Analyzer, AnalyzerConfig, EmotionLabel,
    EmotionSegment,
};
pub use audio::{decode_audio, waveform::Waveform, DEFAULT_SAMPLE_RATE};
pub use error::EmolensError;
pub use models::{model_catalog, model_name, ModelProfile};
pub use predictor::{EmotionPredictor, PredictorHandle, PredictorKind};
pub use spectrogram::{generate_spectrogram, SpectrogramBuilder, SpectrogramConfig};
