//! Response types serialized back to HTTP / CLI clients.
//!
//! Field names are camelCase on the wire; emotion labels keep their
//! capitalized form (`"Happy"`, `"Fear"`), which is what the web client
//! matches on.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Emotion segments
// ---------------------------------------------------------------------------

/// The fixed label set every predictor draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Neutral,
    Surprised,
    Fear,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 6] = [
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Neutral,
        EmotionLabel::Surprised,
        EmotionLabel::Fear,
    ];
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A labelled time span of the analysed audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSegment {
    /// Segment start in seconds (≥ 0).
    pub start: f64,
    /// Segment end in seconds (> start).
    pub end: f64,
    pub emotion: EmotionLabel,
    /// Predictor confidence in [0.0, 1.0].
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Per-model results
// ---------------------------------------------------------------------------

/// Analysis of one uploaded file for one requested model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub model_id: String,
    pub model_name: String,
    /// Visualization curve: 100 intensities in [0, 100], one per time slice.
    pub spectrogram_data: Vec<f32>,
    pub emotions: Vec<EmotionSegment>,
    /// Audio duration in seconds.
    pub duration: f64,
}

/// Body of a successful `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// One entry per requested model, in request order.
    pub spectrograms: Vec<AnalysisResult>,
}
