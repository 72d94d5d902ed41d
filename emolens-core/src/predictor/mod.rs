//! Emotion predictor abstraction.
//!
//! The `EmotionPredictor` trait decouples request handling from any specific
//! classifier. Which implementation runs is decided once, from configuration,
//! when the `Analyzer` is built (`PredictorKind`), never by a global switch.
//!
//! `&mut self` on `predict` lets implementations keep state (an RNG, model
//! caches). All mutation is serialised through `PredictorHandle`'s
//! `parking_lot::Mutex`.

pub mod placeholder;
pub mod random;

pub use placeholder::PlaceholderPredictor;
pub use random::RandomPredictor;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::analysis::report::EmotionSegment;
use crate::audio::waveform::Waveform;
use crate::error::Result;

/// Contract for emotion classification backends.
pub trait EmotionPredictor: Send + 'static {
    /// One-time warm-up: load weights, allocate buffers. Called once before
    /// the first request is served.
    ///
    /// # Errors
    /// Returns an error if model files are missing or corrupt.
    fn warm_up(&mut self) -> Result<()>;

    /// Label `waveform` with emotion segments for model `model_id`.
    ///
    /// Segments are returned in time order and cover the waveform duration.
    /// Callers must not assume they are contiguous or non-overlapping.
    fn predict(&mut self, waveform: &Waveform, model_id: &str) -> Result<Vec<EmotionSegment>>;
}

/// Which predictor implementation a service is built with.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PredictorKind {
    /// Random segments with plausible confidences (development stand-in).
    #[default]
    Random,
    /// Two fixed segments, where the trained classifier will plug in.
    Placeholder,
}

impl std::fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictorKind::Random => write!(f, "random"),
            PredictorKind::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Thread-safe reference-counted handle to any `EmotionPredictor` implementor.
#[derive(Clone)]
pub struct PredictorHandle(pub Arc<Mutex<dyn EmotionPredictor>>);

impl PredictorHandle {
    /// Wrap any `EmotionPredictor` in a `PredictorHandle`.
    pub fn new<P: EmotionPredictor>(predictor: P) -> Self {
        Self(Arc::new(Mutex::new(predictor)))
    }

    /// Build the predictor selected by `kind`. `seed` makes the random
    /// predictor reproducible and is ignored by the others.
    pub fn from_kind(kind: PredictorKind, seed: Option<u64>) -> Self {
        match kind {
            PredictorKind::Random => match seed {
                Some(seed) => Self::new(RandomPredictor::with_seed(seed)),
                None => Self::new(RandomPredictor::new()),
            },
            PredictorKind::Placeholder => Self::new(PlaceholderPredictor),
        }
    }

    pub fn warm_up(&self) -> Result<()> {
        self.0.lock().warm_up()
    }

    pub fn predict(&self, waveform: &Waveform, model_id: &str) -> Result<Vec<EmotionSegment>> {
        self.0.lock().predict(waveform, model_id)
    }
}

impl std::fmt::Debug for PredictorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictorHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_lowercase() {
        let kind: PredictorKind = serde_json::from_str(r#""placeholder""#).unwrap();
        assert_eq!(kind, PredictorKind::Placeholder);
        assert!(serde_json::from_str::<PredictorKind>(r#""Random""#).is_err());
        assert_eq!(PredictorKind::default(), PredictorKind::Random);
        assert_eq!(PredictorKind::Random.to_string(), "random");
    }

    #[test]
    fn seeded_handles_agree() {
        let wave = Waveform::new(vec![0.0; 48_000], 16_000);
        let a = PredictorHandle::from_kind(PredictorKind::Random, Some(7));
        let b = PredictorHandle::from_kind(PredictorKind::Random, Some(7));
        assert_eq!(
            a.predict(&wave, "baseline").unwrap(),
            b.predict(&wave, "baseline").unwrap()
        );
    }

    #[test]
    fn placeholder_handle_warms_up() {
        let handle = PredictorHandle::from_kind(PredictorKind::Placeholder, None);
        handle.warm_up().unwrap();
        let wave = Waveform::new(vec![0.0; 16_000], 16_000);
        assert_eq!(handle.predict(&wave, "advanced").unwrap().len(), 2);
    }
}
