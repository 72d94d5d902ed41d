//! `RandomPredictor`: development stand-in that invents plausible segments.
//!
//! The waveform duration is split into 4 or 5 equal segments, each labelled
//! with a random emotion and a confidence in [0.70, 0.95). Times and
//! confidences are rounded to two decimals, which is what clients display.
//!
//! Segment bounds are laid out on a 10 ms grid so every segment keeps
//! `end > start` after rounding; clips too short for 4 steps get fewer
//! segments, and a clip under 5 ms gets one unrounded segment.

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::analysis::report::{EmotionLabel, EmotionSegment};
use crate::audio::waveform::Waveform;
use crate::error::Result;
use crate::predictor::EmotionPredictor;

pub struct RandomPredictor {
    rng: StdRng,
}

impl RandomPredictor {
    /// Entropy-seeded predictor: different output on every run.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible predictor for tests and demos.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPredictor {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Segment boundaries in seconds, `num_segments + 1` strictly increasing
/// values from 0 to `duration`.
fn segment_bounds(duration: f64, num_segments: usize) -> Vec<f64> {
    let total_cs = (duration * 100.0).round() as usize;
    if total_cs == 0 {
        return vec![0.0, duration];
    }
    let n = num_segments.clamp(1, total_cs);
    (0..=n)
        .map(|i| (i as f64 * total_cs as f64 / n as f64).round() / 100.0)
        .collect()
}

impl EmotionPredictor for RandomPredictor {
    fn warm_up(&mut self) -> Result<()> {
        debug!("RandomPredictor::warm_up: no-op");
        Ok(())
    }

    fn predict(&mut self, waveform: &Waveform, model_id: &str) -> Result<Vec<EmotionSegment>> {
        let duration = waveform.duration_secs();
        let num_segments: usize = self.rng.gen_range(4..=5);
        let bounds = segment_bounds(duration, num_segments);

        let segments: Vec<EmotionSegment> = bounds
            .windows(2)
            .map(|pair| {
                let emotion =
                    EmotionLabel::ALL[self.rng.gen_range(0..EmotionLabel::ALL.len())];
                let confidence: f64 = self.rng.gen_range(0.70..0.95);
                EmotionSegment {
                    start: pair[0],
                    end: pair[1],
                    emotion,
                    confidence: round2(confidence),
                }
            })
            .collect();
        let num_segments = segments.len();

        debug!(model_id, num_segments, duration, "random emotion segments");
        Ok(segments)
    }
}
