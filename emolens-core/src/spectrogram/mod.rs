//! Spectrogram builder: waveform → fixed-length visualization curve.
//!
//! ## Pipeline
//!
//! ```text
//! samples ─► centred STFT (Hann, n_fft, hop) ─► |X|² ─► mel filter bank
//!         ─► dB relative to grid max (amin 1e-10, top_db floor)
//!         ─► min-max normalize ×100 ─► pick curve_len frames ─► mean over mel bins
//! ```
//!
//! Framing matches the usual librosa defaults: the signal is zero-padded by
//! `n_fft / 2` on both sides, so any non-empty input (even shorter than one
//! window) yields `1 + len / hop` frames.

pub mod mel;

use std::sync::Arc;

use ndarray::{Array1, Array2};
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::waveform::Waveform;
use crate::error::{EmolensError, Result};

/// Number of points in the visualization curve returned to clients.
pub const CURVE_LEN: usize = 100;

/// Floor applied to power values before taking the log.
const AMIN: f32 = 1e-10;

/// Parameters of the spectrogram computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SpectrogramConfig {
    /// Number of mel bands. Default: 128.
    pub n_mels: usize,
    /// FFT window size in samples. Default: 2048.
    pub n_fft: usize,
    /// Hop between frames; `None` means `n_fft / 4`.
    pub hop_length: Option<usize>,
    /// Dynamic range kept below the loudest cell, in dB. `None` disables the
    /// floor. Default: 80.
    pub top_db: Option<f32>,
    /// Length of the output curve. Default: 100.
    pub curve_len: usize,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            n_mels: 128,
            n_fft: 2048,
            hop_length: None,
            top_db: Some(80.0),
            curve_len: CURVE_LEN,
        }
    }
}

impl SpectrogramConfig {
    pub fn hop(&self) -> usize {
        self.hop_length.unwrap_or(self.n_fft / 4)
    }

    /// Reject parameter sets for which the spectrogram is undefined.
    pub fn validate(&self) -> Result<()> {
        if self.n_mels == 0 {
            return Err(EmolensError::Computation("n_mels must be > 0".into()));
        }
        if self.n_fft < 2 {
            return Err(EmolensError::Computation("n_fft must be >= 2".into()));
        }
        if self.hop() == 0 {
            return Err(EmolensError::Computation("hop length must be > 0".into()));
        }
        if self.curve_len == 0 {
            return Err(EmolensError::Computation("curve length must be > 0".into()));
        }
        if let Some(top_db) = self.top_db {
            if top_db.is_nan() || top_db < 0.0 {
                return Err(EmolensError::Computation(format!(
                    "top_db must be non-negative, got {top_db}"
                )));
            }
        }
        Ok(())
    }
}

/// Reusable spectrogram builder. Holds the window and the FFT plan; the mel
/// filter bank depends on the sample rate and is built per call.
pub struct SpectrogramBuilder {
    config: SpectrogramConfig,
    window: Vec<f32>,
    fft: Arc<dyn rustfft::Fft<f32>>,
}

impl std::fmt::Debug for SpectrogramBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrogramBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SpectrogramBuilder {
    /// # Errors
    /// Returns `EmolensError::Computation` if `config` fails validation.
    pub fn new(config: SpectrogramConfig) -> Result<Self> {
        config.validate()?;
        let window = mel::hann_window(config.n_fft);
        let fft = FftPlanner::<f32>::new().plan_fft_forward(config.n_fft);
        Ok(Self {
            config,
            window,
            fft,
        })
    }

    pub fn config(&self) -> &SpectrogramConfig {
        &self.config
    }

    /// Compute the visualization curve for `samples` recorded at `sample_rate`.
    ///
    /// Output has exactly `curve_len` values in `[0, 100]`. Silent or
    /// constant-power input yields all zeros.
    ///
    /// # Errors
    /// Returns `EmolensError::Computation` for an empty waveform or a zero
    /// sample rate.
    pub fn build(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
        if samples.is_empty() {
            return Err(EmolensError::Computation("empty waveform".into()));
        }
        if sample_rate == 0 {
            return Err(EmolensError::Computation("sample rate must be > 0".into()));
        }

        let power = self.mel_power(samples, sample_rate);
        let db = power_to_db(&power, self.config.top_db);
        let scaled = normalize_to_percent(&db);
        let curve = downsample_frames(&scaled, self.config.curve_len);

        debug!(
            samples = samples.len(),
            sample_rate,
            n_frames = power.ncols(),
            "spectrogram built"
        );
        Ok(curve)
    }

    /// Mel power spectrogram, shape `(n_mels, n_frames)`.
    pub fn mel_power(&self, samples: &[f32], sample_rate: u32) -> Array2<f32> {
        let n_fft = self.config.n_fft;
        let hop = self.config.hop();
        let n_freqs = n_fft / 2 + 1;

        let filters = mel::mel_filter_bank(
            sample_rate,
            n_fft,
            self.config.n_mels,
            0.0,
            sample_rate as f64 / 2.0,
        );

        let padded = center_pad(samples, n_fft / 2);
        let n_frames = 1 + (padded.len() - n_fft) / hop;

        let mut mel = Array2::<f32>::zeros((self.config.n_mels, n_frames));
        let mut fft_buf = vec![Complex::new(0.0f32, 0.0); n_fft];
        let mut spectrum = Array1::<f32>::zeros(n_freqs);

        for frame in 0..n_frames {
            let start = frame * hop;
            for (i, slot) in fft_buf.iter_mut().enumerate() {
                *slot = Complex::new(padded[start + i] * self.window[i], 0.0);
            }
            self.fft.process(&mut fft_buf);

            for (k, bin) in spectrum.iter_mut().enumerate() {
                *bin = fft_buf[k].norm_sqr();
            }
            mel.column_mut(frame).assign(&filters.dot(&spectrum));
        }
        mel
    }
}

/// Build the curve for a decoded waveform with the default parameters.
pub fn generate_spectrogram(waveform: &Waveform) -> Result<Vec<f32>> {
    SpectrogramBuilder::new(SpectrogramConfig::default())?
        .build(&waveform.samples, waveform.sample_rate)
}

/// Zero-pad `pad` samples on both sides.
fn center_pad(samples: &[f32], pad: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; samples.len() + 2 * pad];
    out[pad..pad + samples.len()].copy_from_slice(samples);
    out
}

/// Power → dB relative to the grid's own maximum, so the loudest cell is 0 dB.
fn power_to_db(power: &Array2<f32>, top_db: Option<f32>) -> Array2<f32> {
    let max_power = power.iter().copied().fold(0.0f32, f32::max);
    let reference = 10.0 * max_power.max(AMIN).log10();

    let mut db = power.mapv(|p| 10.0 * p.max(AMIN).log10() - reference);
    if let Some(top_db) = top_db {
        let max_db = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let floor = max_db - top_db;
        db.mapv_inplace(|v| v.max(floor));
    }
    db
}

/// Min-max scale to `[0, 100]` using the grid's own extrema.
///
/// A flat grid (`max == min`) has no range to scale; it maps to all zeros.
fn normalize_to_percent(db: &Array2<f32>) -> Array2<f32> {
    let min = db.iter().copied().fold(f32::INFINITY, f32::min);
    let max = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;

    if !range.is_finite() || range <= 0.0 {
        return Array2::zeros(db.raw_dim());
    }
    db.mapv(|v| (v - min) / range * 100.0)
}

/// Frame indices picked for the curve: `curve_len` evenly spaced points from
/// 0 to `n_frames` inclusive, truncated to integers and clamped to the last
/// frame.
fn curve_frame_indices(n_frames: usize, curve_len: usize) -> Vec<usize> {
    let last = n_frames.saturating_sub(1);
    if curve_len == 1 {
        return vec![0];
    }
    let step = n_frames as f64 / (curve_len - 1) as f64;
    (0..curve_len)
        .map(|i| {
            let idx = if i == curve_len - 1 {
                n_frames
            } else {
                (i as f64 * step) as usize
            };
            idx.min(last)
        })
        .collect()
}

/// Average every picked frame across all mel bins.
fn downsample_frames(grid: &Array2<f32>, curve_len: usize) -> Vec<f32> {
    let n_mels = grid.nrows();
    curve_frame_indices(grid.ncols(), curve_len)
        .into_iter()
        .map(|frame| {
            let sum: f64 = grid.column(frame).iter().map(|&v| v as f64).sum();
            (sum / n_mels as f64) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tone(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    fn builder() -> SpectrogramBuilder {
        SpectrogramBuilder::new(SpectrogramConfig::default()).unwrap()
    }

    #[test]
    fn curve_has_fixed_length_and_range() {
        let samples = tone(440.0, 16_000, 32_000);
        let curve = builder().build(&samples, 16_000).unwrap();
        assert_eq!(curve.len(), CURVE_LEN);
        assert!(curve.iter().all(|v| (0.0..=100.0).contains(v)), "{curve:?}");
    }

    #[test]
    fn silent_input_gives_zeros() {
        // 2 s of 16 kHz silence
        let samples = vec![0.0f32; 32_000];
        let curve = builder().build(&samples, 16_000).unwrap();
        assert_eq!(curve, vec![0.0f32; 100]);
    }

    #[test]
    fn repeated_builds_are_identical() {
        let samples = tone(1_000.0, 16_000, 20_000);
        let b = builder();
        let first = b.build(&samples, 16_000).unwrap();
        let second = b.build(&samples, 16_000).unwrap();
        assert_eq!(first, second);
        let fresh = builder().build(&samples, 16_000).unwrap();
        assert_eq!(first, fresh);
    }

    #[test]
    fn input_shorter_than_window_is_defined() {
        let samples = tone(440.0, 16_000, 1_000);
        let curve = builder().build(&samples, 16_000).unwrap();
        assert_eq!(curve.len(), 100);
        assert!(curve.iter().all(|v| v.is_finite() && (0.0..=100.0).contains(v)));
    }

    #[test]
    fn single_sample_input_is_defined() {
        let curve = builder().build(&[0.3], 16_000).unwrap();
        assert_eq!(curve.len(), 100);
        assert!(curve.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn empty_input_is_computation_error() {
        assert!(matches!(
            builder().build(&[], 16_000),
            Err(EmolensError::Computation(_))
        ));
    }

    #[test]
    fn zero_rate_is_computation_error() {
        assert!(matches!(
            builder().build(&[0.1; 4_096], 0),
            Err(EmolensError::Computation(_))
        ));
    }

    #[test]
    fn frame_count_follows_centred_framing() {
        let b = builder();
        // 1 + 32000 / 512 = 63
        assert_eq!(b.mel_power(&vec![0.1; 32_000], 16_000).dim(), (128, 63));
        // Shorter than a window: 1 + 1000 / 512 = 2
        assert_eq!(b.mel_power(&vec![0.1; 1_000], 16_000).dim(), (128, 2));
    }

    #[test]
    fn loud_section_scores_higher_than_quiet_section() {
        let mut samples = tone(440.0, 16_000, 16_000);
        samples.extend(tone(440.0, 16_000, 16_000).iter().map(|s| s * 0.001));
        let curve = builder().build(&samples, 16_000).unwrap();
        let head: f32 = curve[5..40].iter().sum::<f32>() / 35.0;
        let tail: f32 = curve[60..95].iter().sum::<f32>() / 35.0;
        assert!(head > tail, "head={head} tail={tail}");
    }

    #[test]
    fn power_to_db_references_grid_max() {
        let power = Array2::from_shape_vec((1, 3), vec![1.0, 0.1, 0.01]).unwrap();
        let db = power_to_db(&power, None);
        assert_relative_eq!(db[[0, 0]], 0.0, epsilon = 1e-5);
        assert_relative_eq!(db[[0, 1]], -10.0, epsilon = 1e-4);
        assert_relative_eq!(db[[0, 2]], -20.0, epsilon = 1e-4);
    }

    #[test]
    fn power_to_db_applies_top_db_floor() {
        let power = Array2::from_shape_vec((1, 2), vec![1.0, 1e-12]).unwrap();
        let db = power_to_db(&power, Some(80.0));
        assert_relative_eq!(db[[0, 1]], -80.0, epsilon = 1e-4);
    }

    #[test]
    fn flat_grid_normalizes_to_zero() {
        let flat = Array2::from_elem((4, 4), -35.0f32);
        assert!(normalize_to_percent(&flat).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn normalization_spans_zero_to_hundred() {
        let db = Array2::from_shape_vec((1, 3), vec![-80.0, -40.0, 0.0]).unwrap();
        let scaled = normalize_to_percent(&db);
        assert_relative_eq!(scaled[[0, 0]], 0.0);
        assert_relative_eq!(scaled[[0, 1]], 50.0, epsilon = 1e-4);
        assert_relative_eq!(scaled[[0, 2]], 100.0);
    }

    #[test]
    fn frame_indices_are_linear_and_clamped() {
        let idx = curve_frame_indices(63, 100);
        assert_eq!(idx.len(), 100);
        assert_eq!(idx[0], 0);
        // trunc(50 * 63 / 99) = 31
        assert_eq!(idx[50], 31);
        // Endpoint 63 is past the last frame
        assert_eq!(idx[99], 62);
        assert!(idx.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn short_grids_repeat_frame_indices() {
        let idx = curve_frame_indices(2, 100);
        assert_eq!(idx.len(), 100);
        assert!(idx.iter().all(|&i| i <= 1));
        assert_eq!(idx.iter().filter(|&&i| i == 0).count(), 50);
    }

    #[test]
    fn single_point_curve_uses_first_frame() {
        assert_eq!(curve_frame_indices(10, 1), vec![0]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SpectrogramConfig::default();
        config.n_mels = 0;
        assert!(matches!(
            SpectrogramBuilder::new(config),
            Err(EmolensError::Computation(_))
        ));

        let config = SpectrogramConfig {
            top_db: Some(-1.0),
            ..SpectrogramConfig::default()
        };
        assert!(SpectrogramBuilder::new(config).is_err());
    }

    #[test]
    fn generate_spectrogram_uses_defaults() {
        let wave = Waveform::new(tone(300.0, 16_000, 8_000), 16_000);
        let curve = generate_spectrogram(&wave).unwrap();
        assert_eq!(curve.len(), 100);
    }
}
