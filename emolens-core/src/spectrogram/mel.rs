//! Mel filter bank and analysis window.
//!
//! Filters follow the Slaney auditory-toolbox convention: linear below 1 kHz,
//! logarithmic above, with each triangle scaled to unit area
//! (`2 / (f_upper - f_lower)`). Weights are computed in f64 and stored as f32.

use ndarray::Array2;

/// Periodic Hann window of length `n` (the FFT-friendly variant).
pub fn hann_window(n: usize) -> Vec<f32> {
    use std::f64::consts::PI;
    (0..n)
        .map(|i| (0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos()) as f32)
        .collect()
}

/// Build a `(n_mels, n_fft / 2 + 1)` filter bank covering `[fmin, fmax]` Hz.
pub fn mel_filter_bank(sample_rate: u32, n_fft: usize, n_mels: usize, fmin: f64, fmax: f64) -> Array2<f32> {
    let n_freqs = n_fft / 2 + 1;
    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);

    // n_mels + 2 band edges, evenly spaced on the mel scale.
    let edges: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f64 / (n_mels + 1) as f64))
        .collect();

    let fft_freqs: Vec<f64> = (0..n_freqs)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect();

    let mut filters = Array2::<f32>::zeros((n_mels, n_freqs));
    for m in 0..n_mels {
        let lower = edges[m];
        let center = edges[m + 1];
        let upper = edges[m + 2];
        let enorm = 2.0 / (upper - lower);

        for (k, &freq) in fft_freqs.iter().enumerate() {
            let rising = (freq - lower) / (center - lower);
            let falling = (upper - freq) / (upper - center);
            let w = rising.min(falling).max(0.0);
            filters[[m, k]] = (w * enorm) as f32;
        }
    }
    filters
}

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1_000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP; // 15

fn log_step() -> f64 {
    6.4_f64.ln() / 27.0
}

/// Hz → mel, Slaney scale.
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// mel → Hz, Slaney scale.
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        mel * F_SP
    }
}
