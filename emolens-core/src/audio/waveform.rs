//! Decoded mono waveform handed to the spectrogram builder and the predictors.

/// A contiguous block of mono PCM samples at a known sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Mono f32 samples, nominally in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz (16000 after `decode_audio` with the default target).
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Returns the duration of this waveform in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Returns true if the waveform contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_samples_over_rate() {
        let wave = Waveform::new(vec![0.0; 32_000], 16_000);
        assert!((wave.duration_secs() - 2.0).abs() < 1e-12);
        assert_eq!(wave.len(), 32_000);
        assert!(!wave.is_empty());
    }

    #[test]
    fn zero_rate_has_zero_duration() {
        let wave = Waveform::new(vec![0.1; 10], 0);
        assert_eq!(wave.duration_secs(), 0.0);
    }
}
