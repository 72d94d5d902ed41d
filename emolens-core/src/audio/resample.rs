//! Offline sample-rate conversion using a rubato `FastFixedIn` resampler.
//!
//! ## Design
//!
//! Uploaded files arrive at whatever rate they were recorded with (44.1 kHz,
//! 48 kHz, 8 kHz telephone audio, ...). Analysis runs at a single fixed rate.
//! `RateConverter` converts a whole decoded buffer in one call.
//!
//! The output length is exactly `ceil(n * target / source)`: rubato's output
//! delay is dropped from the head, and zero blocks are fed after the input
//! until the delayed tail has been flushed.
//!
//! When source rate == target rate, `RateConverter` is a passthrough and no
//! rubato session is created at all.
//!
//! ## Usage
//!
//! ```ignore
//! let mut rc = RateConverter::new(48_000, 16_000, 1024)?;
//! let out = rc.convert(&decoded)?; // Vec<f32> at 16 kHz
//! ```

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::debug;

use crate::error::{EmolensError, Result};

/// Input frame count per rubato call used by `resample`.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Converts f32 mono audio from one fixed sample rate to another.
pub struct RateConverter {
    /// `None` when source rate == target rate (passthrough mode).
    resampler: Option<FastFixedIn<f32>>,
    source_rate: u32,
    target_rate: u32,
    /// How many input samples rubato expects per process call.
    chunk_size: usize,
    /// Pre-allocated output buffer: `[1][output_frames_max]`.
    output_buf: Vec<Vec<f32>>,
}

impl RateConverter {
    /// Create a new converter.
    ///
    /// # Parameters
    /// - `source_rate`: Sample rate of the decoded audio (Hz).
    /// - `target_rate`: Sample rate expected by the analysis (Hz).
    /// - `chunk_size`: Input frame count per rubato call (e.g. `1024`).
    ///
    /// # Errors
    /// Returns `EmolensError::Decode` if either rate is zero or rubato fails
    /// to initialise.
    pub fn new(source_rate: u32, target_rate: u32, chunk_size: usize) -> Result<Self> {
        if source_rate == 0 || target_rate == 0 {
            return Err(EmolensError::Decode(format!(
                "invalid sample rate conversion {source_rate} Hz -> {target_rate} Hz"
            )));
        }
        let chunk_size = chunk_size.max(1);

        if source_rate == target_rate {
            return Ok(Self {
                resampler: None,
                source_rate,
                target_rate,
                chunk_size,
                output_buf: Vec::new(),
            });
        }

        let ratio = target_rate as f64 / source_rate as f64;

        let resampler = FastFixedIn::<f32>::new(
            ratio,
            1.0, // fixed ratio, no dynamic adjustment
            PolynomialDegree::Cubic,
            chunk_size,
            1, // mono
        )
        .map_err(|e| EmolensError::Decode(format!("resampler init: {e}")))?;

        let max_out = resampler.output_frames_max();
        let output_buf = vec![vec![0f32; max_out]; 1];

        debug!(
            source_rate,
            target_rate,
            chunk_size,
            max_out,
            "resampling enabled from={} to={}",
            source_rate,
            target_rate
        );

        Ok(Self {
            resampler: Some(resampler),
            source_rate,
            target_rate,
            chunk_size,
            output_buf,
        })
    }

    /// Number of output samples `convert` produces for `input_len` input samples.
    pub fn expected_len(&self, input_len: usize) -> usize {
        let num = input_len as u64 * self.target_rate as u64;
        num.div_ceil(self.source_rate as u64) as usize
    }

    /// Convert a complete buffer.
    ///
    /// In passthrough mode (same rates), input is returned directly.
    pub fn convert(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        let expected = self.expected_len(samples.len());
        let chunk_size = self.chunk_size;

        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(samples.to_vec());
        };

        let delay = resampler.output_delay();
        let wanted = expected + delay;
        // Bound on zero blocks fed after the input; the delay never spans more
        // than a handful of chunks.
        let max_blocks = samples.len().div_ceil(chunk_size) + delay.div_ceil(chunk_size.max(1)) + 8;

        let mut out = Vec::with_capacity(wanted);
        let mut block = vec![0f32; chunk_size];
        let mut pos = 0usize;
        let mut blocks = 0usize;

        while out.len() < wanted && blocks < max_blocks {
            block.fill(0.0);
            if pos < samples.len() {
                let end = (pos + chunk_size).min(samples.len());
                block[..end - pos].copy_from_slice(&samples[pos..end]);
            }
            pos += chunk_size;
            blocks += 1;

            let (_consumed, produced) = resampler
                .process_into_buffer(&[&block[..]], &mut self.output_buf, None)
                .map_err(|e| EmolensError::Decode(format!("resampler process: {e}")))?;
            out.extend_from_slice(&self.output_buf[0][..produced]);
        }

        out.drain(..delay.min(out.len()));
        out.resize(expected, 0.0);
        Ok(out)
    }

    /// Returns `true` when source rate == target rate (no resampling occurs).
    pub fn is_passthrough(&self) -> bool {
        self.resampler.is_none()
    }
}

/// One-shot helper: convert `samples` from `source_rate` to `target_rate`.
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    RateConverter::new(source_rate, target_rate, DEFAULT_CHUNK_SIZE)?.convert(samples)
}
