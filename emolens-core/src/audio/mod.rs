//! Audio decoding: encoded bytes → mono f32 waveform at a fixed rate.
//!
//! Container and codec detection is delegated to symphonia's default probe,
//! so anything it registers (WAV, MP3, FLAC, OGG/Vorbis, AAC/MP4, ...) is
//! accepted. Multi-channel audio is downmixed by averaging the channels of
//! each frame, then resampled to the requested rate.

pub mod resample;
pub mod waveform;

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

use crate::error::{EmolensError, Result};
use resample::{RateConverter, DEFAULT_CHUNK_SIZE};
use waveform::Waveform;

/// Analysis sample rate used when the caller does not ask for another one.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Decode an encoded audio file held in memory.
///
/// The returned waveform is mono and its `sample_rate` is exactly
/// `target_sample_rate`, whatever the source encoding was.
///
/// # Errors
/// Returns `EmolensError::Decode` when the buffer is empty, the format is not
/// recognised, no decodable track exists, decoding yields no samples, or the
/// target rate is zero.
pub fn decode_audio(bytes: &[u8], target_sample_rate: u32) -> Result<Waveform> {
    if bytes.is_empty() {
        return Err(EmolensError::Decode("empty audio buffer".into()));
    }
    if target_sample_rate == 0 {
        return Err(EmolensError::Decode("target sample rate must be > 0".into()));
    }

    let (mono, source_rate) = decode_to_mono(bytes)?;

    let samples = RateConverter::new(source_rate, target_sample_rate, DEFAULT_CHUNK_SIZE)?
        .convert(&mono)?;

    info!(
        source_rate,
        target_sample_rate,
        samples = samples.len(),
        "decoded audio"
    );

    Ok(Waveform::new(samples, target_sample_rate))
}

/// Decode every packet of the first decodable track and downmix to mono.
///
/// Returns the mono samples and the source sample rate.
fn decode_to_mono(bytes: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| EmolensError::Decode(format!("unrecognised audio format: {e}")))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| EmolensError::Decode("no decodable audio track".into()))?;

    let track_id = track.id;
    let mut source_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| EmolensError::Decode(format!("unsupported codec: {e}")))?;

    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(EmolensError::Decode(format!(
                    "failed to read audio packet: {e}"
                )))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("skipping corrupt packet: {e}");
                continue;
            }
            Err(e) => {
                return Err(EmolensError::Decode(format!(
                    "failed to decode audio packet: {e}"
                )))
            }
        };

        let spec = *decoded.spec();
        source_rate.get_or_insert(spec.rate);
        let channels = spec.channels.count().max(1);

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        downmix_into(sample_buf.samples(), channels, &mut mono);
    }

    let source_rate =
        source_rate.ok_or_else(|| EmolensError::Decode("unknown source sample rate".into()))?;

    if mono.is_empty() {
        return Err(EmolensError::Decode("audio contains no samples".into()));
    }

    debug!(source_rate, frames = mono.len(), "decoded source audio");
    Ok((mono, source_rate))
}

/// Average each interleaved frame of `channels` samples into one mono sample.
fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.reserve(interleaved.len() / channels);
    for frame in interleaved.chunks_exact(channels) {
        let sum = frame.iter().copied().fold(0.0f32, |acc, x| acc + x);
        out.push(sum / channels as f32);
    }
}
