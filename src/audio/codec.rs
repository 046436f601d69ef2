//! Audio codec
//!
//! Converts PCM audio into a fixed 16-bit-per-sample bitstream and back.
//!
//! Encoding downmixes stereo to mono, rescales the whole clip to [0, 1]
//! using its global min/max and requantizes every sample to 16 bits.
//! Decoding maps each 16-bit group onto non-negative 16-bit PCM.
//! The pair is not a lossless round trip for the audio itself, but the
//! bitstream is carried bit-exact through framing and embedding.

use log::debug;

use crate::audio::AudioBuffer;
use crate::bitstream::Bitstream;
use crate::error::{Result, StegoError};

// ============================================================================
// Constants
// ============================================================================

/// Minimum supported sample rate in Hz
pub const MIN_FRAME_RATE: u32 = 8000;

/// Maximum supported sample rate in Hz
pub const MAX_FRAME_RATE: u32 = 48000;

/// Maximum audio duration in seconds
pub const MAX_AUDIO_DURATION_SECS: f64 = 300.0;

/// Accepted input sample widths in bits
pub const SUPPORTED_BIT_DEPTHS: [u16; 3] = [8, 16, 32];

/// Bits emitted per encoded sample
pub const SAMPLE_BITS: usize = 16;

const QUANT_MAX: f64 = 65535.0;
const PCM16_MAX: f64 = 32767.0;

/// Normalized value used for every sample of a constant signal
pub const DEGENERATE_LEVEL: f64 = 0.5;

// ============================================================================
// Limits
// ============================================================================

/// Bounds an input clip must satisfy before it is encoded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioLimits {
    pub min_frame_rate: u32,
    pub max_frame_rate: u32,
    pub max_duration_secs: f64,
}

impl Default for AudioLimits {
    fn default() -> Self {
        Self {
            min_frame_rate: MIN_FRAME_RATE,
            max_frame_rate: MAX_FRAME_RATE,
            max_duration_secs: MAX_AUDIO_DURATION_SECS,
        }
    }
}

impl AudioLimits {
    /// Check that a sample rate lies in the accepted range
    pub fn check_sample_rate(&self, sample_rate: u32) -> Result<()> {
        if !(self.min_frame_rate..=self.max_frame_rate).contains(&sample_rate) {
            return Err(StegoError::InvalidAudioFormat {
                reason: format!(
                    "sample rate {} Hz is not supported, must be between {} and {} Hz",
                    sample_rate, self.min_frame_rate, self.max_frame_rate
                ),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Audio <-> bitstream codec
#[derive(Debug, Clone, Default)]
pub struct AudioCodec {
    limits: AudioLimits,
}

impl AudioCodec {
    pub fn new(limits: AudioLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &AudioLimits {
        &self.limits
    }

    /// Validate the buffer shape against the codec's limits
    ///
    /// # Errors
    /// * `InvalidAudioFormat` - unsupported channels, bit depth, sample rate,
    ///   ragged interleaving, out-of-range samples or excessive duration
    /// * `EmptyAudio` - the buffer holds no frames
    pub fn validate(&self, audio: &AudioBuffer) -> Result<()> {
        let channels = audio.channels();
        if !(1..=2).contains(&channels) {
            return Err(StegoError::InvalidAudioFormat {
                reason: format!(
                    "unsupported number of channels: {} (only mono and stereo are supported)",
                    channels
                ),
            });
        }

        let bits = audio.bits_per_sample();
        if !SUPPORTED_BIT_DEPTHS.contains(&bits) {
            return Err(StegoError::InvalidAudioFormat {
                reason: format!("unsupported sample width: {} bits", bits),
            });
        }

        self.limits.check_sample_rate(audio.sample_rate())?;

        if audio.samples().len() % channels as usize != 0 {
            return Err(StegoError::InvalidAudioFormat {
                reason: format!(
                    "sample count {} is not divisible by channel count {}",
                    audio.samples().len(),
                    channels
                ),
            });
        }

        let (low, high) = sample_range(bits);
        if let Some(bad) = audio
            .samples()
            .iter()
            .find(|&&s| i64::from(s) < low || i64::from(s) > high)
        {
            return Err(StegoError::InvalidAudioFormat {
                reason: format!("sample {} does not fit in {} bits", bad, bits),
            });
        }

        let duration = audio.duration_secs();
        if duration > self.limits.max_duration_secs {
            return Err(StegoError::InvalidAudioFormat {
                reason: format!(
                    "audio duration {:.1}s exceeds maximum allowed duration of {}s",
                    duration, self.limits.max_duration_secs
                ),
            });
        }

        if audio.num_frames() == 0 {
            return Err(StegoError::EmptyAudio);
        }

        Ok(())
    }

    /// Encode audio into a bitstream of 16-bit groups.
    ///
    /// Returns the bitstream and the source sample rate.
    pub fn encode(&self, audio: &AudioBuffer) -> Result<(Bitstream, u32)> {
        self.validate(audio)?;

        let mono = downmix(audio);
        let normalized = normalize(&mono);

        let mut bits = Bitstream::with_capacity(normalized.len() * SAMPLE_BITS);
        for value in normalized {
            bits.push_uint(u64::from(quantize(value)), SAMPLE_BITS);
        }

        debug!(
            "Encoded {} frames ({} ch, {} bit, {} Hz) into {} bits",
            audio.num_frames(),
            audio.channels(),
            audio.bits_per_sample(),
            audio.sample_rate(),
            bits.len()
        );

        Ok((bits, audio.sample_rate()))
    }

    /// Decode a bitstream of 16-bit groups into mono 16-bit PCM.
    ///
    /// # Errors
    /// * `MalformedBitstream` - length is not a multiple of 16
    /// * `InvalidAudioFormat` - sample rate out of range
    pub fn decode(&self, bits: &Bitstream, sample_rate: u32) -> Result<AudioBuffer> {
        if bits.len() % SAMPLE_BITS != 0 {
            return Err(StegoError::MalformedBitstream {
                len: bits.len(),
                group: SAMPLE_BITS,
            });
        }
        self.limits.check_sample_rate(sample_rate)?;

        let samples: Vec<i16> = (0..bits.len() / SAMPLE_BITS)
            .filter_map(|i| bits.read_uint(i * SAMPLE_BITS, SAMPLE_BITS))
            .map(|v| dequantize(v as u16))
            .collect();

        debug!(
            "Decoded {} bits into {} mono frames at {} Hz",
            bits.len(),
            samples.len(),
            sample_rate
        );

        Ok(AudioBuffer::mono16(samples, sample_rate))
    }
}

/// Encode with the default limits
pub fn encode_audio(audio: &AudioBuffer) -> Result<(Bitstream, u32)> {
    AudioCodec::default().encode(audio)
}

/// Decode with the default limits
pub fn decode_audio(bits: &Bitstream, sample_rate: u32) -> Result<AudioBuffer> {
    AudioCodec::default().decode(bits, sample_rate)
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Inclusive value range of a signed sample of the given width
fn sample_range(bits: u16) -> (i64, i64) {
    let half = 1i64 << (bits - 1);
    (-half, half - 1)
}

/// Average stereo frames into mono, truncating toward zero
fn downmix(audio: &AudioBuffer) -> Vec<i64> {
    match audio.channels() {
        2 => audio
            .samples()
            .chunks_exact(2)
            .map(|frame| (i64::from(frame[0]) + i64::from(frame[1])) / 2)
            .collect(),
        _ => audio.samples().iter().map(|&s| i64::from(s)).collect(),
    }
}

/// Rescale to [0, 1] with the global min/max.
///
/// A constant signal has no range to rescale and maps to [`DEGENERATE_LEVEL`].
fn normalize(samples: &[i64]) -> Vec<f64> {
    let (Some(&min), Some(&max)) = (samples.iter().min(), samples.iter().max()) else {
        return Vec::new();
    };

    if min == max {
        return vec![DEGENERATE_LEVEL; samples.len()];
    }

    let range = (max - min) as f64;
    samples
        .iter()
        .map(|&s| (s - min) as f64 / range)
        .collect()
}

#[inline]
fn quantize(normalized: f64) -> u16 {
    (normalized * QUANT_MAX).round().clamp(0.0, QUANT_MAX) as u16
}

#[inline]
fn dequantize(value: u16) -> i16 {
    ((f64::from(value) / QUANT_MAX) * PCM16_MAX).round() as i16
}

// ============================================================================
// Tests
// ============================================================================
