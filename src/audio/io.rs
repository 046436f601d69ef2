//! WAV file I/O
//!
//! Reads integer PCM WAV files into an [`AudioBuffer`] and writes decoded
//! audio back out, using the hound crate. Shape validation (channels, rates,
//! duration) is left to the codec so that every rejection carries the same
//! error kind regardless of where the audio came from.

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;

use crate::audio::AudioBuffer;
use crate::error::{Result, StegoError};

/// Read a WAV file from disk
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a readable WAV file
/// * `InvalidAudioFormat` - If the samples are floating point
pub fn read_wav(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(StegoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| StegoError::InvalidAudio {
        reason: format!("Failed to open WAV file {}: {}", path.display(), e),
        source: Some(e),
    })?;

    read_samples(reader)
}

/// Read WAV data from any reader (e.g. an in-memory upload)
pub fn read_wav_from<R: Read>(reader: R) -> Result<AudioBuffer> {
    let reader = WavReader::new(reader).map_err(|e| StegoError::InvalidAudio {
        reason: format!("Failed to parse WAV data: {}", e),
        source: Some(e),
    })?;

    read_samples(reader)
}

/// Write a buffer as integer PCM WAV to disk
pub fn write_wav(buffer: &AudioBuffer, path: &Path) -> Result<()> {
    let writer = WavWriter::create(path, wav_spec(buffer)?).map_err(|e| write_error(path, e))?;
    write_samples(buffer, writer).map_err(|e| write_error(path, e))?;

    info!(
        "Audio file saved: {} ({} Hz, {} frames, {:.2}s)",
        path.display(),
        buffer.sample_rate(),
        buffer.num_frames(),
        buffer.duration_secs()
    );

    Ok(())
}

/// Encode a buffer as an in-memory WAV file
pub fn wav_bytes(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    let writer = WavWriter::new(&mut cursor, wav_spec(buffer)?).map_err(|e| {
        StegoError::InvalidAudio {
            reason: format!("Failed to start WAV stream: {}", e),
            source: Some(e),
        }
    })?;
    write_samples(buffer, writer).map_err(|e| StegoError::InvalidAudio {
        reason: format!("Failed to write WAV stream: {}", e),
        source: Some(e),
    })?;

    Ok(cursor.into_inner())
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn read_samples<R: Read>(reader: WavReader<R>) -> Result<AudioBuffer> {
    let spec = reader.spec();

    if spec.sample_format == SampleFormat::Float {
        return Err(StegoError::InvalidAudioFormat {
            reason: format!(
                "{}-bit floating point samples are not supported, use integer PCM",
                spec.bits_per_sample
            ),
        });
    }

    let samples = reader
        .into_samples::<i32>()
        .collect::<std::result::Result<Vec<i32>, _>>()
        .map_err(|e| StegoError::InvalidAudio {
            reason: format!("Failed to read {}-bit samples: {}", spec.bits_per_sample, e),
            source: Some(e),
        })?;

    Ok(AudioBuffer::new(
        samples,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_rate,
    ))
}

fn wav_spec(buffer: &AudioBuffer) -> Result<WavSpec> {
    match buffer.bits_per_sample() {
        8 | 16 | 32 => Ok(WavSpec {
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate(),
            bits_per_sample: buffer.bits_per_sample(),
            sample_format: SampleFormat::Int,
        }),
        other => Err(StegoError::InvalidAudioFormat {
            reason: format!("cannot write {}-bit audio (only 8, 16, 32 supported)", other),
        }),
    }
}

fn write_samples<W: Write + Seek>(
    buffer: &AudioBuffer,
    mut writer: WavWriter<W>,
) -> std::result::Result<(), hound::Error> {
    match buffer.bits_per_sample() {
        8 => {
            for &sample in buffer.samples() {
                writer.write_sample(sample as i8)?;
            }
        }
        16 => {
            for &sample in buffer.samples() {
                writer.write_sample(sample as i16)?;
            }
        }
        _ => {
            for &sample in buffer.samples() {
                writer.write_sample(sample)?;
            }
        }
    }
    writer.finalize()
}

fn write_error(path: &Path, e: hound::Error) -> StegoError {
    StegoError::InvalidAudio {
        reason: format!("Failed to write WAV file {}: {}", path.display(), e),
        source: Some(e),
    }
}

// ============================================================================
// Tests
// ============================================================================
