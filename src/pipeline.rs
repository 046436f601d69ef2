//! Embed and extract pipelines
//!
//! Composes the codec, the framer and the pixel channel:
//!
//! ```text
//! embed:   audio -> codec -> framer -> pixel channel -> stego image
//! extract: stego image -> pixel channel (header, then body) -> framer -> codec -> audio
//! ```
//!
//! Every call is independent and holds no state between runs.

use std::path::Path;

use chrono::Utc;
use log::{debug, info};

use crate::audio::{self, AudioBuffer, AudioCodec, SAMPLE_BITS};
use crate::bitstream::Bitstream;
use crate::channel::{self, pixel, CarrierImage};
use crate::config::Config;
use crate::error::{Result, StegoError};
use crate::payload::{read_header, FramedMessage, LengthDiscrepancy, PayloadFramer, HEADER_BITS};
use crate::report::{bitstream_digest, finite, EmbedReport, ExtractReport};

/// Write a framed message into a copy of `image`
pub fn embed(image: &CarrierImage, framed: &FramedMessage) -> Result<CarrierImage> {
    pixel::write(image, framed.bits())
}

/// Read a framed message out of `image`.
///
/// Reads the 32-bit header first, then exactly the number of bits it
/// declares; nothing beyond that is scanned.
///
/// # Errors
/// * `TruncatedHeader` - the image holds fewer than 32 bits
/// * `TruncatedPayload` - the image cannot hold the declared length
pub fn extract(image: &CarrierImage) -> Result<FramedMessage> {
    let header_bits = pixel::read(image, Some(HEADER_BITS));
    let declared = read_header(&header_bits)? as usize;

    let available = pixel::capacity(image) - HEADER_BITS;
    if declared > available {
        return Err(StegoError::TruncatedPayload {
            expected: declared,
            actual: available,
        });
    }

    let bits = pixel::read(image, Some(HEADER_BITS + declared));
    debug!("Extracted {} framed bits", bits.len());
    FramedMessage::from_bits(bits)
}

/// Result of hiding audio in a cover image
#[derive(Debug, Clone)]
pub struct Hidden {
    pub image: CarrierImage,
    pub report: EmbedReport,
}

/// Audio recovered from a stego image
#[derive(Debug, Clone)]
pub struct Revealed {
    pub identifier: u32,
    pub sample_rate: u32,
    pub audio: AudioBuffer,
    pub audio_bits: Bitstream,
    pub length_discrepancy: Option<LengthDiscrepancy>,
}

/// Header fields of a stego image, read without decoding the audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadInfo {
    pub identifier: u32,
    pub sample_rate: u16,
    pub audio_bit_length: u32,
    pub message_bits: usize,
}

/// Configured embed/extract pipeline
#[derive(Debug, Clone, Default)]
pub struct Stegaudio {
    config: Config,
    codec: AudioCodec,
    framer: PayloadFramer,
}

impl Stegaudio {
    pub fn new(config: Config) -> Self {
        let codec = AudioCodec::new(config.audio_limits());
        let framer = PayloadFramer::new(config.parse_mode());
        Self {
            config,
            codec,
            framer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Encode `audio`, frame it under `identifier` and hide it in a copy of `cover`
    pub fn hide_audio(
        &self,
        cover: &CarrierImage,
        audio: &AudioBuffer,
        identifier: u32,
    ) -> Result<Hidden> {
        let (audio_bits, sample_rate) = self.codec.encode(audio)?;
        let wire_rate = u16::try_from(sample_rate).map_err(|_| StegoError::InvalidAudioFormat {
            reason: format!("sample rate {} Hz does not fit the 16-bit field", sample_rate),
        })?;

        let audio_sha256 = bitstream_digest(&audio_bits);
        let audio_bit_count = audio_bits.len();
        let framed = self.framer.build(identifier, wire_rate, audio_bits)?;
        let image = embed(cover, &framed)?;

        let capacity_bits = pixel::capacity(cover);
        let report = EmbedReport {
            identifier,
            sample_rate,
            audio_frames: audio.num_frames(),
            audio_bits: audio_bit_count,
            message_bits: framed.len(),
            capacity_bits,
            utilization: framed.len() as f64 / capacity_bits as f64,
            psnr_db: finite(channel::psnr(cover, &image)?),
            audio_sha256,
            cover: None,
            output: None,
            created_at: Utc::now(),
        };

        info!(
            "Embedded id {} ({} bits) into {}x{} image, {:.1}% of capacity",
            identifier,
            framed.len(),
            cover.width(),
            cover.height(),
            report.utilization * 100.0
        );

        Ok(Hidden { image, report })
    }

    /// Recover identifier, sample rate and audio from a stego image
    pub fn reveal_audio(&self, stego: &CarrierImage) -> Result<Revealed> {
        let framed = extract(stego)?;
        let payload = self.framer.parse(framed.bits())?;

        let identifier = payload.identifier();
        let sample_rate = u32::from(payload.sample_rate());
        let length_discrepancy = payload.length_discrepancy();
        let audio_bits = payload.into_audio_bits();

        let mut padded = audio_bits.clone();
        padded.pad_to_multiple(SAMPLE_BITS);
        let audio = self.codec.decode(&padded, sample_rate)?;

        info!(
            "Extracted id {} ({} frames at {} Hz)",
            identifier,
            audio.num_frames(),
            sample_rate
        );

        Ok(Revealed {
            identifier,
            sample_rate,
            audio,
            audio_bits,
            length_discrepancy,
        })
    }

    /// Read the payload fields without decoding the audio
    pub fn inspect(&self, stego: &CarrierImage) -> Result<PayloadInfo> {
        let framed = extract(stego)?;
        let payload = self.framer.parse(framed.bits())?;
        Ok(PayloadInfo {
            identifier: payload.identifier(),
            sample_rate: payload.sample_rate(),
            audio_bit_length: payload.audio_bit_length(),
            message_bits: framed.len(),
        })
    }

    /// Hide a WAV file in a cover image file and save the result as PNG
    pub fn embed_files(
        &self,
        cover_path: &Path,
        audio_path: &Path,
        output_path: &Path,
        identifier: u32,
    ) -> Result<EmbedReport> {
        self.check_input(cover_path, &self.config.allowed_image_extensions)?;
        self.check_input(audio_path, &self.config.allowed_audio_extensions)?;

        let cover = channel::load_carrier(cover_path)?;
        let audio = audio::read_wav(audio_path)?;

        let Hidden { image, mut report } = self.hide_audio(&cover, &audio, identifier)?;
        channel::save_png(&image, output_path)?;

        report.cover = Some(cover_path.to_path_buf());
        report.output = Some(output_path.to_path_buf());
        Ok(report)
    }

    /// Extract audio from a stego image file and save it as WAV
    pub fn extract_files(&self, stego_path: &Path, audio_out: &Path) -> Result<ExtractReport> {
        self.check_input(stego_path, &self.config.allowed_image_extensions)?;

        let stego = channel::load_stego(stego_path)?;
        let revealed = self.reveal_audio(&stego)?;
        audio::write_wav(&revealed.audio, audio_out)?;

        Ok(ExtractReport {
            identifier: revealed.identifier,
            sample_rate: revealed.sample_rate,
            audio_frames: revealed.audio.num_frames(),
            duration_secs: revealed.audio.duration_secs(),
            audio_sha256: bitstream_digest(&revealed.audio_bits),
            length_discrepancy: revealed.length_discrepancy,
            source: Some(stego_path.to_path_buf()),
            output: Some(audio_out.to_path_buf()),
            created_at: Utc::now(),
        })
    }

    /// Existence, extension and size checks for an input file
    fn check_input(
        &self,
        path: &Path,
        allowed: &std::collections::BTreeSet<String>,
    ) -> Result<()> {
        if !path.exists() {
            return Err(StegoError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        if !extension.is_some_and(|ext| allowed.contains(&ext)) {
            return Err(StegoError::UnsupportedExtension {
                path: path.to_path_buf(),
            });
        }

        let size = std::fs::metadata(path)?.len();
        if size > self.config.max_file_size {
            return Err(StegoError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                max: self.config.max_file_size,
            });
        }

        Ok(())
    }
}
