//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use uuid::Uuid;

use crate::audio::{self, AudioCodec, SAMPLE_BITS};
use crate::channel::{self, pixel};
use crate::config::Config;
use crate::error::Result;
use crate::payload::{FIXED_FIELDS_BITS, HEADER_BITS};
use crate::pipeline::Stegaudio;

/// Random identifier for callers that do not supply one
pub fn fresh_identifier() -> u32 {
    let bytes = Uuid::new_v4().into_bytes();
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Hide a WAV file in a cover image.
pub fn embed(
    config: &Config,
    cover: &Path,
    audio_path: &Path,
    output: Option<&Path>,
    id: Option<u32>,
    report_path: Option<&Path>,
) -> Result<()> {
    let identifier = id.unwrap_or_else(fresh_identifier);
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output(config, &format!("stego_{}.png", identifier))?,
    };

    info!(
        "Embedding {} into {} (id {})",
        audio_path.display(),
        cover.display(),
        identifier
    );

    let pipeline = Stegaudio::new(config.clone());
    let report = pipeline.embed_files(cover, audio_path, &output, identifier)?;

    println!("Stego image saved: {}", output.display());
    println!("Identifier: {}", report.identifier);
    println!(
        "Payload: {} bits ({:.1}% of {} available)",
        report.message_bits,
        report.utilization * 100.0,
        report.capacity_bits
    );
    match report.psnr_db {
        Some(psnr) => println!("PSNR: {:.2} dB", psnr),
        None => println!("PSNR: inf"),
    }

    if let Some(path) = report_path {
        report.save(path)?;
        println!("Report written: {}", path.display());
    }

    Ok(())
}

/// Recover the hidden audio from a stego image.
pub fn extract(
    config: &Config,
    image: &Path,
    output: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<()> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let stem = image
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "extracted".to_string());
            default_output(config, &format!("{}.wav", stem))?
        }
    };

    info!("Extracting audio from {}", image.display());

    let pipeline = Stegaudio::new(config.clone());
    let report = pipeline.extract_files(image, &output)?;

    println!("Audio saved: {}", output.display());
    println!("Identifier: {}", report.identifier);
    println!("Sample rate: {} Hz", report.sample_rate);
    println!(
        "Frames: {} ({:.2}s)",
        report.audio_frames, report.duration_secs
    );
    if let Some(discrepancy) = report.length_discrepancy {
        println!(
            "Warning: declared audio length {} bits, found {}",
            discrepancy.declared, discrepancy.actual
        );
    }

    if let Some(path) = report_path {
        report.save(path)?;
        println!("Report written: {}", path.display());
    }

    Ok(())
}

/// Show carrier capacity and, optionally, whether an audio file fits.
pub fn capacity(config: &Config, image: &Path, audio_path: Option<&Path>) -> Result<()> {
    let carrier = channel::load_carrier(image)?;
    let capacity = pixel::capacity(&carrier);
    let overhead = HEADER_BITS + FIXED_FIELDS_BITS;
    let max_frames = capacity.saturating_sub(overhead) / SAMPLE_BITS;

    println!(
        "Image: {} ({}x{})",
        image.display(),
        carrier.width(),
        carrier.height()
    );
    println!("Capacity: {} bits", capacity);
    println!("Max audio frames: {}", max_frames);
    for rate in [config.min_frame_rate, config.max_frame_rate] {
        println!(
            "  {:>6} Hz: {:.2}s",
            rate,
            max_frames as f64 / f64::from(rate)
        );
    }

    if let Some(audio_path) = audio_path {
        let audio = audio::read_wav(audio_path)?;
        let (bits, _) = AudioCodec::new(config.audio_limits()).encode(&audio)?;
        let required = overhead + bits.len();

        println!(
            "Audio: {} needs {} bits ({} pixels)",
            audio_path.display(),
            required,
            pixel::required_pixels(required)
        );
        if required <= capacity {
            println!("Fits: yes");
        } else {
            println!("Fits: no ({} bits short)", required - capacity);
        }
    }

    Ok(())
}

/// Print PSNR and SNR between a cover and a stego image.
pub fn quality(cover: &Path, stego: &Path) -> Result<()> {
    let cover_image = channel::load_carrier(cover)?;
    let stego_image = channel::load_stego(stego)?;

    let psnr = channel::psnr(&cover_image, &stego_image)?;
    let snr = channel::snr(&cover_image, &stego_image)?;

    println!("=== Color Image PSNR/SNR ===");
    println!("PSNR: {:.2} dB, SNR: {:.2} dB", psnr, snr);

    Ok(())
}

/// Print the payload fields of a stego image without decoding audio.
pub fn inspect(config: &Config, image: &Path) -> Result<()> {
    let stego = channel::load_stego(image)?;
    let info = Stegaudio::new(config.clone()).inspect(&stego)?;

    println!("Identifier: {}", info.identifier);
    println!("Sample rate: {} Hz", info.sample_rate);
    println!("Audio bits: {}", info.audio_bit_length);
    println!("Message bits: {}", info.message_bits);

    Ok(())
}

fn default_output(config: &Config, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(&config.output_dir)?;
    Ok(config.output_dir.join(file_name))
}
