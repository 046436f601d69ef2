//! JSON reports describing an embed or extract run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::bitstream::Bitstream;
use crate::error::Result;
use crate::payload::LengthDiscrepancy;

/// Summary of a successful embed
#[derive(Debug, Clone, Serialize)]
pub struct EmbedReport {
    pub identifier: u32,
    pub sample_rate: u32,
    pub audio_frames: usize,
    pub audio_bits: usize,
    /// Framed message length, header included
    pub message_bits: usize,
    pub capacity_bits: usize,
    /// Fraction of the carrier capacity used
    pub utilization: f64,
    /// `None` when the cover was left unchanged
    pub psnr_db: Option<f64>,
    /// SHA-256 of the packed audio bitstream
    pub audio_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
}

/// Summary of a successful extraction
#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    pub identifier: u32,
    pub sample_rate: u32,
    pub audio_frames: usize,
    pub duration_secs: f64,
    /// SHA-256 of the packed audio bitstream, comparable with [`EmbedReport::audio_sha256`]
    pub audio_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_discrepancy: Option<LengthDiscrepancy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
}

impl EmbedReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl ExtractReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Hex SHA-256 of a bitstream's packed bytes and its bit length.
///
/// The length is hashed too, so streams differing only in trailing zero
/// bits do not collide.
pub fn bitstream_digest(bits: &Bitstream) -> String {
    let mut hasher = Sha256::new();
    hasher.update((bits.len() as u64).to_be_bytes());
    hasher.update(bits.to_bytes());
    format!("{:x}", hasher.finalize())
}

/// Turn an infinite metric into `None` so it serializes cleanly
pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
