//! CLI Module
//!
//! Command-line interface for Stegaudio.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stegaudio - hide audio clips inside images
#[derive(Parser, Debug)]
#[command(name = "stegaudio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hide a WAV file inside a cover image
    #[command(name = "embed")]
    Embed {
        /// Cover image (PNG, JPEG or BMP)
        #[arg(long)]
        cover: PathBuf,

        /// Audio to hide (integer PCM WAV)
        #[arg(short, long)]
        audio: PathBuf,

        /// Stego image to write (always PNG)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Identifier to embed; a random one is generated when omitted
        #[arg(long)]
        id: Option<u32>,

        /// Write a JSON report here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Recover the hidden audio from a stego image
    #[command(name = "extract")]
    Extract {
        /// Stego image (PNG or BMP)
        image: PathBuf,

        /// WAV file to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a JSON report here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show how much audio an image can carry
    #[command(name = "capacity")]
    Capacity {
        /// Cover image
        image: PathBuf,

        /// Check whether this WAV file fits
        #[arg(short, long)]
        audio: Option<PathBuf>,
    },

    /// Compare a cover image with its stego counterpart
    #[command(name = "quality")]
    Quality {
        /// Original cover image
        cover: PathBuf,

        /// Stego image
        stego: PathBuf,
    },

    /// Print the payload header of a stego image
    #[command(name = "inspect")]
    Inspect {
        /// Stego image
        image: PathBuf,
    },
}
