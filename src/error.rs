//! Error handling for Stegaudio
//!
//! Every failure is deterministic for a given input, so nothing here is
//! retried internally. Sizing errors carry both the expected and the actual
//! values so callers can decide what to change.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Stegaudio operations
pub type Result<T> = std::result::Result<T, StegoError>;

/// Main error type for Stegaudio operations
#[derive(Error, Debug)]
pub enum StegoError {
    // Audio codec errors
    #[error("Invalid audio format: {reason}")]
    InvalidAudioFormat { reason: String },

    #[error("Audio contains no frames")]
    EmptyAudio,

    #[error("Malformed bitstream: length {len} is not a multiple of {group}")]
    MalformedBitstream { len: usize, group: usize },

    // Framing errors
    #[error("Payload too large: {bits} bits does not fit a 32-bit length header (max {max})")]
    PayloadTooLarge { bits: u64, max: u64 },

    #[error("Truncated header: need {expected} bits, got {actual}")]
    TruncatedHeader { expected: usize, actual: usize },

    #[error("Truncated payload: header declares {expected} bits, only {actual} available")]
    TruncatedPayload { expected: usize, actual: usize },

    #[error("Truncated fields: need at least {expected} bits for fixed fields, got {actual}")]
    TruncatedFields { expected: usize, actual: usize },

    #[error("Audio length mismatch: declared {declared} bits, found {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    // Pixel channel errors
    #[error("Insufficient capacity: required {required} bits, available {available}")]
    InsufficientCapacity { required: usize, available: usize },

    #[error("Image dimensions differ: {expected:?} vs {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    // Boundary errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("File too large: {path} is {size} bytes (maximum {max})")]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Unsupported file extension: {path}")]
    UnsupportedExtension { path: PathBuf },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<hound::Error>,
    },

    #[error("Unsupported image format: {format}")]
    UnsupportedImageFormat { format: String },

    #[error("Image load error: {reason}")]
    ImageLoad {
        reason: String,
        #[source]
        source: Option<image::ImageError>,
    },

    #[error("Image save error: {reason}")]
    ImageSave {
        reason: String,
        #[source]
        source: Option<image::ImageError>,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StegoError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            StegoError::InvalidAudioFormat { .. } => "INVALID_AUDIO_FORMAT",
            StegoError::EmptyAudio => "EMPTY_AUDIO",
            StegoError::MalformedBitstream { .. } => "MALFORMED_BITSTREAM",
            StegoError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            StegoError::TruncatedHeader { .. } => "TRUNCATED_HEADER",
            StegoError::TruncatedPayload { .. } => "TRUNCATED_PAYLOAD",
            StegoError::TruncatedFields { .. } => "TRUNCATED_FIELDS",
            StegoError::LengthMismatch { .. } => "LENGTH_MISMATCH",
            StegoError::InsufficientCapacity { .. } => "INSUFFICIENT_CAPACITY",
            StegoError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            StegoError::FileNotFound { .. } => "FILE_NOT_FOUND",
            StegoError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            StegoError::UnsupportedExtension { .. } => "UNSUPPORTED_EXTENSION",
            StegoError::InvalidAudio { .. } => "INVALID_AUDIO",
            StegoError::UnsupportedImageFormat { .. } => "UNSUPPORTED_IMAGE_FORMAT",
            StegoError::ImageLoad { .. } => "IMAGE_LOAD_ERROR",
            StegoError::ImageSave { .. } => "IMAGE_SAVE_ERROR",
            StegoError::InvalidConfig { .. } => "INVALID_CONFIG",
            StegoError::Io(_) => "IO_ERROR",
            StegoError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether a retry with different input (a bigger carrier, another file)
    /// could succeed.
    ///
    /// Corrupted stego data is never recoverable: the same image will always
    /// fail the same way.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StegoError::InvalidAudioFormat { .. }
                | StegoError::EmptyAudio
                | StegoError::PayloadTooLarge { .. }
                | StegoError::InsufficientCapacity { .. }
                | StegoError::FileNotFound { .. }
                | StegoError::FileTooLarge { .. }
                | StegoError::UnsupportedExtension { .. }
                | StegoError::UnsupportedImageFormat { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            StegoError::InvalidAudioFormat { .. } => vec![
                "Use mono or stereo integer PCM WAV (8, 16 or 32 bit)",
                "Sample rate must be between 8000 and 48000 Hz",
                "Keep the clip under the configured maximum duration",
            ],
            StegoError::InsufficientCapacity { .. } => vec![
                "Use a larger carrier image",
                "Use a shorter or lower sample rate audio clip",
            ],
            StegoError::UnsupportedImageFormat { .. } => vec![
                "Stego images must be stored losslessly; use PNG",
                "JPEG recompression destroys the hidden bits",
            ],
            StegoError::TruncatedHeader { .. }
            | StegoError::TruncatedPayload { .. }
            | StegoError::TruncatedFields { .. }
            | StegoError::LengthMismatch { .. } => vec![
                "The image may not contain hidden audio",
                "The image may have been resized, recompressed or edited",
            ],
            _ => vec![],
        }
    }
}
