//! Stegaudio - audio-in-image steganography
//!
//! Hides a quantized audio clip, a caller-supplied 32-bit identifier and the
//! clip's sample rate in the low bit planes of an RGB image, and recovers
//! them bit-for-bit.
//!
//! # Architecture
//!
//! Three pure, stateless stages, leaves first:
//! - Audio codec: PCM <-> 16-bit-per-sample bitstream
//! - Payload framer: length-prefixed, self-describing message
//! - Pixel channel: cyclic 3-bit-per-pixel LSB write/read
//!
//! The [`pipeline`] module composes them; the [`cli`] module wraps the
//! pipeline for the command line.

pub mod audio;
pub mod bitstream;
pub mod channel;
pub mod cli;
pub mod config;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod report;

pub use audio::{decode_audio, encode_audio, AudioBuffer, AudioCodec, AudioLimits};
pub use bitstream::Bitstream;
pub use channel::CarrierImage;
pub use config::Config;
pub use error::{Result, StegoError};
pub use payload::{frame_payload, unframe_payload, FramedMessage, ParseMode, Payload, PayloadFramer};
pub use pipeline::{embed, extract, Stegaudio};
