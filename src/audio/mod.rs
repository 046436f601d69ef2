//! Audio buffer, codec and WAV I/O
//!
//! The codec converts PCM audio into the bitstream that gets framed and
//! hidden; the I/O helpers sit at the boundary and only move samples in
//! and out of WAV files.

mod buffer;
pub mod codec;
pub mod io;

pub use buffer::AudioBuffer;
pub use codec::{
    decode_audio, encode_audio, AudioCodec, AudioLimits, MAX_AUDIO_DURATION_SECS,
    MAX_FRAME_RATE, MIN_FRAME_RATE, SAMPLE_BITS,
};
pub use io::{read_wav, read_wav_from, wav_bytes, write_wav};
