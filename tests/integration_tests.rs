//! Integration Tests
//!
//! End-to-end tests for the Stegaudio embed and extract pipeline.

use image::{ImageFormat, Rgb, RgbImage};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use stegaudio::audio::{self, AudioBuffer};
use stegaudio::channel::{self, pixel};
use stegaudio::{
    encode_audio, frame_payload, Bitstream, Config, FramedMessage, Stegaudio, StegoError,
};

/// Helper to create a textured cover image
fn create_cover(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 + y) as u8, (x + y * 3) as u8, (x * y) as u8])
    })
}

// === Capacity Tests ===

#[test]
fn test_one_second_at_8khz_sizes() {
    let audio = AudioBuffer::sine_wave(440.0, 0.8, 1.0, 8000);
    let (bits, rate) = encode_audio(&audio).unwrap();
    assert_eq!(rate, 8000);
    assert_eq!(bits.len(), 128_000);

    let framed = frame_payload(1, 8000, bits).unwrap();
    assert_eq!(framed.len(), 128_112);
    assert_eq!(framed.header(), 128_080);
    assert_eq!(pixel::required_pixels(framed.len()), 42_704);
}

#[test]
fn test_exact_capacity_succeeds() {
    let pipeline = Stegaudio::default();
    let audio = AudioBuffer::sine_wave(440.0, 0.8, 1.0, 8000);

    // 157 * 272 = 42704 pixels = 128112 bits
    let hidden = pipeline.hide_audio(&create_cover(157, 272), &audio, 42).unwrap();
    assert_eq!(hidden.report.capacity_bits, hidden.report.message_bits);

    let revealed = pipeline.reveal_audio(&hidden.image).unwrap();
    assert_eq!(revealed.identifier, 42);
    assert_eq!(revealed.audio.num_frames(), 8000);
}

#[test]
fn test_one_pixel_short_fails() {
    let pipeline = Stegaudio::default();
    let audio = AudioBuffer::sine_wave(440.0, 0.8, 1.0, 8000);

    let result = pipeline.hide_audio(&create_cover(42_703, 1), &audio, 42);
    assert!(matches!(
        result,
        Err(StegoError::InsufficientCapacity {
            required: 128_112,
            available: 128_109,
        })
    ));
}

// === Error Propagation Tests ===

#[test]
fn test_empty_audio_rejected() {
    let pipeline = Stegaudio::default();
    let audio = AudioBuffer::mono16(Vec::new(), 8000);

    assert!(matches!(
        pipeline.hide_audio(&create_cover(8, 8), &audio, 1),
        Err(StegoError::EmptyAudio)
    ));
}

#[test]
fn test_unsupported_rate_rejected() {
    let pipeline = Stegaudio::default();
    let audio = AudioBuffer::mono16(vec![1, 2, 3], 4000);

    assert!(matches!(
        pipeline.hide_audio(&create_cover(8, 8), &audio, 1),
        Err(StegoError::InvalidAudioFormat { .. })
    ));
}

#[test]
fn test_blank_image_has_no_payload() {
    let pipeline = Stegaudio::default();
    let blank = RgbImage::new(20, 20);

    // A zero header declares an empty body, which cannot hold the fixed fields
    assert!(matches!(
        pipeline.reveal_audio(&blank),
        Err(StegoError::TruncatedFields { .. })
    ));
}

// === Length Check Tests ===

/// Framed message whose audio length field disagrees with its body
fn mismatched_message() -> FramedMessage {
    let mut bits = Bitstream::new();
    bits.push_uint(80 + 32, 32);
    bits.push_uint(5, 32);
    bits.push_uint(48, 32);
    bits.push_uint(8000, 16);
    bits.push_uint(0x1234, 16);
    bits.push_uint(0xF00D, 16);
    FramedMessage::from_bits(bits).unwrap()
}

#[test]
fn test_length_mismatch_strict() {
    let stego = stegaudio::embed(&create_cover(16, 16), &mismatched_message()).unwrap();

    assert!(matches!(
        Stegaudio::default().reveal_audio(&stego),
        Err(StegoError::LengthMismatch {
            declared: 48,
            actual: 32,
        })
    ));
}

#[test]
fn test_length_mismatch_lenient() {
    let stego = stegaudio::embed(&create_cover(16, 16), &mismatched_message()).unwrap();
    let pipeline = Stegaudio::new(Config {
        strict_length_check: false,
        ..Config::default()
    });

    let revealed = pipeline.reveal_audio(&stego).unwrap();
    assert_eq!(revealed.identifier, 5);
    assert_eq!(revealed.audio.num_frames(), 2);
    let discrepancy = revealed.length_discrepancy.unwrap();
    assert_eq!((discrepancy.declared, discrepancy.actual), (48, 32));
}

#[test]
fn test_odd_length_body_is_padded() {
    // 24 audio bits: one full sample plus half of a second
    let mut bits = Bitstream::new();
    bits.push_uint(80 + 24, 32);
    bits.push_uint(6, 32);
    bits.push_uint(24, 32);
    bits.push_uint(8000, 16);
    bits.push_uint(0xFFFF_80, 24);
    let stego =
        stegaudio::embed(&create_cover(16, 16), &FramedMessage::from_bits(bits).unwrap()).unwrap();

    let pipeline = Stegaudio::new(Config {
        strict_length_check: false,
        ..Config::default()
    });
    let revealed = pipeline.reveal_audio(&stego).unwrap();
    assert_eq!(revealed.identifier, 6);
    assert_eq!(revealed.audio_bits.len(), 24);
    assert_eq!(revealed.length_discrepancy, None);
    // 0xFFFF -> 32767, 0x8000 -> 16384
    assert_eq!(revealed.audio.samples(), &[32767, 16384]);
}

// === File Pipeline Tests ===

#[test]
fn test_file_round_trip() {
    let dir = tempdir().unwrap();
    let cover_path = dir.path().join("cover.png");
    let audio_path = dir.path().join("voice.wav");
    let stego_path = dir.path().join("stego.png");
    let out_path = dir.path().join("voice_out.wav");

    channel::save_png(&create_cover(120, 120), &cover_path).unwrap();
    let audio = AudioBuffer::new(
        (0..1600).map(|i| (i % 400) * 50 - 10_000).collect(),
        2,
        16,
        16_000,
    );
    audio::write_wav(&audio, &audio_path).unwrap();

    let pipeline = Stegaudio::default();
    let embedded = pipeline
        .embed_files(&cover_path, &audio_path, &stego_path, 0xDEAD_BEEF)
        .unwrap();
    assert_eq!(embedded.audio_frames, 800);
    assert!(embedded.psnr_db.unwrap() > 40.0);

    let extracted = pipeline.extract_files(&stego_path, &out_path).unwrap();
    assert_eq!(extracted.identifier, 0xDEAD_BEEF);
    assert_eq!(extracted.sample_rate, 16_000);
    assert_eq!(extracted.audio_frames, 800);
    assert_eq!(extracted.audio_sha256, embedded.audio_sha256);

    let recovered = audio::read_wav(&out_path).unwrap();
    assert_eq!(recovered.channels(), 1);
    assert_eq!(recovered.sample_rate(), 16_000);
    assert_eq!(recovered.num_frames(), 800);
}

#[test]
fn test_jpeg_stego_rejected() {
    let dir = tempdir().unwrap();
    let stego_path = dir.path().join("stego.jpg");
    create_cover(32, 32)
        .save_with_format(&stego_path, ImageFormat::Jpeg)
        .unwrap();

    let result = Stegaudio::default().extract_files(&stego_path, &dir.path().join("out.wav"));
    assert!(matches!(
        result,
        Err(StegoError::UnsupportedImageFormat { .. })
    ));
}

#[test]
fn test_missing_and_disallowed_inputs() {
    let dir = tempdir().unwrap();
    let pipeline = Stegaudio::default();
    let out = dir.path().join("out.png");

    let missing = pipeline.embed_files(
        &dir.path().join("nope.png"),
        &dir.path().join("nope.wav"),
        &out,
        1,
    );
    assert!(matches!(missing, Err(StegoError::FileNotFound { .. })));

    let text = dir.path().join("cover.txt");
    std::fs::write(&text, b"not an image").unwrap();
    let disallowed = pipeline.extract_files(&text, &dir.path().join("out.wav"));
    assert!(matches!(
        disallowed,
        Err(StegoError::UnsupportedExtension { .. })
    ));
}
