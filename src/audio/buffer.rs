//! Audio buffer
//!
//! Integer PCM samples with the metadata the codec validates against.
//! Construction does not validate; [`crate::audio::AudioCodec`] rejects
//! unsupported shapes with a descriptive error instead.

/// Interleaved integer PCM audio with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    /// Interleaved samples ([L, R, L, R, ...] for stereo)
    samples: Vec<i32>,
    /// Number of audio channels (1 = mono, 2 = stereo)
    channels: u16,
    /// Sample width in bits
    bits_per_sample: u16,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from interleaved samples.
    ///
    /// 8-bit samples are signed (-128..=127), matching how `hound` yields them.
    pub fn new(samples: Vec<i32>, channels: u16, bits_per_sample: u16, sample_rate: u32) -> Self {
        Self {
            samples,
            channels,
            bits_per_sample,
            sample_rate,
        }
    }

    /// Create a mono 16-bit buffer, the shape produced by decoding
    pub fn mono16(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into_iter().map(i32::from).collect(),
            channels: 1,
            bits_per_sample: 16,
            sample_rate,
        }
    }

    /// Create a mono 16-bit sine wave test tone at the given amplitude (0.0..=1.0)
    pub fn sine_wave(frequency: f32, amplitude: f32, duration_secs: f32, sample_rate: u32) -> Self {
        let num_samples = (duration_secs * sample_rate as f32) as usize;
        let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;
        let peak = amplitude.clamp(0.0, 1.0) * i16::MAX as f32;

        let samples = (0..num_samples)
            .map(|i| ((angular_freq * i as f32).sin() * peak).round() as i16)
            .collect();

        Self::mono16(samples, sample_rate)
    }

    /// Get a reference to the interleaved samples
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Consume the buffer and return its samples
    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }

    /// Get the number of channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Get the sample width in bits
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Get samples for a specific channel (0-indexed)
    pub fn channel_samples(&self, channel: u16) -> Vec<i32> {
        if channel >= self.channels {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(channel as usize)
            .step_by(self.channels as usize)
            .copied()
            .collect()
    }
}
