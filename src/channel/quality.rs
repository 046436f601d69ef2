//! Distortion metrics between a cover image and its stego counterpart
//!
//! Both metrics are computed per color channel and averaged over R, G and B.
//! Identical channels give infinite PSNR/SNR.

use crate::channel::pixel::CarrierImage;
use crate::error::{Result, StegoError};

const PIXEL_MAX: f64 = 255.0;
const CHANNELS: usize = 3;

/// Peak signal-to-noise ratio in dB
pub fn psnr(cover: &CarrierImage, stego: &CarrierImage) -> Result<f64> {
    let stats = channel_stats(cover, stego)?;
    let total: f64 = stats
        .iter()
        .map(|s| {
            if s.mse == 0.0 {
                f64::INFINITY
            } else {
                20.0 * (PIXEL_MAX / s.mse.sqrt()).log10()
            }
        })
        .sum();
    Ok(total / CHANNELS as f64)
}

/// Signal-to-noise ratio in dB
pub fn snr(cover: &CarrierImage, stego: &CarrierImage) -> Result<f64> {
    let stats = channel_stats(cover, stego)?;
    let total: f64 = stats
        .iter()
        .map(|s| {
            if s.mse == 0.0 {
                f64::INFINITY
            } else {
                10.0 * (s.signal_power / s.mse).log10()
            }
        })
        .sum();
    Ok(total / CHANNELS as f64)
}

#[derive(Debug, Default, Clone, Copy)]
struct ChannelStats {
    mse: f64,
    signal_power: f64,
}

fn channel_stats(cover: &CarrierImage, stego: &CarrierImage) -> Result<[ChannelStats; CHANNELS]> {
    if cover.dimensions() != stego.dimensions() {
        return Err(StegoError::DimensionMismatch {
            expected: cover.dimensions(),
            actual: stego.dimensions(),
        });
    }

    let mut stats = [ChannelStats::default(); CHANNELS];
    let pixels = cover.width() as f64 * cover.height() as f64;
    if pixels == 0.0 {
        return Ok(stats);
    }

    for (a, b) in cover.pixels().zip(stego.pixels()) {
        for (channel, stat) in stats.iter_mut().enumerate() {
            let original = f64::from(a.0[channel]);
            let diff = original - f64::from(b.0[channel]);
            stat.mse += diff * diff;
            stat.signal_power += original * original;
        }
    }

    for stat in &mut stats {
        stat.mse /= pixels;
        stat.signal_power /= pixels;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_identical_images_are_infinite() {
        let image = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));
        assert!(psnr(&image, &image).unwrap().is_infinite());
        assert!(snr(&image, &image).unwrap().is_infinite());
    }

    #[test]
    fn test_known_values() {
        let cover = RgbImage::from_pixel(2, 2, Rgb([100, 100, 100]));
        let stego = RgbImage::from_pixel(2, 2, Rgb([101, 101, 101]));

        // mse = 1 in every channel
        assert_relative_eq!(psnr(&cover, &stego).unwrap(), 20.0 * 255f64.log10(), epsilon = 1e-9);
        assert_relative_eq!(snr(&cover, &stego).unwrap(), 10.0 * 10000f64.log10(), epsilon = 1e-9);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = RgbImage::new(2, 2);
        let b = RgbImage::new(3, 2);
        assert!(matches!(
            psnr(&a, &b),
            Err(StegoError::DimensionMismatch { .. })
        ));
    }
}
