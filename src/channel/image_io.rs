//! Carrier image I/O
//!
//! Cover images may come in any format the image crate decodes; they are
//! converted to 8-bit RGB. Stego images must be lossless, since any lossy
//! recompression scrambles the low bit planes. They are always written as
//! PNG, and lossy inputs are refused on extraction.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader};
use log::debug;

use crate::channel::pixel::CarrierImage;
use crate::error::{Result, StegoError};

/// Formats that preserve every bit of every component
const LOSSLESS_FORMATS: [ImageFormat; 2] = [ImageFormat::Png, ImageFormat::Bmp];

/// Load a cover image from disk and convert it to RGB
pub fn load_carrier(path: &Path) -> Result<CarrierImage> {
    let (image, _) = open(path)?;
    Ok(image)
}

/// Load a cover image from memory and convert it to RGB
pub fn load_carrier_from_bytes(bytes: &[u8]) -> Result<CarrierImage> {
    let (image, _) = decode_bytes(bytes)?;
    Ok(image)
}

/// Load a stego image from disk, refusing lossy formats
pub fn load_stego(path: &Path) -> Result<CarrierImage> {
    let (image, format) = open(path)?;
    ensure_lossless(format)?;
    Ok(image)
}

/// Load a stego image from memory, refusing lossy formats
pub fn load_stego_from_bytes(bytes: &[u8]) -> Result<CarrierImage> {
    let (image, format) = decode_bytes(bytes)?;
    ensure_lossless(format)?;
    Ok(image)
}

/// Save an image as PNG regardless of the path's extension
pub fn save_png(image: &CarrierImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| StegoError::ImageSave {
            reason: format!("Failed to save {}: {}", path.display(), e),
            source: Some(e),
        })?;
    debug!("Saved {}x{} PNG to {}", image.width(), image.height(), path.display());
    Ok(())
}

/// Encode an image as PNG bytes
pub fn png_bytes(image: &CarrierImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| StegoError::ImageSave {
            reason: format!("Failed to encode PNG: {}", e),
            source: Some(e),
        })?;
    Ok(bytes)
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn open(path: &Path) -> Result<(CarrierImage, Option<ImageFormat>)> {
    if !path.exists() {
        return Err(StegoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let image = reader.decode().map_err(|e| StegoError::ImageLoad {
        reason: format!("Failed to decode {}: {}", path.display(), e),
        source: Some(e),
    })?;

    Ok((image.to_rgb8(), format))
}

fn decode_bytes(bytes: &[u8]) -> Result<(CarrierImage, Option<ImageFormat>)> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format();
    let image = reader.decode().map_err(|e| StegoError::ImageLoad {
        reason: format!("Failed to decode image data: {}", e),
        source: Some(e),
    })?;

    Ok((image.to_rgb8(), format))
}

fn ensure_lossless(format: Option<ImageFormat>) -> Result<()> {
    match format {
        Some(format) if LOSSLESS_FORMATS.contains(&format) => Ok(()),
        Some(format) => Err(StegoError::UnsupportedImageFormat {
            format: format!("{:?}", format),
        }),
        None => Err(StegoError::UnsupportedImageFormat {
            format: "unknown".to_string(),
        }),
    }
}
