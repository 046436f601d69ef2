//! Pixel channel
//!
//! Hides bitstreams in the low bit planes of RGB images:
//! - Cyclic LSB read/write with capacity checks
//! - Carrier and stego image I/O
//! - Distortion metrics

pub mod image_io;
pub mod pixel;
pub mod quality;

pub use image_io::{
    load_carrier, load_carrier_from_bytes, load_stego, load_stego_from_bytes, png_bytes, save_png,
};
pub use pixel::{capacity, read, required_pixels, write, BitSlot, CarrierImage, BITS_PER_PIXEL};
pub use quality::{psnr, snr};
