//! Cyclic LSB pixel channel
//!
//! Bit `i` of a message lands in pixel component `i`, walking the image in
//! row-major order with channels (R, G, B) minor. The bit plane cycles with
//! period three, so R components carry data in bit 0, G in bit 1 and B in
//! bit 2. Every other bit of every component is left as it was.

use image::RgbImage;
use log::debug;

use crate::bitstream::Bitstream;
use crate::error::{Result, StegoError};

/// Carrier image type: 8-bit RGB
pub type CarrierImage = RgbImage;

/// Data bits carried by each pixel
pub const BITS_PER_PIXEL: usize = 3;

/// Bits that may differ between a cover component and its stego counterpart
pub const LSB_TIER_MASK: u8 = 0b0000_0111;

/// Location of one message bit inside the carrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSlot {
    /// Pixel number in row-major order
    pub pixel_index: usize,
    /// 0 = R, 1 = G, 2 = B
    pub channel_index: usize,
    /// Bit position inside the component (0 = least significant)
    pub bit_plane: u8,
}

impl BitSlot {
    /// Map a message bit index onto its slot
    #[inline]
    pub fn unpack(bit_index: usize) -> Self {
        Self {
            pixel_index: bit_index / BITS_PER_PIXEL,
            channel_index: bit_index % BITS_PER_PIXEL,
            bit_plane: (bit_index % BITS_PER_PIXEL) as u8,
        }
    }

    /// Index into the flat component buffer
    #[inline]
    pub fn component_index(&self) -> usize {
        self.pixel_index * BITS_PER_PIXEL + self.channel_index
    }

    #[inline]
    pub fn mask(&self) -> u8 {
        1 << self.bit_plane
    }

    /// Replace this slot's bit in `component`
    #[inline]
    pub fn store(&self, component: u8, bit: bool) -> u8 {
        (component & !self.mask()) | (u8::from(bit) << self.bit_plane)
    }

    /// Read this slot's bit from `component`
    #[inline]
    pub fn load(&self, component: u8) -> bool {
        (component >> self.bit_plane) & 1 == 1
    }
}

/// Number of message bits the image can hold
pub fn capacity(image: &CarrierImage) -> usize {
    let (width, height) = image.dimensions();
    width as usize * height as usize * BITS_PER_PIXEL
}

/// Minimum number of pixels needed to carry `bits` message bits
pub fn required_pixels(bits: usize) -> usize {
    bits.div_ceil(BITS_PER_PIXEL)
}

/// Write `message` into a copy of `image`.
///
/// The input image is never modified.
///
/// # Errors
/// * `InsufficientCapacity` - the message is longer than [`capacity`]
pub fn write(image: &CarrierImage, message: &Bitstream) -> Result<CarrierImage> {
    let available = capacity(image);
    if message.len() > available {
        return Err(StegoError::InsufficientCapacity {
            required: message.len(),
            available,
        });
    }

    let mut stego = image.clone();
    let components: &mut [u8] = &mut stego;

    for (i, bit) in message.iter().enumerate() {
        let slot = BitSlot::unpack(i);
        let component = &mut components[slot.component_index()];
        *component = slot.store(*component, bit);
    }

    debug!(
        "Wrote {} bits into {}x{} carrier ({} available)",
        message.len(),
        image.width(),
        image.height(),
        available
    );

    Ok(stego)
}

/// Read message bits back out of `image`.
///
/// With a `limit`, stops after that many bits; otherwise reads the full
/// capacity. Requests past the end are truncated to what is available.
pub fn read(image: &CarrierImage, limit: Option<usize>) -> Bitstream {
    let available = capacity(image);
    let count = limit.map_or(available, |limit| limit.min(available));
    let components: &[u8] = image;

    (0..count)
        .map(|i| {
            let slot = BitSlot::unpack(i);
            slot.load(components[slot.component_index()])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use test_case::test_case;

    fn create_test_image(width: u32, height: u32) -> CarrierImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 17) % 256) as u8,
                ((y * 23) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
            ])
        })
    }

    fn message(len: usize) -> Bitstream {
        (0..len).map(|i| (i * 7 + i / 5) % 3 == 0).collect()
    }

    #[test_case(0, 0, 0, 0 ; "first bit is R plane 0")]
    #[test_case(1, 0, 1, 1 ; "second bit is G plane 1")]
    #[test_case(2, 0, 2, 2 ; "third bit is B plane 2")]
    #[test_case(3, 1, 0, 0 ; "fourth bit wraps to next pixel")]
    #[test_case(3001, 1000, 1, 1 ; "far index")]
    fn test_unpack(i: usize, pixel: usize, channel: usize, plane: u8) {
        let slot = BitSlot::unpack(i);
        assert_eq!(slot.pixel_index, pixel);
        assert_eq!(slot.channel_index, channel);
        assert_eq!(slot.bit_plane, plane);
        assert_eq!(slot.component_index(), i);
    }

    #[test]
    fn test_store_and_load() {
        let slot = BitSlot::unpack(2);
        assert_eq!(slot.store(0b1111_1111, false), 0b1111_1011);
        assert_eq!(slot.store(0b0000_0000, true), 0b0000_0100);
        assert!(slot.load(0b0000_0100));
        assert!(!slot.load(0b1111_1011));
    }

    #[test]
    fn test_capacity() {
        assert_eq!(capacity(&create_test_image(100, 100)), 30000);
        assert_eq!(capacity(&create_test_image(0, 10)), 0);
        assert_eq!(required_pixels(128112), 42704);
        assert_eq!(required_pixels(4), 2);
    }

    #[test]
    fn test_round_trip() {
        let image = create_test_image(20, 10);
        let bits = message(500);

        let stego = write(&image, &bits).unwrap();
        assert_eq!(read(&stego, Some(bits.len())), bits);
    }

    #[test]
    fn test_exact_capacity_fits() {
        let image = create_test_image(7, 3);
        let bits = message(capacity(&image));

        let stego = write(&image, &bits).unwrap();
        assert_eq!(read(&stego, None), bits);
    }

    #[test]
    fn test_one_bit_over_capacity_fails() {
        let image = create_test_image(7, 3);
        let bits = message(capacity(&image) + 1);

        assert!(matches!(
            write(&image, &bits),
            Err(StegoError::InsufficientCapacity {
                required: 64,
                available: 63
            })
        ));
    }

    #[test]
    fn test_only_low_three_bits_change() {
        let image = create_test_image(16, 16);
        let bits: Bitstream = (0..capacity(&image)).map(|i| i % 2 == 0).collect();
        let stego = write(&image, &bits).unwrap();

        assert_eq!(stego.dimensions(), image.dimensions());
        for (i, (before, after)) in image.iter().zip(stego.iter()).enumerate() {
            assert_eq!(before & !LSB_TIER_MASK, after & !LSB_TIER_MASK);
            let untouched = LSB_TIER_MASK & !BitSlot::unpack(i).mask();
            assert_eq!(before & untouched, after & untouched);
        }
    }

    #[test]
    fn test_write_leaves_input_and_tail_untouched() {
        let image = create_test_image(10, 10);
        let pristine = image.clone();
        let stego = write(&image, &message(30)).unwrap();

        assert_eq!(image, pristine);
        assert_eq!(&stego.as_raw()[30..], &image.as_raw()[30..]);
    }

    #[test]
    fn test_read_truncates_to_capacity() {
        let image = create_test_image(2, 2);
        assert_eq!(read(&image, Some(1000)).len(), 12);
        assert_eq!(read(&image, Some(5)).len(), 5);
        assert_eq!(read(&image, None).len(), 12);
    }
}
