//! Payload framing
//!
//! Builds and parses the self-describing message hidden in the image:
//!
//! ```text
//! [ overall_length_header : 32 bits ]   bit count of everything below
//! [ identifier            : 32 bits ]
//! [ audio_bit_length      : 32 bits ]
//! [ sample_rate           : 16 bits ]
//! [ audio_bits            : audio_bit_length bits ]
//! ```
//!
//! All fields are big-endian (most significant bit first).

use log::warn;
use serde::Serialize;

use crate::bitstream::Bitstream;
use crate::error::{Result, StegoError};

/// Width of the overall length header
pub const HEADER_BITS: usize = 32;
/// Width of the identifier field
pub const IDENTIFIER_BITS: usize = 32;
/// Width of the declared audio length field
pub const AUDIO_LENGTH_BITS: usize = 32;
/// Width of the sample rate field
pub const SAMPLE_RATE_BITS: usize = 16;
/// Bits taken by the fixed fields that follow the header
pub const FIXED_FIELDS_BITS: usize = IDENTIFIER_BITS + AUDIO_LENGTH_BITS + SAMPLE_RATE_BITS;

const MAX_BODY_BITS: u64 = u32::MAX as u64;

/// How a disagreement between the declared and the actual audio length is
/// handled when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Fail with `LengthMismatch`
    #[default]
    Strict,
    /// Return the audio bits as found and report the discrepancy
    Lenient,
}

/// Declared vs actual audio length found while parsing leniently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthDiscrepancy {
    pub declared: usize,
    pub actual: usize,
}

/// The decoded fields of a framed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    identifier: u32,
    audio_bit_length: u32,
    sample_rate: u16,
    audio_bits: Bitstream,
}

impl Payload {
    /// Create a payload whose declared length matches its audio bits
    pub fn new(identifier: u32, sample_rate: u16, audio_bits: Bitstream) -> Result<Self> {
        let audio_bit_length = u32::try_from(audio_bits.len())
            .ok()
            .filter(|&len| u64::from(len) + FIXED_FIELDS_BITS as u64 <= MAX_BODY_BITS)
            .ok_or(StegoError::PayloadTooLarge {
                bits: audio_bits.len() as u64 + FIXED_FIELDS_BITS as u64,
                max: MAX_BODY_BITS,
            })?;

        Ok(Self {
            identifier,
            audio_bit_length,
            sample_rate,
            audio_bits,
        })
    }

    pub fn identifier(&self) -> u32 {
        self.identifier
    }

    /// Audio length as declared in the header fields
    pub fn audio_bit_length(&self) -> u32 {
        self.audio_bit_length
    }

    pub fn sample_rate(&self) -> u16 {
        self.sample_rate
    }

    pub fn audio_bits(&self) -> &Bitstream {
        &self.audio_bits
    }

    pub fn into_audio_bits(self) -> Bitstream {
        self.audio_bits
    }

    /// Difference between declared and carried audio length, if any.
    ///
    /// Only a leniently parsed payload can have one.
    pub fn length_discrepancy(&self) -> Option<LengthDiscrepancy> {
        let declared = self.audio_bit_length as usize;
        let actual = self.audio_bits.len();
        (declared != actual).then_some(LengthDiscrepancy { declared, actual })
    }

    /// Serialize into a framed message
    pub fn to_framed(&self) -> FramedMessage {
        let body_len = FIXED_FIELDS_BITS + self.audio_bits.len();
        let mut bits = Bitstream::with_capacity(HEADER_BITS + body_len);

        bits.push_uint(body_len as u64, HEADER_BITS);
        bits.push_uint(u64::from(self.identifier), IDENTIFIER_BITS);
        bits.push_uint(u64::from(self.audio_bit_length), AUDIO_LENGTH_BITS);
        bits.push_uint(u64::from(self.sample_rate), SAMPLE_RATE_BITS);
        bits.extend_from(&self.audio_bits);

        FramedMessage {
            header: body_len as u32,
            bits,
        }
    }
}

/// Length-prefixed message ready to be written into an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedMessage {
    header: u32,
    bits: Bitstream,
}

impl FramedMessage {
    /// Wrap raw bits read from an image.
    ///
    /// The bits must start with a complete header and carry exactly the
    /// number of bits it declares. Nothing past the header is checked: a
    /// header below the fixed-field size or an audio length field that
    /// disagrees with the body is only rejected by [`PayloadFramer::parse`].
    pub fn from_bits(bits: Bitstream) -> Result<Self> {
        let header = read_header(&bits)?;
        let available = bits.len() - HEADER_BITS;
        if available != header as usize {
            return Err(StegoError::TruncatedPayload {
                expected: header as usize,
                actual: available,
            });
        }
        Ok(Self { header, bits })
    }

    /// Value of the overall length header (bits following it)
    pub fn header(&self) -> u32 {
        self.header
    }

    /// Total length in bits, header included
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &Bitstream {
        &self.bits
    }

    pub fn into_bits(self) -> Bitstream {
        self.bits
    }
}

/// Builds and parses framed messages
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadFramer {
    mode: ParseMode,
}

impl PayloadFramer {
    pub fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Frame an identifier, sample rate and audio bits
    ///
    /// # Errors
    /// * `PayloadTooLarge` - the body length does not fit the 32-bit header
    pub fn build(
        &self,
        identifier: u32,
        sample_rate: u16,
        audio_bits: Bitstream,
    ) -> Result<FramedMessage> {
        Ok(Payload::new(identifier, sample_rate, audio_bits)?.to_framed())
    }

    /// Parse a framed bitstream back into its fields.
    ///
    /// Bits beyond the declared length are ignored.
    ///
    /// # Errors
    /// * `TruncatedHeader` - fewer than 32 bits
    /// * `TruncatedPayload` - fewer bits than the header declares
    /// * `TruncatedFields` - the declared body cannot hold the fixed fields
    /// * `LengthMismatch` - declared audio length disagrees with the body (strict mode)
    pub fn parse(&self, bits: &Bitstream) -> Result<Payload> {
        let body_len = read_header(bits)? as usize;

        let available = bits.len() - HEADER_BITS;
        if available < body_len {
            return Err(StegoError::TruncatedPayload {
                expected: body_len,
                actual: available,
            });
        }

        if body_len < FIXED_FIELDS_BITS {
            return Err(StegoError::TruncatedFields {
                expected: FIXED_FIELDS_BITS,
                actual: body_len,
            });
        }

        let mut offset = HEADER_BITS;
        let mut field = |width: usize| {
            let value = bits.read_uint(offset, width).unwrap_or_default();
            offset += width;
            value
        };
        let identifier = field(IDENTIFIER_BITS) as u32;
        let audio_bit_length = field(AUDIO_LENGTH_BITS) as u32;
        let sample_rate = field(SAMPLE_RATE_BITS) as u16;

        let body_end = HEADER_BITS + body_len;
        let audio_bits = bits.slice(HEADER_BITS + FIXED_FIELDS_BITS..body_end);

        let payload = Payload {
            identifier,
            audio_bit_length,
            sample_rate,
            audio_bits,
        };

        if let Some(discrepancy) = payload.length_discrepancy() {
            match self.mode {
                ParseMode::Strict => {
                    return Err(StegoError::LengthMismatch {
                        declared: discrepancy.declared,
                        actual: discrepancy.actual,
                    });
                }
                ParseMode::Lenient => warn!(
                    "Extracted audio length ({}) does not match embedded length ({}), data may be truncated",
                    discrepancy.actual, discrepancy.declared
                ),
            }
        }

        Ok(payload)
    }
}

/// Frame a payload
pub fn frame_payload(identifier: u32, sample_rate: u16, bits: Bitstream) -> Result<FramedMessage> {
    PayloadFramer::default().build(identifier, sample_rate, bits)
}

/// Parse a framed bitstream in strict mode
pub fn unframe_payload(bits: &Bitstream) -> Result<Payload> {
    PayloadFramer::default().parse(bits)
}

/// Read the 32-bit overall length header
pub(crate) fn read_header(bits: &Bitstream) -> Result<u32> {
    bits.read_uint(0, HEADER_BITS)
        .map(|value| value as u32)
        .ok_or(StegoError::TruncatedHeader {
            expected: HEADER_BITS,
            actual: bits.len(),
        })
}
