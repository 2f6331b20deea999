//! Binary layout of a serialized trie: shift/length constants, the two type
//! tags, and the fixed 16-byte header.
//!
//! ```text
//! offset  width  field
//! 0       u32    signature "Tri3" (0x54726933) in the trie's byte order
//! 4       u16    options
//!                  15..12  data length bits 19..16
//!                  11..8   data null offset bits 19..16
//!                  7..6    trie type (0 = fast, 1 = small)
//!                  5..3    reserved, must be 0
//!                  2..0    value width (0 = 16-bit, 1 = 32-bit, 2 = 8-bit)
//! 6       u16    index length (number of u16 entries)
//! 8       u16    data length bits 15..0
//! 10      u16    index-3 null offset (0x7fff = none)
//! 12      u16    data null offset bits 15..0 (0xfffff = none)
//! 14      u16    high start >> 9
//! 16      ...    index[index length], then data[data length]
//! ```

use crate::error::{Result, TrieError};

// =============================================================================
// Code point limits
// =============================================================================

pub const MAX_UNICODE: u32 = 0x10ffff;
pub const CODE_POINT_LIMIT: u32 = 0x110000;
pub const ASCII_LIMIT: u32 = 0x80;

// =============================================================================
// Fast (single-stage) index
// =============================================================================

/// Shift for the fast index: each entry covers 64 code points.
pub const FAST_SHIFT: u32 = 6;
pub const FAST_DATA_BLOCK_LENGTH: u32 = 1 << FAST_SHIFT;
pub const FAST_DATA_MASK: u32 = FAST_DATA_BLOCK_LENGTH - 1;

pub const BMP_LIMIT: u32 = 0x10000;
pub const BMP_INDEX_LENGTH: u32 = BMP_LIMIT >> FAST_SHIFT;

pub const SMALL_MAX: u32 = 0xfff;
pub const SMALL_LIMIT: u32 = SMALL_MAX + 1;
pub const SMALL_INDEX_LENGTH: u32 = SMALL_LIMIT >> FAST_SHIFT;

// =============================================================================
// Multi-stage index
// =============================================================================

pub const SHIFT_3: u32 = 4;
pub const SHIFT_2: u32 = 5 + SHIFT_3;
pub const SHIFT_1: u32 = 5 + SHIFT_2;
pub const SHIFT_2_3: u32 = SHIFT_2 - SHIFT_3;
pub const SHIFT_1_2: u32 = SHIFT_1 - SHIFT_2;

/// Index-1 entries covering the BMP, which the fast variant does not store.
pub const OMITTED_BMP_INDEX_1_LENGTH: u32 = BMP_LIMIT >> SHIFT_1;

pub const INDEX_2_BLOCK_LENGTH: u32 = 1 << SHIFT_1_2;
pub const INDEX_2_MASK: u32 = INDEX_2_BLOCK_LENGTH - 1;
pub const CP_PER_INDEX_2_ENTRY: u32 = 1 << SHIFT_2;

pub const INDEX_3_BLOCK_LENGTH: u32 = 1 << SHIFT_2_3;
pub const INDEX_3_MASK: u32 = INDEX_3_BLOCK_LENGTH - 1;

/// Length of an index-3 block stored with 18-bit entries (4 groups of 9).
pub const INDEX_3_BLOCK_LENGTH_18: u32 = INDEX_3_BLOCK_LENGTH + INDEX_3_BLOCK_LENGTH / 8;

pub const SMALL_DATA_BLOCK_LENGTH: u32 = 1 << SHIFT_3;
pub const SMALL_DATA_MASK: u32 = SMALL_DATA_BLOCK_LENGTH - 1;

// =============================================================================
// Data table tail and sentinels
// =============================================================================

/// `data[len - 1]` holds the error value.
pub const ERROR_VALUE_NEG_DATA_OFFSET: u32 = 1;
/// `data[len - 2]` holds the value for `[high_start, MAX_UNICODE]`.
pub const HIGH_VALUE_NEG_DATA_OFFSET: u32 = 2;

pub const NO_INDEX3_NULL_OFFSET: u32 = 0x7fff;
pub const NO_DATA_NULL_OFFSET: u32 = 0xfffff;

pub const MAX_INDEX_LENGTH: usize = 0xffff;
pub const MAX_DATA_LENGTH: usize = 0xfffff;

// =============================================================================
// Header
// =============================================================================

pub const SIGNATURE: u32 = 0x5472_6933; // "Tri3"
pub const SIGNATURE_SWAPPED: u32 = 0x3369_7254;
pub const HEADER_LENGTH: usize = 16;

const OPTIONS_DATA_LENGTH_MASK: u16 = 0xf000;
const OPTIONS_DATA_NULL_OFFSET_MASK: u16 = 0x0f00;
const OPTIONS_TYPE_SHIFT: u16 = 6;
const OPTIONS_RESERVED_MASK: u16 = 0x38;
const OPTIONS_VALUE_BITS_MASK: u16 = 7;

/// Selects the trade-off between lookup speed and index size.
///
/// `Fast` covers the whole BMP with the single-stage index; `Small` only
/// covers `U+0000..=U+0FFF` that way and sends everything else through the
/// multi-stage index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum TrieType {
    Fast,
    Small,
}

impl TrieType {
    pub(crate) fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Fast),
            1 => Some(Self::Small),
            _ => None,
        }
    }

    pub(crate) fn bits(self) -> u16 {
        match self {
            Self::Fast => 0,
            Self::Small => 1,
        }
    }

    /// First code point handled by the multi-stage index.
    #[inline]
    pub fn fast_limit(self) -> u32 {
        match self {
            Self::Fast => BMP_LIMIT,
            Self::Small => SMALL_LIMIT,
        }
    }

    /// Number of single-stage index entries at the start of the index table.
    #[inline]
    pub fn fast_index_length(self) -> u32 {
        match self {
            Self::Fast => BMP_INDEX_LENGTH,
            Self::Small => SMALL_INDEX_LENGTH,
        }
    }

    /// Offset to add to `c >> SHIFT_1` to find the index-1 entry for `c`.
    #[inline]
    pub(crate) fn index_1_base(self) -> u32 {
        match self {
            Self::Fast => BMP_INDEX_LENGTH - OMITTED_BMP_INDEX_1_LENGTH,
            Self::Small => SMALL_INDEX_LENGTH,
        }
    }
}

/// Width of each element of the data table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum ValueWidth {
    Bits16,
    Bits32,
    Bits8,
}

impl ValueWidth {
    pub(crate) fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Bits16),
            1 => Some(Self::Bits32),
            2 => Some(Self::Bits8),
            _ => None,
        }
    }

    pub(crate) fn bits(self) -> u16 {
        match self {
            Self::Bits16 => 0,
            Self::Bits32 => 1,
            Self::Bits8 => 2,
        }
    }

    #[inline]
    pub fn bytes_per_value(self) -> usize {
        match self {
            Self::Bits8 => 1,
            Self::Bits16 => 2,
            Self::Bits32 => 4,
        }
    }

    /// Largest value representable at this width.
    #[inline]
    pub fn max_value(self) -> u32 {
        match self {
            Self::Bits8 => u8::MAX as u32,
            Self::Bits16 => u16::MAX as u32,
            Self::Bits32 => u32::MAX,
        }
    }
}

/// Byte order of a serialized trie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endianness = Endianness::Big;
    #[cfg(target_endian = "little")]
    pub const NATIVE: Endianness = Endianness::Little;

    pub fn swapped(self) -> Self {
        match self {
            Self::Big => Self::Little,
            Self::Little => Self::Big,
        }
    }

    #[inline]
    pub(crate) fn read_u16(self, b: [u8; 2]) -> u16 {
        match self {
            Self::Big => u16::from_be_bytes(b),
            Self::Little => u16::from_le_bytes(b),
        }
    }

    #[inline]
    pub(crate) fn read_u32(self, b: [u8; 4]) -> u32 {
        match self {
            Self::Big => u32::from_be_bytes(b),
            Self::Little => u32::from_le_bytes(b),
        }
    }

    #[inline]
    pub(crate) fn u16_bytes(self, v: u16) -> [u8; 2] {
        match self {
            Self::Big => v.to_be_bytes(),
            Self::Little => v.to_le_bytes(),
        }
    }

    #[inline]
    pub(crate) fn u32_bytes(self, v: u32) -> [u8; 4] {
        match self {
            Self::Big => v.to_be_bytes(),
            Self::Little => v.to_le_bytes(),
        }
    }
}

/// Decoded form of the 16-byte header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub trie_type: TrieType,
    pub value_width: ValueWidth,
    pub index_length: u16,
    /// Full 20-bit data length.
    pub data_length: u32,
    pub index3_null_offset: u16,
    /// Full 20-bit data null offset.
    pub data_null_offset: u32,
    pub shifted_high_start: u16,
}

impl Header {
    #[inline]
    pub fn high_start(&self) -> u32 {
        (self.shifted_high_start as u32) << SHIFT_2
    }

    /// Number of bytes the index and data tables occupy after the header.
    pub fn body_length(&self) -> usize {
        self.index_length as usize * 2
            + self.data_length as usize * self.value_width.bytes_per_value()
    }

    pub fn options(&self) -> u16 {
        (((self.data_length & 0xf0000) >> 4) as u16)
            | (((self.data_null_offset & 0xf0000) >> 8) as u16)
            | (self.trie_type.bits() << OPTIONS_TYPE_SHIFT)
            | self.value_width.bits()
    }

    /// Parse the header at the start of `bytes`.
    ///
    /// The signature is read big-endian; a byte-swapped signature means the
    /// rest of the buffer is little-endian. Returns the header and the byte
    /// order the remaining fields (and tables) use.
    pub fn parse(bytes: &[u8]) -> Result<(Self, Endianness)> {
        if bytes.len() < HEADER_LENGTH {
            return Err(TrieError::BufferTooShort {
                what: "trie header",
                needed: HEADER_LENGTH,
                available: bytes.len(),
            });
        }
        let raw_sig = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let endian = match raw_sig {
            SIGNATURE => Endianness::Big,
            SIGNATURE_SWAPPED => {
                tracing::trace!("byte-swapped trie signature, reading little-endian");
                Endianness::Little
            }
            other => return Err(TrieError::BadSignature(other)),
        };

        let field = |i: usize| endian.read_u16([bytes[i], bytes[i + 1]]);
        let options = field(4);
        let index_length = field(6);
        let data_length_low = field(8);
        let index3_null_offset = field(10);
        let data_null_offset_low = field(12);
        let shifted_high_start = field(14);

        let type_bits = ((options >> OPTIONS_TYPE_SHIFT) & 3) as u8;
        let trie_type =
            TrieType::from_bits(type_bits).ok_or(TrieError::UnsupportedType(type_bits))?;
        let width_bits = (options & OPTIONS_VALUE_BITS_MASK) as u8;
        let value_width = ValueWidth::from_bits(width_bits)
            .ok_or(TrieError::UnsupportedValueWidth(width_bits))?;
        if options & OPTIONS_RESERVED_MASK != 0 {
            return Err(TrieError::ReservedOptions(options));
        }

        let data_length =
            data_length_low as u32 | (((options & OPTIONS_DATA_LENGTH_MASK) as u32) << 4);
        let data_null_offset = data_null_offset_low as u32
            | (((options & OPTIONS_DATA_NULL_OFFSET_MASK) as u32) << 8);

        Ok((
            Self {
                trie_type,
                value_width,
                index_length,
                data_length,
                index3_null_offset,
                data_null_offset,
                shifted_high_start,
            },
            endian,
        ))
    }

    pub fn to_bytes(&self, endian: Endianness) -> [u8; HEADER_LENGTH] {
        let mut out = [0u8; HEADER_LENGTH];
        out[0..4].copy_from_slice(&endian.u32_bytes(SIGNATURE));
        let fields = [
            self.options(),
            self.index_length,
            self.data_length as u16,
            self.index3_null_offset,
            self.data_null_offset as u16,
            self.shifted_high_start,
        ];
        for (i, v) in fields.into_iter().enumerate() {
            let at = 4 + i * 2;
            out[at..at + 2].copy_from_slice(&endian.u16_bytes(v));
        }
        out
    }
}
