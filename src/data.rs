//! The data table: a flat array of 8-, 16- or 32-bit values referenced by the
//! index blocks, followed by the high value and the error value.

use crate::error::{Result, TrieError};
use crate::layout::{Endianness, ValueWidth};

/// An element type of the data table.
pub trait TrieValue: Copy + Eq + 'static {
    const WIDTH: ValueWidth;

    /// Narrow `value`, or `None` if it does not fit this width.
    fn from_u32(value: u32) -> Option<Self>;

    /// Decode one value from exactly `WIDTH.bytes_per_value()` bytes.
    fn read(bytes: &[u8], endian: Endianness) -> Self;

    fn write(self, endian: Endianness, out: &mut Vec<u8>);
}

impl TrieValue for u8 {
    const WIDTH: ValueWidth = ValueWidth::Bits8;

    #[inline]
    fn from_u32(value: u32) -> Option<Self> {
        u8::try_from(value).ok()
    }

    #[inline]
    fn read(bytes: &[u8], _endian: Endianness) -> Self {
        bytes[0]
    }

    #[inline]
    fn write(self, _endian: Endianness, out: &mut Vec<u8>) {
        out.push(self);
    }
}

impl TrieValue for u16 {
    const WIDTH: ValueWidth = ValueWidth::Bits16;

    #[inline]
    fn from_u32(value: u32) -> Option<Self> {
        u16::try_from(value).ok()
    }

    #[inline]
    fn read(bytes: &[u8], endian: Endianness) -> Self {
        endian.read_u16([bytes[0], bytes[1]])
    }

    #[inline]
    fn write(self, endian: Endianness, out: &mut Vec<u8>) {
        out.extend_from_slice(&endian.u16_bytes(self));
    }
}

impl TrieValue for u32 {
    const WIDTH: ValueWidth = ValueWidth::Bits32;

    #[inline]
    fn from_u32(value: u32) -> Option<Self> {
        Some(value)
    }

    #[inline]
    fn read(bytes: &[u8], endian: Endianness) -> Self {
        endian.read_u32([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[inline]
    fn write(self, endian: Endianness, out: &mut Vec<u8>) {
        out.extend_from_slice(&endian.u32_bytes(self));
    }
}

fn read_values<T: TrieValue>(bytes: &[u8], endian: Endianness) -> Box<[T]> {
    bytes
        .chunks_exact(T::WIDTH.bytes_per_value())
        .map(|chunk| T::read(chunk, endian))
        .collect()
}

fn write_values<T: TrieValue>(values: &[T], endian: Endianness, out: &mut Vec<u8>) {
    out.reserve(values.len() * T::WIDTH.bytes_per_value());
    for &v in values {
        v.write(endian, out);
    }
}

fn narrow<T: TrieValue>(values: &[u32]) -> Result<Box<[T]>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            T::from_u32(v).ok_or_else(|| {
                TrieError::structure(format!(
                    "data[{i}] = {v:#x} does not fit a {:?} data table",
                    T::WIDTH
                ))
            })
        })
        .collect()
}

/// Width-tagged, owned data table.
#[derive(Clone, PartialEq, Eq)]
pub enum TrieData {
    Bits16(Box<[u16]>),
    Bits32(Box<[u32]>),
    Bits8(Box<[u8]>),
}

impl TrieData {
    /// Build a table of the given width from widened values, rejecting any
    /// value that does not fit.
    pub fn from_values(width: ValueWidth, values: &[u32]) -> Result<Self> {
        Ok(match width {
            ValueWidth::Bits16 => Self::Bits16(narrow(values)?),
            ValueWidth::Bits32 => Self::Bits32(narrow(values)?),
            ValueWidth::Bits8 => Self::Bits8(narrow(values)?),
        })
    }

    pub fn value_width(&self) -> ValueWidth {
        match self {
            Self::Bits16(_) => ValueWidth::Bits16,
            Self::Bits32(_) => ValueWidth::Bits32,
            Self::Bits8(_) => ValueWidth::Bits8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bits16(d) => d.len(),
            Self::Bits32(d) => d.len(),
            Self::Bits8(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at data position `i`, widened to `u32`.
    ///
    /// `i` must be in bounds; the trie validates every reachable position
    /// when it is constructed.
    #[inline]
    pub fn get(&self, i: u32) -> u32 {
        let i = i as usize;
        match self {
            Self::Bits16(d) => d[i] as u32,
            Self::Bits32(d) => d[i],
            Self::Bits8(d) => d[i] as u32,
        }
    }

    /// Number of bytes the serialized table occupies.
    pub fn byte_len(&self) -> usize {
        self.len() * self.value_width().bytes_per_value()
    }

    /// Decode `bytes` (exactly `count * width` long) into an owned table.
    pub(crate) fn read(width: ValueWidth, bytes: &[u8], endian: Endianness) -> Self {
        match width {
            ValueWidth::Bits16 => Self::Bits16(read_values(bytes, endian)),
            ValueWidth::Bits32 => Self::Bits32(read_values(bytes, endian)),
            ValueWidth::Bits8 => Self::Bits8(read_values(bytes, endian)),
        }
    }

    /// Append the serialized table to `out`; returns the number of bytes written.
    pub(crate) fn write(&self, endian: Endianness, out: &mut Vec<u8>) -> usize {
        let before = out.len();
        match self {
            Self::Bits16(d) => write_values(d, endian, out),
            Self::Bits32(d) => write_values(d, endian, out),
            Self::Bits8(d) => write_values(d, endian, out),
        }
        out.len() - before
    }
}

impl From<Vec<u16>> for TrieData {
    fn from(v: Vec<u16>) -> Self {
        Self::Bits16(v.into_boxed_slice())
    }
}

impl From<Vec<u32>> for TrieData {
    fn from(v: Vec<u32>) -> Self {
        Self::Bits32(v.into_boxed_slice())
    }
}

impl From<Vec<u8>> for TrieData {
    fn from(v: Vec<u8>) -> Self {
        Self::Bits8(v.into_boxed_slice())
    }
}

impl std::fmt::Debug for TrieData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrieData")
            .field("width", &self.value_width())
            .field("len", &self.len())
            .finish()
    }
}
