//! Serialization to and from the "Tri3" binary format.
//!
//! See [`crate::layout`] for the header layout. Deserialization copies the
//! index and data tables out of the input, so the buffer can be dropped or
//! reused afterwards.

use std::io::Write;

use crate::data::TrieData;
use crate::error::{Result, TrieError};
use crate::layout::*;
use crate::trie::CodePointTrie;

/// Requirements a serialized trie must meet to be loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Reject tries of any other type.
    pub expected_type: Option<TrieType>,
    /// Reject tries of any other value width.
    pub expected_width: Option<ValueWidth>,
}

impl LoadOptions {
    pub fn new(expected_type: Option<TrieType>, expected_width: Option<ValueWidth>) -> Self {
        Self {
            expected_type,
            expected_width,
        }
    }
}

fn log_rejected(err: TrieError) -> TrieError {
    tracing::debug!(error = %err, "rejected serialized trie");
    err
}

impl CodePointTrie {
    /// Load a trie from the start of `bytes`, optionally requiring a type and
    /// value width. Trailing bytes are ignored; [`binary_len`](Self::binary_len)
    /// on the result tells how many were consumed.
    pub fn from_binary(
        expected_type: Option<TrieType>,
        expected_width: Option<ValueWidth>,
        bytes: &[u8],
    ) -> Result<Self> {
        Self::from_binary_with(LoadOptions::new(expected_type, expected_width), bytes)
    }

    pub fn from_binary_with(options: LoadOptions, bytes: &[u8]) -> Result<Self> {
        let (header, endian) = Header::parse(bytes).map_err(log_rejected)?;

        let type_ok = options.expected_type.map_or(true, |t| t == header.trie_type);
        let width_ok = options
            .expected_width
            .map_or(true, |w| w == header.value_width);
        if !type_ok || !width_ok {
            return Err(log_rejected(TrieError::TypeMismatch {
                expected_type: options.expected_type,
                actual_type: header.trie_type,
                expected_width: options.expected_width,
                actual_width: header.value_width,
            }));
        }

        let body = &bytes[HEADER_LENGTH..];
        let needed = header.body_length();
        if body.len() < needed {
            return Err(log_rejected(TrieError::BufferTooShort {
                what: "trie index and data",
                needed,
                available: body.len(),
            }));
        }

        let (index_bytes, rest) = body.split_at(header.index_length as usize * 2);
        let index: Box<[u16]> = index_bytes
            .chunks_exact(2)
            .map(|b| endian.read_u16([b[0], b[1]]))
            .collect();
        let data_bytes = &rest[..header.data_length as usize * header.value_width.bytes_per_value()];
        let data = TrieData::read(header.value_width, data_bytes, endian);

        let trie = Self::new(
            header.trie_type,
            index,
            data,
            header.high_start(),
            header.index3_null_offset as u32,
            header.data_null_offset,
        )
        .map_err(log_rejected)?;

        tracing::debug!(
            trie_type = ?header.trie_type,
            value_width = ?header.value_width,
            ?endian,
            index_length = header.index_length,
            data_length = header.data_length,
            high_start = header.high_start(),
            "loaded code point trie"
        );
        Ok(trie)
    }

    /// Header describing this trie.
    pub fn header(&self) -> Header {
        Header {
            trie_type: self.trie_type,
            value_width: self.value_width(),
            index_length: self.index.len() as u16,
            data_length: self.data_length,
            index3_null_offset: self.index3_null_offset as u16,
            data_null_offset: self.data_null_offset,
            shifted_high_start: (self.high_start >> SHIFT_2) as u16,
        }
    }

    /// Exact size of the serialized form.
    pub fn binary_len(&self) -> usize {
        HEADER_LENGTH + self.index.len() * 2 + self.data.byte_len()
    }

    /// Serialize big-endian.
    pub fn to_binary(&self) -> Vec<u8> {
        self.to_binary_with(Endianness::Big)
    }

    pub fn to_binary_with(&self, endian: Endianness) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.binary_len());
        self.append_binary(endian, &mut out);
        out
    }

    /// Serialize into `w`; returns the number of bytes written.
    pub fn write_binary<W: Write>(&self, endian: Endianness, w: &mut W) -> Result<usize> {
        let buf = self.to_binary_with(endian);
        w.write_all(&buf)?;
        Ok(buf.len())
    }

    fn append_binary(&self, endian: Endianness, out: &mut Vec<u8>) {
        let before = out.len();
        out.extend_from_slice(&self.header().to_bytes(endian));
        for &entry in self.index.iter() {
            out.extend_from_slice(&endian.u16_bytes(entry));
        }
        self.data.write(endian, out);
        let written = out.len() - before;
        debug_assert_eq!(written, self.binary_len());
        tracing::debug!(?endian, bytes = written, "serialized code point trie");
    }
}

/// Re-encode a serialized trie in `target` byte order. The input may be in
/// either order; only the serialized prefix is converted.
pub fn swap_binary(bytes: &[u8], target: Endianness) -> Result<Vec<u8>> {
    let trie = CodePointTrie::from_binary(None, None, bytes)?;
    Ok(trie.to_binary_with(target))
}
