//! # codepoint-trie
//!
//! A compact, immutable trie mapping every Unicode code point
//! (`U+0000..=U+10FFFF`) to an 8-, 16- or 32-bit value, with fast point
//! lookup, iteration over maximal same-value ranges, UTF-16/UTF-8 cursors,
//! and a stable binary format ("Tri3").
//!
//! Tries are built elsewhere; this crate loads them from their serialized
//! form or from builder output via [`CodePointTrie::new`].
//!
//! ## Example
//!
//! ```rust
//! use codepoint_trie::layout::{NO_DATA_NULL_OFFSET, NO_INDEX3_NULL_OFFSET};
//! use codepoint_trie::{CodePointMap, CodePointTrie, Range, TrieData, TrieType};
//!
//! // U+0041..=U+005A map to 5, everything else to 0.
//! let mut data = vec![0u8; 128];
//! data[0x41..=0x5a].fill(5);
//! data.extend([0, 0xff]); // high value, error value
//! let mut index = vec![0u16; 64];
//! index[1] = 64;
//!
//! let trie = CodePointTrie::new(
//!     TrieType::Small,
//!     index,
//!     TrieData::from(data),
//!     0x1000,
//!     NO_INDEX3_NULL_OFFSET,
//!     NO_DATA_NULL_OFFSET,
//! )?;
//! assert_eq!(trie.get(0x41), 5);
//! assert_eq!(trie.get(0x110000), 0xff);
//! assert_eq!(trie.get_range(0x41, None), Some(Range::new(0x41, 0x5a, 5)));
//!
//! let bytes = trie.to_binary();
//! let loaded = CodePointTrie::from_binary(None, None, &bytes)?;
//! assert_eq!(loaded.ranges().count(), 3);
//! # Ok::<(), codepoint_trie::TrieError>(())
//! ```

#![deny(unsafe_code)]

mod binary;
mod cursor;
mod data;
mod error;
pub mod index;
pub mod layout;
mod map;
mod range;
mod trie;

pub use binary::{swap_binary, LoadOptions};
pub use cursor::{Utf16Cursor, Utf8Cursor};
pub use data::{TrieData, TrieValue};
pub use error::{Result, TrieError};
pub use layout::{Endianness, Header, TrieType, ValueWidth, CODE_POINT_LIMIT, MAX_UNICODE};
pub use map::{CodePointMap, Range, RangeIter, RangeOption, ValueFilter};
pub use trie::CodePointTrie;

#[cfg(test)]
mod test_support;
