//! The immutable code point trie and its point lookups.

use crate::data::TrieData;
use crate::error::{Result, TrieError};
use crate::index::Index3Block;
use crate::layout::*;

/// Immutable map from every code point to a value of 8, 16 or 32 bits.
///
/// Lookup goes through one of three paths:
/// - `U+0000..U+007F`: a 128-entry cache.
/// - below the type's fast limit (`U+10000` for [`TrieType::Fast`], `U+1000`
///   for [`TrieType::Small`]): one index entry per 64 code points.
/// - up to `high_start`: index-1, index-2, index-3, then a 16-value data block.
///
/// Everything at or above `high_start` maps to the high value, and inputs
/// above `U+10FFFF` map to the error value.
///
/// A trie never changes after construction, so `&CodePointTrie` can be shared
/// across threads freely.
#[derive(Clone)]
pub struct CodePointTrie {
    pub(crate) trie_type: TrieType,
    pub(crate) index: Box<[u16]>,
    pub(crate) data: TrieData,
    pub(crate) data_length: u32,
    pub(crate) high_start: u32,
    pub(crate) index3_null_offset: u32,
    pub(crate) data_null_offset: u32,
    pub(crate) null_value: u32,
    ascii: [u32; ASCII_LIMIT as usize],
}

impl CodePointTrie {
    /// Assemble a trie from builder output.
    ///
    /// `index` holds the fast index followed by the index-1, index-2 and
    /// index-3 tables; `data` must end with the high value and the error value.
    /// Pass [`NO_INDEX3_NULL_OFFSET`] / [`NO_DATA_NULL_OFFSET`] when the tables
    /// have no null block. Every block pointer reachable from a code point below
    /// `high_start` is bounds-checked here.
    pub fn new(
        trie_type: TrieType,
        index: impl Into<Box<[u16]>>,
        data: TrieData,
        high_start: u32,
        index3_null_offset: u32,
        data_null_offset: u32,
    ) -> Result<Self> {
        let index = index.into();
        validate(
            trie_type,
            &index,
            &data,
            high_start,
            index3_null_offset,
            data_null_offset,
        )?;

        let data_length = data.len() as u32;
        let mut trie = Self {
            trie_type,
            index,
            data,
            data_length,
            high_start,
            index3_null_offset,
            data_null_offset,
            null_value: 0,
            ascii: [0; ASCII_LIMIT as usize],
        };
        for c in 0..ASCII_LIMIT {
            let value = trie.data.get(trie.fast_index(c));
            trie.ascii[c as usize] = value;
        }
        let null_value_offset = if data_null_offset >= data_length {
            data_length - HIGH_VALUE_NEG_DATA_OFFSET
        } else {
            data_null_offset
        };
        trie.null_value = trie.data.get(null_value_offset);
        Ok(trie)
    }

    #[inline]
    pub fn trie_type(&self) -> TrieType {
        self.trie_type
    }

    #[inline]
    pub fn value_width(&self) -> ValueWidth {
        self.data.value_width()
    }

    /// First code point that maps to the high value.
    #[inline]
    pub fn high_start(&self) -> u32 {
        self.high_start
    }

    /// Value of the null blocks (or the high value when there are none).
    #[inline]
    pub fn null_value(&self) -> u32 {
        self.null_value
    }

    #[inline]
    pub fn error_value(&self) -> u32 {
        self.data.get(self.data_length - ERROR_VALUE_NEG_DATA_OFFSET)
    }

    #[inline]
    pub fn high_value(&self) -> u32 {
        self.data.get(self.data_length - HIGH_VALUE_NEG_DATA_OFFSET)
    }

    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    pub fn index3_null_offset(&self) -> u32 {
        self.index3_null_offset
    }

    pub fn data_null_offset(&self) -> u32 {
        self.data_null_offset
    }

    /// Value for `c`. Anything above `U+10FFFF` yields the error value.
    #[inline]
    pub fn get(&self, c: u32) -> u32 {
        if c < ASCII_LIMIT {
            return self.ascii[c as usize];
        }
        self.data.get(self.cp_index(c))
    }

    #[inline]
    pub fn get_char(&self, ch: char) -> u32 {
        self.get(ch as u32)
    }

    /// Value for an ASCII code point. `c` must be below `0x80`.
    #[inline]
    pub fn ascii_get(&self, c: u32) -> u32 {
        debug_assert!(c < ASCII_LIMIT);
        self.ascii[c as usize]
    }

    /// Value for a BMP code point of a [`TrieType::Fast`] trie, skipping the
    /// range checks. `c` must be at most `0xFFFF`.
    #[inline]
    pub fn bmp_get(&self, c: u32) -> u32 {
        debug_assert!(self.trie_type == TrieType::Fast && c <= 0xffff);
        self.data.get(self.fast_index(c))
    }

    /// Value for a supplementary code point of a [`TrieType::Fast`] trie.
    /// `c` must be in `0x10000..=0x10FFFF`.
    #[inline]
    pub fn supp_get(&self, c: u32) -> u32 {
        debug_assert!(self.trie_type == TrieType::Fast && (BMP_LIMIT..=MAX_UNICODE).contains(&c));
        self.data.get(self.small_index(c))
    }

    /// Data position for `c`, or the error value slot when `c` is out of range.
    #[inline]
    pub(crate) fn cp_index(&self, c: u32) -> u32 {
        let fast_max = match self.trie_type {
            TrieType::Fast => 0xffff,
            TrieType::Small => SMALL_MAX,
        };
        if c <= fast_max {
            self.fast_index(c)
        } else if c <= MAX_UNICODE {
            self.small_index(c)
        } else {
            self.data_length - ERROR_VALUE_NEG_DATA_OFFSET
        }
    }

    #[inline]
    pub(crate) fn fast_index(&self, c: u32) -> u32 {
        self.index[(c >> FAST_SHIFT) as usize] as u32 + (c & FAST_DATA_MASK)
    }

    #[inline]
    pub(crate) fn small_index(&self, c: u32) -> u32 {
        if c >= self.high_start {
            return self.data_length - HIGH_VALUE_NEG_DATA_OFFSET;
        }
        self.internal_small_index(c)
    }

    fn internal_small_index(&self, c: u32) -> u32 {
        let i1 = (c >> SHIFT_1) + self.trie_type.index_1_base();
        let block = self.index_3_block(i1, c);
        let i3 = (c >> SHIFT_3) & INDEX_3_MASK;
        block.data_block(&self.index, i3) + (c & SMALL_DATA_MASK)
    }

    /// Raw index-2 entry for `c`, given its index-1 position.
    #[inline]
    pub(crate) fn index_2_entry(&self, i1: u32, c: u32) -> u16 {
        let i2_block = self.index[i1 as usize] as u32;
        self.index[(i2_block + ((c >> SHIFT_2) & INDEX_2_MASK)) as usize]
    }

    #[inline]
    fn index_3_block(&self, i1: u32, c: u32) -> Index3Block {
        Index3Block::from_entry(self.index_2_entry(i1, c))
    }
}

fn validate(
    trie_type: TrieType,
    index: &[u16],
    data: &TrieData,
    high_start: u32,
    index3_null_offset: u32,
    data_null_offset: u32,
) -> Result<()> {
    let index_len = index.len() as u32;
    let data_len = data.len() as u32;

    if index.len() > MAX_INDEX_LENGTH {
        return Err(TrieError::structure(format!(
            "index length {} exceeds {MAX_INDEX_LENGTH}",
            index.len()
        )));
    }
    if data.len() > MAX_DATA_LENGTH {
        return Err(TrieError::structure(format!(
            "data length {} exceeds {MAX_DATA_LENGTH}",
            data.len()
        )));
    }
    if data_len < ASCII_LIMIT + HIGH_VALUE_NEG_DATA_OFFSET {
        return Err(TrieError::structure(format!(
            "data length {data_len} too short for ASCII, high and error values"
        )));
    }
    if index3_null_offset > NO_INDEX3_NULL_OFFSET {
        return Err(TrieError::structure(format!(
            "index-3 null offset {index3_null_offset:#x} out of range"
        )));
    }
    if data_null_offset > NO_DATA_NULL_OFFSET {
        return Err(TrieError::structure(format!(
            "data null offset {data_null_offset:#x} out of range"
        )));
    }
    if high_start % CP_PER_INDEX_2_ENTRY != 0
        || high_start < trie_type.fast_limit()
        || high_start > CODE_POINT_LIMIT
    {
        return Err(TrieError::structure(format!(
            "high start {high_start:#x} invalid for a {trie_type:?} trie"
        )));
    }

    let fast_len = trie_type.fast_index_length();
    if index_len < fast_len {
        return Err(TrieError::structure(format!(
            "index length {index_len} shorter than the {fast_len}-entry fast index"
        )));
    }
    for (i, &block) in index[..fast_len as usize].iter().enumerate() {
        if block as u32 + FAST_DATA_BLOCK_LENGTH > data_len {
            return Err(TrieError::structure(format!(
                "fast index entry {i} points past the data table"
            )));
        }
    }

    let base = trie_type.index_1_base();
    let mut c = trie_type.fast_limit();
    while c < high_start {
        let i1 = (c >> SHIFT_1) + base;
        if i1 >= index_len {
            return Err(TrieError::structure(format!(
                "index-1 entry for U+{c:04X} is past the index table"
            )));
        }
        let i2 = index[i1 as usize] as u32 + ((c >> SHIFT_2) & INDEX_2_MASK);
        if i2 >= index_len {
            return Err(TrieError::structure(format!(
                "index-2 entry for U+{c:04X} is past the index table"
            )));
        }
        let block = Index3Block::from_entry(index[i2 as usize]);
        if block.offset() + block.stored_len() > index_len {
            return Err(TrieError::structure(format!(
                "index-3 block for U+{c:04X} is past the index table"
            )));
        }
        for i3 in 0..INDEX_3_BLOCK_LENGTH {
            if block.data_block(index, i3) + SMALL_DATA_BLOCK_LENGTH > data_len {
                return Err(TrieError::structure(format!(
                    "data block for U+{:04X} is past the data table",
                    c + (i3 << SHIFT_3)
                )));
            }
        }
        c += CP_PER_INDEX_2_ENTRY;
    }
    Ok(())
}

impl std::fmt::Debug for CodePointTrie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodePointTrie")
            .field("type", &self.trie_type)
            .field("value_width", &self.value_width())
            .field("index_len", &self.index.len())
            .field("data_len", &self.data_length)
            .field("high_start", &format_args!("{:#x}", self.high_start))
            .field("null_value", &self.null_value)
            .finish()
    }
}
