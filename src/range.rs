//! Maximal same-value range scanning over the trie's index structure.
//!
//! The scan walks blocks rather than code points where it can: a data block
//! (or a whole index-3 block) that repeats the previous one is already known
//! to hold the running value and is skipped in one step, and null blocks
//! resolve to the null value without reading the data table.

use crate::index::Index3Block;
use crate::layout::*;
use crate::map::{apply_filter, CodePointMap, Range, ValueFilter};
use crate::trie::CodePointTrie;

/// Running state of one range scan.
struct Scan<'f> {
    start: u32,
    filter: Option<&'f dyn ValueFilter>,
    trie_null: u32,
    /// Filtered null value.
    null_value: u32,
    /// Last raw value read from the data table.
    trie_value: u32,
    /// Filtered value of the range so far; `None` before the first code point.
    value: Option<u32>,
}

impl Scan<'_> {
    #[inline]
    fn filtered(&self, raw: u32) -> u32 {
        if raw == self.trie_null {
            self.null_value
        } else {
            apply_filter(self.filter, raw)
        }
    }

    /// Account for a null block at `c`. Returns the finished range if the null
    /// value ends it.
    #[inline]
    fn null_block(&mut self, c: u32) -> Option<Range> {
        match self.value {
            Some(value) if value != self.null_value => Some(Range::new(self.start, c - 1, value)),
            Some(_) => None,
            None => {
                self.trie_value = self.trie_null;
                self.value = Some(self.null_value);
                None
            }
        }
    }

    /// Account for raw value `raw` at `c`. Returns the finished range if `raw`
    /// ends it.
    #[inline]
    fn data_value(&mut self, c: u32, raw: u32) -> Option<Range> {
        match self.value {
            Some(value) => {
                if raw != self.trie_value {
                    if self.filter.is_none() || self.filtered(raw) != value {
                        return Some(Range::new(self.start, c - 1, value));
                    }
                    self.trie_value = raw;
                }
                None
            }
            None => {
                self.trie_value = raw;
                self.value = Some(self.filtered(raw));
                None
            }
        }
    }
}

impl CodePointTrie {
    fn scan_range(&self, start: u32, filter: Option<&dyn ValueFilter>) -> Option<Range> {
        if start > MAX_UNICODE {
            return None;
        }
        if start >= self.high_start {
            let value = apply_filter(filter, self.high_value());
            return Some(Range::new(start, MAX_UNICODE, value));
        }

        let mut scan = Scan {
            start,
            filter,
            trie_null: self.null_value,
            null_value: apply_filter(filter, self.null_value),
            trie_value: 0,
            value: None,
        };
        let ty = self.trie_type;
        let mut prev_i3_entry: Option<u16> = None;
        let mut prev_block: Option<u32> = None;
        let mut c = start;

        while c < self.high_start {
            let i3_block;
            let mut i3;
            let i3_block_length;
            let data_block_length;
            if c < ty.fast_limit() {
                i3_block = Index3Block::Plain(0);
                i3 = c >> FAST_SHIFT;
                i3_block_length = ty.fast_index_length();
                data_block_length = FAST_DATA_BLOCK_LENGTH;
            } else {
                let i1 = (c >> SHIFT_1) + ty.index_1_base();
                let entry = self.index_2_entry(i1, c);
                if prev_i3_entry == Some(entry) && c - start >= CP_PER_INDEX_2_ENTRY {
                    // Same index-3 block as the previous one, already known to
                    // hold only the running value.
                    debug_assert_eq!(c & (CP_PER_INDEX_2_ENTRY - 1), 0);
                    c += CP_PER_INDEX_2_ENTRY;
                    continue;
                }
                prev_i3_entry = Some(entry);
                if entry as u32 == self.index3_null_offset {
                    if let Some(done) = scan.null_block(c) {
                        return Some(done);
                    }
                    prev_block = Some(self.data_null_offset);
                    c = (c + CP_PER_INDEX_2_ENTRY) & !(CP_PER_INDEX_2_ENTRY - 1);
                    continue;
                }
                i3_block = Index3Block::from_entry(entry);
                i3 = (c >> SHIFT_3) & INDEX_3_MASK;
                i3_block_length = INDEX_3_BLOCK_LENGTH;
                data_block_length = SMALL_DATA_BLOCK_LENGTH;
            }

            let data_mask = data_block_length - 1;
            while i3 < i3_block_length {
                let block = i3_block.data_block(&self.index, i3);
                if prev_block == Some(block) && c - start >= data_block_length {
                    debug_assert_eq!(c & data_mask, 0);
                    c += data_block_length;
                } else {
                    prev_block = Some(block);
                    if block == self.data_null_offset {
                        if let Some(done) = scan.null_block(c) {
                            return Some(done);
                        }
                        c = (c + data_block_length) & !data_mask;
                    } else {
                        let mut di = block + (c & data_mask);
                        loop {
                            if let Some(done) = scan.data_value(c, self.data.get(di)) {
                                return Some(done);
                            }
                            c += 1;
                            if c & data_mask == 0 {
                                break;
                            }
                            di += 1;
                        }
                    }
                }
                i3 += 1;
            }
        }

        let value = scan.value?;
        let end = if scan.filtered(self.high_value()) != value {
            c - 1
        } else {
            MAX_UNICODE
        };
        Some(Range::new(start, end, value))
    }
}

impl CodePointMap for CodePointTrie {
    #[inline]
    fn get(&self, c: u32) -> u32 {
        CodePointTrie::get(self, c)
    }

    fn get_range(&self, start: u32, filter: Option<&dyn ValueFilter>) -> Option<Range> {
        self.scan_range(start, filter)
    }
}
