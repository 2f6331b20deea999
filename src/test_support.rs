//! Test fixtures: a piecewise-constant reference map and a plain (non-compacting)
//! table layout that turns it into a trie.

use std::collections::HashMap;

use crate::data::TrieData;
use crate::index::{pack_group, Index3Block};
use crate::layout::*;
use crate::map::{Range, ValueFilter};
use crate::trie::CodePointTrie;

/// Piecewise-constant map: `starts[i]..starts[i + 1]` has `values[i]`.
#[derive(Clone, Debug)]
pub(crate) struct Segments {
    starts: Vec<u32>,
    values: Vec<u32>,
}

impl Segments {
    /// `default` from U+0000, then each `(start, value)` in order.
    pub fn new(default: u32, runs: &[(u32, u32)]) -> Self {
        let mut s = Self {
            starts: vec![0],
            values: vec![default],
        };
        for &(start, value) in runs {
            s.set_from(start, value);
        }
        s
    }

    /// Set `value` for `start..=MAX_UNICODE`.
    pub fn set_from(&mut self, start: u32, value: u32) {
        assert!(start <= CODE_POINT_LIMIT);
        let i = self.starts.partition_point(|&s| s < start);
        self.starts.truncate(i);
        self.values.truncate(i);
        if start < CODE_POINT_LIMIT {
            self.starts.push(start);
            self.values.push(value);
        }
        if self.starts.is_empty() {
            self.starts.push(0);
            self.values.push(value);
        }
    }

    pub fn value_at(&self, c: u32) -> u32 {
        let i = self.starts.partition_point(|&s| s <= c) - 1;
        self.values[i]
    }

    pub fn breakpoints(&self) -> &[u32] {
        &self.starts
    }

    /// Copy with `value` over `start..=end`.
    pub fn with_run(&self, start: u32, end: u32, value: u32) -> Self {
        let mut runs: Vec<(u32, u32)> = self
            .starts
            .iter()
            .zip(&self.values)
            .map(|(&s, &v)| (s, v))
            .filter(|&(s, _)| s < start || s > end)
            .collect();
        let after = self.value_at(end + 1);
        runs.push((start, value));
        if end < MAX_UNICODE && !runs.iter().any(|&(s, _)| s == end + 1) {
            runs.push((end + 1, after));
        }
        runs.sort_unstable();
        let mut out = Self {
            starts: Vec::new(),
            values: Vec::new(),
        };
        for (s, v) in runs {
            out.starts.push(s);
            out.values.push(v);
        }
        out
    }

    /// Copy with every value passed through `filter`.
    pub fn filtered(&self, filter: &dyn ValueFilter) -> Self {
        Self {
            starts: self.starts.clone(),
            values: self.values.iter().map(|&v| filter.apply(v)).collect(),
        }
    }

    /// Maximal same-value range beginning at `start`.
    pub fn run_from(&self, start: u32) -> Range {
        let value = self.value_at(start);
        let mut i = self.starts.partition_point(|&s| s <= start);
        while i < self.starts.len() && self.values[i] == value {
            i += 1;
        }
        let end = self.starts.get(i).map_or(MAX_UNICODE, |&s| s - 1);
        Range::new(start, end, value)
    }

    /// All maximal ranges in order.
    pub fn ranges(&self) -> Vec<Range> {
        let mut out = Vec::new();
        let mut start = 0;
        loop {
            let r = self.run_from(start);
            out.push(r);
            if r.end() == MAX_UNICODE {
                return out;
            }
            start = r.end() + 1;
        }
    }
}

/// Lays out index and data tables for a [`Segments`] map.
///
/// Identical data blocks, index-3 blocks and index-2 blocks are shared, which
/// is enough to keep piecewise-constant fixtures small and to give the range
/// scanner repeated blocks to skip. Blocks equal to the null value use the
/// null blocks when `null_value` is set.
#[derive(Clone, Debug)]
pub(crate) struct Fixture {
    trie_type: TrieType,
    width: ValueWidth,
    high_start: u32,
    high_value: Option<u32>,
    error_value: u32,
    null_value: Option<u32>,
    force_packed: bool,
}

impl Fixture {
    pub fn new(trie_type: TrieType, width: ValueWidth) -> Self {
        Self {
            trie_type,
            width,
            high_start: trie_type.fast_limit(),
            high_value: None,
            error_value: width.max_value(),
            null_value: Some(0),
            force_packed: false,
        }
    }

    pub fn high_start(mut self, high_start: u32) -> Self {
        self.high_start = high_start;
        self
    }

    /// Defaults to the map's value at `high_start`.
    pub fn high_value(mut self, value: u32) -> Self {
        self.high_value = Some(value);
        self
    }

    pub fn error_value(mut self, value: u32) -> Self {
        self.error_value = value;
        self
    }

    pub fn null_value(mut self, value: Option<u32>) -> Self {
        self.null_value = value;
        self
    }

    /// Push supplementary data blocks above 0xFFFF so index-3 blocks are
    /// stored with 18-bit entries.
    pub fn force_packed(mut self, on: bool) -> Self {
        self.force_packed = on;
        self
    }

    fn resolved_high_value(&self, segs: &Segments) -> u32 {
        self.high_value
            .unwrap_or_else(|| segs.value_at(self.high_start.min(MAX_UNICODE)))
    }

    /// What the built trie should map each code point to.
    pub fn model(&self, segs: &Segments) -> Segments {
        let mut m = segs.clone();
        m.set_from(self.high_start, self.resolved_high_value(segs));
        m
    }

    pub fn build(&self, segs: &Segments) -> CodePointTrie {
        let ty = self.trie_type;
        let fast_limit = ty.fast_limit();
        let fast_len = ty.fast_index_length();
        let high_start = self.high_start;
        assert!(high_start >= fast_limit && high_start % CP_PER_INDEX_2_ENTRY == 0);
        assert!(high_start <= CODE_POINT_LIMIT);

        let block_values = |start: u32, len: u32| -> Vec<u32> {
            (start..start + len).map(|c| segs.value_at(c)).collect()
        };
        let is_null = |vals: &[u32]| self.null_value.is_some_and(|nv| vals.iter().all(|&v| v == nv));

        let mut data: Vec<u32> = block_values(0, ASCII_LIMIT);
        let mut index: Vec<u16> = vec![0; fast_len as usize];
        index[1] = FAST_DATA_BLOCK_LENGTH as u16;

        let data_null_offset = match self.null_value {
            Some(nv) => {
                let off = data.len() as u32;
                data.extend(std::iter::repeat(nv).take(FAST_DATA_BLOCK_LENGTH as usize));
                off
            }
            None => NO_DATA_NULL_OFFSET,
        };

        let mut data_blocks: HashMap<Vec<u32>, u32> = HashMap::new();
        let mut add_block = |data: &mut Vec<u32>, vals: Vec<u32>| -> u32 {
            if is_null(&vals) {
                return data_null_offset;
            }
            *data_blocks.entry(vals).or_insert_with_key(|vals| {
                let off = data.len() as u32;
                data.extend_from_slice(vals);
                off
            })
        };

        for i in 2..fast_len {
            let vals = block_values(i << FAST_SHIFT, FAST_DATA_BLOCK_LENGTH);
            index[i as usize] = add_block(&mut data, vals) as u16;
        }
        assert!(data.len() <= 0x1_0000, "fast data blocks must stay 16-bit addressable");

        let mut index3_null_offset = NO_INDEX3_NULL_OFFSET;
        if high_start > fast_limit {
            if self.force_packed && data.len() < 0x1_0000 {
                data.resize(0x1_0000, 0);
            }
            let i1_start = fast_limit >> SHIFT_1;
            let i1_end = (high_start + (1 << SHIFT_1) - 1) >> SHIFT_1;
            let i1_pos = index.len();
            index.resize(i1_pos + (i1_end - i1_start) as usize, 0);

            if self.null_value.is_some() {
                index3_null_offset = index.len() as u32;
                index.extend(std::iter::repeat(data_null_offset as u16).take(INDEX_3_BLOCK_LENGTH as usize));
            }
            let filler = if index3_null_offset == NO_INDEX3_NULL_OFFSET {
                0
            } else {
                index3_null_offset as u16
            };

            let mut i3_blocks: HashMap<Vec<u32>, u16> = HashMap::new();
            let mut i2_blocks: HashMap<Vec<u16>, u16> = HashMap::new();
            for i1 in i1_start..i1_end {
                let mut i2 = Vec::with_capacity(INDEX_2_BLOCK_LENGTH as usize);
                for j in 0..INDEX_2_BLOCK_LENGTH {
                    let c0 = (i1 << SHIFT_1) + (j << SHIFT_2);
                    if c0 < fast_limit || c0 >= high_start {
                        i2.push(filler);
                        continue;
                    }
                    let offsets: Vec<u32> = (0..INDEX_3_BLOCK_LENGTH)
                        .map(|k| {
                            let vals = block_values(c0 + (k << SHIFT_3), SMALL_DATA_BLOCK_LENGTH);
                            add_block(&mut data, vals)
                        })
                        .collect();
                    if self.null_value.is_some() && offsets.iter().all(|&o| o == data_null_offset) {
                        i2.push(index3_null_offset as u16);
                        continue;
                    }
                    let packed = self.force_packed || offsets.iter().any(|&o| o > 0xffff);
                    let entry = *i3_blocks.entry(offsets).or_insert_with_key(|offsets| {
                        let at = index.len() as u32;
                        assert!(at < 0x8000, "index-3 block offset must fit 15 bits");
                        if packed {
                            for chunk in offsets.chunks_exact(8) {
                                let group: [u32; 8] = chunk.try_into().unwrap();
                                index.extend_from_slice(&pack_group(&group));
                            }
                            Index3Block::Packed18(at).to_entry()
                        } else {
                            index.extend(offsets.iter().map(|&o| o as u16));
                            Index3Block::Plain(at).to_entry()
                        }
                    });
                    i2.push(entry);
                }
                let at = *i2_blocks.entry(i2).or_insert_with_key(|i2| {
                    let at = index.len() as u16;
                    index.extend_from_slice(i2);
                    at
                });
                index[i1_pos + (i1 - i1_start) as usize] = at;
            }
        }

        data.push(self.resolved_high_value(segs));
        data.push(self.error_value);

        let data = TrieData::from_values(self.width, &data).expect("fixture values fit the width");
        CodePointTrie::new(ty, index, data, high_start, index3_null_offset, data_null_offset)
            .expect("fixture layout is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_basics() {
        let s = Segments::new(0, &[(0x41, 5), (0x5b, 0)]);
        assert_eq!(s.value_at(0x40), 0);
        assert_eq!(s.value_at(0x41), 5);
        assert_eq!(s.value_at(0x10_ffff), 0);
        assert_eq!(s.run_from(0x45), Range::new(0x45, 0x5a, 5));
        assert_eq!(s.ranges().len(), 3);
    }

    #[test]
    fn test_with_run() {
        let s = Segments::new(0, &[(0x100, 1), (0x200, 2)]);
        let o = s.with_run(0x180, 0x27f, 9);
        assert_eq!(o.value_at(0x17f), 1);
        assert_eq!(o.value_at(0x180), 9);
        assert_eq!(o.value_at(0x27f), 9);
        assert_eq!(o.value_at(0x280), 2);
        let o = s.with_run(0x0, 0x10_ffff, 4);
        assert_eq!(o.ranges(), vec![Range::new(0, MAX_UNICODE, 4)]);
    }
}
