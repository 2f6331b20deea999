//! Index-3 block pointers.
//!
//! An index-2 entry points at an index-3 block of 32 data block offsets. When
//! every offset fits in 16 bits the block is stored plainly. Otherwise bit 15
//! of the index-2 entry is set and the block holds 18-bit offsets packed in
//! four groups of nine `u16`s:
//!
//! ```text
//! word 0      bits 15..14 = offset 0 bits 17..16
//!             bits 13..12 = offset 1 bits 17..16
//!             ...
//!             bits  1..0  = offset 7 bits 17..16
//! words 1..=8 offsets 0..=7, bits 15..0
//! ```

use crate::layout::{INDEX_3_BLOCK_LENGTH, INDEX_3_BLOCK_LENGTH_18};

const PACKED_FLAG: u16 = 0x8000;

/// Decoded index-2 entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Index3Block {
    /// 32 consecutive 16-bit data block offsets starting at this index position.
    Plain(u32),
    /// 4 groups of (high-bits word + 8 low words) starting at this index position.
    Packed18(u32),
}

impl Index3Block {
    #[inline]
    pub fn from_entry(entry: u16) -> Self {
        if entry & PACKED_FLAG == 0 {
            Self::Plain(entry as u32)
        } else {
            Self::Packed18((entry & !PACKED_FLAG) as u32)
        }
    }

    #[inline]
    pub fn to_entry(self) -> u16 {
        match self {
            Self::Plain(off) => off as u16,
            Self::Packed18(off) => off as u16 | PACKED_FLAG,
        }
    }

    /// Position of the block within the index table.
    #[inline]
    pub fn offset(self) -> u32 {
        match self {
            Self::Plain(off) | Self::Packed18(off) => off,
        }
    }

    /// Number of index entries the block occupies.
    #[inline]
    pub fn stored_len(self) -> u32 {
        match self {
            Self::Plain(_) => INDEX_3_BLOCK_LENGTH,
            Self::Packed18(_) => INDEX_3_BLOCK_LENGTH_18,
        }
    }

    /// Data block offset for entry `i3` (0..32) of this block.
    #[inline]
    pub fn data_block(self, index: &[u16], i3: u32) -> u32 {
        match self {
            Self::Plain(off) => index[(off + i3) as usize] as u32,
            Self::Packed18(off) => {
                let group = (off + (i3 & !7) + (i3 >> 3)) as usize;
                let gi = i3 & 7;
                let high = ((index[group] as u32) << (2 + 2 * gi)) & 0x30000;
                high | index[group + 1 + gi as usize] as u32
            }
        }
    }
}

/// Pack eight data block offsets (each below `1 << 18`) into one 9-word group.
pub fn pack_group(offsets: &[u32; 8]) -> [u16; 9] {
    let mut group = [0u16; 9];
    for (j, &off) in offsets.iter().enumerate() {
        debug_assert!(off < 1 << 18);
        group[0] |= (((off >> 16) & 3) as u16) << (14 - 2 * j);
        group[j + 1] = off as u16;
    }
    group
}
