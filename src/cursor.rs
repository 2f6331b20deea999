//! Cursors that walk text forward and backward, decoding one code point per
//! step and looking up its trie value.

use crate::layout::TrieType;
use crate::trie::CodePointTrie;

#[inline]
fn is_lead(u: u16) -> bool {
    (0xd800..=0xdbff).contains(&u)
}

#[inline]
fn is_trail(u: u16) -> bool {
    (0xdc00..=0xdfff).contains(&u)
}

#[inline]
fn is_surrogate(u: u16) -> bool {
    (0xd800..=0xdfff).contains(&u)
}

#[inline]
fn supplementary(lead: u16, trail: u16) -> u32 {
    (((lead as u32) - 0xd800) << 10) + ((trail as u32) - 0xdc00) + 0x1_0000
}

/// Walks UTF-16 code units. A lead surrogate followed by a trail surrogate is
/// one supplementary code point; any other surrogate is its own code point.
///
/// Fast tries are read through [`CodePointTrie::bmp_get`] and
/// [`CodePointTrie::supp_get`] directly, and give unpaired surrogates the
/// error value. Small tries look unpaired surrogates up like any other code
/// point.
#[derive(Clone, Debug)]
pub struct Utf16Cursor<'a> {
    trie: &'a CodePointTrie,
    s: &'a [u16],
    index: usize,
    code_point: Option<u32>,
    value: u32,
}

impl<'a> Utf16Cursor<'a> {
    /// Positions the cursor before `s[index]`; `index` is clamped to `s.len()`.
    pub fn new(trie: &'a CodePointTrie, s: &'a [u16], index: usize) -> Self {
        Self {
            trie,
            s,
            index: index.min(s.len()),
            code_point: None,
            value: 0,
        }
    }

    /// Rebind to another string and forget the last code point.
    pub fn reset(&mut self, s: &'a [u16], index: usize) {
        self.s = s;
        self.index = index.min(s.len());
        self.code_point = None;
        self.value = 0;
    }

    /// Code unit index of the cursor.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Code point read by the last successful step.
    #[inline]
    pub fn code_point(&self) -> Option<u32> {
        self.code_point
    }

    /// Value of [`code_point`](Self::code_point); 0 before the first step.
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    #[inline]
    fn bmp_value(&self, c: u32) -> u32 {
        match self.trie.trie_type() {
            TrieType::Fast => self.trie.bmp_get(c),
            TrieType::Small => self.trie.get(c),
        }
    }

    #[inline]
    fn supp_value(&self, c: u32) -> u32 {
        match self.trie.trie_type() {
            TrieType::Fast => self.trie.supp_get(c),
            TrieType::Small => self.trie.get(c),
        }
    }

    #[inline]
    fn unpaired_value(&self, c: u32) -> u32 {
        match self.trie.trie_type() {
            TrieType::Fast => self.trie.error_value(),
            TrieType::Small => self.trie.get(c),
        }
    }

    /// Read the code point at the cursor and move past it. Returns `false`
    /// without moving at the end of the string.
    pub fn advance(&mut self) -> bool {
        let Some(&lead) = self.s.get(self.index) else {
            return false;
        };
        self.index += 1;
        let mut c = lead as u32;
        let value = if !is_surrogate(lead) {
            self.bmp_value(c)
        } else {
            match self.s.get(self.index) {
                Some(&trail) if is_lead(lead) && is_trail(trail) => {
                    self.index += 1;
                    c = supplementary(lead, trail);
                    self.supp_value(c)
                }
                _ => self.unpaired_value(c),
            }
        };
        self.code_point = Some(c);
        self.value = value;
        true
    }

    /// Read the code point before the cursor and move before it. Returns
    /// `false` without moving at the start of the string.
    pub fn retreat(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        let trail = self.s[self.index];
        let mut c = trail as u32;
        let lead = self.index.checked_sub(1).map(|i| self.s[i]);
        let value = if !is_surrogate(trail) {
            self.bmp_value(c)
        } else {
            match lead {
                Some(lead) if is_trail(trail) && is_lead(lead) => {
                    self.index -= 1;
                    c = supplementary(lead, trail);
                    self.supp_value(c)
                }
                _ => self.unpaired_value(c),
            }
        };
        self.code_point = Some(c);
        self.value = value;
        true
    }
}

impl Iterator for Utf16Cursor<'_> {
    /// `(code point, value)`
    type Item = (u32, u32);

    fn next(&mut self) -> Option<(u32, u32)> {
        if !self.advance() {
            return None;
        }
        Some((self.code_point?, self.value))
    }
}

/// Walks a `&str` by `char`, with the same stepping API as [`Utf16Cursor`].
#[derive(Clone, Debug)]
pub struct Utf8Cursor<'a> {
    trie: &'a CodePointTrie,
    s: &'a str,
    index: usize,
    code_point: Option<u32>,
    value: u32,
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

impl<'a> Utf8Cursor<'a> {
    /// Positions the cursor at byte `index`, moved back to a char boundary
    /// if needed.
    pub fn new(trie: &'a CodePointTrie, s: &'a str, index: usize) -> Self {
        Self {
            trie,
            s,
            index: floor_char_boundary(s, index),
            code_point: None,
            value: 0,
        }
    }

    pub fn reset(&mut self, s: &'a str, index: usize) {
        self.s = s;
        self.index = floor_char_boundary(s, index);
        self.code_point = None;
        self.value = 0;
    }

    /// Byte index of the cursor.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn code_point(&self) -> Option<u32> {
        self.code_point
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    fn visit(&mut self, ch: char) {
        self.code_point = Some(ch as u32);
        self.value = self.trie.get_char(ch);
    }

    pub fn advance(&mut self) -> bool {
        match self.s[self.index..].chars().next() {
            Some(ch) => {
                self.index += ch.len_utf8();
                self.visit(ch);
                true
            }
            None => false,
        }
    }

    pub fn retreat(&mut self) -> bool {
        match self.s[..self.index].chars().next_back() {
            Some(ch) => {
                self.index -= ch.len_utf8();
                self.visit(ch);
                true
            }
            None => false,
        }
    }
}

impl Iterator for Utf8Cursor<'_> {
    /// `(code point, value)`
    type Item = (u32, u32);

    fn next(&mut self) -> Option<(u32, u32)> {
        if !self.advance() {
            return None;
        }
        Some((self.code_point?, self.value))
    }
}

impl CodePointTrie {
    /// Cursor over UTF-16 text starting before code unit `index`.
    pub fn utf16_cursor<'a>(&'a self, s: &'a [u16], index: usize) -> Utf16Cursor<'a> {
        Utf16Cursor::new(self, s, index)
    }

    /// Cursor over UTF-8 text starting at byte `index`.
    pub fn utf8_cursor<'a>(&'a self, s: &'a str, index: usize) -> Utf8Cursor<'a> {
        Utf8Cursor::new(self, s, index)
    }
}
