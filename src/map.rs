//! The read-only code point map interface: point lookup, maximal same-value
//! ranges, and range iteration.

use crate::layout::MAX_UNICODE;

/// Maps trie values before they are compared while building ranges.
///
/// Two values with the same filtered value end up in the same range.
pub trait ValueFilter {
    fn apply(&self, value: u32) -> u32;
}

impl<F: Fn(u32) -> u32> ValueFilter for F {
    #[inline]
    fn apply(&self, value: u32) -> u32 {
        self(value)
    }
}

#[inline]
pub(crate) fn apply_filter(filter: Option<&dyn ValueFilter>, value: u32) -> u32 {
    match filter {
        Some(f) => f.apply(value),
        None => value,
    }
}

/// How surrogate code points are reported by
/// [`CodePointMap::get_range_with_surrogates`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RangeOption {
    /// Surrogates are ordinary code points.
    #[default]
    Normal,
    /// `U+D800..=U+DBFF` all report the caller's surrogate value.
    FixedLeadSurrogates,
    /// `U+D800..=U+DFFF` all report the caller's surrogate value.
    FixedAllSurrogates,
}

impl RangeOption {
    /// Last code point overridden by this option.
    fn surrogate_end(self) -> Option<u32> {
        match self {
            Self::Normal => None,
            Self::FixedLeadSurrogates => Some(0xdbff),
            Self::FixedAllSurrogates => Some(0xdfff),
        }
    }
}

/// A run `start..=end` of code points sharing one value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Range {
    start: u32,
    end: u32,
    value: u32,
}

impl Range {
    #[inline]
    pub fn new(start: u32, end: u32, value: u32) -> Self {
        debug_assert!(start <= end && end <= MAX_UNICODE);
        Self { start, end, value }
    }

    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Inclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.end
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    #[inline]
    pub fn contains(&self, c: u32) -> bool {
        self.start <= c && c <= self.end
    }

    /// Overwrite all three fields.
    #[inline]
    pub fn set(&mut self, start: u32, end: u32, value: u32) {
        *self = Self::new(start, end, value);
    }
}

/// Read-only map over all code points.
pub trait CodePointMap {
    /// Value for `c`; the map's error value when `c > U+10FFFF`.
    fn get(&self, c: u32) -> u32;

    /// Longest range starting at `start` whose code points all have the same
    /// (filtered) value. `None` when `start > U+10FFFF`.
    fn get_range(&self, start: u32, filter: Option<&dyn ValueFilter>) -> Option<Range>;

    /// Like [`get_range`](Self::get_range), but with the surrogates selected by
    /// `option` all reporting `surrogate_value`.
    ///
    /// `surrogate_value` is compared against filtered values and is not itself
    /// filtered. A surrogate range is merged with the range that follows it
    /// only when that range's value equals `surrogate_value`.
    fn get_range_with_surrogates(
        &self,
        start: u32,
        option: RangeOption,
        surrogate_value: u32,
        filter: Option<&dyn ValueFilter>,
    ) -> Option<Range> {
        let mut range = self.get_range(start, filter)?;
        let Some(surr_end) = option.surrogate_end() else {
            return Some(range);
        };
        let end = range.end;
        if end < 0xd7ff || start > surr_end {
            return Some(range);
        }
        // The range overlaps the surrogates or ends right before them.
        if range.value == surrogate_value {
            if end >= surr_end {
                return Some(range);
            }
        } else {
            if start <= 0xd7ff {
                range.end = 0xd7ff;
                return Some(range);
            }
            // Starts on a surrogate whose code unit value differs.
            range.value = surrogate_value;
            if end > surr_end {
                range.end = surr_end;
                return Some(range);
            }
        }
        match self.get_range(surr_end + 1, filter) {
            Some(next) if next.value == surrogate_value => {
                Some(Range::new(start, next.end, surrogate_value))
            }
            _ => Some(Range::new(start, surr_end, surrogate_value)),
        }
    }

    /// Iterate all ranges of the map in code point order, unfiltered.
    fn ranges(&self) -> RangeIter<'_, Self>
    where
        Self: Sized,
    {
        RangeIter::new(self, None)
    }

    /// Iterate all ranges of the map with values passed through `filter`.
    fn filtered_ranges<'a>(&'a self, filter: &'a dyn ValueFilter) -> RangeIter<'a, Self>
    where
        Self: Sized,
    {
        RangeIter::new(self, Some(filter))
    }
}

/// Walks the ranges of a map from `U+0000` to `U+10FFFF`.
///
/// [`next_range`](Self::next_range) reuses one [`Range`] and hands out a
/// borrow that lasts until the following call; the [`Iterator`] impl yields
/// copies instead.
pub struct RangeIter<'a, M: ?Sized> {
    map: &'a M,
    filter: Option<&'a dyn ValueFilter>,
    range: Range,
    next_start: Option<u32>,
}

impl<'a, M: CodePointMap + ?Sized> RangeIter<'a, M> {
    pub fn new(map: &'a M, filter: Option<&'a dyn ValueFilter>) -> Self {
        Self {
            map,
            filter,
            range: Range::default(),
            next_start: Some(0),
        }
    }

    /// Advance to the next range, or `None` once `U+10FFFF` has been covered.
    pub fn next_range(&mut self) -> Option<&Range> {
        let start = self.next_start?;
        match self.map.get_range(start, self.filter) {
            Some(range) => {
                self.range = range;
                self.next_start = (range.end < MAX_UNICODE).then(|| range.end + 1);
                Some(&self.range)
            }
            None => {
                self.next_start = None;
                None
            }
        }
    }
}

impl<M: CodePointMap + ?Sized> Iterator for RangeIter<'_, M> {
    type Item = Range;

    fn next(&mut self) -> Option<Range> {
        self.next_range().copied()
    }
}

impl<M: CodePointMap + ?Sized> std::iter::FusedIterator for RangeIter<'_, M> {}
