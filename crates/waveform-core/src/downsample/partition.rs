//! Column partitioning of a sample range
//!
//! A range of `total` frames is split into `width` contiguous windows of
//! `samples_per_point = max(1, total / width)` frames each:
//!
//! ```text
//! range:   |lower ................................. upper|
//! windows: |  0  |  1  |  2  | ... | width-1 |  tail   |
//!          <-spp-><-spp->                     ^ remainder
//! ```
//!
//! Integer division leaves up to `width - 1` frames at the tail that no
//! window covers. [`RemainderPolicy::Exclude`] drops them, which matches the
//! waveform output users already know. [`RemainderPolicy::FoldIntoLast`]
//! stretches the last window to `upper` instead.
//!
//! When `width > total`, windows past the end of the range are empty and
//! reduce to [`SampleData::ZERO`](crate::SampleData::ZERO).

use serde::{Deserialize, Serialize};

use crate::types::SampleRange;

/// What happens to frames left over by the integer division
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Tail frames are not part of any column
    #[default]
    Exclude,
    /// Tail frames are added to the last column
    FoldIntoLast,
}

/// Frame window `[start, end)` reduced into one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    /// Frames actually covered, `max(0, end - start)`
    #[inline]
    pub fn valid_length(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.valid_length() == 0
    }
}

/// Split of a sample range into `width` column windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    range: SampleRange,
    width: usize,
    samples_per_point: usize,
    remainder: RemainderPolicy,
}

impl Partition {
    pub fn new(range: SampleRange, width: usize, remainder: RemainderPolicy) -> Self {
        let total = range.len();
        let samples_per_point = total.checked_div(width).unwrap_or(0).max(1);

        Self {
            range,
            width,
            samples_per_point,
            remainder,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn range(&self) -> SampleRange {
        self.range
    }

    #[inline]
    pub fn samples_per_point(&self) -> usize {
        self.samples_per_point
    }

    #[inline]
    pub fn remainder_policy(&self) -> RemainderPolicy {
        self.remainder
    }

    /// Window for output column `column`
    pub fn window(&self, column: usize) -> Window {
        let start = column
            .saturating_mul(self.samples_per_point)
            .saturating_add(self.range.lower);
        let mut end = start
            .saturating_add(self.samples_per_point)
            .min(self.range.upper);

        if self.remainder == RemainderPolicy::FoldIntoLast
            && self.width > 0
            && column == self.width - 1
            && self.range.len() >= self.width
        {
            end = self.range.upper;
        }

        Window {
            start,
            end: end.max(start),
        }
    }

    /// All windows, left to right
    pub fn windows(&self) -> impl ExactSizeIterator<Item = Window> + '_ {
        (0..self.width).map(move |column| self.window(column))
    }

    /// Frames that no window covers
    pub fn excluded_tail(&self) -> SampleRange {
        let covered_end = match self.width.checked_sub(1) {
            Some(last) => self.window(last).end.max(self.range.lower),
            None => self.range.lower,
        };
        SampleRange::new(covered_end.min(self.range.upper), self.range.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let partition = Partition::new(SampleRange::new(0, 10), 5, RemainderPolicy::Exclude);
        assert_eq!(partition.samples_per_point(), 2);

        let windows: Vec<_> = partition.windows().map(|w| (w.start, w.end)).collect();
        assert_eq!(windows, vec![(0, 2), (2, 4), (4, 6), (6, 8), (8, 10)]);
        assert!(partition.excluded_tail().is_empty());
    }

    #[test]
    fn test_remainder_is_excluded_by_default() {
        let partition = Partition::new(SampleRange::new(0, 10), 3, RemainderPolicy::default());
        assert_eq!(partition.samples_per_point(), 3);

        let windows: Vec<_> = partition.windows().map(|w| (w.start, w.end)).collect();
        assert_eq!(windows, vec![(0, 3), (3, 6), (6, 9)]);
        assert_eq!(partition.excluded_tail(), SampleRange::new(9, 10));
    }

    #[test]
    fn test_fold_into_last_covers_tail() {
        let partition = Partition::new(SampleRange::new(0, 10), 3, RemainderPolicy::FoldIntoLast);
        assert_eq!(partition.window(2), Window { start: 6, end: 10 });
        assert!(partition.excluded_tail().is_empty());
    }

    #[test]
    fn test_offset_range() {
        let partition = Partition::new(SampleRange::new(100, 120), 4, RemainderPolicy::Exclude);
        assert_eq!(partition.window(0), Window { start: 100, end: 105 });
        assert_eq!(partition.window(3), Window { start: 115, end: 120 });
    }

    #[test]
    fn test_more_columns_than_samples() {
        let partition = Partition::new(SampleRange::new(0, 3), 6, RemainderPolicy::FoldIntoLast);
        assert_eq!(partition.samples_per_point(), 1);

        let lengths: Vec<_> = partition.windows().map(|w| w.valid_length()).collect();
        assert_eq!(lengths, vec![1, 1, 1, 0, 0, 0]);
        assert!(partition.excluded_tail().is_empty());
    }

    #[test]
    fn test_zero_width_and_empty_range() {
        let partition = Partition::new(SampleRange::new(0, 10), 0, RemainderPolicy::Exclude);
        assert_eq!(partition.windows().len(), 0);
        assert_eq!(partition.excluded_tail(), SampleRange::new(0, 10));

        let partition = Partition::new(SampleRange::new(5, 5), 4, RemainderPolicy::Exclude);
        assert!(partition.windows().all(|w| w.is_empty()));
    }
}
