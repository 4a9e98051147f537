// Copyright (c) 2025 gudzpoz
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use crate::error::RangeError;
use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;

/// A closed run of integers `[first, last]` with `first <= last`
///
/// Equality, hashing and ordering are structural on `(first, last)`, which
/// orders disjoint runs by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    first: i32,
    last: i32,
}

impl Interval {
    /// Creates `[first, last]`, rejecting `first > last`
    pub fn new(first: i32, last: i32) -> Result<Self, RangeError> {
        if first > last {
            return Err(RangeError::invalid(first, last));
        }
        Ok(Self { first, last })
    }

    /// Creates the run holding `count` values starting at `start`
    pub fn from_span(start: i32, count: u32) -> Result<Self, RangeError> {
        let last = start as i64 + count as i64 - 1;
        if count == 0 || last > i32::MAX as i64 {
            return Err(RangeError::invalid(start, last));
        }
        Ok(Self {
            first: start,
            last: last as i32,
        })
    }

    /// Creates the one-value run `[value, value]`
    pub const fn single(value: i32) -> Self {
        Self {
            first: value,
            last: value,
        }
    }

    /// Callers guarantee `first <= last`
    pub(crate) const fn new_unchecked(first: i32, last: i32) -> Self {
        debug_assert!(first <= last);
        Self { first, last }
    }

    /// The smallest value of the run
    pub fn first(&self) -> i32 {
        self.first
    }

    /// The largest value of the run
    pub fn last(&self) -> i32 {
        self.last
    }

    /// Number of values in the run
    ///
    /// A run is never empty, hence no `is_empty`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        (self.last as i64 - self.first as i64 + 1) as usize
    }

    /// Whether `value` lies within `[first, last]`
    pub fn contains(&self, value: i32) -> bool {
        self.first <= value && value <= self.last
    }

    /// Locates `value` relative to the run, in binary-search orientation
    ///
    /// Returns `Less` when the value lies past `last` (search further right),
    /// `Greater` when it lies before `first`, and `Equal` when it is inside.
    pub fn compare_value(&self, value: i32) -> Ordering {
        if value > self.last {
            Ordering::Less
        } else if value < self.first {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Whether the whole run lies before `other` with at least one value
    /// missing in between
    pub fn precedes(&self, other: &Interval) -> bool {
        (self.last as i64) + 1 < other.first as i64
    }

    /// Whether the runs overlap or are adjacent
    pub fn touches(&self, other: &Interval) -> bool {
        !self.precedes(other) && !other.precedes(self)
    }

    /// The overlapping part of both runs, if any
    pub fn intersect_with(&self, other: &Interval) -> Option<Interval> {
        let first = self.first.max(other.first);
        let last = self.last.min(other.last);
        (first <= last).then_some(Interval { first, last })
    }

    /// The span enclosing both runs, if they overlap or are adjacent
    pub fn merge_with(&self, other: &Interval) -> Option<Interval> {
        self.touches(other).then(|| Interval {
            first: self.first.min(other.first),
            last: self.last.max(other.last),
        })
    }

    /// The run as a [RangeInclusive]
    pub fn to_range(&self) -> RangeInclusive<i32> {
        self.first..=self.last
    }
}

/// Saturating `value - 1` and `value + 1`, used for adjacency probes
pub(crate) fn below(value: i32) -> i32 {
    value.saturating_sub(1)
}

pub(crate) fn above(value: i32) -> i32 {
    value.saturating_add(1)
}

impl From<i32> for Interval {
    fn from(value: i32) -> Self {
        Interval::single(value)
    }
}

impl TryFrom<RangeInclusive<i32>> for Interval {
    type Error = RangeError;

    fn try_from(range: RangeInclusive<i32>) -> Result<Self, Self::Error> {
        Interval::new(*range.start(), *range.end())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "({},{})", self.first, self.last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(first: i32, last: i32) -> Interval {
        Interval::new(first, last).unwrap()
    }

    #[test]
    fn test_construction() {
        assert_eq!(Err(RangeError::invalid(5, 4)), Interval::new(5, 4));
        assert_eq!(iv(4, 6), Interval::from_span(4, 3).unwrap());
        assert!(Interval::from_span(4, 0).is_err());
        assert!(Interval::from_span(i32::MAX, 2).is_err());
        assert_eq!(iv(i32::MAX, i32::MAX), Interval::from_span(i32::MAX, 1).unwrap());
        assert_eq!(iv(1, 3), Interval::try_from(1..=3).unwrap());
        assert_eq!(1 << 32, iv(i32::MIN, i32::MAX).len());
    }

    #[test]
    fn test_intersect() {
        assert_eq!(Some(iv(2, 3)), iv(1, 3).intersect_with(&iv(2, 13)));
        assert_eq!(Some(iv(13, 13)), iv(13, 24).intersect_with(&iv(2, 13)));
        assert_eq!(None, iv(1, 3).intersect_with(&iv(4, 5)));
        assert_eq!(Some(iv(5, 6)), iv(1, 10).intersect_with(&iv(5, 6)));
    }

    #[test]
    fn test_merge() {
        assert_eq!(Some(iv(1, 5)), iv(1, 3).merge_with(&iv(4, 5)));
        assert_eq!(Some(iv(1, 5)), iv(4, 5).merge_with(&iv(1, 3)));
        assert_eq!(Some(iv(1, 10)), iv(1, 10).merge_with(&iv(3, 4)));
        assert_eq!(None, iv(1, 3).merge_with(&iv(5, 6)));
        assert_eq!(
            Some(iv(i32::MIN, i32::MAX)),
            iv(i32::MIN, 0).merge_with(&iv(1, i32::MAX)),
        );
    }

    #[test]
    fn test_compare_value() {
        let run = iv(4, 6);
        assert_eq!(Ordering::Greater, run.compare_value(3));
        assert_eq!(Ordering::Equal, run.compare_value(4));
        assert_eq!(Ordering::Equal, run.compare_value(6));
        assert_eq!(Ordering::Less, run.compare_value(7));
    }

    #[test]
    fn test_display() {
        assert_eq!("(4,6)", iv(4, 6).to_string());
        assert_eq!("13", iv(13, 13).to_string());
    }
}
