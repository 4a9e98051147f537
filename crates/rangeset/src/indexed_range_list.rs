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

use crate::container::{is_canonical, IndexedRangeContainer, RangeContainer, Revision};
use crate::error::RangeError;
use crate::interval::Interval;
use crate::store::{self, RunItem, RunStore};
use std::collections::VecDeque;
use std::collections::vec_deque;
use std::fmt;

/// A run together with the index of its first value among all members
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct IndexedRun {
    run: Interval,
    first_index: usize,
}

impl RunItem for IndexedRun {
    fn interval(&self) -> Interval {
        self.run
    }
    fn from_interval(run: Interval) -> Self {
        Self {
            run,
            first_index: 0,
        }
    }
}

/// An array-backed run set with `O(log n)` order statistics
///
/// Every run caches the number of member values before it. Mutations
/// recompute the cache from the first touched run onward.
#[derive(Clone, Default)]
pub struct IndexedRangeList {
    runs: VecDeque<IndexedRun>,
    revision: Revision,
}

impl IndexedRangeList {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list with room for `capacity` runs
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            runs: VecDeque::with_capacity(capacity),
            revision: Revision::new(),
        }
    }

    fn reindex(&mut self, from: usize) {
        let mut next = match from.checked_sub(1).and_then(|i| self.runs.get(i)) {
            Some(previous) => previous.first_index + previous.run.len(),
            None => 0,
        };
        for entry in self.runs.range_mut(from..) {
            entry.first_index = next;
            next += entry.run.len();
        }
    }

    fn changed(&mut self, op: &'static str, run: Interval, from: usize) {
        self.reindex(from);
        self.revision.bump();
        tracing::trace!(op, %run, from, runs = self.runs.len(), "indexed range list changed");
    }
}

/// Iterator over the runs of an [IndexedRangeList]
#[derive(Clone)]
pub struct IndexedIter<'a> {
    inner: vec_deque::Iter<'a, IndexedRun>,
}

impl Iterator for IndexedIter<'_> {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        self.inner.next().map(|entry| entry.run)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for IndexedIter<'_> {
    fn next_back(&mut self) -> Option<Interval> {
        self.inner.next_back().map(|entry| entry.run)
    }
}

impl ExactSizeIterator for IndexedIter<'_> {}

impl RangeContainer for IndexedRangeList {
    type Ranges<'a> = IndexedIter<'a>;

    fn ranges(&self) -> IndexedIter<'_> {
        IndexedIter {
            inner: self.runs.iter(),
        }
    }

    fn ranges_from(&self, value: i32) -> IndexedIter<'_> {
        let (Ok(index) | Err(index)) = self.runs.search(value);
        IndexedIter {
            inner: self.runs.range(index..),
        }
    }

    fn add_interval(&mut self, run: Interval) {
        match store::insert_run(&mut self.runs, run) {
            Ok(Some(from)) => self.changed("add", run, from),
            Ok(None) => {}
            Err(err) => unreachable!("run store rejected a computed index: {err}"),
        }
    }

    fn remove_interval(&mut self, run: Interval) {
        match store::remove_run(&mut self.runs, run) {
            Ok(Some(from)) => self.changed("remove", run, from),
            Ok(None) => {}
            Err(err) => unreachable!("run store rejected a computed index: {err}"),
        }
    }

    fn range_count(&self) -> usize {
        self.runs.len()
    }

    fn revision(&self) -> &Revision {
        &self.revision
    }

    fn clear(&mut self) {
        if !self.runs.is_empty() {
            self.runs.clear();
            self.revision.bump();
        }
    }

    fn len(&self) -> usize {
        self.runs
            .back()
            .map_or(0, |last| last.first_index + last.run.len())
    }

    fn first_value(&self) -> Result<i32, RangeError> {
        self.runs
            .front()
            .map(|entry| entry.run.first())
            .ok_or(RangeError::Empty)
    }

    fn last_value(&self) -> Result<i32, RangeError> {
        self.runs
            .back()
            .map(|entry| entry.run.last())
            .ok_or(RangeError::Empty)
    }

    /// Also checks every cached first index
    fn is_valid(&self) -> bool {
        if !is_canonical(self.ranges()) {
            return false;
        }
        let mut expected = 0;
        for entry in &self.runs {
            if entry.first_index != expected {
                tracing::debug!(run = %entry.run, cached = entry.first_index, expected, "stale first index");
                return false;
            }
            expected += entry.run.len();
        }
        true
    }
}

impl IndexedRangeContainer for IndexedRangeList {
    fn get(&self, index: usize) -> Result<i32, RangeError> {
        let len = self.len();
        if index >= len {
            return Err(RangeError::out_of_bounds(index, len));
        }
        // the first run has first_index 0, so the partition point is positive
        let position = self.runs.partition_point(|entry| entry.first_index <= index) - 1;
        let entry = &self.runs[position];
        Ok((entry.run.first() as i64 + (index - entry.first_index) as i64) as i32)
    }

    fn index_of(&self, value: i32) -> Option<usize> {
        let position = self.runs.search(value).ok()?;
        let entry = &self.runs[position];
        Some(entry.first_index + (value as i64 - entry.run.first() as i64) as usize)
    }
}

impl PartialEq for IndexedRangeList {
    fn eq(&self, other: &Self) -> bool {
        self.ranges().eq(other.ranges())
    }
}

impl Eq for IndexedRangeList {}

impl fmt::Debug for IndexedRangeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ranges()).finish()
    }
}

impl FromIterator<Interval> for IndexedRangeList {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl Extend<Interval> for IndexedRangeList {
    fn extend<I: IntoIterator<Item = Interval>>(&mut self, iter: I) {
        for run in iter {
            self.add_interval(run);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(pairs: &[(i32, i32)]) -> IndexedRangeList {
        pairs
            .iter()
            .map(|&(first, last)| Interval::new(first, last).unwrap())
            .collect()
    }

    fn first_indices(list: &IndexedRangeList) -> Vec<usize> {
        list.runs.iter().map(|entry| entry.first_index).collect()
    }

    #[test]
    fn test_order_statistics() {
        let irl = list(&[(4, 6), (16, 23)]);
        assert_eq!(Ok(4), irl.get(0));
        assert_eq!(Ok(6), irl.get(2));
        assert_eq!(Ok(16), irl.get(3));
        assert_eq!(Ok(17), irl.get(4));
        assert_eq!(Ok(23), irl.get(10));
        assert_eq!(Err(RangeError::out_of_bounds(11, 11)), irl.get(11));
        assert_eq!(Some(4), irl.index_of(17));
        assert_eq!(Some(0), irl.index_of(4));
        assert_eq!(None, irl.index_of(24));
        assert_eq!(None, irl.index_of(10));
        assert_eq!(11, irl.len());
    }

    #[test]
    fn test_reindex_after_head_insert() {
        let mut irl = list(&[(10, 12), (20, 21)]);
        assert_eq!(vec![0, 3], first_indices(&irl));
        irl.add_range(0, 1).unwrap();
        assert_eq!(vec![0, 2, 5], first_indices(&irl));
        irl.remove_value(11);
        assert_eq!(vec![0, 2, 3, 4], first_indices(&irl));
        irl.add_range(2, 9).unwrap();
        assert_eq!(vec![0, 11, 12], first_indices(&irl));
        assert_eq!(Ok(12), irl.get(11));
        assert_eq!(Ok(20), irl.get(12));
        assert!(irl.is_valid());
    }

    #[test]
    fn test_remove_everything() {
        let mut irl = list(&[(1, 3), (5, 7)]);
        irl.remove_range(5, 7).unwrap();
        assert_eq!(vec![0], first_indices(&irl));
        irl.remove_range(i32::MIN, i32::MAX).unwrap();
        assert!(irl.is_empty());
        assert_eq!(0, irl.len());
        assert_eq!(Err(RangeError::out_of_bounds(0, 0)), irl.get(0));
        assert!(irl.is_valid());
    }

    #[test]
    fn test_round_trip() {
        let mut irl = IndexedRangeList::new();
        for i in 0..50 {
            irl.add_span(i * 7 % 101, (i % 4 + 1) as u32).unwrap();
        }
        assert!(irl.is_valid());
        for (index, value) in irl.values().enumerate() {
            assert_eq!(Ok(value), irl.get(index));
            assert_eq!(Some(index), irl.index_of(value));
        }
    }

    #[test]
    fn test_stale_index_detected() {
        let mut irl = list(&[(1, 3), (5, 7)]);
        irl.runs[1].first_index = 2;
        assert!(!irl.is_valid());
    }
}
