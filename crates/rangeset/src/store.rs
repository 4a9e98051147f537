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

//! Sequence storage for array-backed containers and the canonicalization
//! shared by [crate::RangeList] and [crate::IndexedRangeList].

use crate::error::RangeError;
use crate::interval::{above, below, Interval};
use std::cmp::Ordering;
use std::collections::VecDeque;

/// An element of a [RunStore] that carries one run
pub trait RunItem: Copy {
    /// The run this item carries
    fn interval(&self) -> Interval;
    /// Builds an item for `interval`; any cached data is filled in later
    /// by the owning container
    fn from_interval(interval: Interval) -> Self;
}

impl RunItem for Interval {
    fn interval(&self) -> Interval {
        *self
    }
    fn from_interval(interval: Interval) -> Self {
        interval
    }
}

/// Indexed sequence of runs with bounds-checked access
///
/// Reads and in-place writes require `index < len`, insertion allows
/// `index <= len`, and `remove_range` takes a half-open `from..to`.
/// Violations report [RangeError::IndexOutOfBounds] and change nothing.
#[allow(clippy::len_without_is_empty)]
pub trait RunStore {
    /// The stored element
    type Item: RunItem;

    /// Number of stored runs
    fn len(&self) -> usize;
    /// The item at `index`
    fn get(&self, index: usize) -> Result<Self::Item, RangeError>;
    /// Overwrites the item at `index`
    fn set(&mut self, index: usize, item: Self::Item) -> Result<(), RangeError>;
    /// Inserts `item` before `index`, shifting later items up
    fn insert(&mut self, index: usize, item: Self::Item) -> Result<(), RangeError>;
    /// Inserts `items` in order before `index`
    fn insert_all<I>(&mut self, index: usize, items: I) -> Result<(), RangeError>
    where
        I: IntoIterator<Item = Self::Item>;
    /// Removes and returns the item at `index`
    fn remove(&mut self, index: usize) -> Result<Self::Item, RangeError>;
    /// Removes the items in `from..to`
    fn remove_range(&mut self, from: usize, to: usize) -> Result<(), RangeError>;
    /// Appends `item`
    fn push(&mut self, item: Self::Item);
    /// Removes every item
    fn clear(&mut self);

    /// The run of the item at `index`
    fn interval_at(&self, index: usize) -> Result<Interval, RangeError> {
        Ok(self.get(index)?.interval())
    }

    /// Binary search for the run holding `value`
    ///
    /// `Ok(index)` if a run contains it, otherwise `Err(insertion_point)`,
    /// the index of the first run lying after `value`.
    fn search(&self, value: i32) -> Result<usize, usize> {
        let (mut lo, mut hi) = (0, self.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let run = match self.interval_at(mid) {
                Ok(run) => run,
                Err(err) => unreachable!("search probed inside 0..len: {err}"),
            };
            match run.compare_value(value) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(mid),
            }
        }
        Err(lo)
    }
}

fn check_access(index: usize, len: usize) -> Result<(), RangeError> {
    if index < len {
        Ok(())
    } else {
        Err(RangeError::out_of_bounds(index, len))
    }
}

fn check_insert(index: usize, len: usize) -> Result<(), RangeError> {
    if index <= len {
        Ok(())
    } else {
        Err(RangeError::out_of_bounds(index, len))
    }
}

fn check_range(from: usize, to: usize, len: usize) -> Result<(), RangeError> {
    if to > len {
        Err(RangeError::out_of_bounds(to, len))
    } else if from > to {
        Err(RangeError::out_of_bounds(from, len))
    } else {
        Ok(())
    }
}

/// Runs packed two `i32` per `u64` word: `first` in the high half,
/// `last` in the low half
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PackedRuns {
    words: Vec<u64>,
}

impl PackedRuns {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with room for `capacity` runs
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: Vec::with_capacity(capacity),
        }
    }

    fn pack(run: Interval) -> u64 {
        ((run.first() as u32 as u64) << 32) | run.last() as u32 as u64
    }

    fn unpack(word: u64) -> Interval {
        Interval::new_unchecked((word >> 32) as u32 as i32, word as u32 as i32)
    }

    /// All runs, ascending
    pub fn iter(&self) -> PackedIter<'_> {
        self.iter_from(0)
    }

    /// Runs from store index `index` onward; empty past the end
    pub fn iter_from(&self, index: usize) -> PackedIter<'_> {
        PackedIter {
            words: self.words.get(index..).unwrap_or_default().iter(),
        }
    }
}

/// Iterator over the runs of [PackedRuns]
#[derive(Clone)]
pub struct PackedIter<'a> {
    words: std::slice::Iter<'a, u64>,
}

impl Iterator for PackedIter<'_> {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        self.words.next().map(|&w| PackedRuns::unpack(w))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.words.size_hint()
    }
}

impl DoubleEndedIterator for PackedIter<'_> {
    fn next_back(&mut self) -> Option<Interval> {
        self.words.next_back().map(|&w| PackedRuns::unpack(w))
    }
}

impl ExactSizeIterator for PackedIter<'_> {}

impl std::fmt::Debug for PackedRuns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl RunStore for PackedRuns {
    type Item = Interval;

    fn len(&self) -> usize {
        self.words.len()
    }

    fn get(&self, index: usize) -> Result<Interval, RangeError> {
        check_access(index, self.words.len())?;
        Ok(Self::unpack(self.words[index]))
    }

    fn set(&mut self, index: usize, item: Interval) -> Result<(), RangeError> {
        check_access(index, self.words.len())?;
        self.words[index] = Self::pack(item);
        Ok(())
    }

    fn insert(&mut self, index: usize, item: Interval) -> Result<(), RangeError> {
        check_insert(index, self.words.len())?;
        self.words.insert(index, Self::pack(item));
        Ok(())
    }

    fn insert_all<I>(&mut self, index: usize, items: I) -> Result<(), RangeError>
    where
        I: IntoIterator<Item = Interval>,
    {
        check_insert(index, self.words.len())?;
        self.words
            .splice(index..index, items.into_iter().map(Self::pack));
        Ok(())
    }

    fn remove(&mut self, index: usize) -> Result<Interval, RangeError> {
        check_access(index, self.words.len())?;
        Ok(Self::unpack(self.words.remove(index)))
    }

    fn remove_range(&mut self, from: usize, to: usize) -> Result<(), RangeError> {
        check_range(from, to, self.words.len())?;
        self.words.drain(from..to);
        Ok(())
    }

    fn push(&mut self, item: Interval) {
        self.words.push(Self::pack(item));
    }

    fn clear(&mut self) {
        self.words.clear();
    }
}

impl<T: RunItem> RunStore for VecDeque<T> {
    type Item = T;

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Result<T, RangeError> {
        VecDeque::get(self, index)
            .copied()
            .ok_or(RangeError::out_of_bounds(index, VecDeque::len(self)))
    }

    fn set(&mut self, index: usize, item: T) -> Result<(), RangeError> {
        let len = VecDeque::len(self);
        let slot = self
            .get_mut(index)
            .ok_or(RangeError::out_of_bounds(index, len))?;
        *slot = item;
        Ok(())
    }

    fn insert(&mut self, index: usize, item: T) -> Result<(), RangeError> {
        check_insert(index, VecDeque::len(self))?;
        VecDeque::insert(self, index, item);
        Ok(())
    }

    fn insert_all<I>(&mut self, index: usize, items: I) -> Result<(), RangeError>
    where
        I: IntoIterator<Item = T>,
    {
        check_insert(index, VecDeque::len(self))?;
        let mut tail = self.split_off(index);
        self.extend(items);
        self.append(&mut tail);
        Ok(())
    }

    fn remove(&mut self, index: usize) -> Result<T, RangeError> {
        let len = VecDeque::len(self);
        VecDeque::remove(self, index).ok_or(RangeError::out_of_bounds(index, len))
    }

    fn remove_range(&mut self, from: usize, to: usize) -> Result<(), RangeError> {
        check_range(from, to, VecDeque::len(self))?;
        self.drain(from..to);
        Ok(())
    }

    fn push(&mut self, item: T) {
        self.push_back(item);
    }

    fn clear(&mut self) {
        VecDeque::clear(self);
    }
}

fn item<S: RunStore>(first: i32, last: i32) -> S::Item {
    S::Item::from_interval(Interval::new_unchecked(first, last))
}

/// Adds `run` to a canonical store, coalescing with overlapping and
/// adjacent runs
///
/// Returns the lowest index whose run changed, moved or appeared, or `None`
/// if the run was already covered.
pub(crate) fn insert_run<S: RunStore>(store: &mut S, run: Interval) -> Result<Option<usize>, RangeError> {
    let len = store.len();
    if len == 0 {
        store.push(S::Item::from_interval(run));
        return Ok(Some(0));
    }

    // head fast path
    let head = store.interval_at(0)?;
    if run.last() <= head.last() {
        if run.precedes(&head) {
            store.insert(0, S::Item::from_interval(run))?;
            return Ok(Some(0));
        }
        if run.first() >= head.first() {
            return Ok(None);
        }
        store.set(0, item::<S>(run.first(), head.last()))?;
        return Ok(Some(0));
    }

    // tail fast path
    let tail_index = len - 1;
    let tail = store.interval_at(tail_index)?;
    if run.first() >= tail.first() {
        if tail.precedes(&run) {
            store.push(S::Item::from_interval(run));
            return Ok(Some(len));
        }
        if run.last() <= tail.last() {
            return Ok(None);
        }
        store.set(tail_index, item::<S>(tail.first(), run.last()))?;
        return Ok(Some(tail_index));
    }

    // leftmost run touching first - 1, rightmost run touching last + 1
    let (Ok(i1) | Err(i1)) = store.search(below(run.first()));
    let i2 = match store.search(above(run.last())) {
        Ok(j) => Some(j),
        Err(j) => j.checked_sub(1),
    };
    match i2 {
        Some(i2) if i1 <= i2 => {
            let left = store.interval_at(i1)?;
            let right = store.interval_at(i2)?;
            let merged = Interval::new_unchecked(
                run.first().min(left.first()),
                run.last().max(right.last()),
            );
            if i1 == i2 && merged == left {
                return Ok(None);
            }
            store.set(i1, S::Item::from_interval(merged))?;
            store.remove_range(i1 + 1, i2 + 1)?;
        }
        _ => store.insert(i1, S::Item::from_interval(run))?,
    }
    Ok(Some(i1))
}

/// Removes every value of `run` from a canonical store, shrinking boundary
/// runs and splitting a run that strictly contains `run`
///
/// Returns the lowest index whose run changed or moved, or `None` if
/// nothing was removed.
pub(crate) fn remove_run<S: RunStore>(store: &mut S, run: Interval) -> Result<Option<usize>, RangeError> {
    let (Ok(i1) | Err(i1)) = store.search(run.first());
    let i2 = match store.search(run.last()) {
        Ok(j) => Some(j),
        Err(j) => j.checked_sub(1),
    };
    let Some(i2) = i2.filter(|&i2| i1 <= i2) else {
        return Ok(None);
    };

    let left = store.interval_at(i1)?;
    if i1 == i2 {
        let keep_head = left.first() < run.first();
        let keep_tail = left.last() > run.last();
        match (keep_head, keep_tail) {
            (false, false) => {
                store.remove(i1)?;
            }
            (true, false) => store.set(i1, item::<S>(left.first(), run.first() - 1))?,
            (false, true) => store.set(i1, item::<S>(run.last() + 1, left.last()))?,
            (true, true) => {
                store.set(i1, item::<S>(left.first(), run.first() - 1))?;
                store.insert(i1 + 1, item::<S>(run.last() + 1, left.last()))?;
            }
        }
        return Ok(Some(i1));
    }

    let right = store.interval_at(i2)?;
    let (mut from, mut to) = (i1, i2 + 1);
    if left.first() < run.first() {
        store.set(i1, item::<S>(left.first(), run.first() - 1))?;
        from += 1;
    }
    if right.last() > run.last() {
        store.set(i2, item::<S>(run.last() + 1, right.last()))?;
        to -= 1;
    }
    store.remove_range(from, to)?;
    Ok(Some(i1))
}
