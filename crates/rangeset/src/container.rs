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
use crate::interval::Interval;
use crate::sweep::{self, Clamp, Gaps, Values};
use std::sync::atomic::{AtomicU64, Ordering};

/// A set of `i32` values stored as canonical runs
///
/// Implementations supply run iteration and the two raw run mutations;
/// everything else, including set algebra against any other
/// implementation, is derived from those.
///
/// Borrowing iterators hold `&self` and thus cannot outlive a mutation.
/// For interleaving iteration and mutation, use a [Cursor].
pub trait RangeContainer {
    /// Ascending canonical runs
    type Ranges<'a>: Iterator<Item = Interval>
    where
        Self: 'a;

    /// All runs, ascending
    fn ranges(&self) -> Self::Ranges<'_>;
    /// Runs starting from the first one with `last >= value`
    fn ranges_from(&self, value: i32) -> Self::Ranges<'_>;
    /// Adds every value of `run`, merging with overlapping and adjacent runs
    fn add_interval(&mut self, run: Interval);
    /// Removes every value of `run`
    fn remove_interval(&mut self, run: Interval);
    /// Number of stored runs
    fn range_count(&self) -> usize;
    /// The identity and mutation count of this container
    fn revision(&self) -> &Revision;
    /// Removes every run
    fn clear(&mut self);

    /// Bumped on every mutation that changes the stored runs
    fn generation(&self) -> u64 {
        self.revision().generation()
    }

    /// Whether the set has no members
    fn is_empty(&self) -> bool {
        self.range_count() == 0
    }

    /// Number of member values
    fn len(&self) -> usize {
        self.ranges().map(|run| run.len()).sum()
    }

    /// The smallest member, or [RangeError::Empty]
    fn first_value(&self) -> Result<i32, RangeError> {
        self.ranges()
            .next()
            .map(|run| run.first())
            .ok_or(RangeError::Empty)
    }

    /// The largest member, or [RangeError::Empty]
    fn last_value(&self) -> Result<i32, RangeError> {
        self.ranges()
            .last()
            .map(|run| run.last())
            .ok_or(RangeError::Empty)
    }

    /// Whether `value` is a member
    fn contains(&self, value: i32) -> bool {
        self.ranges_from(value)
            .next()
            .is_some_and(|run| run.contains(value))
    }

    /// Adds `[first, last]`, rejecting `first > last` without changes
    fn add_range(&mut self, first: i32, last: i32) -> Result<(), RangeError> {
        self.add_interval(Interval::new(first, last)?);
        Ok(())
    }

    /// Removes `[first, last]`, rejecting `first > last` without changes
    fn remove_range(&mut self, first: i32, last: i32) -> Result<(), RangeError> {
        self.remove_interval(Interval::new(first, last)?);
        Ok(())
    }

    /// Adds the `count` values starting at `start`
    fn add_span(&mut self, start: i32, count: u32) -> Result<(), RangeError> {
        self.add_interval(Interval::from_span(start, count)?);
        Ok(())
    }

    /// Adds a single value
    fn add_value(&mut self, value: i32) {
        self.add_interval(Interval::single(value));
    }

    /// Removes a single value
    fn remove_value(&mut self, value: i32) {
        self.remove_interval(Interval::single(value));
    }

    /// Values in `self` or `other`
    fn union<C>(&self, other: &C) -> Self
    where
        Self: Sized + Default,
        C: RangeContainer + ?Sized,
    {
        sweep::union(self.ranges(), other.ranges()).collect_into_container()
    }

    /// Values in both `self` and `other`
    fn intersect<C>(&self, other: &C) -> Self
    where
        Self: Sized + Default,
        C: RangeContainer + ?Sized,
    {
        sweep::intersection(self.ranges(), other.ranges()).collect_into_container()
    }

    /// Values in `self` but not in `other`
    fn remainder<C>(&self, other: &C) -> Self
    where
        Self: Sized + Default,
        C: RangeContainer + ?Sized,
    {
        sweep::difference(self.ranges(), other.ranges()).collect_into_container()
    }

    /// All member values, ascending
    fn values(&self) -> Values<Self::Ranges<'_>> {
        Values::new(self.ranges())
    }

    /// Member values within `[lo, hi]`
    fn values_in(&self, lo: i32, hi: i32) -> Result<Values<Clamp<Self::Ranges<'_>>>, RangeError> {
        let window = Interval::new(lo, hi)?;
        Ok(Values::new(Clamp::new(self.ranges_from(lo), window)))
    }

    /// Runs of `[lo, hi]` that are absent from the set
    fn vacuum_ranges(&self, lo: i32, hi: i32) -> Result<Gaps<Self::Ranges<'_>>, RangeError> {
        let window = Interval::new(lo, hi)?;
        Ok(Gaps::new(self.ranges_from(lo), window))
    }

    /// Values of `[lo, hi]` that are absent from the set
    fn vacuum(&self, lo: i32, hi: i32) -> Result<Values<Gaps<Self::Ranges<'_>>>, RangeError> {
        Ok(Values::new(self.vacuum_ranges(lo, hi)?))
    }

    /// Collects the runs
    fn to_vec(&self) -> Vec<Interval> {
        self.ranges().collect()
    }

    /// Checks that runs are ascending, disjoint and non-adjacent
    fn is_valid(&self) -> bool {
        is_canonical(self.ranges()) && self.ranges().count() == self.range_count()
    }

    /// A detached cursor over the runs, see [Cursor]
    fn cursor(&self) -> Cursor {
        Cursor::new(self.revision())
    }
}

/// Containers with a dense 0-based index over their member values
pub trait IndexedRangeContainer: RangeContainer {
    /// The member value at `index` in ascending order
    fn get(&self, index: usize) -> Result<i32, RangeError>;
    /// The position of `value` among the members, if it is one
    fn index_of(&self, value: i32) -> Option<usize>;
}

trait CollectIntoContainer: Iterator<Item = Interval> + Sized {
    fn collect_into_container<C: RangeContainer + Default>(self) -> C {
        let mut container = C::default();
        for run in self {
            container.add_interval(run);
        }
        container
    }
}

impl<I: Iterator<Item = Interval>> CollectIntoContainer for I {}

pub(crate) fn is_canonical(runs: impl Iterator<Item = Interval>) -> bool {
    let mut previous: Option<Interval> = None;
    for run in runs {
        if let Some(previous) = previous {
            if !previous.precedes(&run) {
                tracing::debug!(%previous, next = %run, "runs are not canonical");
                return false;
            }
        }
        previous = Some(run);
    }
    true
}

static NEXT_OWNER: AtomicU64 = AtomicU64::new(0);

/// A container's identity plus its mutation counter
///
/// Every instance, including every clone, gets a fresh identity and starts
/// at generation 0.
#[derive(Debug)]
pub struct Revision {
    owner: u64,
    generation: u64,
}

impl Revision {
    /// A fresh identity at generation 0
    pub fn new() -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            generation: 0,
        }
    }

    /// Number of changing mutations so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Records a mutation that changed the stored runs
    pub fn bump(&mut self) {
        self.generation += 1;
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Revision {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// A run cursor that does not borrow its container
///
/// The cursor remembers which container created it and that container's
/// generation. Passing any other container fails with
/// [RangeError::ForeignContainer]; using it after the container was mutated
/// by anything other than [Cursor::remove] fails with
/// [RangeError::ConcurrentModification].
#[derive(Debug, Clone)]
pub struct Cursor {
    owner: u64,
    generation: u64,
    resume: Option<i64>,
    current: Option<Interval>,
}

impl Cursor {
    fn new(revision: &Revision) -> Self {
        Self {
            owner: revision.owner,
            generation: revision.generation,
            resume: None,
            current: None,
        }
    }

    fn check<C: RangeContainer + ?Sized>(&self, container: &C) -> Result<(), RangeError> {
        let revision = container.revision();
        if revision.owner != self.owner {
            Err(RangeError::ForeignContainer)
        } else if revision.generation != self.generation {
            Err(RangeError::ConcurrentModification)
        } else {
            Ok(())
        }
    }

    /// Advances to the next run
    pub fn next<C: RangeContainer + ?Sized>(&mut self, container: &C) -> Result<Option<Interval>, RangeError> {
        self.check(container)?;
        let run = match self.resume {
            None => container.ranges().next(),
            Some(value) if value > i32::MAX as i64 => None,
            Some(value) => container.ranges_from(value as i32).next(),
        };
        self.current = run;
        self.resume = Some(run.map_or(i32::MAX as i64 + 1, |run| run.last() as i64 + 1));
        Ok(run)
    }

    /// Removes the run last returned by [Cursor::next]
    pub fn remove<C: RangeContainer + ?Sized>(&mut self, container: &mut C) -> Result<Interval, RangeError> {
        self.check(container)?;
        let run = self.current.take().ok_or(RangeError::NoCurrent)?;
        container.remove_interval(run);
        self.generation = container.generation();
        Ok(run)
    }
}
