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

use crate::container::{RangeContainer, Revision};
use crate::error::RangeError;
use crate::interval::Interval;
use crate::store::{self, PackedIter, PackedRuns, RunStore};
use std::fmt;

/// A run set stored as a flat array of packed runs
///
/// Mutations binary-search the array and splice it, so they cost `O(n)`
/// in the worst case but `O(1)` amortized at either end.
#[derive(Clone, Default)]
pub struct RangeList {
    runs: PackedRuns,
    revision: Revision,
}

impl RangeList {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list with room for `capacity` runs
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            runs: PackedRuns::with_capacity(capacity),
            revision: Revision::new(),
        }
    }

    fn changed(&mut self, op: &'static str, run: Interval) {
        self.revision.bump();
        tracing::trace!(op, %run, runs = self.runs.len(), "range list changed");
    }
}

impl RangeContainer for RangeList {
    type Ranges<'a> = PackedIter<'a>;

    fn ranges(&self) -> PackedIter<'_> {
        self.runs.iter()
    }

    fn ranges_from(&self, value: i32) -> PackedIter<'_> {
        let (Ok(index) | Err(index)) = self.runs.search(value);
        self.runs.iter_from(index)
    }

    fn add_interval(&mut self, run: Interval) {
        match store::insert_run(&mut self.runs, run) {
            Ok(Some(_)) => self.changed("add", run),
            Ok(None) => {}
            Err(err) => unreachable!("run store rejected a computed index: {err}"),
        }
    }

    fn remove_interval(&mut self, run: Interval) {
        match store::remove_run(&mut self.runs, run) {
            Ok(Some(_)) => self.changed("remove", run),
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
        if self.runs.len() > 0 {
            self.runs.clear();
            self.revision.bump();
        }
    }

    fn first_value(&self) -> Result<i32, RangeError> {
        self.ranges()
            .next()
            .map(|run| run.first())
            .ok_or(RangeError::Empty)
    }

    fn last_value(&self) -> Result<i32, RangeError> {
        self.ranges()
            .next_back()
            .map(|run| run.last())
            .ok_or(RangeError::Empty)
    }
}

impl PartialEq for RangeList {
    fn eq(&self, other: &Self) -> bool {
        self.runs == other.runs
    }
}

impl Eq for RangeList {}

impl fmt::Debug for RangeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ranges()).finish()
    }
}

impl FromIterator<Interval> for RangeList {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl Extend<Interval> for RangeList {
    fn extend<I: IntoIterator<Item = Interval>>(&mut self, iter: I) {
        for run in iter {
            self.add_interval(run);
        }
    }
}
