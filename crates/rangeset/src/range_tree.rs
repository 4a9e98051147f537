// Copyright (c) 2025 gudzpoz
// Copyright (c) 2019 Sevag Hanssian
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
use crate::rb_base::{Order, RbSlab, RebalanceListener, Ref, LEFT, RIGHT};
use std::fmt;

/// A tree node payload: the run and the number of values in its subtree
#[derive(Clone, Copy, Debug)]
struct Run {
    run: Interval,
    size: usize,
}

/// Keeps [Run::size] exact across every change of the tree shape
struct SizeListener;

type Tree = RbSlab<Run, SizeListener>;

fn size_of(tree: &Tree, node: Option<Ref>) -> usize {
    node.map_or(0, |node| tree.item(node).size)
}

fn refresh(tree: &mut Tree, node: Ref) {
    let size = tree.item(node).run.len()
        + size_of(tree, tree.child(node, LEFT))
        + size_of(tree, tree.child(node, RIGHT));
    tree.item_mut(node).size = size;
}

fn propagate(tree: &mut Tree, mut node: Option<Ref>) {
    while let Some(n) = node {
        refresh(tree, n);
        node = tree.parent(n);
    }
}

impl RebalanceListener<Run> for SizeListener {
    fn left_rotated(tree: &mut Tree, x: Ref, y: Ref) {
        refresh(tree, x);
        refresh(tree, y);
    }

    fn right_rotated(tree: &mut Tree, x: Ref, y: Ref) {
        refresh(tree, x);
        refresh(tree, y);
    }

    fn attached(tree: &mut Tree, node: Ref) {
        propagate(tree, Some(node));
    }

    fn detached(tree: &mut Tree, lowest: Option<Ref>) {
        propagate(tree, lowest);
    }
}

/// A run set stored in a red-black tree ordered by run start
///
/// Every node knows the number of values in its subtree, which gives
/// `O(log n)` order statistics on top of `O(log n)` mutations.
#[derive(Clone, Default)]
pub struct RangeTree {
    tree: Tree,
    revision: Revision,
}

impl RangeTree {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tree with room for `capacity` runs
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: Tree::with_capacity(capacity),
            revision: Revision::new(),
        }
    }

    fn run(&self, node: Ref) -> Interval {
        self.tree.item(node).run
    }

    /// The leftmost node with `last >= value`
    fn lower_bound(&self, value: i64) -> Option<Ref> {
        let mut found = None;
        let mut curr = self.tree.root();
        while let Some(node) = curr {
            if self.run(node).last() as i64 >= value {
                found = Some(node);
                curr = self.tree.child(node, LEFT);
            } else {
                curr = self.tree.child(node, RIGHT);
            }
        }
        found
    }

    /// The rightmost node with `first <= value`
    fn upper_bound(&self, value: i64) -> Option<Ref> {
        let mut found = None;
        let mut curr = self.tree.root();
        while let Some(node) = curr {
            if self.run(node).first() as i64 <= value {
                found = Some(node);
                curr = self.tree.child(node, RIGHT);
            } else {
                curr = self.tree.child(node, LEFT);
            }
        }
        found
    }

    /// Both boundary nodes of the span `[lo, hi]`, if any node lies in it
    fn span(&self, lo: i64, hi: i64) -> Option<(Ref, Ref)> {
        let left = self.lower_bound(lo)?;
        let right = self.upper_bound(hi)?;
        (self.run(left).first() <= self.run(right).first()).then_some((left, right))
    }

    fn insert_node(&mut self, run: Interval) {
        self.tree.insert_by(
            Run {
                run,
                size: run.len(),
            },
            |a, b| a.run.first().cmp(&b.run.first()),
        );
    }

    fn set_run(&mut self, node: Ref, run: Interval) {
        self.tree.item_mut(node).run = run;
        propagate(&mut self.tree, Some(node));
    }

    fn changed(&mut self, op: &'static str, run: Interval) {
        self.revision.bump();
        tracing::trace!(op, %run, runs = self.tree.len(), "range tree changed");
    }

    /// Checks every cached subtree size
    fn sizes_valid(&self) -> bool {
        self.tree.walk(Order::Post, false, None).all(|node| {
            let expected = self.run(node).len()
                + size_of(&self.tree, self.tree.child(node, LEFT))
                + size_of(&self.tree, self.tree.child(node, RIGHT));
            let cached = self.tree.item(node).size;
            if cached != expected {
                tracing::debug!(run = %self.run(node), cached, expected, "stale subtree size");
            }
            cached == expected
        })
    }
}

/// In-order iterator over the runs of a [RangeTree]
#[derive(Clone)]
pub struct TreeIter<'a> {
    tree: &'a Tree,
    next: Option<Ref>,
}

impl Iterator for TreeIter<'_> {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        let node = self.next?;
        self.next = self.tree.next(node, RIGHT);
        Some(self.tree.item(node).run)
    }
}

impl std::iter::FusedIterator for TreeIter<'_> {}

impl RangeContainer for RangeTree {
    type Ranges<'a> = TreeIter<'a>;

    fn ranges(&self) -> TreeIter<'_> {
        TreeIter {
            tree: &self.tree,
            next: self.tree.first(),
        }
    }

    fn ranges_from(&self, value: i32) -> TreeIter<'_> {
        TreeIter {
            tree: &self.tree,
            next: self.lower_bound(value as i64),
        }
    }

    fn add_interval(&mut self, run: Interval) {
        let Some((left, right)) = self.span(run.first() as i64 - 1, run.last() as i64 + 1) else {
            self.insert_node(run);
            self.changed("add", run);
            return;
        };
        let merged = Interval::new_unchecked(
            run.first().min(self.run(left).first()),
            run.last().max(self.run(right).last()),
        );
        if left == right && merged == self.run(left) {
            return;
        }
        if left != right {
            if let Some(next) = self.tree.next(left, RIGHT) {
                self.tree.delete_range(next, right);
            }
        }
        self.set_run(left, merged);
        self.changed("add", run);
    }

    fn remove_interval(&mut self, run: Interval) {
        let Some((left, right)) = self.span(run.first() as i64, run.last() as i64) else {
            return;
        };
        let (head, tail) = (self.run(left), self.run(right));
        let keep_head = head.first() < run.first();
        let keep_tail = tail.last() > run.last();

        if left == right {
            match (keep_head, keep_tail) {
                (false, false) => {
                    self.tree.delete(left);
                }
                (true, false) => {
                    self.set_run(left, Interval::new_unchecked(head.first(), run.first() - 1));
                }
                (false, true) => {
                    self.set_run(left, Interval::new_unchecked(run.last() + 1, head.last()));
                }
                (true, true) => {
                    self.set_run(left, Interval::new_unchecked(head.first(), run.first() - 1));
                    self.insert_node(Interval::new_unchecked(run.last() + 1, head.last()));
                }
            }
            self.changed("remove", run);
            return;
        }

        let from = if keep_head {
            self.tree.next(left, RIGHT)
        } else {
            Some(left)
        };
        let to = if keep_tail {
            self.tree.next(right, LEFT)
        } else {
            Some(right)
        };
        if let (Some(from), Some(to)) = (from, to) {
            // with both boundaries kept and nothing between them, from > to
            if !(keep_tail && from == right) {
                self.tree.delete_range(from, to);
            }
        }
        if keep_head {
            self.set_run(left, Interval::new_unchecked(head.first(), run.first() - 1));
        }
        if keep_tail {
            self.set_run(right, Interval::new_unchecked(run.last() + 1, tail.last()));
        }
        self.changed("remove", run);
    }

    fn range_count(&self) -> usize {
        self.tree.len()
    }

    fn revision(&self) -> &Revision {
        &self.revision
    }

    fn clear(&mut self) {
        if !self.tree.is_empty() {
            self.tree.clear();
            self.revision.bump();
        }
    }

    fn len(&self) -> usize {
        size_of(&self.tree, self.tree.root())
    }

    fn contains(&self, value: i32) -> bool {
        self.tree
            .search_by(|item| item.run.compare_value(value))
            .is_some()
    }

    fn last_value(&self) -> Result<i32, RangeError> {
        self.tree
            .last()
            .map(|node| self.run(node).last())
            .ok_or(RangeError::Empty)
    }

    /// Also checks the red-black properties and every subtree size
    fn is_valid(&self) -> bool {
        if !self.tree.is_valid() {
            tracing::debug!("red-black properties violated");
            return false;
        }
        is_canonical(self.ranges()) && self.sizes_valid()
    }
}

impl IndexedRangeContainer for RangeTree {
    fn get(&self, index: usize) -> Result<i32, RangeError> {
        let len = self.len();
        if index >= len {
            return Err(RangeError::out_of_bounds(index, len));
        }
        let mut rest = index;
        let mut curr = self.tree.root();
        while let Some(node) = curr {
            let left = size_of(&self.tree, self.tree.child(node, LEFT));
            if rest < left {
                curr = self.tree.child(node, LEFT);
                continue;
            }
            rest -= left;
            let run = self.run(node);
            if rest < run.len() {
                return Ok((run.first() as i64 + rest as i64) as i32);
            }
            rest -= run.len();
            curr = self.tree.child(node, RIGHT);
        }
        Err(RangeError::out_of_bounds(index, len))
    }

    fn index_of(&self, value: i32) -> Option<usize> {
        let mut rank = 0;
        let mut curr = self.tree.root();
        while let Some(node) = curr {
            let run = self.run(node);
            let left = self.tree.child(node, LEFT);
            match run.compare_value(value) {
                std::cmp::Ordering::Equal => {
                    return Some(rank + size_of(&self.tree, left) + (value as i64 - run.first() as i64) as usize);
                }
                std::cmp::Ordering::Less => {
                    rank += size_of(&self.tree, left) + run.len();
                    curr = self.tree.child(node, RIGHT);
                }
                std::cmp::Ordering::Greater => curr = left,
            }
        }
        None
    }
}

impl PartialEq for RangeTree {
    fn eq(&self, other: &Self) -> bool {
        self.ranges().eq(other.ranges())
    }
}

impl Eq for RangeTree {}

impl fmt::Debug for RangeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ranges()).finish()
    }
}

impl FromIterator<Interval> for RangeTree {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl Extend<Interval> for RangeTree {
    fn extend<I: IntoIterator<Item = Interval>>(&mut self, iter: I) {
        for run in iter {
            self.add_interval(run);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(pairs: &[(i32, i32)]) -> RangeTree {
        pairs
            .iter()
            .map(|&(first, last)| Interval::new(first, last).unwrap())
            .collect()
    }

    fn runs(tree: &RangeTree) -> Vec<(i32, i32)> {
        tree.ranges().map(|run| (run.first(), run.last())).collect()
    }

    #[test]
    fn test_order_statistics() {
        let rt = tree(&[(4, 6), (16, 23)]);
        assert_eq!(Ok(17), rt.get(4));
        assert_eq!(Some(4), rt.index_of(17));
        assert_eq!(None, rt.index_of(24));
        assert_eq!(None, rt.index_of(3));
        assert_eq!(Ok(4), rt.get(0));
        assert_eq!(Ok(23), rt.get(10));
        assert_eq!(Err(RangeError::out_of_bounds(11, 11)), rt.get(11));
        assert_eq!(11, rt.len());
    }

    #[test]
    fn test_add_spans() {
        let mut rt = RangeTree::new();
        rt.add_span(4, 3).unwrap();
        rt.add_span(12, 4).unwrap();
        assert_eq!(vec![(4, 6), (12, 15)], runs(&rt));
        rt.add_span(8, 3).unwrap();
        assert_eq!(vec![(4, 6), (8, 10), (12, 15)], runs(&rt));
        rt.add_span(5, 12).unwrap();
        assert_eq!(vec![(4, 16)], runs(&rt));
        assert_eq!(1, rt.range_count());
        assert!(rt.is_valid());
    }

    #[test]
    fn test_add_covered_is_noop() {
        let mut rt = tree(&[(1, 10), (20, 30)]);
        let generation = rt.generation();
        rt.add_range(3, 7).unwrap();
        rt.add_value(20);
        assert_eq!(generation, rt.generation());
        rt.remove_range(12, 18).unwrap();
        assert_eq!(generation, rt.generation());
    }

    #[test]
    fn test_remove() {
        let mut rt = tree(&[(4, 6), (11, 16), (26, 28), (32, 34)]);
        rt.remove_range(13, 16).unwrap();
        assert_eq!(vec![(4, 6), (11, 12), (26, 28), (32, 34)], runs(&rt));

        // split
        rt.remove_value(27);
        assert_eq!(vec![(4, 6), (11, 12), (26, 26), (28, 28), (32, 34)], runs(&rt));

        // across boundaries, keeping both ends
        rt.remove_range(5, 33).unwrap();
        assert_eq!(vec![(4, 4), (34, 34)], runs(&rt));
        assert!(rt.is_valid());

        rt.remove_range(i32::MIN, i32::MAX).unwrap();
        assert!(rt.is_empty());
        assert_eq!(0, rt.len());
        assert!(rt.is_valid());
    }

    #[test]
    fn test_remove_between_adjacent_boundaries() {
        let mut rt = tree(&[(0, 5), (10, 15)]);
        rt.remove_range(3, 12).unwrap();
        assert_eq!(vec![(0, 2), (13, 15)], runs(&rt));
        assert_eq!(6, rt.len());
        assert!(rt.is_valid());
    }

    #[test]
    fn test_sizes_survive_rebalancing() {
        let mut rt = RangeTree::new();
        for i in 0..500 {
            rt.add_range(i * 4, i * 4 + 1).unwrap();
        }
        assert!(rt.is_valid());
        for i in (0..500).step_by(3) {
            rt.remove_range(i * 4, i * 4 + 1).unwrap();
        }
        // bridge every remaining gap of 2 between runs 10 and 20
        rt.add_range(40, 81).unwrap();
        assert!(rt.is_valid());
        for (index, value) in rt.values().enumerate() {
            assert_eq!(Ok(value), rt.get(index));
            assert_eq!(Some(index), rt.index_of(value));
        }
    }

    #[test]
    fn test_ranges_from_and_extremes() {
        let mut rt = tree(&[(i32::MIN, -5), (0, 0), (7, i32::MAX)]);
        assert!(rt.is_valid());
        assert_eq!(Ok(i32::MIN), rt.first_value());
        assert_eq!(Ok(i32::MAX), rt.last_value());
        let from: Vec<_> = rt.ranges_from(-3).map(|run| run.first()).collect();
        assert_eq!(vec![0, 7], from);
        rt.add_range(-4, 6).unwrap();
        assert_eq!(vec![(i32::MIN, i32::MAX)], runs(&rt));
        assert!(rt.contains(12345));
    }

    #[test]
    fn test_with_capacity_and_contains() {
        let mut rt = RangeTree::with_capacity(16);
        assert!(rt.is_empty());
        assert!(!rt.contains(0));
        for i in 0..16 {
            rt.add_range(i * 10, i * 10 + 4).unwrap();
        }
        assert_eq!(16, rt.range_count());
        assert!(rt.contains(0));
        assert!(rt.contains(154));
        assert!(rt.contains(72));
        assert!(!rt.contains(75));
        assert!(!rt.contains(-1));
        assert!(!rt.contains(155));
        assert!(rt.is_valid());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut rt = tree(&[(1, 3)]);
        let copy = rt.clone();
        rt.add_value(10);
        assert_eq!(0, copy.generation());
        assert_eq!(vec![(1, 3)], runs(&copy));
        assert_ne!(rt, copy);
        assert_eq!("[Interval { first: 1, last: 3 }]", format!("{copy:?}"));
    }
}
