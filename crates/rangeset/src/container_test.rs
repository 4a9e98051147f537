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

use crate::container::{IndexedRangeContainer, RangeContainer};
use crate::error::RangeError;
use crate::interval::Interval;
use crate::{IndexedRangeList, RangeList, RangeTree};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

/// Plain value set that every container is checked against
#[derive(Default, Debug)]
pub struct Model(BTreeSet<i32>);

impl Model {
    pub fn add(&mut self, run: Interval) {
        self.0.extend(run.to_range());
    }

    pub fn remove(&mut self, run: Interval) {
        for value in run.to_range() {
            self.0.remove(&value);
        }
    }

    pub fn runs(&self) -> Vec<Interval> {
        let mut runs: Vec<Interval> = Vec::new();
        for &value in &self.0 {
            match runs.last_mut() {
                Some(run) if run.last() as i64 + 1 == value as i64 => {
                    *run = Interval::new(run.first(), value).unwrap();
                }
                _ => runs.push(Interval::single(value)),
            }
        }
        runs
    }
}

const EXTENT: i32 = 600;

fn random_run(rng: &mut ChaCha8Rng) -> Interval {
    let first = rng.random_range(-EXTENT..EXTENT);
    let len = rng.random_range(0..40);
    Interval::new(first, first + len).unwrap()
}

fn from_pairs<C: RangeContainer + Default>(pairs: &[(i32, i32)]) -> C {
    let mut container = C::default();
    for &(first, last) in pairs {
        container.add_range(first, last).unwrap();
    }
    container
}

fn pairs<C: RangeContainer>(container: &C) -> Vec<(i32, i32)> {
    container.ranges().map(|run| (run.first(), run.last())).collect()
}

fn random_container<C: RangeContainer + Default>(rng: &mut ChaCha8Rng, model: &mut Model, ops: usize) -> C {
    let mut container = C::default();
    for _ in 0..ops {
        let run = random_run(rng);
        if rng.random_bool(0.7) {
            container.add_interval(run);
            model.add(run);
        } else {
            container.remove_interval(run);
            model.remove(run);
        }
    }
    container
}

fn assert_matches<C: RangeContainer>(container: &C, model: &Model) {
    assert_eq!(model.runs(), container.to_vec());
    assert_eq!(model.0.len(), container.len());
    assert!(container.is_valid());
}

fn assert_indexed<C: IndexedRangeContainer>(container: &C, model: &Model) {
    for (index, &value) in model.0.iter().enumerate() {
        assert_eq!(Ok(value), container.get(index));
        assert_eq!(Some(index), container.index_of(value));
    }
    let len = model.0.len();
    assert_eq!(Err(RangeError::out_of_bounds(len, len)), container.get(len));
}

#[test]
fn test_random_ops_match_model() {
    for seed in 0..4 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut model = Model::default();
        let mut list = RangeList::new();
        let mut indexed = IndexedRangeList::new();
        let mut tree = RangeTree::new();
        for step in 0..2000 {
            let run = random_run(&mut rng);
            let value = rng.random_range(-EXTENT..EXTENT);
            match rng.random_range(0..10) {
                0..=5 => {
                    model.add(run);
                    list.add_interval(run);
                    indexed.add_interval(run);
                    tree.add_interval(run);
                }
                6..=8 => {
                    model.remove(run);
                    list.remove_interval(run);
                    indexed.remove_interval(run);
                    tree.remove_interval(run);
                }
                _ => {
                    model.remove(Interval::single(value));
                    list.remove_value(value);
                    indexed.remove_value(value);
                    tree.remove_value(value);
                }
            }
            let expected = model.runs();
            assert_eq!(expected, list.to_vec());
            assert_eq!(expected, indexed.to_vec());
            assert_eq!(expected, tree.to_vec());
            let member = model.0.contains(&value);
            assert_eq!(member, list.contains(value));
            assert_eq!(member, indexed.contains(value));
            assert_eq!(member, tree.contains(value));
            if step % 100 == 0 {
                assert_matches(&list, &model);
                assert_matches(&indexed, &model);
                assert_matches(&tree, &model);
            }
        }
    }
}

#[test]
fn test_order_statistics_round_trip() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut model = Model::default();
    let mut indexed = IndexedRangeList::new();
    let mut tree = RangeTree::new();
    for _ in 0..300 {
        let run = random_run(&mut rng);
        if rng.random_bool(0.6) {
            model.add(run);
            indexed.add_interval(run);
            tree.add_interval(run);
        } else {
            model.remove(run);
            indexed.remove_interval(run);
            tree.remove_interval(run);
        }
    }
    assert_indexed(&indexed, &model);
    assert_indexed(&tree, &model);
    for value in -EXTENT..EXTENT {
        if !model.0.contains(&value) {
            assert_eq!(None, indexed.index_of(value));
            assert_eq!(None, tree.index_of(value));
        }
    }
}

#[test]
fn test_set_algebra_across_types() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..20 {
        let mut x_model = Model::default();
        let mut y_model = Model::default();
        let x: RangeList = random_container(&mut rng, &mut x_model, 60);
        let y: RangeTree = random_container(&mut rng, &mut y_model, 60);

        let union = x.union(&y);
        let intersection = x.intersect(&y);
        let remainder = x.remainder(&y);
        for value in -EXTENT..EXTENT + 40 {
            let (in_x, in_y) = (x_model.0.contains(&value), y_model.0.contains(&value));
            assert_eq!(in_x || in_y, union.contains(value));
            assert_eq!(in_x && in_y, intersection.contains(value));
            assert_eq!(in_x && !in_y, remainder.contains(value));
        }
        assert!(union.is_valid());
        assert!(intersection.is_valid());
        assert!(remainder.is_valid());

        assert_eq!(union.to_vec(), y.union(&x).to_vec());
        assert_eq!(intersection.to_vec(), y.intersect(&x).to_vec());
        assert!(x.remainder(&x).is_empty());
        assert!(y.remainder(&y).is_empty());

        let indexed: IndexedRangeList = x.ranges().collect();
        assert_eq!(x.to_vec(), indexed.union(&x).to_vec());
    }
}

fn check_scenarios<C: RangeContainer + Default>() {
    let mut c = C::default();
    c.add_span(4, 3).unwrap();
    c.add_span(12, 4).unwrap();
    assert_eq!(vec![(4, 6), (12, 15)], pairs(&c));
    c.add_span(5, 12).unwrap();
    assert_eq!(vec![(4, 16)], pairs(&c));

    let mut c: C = from_pairs(&[(4, 6), (12, 15)]);
    c.add_span(8, 3).unwrap();
    assert_eq!(vec![(4, 6), (8, 10), (12, 15)], pairs(&c));

    let x: C = from_pairs(&[(1, 3), (5, 10), (13, 24)]);
    let y: C = from_pairs(&[(2, 13), (15, 100)]);
    assert_eq!(vec![(2, 3), (5, 10), (13, 13), (15, 24)], pairs(&x.intersect(&y)));
    assert_eq!(vec![(1, 100)], pairs(&x.union(&y)));
    assert_eq!(vec![(1, 1), (14, 14)], pairs(&x.remainder(&y)));

    let mut c: C = from_pairs(&[(4, 6), (11, 16), (26, 28), (32, 34)]);
    c.remove_range(13, 16).unwrap();
    assert_eq!(vec![(4, 6), (11, 12), (26, 28), (32, 34)], pairs(&c));
    assert!(c.is_valid());
}

#[test]
fn test_scenarios() {
    check_scenarios::<RangeList>();
    check_scenarios::<IndexedRangeList>();
    check_scenarios::<RangeTree>();
}

fn check_idempotence<C: RangeContainer + Default>() {
    let mut c: C = from_pairs(&[(0, 9), (20, 29)]);
    let generation = c.generation();
    c.add_range(2, 8).unwrap();
    c.add_value(20);
    c.remove_range(10, 19).unwrap();
    c.remove_value(-1);
    assert_eq!(generation, c.generation());
    assert_eq!(vec![(0, 9), (20, 29)], pairs(&c));

    assert_eq!(Err(RangeError::invalid(5, 4)), c.add_range(5, 4));
    assert_eq!(Err(RangeError::invalid(5, 4)), c.remove_range(5, 4));
    assert_eq!(generation, c.generation());
}

#[test]
fn test_idempotence() {
    check_idempotence::<RangeList>();
    check_idempotence::<IndexedRangeList>();
    check_idempotence::<RangeTree>();
}

fn check_cursor<C: RangeContainer + Default>() {
    let mut c: C = from_pairs(&[(0, 1), (3, 4), (6, 7), (9, 10)]);
    let mut cursor = c.cursor();
    assert_eq!(Err(RangeError::NoCurrent), cursor.remove(&mut c));
    let mut removed = Vec::new();
    while let Some(run) = cursor.next(&c).unwrap() {
        if run.first() % 2 == 0 {
            removed.push(cursor.remove(&mut c).unwrap().first());
        }
    }
    assert_eq!(vec![0, 6], removed);
    assert_eq!(vec![(3, 4), (9, 10)], pairs(&c));
    assert_eq!(Ok(None), cursor.next(&c));

    let mut stale = c.cursor();
    c.add_value(100);
    assert_eq!(Err(RangeError::ConcurrentModification), stale.next(&c));

    // same contents and generation, different instance
    let first: C = from_pairs(&[(1, 2)]);
    let second: C = from_pairs(&[(1, 2)]);
    assert_eq!(first.generation(), second.generation());
    let mut cursor = first.cursor();
    assert_eq!(Err(RangeError::ForeignContainer), cursor.next(&second));
    assert_eq!(Ok(Some(Interval::new(1, 2).unwrap())), cursor.next(&first));
}

#[test]
fn test_cursor() {
    check_cursor::<RangeList>();
    check_cursor::<IndexedRangeList>();
    check_cursor::<RangeTree>();
}

#[test]
fn test_cursor_rejects_other_containers() {
    let list: RangeList = from_pairs(&[(1, 2)]);
    let mut tree: RangeTree = from_pairs(&[(5, 6)]);
    assert_eq!(list.generation(), tree.generation());
    let mut cursor = list.cursor();
    assert_eq!(Err(RangeError::ForeignContainer), cursor.next(&tree));
    assert_eq!(Err(RangeError::ForeignContainer), cursor.remove(&mut tree));
    assert_eq!(vec![(5, 6)], pairs(&tree));

    let copy = list.clone();
    assert_eq!(0, copy.generation());
    assert_eq!(Err(RangeError::ForeignContainer), cursor.next(&copy));
    assert_eq!(Ok(Some(Interval::new(1, 2).unwrap())), cursor.next(&list));
}

#[test]
fn test_windows_match_model() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut model = Model::default();
    let tree: RangeTree = random_container(&mut rng, &mut model, 80);
    let list: RangeList = tree.ranges().collect();
    for _ in 0..50 {
        let lo = rng.random_range(-EXTENT..EXTENT);
        let hi = rng.random_range(lo..EXTENT + 40);
        let inside: Vec<i32> = model.0.range(lo..=hi).copied().collect();
        let outside: Vec<i32> = (lo..=hi).filter(|v| !model.0.contains(v)).collect();
        assert_eq!(inside, tree.values_in(lo, hi).unwrap().collect::<Vec<_>>());
        assert_eq!(inside, list.values_in(lo, hi).unwrap().collect::<Vec<_>>());
        assert_eq!(outside, tree.vacuum(lo, hi).unwrap().collect::<Vec<_>>());
        assert_eq!(outside, list.vacuum(lo, hi).unwrap().collect::<Vec<_>>());
    }
    assert!(tree.values_in(1, 0).is_err());
    assert!(list.vacuum_ranges(1, 0).is_err());
}
