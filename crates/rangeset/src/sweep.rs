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

//! Lazy two-pointer sweeps over ascending, canonical run sequences.
//!
//! Every adaptor here consumes its inputs one run at a time and yields
//! canonical runs again, so results can be chained or collected straight
//! into any container.

use crate::interval::Interval;
use std::iter::{FusedIterator, Peekable};

/// Runs in either input, see [union]
pub struct Union<A: Iterator, B: Iterator> {
    a: Peekable<A>,
    b: Peekable<B>,
    pending: Option<Interval>,
}

/// Runs in both inputs, see [intersection]
pub struct Intersection<A: Iterator, B: Iterator> {
    a: Peekable<A>,
    b: Peekable<B>,
}

/// Runs in the first input but not the second, see [difference]
pub struct Difference<A, B: Iterator> {
    a: A,
    b: Peekable<B>,
    current: Option<Interval>,
}

/// Lazily merges two canonical run sequences into their union
pub fn union<A, B>(a: A, b: B) -> Union<A::IntoIter, B::IntoIter>
where
    A: IntoIterator<Item = Interval>,
    B: IntoIterator<Item = Interval>,
{
    Union {
        a: a.into_iter().peekable(),
        b: b.into_iter().peekable(),
        pending: None,
    }
}

/// Lazily yields the runs common to two canonical run sequences
pub fn intersection<A, B>(a: A, b: B) -> Intersection<A::IntoIter, B::IntoIter>
where
    A: IntoIterator<Item = Interval>,
    B: IntoIterator<Item = Interval>,
{
    Intersection {
        a: a.into_iter().peekable(),
        b: b.into_iter().peekable(),
    }
}

/// Lazily yields the runs of `a` with every run of `b` cut out
pub fn difference<A, B>(a: A, b: B) -> Difference<A::IntoIter, B::IntoIter>
where
    A: IntoIterator<Item = Interval>,
    B: IntoIterator<Item = Interval>,
{
    Difference {
        a: a.into_iter(),
        b: b.into_iter().peekable(),
        current: None,
    }
}

impl<A, B> Iterator for Union<A, B>
where
    A: Iterator<Item = Interval>,
    B: Iterator<Item = Interval>,
{
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        loop {
            let head = match (self.a.peek().copied(), self.b.peek().copied()) {
                (Some(x), Some(y)) if x.first() <= y.first() => self.a.next(),
                (Some(_), Some(_)) => self.b.next(),
                (Some(_), None) => self.a.next(),
                (None, Some(_)) => self.b.next(),
                (None, None) => None,
            };
            let Some(head) = head else {
                return self.pending.take();
            };
            match self.pending {
                None => self.pending = Some(head),
                Some(open) => match open.merge_with(&head) {
                    Some(merged) => self.pending = Some(merged),
                    None => {
                        self.pending = Some(head);
                        return Some(open);
                    }
                },
            }
        }
    }
}

impl<A, B> Iterator for Intersection<A, B>
where
    A: Iterator<Item = Interval>,
    B: Iterator<Item = Interval>,
{
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        loop {
            let x = self.a.peek().copied()?;
            let y = self.b.peek().copied()?;
            // the other head may still overlap what comes next
            if x.last() <= y.last() {
                self.a.next();
            } else {
                self.b.next();
            }
            if let Some(common) = x.intersect_with(&y) {
                return Some(common);
            }
        }
    }
}

impl<A, B> Iterator for Difference<A, B>
where
    A: Iterator<Item = Interval>,
    B: Iterator<Item = Interval>,
{
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        loop {
            let x = match self.current.take() {
                Some(x) => x,
                None => self.a.next()?,
            };
            let Some(y) = self.b.peek().copied() else {
                return Some(x);
            };
            if y.first() > x.last() {
                return Some(x);
            }
            if y.last() < x.first() {
                self.b.next();
                self.current = Some(x);
                continue;
            }
            let prefix = (x.first() < y.first())
                .then(|| Interval::new_unchecked(x.first(), y.first() - 1));
            if y.last() < x.last() {
                self.current = Some(Interval::new_unchecked(y.last() + 1, x.last()));
                self.b.next();
            }
            if prefix.is_some() {
                return prefix;
            }
        }
    }
}

/// Clips ascending runs to a window, stopping at the first run past it
pub struct Clamp<I> {
    inner: I,
    window: Interval,
}

impl<I: Iterator<Item = Interval>> Clamp<I> {
    /// Clips `inner`, which must be ascending, to `window`
    pub fn new(inner: I, window: Interval) -> Self {
        Self { inner, window }
    }
}

impl<I: Iterator<Item = Interval>> Iterator for Clamp<I> {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        loop {
            let run = self.inner.next()?;
            if run.first() > self.window.last() {
                return None;
            }
            if let Some(clipped) = run.intersect_with(&self.window) {
                return Some(clipped);
            }
        }
    }
}

/// The sub-runs of a window missing from ascending runs
///
/// Includes the gap before the first and after the last run that reach
/// into the window.
pub struct Gaps<I> {
    inner: I,
    next: i64,
    last: i64,
}

impl<I: Iterator<Item = Interval>> Gaps<I> {
    /// The parts of `window` that no run of `inner` covers
    pub fn new(inner: I, window: Interval) -> Self {
        Self {
            inner,
            next: window.first() as i64,
            last: window.last() as i64,
        }
    }
}

impl<I: Iterator<Item = Interval>> Iterator for Gaps<I> {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        while self.next <= self.last {
            let start = self.next;
            match self.inner.next() {
                Some(run) if (run.first() as i64) <= self.last => {
                    self.next = start.max(run.last() as i64 + 1);
                    if run.first() as i64 > start {
                        return Some(Interval::new_unchecked(start as i32, run.first() - 1));
                    }
                }
                _ => {
                    self.next = self.last + 1;
                    return Some(Interval::new_unchecked(start as i32, self.last as i32));
                }
            }
        }
        None
    }
}

impl<I: Iterator<Item = Interval>> FusedIterator for Gaps<I> {}

/// Expands runs into their member values
pub struct Values<I> {
    inner: I,
    next: i64,
    last: i64,
}

impl<I: Iterator<Item = Interval>> Values<I> {
    /// Expands the runs of `inner` in order
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            next: 1,
            last: 0,
        }
    }
}

impl<I: Iterator<Item = Interval>> Iterator for Values<I> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.next > self.last {
            let run = self.inner.next()?;
            self.next = run.first() as i64;
            self.last = run.last() as i64;
        }
        let value = self.next as i32;
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (runs, _) = self.inner.size_hint();
        let current = (self.last - self.next + 1).max(0) as usize;
        (current + runs, None)
    }
}
