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

//! This crate contains integer sets stored as canonical runs of
//! consecutive values, backed by packed arrays or by a red-black tree.
//!
//! All containers implement [RangeContainer]; the ones with order
//! statistics also implement [IndexedRangeContainer].
#![doc = include_str!("../README.md")]

#![warn(missing_docs)]

/// The error type shared by every fallible operation
pub mod error;
/// Closed `i32` intervals
pub mod interval;
/// Traits shared by all containers, plus a detached cursor.
pub mod container;
/// The storage contract of the array-backed containers.
pub mod store;
/// Lazy set algebra over ascending run iterators.
pub mod sweep;

/// Contains a run set over a packed array.
#[cfg(feature = "range-list")]
pub mod range_list;
/// Contains an array-backed run set with order statistics.
#[cfg(feature = "indexed-range-list")]
pub mod indexed_range_list;
/// Contains a run set over a size-augmented red-black tree.
#[cfg(feature = "range-tree")]
pub mod range_tree;

/// Contains a basic red-black tree implementation based on slab.
mod rb_base;

pub use container::{Cursor, IndexedRangeContainer, RangeContainer, Revision};
pub use error::RangeError;
pub use interval::Interval;
#[cfg(feature = "indexed-range-list")]
pub use indexed_range_list::IndexedRangeList;
#[cfg(feature = "range-list")]
pub use range_list::RangeList;
#[cfg(feature = "range-tree")]
pub use range_tree::RangeTree;

#[cfg(all(test, feature = "range-list", feature = "indexed-range-list", feature = "range-tree"))]
mod container_test;
