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

use thiserror::Error;

/// Errors reported by range containers, run stores and cursors
///
/// Every fallible mutation validates its arguments before touching the
/// container, so an `Err` always leaves the container unchanged.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// A range whose `first` lies after its `last`
    #[error("invalid range: first {first} is greater than last {last}")]
    InvalidRange {
        /// Requested first value
        first: i64,
        /// Requested last value
        last: i64,
    },
    /// An index outside `0..len`
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Length at the time of the request
        len: usize,
    },
    /// A first/last value query on an empty container
    #[error("container is empty")]
    Empty,
    /// A cursor removal without a current run
    #[error("cursor has no current run")]
    NoCurrent,
    /// A cursor used after its container was modified elsewhere
    #[error("container was modified while a cursor was in use")]
    ConcurrentModification,
    /// A cursor used with a container other than the one that created it
    #[error("cursor belongs to a different container")]
    ForeignContainer,
}

impl RangeError {
    pub(crate) fn invalid(first: impl Into<i64>, last: impl Into<i64>) -> Self {
        RangeError::InvalidRange {
            first: first.into(),
            last: last.into(),
        }
    }

    pub(crate) fn out_of_bounds(index: usize, len: usize) -> Self {
        RangeError::IndexOutOfBounds { index, len }
    }
}
