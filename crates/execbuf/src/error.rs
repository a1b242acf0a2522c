// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for execbuf.

use thiserror::Error;

/// Error type for [`RawBuffer`](crate::RawBuffer) and
/// [`TypedBuffer`](crate::TypedBuffer) operations.
///
/// Every checked operation that returns one of these leaves the buffer exactly
/// as it was before the call.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum BufferError {
    /// A buffer was created with an element size of zero.
    #[error("element size must be greater than zero")]
    ZeroElementSize,

    /// The allocator could not provide the requested region.
    #[error("allocation of {requested} bytes failed")]
    AllocationFailure {
        /// Number of bytes that were requested from the allocator.
        requested: usize,
    },

    /// Integer overflow while computing a byte size.
    ///
    /// Only reachable with element counts approaching `usize::MAX / elem_size`.
    #[error("capacity overflow: requested size exceeds usize::MAX")]
    CapacityOverflow,

    /// An index falls outside the live elements.
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds {
        /// The offending index.
        index: usize,
        /// The buffer length at the time of the call.
        len: usize,
    },

    /// A `(start, count)` range does not fit inside the live elements.
    #[error("range {start}..{start}+{count} out of bounds for length {len}")]
    InvalidRange {
        /// First index of the range.
        start: usize,
        /// Number of elements in the range.
        count: usize,
        /// The buffer length at the time of the call.
        len: usize,
    },

    /// The element bytes handed in do not match the buffer's element size.
    #[error("element size mismatch: expected a multiple of {expected} bytes, got {actual}")]
    ElementSize {
        /// The buffer's element size.
        expected: usize,
        /// Length of the slice that was provided.
        actual: usize,
    },

    /// A non-growing operation needed more room than the current capacity.
    #[error("capacity exceeded: {required} bytes required, {capacity} reserved")]
    CapacityExceeded {
        /// Bytes the operation would have needed.
        required: usize,
        /// Bytes currently reserved.
        capacity: usize,
    },
}
