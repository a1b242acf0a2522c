// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Type-erased growable buffer with a pluggable allocator.
//!
//! [`RawBuffer`] owns a contiguous region of memory obtained from a
//! [`RawAllocator`], holds elements of a fixed runtime size, and tracks the
//! number of live elements separately from the reserved bytes.
//!
//! # Core Guarantees
//!
//! - **Invariant**: `len * elem_size <= capacity` after every operation
//! - **Failure atomicity**: a checked operation that returns an error leaves
//!   the buffer exactly as it was (including on allocation failure)
//! - **Pointer stability**: `*_unchecked` and `*_within_capacity` operations
//!   never reallocate; checked operations may, and invalidate every interior
//!   pointer when they do
//! - **Lifecycle**: an optional per-element [`Destructor`] runs on removal,
//!   clearing and release, never on the `leak*` family
//!
//! # Growth Policy
//!
//! Creating a buffer with a requested capacity of zero reserves
//! `MIN_CAPACITY * elem_size` bytes. Growing for `n` more elements reserves the
//! largest of the exact requirement, twice the current capacity and
//! `MIN_CAPACITY * elem_size`.
//!
//! # Example: Checked API
//!
//! ```rust
//! use execbuf::{BufferError, RawBuffer};
//!
//! fn example() -> Result<(), BufferError> {
//!     let mut buf = RawBuffer::new(2)?;
//!
//!     buf.push(b"cd")?;
//!     buf.push_front(b"ab")?;
//!     buf.copy_contiguous(2, b"efgh")?;
//!
//!     assert_eq!(buf.as_bytes(), b"abcdefgh");
//!
//!     buf.remove_range(1, 2)?;
//!     assert_eq!(buf.as_bytes(), b"abgh");
//!
//!     // Out of bounds: explicit error, nothing changes
//!     assert!(buf.remove(10).is_err());
//!     assert_eq!(buf.len(), 2);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! # Example: Filling Spare Capacity
//!
//! ```rust
//! use execbuf::{BufferError, RawBuffer};
//!
//! fn example() -> Result<(), BufferError> {
//!     let mut buf = RawBuffer::with_capacity(1, 16)?;
//!     let anchor = buf.as_ptr();
//!
//!     let written = {
//!         let spare = buf.spare_capacity_mut();
//!         for (slot, byte) in spare.iter_mut().zip(b"payload") {
//!             slot.write(*byte);
//!         }
//!         7
//!     };
//!
//!     // SAFETY: the first 7 spare bytes were just initialized.
//!     unsafe { buf.commit(written) };
//!
//!     buf.push_within_capacity(b"!")?;
//!
//!     assert_eq!(buf.as_bytes(), b"payload!");
//!     // Nothing above may reallocate.
//!     assert_eq!(buf.as_ptr(), anchor);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! # Test Utilities
//!
//! Enable the `test_utils` feature to get [`testing::TestAllocator`], which
//! records calls, injects failures and snapshots regions before release.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

extern crate alloc;

mod allocator;
mod checked;
mod error;
mod raw_buffer;
mod raw_parts;
mod typed;
mod unchecked;

#[cfg(any(test, feature = "test_utils"))]
pub mod testing;

#[cfg(test)]
mod tests;

pub use allocator::{BUFFER_ALIGN, RawAllocator, SystemAllocator};
pub use error::BufferError;
pub use raw_buffer::{Destructor, MIN_CAPACITY, RawBuffer};
pub use raw_parts::RawParts;
pub use typed::TypedBuffer;
