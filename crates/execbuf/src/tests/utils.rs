// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Shared helpers for execbuf tests.

use core::ptr::NonNull;

use crate::testing::{TestAllocator, record_u32};
use crate::{RawAllocator, RawBuffer};

/// Value whose destruction panics in [`panicking_u32_buffer`].
pub const FAILING_VALUE: u32 = 2;

/// Buffer of 4-byte elements holding `0..count`, with the recording destructor.
pub fn u32_buffer(allocator: &TestAllocator, count: u32) -> RawBuffer<&TestAllocator> {
    // SAFETY: every element pushed below is 4 bytes wide.
    let mut buf = unsafe { RawBuffer::with_destructor_in(allocator, 4, 0, record_u32) }
        .expect("Failed to with_destructor_in(..)");

    for value in 0..count {
        buf.push(&value.to_ne_bytes()).expect("Failed to push(..)");
    }

    buf
}

/// Decodes every element of a 4-byte buffer.
pub fn u32_values<A: RawAllocator>(buf: &RawBuffer<A>) -> Vec<u32> {
    buf.iter()
        .map(|chunk| u32::from_ne_bytes(chunk.try_into().expect("Failed to convert chunk")))
        .collect()
}

/// Records the element like [`record_u32`], then panics on [`FAILING_VALUE`].
///
/// # Safety
///
/// `element` must point to 4 readable bytes.
pub unsafe fn record_then_fail(element: NonNull<u8>) {
    // SAFETY: delegated to caller.
    let value = unsafe {
        record_u32(element);
        element.cast::<u32>().as_ptr().read_unaligned()
    };

    if value == FAILING_VALUE {
        panic!("destructor failed on {value}");
    }
}

/// Like [`u32_buffer`], with a destructor that panics on [`FAILING_VALUE`].
pub fn panicking_u32_buffer(allocator: &TestAllocator, count: u32) -> RawBuffer<&TestAllocator> {
    // SAFETY: every element pushed below is 4 bytes wide.
    let mut buf = unsafe { RawBuffer::with_destructor_in(allocator, 4, 0, record_then_fail) }
        .expect("Failed to with_destructor_in(..)");

    for value in 0..count {
        buf.push(&value.to_ne_bytes()).expect("Failed to push(..)");
    }

    buf
}
