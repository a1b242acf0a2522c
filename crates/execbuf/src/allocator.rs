// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Pluggable allocation strategies for buffer storage.

use alloc::alloc::{Layout, alloc, dealloc};
use core::ptr::NonNull;

/// Alignment of every region handed out by [`SystemAllocator`].
///
/// Typed wrappers refuse element types with a stricter alignment.
pub const BUFFER_ALIGN: usize = 16;

/// Allocation capability injected into a buffer at creation.
///
/// A buffer only ever releases regions through the same allocator that
/// produced them (or that the caller vouched for via `from_raw_parts`), and
/// always passes back the exact size it was allocated with.
///
/// # Safety
///
/// Implementors must guarantee that every pointer returned by
/// [`allocate`](Self::allocate):
///
/// - is aligned to at least [`BUFFER_ALIGN`]
/// - is valid for reads and writes of `size` bytes until it is released
/// - does not overlap any other live region
/// - for `size == 0`, can be passed to [`release`](Self::release) with a size
///   of zero
///
/// Typed buffers write `T` values straight into these regions and rely on
/// the alignment.
pub unsafe trait RawAllocator {
    /// Allocates `size` bytes aligned to at least [`BUFFER_ALIGN`].
    ///
    /// Returns `None` on failure. A request for zero bytes must succeed with a
    /// pointer that can later be handed to [`release`](Self::release) with a
    /// size of zero.
    fn allocate(&self, size: usize) -> Option<NonNull<u8>>;

    /// Releases a region previously returned by [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    ///
    /// - `ptr` was produced by this allocator (or a compatible one)
    /// - `size` matches the size it was allocated with
    /// - the region is not used after this call
    unsafe fn release(&self, ptr: NonNull<u8>, size: usize);
}

// SAFETY: forwards to `A`, which upholds the contract.
unsafe impl<A> RawAllocator for &A
where
    A: RawAllocator + ?Sized,
{
    #[inline]
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        (**self).allocate(size)
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, size: usize) {
        // SAFETY: forwarded contract.
        unsafe { (**self).release(ptr, size) }
    }
}

/// Allocator backed by the global Rust allocator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SystemAllocator;

impl SystemAllocator {
    #[inline(always)]
    fn layout(size: usize) -> Option<Layout> {
        Layout::from_size_align(size, BUFFER_ALIGN).ok()
    }
}

// SAFETY: `Layout` with `BUFFER_ALIGN` alignment; zero-size requests get an
// aligned dangling pointer and releasing them is a no-op.
unsafe impl RawAllocator for SystemAllocator {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        if size == 0 {
            return Some(dangling());
        }

        let layout = Self::layout(size)?;

        // SAFETY: layout has a non-zero size.
        NonNull::new(unsafe { alloc(layout) })
    }

    unsafe fn release(&self, ptr: NonNull<u8>, size: usize) {
        if size == 0 {
            return;
        }

        if let Some(layout) = Self::layout(size) {
            // SAFETY (PRECONDITIONS ARE MET): caller guarantees `ptr` came from
            // `allocate(size)`, which used this exact layout.
            unsafe { dealloc(ptr.as_ptr(), layout) }
        }
    }
}

#[allow(dead_code)]
#[repr(align(16))]
struct MaxAligned([u8; BUFFER_ALIGN]);

/// Dangling pointer aligned to [`BUFFER_ALIGN`], used for empty regions.
#[inline(always)]
pub(crate) fn dangling() -> NonNull<u8> {
    NonNull::<MaxAligned>::dangling().cast()
}
