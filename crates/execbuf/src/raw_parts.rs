// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Raw interop: adopting and handing out regions, direct writes into spare
//! capacity, pointer-to-index conversion.

use core::mem::{ManuallyDrop, MaybeUninit};
use core::ptr::{self, NonNull};
use core::slice;

use crate::allocator::RawAllocator;
use crate::raw_buffer::{Destructor, RawBuffer};

/// The pieces describing a buffer's storage, as moved across an ownership
/// boundary by [`RawBuffer::into_raw_parts`] and
/// [`RawBuffer::from_raw_parts`].
#[derive(Debug)]
pub struct RawParts<A>
where
    A: RawAllocator,
{
    /// Start of the region.
    pub ptr: NonNull<u8>,
    /// Bytes per element.
    pub elem_size: usize,
    /// Number of initialized elements at the start of the region.
    pub len: usize,
    /// Size of the region in bytes.
    pub capacity: usize,
    /// Per-element cleanup routine.
    pub destructor: Option<Destructor>,
    /// Allocator able to release the region.
    pub allocator: A,
}

impl<A> RawBuffer<A>
where
    A: RawAllocator,
{
    /// Builds a buffer directly over caller-supplied memory.
    ///
    /// Nothing is validated and nothing is allocated; the values are simply
    /// stored. The buffer takes ownership of the region and will eventually
    /// hand it back to `allocator` with `capacity` as size.
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    ///
    /// - `elem_size > 0` and `len * elem_size <= capacity`
    /// - `ptr` is valid for reads and writes of `capacity` bytes
    /// - the first `len * elem_size` bytes are initialized
    /// - `allocator.release(ptr, capacity)` is a correct way to free the region
    /// - nothing else owns or frees the region
    ///
    /// # Example
    ///
    /// ```rust
    /// use execbuf::{RawAllocator, RawBuffer, SystemAllocator};
    ///
    /// let region = SystemAllocator.allocate(8).expect("Failed to allocate(..)");
    /// unsafe { region.as_ptr().copy_from_nonoverlapping(b"abc".as_ptr(), 3) };
    ///
    /// let buf = unsafe { RawBuffer::from_raw_parts(SystemAllocator, region, 1, 3, 8, None) };
    ///
    /// assert_eq!(buf.as_bytes(), b"abc");
    /// assert_eq!(buf.capacity(), 8);
    /// ```
    pub unsafe fn from_raw_parts(
        allocator: A,
        ptr: NonNull<u8>,
        elem_size: usize,
        len: usize,
        capacity: usize,
        destructor: Option<Destructor>,
    ) -> Self {
        debug_assert!(elem_size > 0);
        debug_assert!(len * elem_size <= capacity);

        Self {
            ptr,
            elem_size,
            len,
            capacity,
            destructor,
            zeroize_on_realloc: false,
            allocator,
        }
    }

    /// Decomposes the buffer without releasing its region.
    ///
    /// The caller becomes responsible for the live elements and for releasing
    /// the region through a compatible allocator (for instance by passing the
    /// parts back to [`from_raw_parts`](Self::from_raw_parts)).
    pub fn into_raw_parts(self) -> RawParts<A> {
        let this = ManuallyDrop::new(self);

        RawParts {
            ptr: this.ptr,
            elem_size: this.elem_size,
            len: this.len,
            capacity: this.capacity,
            destructor: this.destructor,
            // SAFETY: `this` is never dropped, so the allocator is moved out
            // exactly once.
            allocator: unsafe { ptr::read(&this.allocator) },
        }
    }

    /// Returns a pointer to the first uninitialized element slot.
    ///
    /// Writing through it is only valid for [`spare_len`](Self::spare_len)
    /// elements. Pair with [`commit`](Self::commit) to make written elements
    /// live.
    #[inline(always)]
    pub fn spare_ptr(&mut self) -> *mut u8 {
        // SAFETY: len * elem_size <= capacity.
        unsafe { self.elem_ptr(self.len) }
    }

    /// Returns how many whole elements fit without growing.
    #[inline(always)]
    pub fn spare_len(&self) -> usize {
        self.spare_bytes() / self.elem_size
    }

    /// Returns how many reserved bytes are not occupied by live elements.
    #[inline(always)]
    pub fn spare_bytes(&self) -> usize {
        self.capacity - self.size_of()
    }

    /// Returns the reserved but uninitialized tail of the region.
    pub fn spare_capacity_mut(&mut self) -> &mut [MaybeUninit<u8>] {
        let spare = self.spare_bytes();

        // SAFETY: the tail `[size_of, capacity)` is inside the region and is
        // not aliased by any live element.
        unsafe { slice::from_raw_parts_mut(self.spare_ptr().cast(), spare) }
    }

    /// Marks `count` more elements as live without touching memory.
    ///
    /// # Safety
    ///
    /// - `(len + count) * elem_size <= capacity`
    /// - the `count` slots following the current last element were initialized
    #[inline(always)]
    pub unsafe fn commit(&mut self, count: usize) {
        debug_assert!((self.len + count) * self.elem_size <= self.capacity);

        self.len += count;
    }

    /// Returns the index of the element `element` points to.
    ///
    /// # Safety
    ///
    /// `element` must point into this buffer's region, at or after its start.
    /// Pointers into the middle of an element yield that element's index.
    #[inline(always)]
    pub unsafe fn element_offset(&self, element: *const u8) -> usize {
        // SAFETY (PRECONDITIONS ARE MET): both pointers belong to the same
        // allocation, delegated to caller.
        let bytes = unsafe { element.offset_from(self.ptr.as_ptr()) };

        debug_assert!(bytes >= 0);

        bytes as usize / self.elem_size
    }
}
