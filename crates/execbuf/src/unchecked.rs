// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Non-reallocating operations.
//!
//! `*_unchecked` methods trust the caller completely: preconditions are only
//! verified by debug assertions. `*_within_capacity` methods verify bounds and
//! capacity, and fail with [`BufferError::CapacityExceeded`] instead of growing.
//!
//! Neither family ever reallocates, so pointers obtained into the buffer
//! before the call stay valid.

use core::ptr;
use core::slice;

use crate::allocator::RawAllocator;
use crate::error::BufferError;
use crate::raw_buffer::RawBuffer;

impl<A> RawBuffer<A>
where
    A: RawAllocator,
{
    /// Fails unless `additional` more elements fit in the current capacity.
    #[inline(always)]
    fn check_spare(&self, additional: usize) -> Result<(), BufferError> {
        let required = self.required_bytes(additional)?;

        if required > self.capacity {
            return Err(BufferError::CapacityExceeded {
                required,
                capacity: self.capacity,
            });
        }

        Ok(())
    }

    /// Shifts `[index, len)` right by `count` slots, opening a gap.
    ///
    /// The length is not updated.
    ///
    /// # Safety
    ///
    /// `index <= len` and `(len + count) * elem_size <= capacity`.
    #[inline(always)]
    pub(crate) unsafe fn open_gap(&mut self, index: usize, count: usize) -> *mut u8 {
        debug_assert!(index <= self.len);
        debug_assert!((self.len + count) * self.elem_size <= self.capacity);

        // SAFETY (PRECONDITIONS ARE MET): source and destination both lie
        // inside the reserved region; `ptr::copy` handles the overlap.
        unsafe {
            let at = self.elem_ptr(index);

            if index < self.len {
                ptr::copy(
                    at,
                    self.elem_ptr(index + count),
                    (self.len - index) * self.elem_size,
                );
            }

            at
        }
    }

    /// Returns the bytes of the element at `index` without bounds checks.
    ///
    /// # Safety
    ///
    /// `index < len`.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, index: usize) -> &[u8] {
        debug_assert!(index < self.len);

        // SAFETY (PRECONDITIONS ARE MET): index < len.
        unsafe { slice::from_raw_parts(self.elem_ptr(index), self.elem_size) }
    }

    /// Appends `element` without checking size or capacity.
    ///
    /// # Safety
    ///
    /// - `element.len() == elem_size`
    /// - `(len + 1) * elem_size <= capacity`
    #[inline(always)]
    pub unsafe fn push_unchecked(&mut self, element: &[u8]) {
        debug_assert_eq!(element.len(), self.elem_size);

        // SAFETY (PRECONDITIONS ARE MET): room for one element, delegated to caller.
        unsafe {
            let at = self.open_gap(self.len, 1);
            ptr::copy_nonoverlapping(element.as_ptr(), at, self.elem_size);
            self.commit(1);
        }
    }

    /// Appends `element` if it fits in the current capacity.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ElementSize`] if `element.len() != elem_size`
    /// - [`BufferError::CapacityExceeded`] if the buffer is full
    pub fn push_within_capacity(&mut self, element: &[u8]) -> Result<(), BufferError> {
        self.check_element(element)?;
        self.check_spare(1)?;

        // SAFETY (PRECONDITIONS ARE MET): both checked above.
        unsafe { self.push_unchecked(element) };

        Ok(())
    }

    /// Inserts `element` before the element at `index` without any checks.
    ///
    /// # Safety
    ///
    /// - `element.len() == elem_size`
    /// - `index < len`
    /// - `(len + 1) * elem_size <= capacity`
    #[inline(always)]
    pub unsafe fn insert_unchecked(&mut self, index: usize, element: &[u8]) {
        debug_assert_eq!(element.len(), self.elem_size);
        debug_assert!(index < self.len);

        // SAFETY (PRECONDITIONS ARE MET): delegated to caller.
        unsafe {
            let at = self.open_gap(index, 1);
            ptr::copy_nonoverlapping(element.as_ptr(), at, self.elem_size);
            self.commit(1);
        }
    }

    /// Inserts `element` before the element at `index` if it fits in the
    /// current capacity.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ElementSize`] if `element.len() != elem_size`
    /// - [`BufferError::OutOfBounds`] if `index >= len`
    /// - [`BufferError::CapacityExceeded`] if the buffer is full
    pub fn insert_within_capacity(&mut self, index: usize, element: &[u8]) -> Result<(), BufferError> {
        self.check_element(element)?;
        self.check_index(index)?;
        self.check_spare(1)?;

        // SAFETY (PRECONDITIONS ARE MET): all checked above.
        unsafe { self.insert_unchecked(index, element) };

        Ok(())
    }

    /// Inserts the elements of `src` at `index` without any checks.
    ///
    /// # Safety
    ///
    /// - `src.len()` is a multiple of `elem_size`
    /// - `index <= len`
    /// - `len * elem_size + src.len() <= capacity`
    pub unsafe fn copy_contiguous_unchecked(&mut self, index: usize, src: &[u8]) {
        debug_assert_eq!(src.len() % self.elem_size, 0);

        let count = src.len() / self.elem_size;

        // SAFETY (PRECONDITIONS ARE MET): delegated to caller.
        unsafe {
            let at = self.open_gap(index, count);
            ptr::copy_nonoverlapping(src.as_ptr(), at, src.len());
            self.commit(count);
        }
    }

    /// Inserts the elements of `src` at `index` if they fit in the current
    /// capacity.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ElementSize`] if `src.len()` is not a multiple of `elem_size`
    /// - [`BufferError::OutOfBounds`] if `index > len`
    /// - [`BufferError::CapacityExceeded`] if the elements do not fit
    pub fn copy_contiguous_within_capacity(&mut self, index: usize, src: &[u8]) -> Result<(), BufferError> {
        let count = self.check_elements(src)?;

        if index > self.len {
            return Err(BufferError::OutOfBounds {
                index,
                len: self.len,
            });
        }

        self.check_spare(count)?;

        // SAFETY (PRECONDITIONS ARE MET): all checked above.
        unsafe { self.copy_contiguous_unchecked(index, src) };

        Ok(())
    }

    /// Inserts `element` before the first element without any checks.
    ///
    /// # Safety
    ///
    /// Same as [`insert_unchecked`](Self::insert_unchecked) at index 0; in
    /// particular the buffer must not be empty.
    #[inline(always)]
    pub unsafe fn push_front_unchecked(&mut self, element: &[u8]) {
        // SAFETY: delegated to caller.
        unsafe { self.insert_unchecked(0, element) }
    }

    /// Inserts `element` before the first element if it fits in the current
    /// capacity.
    pub fn push_front_within_capacity(&mut self, element: &[u8]) -> Result<(), BufferError> {
        self.insert_within_capacity(0, element)
    }

    /// Removes the element at `index` without running the destructor and
    /// without bounds checks.
    ///
    /// # Safety
    ///
    /// `index < len`.
    #[inline(always)]
    pub unsafe fn leak_unchecked(&mut self, index: usize) {
        // SAFETY: delegated to caller.
        unsafe { self.leak_range_unchecked(index, 1) }
    }

    /// Removes `count` elements starting at `start` without running the
    /// destructor and without bounds checks.
    ///
    /// # Safety
    ///
    /// `start + count <= len`.
    pub unsafe fn leak_range_unchecked(&mut self, start: usize, count: usize) {
        debug_assert!(start + count <= self.len);

        let end = start + count;

        // SAFETY (PRECONDITIONS ARE MET): `[end, len)` and `[start, ..)` lie in
        // the live region; `ptr::copy` handles the overlap.
        unsafe {
            ptr::copy(
                self.elem_ptr(end),
                self.elem_ptr(start),
                (self.len - end) * self.elem_size,
            );
        }

        self.len -= count;
    }
}
