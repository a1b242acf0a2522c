// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Checked operations: validate, grow on demand, fail without side effects.

use core::ptr;

use crate::allocator::RawAllocator;
use crate::error::BufferError;
use crate::raw_buffer::RawBuffer;

impl<A> RawBuffer<A>
where
    A: RawAllocator,
{
    #[inline(always)]
    pub(crate) fn check_element(&self, element: &[u8]) -> Result<(), BufferError> {
        if element.len() != self.elem_size {
            return Err(BufferError::ElementSize {
                expected: self.elem_size,
                actual: element.len(),
            });
        }

        Ok(())
    }

    /// Validates a run of whole elements and returns how many it holds.
    #[inline(always)]
    pub(crate) fn check_elements(&self, src: &[u8]) -> Result<usize, BufferError> {
        if src.len() % self.elem_size != 0 {
            return Err(BufferError::ElementSize {
                expected: self.elem_size,
                actual: src.len(),
            });
        }

        Ok(src.len() / self.elem_size)
    }

    #[inline(always)]
    pub(crate) fn check_index(&self, index: usize) -> Result<(), BufferError> {
        if index >= self.len {
            return Err(BufferError::OutOfBounds {
                index,
                len: self.len,
            });
        }

        Ok(())
    }

    #[inline(always)]
    pub(crate) fn check_range(&self, start: usize, count: usize) -> Result<(), BufferError> {
        match start.checked_add(count) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(BufferError::InvalidRange {
                start,
                count,
                len: self.len,
            }),
        }
    }

    /// Appends a copy of `element` after the last element, growing if needed.
    ///
    /// May reallocate: interior pointers obtained before the call are invalid
    /// afterwards.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ElementSize`] if `element.len() != elem_size`
    /// - [`BufferError::AllocationFailure`] / [`BufferError::CapacityOverflow`]
    ///   if growing fails
    pub fn push(&mut self, element: &[u8]) -> Result<(), BufferError> {
        self.check_element(element)?;
        self.reserve(1)?;

        // SAFETY (PRECONDITIONS ARE MET): size checked, room for one more
        // element reserved above.
        unsafe { self.push_unchecked(element) };

        Ok(())
    }

    /// Removes the last element, running the destructor on it.
    ///
    /// Returns `false` (and does nothing) if the buffer is empty.
    pub fn pop(&mut self) -> bool {
        let Some(last) = self.len.checked_sub(1) else {
            return false;
        };

        self.remove_elements(last, 1);

        true
    }

    /// Inserts a copy of `element` before the element at `index`.
    ///
    /// Insertion only happens in front of an existing element, so `index`
    /// must be `< len` and an empty buffer always rejects it. To append, use
    /// [`push`](Self::push).
    ///
    /// # Errors
    ///
    /// - [`BufferError::ElementSize`] if `element.len() != elem_size`
    /// - [`BufferError::OutOfBounds`] if `index >= len`
    /// - [`BufferError::AllocationFailure`] / [`BufferError::CapacityOverflow`]
    ///   if growing fails
    pub fn insert(&mut self, index: usize, element: &[u8]) -> Result<(), BufferError> {
        self.check_element(element)?;
        self.check_index(index)?;
        self.reserve(1)?;

        // SAFETY (PRECONDITIONS ARE MET): index < len, one slot reserved.
        unsafe { self.insert_unchecked(index, element) };

        Ok(())
    }

    /// Inserts the whole elements of `src` at `index`, shifting the tail right.
    ///
    /// `index == len` appends. An empty `src` is a no-op.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ElementSize`] if `src.len()` is not a multiple of `elem_size`
    /// - [`BufferError::OutOfBounds`] if `index > len`
    /// - [`BufferError::AllocationFailure`] / [`BufferError::CapacityOverflow`]
    ///   if growing fails
    ///
    /// # Example
    ///
    /// ```rust
    /// use execbuf::{BufferError, RawBuffer};
    ///
    /// fn example() -> Result<(), BufferError> {
    ///     let mut buf = RawBuffer::new(1)?;
    ///     buf.copy_contiguous(0, b"held")?;
    ///     buf.copy_contiguous(2, b"llo wor")?;
    ///
    ///     assert_eq!(buf.as_bytes(), b"hello world");
    ///     Ok(())
    /// }
    /// # example().unwrap();
    /// ```
    pub fn copy_contiguous(&mut self, index: usize, src: &[u8]) -> Result<(), BufferError> {
        let count = self.check_elements(src)?;

        if index > self.len {
            return Err(BufferError::OutOfBounds {
                index,
                len: self.len,
            });
        }

        self.reserve(count)?;

        // SAFETY (PRECONDITIONS ARE MET): index <= len, `count` slots reserved.
        unsafe { self.copy_contiguous_unchecked(index, src) };

        Ok(())
    }

    /// Inserts a copy of `element` before the first element.
    ///
    /// Same contract as [`insert`](Self::insert) at index 0, so it fails on an
    /// empty buffer.
    pub fn push_front(&mut self, element: &[u8]) -> Result<(), BufferError> {
        self.insert(0, element)
    }

    /// Removes the first element, running the destructor on it.
    pub fn pop_front(&mut self) -> Result<(), BufferError> {
        self.remove(0)
    }

    /// Removes the element at `index`, running the destructor on it and
    /// shifting the tail left by one.
    ///
    /// # Errors
    ///
    /// [`BufferError::OutOfBounds`] if `index >= len`; nothing is removed.
    pub fn remove(&mut self, index: usize) -> Result<(), BufferError> {
        self.check_index(index)?;
        self.remove_elements(index, 1);

        Ok(())
    }

    /// Removes `count` elements starting at `start`.
    ///
    /// The destructor runs on exactly the removed elements, the remainder is
    /// shifted left and the length drops by `count`.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] if `start + count > len`; nothing is removed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use execbuf::{BufferError, RawBuffer};
    ///
    /// fn example() -> Result<(), BufferError> {
    ///     let mut buf = RawBuffer::new(1)?;
    ///     buf.copy_contiguous(0, b"0123456789")?;
    ///
    ///     buf.remove_range(2, 3)?;
    ///
    ///     assert_eq!(buf.as_bytes(), b"0156789");
    ///     Ok(())
    /// }
    /// # example().unwrap();
    /// ```
    pub fn remove_range(&mut self, start: usize, count: usize) -> Result<(), BufferError> {
        self.check_range(start, count)?;
        self.remove_elements(start, count);

        Ok(())
    }

    /// Removes the element at `index` without running the destructor.
    ///
    /// For callers that took ownership of the element's contents elsewhere.
    pub fn leak(&mut self, index: usize) -> Result<(), BufferError> {
        self.check_index(index)?;

        // SAFETY (PRECONDITIONS ARE MET): index < len.
        unsafe { self.leak_unchecked(index) };

        Ok(())
    }

    /// Removes `count` elements starting at `start` without running the
    /// destructor.
    pub fn leak_range(&mut self, start: usize, count: usize) -> Result<(), BufferError> {
        self.check_range(start, count)?;

        // SAFETY (PRECONDITIONS ARE MET): range checked above.
        unsafe { self.leak_range_unchecked(start, count) };

        Ok(())
    }

    /// Exchanges the contents of the elements at `a` and `b`.
    ///
    /// `a == b` leaves the element untouched.
    ///
    /// # Errors
    ///
    /// [`BufferError::OutOfBounds`] if either index is `>= len`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), BufferError> {
        self.check_index(a)?;
        self.check_index(b)?;

        if a == b {
            return Ok(());
        }

        // SAFETY (PRECONDITIONS ARE MET): both indices are live and distinct,
        // so the two `elem_size` spans do not overlap.
        unsafe {
            ptr::swap_nonoverlapping(self.elem_ptr(a), self.elem_ptr(b), self.elem_size);
        }

        Ok(())
    }
}
