// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Statically-typed wrapper over the byte-erased core.

use core::marker::PhantomData;
use core::mem::{self, size_of};
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};
use core::slice;

use crate::allocator::{BUFFER_ALIGN, RawAllocator, SystemAllocator};
use crate::error::BufferError;
use crate::raw_buffer::{Destructor, RawBuffer};
use crate::raw_parts::RawParts;

unsafe fn drop_element<T>(element: NonNull<u8>) {
    // SAFETY: the buffer only hands out pointers to live, aligned `T` slots.
    unsafe { ptr::drop_in_place(element.cast::<T>().as_ptr()) }
}

/// A growable buffer of `T` sharing the growth policy of [`RawBuffer`].
///
/// The element size is `size_of::<T>()` and, when `T` needs dropping, the
/// per-element destructor is `T`'s drop glue. Values moved out with
/// [`pop`](Self::pop) or [`remove`](Self::remove) go through the leak path,
/// so they are never dropped twice.
///
/// `T` must not be zero-sized and its alignment must not exceed
/// [`BUFFER_ALIGN`]; both are rejected at compile time.
///
/// # Example
///
/// ```rust
/// use execbuf::{BufferError, TypedBuffer};
///
/// fn example() -> Result<(), BufferError> {
///     let mut names = TypedBuffer::<String>::new()?;
///
///     names.push("b".to_string())?;
///     names.insert(0, "a".to_string())?;
///
///     assert_eq!(names.as_slice(), ["a", "b"]);
///     assert_eq!(names.pop().as_deref(), Some("b"));
///     Ok(())
/// }
/// # example().unwrap();
/// ```
pub struct TypedBuffer<T, A = SystemAllocator>
where
    A: RawAllocator,
{
    raw: RawBuffer<A>,
    _marker: PhantomData<T>,
}

impl<T> TypedBuffer<T, SystemAllocator> {
    /// Creates an empty buffer with room for [`MIN_CAPACITY`](crate::MIN_CAPACITY) values.
    pub fn new() -> Result<Self, BufferError> {
        Self::with_capacity_in(SystemAllocator, 0)
    }

    /// Creates an empty buffer with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Result<Self, BufferError> {
        Self::with_capacity_in(SystemAllocator, capacity)
    }
}

impl<T, A> TypedBuffer<T, A>
where
    A: RawAllocator,
{
    const LAYOUT_CHECK: () = assert!(
        size_of::<T>() > 0 && mem::align_of::<T>() <= BUFFER_ALIGN,
        "TypedBuffer requires a sized, non-zero-sized T aligned to at most BUFFER_ALIGN"
    );

    /// Creates an empty buffer backed by `allocator`.
    pub fn new_in(allocator: A) -> Result<Self, BufferError> {
        Self::with_capacity_in(allocator, 0)
    }

    /// Creates an empty buffer backed by `allocator` with room for `capacity` values.
    pub fn with_capacity_in(allocator: A, capacity: usize) -> Result<Self, BufferError> {
        #[allow(clippy::let_unit_value)]
        let () = Self::LAYOUT_CHECK;

        let raw = if mem::needs_drop::<T>() {
            let destructor: Destructor = drop_element::<T>;

            // SAFETY (PRECONDITIONS ARE MET): elements only enter through this
            // wrapper as initialized `T` values, at offsets that are multiples of
            // size_of::<T>() from a BUFFER_ALIGN-aligned region, so every
            // element pointer is a live, aligned `T`.
            unsafe { RawBuffer::with_destructor_in(allocator, size_of::<T>(), capacity, destructor)? }
        } else {
            RawBuffer::with_capacity_in(allocator, size_of::<T>(), capacity)?
        };

        Ok(Self {
            raw,
            _marker: PhantomData,
        })
    }

    /// Returns the number of values.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the buffer holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns how many values fit without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity() / size_of::<T>()
    }

    /// Grows so that `additional` more values fit.
    pub fn reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        self.raw.reserve(additional)
    }

    /// Appends `value`, growing if needed.
    ///
    /// On error `value` is dropped and the buffer is unchanged.
    pub fn push(&mut self, value: T) -> Result<(), BufferError> {
        self.raw.reserve(1)?;

        // SAFETY (PRECONDITIONS ARE MET): one slot reserved above; the slot is
        // aligned for T because the region is BUFFER_ALIGN-aligned and every
        // slot offset is a multiple of size_of::<T>().
        unsafe {
            self.raw.spare_ptr().cast::<T>().write(value);
            self.raw.commit(1);
        }

        Ok(())
    }

    /// Appends `value` only if it fits in the current capacity.
    ///
    /// On error the value is handed back.
    pub fn push_within_capacity(&mut self, value: T) -> Result<(), T> {
        if self.raw.spare_len() == 0 {
            return Err(value);
        }

        // SAFETY (PRECONDITIONS ARE MET): at least one spare slot.
        unsafe {
            self.raw.spare_ptr().cast::<T>().write(value);
            self.raw.commit(1);
        }

        Ok(())
    }

    /// Removes and returns the last value.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.len().checked_sub(1)?;

        Some(self.take(last))
    }

    /// Inserts `value` before the value at `index`.
    ///
    /// # Errors
    ///
    /// [`BufferError::OutOfBounds`] if `index >= len`, or a growth failure.
    /// On error `value` is dropped and the buffer is unchanged.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), BufferError> {
        self.raw.check_index(index)?;
        self.raw.reserve(1)?;

        // SAFETY (PRECONDITIONS ARE MET): index < len and one slot reserved.
        unsafe {
            let at = self.raw.open_gap(index, 1);
            at.cast::<T>().write(value);
            self.raw.commit(1);
        }

        Ok(())
    }

    /// Removes and returns the value at `index`, shifting the tail left.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }

        Some(self.take(index))
    }

    /// Exchanges the values at `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), BufferError> {
        self.raw.check_index(a)?;
        self.raw.check_index(b)?;
        self.as_mut_slice().swap(a, b);

        Ok(())
    }

    /// Drops every value, keeping the capacity.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Reallocates to the live size when more than half the capacity is unused.
    pub fn shrink_to_fit(&mut self) -> Result<(), BufferError> {
        self.raw.shrink_to_fit()
    }

    /// Returns the values as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots hold initialized, aligned values.
        unsafe { slice::from_raw_parts(self.raw.as_ptr().cast::<T>(), self.len()) }
    }

    /// Returns the values as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len();

        // SAFETY: the first `len` slots hold initialized, aligned values.
        unsafe { slice::from_raw_parts_mut(self.raw.as_mut_ptr().cast::<T>(), len) }
    }

    /// Returns the byte-erased buffer, values and destructor included.
    ///
    /// Dropping the result still drops every `T`.
    pub fn into_raw(self) -> RawBuffer<A> {
        self.raw
    }

    /// Decomposes the buffer into its raw parts without dropping any value.
    pub fn into_raw_parts(self) -> RawParts<A> {
        self.raw.into_raw_parts()
    }

    /// Moves the value at `index` out and closes the gap without dropping it.
    fn take(&mut self, index: usize) -> T {
        debug_assert!(index < self.len());

        // SAFETY (PRECONDITIONS ARE MET): index < len; the slot is leaked right
        // after the read, so ownership moves to the caller exactly once.
        unsafe {
            let value = self.raw.elem_ptr(index).cast::<T>().read();
            self.raw.leak_unchecked(index);
            value
        }
    }
}

impl<T, A> Deref for TypedBuffer<T, A>
where
    A: RawAllocator,
{
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, A> DerefMut for TypedBuffer<T, A>
where
    A: RawAllocator,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, A> core::fmt::Debug for TypedBuffer<T, A>
where
    T: core::fmt::Debug,
    A: RawAllocator,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
