// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Storage core: the buffer record, capacity bookkeeping and lifecycle.

use core::mem::MaybeUninit;
use core::ptr::{self, NonNull};
use core::slice::{self, ChunksExact};

use zeroize::Zeroize;

use crate::allocator::{RawAllocator, SystemAllocator};
use crate::error::BufferError;

/// Number of elements reserved when a buffer is created with a requested
/// capacity of zero, and the lower bound (in elements) applied when growing.
///
/// Always scaled by the element size before being compared with a capacity.
pub const MIN_CAPACITY: usize = 24;

/// Per-element cleanup routine.
///
/// Invoked with a pointer to the first byte of an element that is being
/// removed, cleared or released. The element is never observed again through
/// the buffer afterwards, even if the destructor panics.
///
/// Only installed through `unsafe` constructors
/// ([`RawBuffer::with_destructor_in`], [`RawBuffer::from_raw_parts`]).
pub type Destructor = unsafe fn(NonNull<u8>);

/// Type-erased growable buffer of fixed-size elements.
///
/// The buffer owns a region obtained from its [`RawAllocator`]. It tracks the
/// number of live elements (`len`) separately from the number of reserved
/// bytes (`capacity`), and always upholds `len * elem_size <= capacity`.
///
/// Two method families operate on the same storage:
///
/// - **checked** (`push`, `insert`, `copy_contiguous`, ...): validate their
///   arguments, grow the region when needed and return a [`BufferError`]
///   without side effects on failure. Any of them may reallocate, which
///   invalidates every pointer previously obtained into the buffer.
/// - **unchecked** (`*_unchecked`) and **guarded** (`*_within_capacity`):
///   never reallocate, so interior pointers stay valid across the call.
///
/// # Example
///
/// ```rust
/// use execbuf::{BufferError, RawBuffer};
///
/// fn example() -> Result<(), BufferError> {
///     let mut buf = RawBuffer::new(4)?;
///
///     buf.push(&1u32.to_ne_bytes())?;
///     buf.push(&3u32.to_ne_bytes())?;
///     buf.insert(1, &2u32.to_ne_bytes())?;
///
///     assert_eq!(buf.len(), 3);
///     assert_eq!(buf.get(1), Some(&2u32.to_ne_bytes()[..]));
///     Ok(())
/// }
/// # example().unwrap();
/// ```
pub struct RawBuffer<A = SystemAllocator>
where
    A: RawAllocator,
{
    pub(crate) ptr: NonNull<u8>,
    pub(crate) elem_size: usize,
    pub(crate) len: usize,
    pub(crate) capacity: usize,
    pub(crate) destructor: Option<Destructor>,
    pub(crate) zeroize_on_realloc: bool,
    pub(crate) allocator: A,
}

// Safety: the buffer exclusively owns its region; moving it to another thread
// moves that ownership along with the allocator.
unsafe impl<A> Send for RawBuffer<A> where A: RawAllocator + Send {}

impl RawBuffer<SystemAllocator> {
    /// Creates an empty buffer with room for [`MIN_CAPACITY`] elements.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ZeroElementSize`] if `elem_size == 0`
    /// - [`BufferError::AllocationFailure`] if the initial region cannot be allocated
    pub fn new(elem_size: usize) -> Result<Self, BufferError> {
        Self::new_in(SystemAllocator, elem_size)
    }

    /// Creates an empty buffer with room for `capacity` elements.
    ///
    /// A `capacity` of zero falls back to [`MIN_CAPACITY`].
    pub fn with_capacity(elem_size: usize, capacity: usize) -> Result<Self, BufferError> {
        Self::with_capacity_in(SystemAllocator, elem_size, capacity)
    }
}

impl<A> RawBuffer<A>
where
    A: RawAllocator,
{
    /// Creates an empty buffer backed by `allocator` with room for
    /// [`MIN_CAPACITY`] elements.
    pub fn new_in(allocator: A, elem_size: usize) -> Result<Self, BufferError> {
        Self::with_capacity_in(allocator, elem_size, 0)
    }

    /// Creates an empty buffer backed by `allocator`.
    ///
    /// Reserves `elem_size * capacity` bytes, or `elem_size * MIN_CAPACITY`
    /// when `capacity` is zero. The buffer has no destructor; see
    /// [`with_destructor_in`](Self::with_destructor_in).
    ///
    /// # Errors
    ///
    /// - [`BufferError::ZeroElementSize`] if `elem_size == 0`
    /// - [`BufferError::CapacityOverflow`] if the byte size overflows
    /// - [`BufferError::AllocationFailure`] if the allocator fails
    ///
    /// # Example
    ///
    /// ```rust
    /// use execbuf::{BufferError, RawBuffer, SystemAllocator};
    ///
    /// fn example() -> Result<(), BufferError> {
    ///     let buf = RawBuffer::with_capacity_in(SystemAllocator, 4, 0)?;
    ///
    ///     assert_eq!(buf.len(), 0);
    ///     assert_eq!(buf.capacity(), 4 * 24);
    ///     Ok(())
    /// }
    /// # example().unwrap();
    /// ```
    pub fn with_capacity_in(allocator: A, elem_size: usize, capacity: usize) -> Result<Self, BufferError> {
        Self::init(allocator, elem_size, capacity, None)
    }

    /// Like [`with_capacity_in`](Self::with_capacity_in), with a per-element
    /// `destructor` that runs on every element that is removed, cleared or
    /// released (but not leaked).
    ///
    /// # Safety
    ///
    /// `destructor` must be sound to call, once, on a pointer to any
    /// `elem_size`-byte element this buffer will ever hold, including
    /// elements written through the safe API (`push`, `insert`,
    /// `copy_contiguous`, `as_bytes_mut`, ...). The pointer is only aligned
    /// to `elem_size` multiples of the region start.
    ///
    /// # Errors
    ///
    /// Same as [`with_capacity_in`](Self::with_capacity_in).
    pub unsafe fn with_destructor_in(
        allocator: A,
        elem_size: usize,
        capacity: usize,
        destructor: Destructor,
    ) -> Result<Self, BufferError> {
        Self::init(allocator, elem_size, capacity, Some(destructor))
    }

    fn init(
        allocator: A,
        elem_size: usize,
        capacity: usize,
        destructor: Option<Destructor>,
    ) -> Result<Self, BufferError> {
        if elem_size == 0 {
            return Err(BufferError::ZeroElementSize);
        }

        let elements = if capacity == 0 { MIN_CAPACITY } else { capacity };
        let bytes = elements
            .checked_mul(elem_size)
            .ok_or(BufferError::CapacityOverflow)?;

        let Some(ptr) = allocator.allocate(bytes) else {
            log::debug!("execbuf: initial allocation of {bytes} bytes failed");
            return Err(BufferError::AllocationFailure { requested: bytes });
        };

        Ok(Self {
            ptr,
            elem_size,
            len: 0,
            capacity: bytes,
            destructor,
            zeroize_on_realloc: false,
            allocator,
        })
    }

    /// Returns the number of live elements.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer holds no elements.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if another element cannot be added without growing.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.capacity - self.size_of() < self.elem_size
    }

    /// Returns the number of bytes per element.
    #[inline(always)]
    pub fn elem_size(&self) -> usize {
        self.elem_size
    }

    /// Returns the number of reserved bytes.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of bytes occupied by live elements.
    #[inline(always)]
    pub fn size_of(&self) -> usize {
        self.len * self.elem_size
    }

    /// Returns `true` if a per-element destructor was configured.
    #[inline(always)]
    pub fn has_destructor(&self) -> bool {
        self.destructor.is_some()
    }

    /// Returns the allocator backing this buffer.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Zero-fill the old region before releasing it on every reallocation.
    ///
    /// Off by default. Intended for buffers that carry sensitive payloads and
    /// must not leave stale copies behind when they grow or shrink.
    pub fn set_zeroize_on_realloc(&mut self, enabled: bool) {
        self.zeroize_on_realloc = enabled;
    }

    /// Returns a pointer to the start of the region.
    ///
    /// Invalidated by any operation that may reallocate.
    #[inline(always)]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Returns a mutable pointer to the start of the region.
    ///
    /// Invalidated by any operation that may reallocate.
    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Returns the live elements as one contiguous byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the first `size_of()` bytes are initialized live elements.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.size_of()) }
    }

    /// Returns the live elements as one contiguous mutable byte slice.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: the first `size_of()` bytes are initialized live elements.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size_of()) }
    }

    /// Returns the bytes of the element at `index`, or `None` if out of bounds.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index >= self.len {
            return None;
        }

        // SAFETY: index < len.
        Some(unsafe { self.get_unchecked(index) })
    }

    /// Returns the mutable bytes of the element at `index`, or `None` if out of bounds.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= self.len {
            return None;
        }

        let elem_size = self.elem_size;

        // SAFETY: index < len, so the element lies inside the live region.
        Some(unsafe { slice::from_raw_parts_mut(self.elem_ptr(index), elem_size) })
    }

    /// Returns the first element, or `None` if empty.
    pub fn first(&self) -> Option<&[u8]> {
        self.get(0)
    }

    /// Returns the last element, or `None` if empty.
    pub fn last(&self) -> Option<&[u8]> {
        self.get(self.len.checked_sub(1)?)
    }

    /// Iterates over the live elements, one `elem_size` chunk at a time.
    pub fn iter(&self) -> ChunksExact<'_, u8> {
        self.as_bytes().chunks_exact(self.elem_size)
    }

    /// Grows the region so that `additional` more elements fit.
    ///
    /// Does nothing when the current capacity already covers
    /// `(len + additional) * elem_size`. Otherwise the new capacity is the
    /// largest of the required size, twice the current capacity and
    /// `MIN_CAPACITY * elem_size`.
    ///
    /// # Errors
    ///
    /// - [`BufferError::CapacityOverflow`] if the required size overflows
    /// - [`BufferError::AllocationFailure`] if the allocator fails; the buffer
    ///   is left untouched
    pub fn reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        let required = self.required_bytes(additional)?;

        if required <= self.capacity {
            return Ok(());
        }

        let doubled = self.capacity.saturating_mul(2).max(self.min_capacity_bytes());

        self.realloc(required.max(doubled))
    }

    /// Grows the region to exactly fit `additional` more elements.
    ///
    /// Like [`reserve`](Self::reserve) but without headroom. Never truncates:
    /// if the capacity already suffices the buffer is left unchanged.
    pub fn reserve_exact(&mut self, additional: usize) -> Result<(), BufferError> {
        let required = self.required_bytes(additional)?;

        if required <= self.capacity {
            return Ok(());
        }

        self.realloc(required)
    }

    /// Reallocates to exactly the live size when more than half of the
    /// capacity is unused.
    ///
    /// A buffer with zero capacity, or one that is already tight enough, is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// [`BufferError::AllocationFailure`] if the allocator fails; the buffer is
    /// left untouched.
    pub fn shrink_to_fit(&mut self) -> Result<(), BufferError> {
        if self.capacity == 0 {
            return Ok(());
        }

        let size = self.size_of();

        if size < self.capacity / 2 {
            self.realloc(size)?;
        }

        Ok(())
    }

    /// Runs the destructor on every live element and resets the length.
    ///
    /// The capacity is left unchanged.
    pub fn clear(&mut self) {
        self.remove_elements(0, self.len);
    }

    /// Releases the buffer: destructors run on every live element, then the
    /// region goes back to the allocator.
    ///
    /// Equivalent to dropping the buffer.
    pub fn release(self) {
        drop(self);
    }

    /// Releases the buffer after zero-filling every reserved byte.
    ///
    /// Destructors run first, then the whole region (`capacity` bytes, not
    /// only the live ones) is zeroized before being returned to the allocator.
    pub fn release_zeroized(mut self) {
        self.clear();
        self.zeroize_reserved();
        drop(self);
    }

    #[inline(always)]
    fn min_capacity_bytes(&self) -> usize {
        MIN_CAPACITY.saturating_mul(self.elem_size)
    }

    /// `(len + additional) * elem_size`, checked.
    #[inline(always)]
    pub(crate) fn required_bytes(&self, additional: usize) -> Result<usize, BufferError> {
        self.len
            .checked_add(additional)
            .and_then(|elements| elements.checked_mul(self.elem_size))
            .ok_or(BufferError::CapacityOverflow)
    }

    /// Pointer to the element slot at `index`.
    ///
    /// # Safety
    ///
    /// `index * elem_size` must not exceed `capacity`.
    #[inline(always)]
    pub(crate) unsafe fn elem_ptr(&self, index: usize) -> *mut u8 {
        debug_assert!(index * self.elem_size <= self.capacity);

        // SAFETY (PRECONDITIONS ARE MET): offset stays within the region.
        unsafe { self.ptr.as_ptr().add(index * self.elem_size) }
    }

    /// Removes elements `[start, start + count)`: runs the destructor, if
    /// any, on each of them, shifts the tail left and reduces `len` by `count`.
    ///
    /// If a destructor panics, the remaining elements of the range are still
    /// destroyed and the buffer is left consistent with the range removed.
    pub(crate) fn remove_elements(&mut self, start: usize, count: usize) {
        debug_assert!(start + count <= self.len);

        let Some(destructor) = self.destructor else {
            // SAFETY (PRECONDITIONS ARE MET): range lies inside the live elements.
            unsafe { self.leak_range_unchecked(start, count) };
            return;
        };

        let mut guard = RemoveGuard {
            tail: self.len - start - count,
            end: start + count,
            next: start,
            start,
            destructor,
            buf: self,
        };

        // The destroyed range no longer counts as live while destructors run.
        guard.buf.len = start;
        guard.destroy_remaining();
    }

    fn reserved_mut(&mut self) -> &mut [MaybeUninit<u8>] {
        // SAFETY: the region is valid for `capacity` bytes; MaybeUninit makes
        // no claim about their contents.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr().cast(), self.capacity) }
    }

    fn zeroize_reserved(&mut self) {
        if self.capacity > 0 {
            self.reserved_mut().zeroize();
        }
    }

    /// Moves the live bytes into a fresh region of exactly `new_capacity`
    /// bytes and releases the old one.
    ///
    /// On allocation failure nothing changes.
    #[cold]
    #[inline(never)]
    fn realloc(&mut self, new_capacity: usize) -> Result<(), BufferError> {
        let live = self.size_of();
        debug_assert!(live <= new_capacity);

        let Some(new_ptr) = self.allocator.allocate(new_capacity) else {
            log::debug!(
                "execbuf: reallocation {} -> {new_capacity} bytes failed, buffer unchanged",
                self.capacity
            );
            return Err(BufferError::AllocationFailure {
                requested: new_capacity,
            });
        };

        // SAFETY (PRECONDITIONS ARE MET): both regions hold at least `live`
        // bytes and come from distinct allocations.
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), live);
        }

        if self.zeroize_on_realloc {
            self.zeroize_reserved();
        }

        // SAFETY: the old region came from this allocator with this size.
        unsafe { self.allocator.release(self.ptr, self.capacity) };

        log::trace!(
            "execbuf: reallocated {} -> {new_capacity} bytes ({} live)",
            self.capacity,
            live
        );

        self.ptr = new_ptr;
        self.capacity = new_capacity;

        Ok(())
    }
}

/// Destroys a range of elements and closes the gap, also during unwinding.
struct RemoveGuard<'a, A>
where
    A: RawAllocator,
{
    buf: &'a mut RawBuffer<A>,
    destructor: Destructor,
    start: usize,
    next: usize,
    end: usize,
    tail: usize,
}

impl<A> RemoveGuard<'_, A>
where
    A: RawAllocator,
{
    fn destroy_remaining(&mut self) {
        while self.next < self.end {
            let index = self.next;
            self.next += 1;

            // SAFETY: `index` lies in the range being removed, which was live
            // and is visited exactly once.
            unsafe {
                let element = NonNull::new_unchecked(self.buf.elem_ptr(index));
                (self.destructor)(element);
            }
        }
    }
}

impl<A> Drop for RemoveGuard<'_, A>
where
    A: RawAllocator,
{
    fn drop(&mut self) {
        // Only does work when a destructor panicked.
        self.destroy_remaining();

        // SAFETY: `[end, end + tail)` held the live tail before the removal;
        // `ptr::copy` handles the overlap.
        unsafe {
            ptr::copy(
                self.buf.elem_ptr(self.end),
                self.buf.elem_ptr(self.start),
                self.tail * self.buf.elem_size,
            );
        }

        self.buf.len = self.start + self.tail;
    }
}

impl<A> Drop for RawBuffer<A>
where
    A: RawAllocator,
{
    fn drop(&mut self) {
        self.clear();

        // SAFETY: the region was obtained from (or vouched for with) this
        // allocator with exactly `capacity` bytes.
        unsafe { self.allocator.release(self.ptr, self.capacity) };
    }
}

impl<A> core::fmt::Debug for RawBuffer<A>
where
    A: RawAllocator,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawBuffer")
            .field("elem_size", &self.elem_size)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("has_destructor", &self.has_destructor())
            .finish_non_exhaustive()
    }
}
