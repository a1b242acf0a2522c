// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Instrumented allocator and recording destructors for tests.
//!
//! Only available with the `test_utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! execbuf = { version = "*", features = ["test_utils"] }
//! ```

extern crate std;

use core::cell::{Cell, RefCell};
use core::ptr::NonNull;
use std::vec::Vec;

use crate::allocator::{RawAllocator, SystemAllocator};

/// Byte pattern written over every fresh allocation.
///
/// Makes spare capacity initialized (and recognizably non-zero), so that
/// snapshots taken at release time are well defined.
pub const POISON: u8 = 0xA5;

/// One call observed by [`TestAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocEvent {
    /// A successful `allocate`.
    Allocate {
        /// Address of the region.
        addr: usize,
        /// Size of the region in bytes.
        size: usize,
    },
    /// A rejected `allocate`.
    Failed {
        /// Size that was requested.
        size: usize,
    },
    /// A `release`.
    Release {
        /// Address of the region.
        addr: usize,
        /// Size passed back by the caller.
        size: usize,
    },
}

/// Failure injection for [`TestAllocator`].
///
/// The behaviour is sticky: once set it stays active until changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TestAllocatorBehaviour {
    /// Normal behaviour, no injected failures.
    #[default]
    None,
    /// Every `allocate` call fails.
    FailAtAllocate,
    /// The next `n` allocations succeed, every later one fails.
    FailAfter(usize),
}

/// Allocator that records every call, can inject failures, and snapshots
/// each region right before releasing it.
///
/// Backed by [`SystemAllocator`]. Uses interior mutability, so share it by
/// reference: `RawBuffer::with_capacity_in(&allocator, ...)`.
#[derive(Debug, Default)]
pub struct TestAllocator {
    behaviour: Cell<TestAllocatorBehaviour>,
    succeeded: Cell<usize>,
    events: RefCell<Vec<AllocEvent>>,
    released: RefCell<Vec<Vec<u8>>>,
}

impl TestAllocator {
    /// Creates an allocator with no injected failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes the failure injection behaviour.
    pub fn change_behaviour(&self, behaviour: TestAllocatorBehaviour) {
        self.behaviour.set(behaviour);
        self.succeeded.set(0);
    }

    /// Returns every recorded call, in order.
    pub fn events(&self) -> Vec<AllocEvent> {
        self.events.borrow().clone()
    }

    /// Returns the number of successful allocations.
    pub fn allocations(&self) -> usize {
        self.count(|e| matches!(e, AllocEvent::Allocate { .. }))
    }

    /// Returns the number of rejected allocations.
    pub fn failures(&self) -> usize {
        self.count(|e| matches!(e, AllocEvent::Failed { .. }))
    }

    /// Returns the number of releases.
    pub fn releases(&self) -> usize {
        self.count(|e| matches!(e, AllocEvent::Release { .. }))
    }

    /// Returns the contents of every released region, captured right before
    /// it was freed.
    pub fn released_contents(&self) -> Vec<Vec<u8>> {
        self.released.borrow().clone()
    }

    fn count(&self, predicate: impl Fn(&AllocEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| predicate(e)).count()
    }

    fn should_fail(&self) -> bool {
        match self.behaviour.get() {
            TestAllocatorBehaviour::None => false,
            TestAllocatorBehaviour::FailAtAllocate => true,
            TestAllocatorBehaviour::FailAfter(n) => self.succeeded.get() >= n,
        }
    }
}

// SAFETY: every region comes straight from `SystemAllocator`.
unsafe impl RawAllocator for TestAllocator {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        if self.should_fail() {
            self.events.borrow_mut().push(AllocEvent::Failed { size });
            return None;
        }

        let ptr = SystemAllocator.allocate(size)?;

        // SAFETY: fresh region of `size` bytes.
        unsafe { ptr.as_ptr().write_bytes(POISON, size) };

        self.succeeded.set(self.succeeded.get() + 1);
        self.events.borrow_mut().push(AllocEvent::Allocate {
            addr: ptr.as_ptr() as usize,
            size,
        });

        Some(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, size: usize) {
        // SAFETY: caller guarantees the region holds `size` bytes; every byte
        // was initialized by POISON at allocation or written since.
        let contents = unsafe { core::slice::from_raw_parts(ptr.as_ptr(), size) }.to_vec();

        self.released.borrow_mut().push(contents);
        self.events.borrow_mut().push(AllocEvent::Release {
            addr: ptr.as_ptr() as usize,
            size,
        });

        // SAFETY: forwarded contract.
        unsafe { SystemAllocator.release(ptr, size) };
    }
}

std::thread_local! {
    static DESTROYED: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
}

/// Destructor for 4-byte elements that records each destroyed value.
///
/// Records are kept per thread; read them with [`destroyed_u32`].
///
/// # Safety
///
/// `element` must point to 4 readable bytes.
pub unsafe fn record_u32(element: NonNull<u8>) {
    // SAFETY: delegated to caller.
    let value = unsafe { element.cast::<u32>().as_ptr().read_unaligned() };

    DESTROYED.with(|d| d.borrow_mut().push(value));
}

/// Returns and clears the values recorded by [`record_u32`] on this thread.
pub fn destroyed_u32() -> Vec<u32> {
    DESTROYED.with(|d| core::mem::take(&mut *d.borrow_mut()))
}
