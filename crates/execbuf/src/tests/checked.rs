// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::testing::{TestAllocator, destroyed_u32};
use crate::{BufferError, RawBuffer};

use super::utils::{panicking_u32_buffer, u32_buffer, u32_values};

// =============================================================================
// push(), pop()
// =============================================================================

#[test]
fn test_push_then_pop_restores_previous_state() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 5);
    let before = buf.as_bytes().to_vec();

    buf.push(&77u32.to_ne_bytes()).expect("Failed to push(..)");
    assert!(buf.pop());

    assert_eq!(buf.len(), 5);
    assert_eq!(buf.as_bytes(), before);
}

#[test]
fn test_push_rejects_wrong_element_size() {
    let mut buf = RawBuffer::new(4).expect("Failed to new(..)");

    let result = buf.push(&[1, 2, 3]);

    assert_eq!(
        result,
        Err(BufferError::ElementSize {
            expected: 4,
            actual: 3
        })
    );
    assert!(buf.is_empty());
}

#[test]
fn test_pop_on_empty_is_noop() {
    let mut buf = RawBuffer::new(4).expect("Failed to new(..)");

    assert!(!buf.pop());
    assert!(buf.is_empty());
}

#[test]
fn test_pop_runs_destructor_on_last() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 3);
    destroyed_u32();

    buf.pop();

    assert_eq!(destroyed_u32(), [2]);
    assert_eq!(u32_values(&buf), [0, 1]);
}

// =============================================================================
// insert()
// =============================================================================

#[test]
fn test_insert_before_existing_element() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 4);

    buf.insert(1, &100u32.to_ne_bytes()).expect("Failed to insert(..)");

    assert_eq!(u32_values(&buf), [0, 100, 1, 2, 3]);
}

#[test]
fn test_insert_at_len_is_rejected() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 4);

    let result = buf.insert(4, &100u32.to_ne_bytes());

    assert_eq!(result, Err(BufferError::OutOfBounds { index: 4, len: 4 }));
    assert_eq!(u32_values(&buf), [0, 1, 2, 3]);
}

#[test]
fn test_insert_into_empty_is_rejected() {
    let mut buf = RawBuffer::new(1).expect("Failed to new(..)");

    assert!(buf.insert(0, b"x").is_err());
    assert!(buf.push_front(b"x").is_err());
    assert!(buf.is_empty());
}

#[test]
fn test_insert_grows_when_full() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 24);

    buf.insert(0, &500u32.to_ne_bytes()).expect("Failed to insert(..)");

    assert_eq!(buf.len(), 25);
    assert_eq!(buf.capacity(), 192);
    assert_eq!(u32_values(&buf)[..3], [500, 0, 1]);
    assert_eq!(u32_values(&buf)[24], 23);
}

#[test]
fn test_insert_then_remove_is_identity() {
    let mut buf = RawBuffer::new(3).expect("Failed to new(..)");
    buf.copy_contiguous(0, b"aaabbbcccddd").expect("Failed to copy_contiguous(..)");
    let original = buf.as_bytes().to_vec();

    for index in 0..buf.len() {
        buf.insert(index, b"zzz").expect("Failed to insert(..)");
        buf.remove(index).expect("Failed to remove(..)");

        assert_eq!(buf.as_bytes(), original);
    }
}

// =============================================================================
// copy_contiguous()
// =============================================================================

#[test]
fn test_copy_contiguous_in_the_middle() {
    let mut buf = RawBuffer::new(2).expect("Failed to new(..)");
    buf.copy_contiguous(0, b"aabb").expect("Failed to copy_contiguous(..)");

    buf.copy_contiguous(1, b"xxyyzz").expect("Failed to copy_contiguous(..)");

    assert_eq!(buf.as_bytes(), b"aaxxyyzzbb");
    assert_eq!(buf.len(), 5);
}

#[test]
fn test_copy_contiguous_at_end_appends() {
    let mut buf = RawBuffer::new(1).expect("Failed to new(..)");
    buf.copy_contiguous(0, b"abc").expect("Failed to copy_contiguous(..)");

    buf.copy_contiguous(3, b"def").expect("Failed to copy_contiguous(..)");

    assert_eq!(buf.as_bytes(), b"abcdef");
}

#[test]
fn test_copy_contiguous_past_end_is_rejected() {
    let mut buf = RawBuffer::new(1).expect("Failed to new(..)");
    buf.copy_contiguous(0, b"abc").expect("Failed to copy_contiguous(..)");

    let result = buf.copy_contiguous(4, b"d");

    assert_eq!(result, Err(BufferError::OutOfBounds { index: 4, len: 3 }));
    assert_eq!(buf.as_bytes(), b"abc");
}

#[test]
fn test_copy_contiguous_rejects_partial_elements() {
    let mut buf = RawBuffer::new(4).expect("Failed to new(..)");

    let result = buf.copy_contiguous(0, &[0; 6]);

    assert!(matches!(result, Err(BufferError::ElementSize { expected: 4, actual: 6 })));
    assert!(buf.is_empty());
}

#[test]
fn test_copy_contiguous_large_block_grows_once() {
    let allocator = TestAllocator::new();
    let mut buf = RawBuffer::with_capacity_in(&allocator, 1, 0).expect("Failed to with_capacity_in(..)");
    let block = vec![7u8; 1000];

    buf.copy_contiguous(0, &block).expect("Failed to copy_contiguous(..)");

    assert_eq!(allocator.allocations(), 2);
    assert_eq!(buf.capacity(), 1000);
    assert_eq!(buf.as_bytes(), &block[..]);
}

// =============================================================================
// push_front(), pop_front()
// =============================================================================

#[test]
fn test_push_front_and_pop_front() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 2);

    buf.push_front(&9u32.to_ne_bytes()).expect("Failed to push_front(..)");
    assert_eq!(u32_values(&buf), [9, 0, 1]);

    destroyed_u32();
    buf.pop_front().expect("Failed to pop_front()");

    assert_eq!(destroyed_u32(), [9]);
    assert_eq!(u32_values(&buf), [0, 1]);
}

#[test]
fn test_pop_front_on_empty_is_rejected() {
    let mut buf = RawBuffer::new(4).expect("Failed to new(..)");

    assert_eq!(buf.pop_front(), Err(BufferError::OutOfBounds { index: 0, len: 0 }));
}

// =============================================================================
// remove(), remove_range()
// =============================================================================

#[test]
fn test_remove_shifts_tail_and_destroys_element() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 5);
    destroyed_u32();

    buf.remove(1).expect("Failed to remove(..)");

    assert_eq!(u32_values(&buf), [0, 2, 3, 4]);
    assert_eq!(destroyed_u32(), [1]);
}

#[test]
fn test_remove_out_of_bounds_is_rejected() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 5);
    destroyed_u32();

    let result = buf.remove(5);

    assert_eq!(result, Err(BufferError::OutOfBounds { index: 5, len: 5 }));
    assert_eq!(buf.len(), 5);
    assert!(destroyed_u32().is_empty());
}

#[test]
fn test_remove_range_in_the_middle() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 10);
    destroyed_u32();

    buf.remove_range(2, 3).expect("Failed to remove_range(..)");

    assert_eq!(buf.len(), 7);
    assert_eq!(u32_values(&buf), [0, 1, 5, 6, 7, 8, 9]);
    assert_eq!(destroyed_u32(), [2, 3, 4]);
}

#[test]
fn test_remove_range_reaching_the_end() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 10);
    destroyed_u32();

    buf.remove_range(7, 3).expect("Failed to remove_range(..)");

    assert_eq!(u32_values(&buf), [0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(destroyed_u32(), [7, 8, 9]);
}

#[test]
fn test_remove_range_everything() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 4);
    destroyed_u32();

    buf.remove_range(0, 4).expect("Failed to remove_range(..)");

    assert!(buf.is_empty());
    assert_eq!(destroyed_u32(), [0, 1, 2, 3]);
}

#[test]
fn test_remove_range_empty_is_noop() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 4);
    destroyed_u32();

    buf.remove_range(4, 0).expect("Failed to remove_range(..)");

    assert_eq!(buf.len(), 4);
    assert!(destroyed_u32().is_empty());
}

#[test]
fn test_remove_range_out_of_bounds_is_rejected() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 10);
    destroyed_u32();

    assert_eq!(
        buf.remove_range(8, 3),
        Err(BufferError::InvalidRange {
            start: 8,
            count: 3,
            len: 10
        })
    );
    assert!(buf.remove_range(usize::MAX, 2).is_err());

    assert_eq!(buf.len(), 10);
    assert!(destroyed_u32().is_empty());
}

// =============================================================================
// leak(), leak_range()
// =============================================================================

#[test]
fn test_leak_skips_destructor() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 5);
    destroyed_u32();

    buf.leak(0).expect("Failed to leak(..)");

    assert_eq!(u32_values(&buf), [1, 2, 3, 4]);
    assert!(destroyed_u32().is_empty());
}

#[test]
fn test_leak_range_skips_destructor_and_shrinks_by_count() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 10);
    destroyed_u32();

    buf.leak_range(2, 3).expect("Failed to leak_range(..)");

    assert_eq!(buf.len(), 7);
    assert_eq!(u32_values(&buf), [0, 1, 5, 6, 7, 8, 9]);
    assert!(destroyed_u32().is_empty());
}

#[test]
fn test_leak_out_of_bounds_is_rejected() {
    let allocator = TestAllocator::new();
    let mut buf = u32_buffer(&allocator, 2);

    assert!(buf.leak(2).is_err());
    assert!(buf.leak_range(1, 2).is_err());
    assert_eq!(buf.len(), 2);
}

// =============================================================================
// swap()
// =============================================================================

#[test]
fn test_swap_distinct_elements() {
    let mut buf = RawBuffer::new(3).expect("Failed to new(..)");
    buf.copy_contiguous(0, b"abcdefghi").expect("Failed to copy_contiguous(..)");

    buf.swap(0, 2).expect("Failed to swap(..)");

    assert_eq!(buf.as_bytes(), b"ghidefabc");
}

#[test]
fn test_swap_same_index_keeps_element() {
    let mut buf = RawBuffer::new(4).expect("Failed to new(..)");
    buf.push(&0xCAFEBABEu32.to_ne_bytes()).expect("Failed to push(..)");
    buf.push(&0x12345678u32.to_ne_bytes()).expect("Failed to push(..)");

    for index in 0..2 {
        let before = buf.as_bytes().to_vec();
        buf.swap(index, index).expect("Failed to swap(..)");
        assert_eq!(buf.as_bytes(), before);
    }
}

#[test]
fn test_swap_out_of_bounds_is_rejected() {
    let mut buf = RawBuffer::new(1).expect("Failed to new(..)");
    buf.copy_contiguous(0, b"ab").expect("Failed to copy_contiguous(..)");

    assert_eq!(buf.swap(0, 2), Err(BufferError::OutOfBounds { index: 2, len: 2 }));
    assert_eq!(buf.as_bytes(), b"ab");
}

// =============================================================================
// Panicking destructors
// =============================================================================

#[test]
fn test_remove_range_with_panicking_destructor() {
    let allocator = TestAllocator::new();
    let mut buf = panicking_u32_buffer(&allocator, 6);
    destroyed_u32();

    let result = catch_unwind(AssertUnwindSafe(|| buf.remove_range(1, 3)));

    assert!(result.is_err());
    // Elements after the failing one are still destroyed, the gap is closed.
    assert_eq!(destroyed_u32(), [1, 2, 3]);
    assert_eq!(u32_values(&buf), [0, 4, 5]);

    drop(buf);

    assert_eq!(destroyed_u32(), [0, 4, 5]);
    assert_eq!(allocator.releases(), 1);
}

#[test]
fn test_remove_with_panicking_destructor() {
    let allocator = TestAllocator::new();
    let mut buf = panicking_u32_buffer(&allocator, 4);
    destroyed_u32();

    let result = catch_unwind(AssertUnwindSafe(|| buf.remove(2)));

    assert!(result.is_err());
    assert_eq!(destroyed_u32(), [2]);
    assert_eq!(u32_values(&buf), [0, 1, 3]);
}

#[test]
fn test_pop_with_panicking_destructor() {
    let allocator = TestAllocator::new();
    let mut buf = panicking_u32_buffer(&allocator, 3);
    destroyed_u32();

    let result = catch_unwind(AssertUnwindSafe(|| buf.pop()));

    assert!(result.is_err());
    assert_eq!(destroyed_u32(), [2]);
    assert_eq!(u32_values(&buf), [0, 1]);
}

#[test]
fn test_clear_with_panicking_destructor_destroys_each_once() {
    let allocator = TestAllocator::new();
    let mut buf = panicking_u32_buffer(&allocator, 5);
    destroyed_u32();

    let result = catch_unwind(AssertUnwindSafe(|| buf.clear()));

    assert!(result.is_err());
    assert!(buf.is_empty());
    assert_eq!(destroyed_u32(), [0, 1, 2, 3, 4]);

    drop(buf);

    assert!(destroyed_u32().is_empty());
    assert_eq!(allocator.releases(), 1);
}
