// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::fs::File;
use std::os::fd::AsFd;

use execbuf::testing::{TestAllocator, TestAllocatorBehaviour};
use execbuf::{BufferError, RawBuffer};

use super::utils::{image_file, payload};
use crate::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_SIZE, ReadConfig, ReadError, read_fd_to_buffer};

fn read_all(bytes: &[u8], config: &ReadConfig) -> Result<RawBuffer, ReadError> {
    let tmp = image_file(bytes);
    let file = File::open(tmp.path()).expect("Failed to open(..)");
    let mut buf = RawBuffer::with_capacity(1, 2048).expect("Failed to with_capacity(..)");

    read_fd_to_buffer(file.as_fd(), &mut buf, config)?;

    Ok(buf)
}

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn test_default_config() {
    let config = ReadConfig::default();

    assert_eq!(config.chunk_size, 16 * 1024);
    assert_eq!(config.max_size, 3_000_000);
    assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    assert_eq!(config.max_size, DEFAULT_MAX_SIZE);
}

// =============================================================================
// read_fd_to_buffer()
// =============================================================================

#[test]
fn test_read_empty_input() {
    let buf = read_all(b"", &ReadConfig::default()).expect("Failed to read_all(..)");

    assert!(buf.is_empty());
}

#[test]
fn test_read_spans_many_chunks() {
    let bytes = payload(100_000);
    let config = ReadConfig {
        chunk_size: 4096,
        ..ReadConfig::default()
    };

    let buf = read_all(&bytes, &config).expect("Failed to read_all(..)");

    assert_eq!(buf.as_bytes(), bytes);
}

#[test]
fn test_read_returns_appended_count() {
    let tmp = image_file(b"tail");
    let file = File::open(tmp.path()).expect("Failed to open(..)");
    let mut buf = RawBuffer::new(1).expect("Failed to new(..)");
    buf.copy_contiguous(0, b"head-").expect("Failed to copy_contiguous(..)");

    let count = read_fd_to_buffer(file.as_fd(), &mut buf, &ReadConfig::default())
        .expect("Failed to read_fd_to_buffer(..)");

    assert_eq!(count, 4);
    assert_eq!(buf.as_bytes(), b"head-tail");
}

#[test]
fn test_read_exactly_max_size_succeeds() {
    let bytes = payload(1000);
    let config = ReadConfig {
        chunk_size: 256,
        max_size: 1000,
    };

    let buf = read_all(&bytes, &config).expect("Failed to read_all(..)");

    assert_eq!(buf.len(), 1000);
}

#[test]
fn test_read_one_past_max_size_fails() {
    let bytes = payload(1001);
    let config = ReadConfig {
        chunk_size: 256,
        max_size: 1000,
    };

    let result = read_all(&bytes, &config);

    assert!(matches!(result, Err(ReadError::Oversize { max_size: 1000 })));
}

#[test]
fn test_read_oversize_with_large_chunks() {
    let bytes = payload(10_000);
    let config = ReadConfig {
        chunk_size: DEFAULT_CHUNK_SIZE,
        max_size: 5000,
    };

    assert!(matches!(read_all(&bytes, &config), Err(ReadError::Oversize { .. })));
}

#[test]
fn test_read_zero_chunk_size_still_progresses() {
    let config = ReadConfig {
        chunk_size: 0,
        max_size: 64,
    };

    let buf = read_all(b"slow", &config).expect("Failed to read_all(..)");

    assert_eq!(buf.as_bytes(), b"slow");
}

#[test]
fn test_read_rejects_wide_elements() {
    let tmp = image_file(b"abcd");
    let file = File::open(tmp.path()).expect("Failed to open(..)");
    let mut buf = RawBuffer::new(4).expect("Failed to new(..)");

    let result = read_fd_to_buffer(file.as_fd(), &mut buf, &ReadConfig::default());

    assert!(matches!(result, Err(ReadError::ElementSize { elem_size: 4 })));
    assert!(buf.is_empty());
}

#[test]
fn test_read_reports_io_errors() {
    let dir = tempfile::tempdir().expect("Failed to tempdir()");
    let file = File::open(dir.path()).expect("Failed to open(..)");
    let mut buf = RawBuffer::new(1).expect("Failed to new(..)");

    let result = read_fd_to_buffer(file.as_fd(), &mut buf, &ReadConfig::default());

    assert!(matches!(result, Err(ReadError::Io(_))));
}

#[test]
fn test_read_reports_growth_failure() {
    let allocator = TestAllocator::new();
    let tmp = image_file(&payload(100));
    let file = File::open(tmp.path()).expect("Failed to open(..)");
    let mut buf = RawBuffer::with_capacity_in(&allocator, 1, 16).expect("Failed to with_capacity_in(..)");

    allocator.change_behaviour(TestAllocatorBehaviour::FailAtAllocate);

    let result = read_fd_to_buffer(file.as_fd(), &mut buf, &ReadConfig::default());

    assert!(matches!(
        result,
        Err(ReadError::Buffer(BufferError::AllocationFailure { .. }))
    ));
    assert!(buf.is_empty());
}
