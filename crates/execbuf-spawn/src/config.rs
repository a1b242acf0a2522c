// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Tunables for reading and spawning.

/// Bytes requested from `read(2)` per iteration.
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Largest image accepted by default.
pub const DEFAULT_MAX_SIZE: usize = 3_000_000;

/// Initial capacity, in bytes, of the buffer an image is read into.
pub const DEFAULT_INITIAL_CAPACITY: usize = 2048;

/// Bounds for [`read_fd_to_buffer`](crate::read_fd_to_buffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadConfig {
    /// Bytes requested per `read(2)` call. A value of zero is treated as one.
    pub chunk_size: usize,
    /// Maximum number of bytes accepted. Exactly `max_size` bytes succeed.
    pub max_size: usize,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

/// Settings for [`spawn`](crate::spawn) and [`spawn_from_fd`](crate::spawn_from_fd).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnConfig {
    /// How the image is read.
    pub read: ReadConfig,
    /// Initial capacity of the image buffer, in bytes.
    pub initial_capacity: usize,
    /// Zero every region the image occupies before it is freed, in the
    /// parent and the child, on success and failure alike.
    pub zeroize_image: bool,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            read: ReadConfig::default(),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            zeroize_image: false,
        }
    }
}
