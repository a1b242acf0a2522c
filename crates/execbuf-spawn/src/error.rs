// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for execbuf-spawn.

use std::io;
use std::path::PathBuf;

use execbuf::BufferError;
use thiserror::Error;

/// Errors from [`read_fd_to_buffer`](crate::read_fd_to_buffer).
#[derive(Debug, Error)]
pub enum ReadError {
    /// The input holds more than the configured maximum.
    ///
    /// The whole read fails; no truncated result is returned.
    #[error("input exceeds the maximum of {max_size} bytes")]
    Oversize {
        /// The configured maximum.
        max_size: usize,
    },

    /// The buffer could not grow.
    #[error("BufferError: {0}")]
    Buffer(#[from] BufferError),

    /// `read(2)` failed.
    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    /// The destination buffer does not hold single bytes.
    #[error("destination buffer must have 1-byte elements, got {elem_size}")]
    ElementSize {
        /// The destination's element size.
        elem_size: usize,
    },
}

/// Errors from [`spawn`](crate::spawn) and friends.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The image file could not be opened.
    #[error("{}: {source}", .path.display())]
    Open {
        /// Path that was passed in.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The image could not be read into memory.
    #[error("ReadError: {0}")]
    Read(#[from] ReadError),

    /// The image buffer could not be created.
    #[error("BufferError: {0}")]
    Buffer(#[from] BufferError),

    /// `fork(2)` failed.
    #[error("fork failed: {0}")]
    Fork(#[source] io::Error),

    /// `waitpid(2)` failed.
    #[error("waitpid failed: {0}")]
    Wait(#[source] io::Error),

    /// An argument or environment entry contains an interior NUL byte.
    #[error("argument {index} contains an interior NUL byte")]
    InvalidArgument {
        /// Position of the offending entry.
        index: usize,
    },
}
