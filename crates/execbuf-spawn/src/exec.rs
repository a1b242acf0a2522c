// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! The in-memory execution collaborator.

use std::ffi::CString;
use std::ptr;

use crate::error::SpawnError;

/// Runs a binary image held in memory.
///
/// `image` is borrowed for the whole call, so it stays valid, unmoved and
/// unmodified until `execute` returns or replaces the process image.
pub trait ImageExecutor {
    /// Runs `image` with the given argument and environment vectors.
    ///
    /// Returns the status the child terminates with if control comes back.
    fn execute(&mut self, image: &[u8], argv: &[CString], envp: &[CString]) -> i32;
}

/// Entry point with the C `execvm` signature:
/// `(argc, argv, envp, data, len)`, with NULL-terminated vectors.
pub type ExecvmFn = unsafe extern "C" fn(u32, *const *const u8, *const *const u8, *const u8, usize);

/// [`ImageExecutor`] over a raw `execvm`-style entry point.
#[derive(Debug, Clone, Copy)]
pub struct ExecvmExecutor {
    entry: ExecvmFn,
}

impl ExecvmExecutor {
    /// Wraps `entry`.
    ///
    /// # Safety
    ///
    /// `entry` must be safe to call with NULL-terminated `argv`/`envp` arrays
    /// of NUL-terminated strings and an `image` pointer valid for `len` bytes,
    /// all borrowed for the duration of the call only.
    pub unsafe fn new(entry: ExecvmFn) -> Self {
        Self { entry }
    }
}

impl ImageExecutor for ExecvmExecutor {
    fn execute(&mut self, image: &[u8], argv: &[CString], envp: &[CString]) -> i32 {
        let Ok(argc) = u32::try_from(argv.len()) else {
            log::warn!("execbuf-spawn: {} arguments do not fit in argc", argv.len());
            return libc::EXIT_FAILURE;
        };

        let argv = null_terminated(argv);
        let envp = null_terminated(envp);

        // SAFETY (PRECONDITIONS ARE MET): guaranteed by `new`'s contract; every
        // pointer handed over outlives the call.
        unsafe { (self.entry)(argc, argv.as_ptr(), envp.as_ptr(), image.as_ptr(), image.len()) };

        libc::EXIT_SUCCESS
    }
}

/// Pointers to each string followed by a NULL terminator.
fn null_terminated(strings: &[CString]) -> Vec<*const u8> {
    strings
        .iter()
        .map(|s| s.as_ptr().cast::<u8>())
        .chain(std::iter::once(ptr::null()))
        .collect()
}

/// Converts arguments or environment entries to C strings.
///
/// # Errors
///
/// [`SpawnError::InvalidArgument`] naming the first entry with an interior NUL.
pub fn c_strings<I, S>(items: I) -> Result<Vec<CString>, SpawnError>
where
    I: IntoIterator<Item = S>,
    S: Into<Vec<u8>>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| CString::new(item).map_err(|_| SpawnError::InvalidArgument { index }))
        .collect()
}
