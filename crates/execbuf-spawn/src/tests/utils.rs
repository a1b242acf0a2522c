// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Shared helpers for execbuf-spawn tests.

use std::ffi::CString;
use std::io::Write;

use tempfile::NamedTempFile;

use crate::ImageExecutor;

/// Temporary file holding `bytes`.
pub fn image_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to NamedTempFile::new()");
    file.write_all(bytes).expect("Failed to write_all(..)");
    file.flush().expect("Failed to flush()");
    file
}

/// Deterministic, non-repeating-looking payload of `len` bytes.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Exits 0 when the image, arguments and environment match, 1 otherwise.
pub struct ExpectImage {
    pub image: Vec<u8>,
    pub argv: Vec<CString>,
    pub envp: Vec<CString>,
}

impl ImageExecutor for ExpectImage {
    fn execute(&mut self, image: &[u8], argv: &[CString], envp: &[CString]) -> i32 {
        if image == self.image.as_slice() && argv == self.argv.as_slice() && envp == self.envp.as_slice() {
            0
        } else {
            1
        }
    }
}

/// Exits with a fixed code.
pub struct ExitWith(pub i32);

impl ImageExecutor for ExitWith {
    fn execute(&mut self, _image: &[u8], _argv: &[CString], _envp: &[CString]) -> i32 {
        self.0
    }
}

/// Raises a signal in the child.
pub struct RaiseSignal(pub i32);

impl ImageExecutor for RaiseSignal {
    fn execute(&mut self, _image: &[u8], _argv: &[CString], _envp: &[CString]) -> i32 {
        // SAFETY: plain syscall wrapper.
        unsafe { libc::raise(self.0) };
        0
    }
}

/// Panics instead of returning a status.
pub struct Panics;

impl ImageExecutor for Panics {
    fn execute(&mut self, _image: &[u8], _argv: &[CString], _envp: &[CString]) -> i32 {
        panic!("executor failed");
    }
}
