// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Process plumbing around [`execbuf`]: stream a file into a byte buffer,
//! fork, and hand the bytes to an in-memory executor in the child.
//!
//! # Flow
//!
//! 1. [`spawn`] opens the image file
//! 2. [`read_fd_to_buffer`] streams it into a fresh [`RawBuffer`](execbuf::RawBuffer),
//!    bounded by [`ReadConfig::max_size`]
//! 3. the process forks; the child calls [`ImageExecutor::execute`] with the
//!    buffer's bytes, releases the buffer and exits with the returned status
//! 4. the parent releases its copy of the buffer and gets a [`Child`]
//! 5. [`Child::wait`] reports a [`ChildStatus`], with `128 + signal` exit
//!    codes and signal descriptions for abnormal terminations
//!
//! The buffer is released on every path, including failures.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::ffi::CString;
//!
//! use execbuf_spawn::{ImageExecutor, SpawnConfig, c_strings, spawn};
//!
//! struct Inspect;
//!
//! impl ImageExecutor for Inspect {
//!     fn execute(&mut self, image: &[u8], _argv: &[CString], _envp: &[CString]) -> i32 {
//!         if image.starts_with(b"\x7fELF") { 0 } else { 1 }
//!     }
//! }
//!
//! fn main() -> Result<(), execbuf_spawn::SpawnError> {
//!     let argv = c_strings(["/bin/true"])?;
//!     let child = spawn("/bin/true", &argv, &[], &mut Inspect, &SpawnConfig::default())?;
//!
//!     let status = child.wait()?;
//!     std::process::exit(status.exit_code());
//! }
//! ```

#![cfg(unix)]
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

mod config;
mod error;
mod exec;
mod read;
mod spawn;
mod wait;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_CHUNK_SIZE, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_SIZE, ReadConfig, SpawnConfig};
pub use error::{ReadError, SpawnError};
pub use exec::{ExecvmExecutor, ExecvmFn, ImageExecutor, c_strings};
pub use read::read_fd_to_buffer;
pub use spawn::{Child, spawn, spawn_from_fd};
pub use wait::{ChildStatus, signal_description, wait_child};
