// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Read an image into memory, fork, and hand it to an executor in the child.

use std::ffi::CString;
use std::fs::File;
use std::io;
use std::os::fd::{AsFd, BorrowedFd};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use execbuf::{RawAllocator, RawBuffer, SystemAllocator};

use crate::config::SpawnConfig;
use crate::error::SpawnError;
use crate::exec::ImageExecutor;
use crate::read::read_fd_to_buffer;
use crate::wait::{ChildStatus, wait_child};

/// A forked child running an image.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an unwaited child becomes a zombie"]
pub struct Child {
    pid: libc::pid_t,
}

impl Child {
    /// Returns the child's process id.
    pub fn pid(&self) -> libc::pid_t {
        self.pid
    }

    /// Blocks until the child terminates.
    pub fn wait(self) -> Result<ChildStatus, SpawnError> {
        wait_child(self.pid)
    }
}

/// Opens `path` and spawns its contents with [`spawn_from_fd`].
///
/// The file is closed before returning, on every path.
///
/// # Errors
///
/// [`SpawnError::Open`] if the file cannot be opened, otherwise as
/// [`spawn_from_fd`].
pub fn spawn<P, E>(
    path: P,
    argv: &[CString],
    envp: &[CString],
    executor: &mut E,
    config: &SpawnConfig,
) -> Result<Child, SpawnError>
where
    P: AsRef<Path>,
    E: ImageExecutor + ?Sized,
{
    let path = path.as_ref();

    let file = File::open(path).map_err(|source| {
        log::warn!("execbuf-spawn: cannot open {}: {source}", path.display());
        SpawnError::Open {
            path: path.to_path_buf(),
            source,
        }
    })?;

    spawn_from_fd(file.as_fd(), argv, envp, executor, config)
}

/// Reads the image behind `fd` into a fresh byte buffer, forks, and runs
/// `executor` over the buffer in the child.
///
/// The image is read in the parent, so read failures are reported here
/// instead of through the child's exit status. The buffer is released on
/// every path: by the parent right after forking (or on failure), and by the
/// child once the executor returns, right before it exits with the status the
/// executor returned. With [`SpawnConfig::zeroize_image`] set, every region
/// the image ever occupied is zero-filled before it is freed, on the error
/// paths too.
///
/// A panicking executor does not unwind past the fork: the child releases
/// the image and exits with `EXIT_FAILURE`.
///
/// # Errors
///
/// - [`SpawnError::Buffer`] if the buffer cannot be created
/// - [`SpawnError::Read`] if the image cannot be read or is too large
/// - [`SpawnError::Fork`] if `fork(2)` fails
pub fn spawn_from_fd<E>(
    fd: BorrowedFd<'_>,
    argv: &[CString],
    envp: &[CString],
    executor: &mut E,
    config: &SpawnConfig,
) -> Result<Child, SpawnError>
where
    E: ImageExecutor + ?Sized,
{
    spawn_image_in(SystemAllocator, fd, argv, envp, executor, config)
}

pub(crate) fn spawn_image_in<A, E>(
    allocator: A,
    fd: BorrowedFd<'_>,
    argv: &[CString],
    envp: &[CString],
    executor: &mut E,
    config: &SpawnConfig,
) -> Result<Child, SpawnError>
where
    A: RawAllocator,
    E: ImageExecutor + ?Sized,
{
    let mut image = RawBuffer::with_capacity_in(allocator, 1, config.initial_capacity)?;
    image.set_zeroize_on_realloc(config.zeroize_image);

    if let Err(err) = read_fd_to_buffer(fd, &mut image, &config.read) {
        release_image(image, config);
        return Err(err.into());
    }

    // SAFETY: the child only runs the executor over memory it owns, releases
    // the image and leaves through `_exit`.
    match unsafe { libc::fork() } {
        -1 => {
            let err = io::Error::last_os_error();
            log::warn!("execbuf-spawn: fork failed: {err}");
            release_image(image, config);
            Err(SpawnError::Fork(err))
        }
        0 => run_child(image, argv, envp, executor, config),
        pid => {
            log::debug!("execbuf-spawn: spawned child {pid} ({} byte image)", image.len());
            release_image(image, config);
            Ok(Child { pid })
        }
    }
}

fn run_child<A, E>(
    image: RawBuffer<A>,
    argv: &[CString],
    envp: &[CString],
    executor: &mut E,
    config: &SpawnConfig,
) -> !
where
    A: RawAllocator,
    E: ImageExecutor + ?Sized,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| executor.execute(image.as_bytes(), argv, envp)));
    let code = outcome.unwrap_or(libc::EXIT_FAILURE);
    release_image(image, config);

    // SAFETY: `_exit` never returns and skips the parent's atexit handlers.
    unsafe { libc::_exit(code) }
}

fn release_image<A>(image: RawBuffer<A>, config: &SpawnConfig)
where
    A: RawAllocator,
{
    if config.zeroize_image {
        image.release_zeroized();
    } else {
        image.release();
    }
}
