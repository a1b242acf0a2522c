// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Bounded streaming read from a file descriptor into spare capacity.

use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};

use execbuf::{RawAllocator, RawBuffer};

use crate::config::ReadConfig;
use crate::error::ReadError;

/// Appends everything readable from `fd` to `buf`.
///
/// Each iteration reserves room for one chunk, lets `read(2)` write straight
/// into the spare capacity and commits the byte count it reports. The loop
/// stops at end of input. Interrupted reads are retried.
///
/// Returns the number of bytes appended.
///
/// # Errors
///
/// - [`ReadError::ElementSize`] if `buf` does not hold single bytes
/// - [`ReadError::Oversize`] if the input holds more than `config.max_size`
///   bytes; bytes already appended stay in `buf`
/// - [`ReadError::Buffer`] if `buf` cannot grow
/// - [`ReadError::Io`] if `read(2)` fails
pub fn read_fd_to_buffer<A>(
    fd: BorrowedFd<'_>,
    buf: &mut RawBuffer<A>,
    config: &ReadConfig,
) -> Result<usize, ReadError>
where
    A: RawAllocator,
{
    if buf.elem_size() != 1 {
        return Err(ReadError::ElementSize {
            elem_size: buf.elem_size(),
        });
    }

    let chunk_size = config.chunk_size.max(1);
    let mut total = 0usize;

    loop {
        // One byte past the limit is enough to tell "exactly max" from "more".
        let allowed = (config.max_size - total).saturating_add(1);
        let request = chunk_size.min(allowed);

        buf.reserve(request)?;

        // SAFETY (PRECONDITIONS ARE MET): `reserve` guarantees at least
        // `request` writable bytes behind `spare_ptr`.
        let count = unsafe { libc::read(fd.as_raw_fd(), buf.spare_ptr().cast(), request) };

        if count < 0 {
            let err = io::Error::last_os_error();

            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }

            log::warn!("execbuf-spawn: read failed after {total} bytes: {err}");
            return Err(ReadError::Io(err));
        }

        let count = count as usize;

        if count == 0 {
            break;
        }

        if count > config.max_size - total {
            log::warn!(
                "execbuf-spawn: input exceeds {} bytes, aborting read",
                config.max_size
            );
            return Err(ReadError::Oversize {
                max_size: config.max_size,
            });
        }

        // SAFETY (PRECONDITIONS ARE MET): `read` initialized `count <= request`
        // bytes of the reserved spare capacity.
        unsafe { buf.commit(count) };
        total += count;
    }

    log::debug!("execbuf-spawn: read {total} bytes");

    Ok(total)
}
