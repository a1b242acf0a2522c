// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Waiting for a spawned child and translating how it ended.

use core::fmt;
use std::io;

use crate::error::SpawnError;

/// How a child process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    /// Normal exit with the given code.
    Exited(i32),
    /// Killed by the given signal.
    Signaled(i32),
}

impl ChildStatus {
    /// Returns the shell-style exit code: the code itself, or `128 + signal`.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signal) => 128 + signal,
        }
    }

    /// Returns the description of the terminating signal, if it should be
    /// reported.
    pub fn signal_description(self) -> Option<&'static str> {
        match self {
            Self::Exited(_) => None,
            Self::Signaled(signal) => signal_description(signal),
        }
    }
}

impl fmt::Display for ChildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Exited(code) => write!(f, "exited with code {code}"),
            Self::Signaled(signal) => match signal_description(signal) {
                Some(description) => write!(f, "{description}: {signal}"),
                None => write!(f, "killed by signal {signal}"),
            },
        }
    }
}

/// Blocks until `pid` terminates.
///
/// Interrupted waits are retried.
///
/// # Errors
///
/// [`SpawnError::Wait`] if `waitpid(2)` fails, for instance because `pid` is
/// not a child of this process.
pub fn wait_child(pid: libc::pid_t) -> Result<ChildStatus, SpawnError> {
    loop {
        let mut status: libc::c_int = 0;

        // SAFETY (PRECONDITIONS ARE MET): `status` is a valid out-pointer.
        let rc = unsafe { libc::waitpid(pid, &mut status, 0) };

        if rc == -1 {
            let err = io::Error::last_os_error();

            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }

            return Err(SpawnError::Wait(err));
        }

        if libc::WIFEXITED(status) {
            return Ok(ChildStatus::Exited(libc::WEXITSTATUS(status)));
        }

        if libc::WIFSIGNALED(status) {
            let status = ChildStatus::Signaled(libc::WTERMSIG(status));
            log::debug!("execbuf-spawn: child {pid} {status}");
            return Ok(status);
        }
    }
}

/// Returns a human readable description of `signal`.
///
/// `SIGPIPE` and signals without a description yield `None`.
pub fn signal_description(signal: i32) -> Option<&'static str> {
    let description = match signal {
        libc::SIGHUP => "Hangup",
        libc::SIGINT => "Interrupt",
        libc::SIGQUIT => "Quit",
        libc::SIGILL => "Illegal instruction",
        libc::SIGTRAP => "BPT trace/trap",
        libc::SIGABRT => "ABORT instruction",
        libc::SIGFPE => "Floating point exception",
        libc::SIGKILL => "Killed",
        libc::SIGBUS => "Bus error",
        libc::SIGSEGV => "Segmentation fault",
        libc::SIGSYS => "Bad system call",
        libc::SIGALRM => "Alarm clock",
        libc::SIGTERM => "Terminated",
        libc::SIGURG => "Urgent IO condition",
        libc::SIGSTOP => "Stopped (signal)",
        libc::SIGTSTP => "Stopped",
        libc::SIGCONT => "Continue",
        libc::SIGCHLD => "Child death or stop",
        libc::SIGTTIN => "Stopped (tty input)",
        libc::SIGTTOU => "Stopped (tty output)",
        libc::SIGIO => "I/O ready",
        libc::SIGXCPU => "CPU limit",
        libc::SIGXFSZ => "File limit",
        libc::SIGVTALRM => "Alarm (virtual)",
        libc::SIGPROF => "Alarm (profile)",
        libc::SIGWINCH => "Window changed",
        libc::SIGUSR1 => "User signal 1",
        libc::SIGUSR2 => "User signal 2",
        _ => return None,
    };

    Some(description)
}
