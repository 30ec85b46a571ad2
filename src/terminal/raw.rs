//! Raw mode terminal handling.
//!
//! Raw mode disables line buffering, echo and signal generation so input
//! arrives byte by byte. The mode that was active before is saved and put
//! back when the guard is dropped.
//!
//! # Safety
//! This module uses unsafe code for FFI calls to libc termios functions.

#![allow(unsafe_code)]
#![allow(clippy::borrow_as_ptr)]

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::{Mutex, PoisonError};

/// Mode saved by the most recent guard, for the panic hook.
static TERMIOS_BACKUP: Mutex<Option<(RawFd, libc::termios)>> = Mutex::new(None);

/// Saved terminal state for restoration.
#[derive(Debug)]
pub struct RawModeGuard {
    fd: RawFd,
    original: libc::termios,
}

impl RawModeGuard {
    /// Enter raw mode on the given file descriptor.
    ///
    /// Returns a guard that will restore the terminal state when dropped.
    pub fn new<F: AsRawFd>(fd: &F) -> io::Result<Self> {
        let fd = fd.as_raw_fd();
        let original = get_termios(fd)?;

        let mut raw = original;

        // Input modes: no break, no CR to NL, no parity check, no strip char,
        // no start/stop output control.
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);

        // Output modes: disable post processing
        raw.c_oflag &= !libc::OPOST;

        // Control modes: set 8 bit chars
        raw.c_cflag |= libc::CS8;

        // Local modes: echo off, canonical off, no extended functions,
        // no signal chars (^C, ^Z, etc)
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

        // Reads return as soon as one byte is there; waiting is done by poll.
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        set_termios(fd, &raw)?;
        *TERMIOS_BACKUP.lock().unwrap_or_else(PoisonError::into_inner) = Some((fd, original));
        tracing::debug!(fd, "raw mode enabled");

        Ok(Self { fd, original })
    }

    /// Descriptor the guard controls.
    #[must_use]
    pub fn fd(&self) -> RawFd {
        self.fd
    }

    /// Put the saved mode back. Safe to call more than once.
    pub fn restore(&self) -> io::Result<()> {
        set_termios(self.fd, &self.original)?;
        tracing::debug!(fd = self.fd, "raw mode restored");
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::warn!(fd = self.fd, %err, "failed to restore terminal mode");
        }
        let mut backup = TERMIOS_BACKUP.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*backup, Some((fd, _)) if fd == self.fd) {
            *backup = None;
        }
    }
}

/// Restore the mode saved by the live guard, if any. Used from the panic
/// hook, so it never blocks on the lock.
pub(crate) fn restore_saved_mode() {
    let Ok(backup) = TERMIOS_BACKUP.try_lock() else {
        return;
    };
    if let Some((fd, original)) = *backup {
        let _ = set_termios(fd, &original);
    }
}

/// Check if the given file descriptor is a TTY.
#[must_use]
pub fn is_tty<F: AsRawFd>(fd: &F) -> bool {
    // SAFETY: isatty is safe to call with any fd
    unsafe { libc::isatty(fd.as_raw_fd()) == 1 }
}

/// Get the terminal size as `(columns, rows)`.
///
/// Zero dimensions are reported as an error.
pub fn terminal_size() -> io::Result<(u16, u16)> {
    terminal_size_of(libc::STDOUT_FILENO)
}

/// Terminal size of an arbitrary descriptor.
pub fn terminal_size_of(fd: RawFd) -> io::Result<(u16, u16)> {
    // SAFETY: winsize is plain data; all-zero is a valid value.
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };

    // SAFETY: ioctl with TIOCGWINSZ is safe when passed a valid winsize struct
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else if size.ws_col == 0 || size.ws_row == 0 {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "terminal reported zero dimensions",
        ))
    } else {
        Ok((size.ws_col, size.ws_row))
    }
}

fn get_termios(fd: RawFd) -> io::Result<libc::termios> {
    // SAFETY: termios is plain data; all-zero is a valid value.
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: tcgetattr is safe when passed a valid termios struct
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(termios)
    }
}

fn set_termios(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
    // SAFETY: tcsetattr is safe when passed a valid termios struct
    let result = unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, termios) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
