//! Terminal input device.
//!
//! [`Device`] picks the device to read keys from, switches it to raw mode
//! and offers timed reads through [`ByteSource`]. The previous mode is
//! restored by [`Device::restore`], [`Device::close`] or on drop.

#![allow(unsafe_code)]

use crate::error::{Error, Result};
use crate::input::{BackendCapabilities, ByteSource};
use crate::terminal::Capabilities;
use crate::terminal::raw::{RawModeGuard, is_tty};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const CONTROLLING_TTY: &str = "/dev/tty";
const FALLBACK_STDIN: &str = "/dev/stdin";

/// Default wait used by [`Device::read_bytes`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// An open input device, in raw mode when it is a terminal.
///
/// Dropping the device restores the saved mode before the descriptor is
/// closed.
#[derive(Debug)]
pub struct Device {
    raw: Option<RawModeGuard>,
    file: File,
    path: PathBuf,
    timeout: Duration,
}

impl Device {
    /// Open the best input device for the current environment.
    pub fn open() -> Result<Self> {
        Self::open_with(&Capabilities::detect())
    }

    /// Open the first usable candidate from [`Device::candidates`].
    ///
    /// Candidates that cannot be opened are skipped. Once one opens, a
    /// failure to enter raw mode is returned as is.
    pub fn open_with(caps: &Capabilities) -> Result<Self> {
        let mut last = None;
        for path in Self::candidates(caps) {
            match open_file(&path) {
                Ok(file) => return Self::from_file(file, path),
                Err(source) => {
                    tracing::debug!(path = %path.display(), %source, "input device unavailable");
                    last = Some(Error::DeviceUnavailable { path, source });
                }
            }
        }
        Err(last.unwrap_or_else(|| Error::DeviceUnavailable {
            path: PathBuf::from(CONTROLLING_TTY),
            source: io::Error::new(io::ErrorKind::NotFound, "no input device candidates"),
        }))
    }

    /// Open a specific device path.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        match open_file(&path) {
            Ok(file) => Self::from_file(file, path),
            Err(source) => Err(Error::DeviceUnavailable { path, source }),
        }
    }

    /// Device paths in priority order: the multiplexer pane device, the SSH
    /// session device, the controlling terminal, then stdin.
    #[must_use]
    pub fn candidates(caps: &Capabilities) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::with_capacity(4);
        paths.extend(caps.session_tty.clone());
        paths.extend(caps.ssh_tty.clone());
        if Path::new(CONTROLLING_TTY).exists() {
            paths.push(PathBuf::from(CONTROLLING_TTY));
        }
        paths.push(PathBuf::from(FALLBACK_STDIN));
        paths.dedup();
        paths
    }

    fn from_file(file: File, path: PathBuf) -> Result<Self> {
        let raw = if is_tty(&file) {
            let guard = RawModeGuard::new(&file).map_err(|source| Error::DeviceUnavailable {
                path: path.clone(),
                source,
            })?;
            Some(guard)
        } else {
            tracing::debug!(path = %path.display(), "input is not a terminal, raw mode skipped");
            None
        };
        tracing::debug!(path = %path.display(), raw = raw.is_some(), "input device opened");
        Ok(Self {
            raw,
            file,
            path,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set the wait used by [`Device::read_bytes`].
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the device is currently in raw mode.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.raw.is_some()
    }

    /// Enter or leave raw mode. Non-terminal devices ignore this.
    pub fn raw_mode(&mut self, enable: bool) -> Result<()> {
        if enable {
            if self.raw.is_none() && is_tty(&self.file) {
                self.raw = Some(RawModeGuard::new(&self.file)?);
            }
            Ok(())
        } else {
            self.restore()
        }
    }

    /// Restore the mode the device had before it was opened.
    pub fn restore(&mut self) -> Result<()> {
        if let Some(guard) = self.raw.take() {
            guard.restore()?;
        }
        Ok(())
    }

    /// Restore the device mode and close it.
    pub fn close(mut self) -> Result<()> {
        self.restore()?;
        tracing::debug!(path = %self.path.display(), "input device closed");
        Ok(())
    }

    /// Throw away input the terminal has received but nobody has read yet.
    pub fn discard_input(&mut self) -> io::Result<()> {
        if !is_tty(&self.file) {
            return Ok(());
        }
        // SAFETY: the descriptor is owned by `self.file` and open.
        let rc = unsafe { libc::tcflush(self.file.as_raw_fd(), libc::TCIFLUSH) };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }
        tracing::trace!(path = %self.path.display(), "pending input discarded");
        Ok(())
    }

    /// Read with the configured timeout. `Ok(0)` means nothing arrived.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let timeout = self.timeout;
        self.read_timeout(buf, timeout)
    }

    /// Wait until the device is readable. Returns false on timeout.
    fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let millis = i32::try_from(remaining.as_micros().div_ceil(1000)).unwrap_or(i32::MAX);
            let mut pfd = libc::pollfd {
                fd: self.file.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            };
            // SAFETY: pfd is a valid pollfd and nfds is 1.
            let rc = unsafe { libc::poll(&raw mut pfd, 1, millis) };
            match rc {
                0 => return Ok(false),
                n if n > 0 => return Ok(true),
                _ => {
                    let err = io::Error::last_os_error();
                    if err.kind() != io::ErrorKind::Interrupted {
                        return Err(err);
                    }
                }
            }
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::warn!(path = %self.path.display(), %err, "failed to restore input device mode");
        }
    }
}

impl ByteSource for Device {
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        if buf.is_empty() || !self.wait_readable(timeout)? {
            return Ok(0);
        }
        loop {
            match self.file.read(buf) {
                Ok(0) => {
                    return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input device closed"));
                }
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    fn backend(&self) -> BackendCapabilities {
        BackendCapabilities::EXCLUSIVE_RAW_DEVICE
    }
}

impl Write for Device {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl AsRawFd for Device {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

fn open_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .or_else(|_| File::open(path))
}
