//! Byte sources that input is read from.
//!
//! Every backend offers the same timed read; the key table and decoder on
//! top of it are shared. A read that sees no input before its timeout
//! returns `Ok(0)`.

use bitflags::bitflags;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

bitflags! {
    /// What kind of input backend a source is.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BackendCapabilities: u8 {
        /// Owns a terminal device in raw mode (POSIX tty).
        const EXCLUSIVE_RAW_DEVICE = 0b0000_0001;
        /// Reads structured console input records (Windows console API).
        const CONSOLE_EVENT_RECORDS = 0b0000_0010;
        /// Reads through a portable stream abstraction.
        const PORTABLE_LIBRARY = 0b0000_0100;
    }
}

/// A source of raw input bytes with bounded-time reads.
pub trait ByteSource {
    /// Read available bytes into `buf`, waiting at most `timeout`.
    /// Returns `Ok(0)` when nothing arrived in time.
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;

    /// Backend kind.
    fn backend(&self) -> BackendCapabilities {
        BackendCapabilities::empty()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        (**self).read_timeout(buf, timeout)
    }

    fn backend(&self) -> BackendCapabilities {
        (**self).backend()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        (**self).read_timeout(buf, timeout)
    }

    fn backend(&self) -> BackendCapabilities {
        (**self).backend()
    }
}

// ============================================
// Scripted source
// ============================================

/// One step of a [`MemorySource`] script.
#[derive(Debug)]
pub enum Chunk {
    /// Bytes delivered by one read, or several if the caller's buffer is
    /// smaller.
    Bytes(Vec<u8>),
    /// One read that times out.
    Silence,
    /// One read that fails.
    Fail(io::ErrorKind),
}

/// Replays a fixed script of reads. Once the script is exhausted every
/// read times out.
#[derive(Debug, Default)]
pub struct MemorySource {
    script: VecDeque<Chunk>,
    // Bytes of the front chunk already handed out.
    offset: usize,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a read delivering `bytes`.
    #[must_use]
    pub fn bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.script.push_back(Chunk::Bytes(bytes.into()));
        self
    }

    /// Append a read that times out.
    #[must_use]
    pub fn silence(mut self) -> Self {
        self.script.push_back(Chunk::Silence);
        self
    }

    /// Append a read that fails with `kind`.
    #[must_use]
    pub fn fail(mut self, kind: io::ErrorKind) -> Self {
        self.script.push_back(Chunk::Fail(kind));
        self
    }

    /// Reads left in the script.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ByteSource for MemorySource {
    fn read_timeout(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<usize> {
        match self.script.front() {
            None => Ok(0),
            Some(Chunk::Silence) => {
                self.script.pop_front();
                Ok(0)
            }
            Some(&Chunk::Fail(kind)) => {
                self.script.pop_front();
                Err(io::Error::new(kind, "scripted read failure"))
            }
            Some(Chunk::Bytes(bytes)) => {
                let rest = &bytes[self.offset..];
                let n = rest.len().min(buf.len());
                buf[..n].copy_from_slice(&rest[..n]);
                self.offset += n;
                if self.offset == bytes.len() {
                    self.script.pop_front();
                    self.offset = 0;
                }
                Ok(n)
            }
        }
    }
}

// ============================================
// Worker-thread stream source
// ============================================

const STREAM_CHUNK: usize = 1024;

/// Wraps any blocking reader so it can be read with a timeout.
///
/// A worker thread performs the blocking reads. Every read fills a fresh
/// buffer that is moved through a channel, so a read the caller stopped
/// waiting for never writes into memory the next read uses. Its bytes are
/// kept and handed out by the next call.
#[derive(Debug)]
pub struct StreamSource {
    rx: Receiver<io::Result<Vec<u8>>>,
    leftover: VecDeque<u8>,
    eof: bool,
}

impl StreamSource {
    /// Start a worker thread reading from `reader`.
    pub fn spawn<R: Read + Send + 'static>(mut reader: R) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("vtcanvas-input".into())
            .spawn(move || {
                loop {
                    let mut buf = vec![0u8; STREAM_CHUNK];
                    let msg = match reader.read(&mut buf) {
                        Ok(n) => {
                            buf.truncate(n);
                            Ok(buf)
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => Err(e),
                    };
                    let done = !matches!(&msg, Ok(b) if !b.is_empty());
                    if tx.send(msg).is_err() || done {
                        break;
                    }
                }
            })?;
        Ok(Self {
            rx,
            leftover: VecDeque::new(),
            eof: false,
        })
    }

    fn drain_leftover(&mut self, buf: &mut [u8]) -> usize {
        let n = self.leftover.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(self.leftover.drain(..n)) {
            *slot = byte;
        }
        n
    }
}

impl ByteSource for StreamSource {
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        if !self.leftover.is_empty() {
            return Ok(self.drain_leftover(buf));
        }
        if self.eof {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input stream closed"));
        }
        match self.rx.recv_timeout(timeout) {
            Ok(Ok(chunk)) if chunk.is_empty() => {
                self.eof = true;
                Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input stream closed"))
            }
            Ok(Ok(chunk)) => {
                self.leftover.extend(chunk);
                Ok(self.drain_leftover(buf))
            }
            Ok(Err(e)) => {
                self.eof = true;
                Err(e)
            }
            Err(RecvTimeoutError::Timeout) => Ok(0),
            Err(RecvTimeoutError::Disconnected) => {
                self.eof = true;
                Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input stream closed"))
            }
        }
    }

    fn backend(&self) -> BackendCapabilities {
        BackendCapabilities::PORTABLE_LIBRARY
    }
}
