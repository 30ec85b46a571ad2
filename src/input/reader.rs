//! Timed event reading on top of a [`ByteSource`].
//!
//! [`EventReader`] owns the decoder and drives reads: the caller's timeout
//! while idle, a short grace window once an escape prefix is buffered, and
//! a longer window while a bracketed paste is streaming in.

use crate::error::{Error, Result};
use crate::input::decoder::{Decoder, Normalization};
use crate::input::event::{Event, PasteEvent};
use crate::input::keyboard::{KeyCode, KeyEvent};
use crate::input::source::ByteSource;
use crate::terminal::Capabilities;
use std::time::{Duration, Instant};

/// Longest terminal reply [`EventReader::read_response`] collects.
pub const MAX_RESPONSE_LEN: usize = 512;

const READ_CHUNK: usize = 256;

/// Reader configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReaderOptions {
    /// How long to wait for the rest of a sequence after a lone ESC.
    pub escape_grace: Duration,
    /// How long to wait for more paste data before returning empty-handed.
    pub paste_timeout: Duration,
    /// Drop an event identical to the one returned just before it.
    pub suppress_repeats: bool,
    /// Control-byte rewriting applied outside pastes.
    pub normalization: Normalization,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            escape_grace: Duration::from_millis(50),
            paste_timeout: Duration::from_millis(500),
            suppress_repeats: false,
            normalization: Normalization::default(),
        }
    }
}

impl ReaderOptions {
    /// Defaults with normalization chosen for the detected terminal.
    #[must_use]
    pub fn for_capabilities(caps: &Capabilities) -> Self {
        Self {
            normalization: Normalization::from_capabilities(caps),
            ..Self::default()
        }
    }
}

/// Reads decoded events from a byte source.
#[derive(Debug)]
pub struct EventReader<S: ByteSource> {
    source: S,
    decoder: Decoder,
    options: ReaderOptions,
    last: Option<Event>,
    buf: Vec<u8>,
}

impl<S: ByteSource> EventReader<S> {
    pub fn new(source: S, options: ReaderOptions) -> Self {
        Self {
            source,
            decoder: Decoder::new(options.normalization),
            options,
            last: None,
            buf: vec![0; READ_CHUNK],
        }
    }

    #[must_use]
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Turn repeat suppression on or off. Clears the remembered event.
    pub fn set_suppress_repeats(&mut self, enable: bool) {
        self.options.suppress_repeats = enable;
        self.last = None;
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Read one event, waiting at most `timeout` for input to start.
    ///
    /// Returns `Ok(None)` when nothing arrived, when a paste is still
    /// streaming in, or when a repeated event was suppressed. A read error
    /// from the source ends the call.
    pub fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        let event = self.next_event(timeout)?;
        Ok(self.suppress_repeat(event))
    }

    /// Read one event and render it as a short label (see [`Event::label`]).
    pub fn read_key_string(&mut self, timeout: Duration) -> Result<Option<String>> {
        Ok(self.read_event(timeout)?.map(|event| event.label()))
    }

    /// Wait up to `timeout` for a complete bracketed paste. Other events
    /// arriving in the meantime are discarded.
    pub fn read_paste(&mut self, timeout: Duration) -> Result<Option<PasteEvent>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.read_event(remaining)? {
                Some(Event::Paste(paste)) => return Ok(Some(paste)),
                Some(other) => tracing::trace!(event = ?other, "skipped while waiting for paste"),
                None if remaining.is_zero() => return Ok(None),
                None => {}
            }
            if Instant::now() >= deadline && !self.decoder.has_pending() {
                return Ok(None);
            }
        }
    }

    /// Block until Ctrl-C, Return, Escape, Space or `q` is pressed.
    pub fn wait_for_key(&mut self) -> Result<KeyEvent> {
        const POLL: Duration = Duration::from_millis(250);
        loop {
            if let Some(Event::Key(key)) = self.read_event(POLL)? {
                let done = key.is_ctrl_c()
                    || key.is_enter()
                    || key.is_esc()
                    || matches!(key.code, KeyCode::Char(' ' | 'q'));
                if done {
                    return Ok(key);
                }
            }
        }
    }

    /// Collect a raw terminal reply (e.g. to an OSC query) terminated by
    /// BEL, `ESC \` or 8-bit ST. The terminator is stripped.
    ///
    /// Bytes the decoder already buffered are consumed first. Bytes after
    /// the terminator go back to the decoder. On timeout the collected
    /// bytes are returned to the decoder and `Ok(None)` is returned.
    pub fn read_response(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        let deadline = Instant::now() + timeout;
        let mut response = self.decoder.take_pending();
        loop {
            if let Some((end, len)) = find_terminator(&response) {
                let rest = response.split_off(end + len);
                response.truncate(end);
                self.decoder.feed(&rest);
                tracing::trace!(bytes = response.len(), "terminal response");
                return Ok(Some(response));
            }
            if response.len() > MAX_RESPONSE_LEN {
                return Err(Error::UnexpectedResponse(format!(
                    "no terminator within {MAX_RESPONSE_LEN} bytes"
                )));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            let n = if remaining.is_zero() {
                0
            } else {
                self.source.read_timeout(&mut self.buf, remaining)?
            };
            if n == 0 {
                self.decoder.feed(&response);
                return Ok(None);
            }
            response.extend_from_slice(&self.buf[..n]);
        }
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if let Some(event) = self.decoder.next_event() {
            return Ok(Some(event));
        }
        let mut wait = self.wait_for_pending(timeout);
        loop {
            let n = self.source.read_timeout(&mut self.buf, wait)?;
            if n == 0 {
                if self.decoder.in_paste() {
                    return Ok(None);
                }
                return Ok(self.decoder.flush());
            }
            self.decoder.feed(&self.buf[..n]);
            if let Some(event) = self.decoder.next_event() {
                return Ok(Some(event));
            }
            wait = self.wait_for_pending(timeout);
        }
    }

    fn wait_for_pending(&self, idle: Duration) -> Duration {
        if self.decoder.in_paste() {
            self.options.paste_timeout
        } else if self.decoder.has_pending() {
            self.options.escape_grace
        } else {
            idle
        }
    }

    fn suppress_repeat(&mut self, event: Option<Event>) -> Option<Event> {
        if !self.options.suppress_repeats {
            return event;
        }
        match event {
            Some(event @ Event::Paste(_)) => {
                self.last = None;
                Some(event)
            }
            Some(event) if self.last.as_ref() == Some(&event) => {
                tracing::trace!(?event, "repeat suppressed");
                self.last = None;
                None
            }
            Some(event) => {
                self.last = Some(event.clone());
                Some(event)
            }
            None => {
                self.last = None;
                None
            }
        }
    }
}

/// Position and length of the first reply terminator.
fn find_terminator(bytes: &[u8]) -> Option<(usize, usize)> {
    bytes.iter().enumerate().find_map(|(i, &b)| match b {
        0x07 | 0x9c => Some((i, 1)),
        0x1b if bytes.get(i + 1) == Some(&b'\\') => Some((i, 2)),
        _ => None,
    })
}
