//! Terminal abstraction: capability profile, input device, lifecycle and
//! resize handling.

mod capabilities;
#[cfg(unix)]
mod device;
mod queries;
#[cfg(unix)]
mod raw;
#[cfg(unix)]
mod resize;

pub use capabilities::{Capabilities, Multiplexer};
#[cfg(unix)]
pub use device::{DEFAULT_TIMEOUT, Device};
pub use queries::{QUERY_TIMEOUT, parse_color_response, query_background_color};
#[cfg(unix)]
pub use raw::{RawModeGuard, is_tty, terminal_size, terminal_size_of};
#[cfg(unix)]
pub use resize::ResizeWatcher;

use crate::ansi::sequences;
use crate::error::{Error, Result};
use std::io::{self, Stdout, Write};
use std::panic;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set while a [`Terminal::init`] session is live.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// What [`Terminal`] switches on at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerminalOptions {
    /// Send a full reset (RIS) and echo-off first, when the terminal is
    /// known to handle it (see [`Capabilities::safe_to_reset`]).
    pub hard_reset: bool,
    /// Enable bracketed paste reporting.
    pub bracketed_paste: bool,
    /// Enable mouse button reporting.
    pub mouse: bool,
}

/// Interactive terminal session.
///
/// Starting a session clears the screen, hides the cursor and disables line
/// wrap. Closing it (explicitly or on drop) reverts those changes.
pub struct Terminal<W: Write> {
    writer: W,
    capabilities: Capabilities,
    options: TerminalOptions,
    active: bool,
    guarded: bool,
}

impl Terminal<Stdout> {
    /// Start the process-wide session on stdout.
    ///
    /// Only one such session may be live at a time; a second call before
    /// the first is closed returns [`Error::AlreadyInitialized`]. Also
    /// installs the panic hook.
    pub fn init(options: TerminalOptions) -> Result<Self> {
        if INITIALIZED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::AlreadyInitialized);
        }
        install_panic_hook();
        match Self::with_writer(io::stdout(), Capabilities::detect(), options) {
            Ok(mut terminal) => {
                terminal.guarded = true;
                Ok(terminal)
            }
            Err(err) => {
                INITIALIZED.store(false, Ordering::SeqCst);
                Err(err)
            }
        }
    }
}

impl<W: Write> Terminal<W> {
    /// Start a session on an arbitrary writer. Not tracked by the
    /// process-wide guard.
    pub fn with_writer(mut writer: W, capabilities: Capabilities, options: TerminalOptions) -> Result<Self> {
        let mut seq = String::new();
        let reset = options.hard_reset && capabilities.safe_to_reset();
        if reset {
            seq.push_str(sequences::HARD_RESET);
            seq.push_str(sequences::ECHO_OFF);
        }
        seq.push_str(sequences::CLEAR_SCREEN);
        seq.push_str(sequences::CURSOR_HIDE);
        seq.push_str(sequences::LINE_WRAP_OFF);
        if options.bracketed_paste {
            seq.push_str(sequences::BRACKETED_PASTE_ON);
        }
        if options.mouse {
            seq.push_str(sequences::MOUSE_ON);
        }
        writer.write_all(seq.as_bytes())?;
        writer.flush()?;
        tracing::debug!(reset, ?options, "terminal session started");

        Ok(Self {
            writer,
            capabilities,
            options,
            active: true,
            guarded: false,
        })
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[must_use]
    pub fn options(&self) -> &TerminalOptions {
        &self.options
    }

    /// Whether the session has not been closed yet.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Write bytes straight to the terminal and flush.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    /// End the session: reporting modes off, line wrap and cursor back on,
    /// screen cleared and cursor homed. Later calls do nothing.
    pub fn close(&mut self) -> Result<()> {
        self.teardown(true)
    }

    /// End the session but leave the drawn content on screen.
    pub fn close_keep_content(&mut self) -> Result<()> {
        self.teardown(false)
    }

    fn teardown(&mut self, clear: bool) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        if self.guarded {
            INITIALIZED.store(false, Ordering::SeqCst);
        }

        let mut seq = String::from(sequences::RESET);
        if self.options.bracketed_paste {
            seq.push_str(sequences::BRACKETED_PASTE_OFF);
        }
        if self.options.mouse {
            seq.push_str(sequences::MOUSE_OFF);
        }
        seq.push_str(sequences::LINE_WRAP_ON);
        seq.push_str(sequences::CURSOR_SHOW);
        if clear {
            seq.push_str(sequences::CLEAR_SCREEN);
            seq.push_str(sequences::CURSOR_HOME);
        }
        self.writer.write_all(seq.as_bytes())?;
        self.writer.flush()?;
        tracing::debug!(clear, "terminal session closed");
        Ok(())
    }
}

impl<W: Write> Drop for Terminal<W> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(%err, "failed to restore terminal on drop");
        }
    }
}

/// Install a panic hook that restores the terminal before the panic
/// message is printed. Runs once; later calls do nothing.
pub fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            emergency_restore();
            previous(info);
        }));
    });
}

/// Best-effort restore for paths that skip `Drop`.
pub fn emergency_restore() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(sequences::EMERGENCY_RESTORE.as_bytes());
    let _ = stdout.flush();
    #[cfg(unix)]
    raw::restore_saved_mode();
}
