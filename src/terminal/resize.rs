//! Reacting to terminal size changes.
//!
//! A background thread waits for `SIGWINCH`, asks for the new size and
//! resizes the shared canvas through its writer lock, so a resize never
//! overlaps the grid read of an in-flight draw.

use crate::canvas::Canvas;
use crate::error::Result;
use crate::terminal::raw::terminal_size;
use signal_hook::consts::signal::SIGWINCH;
use signal_hook::iterator::{Handle, Signals};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Keeps a canvas sized to the terminal until dropped.
#[derive(Debug)]
pub struct ResizeWatcher {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
    resized: Arc<AtomicBool>,
}

impl ResizeWatcher {
    /// Watch for size changes of the terminal on stdout.
    pub fn spawn<W>(canvas: Arc<Canvas<W>>) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        Self::spawn_with_size(canvas, terminal_size)
    }

    /// Watch for size changes, asking `size` for the new `(columns, rows)`.
    pub fn spawn_with_size<W, F>(canvas: Arc<Canvas<W>>, size: F) -> Result<Self>
    where
        W: Write + Send + 'static,
        F: Fn() -> io::Result<(u16, u16)> + Send + 'static,
    {
        let mut signals = Signals::new([SIGWINCH]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let resized = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&resized);

        let thread = thread::Builder::new().name("vtcanvas-resize".into()).spawn(move || {
            for _ in signals.forever() {
                match size() {
                    Ok((cols, rows)) => {
                        if canvas.resize(u32::from(cols), u32::from(rows)) {
                            flag.store(true, Ordering::Release);
                        }
                    }
                    Err(err) => tracing::debug!(%err, "size query after SIGWINCH failed"),
                }
            }
        })?;

        Ok(Self {
            handle,
            thread: Some(thread),
            resized,
        })
    }

    /// Whether the canvas was resized since the last call. A resize
    /// discards the previous frame, so the next draw repaints everything.
    pub fn take_resized(&self) -> bool {
        self.resized.swap(false, Ordering::AcqRel)
    }
}

impl Drop for ResizeWatcher {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("resize watcher thread panicked");
            }
        }
    }
}
