//! Shared character canvas with diff-based drawing.
//!
//! A [`Canvas`] owns a [`Grid`] behind one reader/writer lock and a separate
//! output sink. Mutations take the writer lock briefly; [`Canvas::draw`]
//! composes a frame under the reader lock, releases it, and only then writes
//! to the terminal, so other threads can keep mutating while bytes are in
//! flight.
//!
//! # Examples
//!
//! ```
//! use vtcanvas::{Canvas, CanvasOptions, Color};
//!
//! let canvas = Canvas::with_writer(Vec::new(), 20, 4, CanvasOptions::default())?;
//! canvas.write_str(0, 0, Color::GREEN, Color::Default, "hello");
//! let first = canvas.draw()?;
//! assert!(first > 0);
//! // Nothing changed: nothing is written.
//! assert_eq!(canvas.draw()?, 0);
//! # Ok::<(), std::io::Error>(())
//! ```

mod diff;
mod grid;
mod render;

pub use diff::FrameDiff;
pub use grid::Grid;
pub use render::{EmissionMode, Frame, compose};

use crate::ansi::{self, sequences};
use crate::cell::Cell;
use crate::color::Color;
use crate::error::Result;
use crate::terminal::Capabilities;
use std::fmt;
use std::io::{self, Stdout, Write};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Canvas configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanvasOptions {
    /// How cells are written.
    pub emission: EmissionMode,
    /// Show the cursor between frames.
    pub cursor_visible: bool,
    /// Terminal auto-wrap state between frames.
    pub line_wrap: bool,
}

impl CanvasOptions {
    /// Options suited to the detected terminal: per-cell positioning under
    /// a multiplexer, batched otherwise.
    #[must_use]
    pub fn for_capabilities(caps: &Capabilities) -> Self {
        Self {
            emission: if caps.is_multiplexed() {
                EmissionMode::PerCell
            } else {
                EmissionMode::Batched
            },
            ..Self::default()
        }
    }
}

/// Desired vs. last-sent cursor visibility.
#[derive(Clone, Copy, Debug)]
struct CursorState {
    wanted: bool,
    shown: bool,
}

impl CursorState {
    /// Append the escape that makes the terminal match `wanted`, if any.
    fn flush_into(&mut self, out: &mut Vec<u8>) {
        if self.wanted != self.shown {
            let seq = if self.wanted {
                sequences::CURSOR_SHOW
            } else {
                sequences::CURSOR_HIDE
            };
            out.extend_from_slice(seq.as_bytes());
            self.shown = self.wanted;
        }
    }
}

#[derive(Debug)]
struct CanvasState {
    grid: Grid,
    /// Last frame known to be on screen. `None` forces a full repaint.
    rendered: Option<Grid>,
    mode: EmissionMode,
    cursor: CursorState,
    line_wrap: bool,
}

/// A character grid that renders itself to a terminal.
///
/// `Canvas` is `Sync` when the writer is `Send`, so it can be shared through
/// an `Arc` between a render loop, input handlers and a resize watcher.
pub struct Canvas<W: Write = Stdout> {
    state: RwLock<CanvasState>,
    out: Mutex<W>,
}

#[cfg(unix)]
impl Canvas<Stdout> {
    /// Canvas covering the current terminal, writing to stdout.
    pub fn new() -> Result<Self> {
        let caps = Capabilities::detect();
        let (w, h) = crate::terminal::terminal_size()?;
        let canvas = Self::with_writer(
            io::stdout(),
            u32::from(w),
            u32::from(h),
            CanvasOptions::for_capabilities(&caps),
        )?;
        Ok(canvas)
    }
}

impl<W: Write> Canvas<W> {
    /// Create a canvas writing to `writer`.
    ///
    /// The configured cursor visibility and line-wrap state are sent
    /// immediately so the terminal matches what the canvas believes.
    pub fn with_writer(writer: W, width: u32, height: u32, options: CanvasOptions) -> io::Result<Self> {
        let mut cursor = CursorState {
            wanted: options.cursor_visible,
            shown: true,
        };
        let mut init = Vec::new();
        cursor.flush_into(&mut init);
        init.extend_from_slice(
            if options.line_wrap {
                sequences::LINE_WRAP_ON
            } else {
                sequences::LINE_WRAP_OFF
            }
            .as_bytes(),
        );

        let canvas = Self {
            state: RwLock::new(CanvasState {
                grid: Grid::new(width, height),
                rendered: None,
                mode: options.emission,
                cursor,
                line_wrap: options.line_wrap,
            }),
            out: Mutex::new(writer),
        };
        canvas.emit(&init)?;
        Ok(canvas)
    }

    // Lock helpers. A panic in another thread while it held the lock must
    // not take rendering down with it.
    fn read(&self) -> RwLockReadGuard<'_, CanvasState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CanvasState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn output(&self) -> MutexGuard<'_, W> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let mut out = self.output();
        out.write_all(bytes)?;
        out.flush()
    }

    /// Run `f` with exclusive access to the output sink.
    pub fn with_output<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.output())
    }

    /// Send bytes to the terminal untouched, bypassing the grid. The canvas
    /// does not track their effect; follow with [`Canvas::redraw_full`] if
    /// they change what is on screen.
    pub fn write_raw(&self, bytes: &[u8]) -> io::Result<()> {
        self.emit(bytes)
    }

    /// Consume the canvas and return its output sink.
    pub fn into_output(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================
    // Geometry and access
    // ============================================

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.read().grid.size()
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.read().grid.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.read().grid.height()
    }

    /// Rune at a position; `Error::OutOfBounds` outside the canvas.
    pub fn at(&self, x: u32, y: u32) -> Result<char> {
        self.read().grid.at(x, y)
    }

    /// Cell at a position; `Error::OutOfBounds` outside the canvas.
    pub fn cell(&self, x: u32, y: u32) -> Result<Cell> {
        self.read().grid.cell(x, y)
    }

    /// Deep copy of the current grid.
    #[must_use]
    pub fn snapshot(&self) -> Grid {
        self.read().grid.clone()
    }

    /// Run several mutations under one writer-lock hold so they land in
    /// the same frame.
    pub fn batch<R>(&self, f: impl FnOnce(&mut Grid) -> R) -> R {
        f(&mut self.write().grid)
    }

    /// Replace the grid with a resized copy and force a full repaint.
    /// Returns whether the size changed.
    pub fn resize(&self, width: u32, height: u32) -> bool {
        let mut state = self.write();
        let (width, height) = (width.max(1), height.max(1));
        if state.grid.size() == (width, height) {
            return false;
        }
        tracing::debug!(width, height, "canvas resized");
        state.grid = state.grid.resized(width, height);
        state.rendered = None;
        true
    }

    /// Resize to the current terminal size.
    #[cfg(unix)]
    pub fn resize_to_terminal(&self) -> io::Result<bool> {
        let (w, h) = crate::terminal::terminal_size()?;
        Ok(self.resize(u32::from(w), u32::from(h)))
    }

    #[must_use]
    pub fn emission_mode(&self) -> EmissionMode {
        self.read().mode
    }

    pub fn set_emission_mode(&self, mode: EmissionMode) {
        self.write().mode = mode;
    }

    // ============================================
    // Mutators (clipped, see `Grid`)
    // ============================================

    pub fn plot(&self, x: u32, y: u32, ch: char) {
        self.write().grid.plot(x, y, ch);
    }

    pub fn plot_color(&self, x: u32, y: u32, fg: Color, ch: char) {
        self.write().grid.plot_color(x, y, fg, ch);
    }

    pub fn write_rune(&self, x: u32, y: u32, fg: Color, bg: Color, ch: char) {
        self.write().grid.write_rune(x, y, fg, bg, ch);
    }

    pub fn write_wide_rune(&self, x: u32, y: u32, fg: Color, bg: Color, ch: char) {
        self.write().grid.write_wide_rune(x, y, fg, bg, ch);
    }

    pub fn write_str(&self, x: u32, y: u32, fg: Color, bg: Color, s: &str) {
        self.write().grid.write_str(x, y, fg, bg, s);
    }

    pub fn write_runes(&self, x: u32, y: u32, fg: Color, bg: Color, ch: char, count: usize) {
        self.write().grid.write_runes(x, y, fg, bg, ch, count);
    }

    pub fn write_background(&self, x: u32, y: u32, bg: Color) {
        self.write().grid.write_background(x, y, bg);
    }

    pub fn write_background_add_rune_if_empty(&self, x: u32, y: u32, bg: Color, ch: char) {
        self.write()
            .grid
            .write_background_add_rune_if_empty(x, y, bg, ch);
    }

    pub fn fill(&self, fg: Color) {
        self.write().grid.fill(fg);
    }

    pub fn fill_background(&self, bg: Color) {
        self.write().grid.fill_background(bg);
    }

    pub fn clear(&self) {
        self.write().grid.clear();
    }

    // ============================================
    // Cursor and line wrap
    // ============================================

    /// Set the desired cursor visibility; an escape is sent only when it
    /// differs from what the terminal was last told.
    pub fn set_show_cursor(&self, visible: bool) -> io::Result<()> {
        let mut bytes = Vec::new();
        {
            let mut state = self.write();
            state.cursor.wanted = visible;
            state.cursor.flush_into(&mut bytes);
        }
        self.emit(&bytes)
    }

    pub fn show_cursor(&self) -> io::Result<()> {
        self.set_show_cursor(true)
    }

    pub fn hide_cursor(&self) -> io::Result<()> {
        self.set_show_cursor(false)
    }

    /// Set the terminal auto-wrap mode between frames.
    pub fn set_line_wrap(&self, enable: bool) -> io::Result<()> {
        self.write().line_wrap = enable;
        let seq = if enable {
            sequences::LINE_WRAP_ON
        } else {
            sequences::LINE_WRAP_OFF
        };
        self.emit(seq.as_bytes())
    }

    // ============================================
    // Drawing
    // ============================================

    /// Send the changes since the last frame. Returns the number of bytes
    /// written, 0 when nothing changed.
    pub fn draw(&self) -> io::Result<usize> {
        self.draw_frame(false)
    }

    /// Like [`draw`](Self::draw), but leave the cursor hidden afterwards.
    pub fn hide_cursor_and_draw(&self) -> io::Result<usize> {
        self.draw_frame(true)
    }

    /// Re-emit every cell at its position on the next frame.
    pub fn redraw(&self) -> io::Result<usize> {
        self.write().grid.mark_all_undrawn();
        self.draw_frame(false)
    }

    /// Forget the rendered frame and repaint everything from the origin.
    pub fn redraw_full(&self) -> io::Result<usize> {
        self.write().rendered = None;
        self.draw_frame(false)
    }

    pub fn hide_cursor_and_redraw(&self) -> io::Result<usize> {
        self.write().grid.mark_all_undrawn();
        self.draw_frame(true)
    }

    pub fn hide_cursor_and_redraw_full(&self) -> io::Result<usize> {
        self.write().rendered = None;
        self.draw_frame(true)
    }

    /// Draw, then leave the terminal cursor at `(x, y)`.
    pub fn draw_and_set_cursor(&self, x: u32, y: u32) -> io::Result<usize> {
        let written = self.draw_frame(false)?;
        let seq = ansi::cursor_position(y, x);
        self.emit(seq.as_bytes())?;
        Ok(written + seq.len())
    }

    fn draw_frame(&self, keep_cursor_hidden: bool) -> io::Result<usize> {
        let (frame, shown) = {
            let state = self.read();
            let frame = compose(&state.grid, state.rendered.as_ref(), state.mode, state.line_wrap);
            if frame.is_empty() {
                drop(state);
                if keep_cursor_hidden {
                    let mut bytes = Vec::new();
                    {
                        let mut state = self.write();
                        state.cursor.wanted = false;
                        state.cursor.flush_into(&mut bytes);
                    }
                    self.emit(&bytes)?;
                    return Ok(bytes.len());
                }
                return Ok(0);
            }
            (frame, state.grid.clone())
        };
        if frame.full {
            tracing::debug!(cells = frame.cells, "full repaint");
        }

        let mut bytes = Vec::with_capacity(frame.bytes.len() + 32);
        {
            let mut state = self.write();
            let restore_cursor = !keep_cursor_hidden && state.cursor.wanted;
            state.cursor.wanted = false;
            state.cursor.flush_into(&mut bytes);

            let rewrap = frame.full && !state.line_wrap;
            if rewrap {
                bytes.extend_from_slice(sequences::LINE_WRAP_ON.as_bytes());
            }
            bytes.extend_from_slice(&frame.bytes);
            if rewrap {
                bytes.extend_from_slice(sequences::LINE_WRAP_OFF.as_bytes());
            }

            if restore_cursor {
                state.cursor.wanted = true;
                state.cursor.flush_into(&mut bytes);
            }
        }

        let result = self.emit(&bytes);

        let mut state = self.write();
        match result {
            Ok(()) => {
                if state.grid.size() == shown.size() {
                    state.grid.mark_drawn_matching(&shown);
                    state.rendered = Some(shown);
                } else {
                    state.rendered = None;
                }
                tracing::trace!(bytes = bytes.len(), cells = frame.cells, "frame written");
                Ok(bytes.len())
            }
            Err(err) => {
                state.rendered = None;
                Err(err)
            }
        }
    }
}

impl<W: Write> fmt::Display for Canvas<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.read().grid, f)
    }
}

impl<W: Write> fmt::Debug for Canvas<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Canvas")
            .field("size", &state.grid.size())
            .field("mode", &state.mode)
            .field("cursor_visible", &state.cursor.wanted)
            .field("line_wrap", &state.line_wrap)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn canvas(width: u32, height: u32) -> Canvas<Vec<u8>> {
        let canvas = Canvas::with_writer(Vec::new(), width, height, CanvasOptions::default()).unwrap();
        canvas.with_output(Vec::clear);
        canvas
    }

    fn take(canvas: &Canvas<Vec<u8>>) -> String {
        String::from_utf8(canvas.with_output(std::mem::take)).unwrap()
    }

    #[test]
    fn test_construction_announces_cursor_and_wrap() {
        let canvas = Canvas::with_writer(Vec::new(), 4, 2, CanvasOptions::default()).unwrap();
        assert_eq!(take(&canvas), "\x1b[?25l\x1b[?7l");

        let options = CanvasOptions {
            cursor_visible: true,
            line_wrap: true,
            ..CanvasOptions::default()
        };
        let canvas = Canvas::with_writer(Vec::new(), 4, 2, options).unwrap();
        assert_eq!(take(&canvas), "\x1b[?7h");
    }

    #[test]
    fn test_write_raw_passes_bytes_through() {
        let canvas = canvas(4, 1);
        canvas.draw().unwrap();
        take(&canvas);
        canvas.write_raw(b"\x1b]0;title\x07").unwrap();
        assert_eq!(take(&canvas), "\x1b]0;title\x07");
        // The grid is untouched, so nothing is pending.
        assert_eq!(canvas.draw().unwrap(), 0);
        canvas.write_raw(b"").unwrap();
        assert!(take(&canvas).is_empty());
    }

    #[test]
    fn test_first_draw_is_full_and_second_is_empty() {
        let canvas = canvas(4, 2);
        canvas.write_str(0, 0, Color::Default, Color::Default, "hi");
        let written = canvas.draw().unwrap();
        let out = take(&canvas);
        assert_eq!(written, out.len());
        assert!(out.starts_with("\x1b[?7h\x1b[H"));
        assert!(out.ends_with("\x1b[0m\x1b[?7l"));

        assert_eq!(canvas.draw().unwrap(), 0);
        assert!(take(&canvas).is_empty());
    }

    #[test]
    fn test_incremental_draw_writes_single_cell() {
        let canvas = canvas(80, 24);
        canvas.draw().unwrap();
        take(&canvas);

        canvas.write_rune(10, 5, Color::RED, Color::Default, 'x');
        canvas.draw().unwrap();
        assert_eq!(take(&canvas), "\x1b[6;11H\x1b[31;49mx\x1b[0m");
    }

    #[test]
    fn test_visible_cursor_hidden_during_draw_and_restored() {
        let canvas = canvas(2, 1);
        canvas.show_cursor().unwrap();
        assert_eq!(take(&canvas), "\x1b[?25h");

        canvas.plot(0, 0, 'a');
        canvas.draw().unwrap();
        let out = take(&canvas);
        assert!(out.starts_with("\x1b[?25l"));
        assert!(out.ends_with("\x1b[?25h"));
    }

    #[test]
    fn test_hide_cursor_and_draw_keeps_cursor_hidden() {
        let canvas = canvas(2, 1);
        canvas.show_cursor().unwrap();
        take(&canvas);
        canvas.hide_cursor_and_draw().unwrap();
        let out = take(&canvas);
        assert!(out.starts_with("\x1b[?25l"));
        assert!(!out.contains("\x1b[?25h"));

        // Nothing changed, but the cursor was visible: it stays hidden.
        canvas.show_cursor().unwrap();
        take(&canvas);
        canvas.hide_cursor_and_draw().unwrap();
        assert_eq!(take(&canvas), "\x1b[?25l");
    }

    #[test]
    fn test_cursor_changes_coalesce() {
        let canvas = canvas(2, 1);
        canvas.hide_cursor().unwrap();
        canvas.hide_cursor().unwrap();
        assert!(take(&canvas).is_empty());
        canvas.show_cursor().unwrap();
        canvas.show_cursor().unwrap();
        assert_eq!(take(&canvas), "\x1b[?25h");
    }

    #[test]
    fn test_redraw_reemits_all_cells_in_place() {
        let canvas = canvas(3, 1);
        canvas.write_str(0, 0, Color::Default, Color::Default, "abc");
        canvas.draw().unwrap();
        take(&canvas);

        canvas.redraw().unwrap();
        let out = take(&canvas);
        assert_eq!(out, "\x1b[1;1H\x1b[39;49mabc\x1b[0m");
    }

    #[test]
    fn test_redraw_full_repaints_from_origin() {
        let canvas = canvas(3, 1);
        canvas.draw().unwrap();
        take(&canvas);
        canvas.redraw_full().unwrap();
        assert!(take(&canvas).contains("\x1b[H"));
    }

    #[test]
    fn test_resize_forces_full_repaint_and_keeps_overlap() {
        let canvas = canvas(4, 2);
        canvas.write_str(0, 0, Color::Default, Color::Default, "abcdefgh");
        canvas.draw().unwrap();
        take(&canvas);

        assert!(canvas.resize(2, 3));
        assert!(!canvas.resize(2, 3));
        assert_eq!(canvas.to_string(), "ab\nef\n  \n");
        canvas.draw().unwrap();
        assert!(take(&canvas).contains("\x1b[H"));
    }

    #[test]
    fn test_at_bounds() {
        let canvas = canvas(10, 1);
        canvas.write_wide_rune(5, 0, Color::Default, Color::Default, '中');
        assert_eq!(canvas.at(5, 0).unwrap(), '中');
        assert_eq!(canvas.at(6, 0).unwrap(), '\0');
        assert!(matches!(canvas.at(10, 0), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_batch_lands_in_one_frame() {
        let canvas = canvas(4, 1);
        canvas.draw().unwrap();
        take(&canvas);
        canvas.batch(|grid| {
            grid.plot(0, 0, 'a');
            grid.plot(3, 0, 'b');
        });
        canvas.draw().unwrap();
        assert_eq!(take(&canvas), "\x1b[1;1H\x1b[39;49ma\x1b[1;4Hb\x1b[0m");
    }

    #[test]
    fn test_per_cell_mode_from_capabilities() {
        let caps = Capabilities::from_lookup(|k| (k == "TMUX").then(|| "1".to_string()));
        assert_eq!(CanvasOptions::for_capabilities(&caps).emission, EmissionMode::PerCell);
        let caps = Capabilities::from_lookup(|_| None);
        assert_eq!(CanvasOptions::for_capabilities(&caps).emission, EmissionMode::Batched);
    }

    #[test]
    fn test_draw_and_set_cursor() {
        let canvas = canvas(4, 2);
        canvas.draw().unwrap();
        take(&canvas);
        canvas.draw_and_set_cursor(2, 1).unwrap();
        assert_eq!(take(&canvas), "\x1b[2;3H");
    }

    #[test]
    fn test_failed_write_forces_full_repaint() {
        struct Flaky {
            fail: bool,
            data: Vec<u8>,
        }
        impl Write for Flaky {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.fail {
                    return Err(io::Error::new(io::ErrorKind::BrokenPipe, "down"));
                }
                self.data.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let canvas = Canvas::with_writer(
            Flaky {
                fail: false,
                data: Vec::new(),
            },
            3,
            1,
            CanvasOptions::default(),
        )
        .unwrap();
        canvas.draw().unwrap();
        canvas.plot(0, 0, 'x');
        canvas.with_output(|w| w.fail = true);
        assert!(canvas.draw().is_err());
        canvas.with_output(|w| {
            w.fail = false;
            w.data.clear();
        });
        canvas.draw().unwrap();
        let out = canvas.with_output(|w| String::from_utf8(w.data.clone()).unwrap());
        assert!(out.contains("\x1b[H"));
    }

    #[test]
    fn test_canvas_is_sync_for_send_writers() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<Canvas<Vec<u8>>>();
    }
}
