//! `vtcanvas` - low-level terminal control
//!
//! Decodes raw keyboard and paste bytes from a terminal into events, and
//! keeps a character-cell canvas that is drawn with minimal output by
//! diffing each frame against the last one.

// Crate-level lint configuration
#![warn(unsafe_code)] // Unsafe code needs justification (required for termios FFI)
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow CanvasOptions etc
#![allow(clippy::struct_excessive_bools)] // Terminal state needs multiple flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests

pub mod ansi;
pub mod canvas;
pub mod cell;
pub mod color;
pub mod error;
pub mod input;
pub mod terminal;

// Re-export core types at crate root
pub use cell::{Cell, CellWidth};
pub use color::Color;
pub use error::{Error, Result};

// Re-export canvas types
pub use canvas::{Canvas, CanvasOptions, EmissionMode, Grid};

// Re-export input types
pub use input::{
    BackendCapabilities, ByteSource, Decoder, Event, EventReader, KeyCode, KeyEvent, KeyModifiers,
    MemorySource, Normalization, PasteEvent, ReaderOptions, StreamSource,
};

// Re-export terminal types
pub use terminal::{Capabilities, Terminal, TerminalOptions};
#[cfg(unix)]
pub use terminal::{Device, RawModeGuard, ResizeWatcher, is_tty, terminal_size};
