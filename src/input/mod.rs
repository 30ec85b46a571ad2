//! Keyboard and paste input.
//!
//! Raw bytes come from a [`ByteSource`], are decoded against the shared
//! sequence [`table`] by the [`Decoder`], and are read with timeouts through
//! an [`EventReader`].

mod decoder;
mod event;
mod keyboard;
mod reader;
mod source;
pub mod table;

pub use decoder::{Decoder, MAX_PASTE_BUFFER_SIZE, Normalization};
pub use event::{Event, PasteEvent};
pub use keyboard::{ESC, KeyCode, KeyEvent, KeyModifiers};
pub use reader::{EventReader, MAX_RESPONSE_LEN, ReaderOptions};
pub use source::{BackendCapabilities, ByteSource, Chunk, MemorySource, StreamSource};
