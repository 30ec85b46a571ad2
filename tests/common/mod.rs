//! Shared helpers for integration tests: replaying emitted bytes into a
//! virtual terminal and comparing what it shows with a grid.

#![allow(dead_code)] // Shared test helper; not every integration test uses every function
#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry

use tracing::Level;
use vtcanvas::Grid;

/// Route library logs to the test output.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_test_writer()
        .try_init();
}

/// Feed `bytes` into a fresh virtual terminal of `width` x `height`.
pub fn replay(bytes: &[u8], width: u32, height: u32) -> vt100::Parser {
    let mut parser = vt100::Parser::new(height as u16, width as u16, 0);
    parser.process(bytes);
    parser
}

/// Text shown at `(x, y)`, with an untouched cell reported as a space.
pub fn shown_at(parser: &vt100::Parser, x: u32, y: u32) -> String {
    let contents = parser
        .screen()
        .cell(y as u16, x as u16)
        .map(|cell| cell.contents())
        .unwrap_or_default();
    if contents.is_empty() {
        " ".to_string()
    } else {
        contents.to_string()
    }
}

/// Check that the virtual terminal shows exactly the runes of `grid`.
/// Continuation cells must be shown as the right half of a wide glyph.
pub fn assert_shows(parser: &vt100::Parser, grid: &Grid) {
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let cell = grid.get(x, y).unwrap();
            if cell.is_continuation() {
                let term = parser.screen().cell(y as u16, x as u16).unwrap();
                assert!(term.is_wide_continuation(), "({x},{y}) should continue a wide glyph");
                continue;
            }
            assert_eq!(
                shown_at(parser, x, y),
                cell.display_char().to_string(),
                "mismatch at ({x},{y})"
            );
        }
    }
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
pub fn count(haystack: &[u8], needle: &[u8]) -> usize {
    let mut n = 0;
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if &haystack[i..i + needle.len()] == needle {
            n += 1;
            i += needle.len();
        } else {
            i += 1;
        }
    }
    n
}
