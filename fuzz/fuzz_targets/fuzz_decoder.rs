//! Fuzz target for the key decoder.
//!
//! Terminal input is untrusted: arbitrary bytes, fed in arbitrary pieces,
//! must never panic and must always drain.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vtcanvas::{Decoder, Normalization};

fuzz_target!(|data: &[u8]| {
    let Some((&split, data)) = data.split_first() else {
        return;
    };
    let normalization = Normalization {
        cr_to_lf: split & 1 != 0,
        del_to_backspace: split & 2 != 0,
    };
    let mut decoder = Decoder::new(normalization);

    // Feed in pieces whose size comes from the first byte.
    let piece = usize::from(split).max(1);
    let mut events = 0usize;
    for chunk in data.chunks(piece) {
        decoder.feed(chunk);
        while decoder.next_event().is_some() {
            events += 1;
            assert!(events <= data.len(), "more events than input bytes");
        }
    }
    while decoder.flush().is_some() {
        events += 1;
        assert!(events <= data.len() + 1, "flush did not make progress");
    }
    assert!(decoder.in_paste() || !decoder.has_pending());
});
