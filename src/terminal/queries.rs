//! Terminal query round trips.
//!
//! Currently only the background color (OSC 11). Replies look like
//! `ESC ] 11 ; rgb:RRRR/GGGG/BBBB` followed by BEL or ST.

use crate::ansi::sequences::query;
use crate::error::{Error, Result};
use crate::input::{ByteSource, EventReader};
use std::io::Write;
use std::time::Duration;

/// How long to wait for each reply.
pub const QUERY_TIMEOUT: Duration = Duration::from_millis(100);

/// Ask the terminal for its background color, as `(r, g, b)` in `0.0..=1.0`.
///
/// Some terminals only answer OSC 11 after an OSC 10 query, so if the
/// first query gets no reply both are sent and the OSC 11 reply is used.
pub fn query_background_color<S, W>(reader: &mut EventReader<S>, out: &mut W) -> Result<(f64, f64, f64)>
where
    S: ByteSource,
    W: Write,
{
    out.write_all(query::BACKGROUND_COLOR.as_bytes())?;
    out.flush()?;
    if let Some(reply) = reader.read_response(QUERY_TIMEOUT)? {
        return parse_color_response(&reply);
    }

    tracing::debug!("no reply to OSC 11, retrying with OSC 10 first");
    out.write_all(query::FOREGROUND_AND_BACKGROUND.as_bytes())?;
    out.flush()?;
    for _ in 0..2 {
        match reader.read_response(QUERY_TIMEOUT)? {
            Some(reply) if is_background_reply(&reply) => return parse_color_response(&reply),
            Some(_) => {}
            None => break,
        }
    }
    Err(Error::UnexpectedResponse("terminal did not report a background color".into()))
}

fn is_background_reply(reply: &[u8]) -> bool {
    reply.windows(3).any(|w| w == b"11;")
}

/// Parse the `rgb:R/G/B` part of a color reply. Each channel has one to
/// four hex digits and is scaled to `0.0..=1.0`.
pub fn parse_color_response(reply: &[u8]) -> Result<(f64, f64, f64)> {
    let text = String::from_utf8_lossy(reply);
    let bad = || Error::UnexpectedResponse(text.clone().into_owned());

    let start = text.find("rgb:").ok_or_else(bad)? + 4;
    let mut channels = text[start..].split('/').map(parse_channel);
    let (Some(Some(r)), Some(Some(g)), Some(Some(b))) = (channels.next(), channels.next(), channels.next()) else {
        return Err(bad());
    };
    Ok((r, g, b))
}

fn parse_channel(field: &str) -> Option<f64> {
    let digits: &str = &field[..field.bytes().take_while(u8::is_ascii_hexdigit).count()];
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    let value = u16::from_str_radix(digits, 16).ok()?;
    let max = (1u32 << (4 * digits.len())) - 1;
    Some(f64::from(value) / f64::from(max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MemorySource, ReaderOptions};

    fn close(a: (f64, f64, f64), b: (f64, f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9 && (a.2 - b.2).abs() < 1e-9
    }

    #[test]
    fn test_parse_four_digit_channels() {
        let rgb = parse_color_response(b"\x1b]11;rgb:ffff/0000/8080").unwrap();
        assert!(close(rgb, (1.0, 0.0, f64::from(0x8080u16) / 65535.0)));
    }

    #[test]
    fn test_parse_short_channels() {
        let rgb = parse_color_response(b"\x1b]11;rgb:f/0/8").unwrap();
        assert!(close(rgb, (1.0, 0.0, 8.0 / 15.0)));
        let rgb = parse_color_response(b"\x1b]11;rgb:ff/80/00").unwrap();
        assert!(close(rgb, (1.0, 128.0 / 255.0, 0.0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_color_response(b"\x1b]11;?"), Err(Error::UnexpectedResponse(_))));
        assert!(parse_color_response(b"rgb:ff/ff").is_err());
        assert!(parse_color_response(b"rgb:fffff/0/0").is_err());
        assert!(parse_color_response(b"rgb:zz/0/0").is_err());
    }

    #[test]
    fn test_query_first_reply() {
        let source = MemorySource::new().bytes(b"\x1b]11;rgb:0000/0000/0000\x1b\\".to_vec());
        let mut reader = EventReader::new(source, ReaderOptions::default());
        let mut out = Vec::new();
        let rgb = query_background_color(&mut reader, &mut out).unwrap();
        assert!(close(rgb, (0.0, 0.0, 0.0)));
        assert_eq!(out, query::BACKGROUND_COLOR.as_bytes());
    }

    #[test]
    fn test_query_falls_back_to_both() {
        let source = MemorySource::new()
            .silence()
            .bytes(b"\x1b]10;rgb:ffff/ffff/ffff\x07\x1b]11;rgb:ffff/ffff/ffff\x07".to_vec());
        let mut reader = EventReader::new(source, ReaderOptions::default());
        let mut out = Vec::new();
        let rgb = query_background_color(&mut reader, &mut out).unwrap();
        assert!(close(rgb, (1.0, 1.0, 1.0)));
        let expected = [query::BACKGROUND_COLOR, query::FOREGROUND_AND_BACKGROUND].concat();
        assert_eq!(out, expected.as_bytes());
    }

    #[test]
    fn test_query_without_reply() {
        let mut reader = EventReader::new(MemorySource::new(), ReaderOptions::default());
        let err = query_background_color(&mut reader, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }
}
