//! Cell color attributes.
//!
//! Colors are opaque values to the canvas: it only compares them and asks
//! them to write their SGR parameters. Three encodings are supported, matching
//! what terminals accept: the terminal default, a 256-color palette index and
//! 24-bit RGB.

use std::io::{self, Write};

/// A foreground or background color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    /// Terminal default color (SGR 39 / 49).
    #[default]
    Default,
    /// Palette index: 0-7 normal, 8-15 bright, 16-255 extended.
    Indexed(u8),
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Self = Self::Indexed(0);
    pub const RED: Self = Self::Indexed(1);
    pub const GREEN: Self = Self::Indexed(2);
    pub const YELLOW: Self = Self::Indexed(3);
    pub const BLUE: Self = Self::Indexed(4);
    pub const MAGENTA: Self = Self::Indexed(5);
    pub const CYAN: Self = Self::Indexed(6);
    pub const WHITE: Self = Self::Indexed(7);
    pub const BRIGHT_BLACK: Self = Self::Indexed(8);
    pub const BRIGHT_RED: Self = Self::Indexed(9);
    pub const BRIGHT_GREEN: Self = Self::Indexed(10);
    pub const BRIGHT_YELLOW: Self = Self::Indexed(11);
    pub const BRIGHT_BLUE: Self = Self::Indexed(12);
    pub const BRIGHT_MAGENTA: Self = Self::Indexed(13);
    pub const BRIGHT_CYAN: Self = Self::Indexed(14);
    pub const BRIGHT_WHITE: Self = Self::Indexed(15);

    /// Write the SGR parameters selecting this color as foreground.
    pub fn write_fg_params(self, w: &mut impl Write) -> io::Result<()> {
        self.write_params(w, Layer::Foreground)
    }

    /// Write the SGR parameters selecting this color as background.
    pub fn write_bg_params(self, w: &mut impl Write) -> io::Result<()> {
        self.write_params(w, Layer::Background)
    }

    fn write_params(self, w: &mut impl Write, layer: Layer) -> io::Result<()> {
        let (base, bright, extended, default) = match layer {
            Layer::Foreground => (30u8, 90u8, "38", "39"),
            Layer::Background => (40, 100, "48", "49"),
        };
        match self {
            Self::Default => w.write_all(default.as_bytes()),
            Self::Indexed(idx @ 0..=7) => write!(w, "{}", base + idx),
            Self::Indexed(idx @ 8..=15) => write!(w, "{}", bright + idx - 8),
            Self::Indexed(idx) => write!(w, "{extended};5;{idx}"),
            Self::Rgb(r, g, b) => write!(w, "{extended};2;{r};{g};{b}"),
        }
    }
}

#[derive(Clone, Copy)]
enum Layer {
    Foreground,
    Background,
}
