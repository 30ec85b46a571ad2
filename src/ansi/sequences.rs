//! Common ANSI escape sequences.

/// Reset all attributes.
pub const RESET: &str = "\x1b[0m";

/// Clear entire screen.
pub const CLEAR_SCREEN: &str = "\x1b[2J";

/// Hide cursor.
pub const CURSOR_HIDE: &str = "\x1b[?25l";

/// Show cursor.
pub const CURSOR_SHOW: &str = "\x1b[?25h";

/// Move cursor to home position (1,1).
pub const CURSOR_HOME: &str = "\x1b[H";

/// Enable auto-wrap at the right margin (DECAWM).
pub const LINE_WRAP_ON: &str = "\x1b[?7h";

/// Disable auto-wrap at the right margin.
pub const LINE_WRAP_OFF: &str = "\x1b[?7l";

/// Full terminal reset (RIS).
pub const HARD_RESET: &str = "\x1bc";

/// Turn local echo off (SRM set).
pub const ECHO_OFF: &str = "\x1b[12h";

/// Enable mouse button reporting with SGR encoding.
pub const MOUSE_ON: &str = "\x1b[?1000h\x1b[?1006h";

/// Disable mouse reporting.
pub const MOUSE_OFF: &str = "\x1b[?1000l\x1b[?1006l";

/// Enable bracketed paste mode.
pub const BRACKETED_PASTE_ON: &str = "\x1b[?2004h";

/// Disable bracketed paste mode.
pub const BRACKETED_PASTE_OFF: &str = "\x1b[?2004l";

/// Marker the terminal sends before pasted text.
pub const PASTE_START: &[u8] = b"\x1b[200~";

/// Marker the terminal sends after pasted text.
pub const PASTE_END: &[u8] = b"\x1b[201~";

/// Terminal queries (OSC).
pub mod query {
    /// Ask for the background color.
    pub const BACKGROUND_COLOR: &str = "\x1b]11;?\x07";
    /// Ask for foreground then background color, for terminals that only
    /// answer OSC 11 after OSC 10.
    pub const FOREGROUND_AND_BACKGROUND: &str = "\x1b]10;?\x07\x1b]11;?\x07";
}

/// Written by the panic hook: wrap on, cursor on, attributes reset.
pub const EMERGENCY_RESTORE: &str = "\x1b[0m\x1b[?2004l\x1b[?1000l\x1b[?1006l\x1b[?7h\x1b[?25h";
