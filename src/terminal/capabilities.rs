//! Terminal capability profile.
//!
//! Resolves environment and session signals into the handful of facts the
//! decoder, the renderer and device selection need.

use std::env;
use std::path::PathBuf;

/// Terminal multiplexer the process runs under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Multiplexer {
    Tmux,
    Screen,
    Zellij,
    Dvtm,
    Abduco,
}

impl Multiplexer {
    /// Environment variable whose presence signals this multiplexer.
    #[must_use]
    pub fn env_var(self) -> &'static str {
        match self {
            Self::Tmux => "TMUX",
            Self::Screen => "STY",
            Self::Zellij => "ZELLIJ",
            Self::Dvtm => "DVTM",
            Self::Abduco => "ABDUCO",
        }
    }

    const ALL: [Self; 5] = [Self::Tmux, Self::Screen, Self::Zellij, Self::Dvtm, Self::Abduco];
}

/// Detected terminal capabilities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Multiplexer, if any.
    pub multiplexer: Option<Multiplexer>,
    /// Value of `TERM`, empty when unset.
    pub terminal_kind: String,
    /// PuTTY (`TERM=putty*`).
    pub putty: bool,
    /// Running over an SSH session.
    pub ssh: bool,
    /// Running inside Windows Terminal.
    pub windows_terminal: bool,
    /// Device of the multiplexer pane (`TMUX_PANE_TTY`).
    pub session_tty: Option<PathBuf>,
    /// Device of the SSH session (`SSH_TTY`).
    pub ssh_tty: Option<PathBuf>,
}

impl Capabilities {
    /// Detect capabilities from the process environment.
    #[must_use]
    pub fn detect() -> Self {
        let caps = Self::from_lookup(|name| env::var(name).ok());
        tracing::debug!(?caps, "terminal capabilities detected");
        caps
    }

    /// Build the profile from an arbitrary variable lookup. Empty values
    /// count as unset.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let term = get("TERM").unwrap_or_default();

        Self {
            multiplexer: Multiplexer::ALL.into_iter().find(|m| get(m.env_var()).is_some()),
            putty: term.starts_with("putty"),
            ssh: get("SSH_TTY").is_some() || get("SSH_CONNECTION").is_some(),
            windows_terminal: get("WT_SESSION").is_some() || get("WT_PROFILE_ID").is_some(),
            session_tty: get("TMUX_PANE_TTY").map(PathBuf::from),
            ssh_tty: get("SSH_TTY").map(PathBuf::from),
            terminal_kind: term,
        }
    }

    #[must_use]
    pub fn is_multiplexed(&self) -> bool {
        self.multiplexer.is_some()
    }

    #[must_use]
    pub fn terminal_kind(&self) -> &str {
        &self.terminal_kind
    }

    #[must_use]
    pub fn is_putty(&self) -> bool {
        self.putty
    }

    #[must_use]
    pub fn in_ssh(&self) -> bool {
        self.ssh
    }

    #[must_use]
    pub fn is_windows_terminal(&self) -> bool {
        self.windows_terminal
    }

    /// `TERM` names an xterm-compatible terminal.
    #[must_use]
    pub fn is_xterm_like(&self) -> bool {
        self.terminal_kind.starts_with("xterm")
    }

    /// Whether a hard reset (RIS) and echo-off may be sent at startup.
    /// Multiplexers mangle RIS, so only bare xterm-like terminals qualify.
    #[must_use]
    pub fn safe_to_reset(&self) -> bool {
        self.is_xterm_like() && !self.is_multiplexed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn caps(vars: &[(&str, &str)]) -> Capabilities {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Capabilities::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_plain_xterm() {
        let c = caps(&[("TERM", "xterm-256color")]);
        assert!(!c.is_multiplexed());
        assert_eq!(c.terminal_kind(), "xterm-256color");
        assert!(c.is_xterm_like());
        assert!(c.safe_to_reset());
        assert!(!c.is_putty());
        assert!(!c.in_ssh());
    }

    #[test]
    fn test_multiplexers() {
        assert_eq!(caps(&[("TMUX", "/tmp/tmux-0/default,1,0")]).multiplexer, Some(Multiplexer::Tmux));
        assert_eq!(caps(&[("STY", "123.pts-0")]).multiplexer, Some(Multiplexer::Screen));
        assert_eq!(caps(&[("ZELLIJ", "0")]).multiplexer, Some(Multiplexer::Zellij));
        assert_eq!(caps(&[("DVTM", "1")]).multiplexer, Some(Multiplexer::Dvtm));
        assert_eq!(caps(&[("ABDUCO", "s")]).multiplexer, Some(Multiplexer::Abduco));
    }

    #[test]
    fn test_multiplexer_blocks_reset() {
        let c = caps(&[("TERM", "xterm"), ("TMUX", "x")]);
        assert!(c.is_multiplexed());
        assert!(!c.safe_to_reset());
    }

    #[test]
    fn test_empty_values_are_unset() {
        let c = caps(&[("TMUX", ""), ("SSH_TTY", ""), ("TERM", "")]);
        assert!(!c.is_multiplexed());
        assert!(!c.in_ssh());
        assert_eq!(c.terminal_kind(), "");
        assert!(c.ssh_tty.is_none());
    }

    #[test]
    fn test_putty_ssh_windows_terminal() {
        let c = caps(&[
            ("TERM", "putty-256color"),
            ("SSH_TTY", "/dev/pts/3"),
            ("WT_SESSION", "abc"),
            ("TMUX_PANE_TTY", "/dev/pts/9"),
        ]);
        assert!(c.is_putty());
        assert!(c.in_ssh());
        assert!(c.is_windows_terminal());
        assert!(!c.safe_to_reset());
        assert_eq!(c.ssh_tty.as_deref(), Some(std::path::Path::new("/dev/pts/3")));
        assert_eq!(c.session_tty.as_deref(), Some(std::path::Path::new("/dev/pts/9")));
    }

    #[test]
    fn test_ssh_connection_only() {
        let c = caps(&[("SSH_CONNECTION", "10.0.0.1 5555 10.0.0.2 22")]);
        assert!(c.in_ssh());
        assert!(c.ssh_tty.is_none());
    }

    #[test]
    fn test_detect_does_not_panic() {
        let _ = Capabilities::detect();
    }
}
