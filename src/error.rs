//! Error types for vtcanvas.

use std::io;
use std::path::PathBuf;

/// Result type alias for vtcanvas operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for vtcanvas operations.
///
/// Timeouts are not errors: reads that see no input return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No terminal device could be opened or put into raw mode.
    #[error("terminal device {} unavailable: {source}", path.display())]
    DeviceUnavailable {
        /// Device path that was tried last.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Position out of bounds for a strict accessor.
    #[error("position ({x}, {y}) out of bounds for {width}x{height} canvas")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// The process-wide terminal lifecycle was already initialized.
    #[error("terminal already initialized")]
    AlreadyInitialized,
    /// The terminal replied to a query with something unparseable.
    #[error("unexpected terminal response: {0:?}")]
    UnexpectedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = Error::OutOfBounds {
            x: 10,
            y: 20,
            width: 5,
            height: 5,
        };
        assert!(err.to_string().contains("(10, 20)"));
        assert!(err.to_string().contains("5x5"));

        let err = Error::UnexpectedResponse("garbage".to_string());
        assert!(err.to_string().contains("garbage"));
    }

    #[test]
    fn test_device_unavailable_keeps_source() {
        let err = Error::DeviceUnavailable {
            path: PathBuf::from("/dev/tty"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/dev/tty"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
