//! Error types and handling infrastructure for linepick.
//!
//! A single `thiserror` enum covers every failure the library can report. Startup
//! code propagates these to `main`, where `anyhow` adds context; the long-lived
//! loops turn them into status messages instead of unwinding.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for linepick operations.
#[derive(Error, Debug)]
pub enum LinepickError {
    /// File system or stream errors
    #[error("I/O operation failed: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Input file could not be found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Index lookup past the end of a buffer or view
    #[error("Index {index} out of range (size {size})")]
    OutOfRange { index: usize, size: usize },

    /// Lookup on a buffer that holds no records yet
    #[error("Empty buffer")]
    EmptyBuffer,

    /// A regular expression term failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Matcher registration, lookup or execution failures
    #[error("Matcher error: {message}")]
    Matcher { message: String },

    /// Layout name did not resolve to a known layout
    #[error("Unknown layout: '{name}'")]
    UnknownLayout { name: String },

    /// Configuration file problems
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid command line arguments
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// UI and terminal related errors
    #[error("UI operation failed: {message}")]
    UI { message: String },

    /// The session has been stopped; no new work is accepted
    #[error("Session stopped")]
    Stopped,

    /// A loop's receiving half is gone or was already taken
    #[error("Channel unavailable: {message}")]
    Channel { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for linepick operations.
pub type Result<T> = std::result::Result<T, LinepickError>;

impl LinepickError {
    /// Create an Io error with additional context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    pub fn matcher(message: impl Into<String>) -> Self {
        Self::Matcher {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn ui(message: impl Into<String>) -> Self {
        Self::UI {
            message: message.into(),
        }
    }

    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// True for the error a Hub send returns once stop has fired.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl From<std::io::Error> for LinepickError {
    fn from(err: std::io::Error) -> Self {
        let message = match err.kind() {
            std::io::ErrorKind::NotFound => "File not found",
            std::io::ErrorKind::PermissionDenied => "Permission denied",
            std::io::ErrorKind::UnexpectedEof => "Unexpected end of input",
            _ => "IO operation failed",
        };
        Self::Io {
            message: message.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let path = PathBuf::from("/test/input.txt");
        let not_found = LinepickError::FileNotFound { path };
        assert_eq!(not_found.to_string(), "File not found: /test/input.txt");

        let range = LinepickError::OutOfRange { index: 7, size: 3 };
        assert_eq!(range.to_string(), "Index 7 out of range (size 3)");

        let pattern = LinepickError::invalid_pattern("(", "unclosed group");
        assert_eq!(pattern.to_string(), "Invalid pattern '(': unclosed group");

        let layout = LinepickError::UnknownLayout {
            name: "sideways".to_string(),
        };
        assert_eq!(layout.to_string(), "Unknown layout: 'sideways'");
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(
            LinepickError::matcher("boom"),
            LinepickError::Matcher { .. }
        ));
        assert!(matches!(LinepickError::ui("resize"), LinepickError::UI { .. }));
        assert!(matches!(
            LinepickError::config("bad toml"),
            LinepickError::Config { .. }
        ));
        assert!(LinepickError::Stopped.is_stopped());
        assert!(!LinepickError::other("x").is_stopped());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: LinepickError = io_err.into();

        match err {
            LinepickError::Io { message, .. } => assert_eq!(message, "Permission denied"),
            other => panic!("Expected Io variant, got {other:?}"),
        }
    }
}
