//! Crate error types
//!
//! All fallible core operations return [`Result`]. Errors are split by
//! which resource failed, because the session loop treats them
//! differently: transport and decoder errors end the session, surface
//! errors fail `start()` before a session exists.

use std::io;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// I/O error on a transport channel
    Io(io::Error),

    /// Video channel could not be opened after exhausting all retries
    ConnectFailed {
        /// Number of attempts made
        attempts: u32,
    },

    /// Transport-level failure (channel open rejected, authorization, ...)
    Transport(String),

    /// Decoder failure that ended the session (repeated resource errors)
    Decoder(String),

    /// Output surface could not be created
    Surface(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::ConnectFailed { attempts } => {
                write!(f, "Video channel not available after {} attempts", attempts)
            }
            Error::Transport(msg) => write!(f, "Transport error: {}", msg),
            Error::Decoder(msg) => write!(f, "Decoder error: {}", msg),
            Error::Surface(msg) => write!(f, "Surface error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
