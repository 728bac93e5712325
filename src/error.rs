//! Error types for hftp
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::protocol::Status;

/// Result type alias using HftpError
pub type Result<T> = std::result::Result<T, HftpError>;

/// Unified error type for hftp operations
#[derive(Debug, Error)]
pub enum HftpError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Inbound bytes could not be framed into a request line (fatal)
    #[error("Framing violation: {0}")]
    Framing(#[from] FramingError),

    /// A response from the server did not follow the protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server answered with a non-OK status
    #[error("Server replied {} {message}", .status.code())]
    Server { status: Status, message: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Ways a stream of bytes can fail to produce a request line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FramingError {
    /// Line contained a bare `\n`
    #[error("bare line feed inside a line")]
    BadEol,

    /// No terminator within the maximum line length
    #[error("line exceeds {0} bytes without a terminator")]
    LineTooLong(usize),

    /// Line was not valid UTF-8
    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}

impl FramingError {
    /// Status reported to the peer before the connection is closed
    pub fn status(&self) -> Status {
        match self {
            FramingError::BadEol => Status::BadEol,
            FramingError::LineTooLong(_) | FramingError::InvalidEncoding => Status::BadRequest,
        }
    }
}
