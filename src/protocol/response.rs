//! Response definitions
//!
//! Status codes and the status line that starts every response.

use std::fmt;

use crate::error::{HftpError, Result};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Status {
    Ok = 0,
    BadEol = 100,
    BadRequest = 101,
    InternalError = 199,
    InvalidCommand = 200,
    InvalidArguments = 201,
    FileNotFound = 202,
    BadOffset = 203,
}

impl Status {
    /// Numeric code sent on the wire
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Human readable message sent after the code
    pub fn message(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadEol => "BAD EOL",
            Status::BadRequest => "BAD REQUEST",
            Status::InternalError => "INTERNAL SERVER ERROR",
            Status::InvalidCommand => "NO SUCH COMMAND",
            Status::InvalidArguments => "INVALID ARGUMENTS FOR COMMAND",
            Status::FileNotFound => "FILE NOT FOUND",
            Status::BadOffset => "OFFSET EXCEEDS FILE SIZE",
        }
    }

    /// Fatal statuses (1xx) close the connection once sent
    pub fn is_fatal(self) -> bool {
        (100..200).contains(&self.code())
    }

    /// Look up a status by its numeric code
    pub fn from_code(code: u16) -> Option<Self> {
        let status = match code {
            0 => Status::Ok,
            100 => Status::BadEol,
            101 => Status::BadRequest,
            199 => Status::InternalError,
            200 => Status::InvalidCommand,
            201 => Status::InvalidArguments,
            202 => Status::FileNotFound,
            203 => Status::BadOffset,
            _ => return None,
        };
        Some(status)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.message())
    }
}

/// A status line as received by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub status: Status,

    /// Message as sent by the peer (may differ from `Status::message`)
    pub message: String,
}

impl StatusLine {
    /// Parse `<code> <message>` (terminator already stripped)
    pub fn parse(line: &str) -> Result<Self> {
        let (code, message) = match line.split_once(' ') {
            Some((code, message)) => (code, message),
            None => (line, ""),
        };

        let code: u16 = code.parse().map_err(|_| {
            HftpError::Protocol(format!("Malformed status line: {:?}", line))
        })?;
        let status = Status::from_code(code).ok_or_else(|| {
            HftpError::Protocol(format!("Unknown status code: {}", code))
        })?;

        Ok(Self {
            status,
            message: message.to_string(),
        })
    }

    /// Turn a non-OK status into an error
    pub fn into_result(self) -> Result<()> {
        if self.status == Status::Ok {
            Ok(())
        } else {
            Err(HftpError::Server {
                status: self.status,
                message: self.message,
            })
        }
    }
}
