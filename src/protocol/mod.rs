//! Protocol Module
//!
//! Defines the line-oriented wire protocol between clients and the server.
//!
//! ## Framing
//! Every line, in both directions, ends with `\r\n`. A request line may not
//! contain a bare `\n` and may not exceed [`MAX_LINE_LEN`] bytes before its
//! terminator appears.
//!
//! ### Requests
//! ```text
//! get_file_listing
//! get_metadata <filename>
//! get_slice <filename> <offset> <size>
//! quit
//! ```
//!
//! ### Responses
//! ```text
//! <code> <message>\r\n          status line, always sent
//! <entry>\r\n ... \r\n          get_file_listing, empty line ends the list
//! <size>\r\n                    get_metadata
//! <base64 ...>\r\n              get_slice, base64 may span several writes
//! ```
//!
//! The empty line closing a `get_file_listing` response goes beyond the
//! bare "OK plus one line per entry" form; clients read entries until it
//! arrives. Entry names are never empty, so it cannot be mistaken for one.
//! `get_slice` uses the same end marker.
//!
//! ### Status Codes
//! - 0:   OK
//! - 100: BAD EOL (fatal)
//! - 101: BAD REQUEST (fatal)
//! - 199: INTERNAL SERVER ERROR (fatal)
//! - 200: NO SUCH COMMAND
//! - 201: INVALID ARGUMENTS FOR COMMAND
//! - 202: FILE NOT FOUND
//! - 203: OFFSET EXCEEDS FILE SIZE

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType, Unparsed};
pub use response::{Status, StatusLine};
pub use codec::{
    is_valid_filename, write_base64, write_line, write_status, LineReader,
};

/// Line terminator
pub const EOL: &str = "\r\n";

/// Maximum bytes buffered without seeing a terminator
pub const MAX_LINE_LEN: usize = 4096;

/// Punctuation allowed in filenames besides ASCII letters and digits
pub const FILENAME_PUNCTUATION: &[char] = &['.', '-', '_'];
