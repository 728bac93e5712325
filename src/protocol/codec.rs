//! Protocol codec
//!
//! Line framing for inbound bytes and the send path for outbound responses.
//!
//! ## Wire Format
//! ```text
//! ┌──────────────────────────────┬──────────┐
//! │        Line (UTF-8)          │ \r\n (2) │
//! └──────────────────────────────┴──────────┘
//! ```
//!
//! Slice payloads are the one exception to "one write, one line": the
//! base64 text is produced by a streaming encoder and may reach the socket
//! in several writes before its closing terminator.

use std::io::{self, Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderWriter;
use bytes::BytesMut;

use crate::error::{FramingError, HftpError, Result};
use super::{Status, EOL, FILENAME_PUNCTUATION, MAX_LINE_LEN};

/// Bytes requested from the socket per read
pub const RECV_CHUNK_SIZE: usize = 2048;

// =============================================================================
// Inbound: line framing
// =============================================================================

/// Accumulates bytes from a stream and splits them into `\r\n` lines
pub struct LineReader<R> {
    inner: R,

    /// Bytes received but not yet returned as a line
    buffer: BytesMut,

    /// Prefix of `buffer` already known not to contain a terminator
    scanned: usize,

    max_line_len: usize,
}

impl<R: Read> LineReader<R> {
    /// Create a reader with the protocol's default line limit
    pub fn new(inner: R) -> Self {
        Self::with_max_line_len(inner, MAX_LINE_LEN)
    }

    /// Create a reader that gives up after `max_line_len` unterminated bytes
    pub fn with_max_line_len(inner: R, max_line_len: usize) -> Self {
        Self {
            inner,
            buffer: BytesMut::with_capacity(RECV_CHUNK_SIZE.min(max_line_len)),
            scanned: 0,
            max_line_len,
        }
    }

    /// Next request line, terminator stripped and whitespace trimmed
    ///
    /// Returns `Ok(None)` when the peer closed the stream.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.read_raw_line()?.map(|line| line.trim().to_string()))
    }

    /// Next line with only the terminator stripped
    ///
    /// Blocks until a terminator arrives, the peer disconnects, or the
    /// buffer reaches `max_line_len` bytes without a terminator.
    pub fn read_raw_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(pos) = self.find_eol() {
                let mut line = self.buffer.split_to(pos + EOL.len());
                line.truncate(pos);
                self.scanned = 0;

                if line.contains(&b'\n') {
                    return Err(FramingError::BadEol.into());
                }
                let line = String::from_utf8(line.to_vec())
                    .map_err(|_| HftpError::Framing(FramingError::InvalidEncoding))?;
                return Ok(Some(line));
            }

            if self.buffer.len() >= self.max_line_len {
                return Err(FramingError::LineTooLong(self.max_line_len).into());
            }

            let want = RECV_CHUNK_SIZE.min(self.max_line_len - self.buffer.len());
            let mut chunk = [0u8; RECV_CHUNK_SIZE];
            let n = match self.inner.read(&mut chunk[..want]) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                if !self.buffer.is_empty() {
                    tracing::trace!("Discarding {} unterminated bytes at EOF", self.buffer.len());
                    self.buffer.clear();
                }
                return Ok(None);
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }

    /// Current line limit
    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    /// Change the line limit for subsequent reads
    pub fn set_max_line_len(&mut self, max_line_len: usize) {
        self.max_line_len = max_line_len;
    }

    fn find_eol(&mut self) -> Option<usize> {
        // A `\r` at the end of the scanned prefix may pair with a new `\n`
        let start = self.scanned.saturating_sub(1);
        let found = self.buffer[start..]
            .windows(EOL.len())
            .position(|w| w == EOL.as_bytes())
            .map(|i| start + i);
        if found.is_none() {
            self.scanned = self.buffer.len();
        }
        found
    }
}

// =============================================================================
// Outbound: send path
// =============================================================================

/// Write `<code> <message>\r\n` and flush
pub fn write_status<W: Write>(writer: &mut W, status: Status) -> Result<()> {
    write!(writer, "{}{}", status, EOL)?;
    writer.flush()?;
    Ok(())
}

/// Write one payload line followed by the terminator (not flushed)
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(EOL.as_bytes())?;
    Ok(())
}

/// Stream exactly `size` bytes from `source` as base64, then the terminator
///
/// The encoder carries partial 3-byte groups across reads, so the text on
/// the wire is one valid base64 string however the reads are split.
/// Returns an `UnexpectedEof` I/O error if `source` runs out early.
pub fn write_base64<W: Write, R: Read>(writer: &mut W, source: R, size: u64) -> Result<()> {
    // The encoder borrows `writer` until it is dropped
    let copied = {
        let mut encoder = EncoderWriter::new(&mut *writer, &STANDARD);
        let copied = io::copy(&mut source.take(size), &mut encoder)?;
        encoder.finish()?;
        copied
    };

    if copied != size {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, read {}", size, copied),
        )
        .into());
    }

    writer.write_all(EOL.as_bytes())?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Filenames
// =============================================================================

/// Whether every character of `name` is in the filename validity set
pub fn is_valid_filename(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || FILENAME_PUNCTUATION.contains(&c))
}
