//! Client
//!
//! Blocking client for the file server protocol.

use std::io::{BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{HftpError, Result};
use crate::protocol::{write_line, CommandType, LineReader, StatusLine, EOL};

/// Longest status, listing or metadata line accepted
///
/// Slice payloads are not bound by this: `Client::slice` sizes the limit
/// from the requested byte count.
pub const MAX_RESPONSE_LINE: usize = 64 * 1024;

/// A connection to a server
pub struct Client {
    reader: LineReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to `addr`
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: LineReader::with_max_line_len(read_stream, MAX_RESPONSE_LINE),
            writer: BufWriter::new(stream),
        })
    }

    /// Names in the served directory
    pub fn file_listing(&mut self) -> Result<Vec<String>> {
        self.request(CommandType::GetFileListing.verb())?;

        let mut names = Vec::new();
        loop {
            let line = self.expect_line()?;
            if line.is_empty() {
                return Ok(names);
            }
            names.push(line);
        }
    }

    /// Size of `filename` in bytes
    pub fn metadata(&mut self, filename: &str) -> Result<u64> {
        self.request(&format!("{} {}", CommandType::GetMetadata.verb(), filename))?;

        let line = self.expect_line()?;
        line.trim()
            .parse()
            .map_err(|_| HftpError::Protocol(format!("Malformed size: {:?}", line)))
    }

    /// `size` bytes of `filename` starting at `offset`
    pub fn slice(&mut self, filename: &str, offset: u64, size: u64) -> Result<Vec<u8>> {
        self.request(&format!(
            "{} {} {} {}",
            CommandType::GetSlice.verb(),
            filename,
            offset,
            size
        ))?;

        let encoded = self.read_payload_line(size)?;
        let data = STANDARD
            .decode(encoded.trim())
            .map_err(|e| HftpError::Protocol(format!("Bad base64 payload: {}", e)))?;
        if data.len() as u64 != size {
            return Err(HftpError::Protocol(format!(
                "Expected {} bytes, got {}",
                size,
                data.len()
            )));
        }
        Ok(data)
    }

    /// End the session
    pub fn quit(mut self) -> Result<()> {
        self.request(CommandType::Quit.verb())
    }

    /// Send raw bytes, no terminator added
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Read and parse the next status line
    pub fn read_status(&mut self) -> Result<StatusLine> {
        StatusLine::parse(&self.expect_line()?)
    }

    /// Read the next line, or `None` once the server closed the connection
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.reader.read_raw_line()
    }

    /// Send one request line and require an OK status
    fn request(&mut self, line: &str) -> Result<()> {
        write_line(&mut self.writer, line)?;
        self.writer.flush()?;
        self.read_status()?.into_result()
    }

    /// Read a base64 line carrying exactly `size` decoded bytes
    fn read_payload_line(&mut self, size: u64) -> Result<String> {
        let encoded_len = usize::try_from(size.div_ceil(3))
            .ok()
            .and_then(|groups| groups.checked_mul(4))
            .and_then(|len| len.checked_add(EOL.len()))
            .ok_or_else(|| {
                HftpError::Protocol(format!("Slice of {} bytes does not fit in memory", size))
            })?;

        let previous = self.reader.max_line_len();
        self.reader.set_max_line_len(encoded_len.max(previous));
        let line = self.expect_line();
        self.reader.set_max_line_len(previous);
        line
    }

    fn expect_line(&mut self) -> Result<String> {
        self.reader.read_raw_line()?.ok_or_else(|| {
            HftpError::Protocol("Connection closed mid-response".to_string())
        })
    }
}
