//! Connection Handler
//!
//! Drives one client session: framing, parsing, dispatch, responses.

use std::io::{BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;

use crate::error::{HftpError, Result};
use crate::handler::{Outcome, RequestHandler};
use crate::protocol::{write_status, Command, LineReader, Status, MAX_LINE_LEN};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Reading and dispatching requests
    Active,

    /// Terminal; the socket is being closed
    Closing,
}

/// Handles a single client connection
pub struct Connection<R: Read, W: Write> {
    /// Inbound framing over the read half
    reader: LineReader<R>,

    /// Outbound send path (buffered for efficiency)
    writer: BufWriter<W>,

    /// Shared command executor
    handler: Arc<RequestHandler>,

    state: SessionState,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection<TcpStream, TcpStream> {
    /// Create a session over an accepted socket
    pub fn new(stream: TcpStream, handler: Arc<RequestHandler>, max_line_len: usize) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self::from_parts(read_stream, stream, handler, max_line_len, peer_addr))
    }

    /// Run the session, then shut the socket down
    pub fn serve(mut self) -> Result<()> {
        let result = self.handle();
        if let Err(e) = self.writer.get_ref().shutdown(Shutdown::Both) {
            tracing::trace!("Shutdown of {} failed: {}", self.peer_addr, e);
        }
        result
    }
}

impl<R: Read, W: Write> Connection<R, W> {
    /// Build a session from arbitrary read/write halves
    pub fn from_parts(
        reader: R,
        writer: W,
        handler: Arc<RequestHandler>,
        max_line_len: usize,
        peer_addr: impl Into<String>,
    ) -> Self {
        Self {
            reader: LineReader::with_max_line_len(reader, max_line_len),
            writer: BufWriter::new(writer),
            handler,
            state: SessionState::Active,
            peer_addr: peer_addr.into(),
        }
    }

    /// Build a session with the protocol's default line limit
    pub fn with_default_limit(
        reader: R,
        writer: W,
        handler: Arc<RequestHandler>,
        peer_addr: impl Into<String>,
    ) -> Self {
        Self::from_parts(reader, writer, handler, MAX_LINE_LEN, peer_addr)
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads requests in a loop and sends responses. Returns once the
    /// session reaches `Closing`; the only errors returned are failures to
    /// read from the transport.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        while self.state == SessionState::Active {
            let line = match self.reader.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    self.state = SessionState::Closing;
                    break;
                }
                Err(HftpError::Framing(violation)) => {
                    tracing::warn!("Framing violation from {}: {}", self.peer_addr, violation);
                    self.close_with(violation.status());
                    break;
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    self.state = SessionState::Closing;
                    return Err(e);
                }
            };

            if line.is_empty() {
                continue;
            }

            tracing::debug!("Request from {}: {}", self.peer_addr, line);
            let command = Command::parse(&line);

            match self.handler.execute(&command, &mut self.writer) {
                Ok(Outcome::Continue) => {}
                Ok(Outcome::Close) => {
                    tracing::debug!("Client {} quit", self.peer_addr);
                    self.state = SessionState::Closing;
                }
                Err(e) => {
                    tracing::warn!("Internal error serving {} to {}: {}", line, self.peer_addr, e);
                    self.close_with(Status::InternalError);
                }
            }
        }

        Ok(())
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Consume the session and return the write half
    ///
    /// Every response is flushed as it is sent, so nothing is left buffered.
    pub fn into_writer(self) -> W {
        self.writer.into_parts().0
    }

    /// Send a fatal status and move to `Closing`
    fn close_with(&mut self, status: Status) {
        if let Err(e) = write_status(&mut self.writer, status) {
            tracing::debug!("Could not send {} to {}: {}", status, self.peer_addr, e);
        }
        self.state = SessionState::Closing;
    }
}
