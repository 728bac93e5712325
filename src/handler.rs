//! Request Handler
//!
//! Executes parsed commands against the served directory.
//!
//! ## Responsibilities
//! - Answer validation problems (bad name, missing file, bad range) with a
//!   status and keep the session going
//! - Write every response straight to the session's send path
//! - Return `Err` only for unexpected failures; the session turns those into
//!   INTERNAL_ERROR and closes

use std::io::Write;

use crate::directory::{Lookup, ServedDir};
use crate::error::Result;
use crate::protocol::{
    write_base64, write_line, write_status, Command, Status, Unparsed, EOL,
};

/// What the session should do after a command completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Read the next request
    Continue,

    /// Stop reading and close the socket
    Close,
}

/// Executes commands for any number of sessions
#[derive(Debug, Clone)]
pub struct RequestHandler {
    dir: ServedDir,
}

impl RequestHandler {
    pub fn new(dir: ServedDir) -> Self {
        Self { dir }
    }

    pub fn served_dir(&self) -> &ServedDir {
        &self.dir
    }

    /// Execute `command`, writing its full response to `out`
    pub fn execute<W: Write>(&self, command: &Command, out: &mut W) -> Result<Outcome> {
        match command {
            Command::ListDirectory => self.list_directory(out)?,
            Command::GetMetadata { filename } => self.get_metadata(filename, out)?,
            Command::GetSlice {
                filename,
                offset,
                size,
            } => self.get_slice(filename, *offset, *size, out)?,
            Command::Quit => {
                write_status(out, Status::Ok)?;
                return Ok(Outcome::Close);
            }
            Command::Unparsed(Unparsed::InvalidArguments(command_type)) => {
                tracing::debug!("Bad arguments for {}", command_type.verb());
                write_status(out, Status::InvalidArguments)?;
            }
            Command::Unparsed(Unparsed::UnknownCommand(verb)) => {
                tracing::debug!("Unknown command {:?}", verb);
                write_status(out, Status::InvalidCommand)?;
            }
        }
        Ok(Outcome::Continue)
    }

    fn list_directory<W: Write>(&self, out: &mut W) -> Result<()> {
        // Nothing may be sent before enumeration succeeds
        let names = self.dir.list()?;

        write_status(out, Status::Ok)?;
        for name in &names {
            write_line(out, name)?;
        }
        out.write_all(EOL.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn get_metadata<W: Write>(&self, filename: &str, out: &mut W) -> Result<()> {
        match self.dir.lookup(filename)? {
            Lookup::Found { size, .. } => {
                write_status(out, Status::Ok)?;
                write_line(out, &size.to_string())?;
                out.flush()?;
            }
            Lookup::NotFound => write_status(out, Status::FileNotFound)?,
            Lookup::InvalidName => write_status(out, Status::InvalidArguments)?,
        }
        Ok(())
    }

    fn get_slice<W: Write>(&self, filename: &str, offset: u64, size: u64, out: &mut W) -> Result<()> {
        let (path, file_size) = match self.dir.lookup(filename)? {
            Lookup::Found { path, size } => (path, size),
            Lookup::NotFound => return write_status(out, Status::FileNotFound),
            Lookup::InvalidName => return write_status(out, Status::InvalidArguments),
        };

        let in_range = offset
            .checked_add(size)
            .is_some_and(|end| end <= file_size);
        if !in_range {
            return write_status(out, Status::BadOffset);
        }

        write_status(out, Status::Ok)?;
        let file = self.dir.open_at(&path, offset)?;
        write_base64(out, file, size)?;
        tracing::trace!("Sent {} bytes of {} from offset {}", size, filename, offset);
        Ok(())
    }
}
