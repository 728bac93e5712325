//! Served Directory
//!
//! The single root every filename argument resolves against.
//!
//! ## Confinement
//! A filename is accepted only if it passes the charset check and its
//! canonical path (symlinks and `..` resolved) still lies under the
//! canonical root. Both checks happen before anything is opened.

use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{HftpError, Result};
use crate::protocol::is_valid_filename;

/// Outcome of resolving a client-supplied filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// A regular file inside the root
    Found { path: PathBuf, size: u64 },

    /// Nothing (or not a regular file) at that name
    NotFound,

    /// Bad characters, or the name escapes the root
    InvalidName,
}

/// Read-only view of the served directory
#[derive(Debug, Clone)]
pub struct ServedDir {
    /// Canonical absolute path
    root: PathBuf,
}

impl ServedDir {
    /// Open an existing directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let root = fs::canonicalize(path)?;
        if !root.is_dir() {
            return Err(HftpError::Config(format!(
                "served path is not a directory: {}",
                path.display()
            )));
        }
        Ok(Self { root })
    }

    /// Canonical path of the root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of the immediate children, in filesystem order
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    /// Resolve `name` to a regular file inside the root
    ///
    /// Only unexpected filesystem failures are returned as `Err`.
    pub fn lookup(&self, name: &str) -> Result<Lookup> {
        if !is_valid_filename(name) {
            return Ok(Lookup::InvalidName);
        }

        let path = match fs::canonicalize(self.root.join(name)) {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Lookup::NotFound),
            Err(e) => return Err(e.into()),
        };
        if !path.starts_with(&self.root) {
            return Ok(Lookup::InvalidName);
        }

        let metadata = fs::metadata(&path)?;
        if !metadata.is_file() {
            return Ok(Lookup::NotFound);
        }

        Ok(Lookup::Found {
            path,
            size: metadata.len(),
        })
    }

    /// Open a resolved file positioned at `offset`
    pub fn open_at(&self, path: &Path, offset: u64) -> Result<File> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(offset))?;
        Ok(file)
    }
}
