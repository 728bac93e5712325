//! Configuration for hftp
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{HftpError, Result};
use crate::protocol::MAX_LINE_LEN;

/// Main configuration for a server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// The single directory exposed to clients. Every filename argument
    /// resolves relative to it and must stay inside it.
    pub served_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrently served connections; further accepts wait for a slot
    pub max_connections: usize,

    /// Max bytes buffered while waiting for a request terminator
    pub max_line_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            served_dir: PathBuf::from("./testdata"),
            listen_addr: "127.0.0.1:19500".to_string(),
            max_connections: 32,
            max_line_len: MAX_LINE_LEN,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(HftpError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.max_line_len == 0 {
            return Err(HftpError::Config(
                "max_line_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the served directory
    pub fn served_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.served_dir = path.into();
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the maximum request line length (in bytes)
    pub fn max_line_len(mut self, len: usize) -> Self {
        self.config.max_line_len = len;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
