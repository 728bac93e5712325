//! # hftp
//!
//! A single-directory file server reachable over a line-oriented text
//! protocol:
//! - `get_file_listing`, `get_metadata`, `get_slice`, `quit`
//! - Byte-range slices streamed as base64
//! - One thread per connection, with a cap on concurrent sessions
//! - Strict confinement of every filename to the served directory
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Listener                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                Admission Controller                         │
//! │          (blocks accept when K sessions run)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one thread each
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Connection                              │
//! │        LineReader → Command::parse → RequestHandler          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐
//!               │  ServedDir   │
//!               │ (read-only)  │
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod directory;
pub mod handler;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{HftpError, Result};
pub use config::Config;
pub use network::Server;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of hftp
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
