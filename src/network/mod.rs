//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread, gated by the admission controller
//! - One worker thread per connection, no state shared between them
//! - Commands executed by the shared `RequestHandler`

mod admission;
mod connection;
mod server;

pub use admission::{AdmissionController, Permit};
pub use connection::{Connection, SessionState};
pub use server::Server;
