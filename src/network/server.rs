//! TCP Server
//!
//! Accepts connections and hands each one to its own worker thread.

use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::directory::ServedDir;
use crate::error::Result;
use crate::handler::RequestHandler;
use super::admission::AdmissionController;
use super::connection::Connection;

/// TCP server for one served directory
pub struct Server {
    config: Config,
    listener: TcpListener,
    handler: Arc<RequestHandler>,
    admission: Arc<AdmissionController>,

    /// Ids for worker thread names
    next_id: AtomicU64,
}

impl Server {
    /// Validate `config`, open the served directory and bind the listener
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;

        let dir = ServedDir::open(&config.served_dir)?;
        let listener = TcpListener::bind(&config.listen_addr)?;

        tracing::info!(
            "Serving {} on {}",
            dir.root().display(),
            listener.local_addr()?
        );

        Ok(Self {
            handler: Arc::new(RequestHandler::new(dir)),
            admission: AdmissionController::new(config.max_connections),
            listener,
            config,
            next_id: AtomicU64::new(0),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Admission slots, for observing load
    pub fn admission(&self) -> &Arc<AdmissionController> {
        &self.admission
    }

    /// Accept loop (blocking, never returns on its own)
    ///
    /// A slot is taken before each accept, so once `max_connections`
    /// sessions are running further clients wait in the kernel backlog.
    pub fn run(&self) -> Result<()> {
        loop {
            let permit = self.admission.acquire();

            let (stream, addr) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };
            tracing::info!(
                "Connection from {} ({} of {} slots in use)",
                addr,
                self.admission.in_use(),
                self.admission.capacity()
            );

            let handler = Arc::clone(&self.handler);
            let max_line_len = self.config.max_line_len;
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);

            let spawned = thread::Builder::new()
                .name(format!("hftp-conn-{}", id))
                .spawn(move || {
                    // Held for the whole session, released on every exit path
                    let _permit = permit;

                    let result = Connection::new(stream, handler, max_line_len)
                        .and_then(|connection| connection.serve());
                    if let Err(e) = result {
                        tracing::warn!("Connection {} ended with error: {}", addr, e);
                    }
                    tracing::debug!("Connection {} closed", addr);
                });

            if let Err(e) = spawned {
                tracing::error!("Failed to spawn worker for {}: {}", addr, e);
            }
        }
    }

    /// Run the accept loop on a background thread
    pub fn spawn(self) -> Result<thread::JoinHandle<Result<()>>> {
        let handle = thread::Builder::new()
            .name("hftp-accept".to_string())
            .spawn(move || self.run())?;
        Ok(handle)
    }
}
