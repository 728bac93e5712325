//! hftp Server Binary
//!
//! Serves one directory over the hftp protocol.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use hftp::{Config, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// hftp Server
#[derive(Parser, Debug)]
#[command(name = "hftp-server")]
#[command(about = "Serve a single directory over a line-oriented TCP protocol")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1")]
    address: String,

    /// TCP port to listen on
    #[arg(short, long, default_value_t = 19500)]
    port: u16,

    /// Shared directory (created if missing)
    #[arg(short, long, default_value = "testdata")]
    datadir: PathBuf,

    /// Maximum concurrently served connections
    #[arg(short, long, default_value_t = 32)]
    max_connections: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hftp=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("hftp Server v{}", hftp::VERSION);
    println!(
        "Serving {} on {}:{}.",
        args.datadir.display(),
        args.address,
        args.port
    );

    if !args.datadir.is_dir() {
        if let Err(e) = fs::create_dir_all(&args.datadir) {
            tracing::error!("Failed to create {}: {}", args.datadir.display(), e);
            std::process::exit(1);
        }
        tracing::info!("Created served directory {}", args.datadir.display());
    }

    let config = Config::builder()
        .served_dir(&args.datadir)
        .listen_addr(format!("{}:{}", args.address, args.port))
        .max_connections(args.max_connections)
        .build();

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
