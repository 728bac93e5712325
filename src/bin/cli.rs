//! hftp CLI Client
//!
//! Command-line interface for fetching files from an hftp server.

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use hftp::{Client, Result};

/// hftp CLI
#[derive(Parser, Debug)]
#[command(name = "hftp-cli")]
#[command(about = "CLI for the hftp file server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:19500")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the served directory
    Ls,

    /// Print the size of a file
    Metadata {
        /// The file to inspect
        filename: String,
    },

    /// Write a byte range of a file to stdout
    Slice {
        /// The file to read
        filename: String,

        /// First byte
        offset: u64,

        /// Number of bytes
        size: u64,
    },

    /// Download a whole file to stdout
    Get {
        /// The file to read
        filename: String,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Ls => {
            for name in client.file_listing()? {
                println!("{}", name);
            }
        }
        Commands::Metadata { filename } => {
            println!("{}", client.metadata(&filename)?);
        }
        Commands::Slice {
            filename,
            offset,
            size,
        } => {
            let data = client.slice(&filename, offset, size)?;
            io::stdout().write_all(&data)?;
        }
        Commands::Get { filename } => {
            let size = client.metadata(&filename)?;
            let data = client.slice(&filename, 0, size)?;
            io::stdout().write_all(&data)?;
        }
    }

    client.quit()
}
