//! SnipShare CLI
//!
//! Command-line tools for the SnipShare data layer.
//!
//! # Commands
//!
//! - `serve` - Run the identity-webhook server
//! - `sign` - Produce provider signing headers for a payload
//! - `gen-secret` - Generate a fresh webhook signing secret

mod commands;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// SnipShare command-line tools.
#[derive(Parser)]
#[command(name = "snipshare")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the identity-webhook server
    Serve {
        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1:8787")]
        bind: SocketAddr,

        /// Environment variable holding the signing secret
        #[arg(long, default_value = "SNIPSHARE_WEBHOOK_SECRET")]
        secret_env: String,

        /// Replay tolerance for delivery timestamps, in seconds
        #[arg(long, default_value = "300")]
        tolerance: u64,
    },

    /// Produce provider signing headers for a payload
    Sign {
        /// Path to the payload file (reads stdin when omitted)
        #[arg(short, long)]
        payload: Option<PathBuf>,

        /// Delivery id (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Signing secret (falls back to the environment variable)
        #[arg(long)]
        secret: Option<String>,

        /// Environment variable holding the signing secret
        #[arg(long, default_value = "SNIPSHARE_WEBHOOK_SECRET")]
        secret_env: String,
    },

    /// Generate a fresh webhook signing secret
    GenSecret,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            bind,
            secret_env,
            tolerance,
        } => commands::serve::run(bind, &secret_env, tolerance)?,
        Commands::Sign {
            payload,
            id,
            secret,
            secret_env,
        } => commands::sign::run(payload.as_deref(), id, secret, &secret_env)?,
        Commands::GenSecret => commands::secret::run(),
    }

    Ok(())
}
