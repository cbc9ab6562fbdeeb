//! CLI module for Keydeck
//!
//! Provides the `serve` subcommand that runs the HTTP API server.

pub mod serve;

use clap::{Parser, Subcommand};

/// Keydeck - self-serve API key management service
#[derive(Parser)]
#[command(name = "keydeck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,
}
