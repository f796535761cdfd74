//! CLI module for perfume-db.
//!
//! Subcommands:
//! - `serve`: Run the HTTP API

mod serve;

use clap::{Parser, Subcommand};

/// perfume-db - perfume catalog API
#[derive(Parser)]
#[command(name = "perfume-db")]
#[command(about = "Perfume catalog API - houses, perfumers, notes and perfumes")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Host address to bind to (overrides `server.host`)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides `server.port`)
        #[arg(long)]
        port: Option<u16>,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Serve { ref host, port } => self.run_serve(host.as_deref(), port).await,
        }
    }
}
