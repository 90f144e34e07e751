//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit session events as JSON lines instead of formatted text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scripted host/client exchange over the in-memory broker
    Demo {
        /// Identity the host registers with the broker
        #[arg(long, default_value = "demo-host")]
        host_id: String,
    },
    /// Interactive session: type a line to send it from the client side
    Chat {
        /// Identity the host registers and the client dials
        #[arg(long, default_value = "local-host")]
        host_id: String,
    },
}
