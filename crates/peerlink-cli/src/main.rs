//! Peerlink CLI entry point

use clap::Parser;
use tracing::error;

use peerlink_cli::{
    app,
    cli::{Cli, Commands},
    error::Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let outcome = match &cli.command {
        Commands::Demo { host_id } => app::run_demo(host_id, cli.json).await,
        Commands::Chat { host_id } => app::run_chat(host_id, cli.json).await,
    };

    if let Err(err) = outcome {
        error!("command failed: {}", err);
        std::process::exit(1);
    }
    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
