mod bot;
mod commands;
mod config;
mod feed;
mod scheduler;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "eventsbot", version)]
#[command(about = "Publish this week's calendar events as Discord scheduled events")]
struct Cli {
    /// Log what the bot does
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log everything, including API responses
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the calendar with Discord, then again every run interval
    Run {
        /// Configuration file; EVENTSBOT_* environment variables are used without one
        config: Option<PathBuf>,

        /// Run only once
        #[arg(short = '1', long)]
        once: bool,
    },
    /// Serverless entry point: one run configured from the environment
    Handle,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    match cli.command {
        Commands::Run { config, once } => commands::run::run(config.as_deref(), once).await,
        Commands::Handle => commands::handle::run().await,
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the flags.
fn init_tracing(verbose: bool, debug: bool) {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
