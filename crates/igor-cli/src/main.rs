//! `igor` -- CLI binary for the igor message hub.
//!
//! Provides the following subcommands:
//!
//! - `igor run` -- Start every configured channel and answer events until
//!   Ctrl+C, SIGTERM, or a channel asks to quit.
//! - `igor check` -- Load the config and report which plugins would load.
//! - `igor plugins` -- List the channel and reactor identifiers built in.

use clap::{Parser, Subcommand};

mod commands;
mod logging;

/// igor message hub CLI.
#[derive(Parser)]
#[command(name = "igor", about = "igor message hub", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Start the hub and its channels.
    Run(commands::run::RunArgs),

    /// Validate the config and show which plugins load.
    Check(commands::check::CheckArgs),

    /// List the built-in channel and reactor plugins.
    Plugins,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Plugin secrets such as TELEGRAM_BOT_TOKEN may live in ./.env.
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.verbose).await?,
        Commands::Check(args) => commands::check::run(args, cli.verbose)?,
        Commands::Plugins => {
            logging::init(cli.verbose, &Default::default())?;
            commands::plugins::run();
        }
    }

    Ok(())
}
