//! `igor run` -- start the hub and its channels.
//!
//! Loads the config (fatal on error), installs logging, builds every
//! enabled plugin from the built-in registry, and runs the hub until an
//! interrupt signal arrives or a channel requests shutdown.

use std::sync::Arc;

use clap::Args;
use tracing::{info, warn};

use igor_core::{Hub, PluginRegistry};

use crate::logging;

/// Arguments for the `igor run` subcommand.
#[derive(Args)]
pub struct RunArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

pub async fn run(args: RunArgs, verbose: bool) -> anyhow::Result<()> {
    let (path, config) = super::load_config(args.config.as_deref())?;
    logging::init(verbose, &config.logging)?;
    info!(path = %path.display(), "configuration loaded");

    let registry = PluginRegistry::builtin();
    let hub = Arc::new(Hub::new());
    let report = hub.configure(&config, &registry)?;
    if report.channels.is_empty() {
        warn!("no channels loaded; nothing will be received");
    }

    hub.run(shutdown_signal()).await?;
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C"),
        () = terminate => info!("received SIGTERM"),
    }
}
