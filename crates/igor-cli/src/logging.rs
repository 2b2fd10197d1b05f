//! Tracing subscriber setup.
//!
//! Terminal output goes to stderr so it never interleaves with the console
//! channel's prompt on stdout. When `[logging] file` is set, every event
//! is also appended to that file without ANSI colors.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use igor_types::config::LoggingConfig;

/// Filter used when `RUST_LOG` is unset.
fn default_directive(verbose: bool, logging: &LoggingConfig) -> String {
    if verbose {
        "debug".to_owned()
    } else {
        logging.level.clone()
    }
}

/// Install the global subscriber. `RUST_LOG` overrides both `-v` and the
/// configured level.
pub fn init(verbose: bool, logging: &LoggingConfig) -> anyhow::Result<()> {
    let directive = default_directive(verbose, logging);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

    let terminal_layer = fmt::layer()
        .with_ansi(logging.ansi)
        .with_writer(std::io::stderr);

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(terminal_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}
