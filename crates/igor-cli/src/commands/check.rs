//! `igor check` -- load the config and report which plugins would load.
//!
//! Plugins are constructed but never started.

use std::fmt::Write as _;
use std::path::Path;

use clap::Args;

use igor_core::{Hub, LoadReport, PluginRegistry};

use crate::logging;

/// Arguments for the `igor check` subcommand.
#[derive(Args)]
pub struct CheckArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

pub fn run(args: CheckArgs, verbose: bool) -> anyhow::Result<()> {
    let (path, config) = super::load_config(args.config.as_deref())?;
    logging::init(verbose, &config.logging)?;

    let hub = Hub::new();
    let report = hub.configure(&config, &PluginRegistry::builtin())?;
    print!("{}", render_report(&path, &report));
    Ok(())
}

fn render_report(path: &Path, report: &LoadReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "config: {}", path.display());
    let _ = writeln!(out, "channels: {}", list_or_none(&report.channels));
    let _ = writeln!(out, "reactors: {}", list_or_none(&report.reactors));
    if !report.disabled.is_empty() {
        let _ = writeln!(out, "disabled: {}", report.disabled.join(", "));
    }
    for skipped in &report.skipped {
        let _ = writeln!(
            out,
            "skipped {} '{}': {}",
            skipped.kind, skipped.name, skipped.reason
        );
    }
    out
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_owned()
    } else {
        names.join(", ")
    }
}
