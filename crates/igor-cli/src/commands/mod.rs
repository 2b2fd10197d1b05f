//! CLI command implementations for `igor`.
//!
//! - [`run`] -- Start the hub until interrupted.
//! - [`check`] -- Dry-run plugin loading.
//! - [`plugins`] -- List built-in plugins.

pub mod check;
pub mod plugins;
pub mod run;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::anyhow;

use igor_types::config::Config;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "IGOR_CONFIG";

/// Config file looked for in the working directory.
const LOCAL_CONFIG: &str = "config.toml";

/// Find the config file.
///
/// Order: `config_override`, then `IGOR_CONFIG`, then `./config.toml`,
/// then `~/.igor/config.toml`. The first two are returned even if the
/// file does not exist so that loading reports the bad path.
pub fn discover_config_path(config_override: Option<&str>) -> Option<PathBuf> {
    discover_with(
        config_override,
        std::env::var_os(CONFIG_ENV),
        Path::new(LOCAL_CONFIG),
        dirs::home_dir(),
    )
}

fn discover_with(
    config_override: Option<&str>,
    env_path: Option<OsString>,
    local: &Path,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = config_override {
        return Some(PathBuf::from(path));
    }
    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    if local.is_file() {
        return Some(local.to_path_buf());
    }
    home.map(|h| h.join(".igor").join("config.toml"))
        .filter(|p| p.is_file())
}

/// Discover and load the config. Any failure is fatal to the caller.
pub fn load_config(config_override: Option<&str>) -> anyhow::Result<(PathBuf, Config)> {
    let path = discover_config_path(config_override).ok_or_else(|| {
        anyhow!(
            "no config file found; pass --config, set {CONFIG_ENV}, \
             or create ./{LOCAL_CONFIG}"
        )
    })?;
    let config = Config::load(&path)?;
    Ok((path, config))
}
