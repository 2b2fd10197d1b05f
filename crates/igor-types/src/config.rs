//! Configuration schema types.
//!
//! The config file declares two plugin sections, `channels` and `reactors`,
//! each mapping a plugin identifier to plugin-specific settings, plus the
//! optional `hub` and `logging` sections:
//!
//! ```toml
//! [hub]
//! shutdown_grace_secs = 5
//!
//! [logging]
//! level = "info"
//! file = "igor.log"
//!
//! [channels.console]
//!
//! [channels.telegram]
//! allowed_users = ["12345"]
//!
//! [reactors.echo]
//!
//! [reactors.fortune]
//! fortunes = ["Fortune favours the bold"]
//! ```
//!
//! Reactor order in the file is match priority, so plugin sections are kept
//! as ordered lists rather than hash maps. Unknown top-level keys are
//! ignored.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{IgorError, Result};

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration for the hub.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Hub lifecycle settings.
    #[serde(default)]
    pub hub: HubConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Channel plugins, in declaration order.
    #[serde(default, deserialize_with = "plugin_sections")]
    pub channels: Vec<PluginSection>,

    /// Reactor plugins, in declaration (= priority) order.
    #[serde(default, deserialize_with = "plugin_sections")]
    pub reactors: Vec<PluginSection>,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> std::result::Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }

    /// Parse a JSON document.
    pub fn from_json_str(raw: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    }

    /// Read and parse a config file, then validate it.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| IgorError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&raw)
        } else {
            Self::from_toml_str(&raw)
        };

        let config = parsed.map_err(|reason| IgorError::ConfigParse {
            path: path.to_path_buf(),
            reason,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check semantic constraints that the parser cannot express.
    pub fn validate(&self) -> Result<()> {
        for (kind, sections) in [("channel", &self.channels), ("reactor", &self.reactors)] {
            for section in sections {
                if section.name.trim().is_empty() {
                    return Err(IgorError::ConfigInvalid {
                        reason: format!("{kind} identifier must not be empty"),
                    });
                }
                if section.name.chars().any(char::is_whitespace) {
                    return Err(IgorError::ConfigInvalid {
                        reason: format!(
                            "{kind} identifier '{}' must not contain whitespace",
                            section.name
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

// ── Hub ──────────────────────────────────────────────────────────────────

/// Hub lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// How long shutdown waits for listen tasks before aborting them.
    #[serde(default = "default_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl HubConfig {
    /// The shutdown grace period as a [`Duration`].
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: default_grace_secs(),
        }
    }
}

fn default_grace_secs() -> u64 {
    5
}

// ── Logging ──────────────────────────────────────────────────────────────

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (`"info"`, `"igor_core=debug"`, ...).
    #[serde(default = "default_level")]
    pub level: String,

    /// Optional file that receives a copy of every log line.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Colorize terminal output.
    #[serde(default = "default_true")]
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
            ansi: true,
        }
    }
}

fn default_level() -> String {
    "info".into()
}

fn default_true() -> bool {
    true
}

// ── Plugin sections ──────────────────────────────────────────────────────

/// One `[channels.<id>]` or `[reactors.<id>]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSection {
    /// Plugin identifier, resolved through the plugin registry.
    pub name: String,

    /// `false` when the section sets `enabled = false`.
    pub enabled: bool,

    /// Plugin-specific settings handed to the factory verbatim.
    pub settings: serde_json::Value,
}

impl PluginSection {
    /// Build a section from its identifier and raw value.
    ///
    /// A table becomes the settings object with its `enabled` key
    /// removed; a bare boolean (`echo = false`) only toggles the plugin.
    pub fn from_value(name: impl Into<String>, value: serde_json::Value) -> Self {
        let (enabled, settings) = match value {
            serde_json::Value::Bool(enabled) => {
                (enabled, serde_json::Value::Object(Default::default()))
            }
            serde_json::Value::Object(mut map) => {
                let enabled = map
                    .remove("enabled")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(true);
                (enabled, serde_json::Value::Object(map))
            }
            other => (true, other),
        };
        Self {
            name: name.into(),
            enabled,
            settings,
        }
    }
}

/// Deserialize a map of sections while keeping the document's key order.
fn plugin_sections<'de, D>(deserializer: D) -> std::result::Result<Vec<PluginSection>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SectionsVisitor;

    impl<'de> Visitor<'de> for SectionsVisitor {
        type Value = Vec<PluginSection>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a table of plugin identifiers to settings")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut sections = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, value)) = map.next_entry::<String, serde_json::Value>()? {
                sections.push(PluginSection::from_value(name, value));
            }
            Ok(sections)
        }
    }

    deserializer.deserialize_map(SectionsVisitor)
}
