//! Reactor traits.
//!
//! - [`Reactor`] -- matches events and produces responses
//! - [`ReactorFactory`] -- builds a reactor from its config section

use std::sync::Arc;

use async_trait::async_trait;

use igor_types::error::ReactorError;
use igor_types::{Event, Response};

/// An event handler.
///
/// The hub may call `can_handle` and `handle` from several channel tasks
/// at once. Implementations that keep mutable state must synchronize it
/// internally.
#[async_trait]
pub trait Reactor: Send + Sync {
    /// Identifier used in config and logs (e.g. `"echo"`).
    fn name(&self) -> &str;

    /// Whether this reactor wants the event. Must be cheap and must not
    /// fail; malformed events simply return `false`.
    fn can_handle(&self, event: &Event) -> bool;

    /// Produce a response for an event this reactor accepted.
    ///
    /// `Ok(None)` means the reactor chose not to reply; the hub then tries
    /// the reactors after it.
    async fn handle(&self, event: &Event) -> Result<Option<Response>, ReactorError>;
}

/// Factory for creating reactors from configuration.
pub trait ReactorFactory: Send + Sync {
    /// Identifier this factory builds (e.g. `"fortune"`).
    fn reactor_name(&self) -> &str;

    /// Build a reactor from its config section.
    ///
    /// `config` is the reactor's table with the `enabled` key stripped;
    /// an absent section arrives as an empty object.
    fn build(&self, config: &serde_json::Value) -> Result<Arc<dyn Reactor>, ReactorError>;
}

/// Read an optional string setting, falling back to `default`.
pub(crate) fn string_setting(config: &serde_json::Value, key: &str, default: &str) -> String {
    config
        .get(key)
        .and_then(serde_json::Value::as_str)
        .unwrap_or(default)
        .to_owned()
}
