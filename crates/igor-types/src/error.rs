//! Error types for the igor hub.
//!
//! [`IgorError`] is the top-level error type. [`ChannelError`] and
//! [`ReactorError`] are reported by plugins and absorbed by the hub; they
//! never terminate the process on their own. All three are non-exhaustive.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the igor hub.
///
/// Only the configuration variants are fatal at startup. Plugin load
/// failures are collected and logged by the hub instead of propagated.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IgorError {
    // ── Fatal ────────────────────────────────────────────────────────

    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        /// Path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML / JSON.
    #[error("failed to parse config {}: {reason}", path.display())]
    ConfigParse {
        /// Path that was parsed.
        path: PathBuf,
        /// Parser error message.
        reason: String,
    },

    /// Configuration parsed but is semantically invalid.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// The hub was asked to do something its current state does not allow.
    #[error("hub is {actual}, expected {expected}")]
    InvalidState {
        /// The state the operation requires.
        expected: String,
        /// The state the hub is actually in.
        actual: String,
    },

    // ── Recovered per plugin ─────────────────────────────────────────

    /// A channel or reactor could not be constructed.
    #[error("failed to load {kind} '{name}': {reason}")]
    PluginLoadFailed {
        /// `"channel"` or `"reactor"`.
        kind: &'static str,
        /// Plugin identifier from the config.
        name: String,
        /// Why construction failed.
        reason: String,
    },
}

/// Channel-specific error type.
///
/// Used by channel implementations (console, Telegram, ...) to report
/// failures in connecting, authenticating, or exchanging messages.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ChannelError {
    /// Failed to establish a connection to the channel backend.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication / authorization was rejected.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Sending a message failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receiving a message failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The channel was stopped and cannot listen again.
    #[error("channel already stopped")]
    AlreadyStopped,

    /// The event lacks metadata needed to address a reply.
    #[error("event is missing '{0}' metadata")]
    MissingMetadata(String),

    /// Catch-all for errors that do not fit other variants.
    #[error("{0}")]
    Other(String),
}

/// Reactor-specific error type.
///
/// Ordinary failures inside `Reactor::handle` (a failed HTTP call, a bad
/// payload) should become an apology response instead. An error of this
/// type means the reactor could not do its job at all, and the hub aborts
/// only the current dispatch.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReactorError {
    /// The reactor's config section is unusable.
    #[error("invalid reactor config: {0}")]
    InvalidConfig(String),

    /// Handling the event failed unexpectedly.
    #[error("reactor failed: {0}")]
    Failed(String),
}

/// A convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, IgorError>;
