//! Channel plugin trait definitions.
//!
//! - [`Channel`] -- implemented by each transport (console, Telegram, ...)
//! - [`EventTranslator`] -- the pure native-input-to-[`Event`] conversion
//!   each transport provides
//! - [`ChannelHost`] -- implemented by the hub, consumed by channels for
//!   dispatching events and requesting shutdown
//! - [`ChannelFactory`] -- implemented by plugins, consumed by the plugin
//!   registry to instantiate channels from configuration

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use igor_types::error::ChannelError;
use igor_types::{DispatchOutcome, Event, Response};

/// Status of a channel plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Not yet started, or stopped.
    Stopped,
    /// Currently connecting / initializing.
    Starting,
    /// Listening for input.
    Running,
    /// Encountered an error; may recover.
    Error(String),
    /// Shutting down.
    Stopping,
}

/// The trait every channel plugin must implement.
///
/// The hub manages the lifecycle:
///
/// 1. A [`ChannelFactory`] creates the channel from its config section.
/// 2. The hub spawns [`start_listening`](Channel::start_listening) in its own
///    task with an `Arc<dyn ChannelHost>` and a [`CancellationToken`].
/// 3. For each input addressed to the hub, the channel awaits
///    [`ChannelHost::dispatch`] before reading the next one, so events from
///    one channel are handled strictly in arrival order.
/// 4. The hub calls [`send_response`](Channel::send_response) from inside
///    that dispatch.
/// 5. On shutdown the hub cancels the token and calls
///    [`stop_listening`](Channel::stop_listening).
#[async_trait]
pub trait Channel: Send + Sync {
    /// Registered channel name (e.g. `"console"`, `"telegram"`).
    fn name(&self) -> &str;

    /// Current lifecycle status.
    fn status(&self) -> ChannelStatus;

    /// Listen for platform input until cancelled or the transport ends.
    ///
    /// Input that is not addressed to the hub is ignored silently.
    async fn start_listening(
        &self,
        host: Arc<dyn ChannelHost>,
        cancel: CancellationToken,
    ) -> Result<(), ChannelError>;

    /// Release transport resources and make the listen loop exit promptly.
    ///
    /// Calling this more than once has the same effect as calling it once.
    async fn stop_listening(&self) -> Result<(), ChannelError>;

    /// Deliver `response` to the destination implied by `event`.
    async fn send_response(&self, event: &Event, response: &Response) -> Result<(), ChannelError>;
}

/// Converts a transport's native input into an [`Event`].
///
/// Implementations are pure: no I/O, no side effects. The resulting
/// event's `channel` is always the channel's registered name.
pub trait EventTranslator {
    /// The transport's native input type.
    type Native;

    /// Translate one native input.
    fn to_event(&self, native: &Self::Native) -> Event;
}

/// Services the hub exposes to channel plugins.
///
/// Passed into [`Channel::start_listening`] so channels never hold a
/// reference to the hub itself.
#[async_trait]
pub trait ChannelHost: Send + Sync {
    /// Route one event to a reactor and its response back to the channel.
    ///
    /// Never fails: problems are logged by the host and reported in the
    /// returned outcome.
    async fn dispatch(&self, event: Event) -> DispatchOutcome;

    /// Ask the hub to shut down (e.g. the console's quit command).
    fn request_shutdown(&self);
}

/// Factory for creating [`Channel`] instances from configuration.
pub trait ChannelFactory: Send + Sync {
    /// The channel identifier this factory creates (e.g. `"telegram"`).
    fn channel_name(&self) -> &str;

    /// Create a channel instance from its config section.
    fn build(&self, config: &serde_json::Value) -> Result<Arc<dyn Channel>, ChannelError>;
}
