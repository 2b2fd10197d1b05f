//! Outcome of routing one event through the hub.

use std::fmt;

/// What a single dispatch did.
///
/// The hub never surfaces a failed dispatch as an error to the channel
/// that submitted the event. This value exists for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A reactor produced a response and the channel accepted it.
    Delivered {
        /// Name of the reactor that handled the event.
        reactor: String,
        /// Channel the response was delivered to.
        channel: String,
    },
    /// No reactor matched, or every matching reactor chose not to reply.
    Unhandled,
    /// The event names a channel the hub does not know.
    UnknownChannel {
        /// The unknown channel name.
        channel: String,
    },
    /// The channel failed to deliver the response.
    DeliveryFailed {
        /// Channel that failed.
        channel: String,
        /// Error reported by the channel.
        reason: String,
    },
    /// The matching reactor returned an error or panicked.
    ReactorFailed {
        /// Name of the failing reactor.
        reactor: String,
        /// What went wrong.
        reason: String,
    },
    /// The hub is shutting down or stopped and did not look at the event.
    Rejected,
}

impl DispatchOutcome {
    /// Whether a response reached its channel.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered { reactor, channel } => {
                write!(f, "delivered by {reactor} to {channel}")
            }
            Self::Unhandled => f.write_str("no reactor handled the event"),
            Self::UnknownChannel { channel } => write!(f, "channel {channel} not found"),
            Self::DeliveryFailed { channel, reason } => {
                write!(f, "delivery to {channel} failed: {reason}")
            }
            Self::ReactorFailed { reactor, reason } => {
                write!(f, "reactor {reactor} failed: {reason}")
            }
            Self::Rejected => f.write_str("hub is not accepting events"),
        }
    }
}
