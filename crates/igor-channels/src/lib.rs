//! Channel plugin system for igor.
//!
//! A channel adapts one communication transport (a terminal, a Telegram
//! bot, ...) to the [`Event`](igor_types::Event) /
//! [`Response`](igor_types::Response) model. Each channel implements the
//! [`Channel`] trait and is built from config by a [`ChannelFactory`].
//!
//! # Architecture
//!
//! ```text
//! ChannelFactory ──build()──> Arc<dyn Channel>
//!                                 │
//!                  Channel::start_listening(host, cancel)
//!                           │              │
//!                   CancellationToken   Arc<dyn ChannelHost>
//!                                          │
//!                         host.dispatch(event).await   (one at a time)
//!                                          │
//!                        Channel::send_response(event, response)
//! ```

pub mod console;
pub mod filter;
pub mod telegram;
pub mod traits;

pub use console::{ConsoleChannel, ConsoleChannelFactory};
pub use telegram::{TelegramChannel, TelegramChannelFactory};
pub use traits::*;

// Re-export the canonical error type so callers do not need to depend
// on igor-types directly for channel errors.
pub use igor_types::error::ChannelError;
