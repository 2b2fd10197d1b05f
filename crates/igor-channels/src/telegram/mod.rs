//! Telegram bot channel.
//!
//! Long-polls `getUpdates`, turns messages whose text starts with the
//! keyword into events, and answers through `sendMessage` in the chat the
//! event came from (`chat_id` extra). Built by [`TelegramChannelFactory`]
//! from `[channels.telegram]`.

pub mod channel;
pub mod client;
pub mod types;

pub use channel::{TelegramChannel, TelegramChannelFactory};
pub use client::TelegramClient;
