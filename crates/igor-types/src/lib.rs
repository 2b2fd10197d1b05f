//! # igor-types
//!
//! Core type definitions for the igor message hub.
//!
//! Every other igor crate depends on this one. It contains:
//!
//! - **[`event`]** -- [`Event`] and [`Response`], the carriers passed between
//!   channels, the hub and reactors
//! - **[`dispatch`]** -- [`DispatchOutcome`], the result of routing one event
//! - **[`error`]** -- [`IgorError`], [`ChannelError`] and [`ReactorError`]
//! - **[`config`]** -- Configuration schema and file parsing

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;

pub use config::Config;
pub use dispatch::DispatchOutcome;
pub use error::{ChannelError, IgorError, ReactorError, Result};
pub use event::{Event, EventType, ExtraValue, Response};
