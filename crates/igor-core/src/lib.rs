//! Core of the igor message hub.
//!
//! - [`registry::PluginRegistry`] maps plugin identifiers to factories
//! - [`hub::Hub`] owns the loaded plugins, dispatches events to the first
//!   matching reactor, and coordinates listening and shutdown

pub mod hub;
pub mod registry;

pub use hub::{Hub, HubState, LoadReport, SkippedPlugin};
pub use registry::PluginRegistry;
