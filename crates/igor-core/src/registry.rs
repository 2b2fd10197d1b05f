//! [`PluginRegistry`] -- maps plugin identifiers to factories.
//!
//! The registry replaces dynamic module loading: every plugin the binary
//! can run is registered up front, and the config only selects among them.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use igor_channels::{Channel, ChannelFactory, ConsoleChannelFactory, TelegramChannelFactory};
use igor_reactors::{
    CatPicReactorFactory, EchoReactorFactory, FortuneReactorFactory, Reactor, ReactorFactory,
};
use igor_types::error::{IgorError, Result};

/// Channel and reactor factories, keyed by identifier.
#[derive(Default)]
pub struct PluginRegistry {
    channels: HashMap<String, Arc<dyn ChannelFactory>>,
    reactors: HashMap<String, Arc<dyn ReactorFactory>>,
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every plugin shipped with igor:
    /// channels `console` and `telegram`, reactors `echo`, `fortune`
    /// and `catpic`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_channel(Arc::new(ConsoleChannelFactory));
        registry.register_channel(Arc::new(TelegramChannelFactory));
        registry.register_reactor(Arc::new(EchoReactorFactory));
        registry.register_reactor(Arc::new(FortuneReactorFactory));
        registry.register_reactor(Arc::new(CatPicReactorFactory));
        registry
    }

    /// Register a channel factory, replacing any with the same name.
    pub fn register_channel(&mut self, factory: Arc<dyn ChannelFactory>) {
        let name = factory.channel_name().to_owned();
        debug!(channel = %name, "registering channel factory");
        self.channels.insert(name, factory);
    }

    /// Register a reactor factory, replacing any with the same name.
    pub fn register_reactor(&mut self, factory: Arc<dyn ReactorFactory>) {
        let name = factory.reactor_name().to_owned();
        debug!(reactor = %name, "registering reactor factory");
        self.reactors.insert(name, factory);
    }

    /// Build the channel registered as `name` from its settings.
    pub fn build_channel(
        &self,
        name: &str,
        settings: &serde_json::Value,
    ) -> Result<Arc<dyn Channel>> {
        let factory = self
            .channels
            .get(name)
            .ok_or_else(|| not_registered("channel", name))?;
        factory.build(settings).map_err(|e| IgorError::PluginLoadFailed {
            kind: "channel",
            name: name.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Build the reactor registered as `name` from its settings.
    pub fn build_reactor(
        &self,
        name: &str,
        settings: &serde_json::Value,
    ) -> Result<Arc<dyn Reactor>> {
        let factory = self
            .reactors
            .get(name)
            .ok_or_else(|| not_registered("reactor", name))?;
        factory.build(settings).map_err(|e| IgorError::PluginLoadFailed {
            kind: "reactor",
            name: name.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Registered channel identifiers, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        sorted_keys(&self.channels)
    }

    /// Registered reactor identifiers, sorted.
    pub fn reactor_names(&self) -> Vec<String> {
        sorted_keys(&self.reactors)
    }
}

fn not_registered(kind: &'static str, name: &str) -> IgorError {
    IgorError::PluginLoadFailed {
        kind,
        name: name.to_owned(),
        reason: "no such plugin is registered".into(),
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut names: Vec<String> = map.keys().cloned().collect();
    names.sort();
    names
}
