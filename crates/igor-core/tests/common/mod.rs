//! Mock channels and reactors shared by the hub integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use igor_channels::{Channel, ChannelError, ChannelFactory, ChannelHost, ChannelStatus};
use igor_core::PluginRegistry;
use igor_reactors::{Reactor, ReactorError, ReactorFactory};
use igor_types::{Event, Response};

// ── Channels ─────────────────────────────────────────────────────────────

/// How a [`MockChannel`] behaves once listening.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Listen {
    /// Wait for cancellation.
    UntilCancelled,
    /// Return immediately.
    Immediately,
    /// Ask the host to shut down, then wait for cancellation.
    RequestShutdown,
    /// Never return, ignoring cancellation.
    Forever,
}

/// Channel that records delivered responses.
pub struct MockChannel {
    name: String,
    listen: Listen,
    fail_sends: bool,
    pub sent: std::sync::Mutex<Vec<Response>>,
    pub started: AtomicBool,
    pub stop_calls: AtomicUsize,
}

impl MockChannel {
    pub fn new(name: &str) -> Arc<Self> {
        Self::build(name, Listen::UntilCancelled, false)
    }

    pub fn listening(name: &str, listen: Listen) -> Arc<Self> {
        Self::build(name, listen, false)
    }

    pub fn failing(name: &str) -> Arc<Self> {
        Self::build(name, Listen::UntilCancelled, true)
    }

    fn build(name: &str, listen: Listen, fail_sends: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            listen,
            fail_sends,
            sent: std::sync::Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
            stop_calls: AtomicUsize::new(0),
        })
    }

    pub fn sent_contents(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.content.clone())
            .collect()
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> ChannelStatus {
        ChannelStatus::Running
    }

    async fn start_listening(
        &self,
        host: Arc<dyn ChannelHost>,
        cancel: CancellationToken,
    ) -> Result<(), ChannelError> {
        self.started.store(true, Ordering::SeqCst);
        match self.listen {
            Listen::UntilCancelled => cancel.cancelled().await,
            Listen::Immediately => {}
            Listen::RequestShutdown => {
                host.request_shutdown();
                cancel.cancelled().await;
            }
            Listen::Forever => std::future::pending::<()>().await,
        }
        Ok(())
    }

    async fn stop_listening(&self) -> Result<(), ChannelError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_response(&self, _event: &Event, response: &Response) -> Result<(), ChannelError> {
        if self.fail_sends {
            return Err(ChannelError::SendFailed("wire unplugged".into()));
        }
        self.sent.lock().unwrap().push(response.clone());
        Ok(())
    }
}

/// Factory handing out one pre-built channel.
pub struct SharedChannelFactory {
    name: String,
    channel: Arc<dyn Channel>,
}

impl SharedChannelFactory {
    pub fn new(name: &str, channel: Arc<dyn Channel>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            channel,
        })
    }
}

impl ChannelFactory for SharedChannelFactory {
    fn channel_name(&self) -> &str {
        &self.name
    }

    fn build(&self, _config: &serde_json::Value) -> Result<Arc<dyn Channel>, ChannelError> {
        Ok(self.channel.clone())
    }
}

// ── Reactors ─────────────────────────────────────────────────────────────

/// What a [`MockReactor`] does once selected.
#[derive(Clone)]
pub enum Reply {
    /// Respond with this text on the event's channel.
    Text(String),
    /// Respond with this text, tagged for another channel.
    TaggedFor(String, String),
    /// Return `Ok(None)`.
    Nothing,
    /// Return an error.
    Fail,
    /// Panic inside `handle`.
    Panic,
}

/// Reactor that accepts events starting with a prefix and counts calls.
pub struct MockReactor {
    name: String,
    prefix: String,
    reply: Reply,
    panic_in_match: bool,
    pub matched: AtomicUsize,
    pub handled: AtomicUsize,
}

impl MockReactor {
    pub fn new(name: &str, prefix: &str, reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            prefix: prefix.to_owned(),
            reply,
            panic_in_match: false,
            matched: AtomicUsize::new(0),
            handled: AtomicUsize::new(0),
        })
    }

    pub fn panicking_matcher(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            prefix: String::new(),
            reply: Reply::Nothing,
            panic_in_match: true,
            matched: AtomicUsize::new(0),
            handled: AtomicUsize::new(0),
        })
    }

    pub fn handled(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Reactor for MockReactor {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, event: &Event) -> bool {
        self.matched.fetch_add(1, Ordering::SeqCst);
        if self.panic_in_match {
            panic!("matcher exploded");
        }
        event.content.starts_with(&self.prefix)
    }

    async fn handle(&self, event: &Event) -> Result<Option<Response>, ReactorError> {
        self.handled.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Text(text) => Ok(Some(Response::to_event(event, text.as_str()))),
            Reply::TaggedFor(text, channel) => {
                Ok(Some(Response::new(text.as_str(), channel.as_str())))
            }
            Reply::Nothing => Ok(None),
            Reply::Fail => Err(ReactorError::Failed("upstream unavailable".into())),
            Reply::Panic => panic!("handler exploded"),
        }
    }
}

/// Factory handing out one pre-built reactor.
pub struct SharedReactorFactory {
    name: String,
    reactor: Arc<dyn Reactor>,
}

impl SharedReactorFactory {
    pub fn new(name: &str, reactor: Arc<dyn Reactor>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            reactor,
        })
    }
}

impl ReactorFactory for SharedReactorFactory {
    fn reactor_name(&self) -> &str {
        &self.name
    }

    fn build(&self, _config: &serde_json::Value) -> Result<Arc<dyn Reactor>, ReactorError> {
        Ok(self.reactor.clone())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Register `channels` and `reactors` under their own names.
pub fn registry_with(
    channels: &[Arc<MockChannel>],
    reactors: &[Arc<MockReactor>],
) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    for channel in channels {
        registry.register_channel(SharedChannelFactory::new(channel.name(), channel.clone()));
    }
    for reactor in reactors {
        registry.register_reactor(SharedReactorFactory::new(reactor.name(), reactor.clone()));
    }
    registry
}

/// A TOML config enabling the given channels and reactors, in order.
pub fn config_toml(channels: &[&str], reactors: &[&str]) -> String {
    let mut toml = String::from("[hub]\nshutdown_grace_secs = 1\n");
    for name in channels {
        toml.push_str(&format!("\n[channels.{name}]\n"));
    }
    for name in reactors {
        toml.push_str(&format!("\n[reactors.{name}]\n"));
    }
    toml
}
