//! [`Hub`] -- owns the loaded plugins and routes events between them.
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized ──configure()──> Configured ──run()──> Running
//!                                                         │
//!                         interrupt / request_shutdown / all channels done
//!                                                         │
//!                                   Stopped <── ShuttingDown
//! ```
//!
//! Channels and reactors are built once by [`Hub::configure`] and never
//! change afterwards, so dispatch reads them without locking. Each channel
//! listens in its own tokio task and calls back into the hub through
//! [`ChannelHost`]; dispatches from different channels run concurrently.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use igor_channels::{Channel, ChannelError, ChannelHost};
use igor_reactors::Reactor;
use igor_types::config::Config;
use igor_types::error::{IgorError, Result};
use igor_types::{DispatchOutcome, Event};

use crate::registry::PluginRegistry;

/// Lifecycle state of a [`Hub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HubState {
    /// Created, no plugins loaded.
    Uninitialized = 0,
    /// Plugins loaded; dispatch is accepted.
    Configured = 1,
    /// Channels are listening.
    Running = 2,
    /// Channels are being stopped; dispatch is rejected.
    ShuttingDown = 3,
    /// Every listen task has finished or been aborted.
    Stopped = 4,
}

impl HubState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Uninitialized,
            1 => Self::Configured,
            2 => Self::Running,
            3 => Self::ShuttingDown,
            _ => Self::Stopped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Configured => "configured",
            Self::Running => "running",
            Self::ShuttingDown => "shutting down",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for HubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plugin that [`Hub::configure`] could not load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPlugin {
    /// `"channel"` or `"reactor"`.
    pub kind: &'static str,
    /// Identifier from the config.
    pub name: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Summary of what [`Hub::configure`] loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Loaded channel names, in config order.
    pub channels: Vec<String>,
    /// Loaded reactor names, in priority order.
    pub reactors: Vec<String>,
    /// Sections switched off with `enabled = false`.
    pub disabled: Vec<String>,
    /// Sections that failed to load.
    pub skipped: Vec<SkippedPlugin>,
}

impl LoadReport {
    /// Whether every enabled section loaded.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

struct Plugins {
    channels: Vec<Arc<dyn Channel>>,
    reactors: Vec<Arc<dyn Reactor>>,
    grace: Duration,
}

impl Plugins {
    fn channel(&self, name: &str) -> Option<&Arc<dyn Channel>> {
        self.channels.iter().find(|c| c.name() == name)
    }
}

/// The central dispatcher.
pub struct Hub {
    state: AtomicU8,
    plugins: OnceLock<Plugins>,
    shutdown: CancellationToken,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    /// A hub with no plugins, in [`HubState::Uninitialized`].
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(HubState::Uninitialized as u8),
            plugins: OnceLock::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HubState {
        HubState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: HubState) {
        let previous = HubState::from_u8(self.state.swap(state as u8, Ordering::AcqRel));
        debug!(from = %previous, to = %state, "hub state changed");
    }

    fn transition(&self, from: HubState, to: HubState) -> Result<()> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| debug!(from = %from, to = %to, "hub state changed"))
            .map_err(|actual| IgorError::InvalidState {
                expected: from.to_string(),
                actual: HubState::from_u8(actual).to_string(),
            })
    }

    /// Build every enabled plugin the config declares.
    ///
    /// A plugin that is not registered or whose factory fails is logged
    /// and listed in [`LoadReport::skipped`]; the rest still load. Reactor
    /// order follows the config and decides match priority.
    ///
    /// Only valid in [`HubState::Uninitialized`].
    pub fn configure(&self, config: &Config, registry: &PluginRegistry) -> Result<LoadReport> {
        if self.state() != HubState::Uninitialized {
            return Err(IgorError::InvalidState {
                expected: HubState::Uninitialized.to_string(),
                actual: self.state().to_string(),
            });
        }

        let mut report = LoadReport::default();

        let mut channels: Vec<Arc<dyn Channel>> = Vec::new();
        for section in &config.channels {
            if !section.enabled {
                debug!(channel = %section.name, "channel disabled in config");
                report.disabled.push(section.name.clone());
                continue;
            }
            match registry.build_channel(&section.name, &section.settings) {
                Ok(channel) if channels.iter().any(|c| c.name() == channel.name()) => {
                    let reason = format!("channel name '{}' is already in use", channel.name());
                    warn!(channel = %section.name, reason = %reason, "skipping channel");
                    report.skipped.push(SkippedPlugin {
                        kind: "channel",
                        name: section.name.clone(),
                        reason,
                    });
                }
                Ok(channel) => {
                    info!(channel = %channel.name(), "channel loaded");
                    report.channels.push(channel.name().to_owned());
                    channels.push(channel);
                }
                Err(e) => {
                    warn!(channel = %section.name, error = %e, "skipping channel");
                    report.skipped.push(SkippedPlugin {
                        kind: "channel",
                        name: section.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut reactors: Vec<Arc<dyn Reactor>> = Vec::new();
        for section in &config.reactors {
            if !section.enabled {
                debug!(reactor = %section.name, "reactor disabled in config");
                report.disabled.push(section.name.clone());
                continue;
            }
            match registry.build_reactor(&section.name, &section.settings) {
                Ok(reactor) => {
                    info!(reactor = %reactor.name(), priority = reactors.len(), "reactor loaded");
                    report.reactors.push(reactor.name().to_owned());
                    reactors.push(reactor);
                }
                Err(e) => {
                    warn!(reactor = %section.name, error = %e, "skipping reactor");
                    report.skipped.push(SkippedPlugin {
                        kind: "reactor",
                        name: section.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if reactors.is_empty() {
            warn!("no reactors loaded; every event will go unanswered");
        }

        let plugins = Plugins {
            channels,
            reactors,
            grace: config.hub.shutdown_grace(),
        };
        if self.plugins.set(plugins).is_err() {
            return Err(IgorError::InvalidState {
                expected: HubState::Uninitialized.to_string(),
                actual: self.state().to_string(),
            });
        }
        self.transition(HubState::Uninitialized, HubState::Configured)?;

        info!(
            channels = report.channels.len(),
            reactors = report.reactors.len(),
            skipped = report.skipped.len(),
            "hub configured"
        );
        Ok(report)
    }

    /// Loaded channel names, in config order.
    pub fn channel_names(&self) -> Vec<String> {
        self.plugins
            .get()
            .map(|p| p.channels.iter().map(|c| c.name().to_owned()).collect())
            .unwrap_or_default()
    }

    /// Loaded reactor names, in priority order.
    pub fn reactor_names(&self) -> Vec<String> {
        self.plugins
            .get()
            .map(|p| p.reactors.iter().map(|r| r.name().to_owned()).collect())
            .unwrap_or_default()
    }

    /// Token cancelled when shutdown begins.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Ask a running hub to shut down. Safe to call repeatedly.
    pub fn request_shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("shutdown requested");
            self.shutdown.cancel();
        }
    }

    /// Route one event: reactors are tried in order, the first accepting
    /// reactor that produces a response answers, and the response goes back
    /// to `event.channel`. A reactor that declines is skipped.
    ///
    /// Never fails; the outcome describes what happened.
    pub async fn dispatch(&self, event: Event) -> DispatchOutcome {
        let span = info_span!(
            "dispatch",
            event_id = %event.id,
            channel = %event.channel,
            event_type = %event.event_type,
        );
        let outcome = self.route(event).instrument(span.clone()).await;
        span.in_scope(|| debug!(outcome = %outcome, "dispatch finished"));
        outcome
    }

    async fn route(&self, event: Event) -> DispatchOutcome {
        let state = self.state();
        let plugins = match (state, self.plugins.get()) {
            (HubState::Configured | HubState::Running, Some(plugins)) => plugins,
            _ => {
                debug!(state = %state, "hub is not accepting events");
                return DispatchOutcome::Rejected;
            }
        };

        let mut answer = None;
        for reactor in plugins.reactors.iter().filter(|r| accepts(r.as_ref(), &event)) {
            let reactor_name = reactor.name().to_owned();
            debug!(reactor = %reactor_name, "reactor matched");

            match AssertUnwindSafe(reactor.handle(&event)).catch_unwind().await {
                Ok(Ok(Some(response))) => {
                    answer = Some((reactor_name, response));
                    break;
                }
                Ok(Ok(None)) => {
                    debug!(reactor = %reactor_name, "reactor declined to respond");
                }
                Ok(Err(e)) => {
                    error!(reactor = %reactor_name, error = %e, "reactor failed");
                    return DispatchOutcome::ReactorFailed {
                        reactor: reactor_name,
                        reason: e.to_string(),
                    };
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    error!(reactor = %reactor_name, panic = %reason, "reactor panicked");
                    return DispatchOutcome::ReactorFailed {
                        reactor: reactor_name,
                        reason,
                    };
                }
            }
        }
        let Some((reactor_name, mut response)) = answer else {
            warn!(content = %event.content, "no reactor handled event");
            return DispatchOutcome::Unhandled;
        };

        if response.channel != event.channel {
            warn!(
                reactor = %reactor_name,
                tagged = %response.channel,
                "response tagged with another channel; sending to the event's channel"
            );
            response.channel = event.channel.clone();
        }

        let Some(channel) = plugins.channel(&event.channel) else {
            warn!("response dropped: channel not found");
            return DispatchOutcome::UnknownChannel {
                channel: event.channel.clone(),
            };
        };

        match channel.send_response(&event, &response).await {
            Ok(()) => DispatchOutcome::Delivered {
                reactor: reactor_name,
                channel: response.channel,
            },
            Err(e) => {
                error!(error = %e, "failed to deliver response");
                DispatchOutcome::DeliveryFailed {
                    channel: response.channel,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Start every channel and block until shutdown completes.
    ///
    /// Shutdown begins on the first of: `interrupt` resolving (checked
    /// first), [`request_shutdown`](Hub::request_shutdown), or every listen
    /// task exiting. Channels then get the configured grace period to
    /// finish before their tasks are aborted.
    ///
    /// Only valid in [`HubState::Configured`].
    pub async fn run<F>(self: Arc<Self>, interrupt: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let Some(plugins) = self.plugins.get() else {
            return Err(IgorError::InvalidState {
                expected: HubState::Configured.to_string(),
                actual: self.state().to_string(),
            });
        };
        self.transition(HubState::Configured, HubState::Running)?;

        let mut tasks: JoinSet<(String, std::result::Result<(), ChannelError>)> = JoinSet::new();
        for channel in &plugins.channels {
            let channel = channel.clone();
            let host: Arc<dyn ChannelHost> = self.clone();
            let cancel = self.shutdown.child_token();
            tasks.spawn(async move {
                let name = channel.name().to_owned();
                info!(channel = %name, "starting channel");
                let result = channel.start_listening(host, cancel).await;
                (name, result)
            });
        }
        info!(channels = plugins.channels.len(), "hub running");

        tokio::pin!(interrupt);
        loop {
            tokio::select! {
                biased;
                () = &mut interrupt => {
                    info!("interrupt received");
                    break;
                }
                () = self.shutdown.cancelled() => {
                    break;
                }
                joined = tasks.join_next() => match joined {
                    Some(joined) => log_task_exit(joined),
                    None => {
                        info!("all channels have stopped listening");
                        break;
                    }
                },
            }
        }

        self.set_state(HubState::ShuttingDown);
        self.shutdown.cancel();

        for channel in &plugins.channels {
            if let Err(e) = channel.stop_listening().await {
                warn!(channel = %channel.name(), error = %e, "error stopping channel");
            }
        }

        let drained = tokio::time::timeout(plugins.grace, async {
            while let Some(joined) = tasks.join_next().await {
                log_task_exit(joined);
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                remaining = tasks.len(),
                grace_secs = plugins.grace.as_secs(),
                "grace period elapsed; aborting channel tasks"
            );
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }

        self.set_state(HubState::Stopped);
        info!("hub stopped");
        Ok(())
    }
}

#[async_trait]
impl ChannelHost for Hub {
    async fn dispatch(&self, event: Event) -> DispatchOutcome {
        Hub::dispatch(self, event).await
    }

    fn request_shutdown(&self) {
        Hub::request_shutdown(self);
    }
}

/// `can_handle` with panics treated as "no".
fn accepts(reactor: &dyn Reactor, event: &Event) -> bool {
    std::panic::catch_unwind(AssertUnwindSafe(|| reactor.can_handle(event))).unwrap_or_else(
        |payload| {
            error!(
                reactor = %reactor.name(),
                panic = %panic_message(payload.as_ref()),
                "reactor panicked while matching"
            );
            false
        },
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}

fn log_task_exit(
    joined: std::result::Result<(String, std::result::Result<(), ChannelError>), JoinError>,
) {
    match joined {
        Ok((name, Ok(()))) => info!(channel = %name, "channel stopped"),
        Ok((name, Err(e))) => error!(channel = %name, error = %e, "channel exited with error"),
        Err(e) if e.is_cancelled() => debug!("channel task aborted"),
        Err(e) => error!(error = %e, "channel task panicked"),
    }
}
