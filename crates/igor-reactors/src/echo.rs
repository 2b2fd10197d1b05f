//! `echo` reactor: repeats whatever follows its trigger.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use igor_types::error::ReactorError;
use igor_types::{Event, Response};

use crate::matching::{is_triggered, strip_trigger};
use crate::traits::{Reactor, ReactorFactory, string_setting};

pub const ECHO_REACTOR: &str = "echo";
pub const DEFAULT_TRIGGER: &str = "igor echo";

/// Reply when the trigger is followed by nothing.
pub const NOTHING_SAID: &str = "You didn't say anything";

pub struct EchoReactor {
    trigger: String,
}

impl EchoReactor {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
        }
    }
}

impl Default for EchoReactor {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER)
    }
}

#[async_trait]
impl Reactor for EchoReactor {
    fn name(&self) -> &str {
        ECHO_REACTOR
    }

    fn can_handle(&self, event: &Event) -> bool {
        is_triggered(event, &self.trigger)
    }

    async fn handle(&self, event: &Event) -> Result<Option<Response>, ReactorError> {
        let said = strip_trigger(&event.content, &self.trigger).unwrap_or_default();
        debug!(event_id = %event.id, len = said.len(), "echoing");
        let content = if said.is_empty() { NOTHING_SAID } else { said };
        Ok(Some(Response::to_event(event, content)))
    }
}

/// Builds [`EchoReactor`]. Settings: `trigger`.
pub struct EchoReactorFactory;

impl ReactorFactory for EchoReactorFactory {
    fn reactor_name(&self) -> &str {
        ECHO_REACTOR
    }

    fn build(&self, config: &serde_json::Value) -> Result<Arc<dyn Reactor>, ReactorError> {
        Ok(Arc::new(EchoReactor::new(string_setting(
            config,
            "trigger",
            DEFAULT_TRIGGER,
        ))))
    }
}
