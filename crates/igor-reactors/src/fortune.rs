//! `fortune` reactor: replies with a random line from a fixed list.

use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;

use igor_types::error::ReactorError;
use igor_types::{Event, Response};

use crate::matching::is_triggered;
use crate::traits::{Reactor, ReactorFactory, string_setting};

pub const FORTUNE_REACTOR: &str = "fortune";
pub const DEFAULT_TRIGGER: &str = "igor fortune";

pub const DEFAULT_FORTUNES: &[&str] = &[
    "I didn't come this far to only come this far",
    "Anything that you do, any accomplishment that you make, you have to work for",
];

pub struct FortuneReactor {
    trigger: String,
    fortunes: Vec<String>,
}

impl FortuneReactor {
    /// Fails when `fortunes` is empty.
    pub fn new(trigger: impl Into<String>, fortunes: Vec<String>) -> Result<Self, ReactorError> {
        if fortunes.is_empty() {
            return Err(ReactorError::InvalidConfig(
                "fortune list must not be empty".into(),
            ));
        }
        Ok(Self {
            trigger: trigger.into(),
            fortunes,
        })
    }

    pub fn fortunes(&self) -> &[String] {
        &self.fortunes
    }
}

impl Default for FortuneReactor {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.into(),
            fortunes: DEFAULT_FORTUNES.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

#[async_trait]
impl Reactor for FortuneReactor {
    fn name(&self) -> &str {
        FORTUNE_REACTOR
    }

    fn can_handle(&self, event: &Event) -> bool {
        is_triggered(event, &self.trigger)
    }

    async fn handle(&self, event: &Event) -> Result<Option<Response>, ReactorError> {
        let fortune = self
            .fortunes
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| ReactorError::Failed("no fortunes available".into()))?;
        Ok(Some(Response::to_event(event, fortune.as_str())))
    }
}

/// Builds [`FortuneReactor`]. Settings: `trigger`, `fortunes` (array of
/// strings, must not be empty when given).
pub struct FortuneReactorFactory;

impl ReactorFactory for FortuneReactorFactory {
    fn reactor_name(&self) -> &str {
        FORTUNE_REACTOR
    }

    fn build(&self, config: &serde_json::Value) -> Result<Arc<dyn Reactor>, ReactorError> {
        let trigger = string_setting(config, "trigger", DEFAULT_TRIGGER);
        let fortunes = match config.get("fortunes") {
            None => DEFAULT_FORTUNES.iter().map(|s| (*s).to_owned()).collect(),
            Some(value) => serde_json::from_value::<Vec<String>>(value.clone()).map_err(|e| {
                ReactorError::InvalidConfig(format!("'fortunes' must be a list of strings: {e}"))
            })?,
        };
        Ok(Arc::new(FortuneReactor::new(trigger, fortunes)?))
    }
}
