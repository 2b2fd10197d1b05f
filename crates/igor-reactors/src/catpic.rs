//! `catpic` reactor: answers with a cat picture URL from a public API.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use igor_types::error::ReactorError;
use igor_types::{Event, Response};

use crate::http::{HttpClient, RequestMethod};
use crate::matching::is_triggered;
use crate::traits::{Reactor, ReactorFactory, string_setting};

pub const CATPIC_REACTOR: &str = "catpic";
pub const DEFAULT_TRIGGER: &str = "igor cat pic";
pub const DEFAULT_URL: &str = "https://api.thecatapi.com/v1/images/search";

/// Reply sent when no picture could be fetched.
pub const APOLOGY: &str = "Sorry, I couldn't fetch a cat picture at the moment.";

pub struct CatPicReactor {
    trigger: String,
    url: String,
    http: HttpClient,
}

impl CatPicReactor {
    pub fn new(trigger: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            url: url.into(),
            http: HttpClient::new(),
        }
    }

    /// Pull `[0].url` out of a search reply.
    fn picture_url(body: &serde_json::Value) -> Option<&str> {
        body.get(0)?.get("url")?.as_str()
    }
}

impl Default for CatPicReactor {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER, DEFAULT_URL)
    }
}

#[async_trait]
impl Reactor for CatPicReactor {
    fn name(&self) -> &str {
        CATPIC_REACTOR
    }

    fn can_handle(&self, event: &Event) -> bool {
        is_triggered(event, &self.trigger)
    }

    async fn handle(&self, event: &Event) -> Result<Option<Response>, ReactorError> {
        let body = self
            .http
            .send_request(
                RequestMethod::Get,
                &self.url,
                &serde_json::Value::Null,
                &HashMap::new(),
            )
            .await;

        let content = match body.as_ref().and_then(Self::picture_url) {
            Some(url) => url,
            None => {
                warn!(event_id = %event.id, url = %self.url, "no cat picture available");
                APOLOGY
            }
        };
        Ok(Some(Response::to_event(event, content)))
    }
}

/// Builds [`CatPicReactor`]. Settings: `trigger`, `url`.
pub struct CatPicReactorFactory;

impl ReactorFactory for CatPicReactorFactory {
    fn reactor_name(&self) -> &str {
        CATPIC_REACTOR
    }

    fn build(&self, config: &serde_json::Value) -> Result<Arc<dyn Reactor>, ReactorError> {
        Ok(Arc::new(CatPicReactor::new(
            string_setting(config, "trigger", DEFAULT_TRIGGER),
            string_setting(config, "url", DEFAULT_URL),
        )))
    }
}
