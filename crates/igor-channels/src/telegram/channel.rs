//! [`TelegramChannel`] -- `Channel` trait implementation for Telegram.
//!
//! Uses long polling via [`TelegramClient`](super::client::TelegramClient)
//! to receive updates and hands addressed messages to the hub through
//! [`ChannelHost::dispatch`](crate::traits::ChannelHost::dispatch).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use igor_types::error::ChannelError;
use igor_types::{Event, EventType, ExtraValue, Response};

use crate::filter::{DEFAULT_KEYWORD, addressed_to, keyword_from_config};
use crate::traits::{Channel, ChannelFactory, ChannelHost, ChannelStatus, EventTranslator};

use super::client::{DEFAULT_API_BASE, TelegramClient};
use super::types::{Message, Update};

/// Registered name of the Telegram channel.
pub const TELEGRAM_CHANNEL: &str = "telegram";

/// Environment variable consulted when the config has no `token`.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Reply sent directly to `/start`, without going through the hub.
pub const START_GREETING: &str = "I'm a bot, please talk to me!";

/// Default long-poll timeout in seconds for `getUpdates`.
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Default delay between poll cycles in seconds.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Delay before retrying after an error, in seconds.
const ERROR_RETRY_DELAY_SECS: u64 = 5;

/// Telegram Bot channel implementation.
///
/// # Configuration
///
/// ```toml
/// [channels.telegram]
/// token = "123456:ABC-DEF"        # or TELEGRAM_BOT_TOKEN
/// allowed_users = ["12345"]       # empty or absent: everyone
/// keyword = "igor"
/// poll_timeout_secs = 30
/// poll_interval_secs = 1
/// api_base_url = "https://api.telegram.org"
/// ```
pub struct TelegramChannel {
    client: TelegramClient,
    status: Arc<RwLock<ChannelStatus>>,
    /// Offset for the next `getUpdates` call (update_id + 1).
    offset: AtomicI64,
    /// Allow-list of user IDs. Empty means everyone is allowed.
    allowed_users: Vec<String>,
    keyword: String,
    poll_timeout_secs: u64,
    poll_interval_secs: u64,
    /// Cancelled by `stop_listening`.
    stop: CancellationToken,
    stopped: AtomicBool,
}

impl TelegramChannel {
    /// Create a channel talking to `client`, with the default keyword.
    pub fn new(client: TelegramClient, allowed_users: Vec<String>) -> Self {
        Self {
            client,
            status: Arc::new(RwLock::new(ChannelStatus::Stopped)),
            offset: AtomicI64::new(0),
            allowed_users,
            keyword: DEFAULT_KEYWORD.into(),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            stop: CancellationToken::new(),
            stopped: AtomicBool::new(false),
        }
    }

    /// Replace the keyword that addresses the hub.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    /// Override the long-poll timeout and the pause between polls.
    pub fn with_polling(mut self, timeout_secs: u64, interval_secs: u64) -> Self {
        self.poll_timeout_secs = timeout_secs;
        self.poll_interval_secs = interval_secs;
        self
    }

    /// Check if a sender is allowed to interact with this channel.
    pub fn is_allowed(&self, sender_id: &str) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.iter().any(|id| id == sender_id)
    }

    async fn set_status(&self, status: ChannelStatus) {
        *self.status.write().await = status;
    }

    /// Process a single update: greet `/start`, dispatch addressed text.
    pub(crate) async fn process_update(
        &self,
        update: &Update,
        host: &Arc<dyn ChannelHost>,
    ) -> Result<(), ChannelError> {
        let Some(ref msg) = update.message else {
            debug!(update_id = update.update_id, "skipping non-message update");
            return Ok(());
        };

        let sender_id = msg
            .from
            .as_ref()
            .map(|u| u.id.to_string())
            .unwrap_or_default();

        if !self.is_allowed(&sender_id) {
            warn!(
                sender_id = %sender_id,
                chat_id = msg.chat.id,
                "message from disallowed user, ignoring"
            );
            return Ok(());
        }

        let Some(ref text) = msg.text else {
            debug!(update_id = update.update_id, "skipping message without text");
            return Ok(());
        };

        if text.split_whitespace().next() == Some("/start") {
            self.client
                .send_message(msg.chat.id, START_GREETING)
                .await?;
            return Ok(());
        }

        if !addressed_to(text, &self.keyword) {
            return Ok(());
        }

        let event = self.to_event(msg);
        let outcome = host.dispatch(event).await;
        debug!(update_id = update.update_id, outcome = %outcome, "telegram dispatch finished");
        Ok(())
    }
}

/// Classify a message the way the Bot API presents it.
fn update_type(msg: &Message) -> EventType {
    match (&msg.text, &msg.photo, &msg.voice) {
        (Some(text), _, _) if text.starts_with('/') => EventType::Command,
        (Some(_), _, _) => EventType::Message,
        (None, Some(_), _) => EventType::Photo,
        (None, None, Some(_)) => EventType::Voice,
        (None, None, None) => EventType::OtherMessage,
    }
}

impl EventTranslator for TelegramChannel {
    type Native = Message;

    fn to_event(&self, msg: &Message) -> Event {
        let event_type = update_type(msg);
        let text = msg.text.as_deref().unwrap_or_default();
        let content = match event_type {
            EventType::Message => text.to_owned(),
            // Drop the command word itself.
            EventType::Command => text.split(' ').skip(1).collect::<Vec<_>>().join(" "),
            _ => String::new(),
        };

        let mut event = Event::new(event_type.clone(), content, TELEGRAM_CHANNEL)
            .with_extra("chat_id", msg.chat.id)
            .with_extra("message_id", msg.message_id)
            .with_extra("chat_type", msg.chat.chat_type.as_str());
        if let Some(username) = msg.from.as_ref().and_then(|u| u.username.as_deref()) {
            event.add_extra("username", username);
        }
        // Largest photo size comes last.
        let file = match event_type {
            EventType::Photo => msg.photo.as_ref().and_then(|sizes| sizes.last()),
            EventType::Voice => msg.voice.as_ref(),
            _ => None,
        };
        if let Some(file) = file {
            event.add_extra("file_id", file.file_id.as_str());
        }
        event
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        TELEGRAM_CHANNEL
    }

    fn status(&self) -> ChannelStatus {
        // Use try_read to avoid blocking; fall back to Stopped.
        self.status
            .try_read()
            .map(|s| s.clone())
            .unwrap_or(ChannelStatus::Stopped)
    }

    async fn start_listening(
        &self,
        host: Arc<dyn ChannelHost>,
        cancel: CancellationToken,
    ) -> Result<(), ChannelError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(ChannelError::AlreadyStopped);
        }
        self.set_status(ChannelStatus::Starting).await;

        let me = match self.client.get_me().await {
            Ok(me) => me,
            Err(e) => {
                error!(error = %e, "failed to verify Telegram bot token");
                self.set_status(ChannelStatus::Error(e.to_string())).await;
                return Err(e);
            }
        };

        info!(
            bot_id = me.id,
            bot_name = %me.first_name,
            "Telegram bot started polling"
        );

        self.set_status(ChannelStatus::Running).await;

        // Long-polling loop.
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Telegram channel received cancellation");
                    break;
                }
                _ = self.stop.cancelled() => break,
                result = self.client.get_updates(
                    self.offset.load(Ordering::SeqCst),
                    self.poll_timeout_secs,
                ) => {
                    match result {
                        Ok(updates) => {
                            for update in &updates {
                                if let Err(e) = self.process_update(update, &host).await {
                                    error!(
                                        update_id = update.update_id,
                                        error = %e,
                                        "failed to process update"
                                    );
                                }
                                // Advance offset past this update regardless
                                // of whether processing succeeded.
                                self.offset.store(update.update_id + 1, Ordering::SeqCst);
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "getUpdates failed");
                            self.set_status(ChannelStatus::Error(e.to_string())).await;

                            // Wait before retrying, but still respect cancellation.
                            tokio::select! {
                                _ = cancel.cancelled() => break,
                                _ = self.stop.cancelled() => break,
                                _ = tokio::time::sleep(Duration::from_secs(ERROR_RETRY_DELAY_SECS)) => {}
                            }

                            self.set_status(ChannelStatus::Running).await;
                        }
                    }
                }
            }

            if self.poll_interval_secs > 0 {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = self.stop.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_secs(self.poll_interval_secs)) => {}
                }
            }
        }

        self.set_status(ChannelStatus::Stopped).await;
        info!("Telegram channel stopped");
        Ok(())
    }

    async fn stop_listening(&self) -> Result<(), ChannelError> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        {
            let mut status = self.status.write().await;
            if *status == ChannelStatus::Running {
                *status = ChannelStatus::Stopping;
            }
        }
        self.stop.cancel();
        info!("Telegram bot stopped polling");
        Ok(())
    }

    async fn send_response(&self, event: &Event, response: &Response) -> Result<(), ChannelError> {
        let chat_id = event
            .extra("chat_id")
            .and_then(ExtraValue::as_i64)
            .ok_or_else(|| ChannelError::MissingMetadata("chat_id".into()))?;

        self.client.send_message(chat_id, &response.content).await?;
        debug!(chat_id, "response delivered");
        Ok(())
    }
}

/// Resolve the bot token from config, falling back to `lookup(TOKEN_ENV)`.
fn resolve_token(
    config: &serde_json::Value,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ChannelError> {
    config
        .get("token")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .or_else(|| lookup(TOKEN_ENV))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            ChannelError::Other(format!(
                "missing 'token' in telegram config and {TOKEN_ENV} is not set"
            ))
        })
}

/// Factory for creating [`TelegramChannel`] instances from config.
pub struct TelegramChannelFactory;

impl TelegramChannelFactory {
    pub(crate) fn build_with_env(
        &self,
        config: &serde_json::Value,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<TelegramChannel, ChannelError> {
        let token = resolve_token(config, lookup)?;

        let allowed_users: Vec<String> = config
            .get("allowed_users")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        let api_base = config
            .get("api_base_url")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(DEFAULT_API_BASE);

        let timeout = config
            .get("poll_timeout_secs")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS);
        let interval = config
            .get("poll_interval_secs")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        Ok(
            TelegramChannel::new(TelegramClient::with_api_base(api_base, &token), allowed_users)
                .with_keyword(keyword_from_config(config))
                .with_polling(timeout, interval),
        )
    }
}

impl ChannelFactory for TelegramChannelFactory {
    fn channel_name(&self) -> &str {
        TELEGRAM_CHANNEL
    }

    fn build(&self, config: &serde_json::Value) -> Result<Arc<dyn Channel>, ChannelError> {
        let channel = self.build_with_env(config, |key| std::env::var(key).ok())?;
        Ok(Arc::new(channel))
    }
}
