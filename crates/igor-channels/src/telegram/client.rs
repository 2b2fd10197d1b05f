//! Bot API calls used by the channel: `getMe`, `getUpdates`, `sendMessage`.

use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, trace};

use igor_types::error::ChannelError;

use super::types::{SendMessageRequest, TelegramResponse, Update, User};

/// Public Bot API endpoint; the token is appended as `/bot{token}`.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Thin typed wrapper over one bot's API endpoint.
///
/// The token lives only inside `endpoint` and is never logged.
pub struct TelegramClient {
    http: Client,
    /// `{api_base}/bot{token}`.
    endpoint: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self::with_api_base(DEFAULT_API_BASE, token)
    }

    /// Client for a self-hosted Bot API server or a test double.
    pub fn with_api_base(api_base: &str, token: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: format!("{}/bot{token}", api_base.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.endpoint)
    }

    /// Check the token; the bot's own account on success.
    pub async fn get_me(&self) -> Result<User, ChannelError> {
        debug!("verifying bot token");
        let resp = self
            .http
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::ConnectionFailed(e.to_string()))?;
        decode(resp, ChannelError::AuthFailed)
            .await?
            .into_result("unauthorized", ChannelError::AuthFailed)
    }

    /// Long-poll for updates starting at `offset`, waiting up to
    /// `timeout_secs` (0 returns immediately).
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, ChannelError> {
        trace!(offset, timeout_secs, "polling for updates");
        let resp = self
            .http
            .get(self.method_url("getUpdates"))
            .query(&[("offset", offset), ("timeout", timeout_secs as i64)])
            .send()
            .await
            .map_err(|e| ChannelError::ConnectionFailed(e.to_string()))?;
        let updates = decode::<Vec<Update>>(resp, ChannelError::ReceiveFailed)
            .await?
            .into_result("unknown error", ChannelError::ReceiveFailed)?;
        debug!(count = updates.len(), "received updates");
        Ok(updates)
    }

    /// Post `text` to `chat_id`. The sent message itself is discarded.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        debug!(chat_id, "sending message");
        let resp = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))?;
        decode::<IgnoredAny>(resp, ChannelError::SendFailed)
            .await?
            .into_result("unknown error", ChannelError::SendFailed)
            .map(|_| ())
    }
}

async fn decode<T: DeserializeOwned>(
    resp: reqwest::Response,
    err: fn(String) -> ChannelError,
) -> Result<TelegramResponse<T>, ChannelError> {
    resp.json().await.map_err(|e| err(e.to_string()))
}
