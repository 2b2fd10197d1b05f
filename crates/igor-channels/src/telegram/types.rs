//! Bot API payloads, cut down to the fields the channel reads.
//!
//! Unknown fields are ignored by serde, so richer payloads from the API
//! still decode.

use serde::{Deserialize, Serialize};

use igor_types::error::ChannelError;

/// Envelope of every Bot API reply: `{ ok, result?, description? }`.
#[derive(Debug, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    /// Set when `ok` is false.
    pub description: Option<String>,
}

impl<T> TelegramResponse<T> {
    /// Turn the envelope into the payload, mapping API failures with `err`.
    pub fn into_result(
        self,
        fallback: &str,
        err: impl Fn(String) -> ChannelError,
    ) -> Result<T, ChannelError> {
        if !self.ok {
            return Err(err(self.description.unwrap_or_else(|| fallback.to_owned())));
        }
        self.result
            .ok_or_else(|| err("missing result in response".into()))
    }
}

/// One entry from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    /// Absent for edits, callbacks and the other update kinds.
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Absent for posts in channels.
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    /// Sizes of an attached photo, smallest first.
    pub photo: Option<Vec<FileRef>>,
    pub voice: Option<FileRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    /// `private`, `group`, `supergroup` or `channel`.
    #[serde(rename = "type")]
    pub chat_type: String,
}

/// A downloadable attachment (photo size or voice note).
#[derive(Debug, Clone, Deserialize)]
pub struct FileRef {
    pub file_id: String,
}

/// Body of `sendMessage`.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}
