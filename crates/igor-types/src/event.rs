//! Event and response carriers.
//!
//! An [`Event`] is what a channel produces when it translates native
//! platform input; a [`Response`] is what a reactor produces in return.
//! Neither validates its contents: a malformed event simply matches no
//! reactor.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of inbound input an [`Event`] represents.
///
/// Serialized as its lowercase tag (`"message"`, `"command"`, ...).
/// Unrecognized tags are kept verbatim in [`EventType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// Plain text addressed to the hub.
    Message,
    /// A platform command such as `/start`.
    Command,
    /// A photo upload.
    Photo,
    /// A voice note.
    Voice,
    /// A platform message of some other kind (sticker, location, ...).
    OtherMessage,
    /// The channel could not classify the input.
    Unknown,
    /// A channel-specific tag outside the built-in set.
    Other(String),
}

impl EventType {
    /// The string tag for this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Message => "message",
            Self::Command => "command",
            Self::Photo => "photo",
            Self::Voice => "voice",
            Self::OtherMessage => "other_message",
            Self::Unknown => "unknown",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for EventType {
    fn from(tag: &str) -> Self {
        match tag {
            "message" => Self::Message,
            "command" => Self::Command,
            "photo" => Self::Photo,
            "voice" => Self::Voice,
            "other_message" => Self::OtherMessage,
            "unknown" => Self::Unknown,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for EventType {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<EventType> for String {
    fn from(ty: EventType) -> Self {
        ty.as_str().to_owned()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single value in an event's `extra` metadata bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer, e.g. a chat id.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Text(String),
    /// Any other structured value.
    Json(serde_json::Value),
}

impl ExtraValue {
    /// Borrow the value as a string, if it is [`ExtraValue::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read the value as an integer.
    ///
    /// Integer-valued text (`"42"`) is accepted too, since some platforms
    /// hand out numeric ids as strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl From<String> for ExtraValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for ExtraValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<i64> for ExtraValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for ExtraValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ExtraValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<serde_json::Value> for ExtraValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

/// Normalized inbound input from a channel.
///
/// Created by a channel, owned by the hub for one dispatch, then dropped.
/// The only mutation after creation is [`add_extra`](Event::add_extra).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique id, used to correlate log lines for one dispatch.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// What kind of input this is.
    pub event_type: EventType,

    /// Text payload.
    #[serde(default)]
    pub content: String,

    /// Registered name of the originating channel instance.
    pub channel: String,

    /// Channel-specific metadata (e.g. `chat_id`).
    #[serde(default)]
    pub extra: BTreeMap<String, ExtraValue>,

    /// When the channel created the event.
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl Event {
    /// Create an event with no metadata.
    pub fn new(
        event_type: impl Into<EventType>,
        content: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.into(),
            content: content.into(),
            channel: channel.into(),
            extra: BTreeMap::new(),
            received_at: Utc::now(),
        }
    }

    /// Builder form of [`add_extra`](Event::add_extra).
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<ExtraValue>) -> Self {
        self.add_extra(key, value);
        self
    }

    /// Attach a metadata entry, replacing any previous value for `key`.
    pub fn add_extra(&mut self, key: impl Into<String>, value: impl Into<ExtraValue>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Look up a metadata entry.
    pub fn extra(&self, key: &str) -> Option<&ExtraValue> {
        self.extra.get(key)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extra = serde_json::to_string(&self.extra).unwrap_or_else(|_| "{}".into());
        write!(
            f,
            "Event(type={}, content={}, channel={}, extra={})",
            self.event_type, self.content, self.channel, extra
        )
    }
}

/// Outbound content plus the channel that must deliver it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Text to deliver.
    pub content: String,
    /// Registered name of the delivering channel instance.
    pub channel: String,
}

impl Response {
    /// Create a response for an explicit channel.
    pub fn new(content: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            channel: channel.into(),
        }
    }

    /// Create a response addressed to the channel `event` came from.
    pub fn to_event(event: &Event, content: impl Into<String>) -> Self {
        Self::new(content, event.channel.clone())
    }

    /// Whether the content is empty. Empty responses are still delivered.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response(content={}, channel={})",
            self.content, self.channel
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_tags() {
        assert_eq!(EventType::Message.as_str(), "message");
        assert_eq!(EventType::OtherMessage.as_str(), "other_message");
        assert_eq!(EventType::from("photo"), EventType::Photo);
        assert_eq!(
            EventType::from("sticker"),
            EventType::Other("sticker".into())
        );
        assert_eq!(EventType::Other("sticker".into()).to_string(), "sticker");
    }

    #[test]
    fn event_type_serializes_as_tag() {
        let json = serde_json::to_string(&EventType::Command).unwrap();
        assert_eq!(json, "\"command\"");
        let ty: EventType = serde_json::from_str("\"voice\"").unwrap();
        assert_eq!(ty, EventType::Voice);
    }

    #[test]
    fn add_extra_is_additive() {
        let mut event = Event::new(EventType::Message, "igor echo hi", "telegram");
        assert!(event.extra.is_empty());

        event.add_extra("chat_id", 42_i64);
        event.add_extra("username", "alice");

        assert_eq!(event.extra("chat_id").and_then(ExtraValue::as_i64), Some(42));
        assert_eq!(
            event.extra("username").and_then(ExtraValue::as_str),
            Some("alice")
        );
        assert!(event.extra("missing").is_none());
    }

    #[test]
    fn extra_as_i64_accepts_numeric_text() {
        assert_eq!(ExtraValue::from("123").as_i64(), Some(123));
        assert_eq!(ExtraValue::from("abc").as_i64(), None);
        assert_eq!(ExtraValue::from(true).as_i64(), None);
    }

    #[test]
    fn extra_values_deserialize_untagged() {
        let json = r#"{"flag": true, "id": -100, "ratio": 0.5, "name": "x", "obj": {"a": 1}}"#;
        let map: BTreeMap<String, ExtraValue> = serde_json::from_str(json).unwrap();
        assert_eq!(map["flag"], ExtraValue::Bool(true));
        assert_eq!(map["id"], ExtraValue::Integer(-100));
        assert_eq!(map["ratio"], ExtraValue::Float(0.5));
        assert_eq!(map["name"], ExtraValue::Text("x".into()));
        assert_eq!(map["obj"], ExtraValue::Json(serde_json::json!({"a": 1})));
    }

    #[test]
    fn event_display() {
        let event = Event::new(EventType::Message, "igor fortune", "console")
            .with_extra("chat_id", 7_i64);
        assert_eq!(
            event.to_string(),
            r#"Event(type=message, content=igor fortune, channel=console, extra={"chat_id":7})"#
        );
    }

    #[test]
    fn event_ids_are_unique() {
        let a = Event::new(EventType::Message, "x", "console");
        let b = Event::new(EventType::Message, "x", "console");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn event_defaults_on_missing_fields() {
        let json = r#"{"event_type": "message", "channel": "console"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, EventType::Message);
        assert!(event.content.is_empty());
        assert!(event.extra.is_empty());
    }

    #[test]
    fn response_to_event_uses_event_channel() {
        let event = Event::new(EventType::Message, "igor echo", "telegram");
        let response = Response::to_event(&event, "pong");
        assert_eq!(response.channel, "telegram");
        assert_eq!(response.content, "pong");
        assert!(!response.is_empty());
        assert!(Response::new("", "console").is_empty());
    }

    #[test]
    fn response_display() {
        let response = Response::new("hello world", "console");
        assert_eq!(
            response.to_string(),
            "Response(content=hello world, channel=console)"
        );
    }
}
