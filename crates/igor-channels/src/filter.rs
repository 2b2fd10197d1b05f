//! Leading-keyword filter deciding whether input is addressed to the hub.

/// Keyword used when a channel config does not set `keyword`.
pub const DEFAULT_KEYWORD: &str = "igor";

/// Whether `text` starts with `keyword`, ignoring case.
///
/// An empty keyword addresses every input.
pub fn addressed_to(text: &str, keyword: &str) -> bool {
    text.to_lowercase().starts_with(&keyword.to_lowercase())
}

/// Read the `keyword` setting from a channel config section.
pub fn keyword_from_config(config: &serde_json::Value) -> String {
    config
        .get("keyword")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(DEFAULT_KEYWORD)
        .to_owned()
}
