//! Trigger-phrase matching shared by the text reactors.

use igor_types::{Event, EventType};

/// Strip `trigger` from the front of `content`, ignoring ASCII case and
/// surrounding whitespace.
///
/// Returns the remainder with its original casing, trimmed, or `None`
/// when `content` does not start with the trigger. The trigger must end
/// at a word boundary: `"igor echoes"` does not match `"igor echo"`.
pub fn strip_trigger<'a>(content: &'a str, trigger: &str) -> Option<&'a str> {
    let content = content.trim_start();
    let trigger = trigger.trim();
    let head = content.get(..trigger.len())?;
    if !head.eq_ignore_ascii_case(trigger) {
        return None;
    }
    let rest = &content[trigger.len()..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

/// Whether `event` is a text message starting with `trigger`.
pub fn is_triggered(event: &Event, trigger: &str) -> bool {
    event.event_type == EventType::Message && strip_trigger(&event.content, trigger).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_case_insensitively_and_keeps_rest_casing() {
        assert_eq!(strip_trigger("IGOR Echo Hello World", "igor echo"), Some("Hello World"));
        assert_eq!(strip_trigger("  igor echo   spaced  ", "igor echo"), Some("spaced"));
    }

    #[test]
    fn bare_trigger_leaves_empty_rest() {
        assert_eq!(strip_trigger("igor echo", "igor echo"), Some(""));
        assert_eq!(strip_trigger("igor echo   ", "igor echo"), Some(""));
    }

    #[test]
    fn requires_word_boundary() {
        assert_eq!(strip_trigger("igor echoes", "igor echo"), None);
        assert_eq!(strip_trigger("igor fortunecookie", "igor fortune"), None);
    }

    #[test]
    fn rejects_non_prefix_and_short_input() {
        assert_eq!(strip_trigger("say igor echo", "igor echo"), None);
        assert_eq!(strip_trigger("igor", "igor echo"), None);
        assert_eq!(strip_trigger("", "igor echo"), None);
    }

    #[test]
    fn multibyte_input_does_not_panic() {
        assert_eq!(strip_trigger("ïgor echo", "igor echo"), None);
        assert_eq!(strip_trigger("igor echo héllo", "igor echo"), Some("héllo"));
    }

    #[test]
    fn only_messages_are_triggered() {
        let msg = Event::new(EventType::Message, "igor fortune", "console");
        let cmd = Event::new(EventType::Command, "igor fortune", "telegram");
        assert!(is_triggered(&msg, "igor fortune"));
        assert!(!is_triggered(&cmd, "igor fortune"));
    }
}
