//! Conversation history supplied by callers: validation, trimming and formatting.

use crate::error::HistoryError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of history entries considered for a prompt.
pub const MAX_HISTORY_MESSAGES: usize = 8;

/// Speaker label used for the human side of the conversation.
pub const USER_SPEAKER_LABEL: &str = "用户";

/// Who said a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// A single turn of caller-supplied conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Speaker,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::Assistant,
            content: content.into(),
        }
    }
}

/// Keeps the final [`MAX_HISTORY_MESSAGES`] raw entries, validates each one and
/// drops those whose content is blank.
///
/// Any entry that is not a `{role, content}` object with a known role fails the
/// whole history.
pub fn trim_history(raw: Vec<Value>) -> Result<Vec<ConversationMessage>, HistoryError> {
    let start = raw.len().saturating_sub(MAX_HISTORY_MESSAGES);
    let mut messages = Vec::with_capacity(raw.len() - start);
    for item in raw.into_iter().skip(start) {
        let message: ConversationMessage =
            serde_json::from_value(item).map_err(HistoryError::MalformedEntry)?;
        if !message.content.trim().is_empty() {
            messages.push(message);
        }
    }
    Ok(messages)
}

/// Parses the JSON-encoded history form field used by multipart endpoints.
///
/// A missing or empty payload is an empty history.
pub fn parse_history(payload: Option<&str>) -> Result<Vec<ConversationMessage>, HistoryError> {
    let payload = match payload {
        Some(p) if !p.is_empty() => p,
        _ => return Ok(Vec::new()),
    };

    let raw: Value = serde_json::from_str(payload).map_err(HistoryError::InvalidJson)?;
    history_from_value(Some(raw))
}

/// Validates a history value taken from a JSON request body.
///
/// `None` (field absent) is an empty history; anything other than an array,
/// including an explicit `null`, is rejected.
pub fn history_from_value(raw: Option<Value>) -> Result<Vec<ConversationMessage>, HistoryError> {
    match raw {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => trim_history(items),
        Some(_) => Err(HistoryError::NotAnArray),
    }
}

/// Renders history as `speaker: content` lines.
pub fn format_history(history: &[ConversationMessage], role_display_name: &str) -> String {
    history
        .iter()
        .map(|message| {
            let speaker = match message.role {
                Speaker::User => USER_SPEAKER_LABEL,
                Speaker::Assistant => role_display_name,
            };
            format!("{}: {}", speaker, message.content.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_or_empty_payload_is_empty_history() {
        assert!(parse_history(None).unwrap().is_empty());
        assert!(parse_history(Some("")).unwrap().is_empty());
        assert!(parse_history(Some("[]")).unwrap().is_empty());
    }

    #[test]
    fn keeps_last_eight_in_order() {
        let raw: Vec<Value> = (0..12)
            .map(|i| json!({"role": if i % 2 == 0 { "user" } else { "assistant" }, "content": format!("m{i}")}))
            .collect();
        let messages = trim_history(raw).unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m4", "m5", "m6", "m7", "m8", "m9", "m10", "m11"]);
        assert_eq!(messages[0].role, Speaker::User);
        assert_eq!(messages[1].role, Speaker::Assistant);
    }

    #[test]
    fn blank_entries_are_dropped_after_trimming_window() {
        let raw = vec![
            json!({"role": "user", "content": "kept from before"}),
            json!({"role": "user", "content": "a"}),
            json!({"role": "assistant", "content": "   "}),
            json!({"role": "user", "content": "b"}),
            json!({"role": "assistant", "content": ""}),
            json!({"role": "user", "content": "c"}),
            json!({"role": "assistant", "content": "d"}),
            json!({"role": "user", "content": "e"}),
            json!({"role": "assistant", "content": "f"}),
        ];
        let messages = trim_history(raw).unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(
            parse_history(Some("[{")),
            Err(HistoryError::InvalidJson(_))
        ));
    }

    #[test]
    fn non_array_is_rejected() {
        assert!(matches!(
            parse_history(Some(r#"{"role":"user","content":"hi"}"#)),
            Err(HistoryError::NotAnArray)
        ));
    }

    #[test]
    fn body_values_other_than_arrays_are_rejected() {
        assert!(history_from_value(None).unwrap().is_empty());
        for raw in [json!(null), json!("x"), json!({"role": "user", "content": "hi"}), json!(3)] {
            assert!(matches!(
                history_from_value(Some(raw)),
                Err(HistoryError::NotAnArray)
            ));
        }
        let messages =
            history_from_value(Some(json!([{"role": "assistant", "content": "在。"}]))).unwrap();
        assert_eq!(messages, vec![ConversationMessage::assistant("在。")]);
    }

    #[test]
    fn unknown_role_tag_fails_whole_history() {
        let payload = r#"[{"role":"user","content":"hi"},{"role":"system","content":"x"}]"#;
        assert!(matches!(
            parse_history(Some(payload)),
            Err(HistoryError::MalformedEntry(_))
        ));
    }

    #[test]
    fn malformed_entries_outside_window_are_ignored() {
        let mut raw = vec![json!("not a message")];
        raw.extend((0..8).map(|i| json!({"role": "user", "content": format!("m{i}")})));
        assert_eq!(trim_history(raw).unwrap().len(), 8);
    }

    #[test]
    fn format_uses_user_label_and_role_name() {
        let history = vec![
            ConversationMessage::user("  你好  "),
            ConversationMessage::assistant("我在。"),
        ];
        assert_eq!(
            format_history(&history, "哈利·波特"),
            "用户: 你好\n哈利·波特: 我在。"
        );
        assert_eq!(format_history(&[], "哈利·波特"), "");
    }
}
