use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// ============================================================================
// Chat Types - Payload structures exchanged with the host framework
// ============================================================================

/// A single chat message.
///
/// `role` is an open set ("system", "user", "assistant", ...); host-specific
/// fields beyond role and content round-trip through `extra` untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn new(role: impl Into<String>, content: MessageContent) -> Self {
        Self {
            role: role.into(),
            content,
            extra: Map::new(),
        }
    }

    /// Create a user message with plain text content
    pub fn user(text: impl Into<String>) -> Self {
        Self::new("user", MessageContent::Text(text.into()))
    }

    /// Create an assistant message with plain text content
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new("assistant", MessageContent::Text(text.into()))
    }
}

/// Message content as hosts actually send it: either a plain string or a
/// list of structured parts (multimodal hosts use `{"type": "text", ...}`
/// objects).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<Value>),
}

impl MessageContent {
    /// Textual length in Unicode scalar values. Structured parts contribute
    /// their `text` fields; non-text parts (images etc.) contribute nothing.
    pub fn char_len(&self) -> usize {
        match self {
            Self::Text(text) => text.chars().count(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .map(|text| text.chars().count())
                .sum(),
        }
    }

    /// Append text in place. For structured content the suffix goes onto the
    /// trailing text part; if no part carries text, a new text part is pushed.
    pub fn append_text(&mut self, suffix: &str) {
        match self {
            Self::Text(text) => text.push_str(suffix),
            Self::Parts(parts) => {
                for part in parts.iter_mut().rev() {
                    if let Some(Value::String(text)) = part.get_mut("text") {
                        text.push_str(suffix);
                        return;
                    }
                }
                parts.push(json!({ "type": "text", "text": suffix }));
            }
        }
    }
}

/// The chat request/response body the host threads through the filter chain.
///
/// `model` and `messages` are required; deserialization fails without them.
/// `input_tokens` correlates the inlet's count with the matching outlet by
/// riding on the payload itself, so a single filter instance can serve
/// overlapping requests. Everything else the host puts in the body survives
/// through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payload {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Payload {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            input_tokens: None,
            extra: Map::new(),
        }
    }

    /// Index of the most recent assistant message, scanning from the end.
    pub fn last_assistant_index(&self) -> Option<usize> {
        self.messages.iter().rposition(|msg| msg.role == "assistant")
    }
}

// ============================================================================
// API Types - Request/Response structures for the accounting service
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct UserInfoRequest<'a> {
    pub user: &'a Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultRequest<'a> {
    pub user: &'a Value,
    pub model: &'a str,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultResponse {
    #[serde(default)]
    pub stats_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenizeRequest<'a> {
    pub messages: TokenizeInput<'a>,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub model: &'a str,
}

/// The tokenizer endpoint takes either a whole conversation or a single
/// content block under the same `messages` key.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum TokenizeInput<'a> {
    Chat(&'a [Message]),
    Text(&'a MessageContent),
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenizeResponse {
    pub tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_deserializes_from_string() {
        let msg: Message = serde_json::from_value(json!({
            "role": "user",
            "content": "hello"
        }))
        .unwrap();
        assert_eq!(msg.content, MessageContent::Text("hello".to_string()));
    }

    #[test]
    fn test_content_deserializes_from_parts() {
        let msg: Message = serde_json::from_value(json!({
            "role": "user",
            "content": [
                {"type": "text", "text": "look at this"},
                {"type": "image_url", "image_url": {"url": "data:..."}}
            ]
        }))
        .unwrap();
        assert!(matches!(msg.content, MessageContent::Parts(ref parts) if parts.len() == 2));
    }

    #[test]
    fn test_char_len_counts_code_points() {
        let content = MessageContent::Text("héllo".to_string());
        assert_eq!(content.char_len(), 5);
    }

    #[test]
    fn test_char_len_sums_text_parts_only() {
        let content = MessageContent::Parts(vec![
            json!({"type": "text", "text": "abc"}),
            json!({"type": "image_url", "image_url": {"url": "ignored"}}),
            json!({"type": "text", "text": "de"}),
        ]);
        assert_eq!(content.char_len(), 5);
    }

    #[test]
    fn test_append_text_to_string_content() {
        let mut content = MessageContent::Text("reply".to_string());
        content.append_text("\n\nstats");
        assert_eq!(content, MessageContent::Text("reply\n\nstats".to_string()));
    }

    #[test]
    fn test_append_text_to_trailing_text_part() {
        let mut content = MessageContent::Parts(vec![
            json!({"type": "text", "text": "first"}),
            json!({"type": "text", "text": "last"}),
        ]);
        content.append_text(" + stats");
        if let MessageContent::Parts(parts) = &content {
            assert_eq!(parts[0]["text"], "first");
            assert_eq!(parts[1]["text"], "last + stats");
        } else {
            panic!("Expected Parts content");
        }
    }

    #[test]
    fn test_append_text_adds_part_when_none_textual() {
        let mut content = MessageContent::Parts(vec![json!({"type": "image_url"})]);
        content.append_text("stats");
        if let MessageContent::Parts(parts) = &content {
            assert_eq!(parts.len(), 2);
            assert_eq!(parts[1]["text"], "stats");
        } else {
            panic!("Expected Parts content");
        }
    }

    #[test]
    fn test_last_assistant_index_picks_final_one() {
        let payload = Payload::new(
            "gpt-4o",
            vec![
                Message::user("q1"),
                Message::assistant("a1"),
                Message::user("q2"),
                Message::assistant("a2"),
            ],
        );
        assert_eq!(payload.last_assistant_index(), Some(3));
    }

    #[test]
    fn test_last_assistant_index_none_without_assistant() {
        let payload = Payload::new("gpt-4o", vec![Message::user("q")]);
        assert_eq!(payload.last_assistant_index(), None);
    }

    #[test]
    fn test_payload_requires_model_and_messages() {
        let result: Result<Payload, _> = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "hi"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let body = json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "hi", "timestamp": 17}],
            "chat_id": "abc-123",
            "stream": true
        });
        let payload: Payload = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(serde_json::to_value(&payload).unwrap(), body);
    }

    #[test]
    fn test_input_tokens_absent_unless_set() {
        let mut payload = Payload::new("gpt-4o", vec![Message::user("hi")]);
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("input_tokens").is_none());

        payload.input_tokens = Some(42);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["input_tokens"], 42);
    }
}
