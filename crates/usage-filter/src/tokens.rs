//! Heuristic token estimation.
//!
//! Fast, dependency-free approximation used when the accounting service's
//! tokenizer is disabled or unreachable: tokens ≈ characters / e, a rough
//! multilingual divisor, plus a small flat overhead per message.

use crate::types::{Message, MessageContent};

/// Approximate characters per token (≈ e).
const CHARS_PER_TOKEN: f64 = 2.718;

/// Flat overhead per message, covering role markers and separators.
const MESSAGE_OVERHEAD: f64 = 2.0;

/// Estimate tokens for a whole conversation.
///
/// Per message: `char_len(content) / 2.718 + 2`, accumulated as floats and
/// truncated once at the end.
pub fn estimate_chat_tokens(messages: &[Message]) -> u64 {
    let total: f64 = messages
        .iter()
        .map(|msg| msg.content.char_len() as f64 / CHARS_PER_TOKEN + MESSAGE_OVERHEAD)
        .sum();
    total as u64
}

/// Estimate tokens for a single content block.
///
/// Measured over an escaped serialization of the content rather than raw
/// characters, so newlines, quotes and non-ASCII text weigh roughly what a
/// real tokenizer would charge for them.
pub fn estimate_text_tokens(content: &MessageContent) -> u64 {
    (escaped_len(content) as f64 / CHARS_PER_TOKEN + MESSAGE_OVERHEAD) as u64
}

/// Byte length of the content's escaped serialization: ASCII-only JSON
/// encoding with the enclosing delimiters stripped, then a unicode-escape
/// pass that doubles every backslash.
fn escaped_len(content: &MessageContent) -> usize {
    match content {
        MessageContent::Text(text) => text.chars().map(escaped_char_len).sum(),
        MessageContent::Parts(parts) => {
            // Structured content is measured from its JSON form; only the
            // two enclosing brackets are stripped.
            let json = serde_json::to_string(parts).unwrap_or_default();
            let escaped: usize = json
                .chars()
                .map(|c| match c {
                    '\\' => 2,
                    c if c.is_ascii() => 1,
                    c if (c as u32) <= 0xFFFF => 7,
                    _ => 14,
                })
                .sum();
            escaped.saturating_sub(2)
        }
    }
}

/// Escaped byte cost of one character of string content.
///
/// JSON encoding turns quotes, backslashes and control characters into
/// backslash sequences and non-ASCII characters into `\uXXXX` (astral
/// characters become surrogate pairs); the unicode-escape pass then doubles
/// each backslash.
fn escaped_char_len(c: char) -> usize {
    match c {
        '"' => 3,
        '\\' => 4,
        '\n' | '\r' | '\t' | '\u{8}' | '\u{c}' => 3,
        c if (c as u32) < 0x20 => 7,
        '\u{7f}' => 4,
        c if c.is_ascii() => 1,
        c if (c as u32) <= 0xFFFF => 7,
        _ => 14,
    }
}
