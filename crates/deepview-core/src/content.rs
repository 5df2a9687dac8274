use serde_json::Value;

use super::transcript::ContentBlock;
use super::transcript::MessageContent;
use super::transcript::TEXT_BLOCK;

/// Display text of a message body. Block lists contribute bare strings and
/// `text` blocks, concatenated without a separator.
pub fn message_text(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text.as_str()),
                ContentBlock::Structured(block) if block.kind.as_deref() == Some(TEXT_BLOCK) => {
                    Some(block.text.as_deref().unwrap_or_default())
                }
                _ => None,
            })
            .collect(),
        MessageContent::Other(_) => String::new(),
    }
}

/// Text of one entry in the agent's file map. Entries are either raw strings
/// or `{ "content": ... }` objects whose content may be a list of lines.
pub fn file_text(entry: &Value) -> String {
    match entry {
        Value::String(text) => text.clone(),
        Value::Object(map) => match map.get("content") {
            Some(Value::Array(lines)) => lines
                .iter()
                .map(scalar_text)
                .collect::<Vec<_>>()
                .join("\n"),
            Some(other) => scalar_text(other),
            None => String::new(),
        },
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
