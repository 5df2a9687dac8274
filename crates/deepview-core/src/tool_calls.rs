use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use super::transcript::AssistantMessage;
use super::transcript::ContentBlock;
use super::transcript::MessageContent;
use super::transcript::RawToolCall;

pub const UNKNOWN_TOOL_NAME: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    Pending,
    Interrupted,
    Completed,
}

impl ToolCallStatus {
    pub fn initial(interrupted: bool) -> Self {
        if interrupted {
            Self::Interrupted
        } else {
            Self::Pending
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Interrupted => "interrupted",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub args: Value,
    pub status: ToolCallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl ToolCallRecord {
    /// A completed record stays completed; a later result only replaces the text.
    pub fn complete(&mut self, result: String) {
        self.status = ToolCallStatus::Completed;
        self.result = Some(result);
    }

    pub fn is_completed(&self) -> bool {
        self.status == ToolCallStatus::Completed
    }
}

/// Where an assistant event's tool calls were found. Exactly one source is
/// used per event, chosen in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCallSource<'a> {
    /// `additional_kwargs.tool_calls`
    Legacy(&'a [RawToolCall]),
    /// `tool_calls`, minus entries named `""`
    Native(Vec<&'a RawToolCall>),
    /// `tool_use` blocks embedded in the content list
    ContentBlocks(Vec<RawToolCall>),
}

impl<'a> ToolCallSource<'a> {
    pub fn classify(message: &'a AssistantMessage) -> Option<Self> {
        if let Some(calls) = message.additional_kwargs.tool_calls.as_deref() {
            if !calls.is_empty() {
                return Some(Self::Legacy(calls));
            }
        }

        if let Some(calls) = message.tool_calls.as_deref() {
            let named: Vec<&RawToolCall> = calls
                .iter()
                .filter(|call| call.name.as_deref() != Some(""))
                .collect();
            if !named.is_empty() {
                return Some(Self::Native(named));
            }
        }

        if let MessageContent::Blocks(blocks) = &message.content {
            let tool_uses: Vec<RawToolCall> = blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Structured(block) if block.is_tool_use() => {
                        Some(RawToolCall::from(block))
                    }
                    _ => None,
                })
                .collect();
            if !tool_uses.is_empty() {
                return Some(Self::ContentBlocks(tool_uses));
            }
        }

        None
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Legacy(_) => "legacy",
            Self::Native(_) => "native",
            Self::ContentBlocks(_) => "content_blocks",
        }
    }

    pub fn descriptors(&self) -> Vec<&RawToolCall> {
        match self {
            Self::Legacy(calls) => calls.iter().collect(),
            Self::Native(calls) => calls.clone(),
            Self::ContentBlocks(calls) => calls.iter().collect(),
        }
    }
}

/// Normalizes the tool calls of one assistant event. `key` identifies the
/// owning turn and seeds placeholder ids for descriptors that carry none.
pub fn extract_tool_calls(
    message: &AssistantMessage,
    interrupted: bool,
    key: &str,
) -> Vec<ToolCallRecord> {
    let Some(source) = ToolCallSource::classify(message) else {
        return Vec::new();
    };

    source
        .descriptors()
        .into_iter()
        .enumerate()
        .map(|(index, raw)| ToolCallRecord {
            id: call_id(raw, key, index),
            name: call_name(raw),
            args: call_args(raw),
            status: ToolCallStatus::initial(interrupted),
            result: None,
        })
        .collect()
}

pub fn placeholder_call_id(key: &str, index: usize) -> String {
    format!("{key}:tool-{index}")
}

fn call_id(raw: &RawToolCall, key: &str, index: usize) -> String {
    match raw.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => placeholder_call_id(key, index),
    }
}

// function.name, then name, then type.
fn call_name(raw: &RawToolCall) -> String {
    [
        raw.function.as_ref().and_then(|function| function.name.as_deref()),
        raw.name.as_deref(),
        raw.kind.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|name| !name.is_empty())
    .unwrap_or(UNKNOWN_TOOL_NAME)
    .to_string()
}

// function.arguments, then args, then input.
fn call_args(raw: &RawToolCall) -> Value {
    [
        raw.function
            .as_ref()
            .and_then(|function| function.arguments.as_ref()),
        raw.args.as_ref(),
        raw.input.as_ref(),
    ]
    .into_iter()
    .flatten()
    .find(|args| is_present(args))
    .cloned()
    .unwrap_or_else(|| Value::Object(Map::new()))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn assistant(value: Value) -> AssistantMessage {
        serde_json::from_value(value).expect("assistant message")
    }

    fn names(records: &[ToolCallRecord]) -> Vec<&str> {
        records.iter().map(|record| record.name.as_str()).collect()
    }

    #[test]
    fn legacy_shape_wins_over_native_and_blocks() {
        let message = assistant(json!({
            "id": "a1",
            "additional_kwargs": {"tool_calls": [
                {"id": "L1", "function": {"name": "legacy_search", "arguments": "{\"q\":\"x\"}"}},
            ]},
            "tool_calls": [{"id": "N1", "name": "native_search", "args": {"q": "x"}}],
            "content": [{"type": "tool_use", "id": "B1", "name": "block_search", "input": {}}],
        }));

        let source = ToolCallSource::classify(&message).expect("source");
        assert_eq!(source.label(), "legacy");

        let records = extract_tool_calls(&message, false, "a1");
        assert_eq!(names(&records), vec!["legacy_search"]);
        assert_eq!(records[0].id, "L1");
        assert_eq!(records[0].args, json!("{\"q\":\"x\"}"));
        assert_eq!(records[0].status, ToolCallStatus::Pending);
    }

    #[test]
    fn native_shape_wins_over_blocks() {
        let message = assistant(json!({
            "id": "a1",
            "tool_calls": [{"id": "N1", "name": "native_search", "args": {"q": "x"}}],
            "content": [{"type": "tool_use", "id": "B1", "name": "block_search", "input": {}}],
        }));

        let records = extract_tool_calls(&message, false, "a1");
        assert_eq!(names(&records), vec!["native_search"]);
        assert_eq!(records[0].args, json!({"q": "x"}));
    }

    #[test]
    fn empty_legacy_list_falls_through() {
        let message = assistant(json!({
            "additional_kwargs": {"tool_calls": []},
            "tool_calls": [{"id": "N1", "name": "native"}],
        }));
        assert_eq!(names(&extract_tool_calls(&message, false, "k")), vec!["native"]);
    }

    #[test]
    fn native_entries_with_empty_names_are_dropped() {
        let message = assistant(json!({
            "tool_calls": [
                {"id": "N1", "name": ""},
                {"id": "N2", "name": "kept"},
                {"id": "N3"},
            ],
        }));
        let records = extract_tool_calls(&message, false, "k");
        assert_eq!(names(&records), vec!["kept", "unknown"]);
        assert_eq!(records[1].id, "N3");
    }

    #[test]
    fn all_empty_native_names_fall_through_to_blocks() {
        let message = assistant(json!({
            "tool_calls": [{"id": "N1", "name": ""}],
            "content": [
                {"type": "text", "text": "let me look"},
                {"type": "tool_use", "id": "B1", "name": "read_file", "input": {"path": "a.md"}},
            ],
        }));
        let source = ToolCallSource::classify(&message).expect("source");
        assert_eq!(source.label(), "content_blocks");

        let records = extract_tool_calls(&message, false, "k");
        assert_eq!(names(&records), vec!["read_file"]);
        assert_eq!(records[0].args, json!({"path": "a.md"}));
    }

    #[test]
    fn tool_use_block_without_name_is_named_by_type() {
        let message = assistant(json!({
            "content": [{"type": "tool_use", "id": "B1"}],
        }));
        let records = extract_tool_calls(&message, false, "k");
        assert_eq!(names(&records), vec!["tool_use"]);
        assert_eq!(records[0].args, json!({}));
    }

    #[test]
    fn name_and_args_follow_fallback_order() {
        let message = assistant(json!({
            "additional_kwargs": {"tool_calls": [
                {"function": {"name": "", "arguments": ""}, "name": "direct", "args": null, "input": {"i": 1}},
                {"type": "function", "args": {"a": 1}, "input": {"i": 1}},
                {},
            ]},
        }));
        let records = extract_tool_calls(&message, false, "a9");
        assert_eq!(names(&records), vec!["direct", "function", "unknown"]);
        assert_eq!(records[0].args, json!({"i": 1}));
        assert_eq!(records[1].args, json!({"a": 1}));
        assert_eq!(records[2].args, json!({}));
    }

    #[test]
    fn missing_ids_get_deterministic_placeholders() {
        let message = assistant(json!({
            "tool_calls": [{"name": "a"}, {"id": "", "name": "b"}, {"id": "c-id", "name": "c"}],
        }));
        let ids: Vec<String> = extract_tool_calls(&message, false, "a1")
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec!["a1:tool-0", "a1:tool-1", "c-id"]);
    }

    #[test]
    fn pending_interrupt_marks_new_calls_interrupted() {
        let message = assistant(json!({"tool_calls": [{"id": "N1", "name": "search"}]}));
        let records = extract_tool_calls(&message, true, "k");
        assert_eq!(records[0].status, ToolCallStatus::Interrupted);
    }

    #[test]
    fn message_without_tool_calls_yields_nothing() {
        let message = assistant(json!({"content": "just talking"}));
        assert!(ToolCallSource::classify(&message).is_none());
        assert!(extract_tool_calls(&message, false, "k").is_empty());
    }

    #[test]
    fn complete_is_sticky() {
        let mut record = ToolCallRecord {
            id: "c1".to_string(),
            name: "search".to_string(),
            args: json!({}),
            status: ToolCallStatus::Interrupted,
            result: None,
        };
        record.complete("first".to_string());
        record.complete("second".to_string());
        assert!(record.is_completed());
        assert_eq!(record.result.as_deref(), Some("second"));
    }
}
