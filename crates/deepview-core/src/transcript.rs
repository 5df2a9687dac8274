use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

use super::interrupt::PendingInterrupt;
use super::todos::TodoItem;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("read transcript: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse transcript json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse transcript yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Message body as delivered upstream: plain text, a list of content blocks,
/// or anything else (kept opaque).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    Other(Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentBlock {
    Text(String),
    Structured(StructuredBlock),
    Other(Value),
}

pub const TOOL_USE_BLOCK: &str = "tool_use";
pub const TEXT_BLOCK: &str = "text";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredBlock {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub input: Option<Value>,
}

impl StructuredBlock {
    pub fn is_tool_use(&self) -> bool {
        self.kind.as_deref() == Some(TOOL_USE_BLOCK)
    }
}

/// One tool-call descriptor in any of the upstream shapes. Every field is
/// optional; the extractor decides what to make of the gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawToolCall {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub function: Option<RawFunction>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default)]
    pub args: Option<Value>,
    #[serde(default)]
    pub input: Option<Value>,
}

impl From<&StructuredBlock> for RawToolCall {
    fn from(block: &StructuredBlock) -> Self {
        Self {
            id: block.id.clone(),
            function: None,
            name: block.name.clone(),
            kind: block.kind.clone(),
            args: None,
            input: block.input.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFunction {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalKwargs {
    #[serde(default, deserialize_with = "lenient_list")]
    pub tool_calls: Option<Vec<RawToolCall>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HumanMessage {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub content: MessageContent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub content: MessageContent,
    #[serde(default, deserialize_with = "lenient")]
    pub additional_kwargs: AdditionalKwargs,
    #[serde(default, deserialize_with = "lenient_list")]
    pub tool_calls: Option<Vec<RawToolCall>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultMessage {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tool_call_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEvent {
    Human(HumanMessage),
    #[serde(rename = "ai")]
    Assistant(AssistantMessage),
    #[serde(rename = "tool")]
    ToolResult(ToolResultMessage),
    #[serde(other)]
    Other,
}

impl TranscriptEvent {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Human(message) => message.id.as_deref(),
            Self::Assistant(message) => message.id.as_deref(),
            Self::ToolResult(message) => message.id.as_deref(),
            Self::Other => None,
        }
    }
}

/// A thread snapshot: the ordered events plus the side state the panels render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transcript {
    #[serde(deserialize_with = "event_list")]
    pub messages: Vec<TranscriptEvent>,
    #[serde(with = "interrupt_envelope")]
    pub interrupt: Option<PendingInterrupt>,
    #[serde(deserialize_with = "nullable")]
    pub todos: Vec<TodoItem>,
    #[serde(deserialize_with = "nullable")]
    pub files: BTreeMap<String, Value>,
}

impl Transcript {
    pub fn from_messages(messages: Vec<TranscriptEvent>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Accepts either a full snapshot object or a bare array of events.
    pub fn from_json_str(raw: &str) -> Result<Self, TranscriptError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, TranscriptError> {
        let value: Value = serde_yaml::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TranscriptError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&raw),
            _ => Self::from_json_str(&raw),
        }
    }

    fn from_value(value: Value) -> Result<Self, TranscriptError> {
        if let Value::Array(entries) = value {
            let messages = entries
                .into_iter()
                .map(event_from_value)
                .collect::<Result<_, _>>()?;
            return Ok(Self::from_messages(messages));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// An event without a string `type` is kept as [`TranscriptEvent::Other`].
fn event_from_value(value: Value) -> Result<TranscriptEvent, serde_json::Error> {
    let typed = value
        .get("type")
        .is_some_and(|kind| kind.is_string());
    if !typed {
        return Ok(TranscriptEvent::Other);
    }
    serde_json::from_value(value)
}

fn event_list<'de, D>(deserializer: D) -> Result<Vec<TranscriptEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<Value>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(|entry| event_from_value(entry).map_err(<D::Error as serde::de::Error>::custom))
        .collect()
}

/// `null` reads as the empty collection.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Upstream wraps the interrupt payload as `{ "value": { ... } }`. Any
/// non-null envelope is an interrupt in effect; a value that is null or not a
/// review payload just leaves nothing to review.
mod interrupt_envelope {
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serialize;
    use serde::Serializer;
    use serde_json::Value;

    use super::PendingInterrupt;

    #[derive(Serialize)]
    struct Envelope<T> {
        value: Option<T>,
    }

    pub fn serialize<S>(interrupt: &Option<PendingInterrupt>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        interrupt
            .as_ref()
            .map(|value| Envelope { value: Some(value) })
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<PendingInterrupt>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(envelope) = Option::<Value>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let value = match envelope {
            Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
            _ => Value::Null,
        };
        Ok(Some(serde_json::from_value(value).unwrap_or_default()))
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Null or non-array input reads as empty; entries that do not parse are skipped.
pub(crate) fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Option<Vec<RawToolCall>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        entries
            .into_iter()
            .map(|entry| serde_json::from_value(entry).unwrap_or_default())
            .collect(),
    ))
}
