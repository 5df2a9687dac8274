use std::collections::HashMap;

use serde::Serialize;

use super::content::message_text;
use super::correlation::CorrelationTable;
use super::correlation::Resolution;
use super::interrupt::PendingInterrupt;
use super::tool_calls::extract_tool_calls;
use super::tool_calls::ToolCallRecord;
use super::transcript::AssistantMessage;
use super::transcript::HumanMessage;
use super::transcript::TranscriptEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Human,
    Assistant,
}

impl Speaker {
    pub fn label(self) -> &'static str {
        match self {
            Self::Human => "You",
            Self::Assistant => "Agent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnMessage {
    Human(HumanMessage),
    #[serde(rename = "ai")]
    Assistant(AssistantMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    /// Event id, or `event-<index>` for events that arrived without one.
    pub key: String,
    pub message: TurnMessage,
    pub tool_calls: Vec<ToolCallRecord>,
    pub starts_new_speaker_run: bool,
}

impl Turn {
    pub fn speaker(&self) -> Speaker {
        match self.message {
            TurnMessage::Human(_) => Speaker::Human,
            TurnMessage::Assistant(_) => Speaker::Assistant,
        }
    }

    pub fn text(&self) -> String {
        match &self.message {
            TurnMessage::Human(message) => message_text(&message.content),
            TurnMessage::Assistant(message) => message_text(&message.content),
        }
    }
}

/// Fold state for one pass over a transcript. Feed events in arrival order,
/// exactly once each, then call [`TurnBuilder::finish`].
#[derive(Debug, Clone, Default)]
pub struct TurnBuilder {
    interrupted: bool,
    table: CorrelationTable,
    by_key: HashMap<String, usize>,
    dropped_results: usize,
}

impl TurnBuilder {
    pub fn new(interrupted: bool) -> Self {
        Self {
            interrupted,
            ..Self::default()
        }
    }

    pub fn apply(mut self, position: usize, event: &TranscriptEvent) -> Self {
        match event {
            TranscriptEvent::Human(message) => {
                let key = turn_key(message.id.as_deref(), position);
                self.upsert(Turn {
                    key,
                    message: TurnMessage::Human(message.clone()),
                    tool_calls: Vec::new(),
                    starts_new_speaker_run: false,
                });
            }
            TranscriptEvent::Assistant(message) => {
                let key = turn_key(message.id.as_deref(), position);
                let tool_calls = extract_tool_calls(message, self.interrupted, &key);
                self.upsert(Turn {
                    key,
                    message: TurnMessage::Assistant(message.clone()),
                    tool_calls,
                    starts_new_speaker_run: false,
                });
            }
            TranscriptEvent::ToolResult(message) => match self.table.resolve(message) {
                Resolution::Completed(_) => {}
                Resolution::MissingId => {
                    self.dropped_results += 1;
                    tracing::debug!(position, "tool result without tool_call_id dropped");
                }
                Resolution::Unmatched => {
                    self.dropped_results += 1;
                    tracing::debug!(
                        position,
                        tool_call_id = message.tool_call_id.as_deref().unwrap_or_default(),
                        "tool result matches no known call; dropped"
                    );
                }
            },
            TranscriptEvent::Other => {}
        }
        self
    }

    pub fn table(&self) -> &CorrelationTable {
        &self.table
    }

    pub fn dropped_results(&self) -> usize {
        self.dropped_results
    }

    pub fn finish(self) -> Vec<Turn> {
        let dropped = self.dropped_results;
        let mut turns = self.table.into_turns();
        mark_speaker_runs(&mut turns);
        tracing::trace!(turns = turns.len(), dropped, "turns built");
        turns
    }

    fn upsert(&mut self, turn: Turn) {
        if let Some(&index) = self.by_key.get(&turn.key) {
            tracing::debug!(key = %turn.key, index, "repeated event id replaces turn in place");
            self.table.replace(index, turn);
            return;
        }
        let key = turn.key.clone();
        let index = self.table.register(turn);
        self.by_key.insert(key, index);
    }
}

/// One pass over `events`. A pending interrupt marks every unresolved call
/// `interrupted` rather than `pending`.
pub fn build_turns(events: &[TranscriptEvent], interrupt: Option<&PendingInterrupt>) -> Vec<Turn> {
    events
        .iter()
        .enumerate()
        .fold(TurnBuilder::new(interrupt.is_some()), |builder, (position, event)| {
            builder.apply(position, event)
        })
        .finish()
}

pub fn mark_speaker_runs(turns: &mut [Turn]) {
    let mut previous: Option<Speaker> = None;
    for turn in turns.iter_mut() {
        let speaker = turn.speaker();
        turn.starts_new_speaker_run = previous != Some(speaker);
        previous = Some(speaker);
    }
}

fn turn_key(id: Option<&str>, position: usize) -> String {
    match id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("event-{position}"),
    }
}

#[cfg(test)]
mod tests;
