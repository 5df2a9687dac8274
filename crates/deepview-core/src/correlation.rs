use std::collections::HashMap;

use super::content::message_text;
use super::tool_calls::ToolCallRecord;
use super::transcript::ToolResultMessage;
use super::turns::Turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSlot {
    pub turn: usize,
    pub call: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Completed(CallSlot),
    MissingId,
    Unmatched,
}

/// Turns built so far plus a tool-call id index over them. When two calls
/// share an id, the one earlier in scan order (turn order, then call order)
/// owns it and the other can never be resolved.
#[derive(Debug, Clone, Default)]
pub struct CorrelationTable {
    turns: Vec<Turn>,
    by_call_id: HashMap<String, CallSlot>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, turn: Turn) -> usize {
        let index = self.turns.len();
        index_calls(&mut self.by_call_id, index, &turn.tool_calls);
        self.turns.push(turn);
        index
    }

    /// Swaps the turn at `index` in place. Resolutions already applied to the
    /// old turn's calls are discarded along with them.
    pub fn replace(&mut self, index: usize, turn: Turn) {
        let Some(slot) = self.turns.get_mut(index) else {
            return;
        };
        *slot = turn;
        self.reindex();
    }

    pub fn resolve(&mut self, result: &ToolResultMessage) -> Resolution {
        let Some(call_id) = result.tool_call_id.as_deref().filter(|id| !id.is_empty()) else {
            return Resolution::MissingId;
        };
        let Some(slot) = self.by_call_id.get(call_id).copied() else {
            return Resolution::Unmatched;
        };
        let Some(record) = self
            .turns
            .get_mut(slot.turn)
            .and_then(|turn| turn.tool_calls.get_mut(slot.call))
        else {
            return Resolution::Unmatched;
        };
        record.complete(message_text(&result.content));
        Resolution::Completed(slot)
    }

    pub fn record(&self, call_id: &str) -> Option<&ToolCallRecord> {
        let slot = self.by_call_id.get(call_id)?;
        self.turns.get(slot.turn)?.tool_calls.get(slot.call)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }

    fn reindex(&mut self) {
        self.by_call_id.clear();
        for (index, turn) in self.turns.iter().enumerate() {
            index_calls(&mut self.by_call_id, index, &turn.tool_calls);
        }
    }
}

fn index_calls(index: &mut HashMap<String, CallSlot>, turn: usize, calls: &[ToolCallRecord]) {
    for (call, record) in calls.iter().enumerate() {
        index
            .entry(record.id.clone())
            .or_insert(CallSlot { turn, call });
    }
}
