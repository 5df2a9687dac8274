use serde::Serialize;

use super::interrupt::project_interrupt;
use super::interrupt::InterruptProjection;
use super::transcript::Transcript;
use super::turns::build_turns;
use super::turns::Turn;

/// Everything a renderer needs for one transcript snapshot. Rebuild it from
/// scratch whenever the snapshot changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptView {
    pub turns: Vec<Turn>,
    pub interrupted: bool,
    interrupt: InterruptProjection,
}

/// A turn as handed to the renderer. `interrupt` is only ever set on the
/// final turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderItem<'a> {
    pub index: usize,
    pub turn: &'a Turn,
    pub is_last: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupt: Option<&'a InterruptProjection>,
}

impl TranscriptView {
    pub fn build(transcript: &Transcript) -> Self {
        let interrupt = transcript.interrupt.as_ref();
        Self {
            turns: build_turns(&transcript.messages, interrupt),
            interrupted: interrupt.is_some(),
            interrupt: project_interrupt(interrupt),
        }
    }

    pub fn items(&self) -> Vec<RenderItem<'_>> {
        let last = self.turns.len().checked_sub(1);
        self.turns
            .iter()
            .enumerate()
            .map(|(index, turn)| RenderItem {
                index,
                turn,
                is_last: Some(index) == last,
                interrupt: self.projection_for(index),
            })
            .collect()
    }

    pub fn projection_for(&self, index: usize) -> Option<&InterruptProjection> {
        let last = self.turns.len().checked_sub(1)?;
        (index == last).then_some(&self.interrupt)
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
