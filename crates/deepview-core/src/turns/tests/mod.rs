use pretty_assertions::assert_eq;
use serde_json::json;
use serde_json::Value;

pub(super) use super::build_turns;
pub(super) use super::Speaker;
pub(super) use super::Turn;
pub(super) use super::TurnBuilder;
pub(super) use crate::interrupt::ActionRequest;
pub(super) use crate::interrupt::PendingInterrupt;
pub(super) use crate::tool_calls::ToolCallStatus;
pub(super) use crate::transcript::Transcript;
pub(super) use crate::transcript::TranscriptEvent;
pub(super) use crate::view::TranscriptView;

mod correlation;

fn event(value: Value) -> TranscriptEvent {
    serde_json::from_value(value).expect("event")
}

fn human(id: &str, text: &str) -> TranscriptEvent {
    event(json!({"type": "human", "id": id, "content": text}))
}

fn assistant(id: &str, text: &str) -> TranscriptEvent {
    event(json!({"type": "ai", "id": id, "content": text}))
}

fn assistant_calling(id: &str, calls: &[(&str, &str)]) -> TranscriptEvent {
    let tool_calls: Vec<Value> = calls
        .iter()
        .map(|(call_id, name)| json!({"id": call_id, "name": name, "args": {}}))
        .collect();
    event(json!({"type": "ai", "id": id, "content": "", "tool_calls": tool_calls}))
}

fn tool_result(call_id: &str, text: &str) -> TranscriptEvent {
    event(json!({"type": "tool", "tool_call_id": call_id, "content": text}))
}

fn interrupt(names: &[&str]) -> PendingInterrupt {
    PendingInterrupt {
        action_requests: names
            .iter()
            .map(|name| ActionRequest {
                name: name.to_string(),
                ..ActionRequest::default()
            })
            .collect(),
        review_configs: Vec::new(),
    }
}

fn keys(turns: &[Turn]) -> Vec<&str> {
    turns.iter().map(|turn| turn.key.as_str()).collect()
}

fn runs(turns: &[Turn]) -> Vec<bool> {
    turns.iter().map(|turn| turn.starts_new_speaker_run).collect()
}

fn statuses(turn: &Turn) -> Vec<ToolCallStatus> {
    turn.tool_calls.iter().map(|call| call.status).collect()
}

#[test]
fn empty_transcript_builds_no_turns() {
    assert_eq!(build_turns(&[], None), Vec::<Turn>::new());
}
