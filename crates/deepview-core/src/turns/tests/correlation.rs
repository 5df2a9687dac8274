use super::*;
use pretty_assertions::assert_eq;

#[test]
fn tool_result_completes_matching_call() {
    let events = vec![
        assistant_calling("a1", &[("abc", "calculator")]),
        tool_result("abc", "42"),
    ];
    let turns = build_turns(&events, None);
    let call = &turns[0].tool_calls[0];
    assert_eq!(call.status, ToolCallStatus::Completed);
    assert_eq!(call.result.as_deref(), Some("42"));
}

#[test]
fn dangling_result_changes_nothing() {
    let events = vec![
        assistant_calling("a1", &[("abc", "calculator")]),
        tool_result("zzz", "lost"),
    ];
    let with_dangling = build_turns(&events, None);
    let without = build_turns(&events[..1], None);
    assert_eq!(with_dangling, without);
    assert_eq!(statuses(&with_dangling[0]), vec![ToolCallStatus::Pending]);
}

#[test]
fn dropped_results_are_counted_by_the_builder() {
    let events = vec![
        assistant_calling("a1", &[("abc", "calculator")]),
        tool_result("zzz", "lost"),
        super::event(serde_json::json!({"type": "tool", "content": "no id"})),
        tool_result("abc", "ok"),
    ];
    let builder = events
        .iter()
        .enumerate()
        .fold(TurnBuilder::new(false), |builder, (position, event)| {
            builder.apply(position, event)
        });
    assert_eq!(builder.dropped_results(), 2);
    assert!(builder
        .table()
        .record("abc")
        .is_some_and(|record| record.is_completed()));
}

#[test]
fn results_resolve_calls_from_earlier_turns() {
    let events = vec![
        assistant_calling("a1", &[("c1", "search"), ("c2", "read_file")]),
        human("h1", "keep going"),
        assistant_calling("a2", &[("c3", "write_file")]),
        tool_result("c2", "contents"),
        tool_result("c3", "written"),
    ];
    let turns = build_turns(&events, None);
    assert_eq!(
        statuses(&turns[0]),
        vec![ToolCallStatus::Pending, ToolCallStatus::Completed]
    );
    assert_eq!(statuses(&turns[2]), vec![ToolCallStatus::Completed]);
    assert_eq!(turns[0].tool_calls[1].result.as_deref(), Some("contents"));
}

#[test]
fn result_arriving_before_its_call_is_lost() {
    let events = vec![
        tool_result("c1", "early"),
        assistant_calling("a1", &[("c1", "search")]),
    ];
    let turns = build_turns(&events, None);
    assert_eq!(statuses(&turns[0]), vec![ToolCallStatus::Pending]);
}

#[test]
fn duplicate_call_ids_resolve_to_first_turn() {
    let events = vec![
        assistant_calling("a1", &[("dup", "search")]),
        assistant_calling("a2", &[("dup", "search")]),
        tool_result("dup", "first wins"),
    ];
    let turns = build_turns(&events, None);
    assert_eq!(statuses(&turns[0]), vec![ToolCallStatus::Completed]);
    assert_eq!(statuses(&turns[1]), vec![ToolCallStatus::Pending]);
}

#[test]
fn pending_interrupt_marks_unresolved_calls_interrupted() {
    let events = vec![
        assistant_calling("a1", &[("c1", "search"), ("c2", "write_file")]),
        tool_result("c1", "done"),
    ];
    let pending = interrupt(&["write_file"]);
    let turns = build_turns(&events, Some(&pending));
    assert_eq!(
        statuses(&turns[0]),
        vec![ToolCallStatus::Completed, ToolCallStatus::Interrupted]
    );
}

#[test]
fn block_list_results_are_flattened_to_text() {
    let events = vec![
        assistant_calling("a1", &[("c1", "search")]),
        super::event(serde_json::json!({
            "type": "tool",
            "tool_call_id": "c1",
            "content": [{"type": "text", "text": "part one, "}, "part two"],
        })),
    ];
    let turns = build_turns(&events, None);
    assert_eq!(
        turns[0].tool_calls[0].result.as_deref(),
        Some("part one, part two")
    );
}
