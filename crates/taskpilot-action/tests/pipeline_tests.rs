//! End-to-end pipeline tests: assistant text in, mutated collection out.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use taskpilot_action::{parse_reply, Action, ActionState, Executor};
use taskpilot_core::clock::FixedClock;
use taskpilot_core::config::PipelineConfig;
use taskpilot_core::types::{Priority, Task, TaskId};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap() // a Monday
}

fn executor() -> Executor {
    Executor::new(Arc::new(FixedClock(today())), PipelineConfig::default())
}

fn seeded_task(id: i64, title: &str) -> Task {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "due": {"date": "", "time": ""},
        "priority": "None",
        "tags": [],
        "completed": false,
        "completedDate": null,
        "timeAllocated": null,
        "objective": null,
        "goalId": null,
        "recurrence": {"type": "None", "interval": null, "unit": "day", "daysOfWeek": []},
        "inToday": false
    }))
    .unwrap()
}

#[test]
fn full_turn_parse_and_execute() {
    let reply = concat!(
        "I'll set that up and clear the stale one.\n",
        r#"<actions-block>{"actions":["#,
        r#"{"type":"create","task":{"title":"Review PR","priority":"High","due":{"date":"2025-03-11"}}},"#,
        r#"{"type":"update","id":1,"fields":{"tags":["deep-work"]}},"#,
        r#"{"type":"delete","id":2},"#,
        r#"{"type":"create","task":{"title":"Follow up"}}"#,
        r#"]}</actions-block>"#,
    );

    let parsed = parse_reply(reply);
    assert_eq!(parsed.display_text, "I'll set that up and clear the stale one.");
    assert_eq!(parsed.actions.len(), 4);

    let exec = executor();
    let message_id = Uuid::new_v4();
    let tasks = vec![seeded_task(1, "Write report"), seeded_task(2, "Old chore")];

    // Auto-run halts at the delete.
    let out = exec.run(message_id, &tasks, &parsed.actions);
    assert_eq!(out.executed, 2);
    assert_eq!(out.states[2], ActionState::PendingApproval);
    assert_eq!(out.states[3], ActionState::Blocked);
    assert_eq!(out.tasks.len(), 3);
    assert_eq!(out.tasks[0].tags, vec!["deep-work"]);
    assert_eq!(out.tasks[2].priority, Priority::High);
    assert!(out.tasks[2].in_today); // due tomorrow

    // Approving the delete executes it and the trailing create.
    let approved = exec
        .approve(message_id, &out.tasks, &parsed.actions, &out.states, 2)
        .unwrap();
    assert_eq!(approved.executed, 4);
    assert!(approved.tasks.iter().all(|t| t.id != TaskId::Num(2)));
    assert!(approved.tasks.iter().any(|t| t.title == "Follow up"));
}

#[test]
fn rejecting_the_delete_leaves_task_untouched() {
    let exec = executor();
    let message_id = Uuid::new_v4();
    let tasks = vec![seeded_task(1, "Keep me")];
    let actions: Vec<Action> = serde_json::from_value(json!([
        {"type": "delete", "id": 1},
        {"type": "create", "task": {"title": "After"}}
    ]))
    .unwrap();

    let out = exec.run(message_id, &tasks, &actions);
    let rejected = exec
        .reject(message_id, &out.tasks, &actions, &out.states, 0)
        .unwrap();

    assert_eq!(rejected.states[0], ActionState::Rejected);
    assert_eq!(rejected.states[1], ActionState::Executed);
    assert_eq!(rejected.executed, 2);
    assert!(rejected.tasks.iter().any(|t| t.id == TaskId::Num(1)));
    assert!(rejected.tasks.iter().any(|t| t.title == "After"));
}

#[test]
fn undo_round_trips_to_exact_snapshot() {
    let exec = executor();
    let message_id = Uuid::new_v4();
    let tasks = vec![seeded_task(1, "Before")];
    let actions: Vec<Action> = serde_json::from_value(json!([
        {"type": "update", "id": 1, "fields": {"title": "After", "priority": "Low"}}
    ]))
    .unwrap();

    let out = exec.run(message_id, &tasks, &actions);
    assert_eq!(out.tasks[0].title, "After");

    let undone = exec.undo(message_id, 0, &out.states).unwrap();
    // Byte-for-byte equality with the pre-action collection.
    assert_eq!(
        serde_json::to_string(&undone.tasks).unwrap(),
        serde_json::to_string(&tasks).unwrap()
    );
    assert_eq!(undone.states[0], ActionState::Undone);

    // At-most-once reversal.
    assert!(exec.undo(message_id, 0, &undone.states).is_none());
}

#[test]
fn malformed_block_degrades_to_plain_reply() {
    let parsed = parse_reply("Done! <actions-block>{oops</actions-block>");
    assert_eq!(parsed.display_text, "Done!");
    assert!(parsed.actions.is_empty());

    let exec = executor();
    let tasks = vec![seeded_task(1, "Untouched")];
    let out = exec.run(Uuid::new_v4(), &tasks, &parsed.actions);
    assert_eq!(out.tasks, tasks);
    assert_eq!(out.executed, 0);
}

#[test]
fn dangling_references_do_not_abort_the_walk() {
    let exec = executor();
    let actions: Vec<Action> = serde_json::from_value(json!([
        {"type": "update", "id": 404, "fields": {"title": "ghost"}},
        {"type": "complete", "id": 404, "completed": true},
        {"type": "create", "task": {"title": "Still created"}}
    ]))
    .unwrap();

    let out = exec.run(Uuid::new_v4(), &[], &actions);
    assert_eq!(out.executed, 3);
    assert!(out.states.iter().all(|s| *s == ActionState::Executed));
    assert_eq!(out.tasks.len(), 1);
    assert_eq!(out.tasks[0].title, "Still created");
}

#[test]
fn states_are_serializable_for_rendering() {
    let exec = executor();
    let tasks = vec![seeded_task(1, "x")];
    let actions: Vec<Action> =
        serde_json::from_value(json!([{"type": "delete", "id": 1}])).unwrap();

    let out = exec.run(Uuid::new_v4(), &tasks, &actions);
    let rendered = serde_json::to_value(&out.states).unwrap();
    assert_eq!(rendered, json!(["pending_approval"]));
}
