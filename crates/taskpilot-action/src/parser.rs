//! Assistant reply parser.
//!
//! The assistant embeds its proposed mutations in a sentinel-delimited block
//! containing one JSON object with an `actions` array:
//!
//! ```text
//! Sure, I'll add that.
//! <actions-block>{"actions":[{"type":"create","task":{"title":"Buy milk"}}]}</actions-block>
//! ```
//!
//! Everything outside the block is the human-readable reply. The block is
//! always stripped from the display text, and any parse failure yields an
//! empty action list rather than an error -- model output is untrusted and
//! must never crash the pipeline.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::warn;

use crate::types::Action;

// Case-insensitive tag match, dot matches newlines, non-greedy body.
static ACTION_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<actions-block>(.*?)</actions-block>").expect("Invalid action block regex")
});

/// An assistant reply split into display text and proposed actions.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    /// The reply with the sentinel block removed.
    pub display_text: String,
    /// Proposed mutations, in the order the assistant listed them.
    pub actions: Vec<Action>,
}

/// Split an assistant reply into display text and an ordered action list.
///
/// Only the first sentinel block is consulted. A missing block means no
/// actions; a malformed block is logged and treated as no actions.
pub fn parse_reply(text: &str) -> ParsedReply {
    let Some(caps) = ACTION_BLOCK_RE.captures(text) else {
        return ParsedReply {
            display_text: text.to_string(),
            actions: Vec::new(),
        };
    };

    let whole = caps.get(0).expect("capture 0 always present");
    let body = caps.get(1).expect("capture 1 always present").as_str();

    let mut display_text = String::with_capacity(text.len());
    display_text.push_str(&text[..whole.start()]);
    display_text.push_str(&text[whole.end()..]);
    let display_text = display_text.trim().to_string();

    ParsedReply {
        display_text,
        actions: decode_actions(body),
    }
}

/// Decode the JSON body of a sentinel block into actions.
fn decode_actions(body: &str) -> Vec<Action> {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Malformed action block; ignoring");
            return Vec::new();
        }
    };

    let Some(items) = value.get("actions").and_then(Value::as_array) else {
        warn!("Action block has no actions array; ignoring");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Action>(item.clone()) {
            Ok(action) => Some(action),
            Err(e) => {
                warn!(error = %e, "Skipping unrecognized action");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskpilot_core::types::TaskId;

    #[test]
    fn test_no_block_returns_text_unchanged() {
        let reply = parse_reply("Here are your tasks for today.");
        assert_eq!(reply.display_text, "Here are your tasks for today.");
        assert!(reply.actions.is_empty());
    }

    #[test]
    fn test_well_formed_block() {
        let text = concat!(
            "I'll add that for you.\n",
            r#"<actions-block>{"actions":[{"type":"create","task":{"title":"Buy milk"}},"#,
            r#"{"type":"delete","id":4}]}</actions-block>"#,
        );
        let reply = parse_reply(text);
        assert_eq!(reply.display_text, "I'll add that for you.");
        assert_eq!(reply.actions.len(), 2);
        assert_eq!(
            reply.actions[1],
            Action::Delete { id: TaskId::Num(4) }
        );
    }

    #[test]
    fn test_block_stripped_even_when_malformed() {
        let text = "Done!<actions-block>{not json at all</actions-block> See you.";
        let reply = parse_reply(text);
        assert_eq!(reply.display_text, "Done! See you.");
        assert!(reply.actions.is_empty());
    }

    #[test]
    fn test_tag_match_is_case_insensitive() {
        let text = r#"Ok. <ACTIONS-BLOCK>{"actions":[{"type":"delete","id":1}]}</Actions-Block>"#;
        let reply = parse_reply(text);
        assert_eq!(reply.display_text, "Ok.");
        assert_eq!(reply.actions.len(), 1);
    }

    #[test]
    fn test_only_first_block_is_consulted() {
        let text = concat!(
            r#"<actions-block>{"actions":[{"type":"delete","id":1}]}</actions-block>"#,
            " middle ",
            r#"<actions-block>{"actions":[{"type":"delete","id":2}]}</actions-block>"#,
        );
        let reply = parse_reply(text);
        assert_eq!(reply.actions, vec![Action::Delete { id: TaskId::Num(1) }]);
        // The second block stays in the display text; only the first is parsed.
        assert!(reply.display_text.contains("middle"));
    }

    #[test]
    fn test_actions_not_an_array_treated_as_empty() {
        let text = r#"<actions-block>{"actions": {"type":"delete"}}</actions-block>"#;
        let reply = parse_reply(text);
        assert!(reply.actions.is_empty());
        assert!(reply.display_text.is_empty());
    }

    #[test]
    fn test_missing_actions_key_treated_as_empty() {
        let text = r#"<actions-block>{"other": []}</actions-block>"#;
        let reply = parse_reply(text);
        assert!(reply.actions.is_empty());
    }

    #[test]
    fn test_unrecognized_action_skipped_others_kept() {
        let text = r#"<actions-block>{"actions":[
            {"type":"archive","id":1},
            {"type":"complete","id":2,"completed":true}
        ]}</actions-block>"#;
        let reply = parse_reply(text);
        assert_eq!(reply.actions.len(), 1);
        assert_eq!(reply.actions[0].target_id(), Some(&TaskId::Num(2)));
    }

    #[test]
    fn test_block_spanning_multiple_lines() {
        let text = "Sure.\n<actions-block>\n{\n  \"actions\": [\n    {\"type\":\"delete\",\"id\":7}\n  ]\n}\n</actions-block>\nAnything else?";
        let reply = parse_reply(text);
        assert_eq!(reply.actions.len(), 1);
        assert!(!reply.display_text.contains("actions-block"));
        assert!(reply.display_text.contains("Sure."));
        assert!(reply.display_text.contains("Anything else?"));
    }

    #[test]
    fn test_parsed_actions_match_embedded_json() {
        let embedded = json!({
            "actions": [
                {"type": "create", "task": {"title": "A"}},
                {"type": "update", "id": 1, "fields": {"priority": "High"}},
                {"type": "complete", "id": 2, "completed": true, "completedDate": "2025-02-02"},
                {"type": "delete", "id": 3}
            ]
        });
        let text = format!("ok <actions-block>{}</actions-block>", embedded);
        let reply = parse_reply(&text);
        assert_eq!(reply.actions.len(), 4);
        let round_tripped = serde_json::to_value(&reply.actions).unwrap();
        // Complete's optional fields serialize back; compare the parts the
        // assistant sent.
        assert_eq!(round_tripped[0]["task"]["title"], "A");
        assert_eq!(round_tripped[1]["fields"]["priority"], "High");
        assert_eq!(round_tripped[3]["id"], 3);
        assert!(!reply.display_text.contains('<'));
    }

    #[test]
    fn test_unclosed_block_left_as_is() {
        let text = r#"Hmm <actions-block>{"actions":[]}"#;
        let reply = parse_reply(text);
        assert_eq!(reply.display_text, text);
        assert!(reply.actions.is_empty());
    }
}
