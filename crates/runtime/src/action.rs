//! Parsing the model's action selection.
//!
//! The model answers with one JSON blob:
//!
//! ```text
//! {"action": "read_file", "action_input": {"path": "app/page.tsx"}}
//! {"action": "Final Answer", "action_input": "All done."}
//! ```
//!
//! The blob may sit inside a fenced code block or be surrounded by free text.

use serde_json::Value;
use thiserror::Error;
use tools::ToolCall;

/// Action name that ends the turn.
pub const FINAL_ANSWER: &str = "Final Answer";

/// What the model asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Tool(ToolCall),
    Final(String),
}

/// Model output that is neither a tool call nor a final answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not parse model output: {reason}")]
pub struct ParseError {
    pub raw: String,
    pub reason: String,
}

impl ParseError {
    fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parse one model completion into an [`Action`].
pub fn parse_action(text: &str) -> Result<Action, ParseError> {
    let mut last_reason = None;

    for candidate in candidates(text) {
        match serde_json::from_str::<Value>(candidate.trim()) {
            Ok(value) => match action_from_value(value) {
                Ok(action) => return Ok(action),
                Err(reason) => last_reason = Some(reason),
            },
            Err(e) => last_reason = Some(format!("invalid JSON: {e}")),
        }
    }

    if let Some((_, answer)) = text.split_once("Final Answer:") {
        return Ok(Action::Final(answer.trim().to_string()));
    }

    Err(ParseError::new(
        text,
        last_reason.unwrap_or_else(|| "no JSON action blob found".to_string()),
    ))
}

fn action_from_value(value: Value) -> Result<Action, String> {
    let Value::Object(mut map) = value else {
        return Err("action blob must be a JSON object".into());
    };
    let action = match map.remove("action") {
        Some(Value::String(action)) => action,
        Some(_) => return Err("`action` must be a string".into()),
        None => return Err("missing `action` key".into()),
    };
    let input = map.remove("action_input").unwrap_or(Value::Null);

    if action == FINAL_ANSWER {
        let answer = match input {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        return Ok(Action::Final(answer));
    }

    if action.trim().is_empty() {
        return Err("`action` is empty".into());
    }
    Ok(Action::Tool(ToolCall::new(action, input)))
}

/// Fenced block bodies first, then the outermost `{ ... }` span.
fn candidates(text: &str) -> Vec<&str> {
    let mut found = fenced_blocks(text);
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            found.push(&text[start..=end]);
        }
    }
    found
}

fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        // Skip a language tag such as `json`, unless the blob starts on the fence line.
        let body_start = match after.find('\n') {
            Some(nl) if !after[..nl].trim_start().starts_with('{') => nl + 1,
            _ => 0,
        };
        let body = &after[body_start..];
        let Some(close) = body.find("```") else {
            break;
        };
        blocks.push(&body[..close]);
        rest = &body[close + 3..];
    }

    blocks
}
