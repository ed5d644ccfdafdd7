//! Prompt construction for the structured-chat protocol.

use crate::action::FINAL_ANSWER;
use crate::backend::ScratchEntry;
use crate::model::Message;
use crate::transcript::{Step, Transcript, Turn};
use serde_json::json;
use tools::ToolSpec;

/// Built-in system prompt used when no prompt file is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are AutoDev, an assistant that helps develop \
full-stack web applications. You can read and write project files, run shell commands on \
{operating_system}, and administer the project database. The project root is {base_path}.";

/// Reminder appended to the observation after unparseable output.
pub const PARSE_RETRY_HINT: &str = "Respond with exactly one JSON blob containing \
\"action\" and \"action_input\", wrapped in a ```json code block.";

/// Stands in for a blank rejected reply; providers refuse empty messages.
const EMPTY_REPLY: &str = "(empty response)";

/// Substitute `{base_path}` and `{operating_system}` in a prompt template.
pub fn fill_template(template: &str, base_path: &str, operating_system: &str) -> String {
    template
        .replace("{base_path}", base_path)
        .replace("{operating_system}", operating_system)
}

/// One catalogue line per tool: name, description and argument schema.
pub fn render_catalogue(catalogue: &[ToolSpec]) -> String {
    catalogue
        .iter()
        .map(|spec| {
            format!(
                "{}: {}, args: {}",
                spec.name,
                spec.description,
                spec.input_schema()["properties"]
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// System text: every system turn followed by the tool protocol.
pub fn system_text(transcript: &Transcript, catalogue: &[ToolSpec]) -> String {
    let mut text = transcript
        .turns()
        .iter()
        .filter_map(|turn| match turn {
            Turn::System { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    if !text.is_empty() {
        text.push_str("\n\n");
    }

    let names = catalogue
        .iter()
        .map(|s| format!("\"{}\"", s.name))
        .collect::<Vec<_>>()
        .join(", ");

    text.push_str(&format!(
        "You have access to the following tools:\n\n{catalogue}\n\n\
         Use a JSON blob to specify a tool by providing an \"action\" key (tool name) \
         and an \"action_input\" key (tool input).\n\n\
         Valid \"action\" values: \"{FINAL_ANSWER}\" or {names}\n\n\
         Provide only ONE action per JSON blob, as shown:\n\n\
         ```json\n{{\n  \"action\": $TOOL_NAME,\n  \"action_input\": $INPUT\n}}\n```\n\n\
         After each action you will receive an Observation with its result. Repeat \
         Thought/Action/Observation as many times as needed, then reply with:\n\n\
         ```json\n{{\n  \"action\": \"{FINAL_ANSWER}\",\n  \"action_input\": \"Final response to human\"\n}}\n```\n\n\
         Reminder: ALWAYS respond with a valid JSON blob of a single action.",
        catalogue = render_catalogue(catalogue),
    ));
    text
}

/// Model messages for one selection round: the replayed history, the new
/// input, and the scratch record so far.
pub fn messages(transcript: &Transcript, input: &str, scratch: &[ScratchEntry]) -> Vec<Message> {
    let mut messages: Vec<Message> = transcript
        .turns()
        .iter()
        .filter_map(|turn| match turn {
            Turn::System { .. } => None,
            Turn::Human { text } => Some(Message::user(text.clone())),
            Turn::Assistant { text, steps } => Some(Message::assistant(render_assistant(text, steps))),
        })
        .collect();

    messages.push(Message::user(input));

    for entry in scratch {
        match entry {
            ScratchEntry::Step(step) => {
                messages.push(Message::assistant(render_action(step)));
                messages.push(Message::user(format!(
                    "Observation: {}",
                    step.observation.text()
                )));
            }
            ScratchEntry::Rejected(err) => {
                let raw = if err.raw.trim().is_empty() {
                    EMPTY_REPLY.to_string()
                } else {
                    err.raw.clone()
                };
                messages.push(Message::assistant(raw));
                messages.push(Message::user(format!(
                    "Observation: {}. {PARSE_RETRY_HINT}",
                    err.reason
                )));
            }
        }
    }

    messages
}

/// The action blob the model emitted for `step`, re-rendered.
fn render_action(step: &Step) -> String {
    let blob = json!({
        "action": step.call.tool_name,
        "action_input": step.call.input,
    });
    format!(
        "```json\n{}\n```",
        serde_json::to_string_pretty(&blob).unwrap_or_else(|_| blob.to_string())
    )
}

/// History form of an assistant turn: the tool trace, then the outcome.
pub fn render_assistant(answer: &str, steps: &[Step]) -> String {
    let mut out = String::new();
    for step in steps {
        out.push_str(&format!(
            "Action: {} {}\nObservation: {}\n",
            step.call.tool_name,
            step.call.input,
            step.observation.text()
        ));
    }
    if !steps.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("This was the outcome: {answer}"));
    out
}
