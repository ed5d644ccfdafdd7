//! Conversation transcript.

use serde::Serialize;
use tools::{Observation, ToolCall};

/// One tool invocation together with its observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub call: ToolCall,
    pub observation: Observation,
}

/// One unit of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Turn {
    /// Standing instructions.
    System { text: String },
    /// A line typed by the user.
    Human { text: String },
    /// The final answer plus every tool call made while producing it, in
    /// the order they were issued.
    Assistant { text: String, steps: Vec<Step> },
}

impl Turn {
    pub fn system(text: impl Into<String>) -> Self {
        Self::System { text: text.into() }
    }

    pub fn human(text: impl Into<String>) -> Self {
        Self::Human { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>, steps: Vec<Step>) -> Self {
        Self::Assistant {
            text: text.into(),
            steps,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::System { text } | Self::Human { text } | Self::Assistant { text, .. } => text,
        }
    }
}

/// Append-only sequence of turns for one session.
///
/// Turns can be added but never edited or removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript seeded with a system turn.
    pub fn with_system(text: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(text)],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
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

    /// Number of assistant turns recorded so far.
    pub fn assistant_turns(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| matches!(t, Turn::Assistant { .. }))
            .count()
    }
}
