//! Tool calls and their observations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (used to correlate observations in logs).
    pub id: String,
    /// Name of the tool to invoke.
    pub tool_name: String,
    /// Arguments as JSON.
    pub input: Value,
}

impl ToolCall {
    /// Create a call with a fresh id.
    pub fn new(tool_name: impl Into<String>, input: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tool_name: tool_name.into(),
            input,
        }
    }
}

/// Outcome of one tool invocation, fed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Observation {
    /// Tool executed successfully.
    Success { output: Value },
    /// Tool execution failed.
    Failure { message: String },
}

impl Observation {
    /// Create a successful observation with text output.
    pub fn success(output: impl Into<String>) -> Self {
        Self::Success {
            output: Value::String(output.into()),
        }
    }

    /// Create a successful observation with structured output.
    pub fn success_json(output: Value) -> Self {
        Self::Success { output }
    }

    /// Create a failure observation.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Whether this is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Text form handed to the model and printed in the trace.
    pub fn text(&self) -> String {
        match self {
            Self::Success {
                output: Value::String(s),
            } => s.clone(),
            Self::Success { output } => output.to_string(),
            Self::Failure { message } => message.clone(),
        }
    }
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}
