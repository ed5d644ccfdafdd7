use thiserror::Error;

/// Registry construction errors.
///
/// These are configuration faults and surface at startup, never while a
/// session is running.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Two tools were registered under the same name.
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),

    /// Required tool configuration is missing or invalid.
    #[error("tool config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while invoking a tool.
///
/// The executor folds every variant into a failure observation, so these
/// never reach the driver loop.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ToolError {
    /// No tool is registered under the requested name.
    #[error("tool not found: {name}. Available tools: {available}")]
    UnknownTool { name: String, available: String },

    /// The call input does not fit the tool's schema.
    #[error("invalid input for {tool}: {reason}")]
    SchemaMismatch { tool: String, reason: String },

    /// A filesystem operation failed.
    #[error("{0}")]
    Io(String),

    /// A shell command exited unsuccessfully.
    #[error("Command failed with {}:\n{stderr}", exit_label(.code))]
    Command { code: Option<i32>, stderr: String },

    /// The database rejected the statement or could not be reached.
    #[error("Error: {0}")]
    Sql(String),

    /// The invocation did not finish within the configured bound.
    #[error("timed out after {0}s")]
    Timeout(u64),

    /// Any other handler fault.
    #[error("execution failed: {0}")]
    Execution(String),
}

impl From<rusqlite::Error> for ToolError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sql(e.to_string())
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
