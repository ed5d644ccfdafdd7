//! Built-in tools.
//!
//! The tool set is closed: each [`ToolKind`] maps to one statically typed
//! input struct and one handler.

mod command;
mod fs;
pub(crate) mod sql;

use crate::{FieldType, ToolError, ToolSettings, ToolSpec};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// The closed set of tools the model may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    RunCommand,
    ReadFile,
    WriteFile,
    ExecuteSql,
}

impl ToolKind {
    /// Every built-in tool, in catalogue order.
    pub const ALL: [ToolKind; 4] = [
        ToolKind::RunCommand,
        ToolKind::ReadFile,
        ToolKind::WriteFile,
        ToolKind::ExecuteSql,
    ];

    /// Name the model uses to select this tool.
    pub fn name(self) -> &'static str {
        match self {
            Self::RunCommand => "run_command",
            Self::ReadFile => "read_file",
            Self::WriteFile => "write_file",
            Self::ExecuteSql => "execute_sql",
        }
    }

    /// Model-facing spec.
    pub fn spec(self, settings: &ToolSettings) -> ToolSpec {
        let root = settings.base_path.display();
        match self {
            Self::RunCommand => ToolSpec::new(
                self.name(),
                format!(
                    "Run a command through the {} shell and get its output.",
                    settings.operating_system
                ),
            )
            .field(
                "command",
                FieldType::String,
                format!(
                    "The command to run on the {} operating system.",
                    settings.operating_system
                ),
            ),
            Self::ReadFile => ToolSpec::new(
                self.name(),
                format!(
                    "Read a file from the file system. The project root is {root}; \
                     relative paths resolve against the current working directory."
                ),
            )
            .field(
                "path",
                FieldType::String,
                "Should be a file path that is accessible from the current environment.",
            ),
            Self::WriteFile => ToolSpec::new(
                self.name(),
                format!(
                    "Write text to a file, replacing any existing content. The project \
                     root is {root}; relative paths resolve against the current working directory."
                ),
            )
            .field(
                "path",
                FieldType::String,
                "Should be a file path that is accessible from the current environment.",
            )
            .field("text", FieldType::String, "The text to write to the file."),
            Self::ExecuteSql => ToolSpec::new(
                self.name(),
                "Execute a SQL statement on the project database and return its output.",
            )
            .field(
                "statement",
                FieldType::String,
                "The SQL statement to run on the database.",
            ),
        }
    }

    /// Deserialize validated arguments into this tool's typed input.
    pub fn parse(self, args: Map<String, Value>) -> Result<ToolInput, ToolError> {
        let args = Value::Object(args);
        Ok(match self {
            Self::RunCommand => ToolInput::RunCommand(typed(self, args)?),
            Self::ReadFile => ToolInput::ReadFile(typed(self, args)?),
            Self::WriteFile => ToolInput::WriteFile(typed(self, args)?),
            Self::ExecuteSql => ToolInput::ExecuteSql(typed(self, args)?),
        })
    }
}

fn typed<T: DeserializeOwned>(kind: ToolKind, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::SchemaMismatch {
        tool: kind.name().to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunCommandInput {
    pub command: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadFileInput {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriteFileInput {
    pub path: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecuteSqlInput {
    pub statement: String,
}

/// Typed input for one invocation.
#[derive(Debug, Clone)]
pub enum ToolInput {
    RunCommand(RunCommandInput),
    ReadFile(ReadFileInput),
    WriteFile(WriteFileInput),
    ExecuteSql(ExecuteSqlInput),
}

impl ToolInput {
    /// Run the handler to completion.
    pub async fn run(self, settings: &ToolSettings) -> Result<Value, ToolError> {
        match self {
            Self::RunCommand(input) => command::run(&input.command).await,
            Self::ReadFile(input) => fs::read(&input.path).await,
            Self::WriteFile(input) => fs::write(&input.path, &input.text).await,
            Self::ExecuteSql(input) => {
                let database_url = settings
                    .database_url
                    .clone()
                    .ok_or_else(|| ToolError::Execution("database_url is not configured".into()))?;
                let statement = input.statement;
                tokio::task::spawn_blocking(move || sql::execute(&database_url, &statement))
                    .await
                    .map_err(|e| ToolError::Execution(e.to_string()))?
            }
        }
    }
}
