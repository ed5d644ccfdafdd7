//! Tool executor: the boundary between model-selected calls and side effects.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::{Observation, ToolCall, ToolError, ToolRegistry, ToolSettings, ToolSpec};

/// Runs tool calls against a fixed registry.
///
/// `invoke` never fails: unknown tools, schema mismatches, handler faults and
/// timeouts all come back as failure observations.
pub struct Executor {
    registry: ToolRegistry,
    settings: ToolSettings,
}

impl Executor {
    /// Take ownership of `registry`; its catalogue is frozen from here on.
    pub fn new(registry: ToolRegistry, settings: &ToolSettings) -> Self {
        Self {
            registry,
            settings: settings.clone(),
        }
    }

    /// The model-facing catalogue.
    pub fn catalogue(&self) -> &[ToolSpec] {
        self.registry.describe()
    }

    /// Execute a tool call.
    pub async fn invoke(&self, call: &ToolCall) -> Observation {
        let started = Instant::now();
        info!(tool = %call.tool_name, call_id = %call.id, "invoking tool");

        match self.try_invoke(call).await {
            Ok(output) => {
                debug!(
                    tool = %call.tool_name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "tool succeeded"
                );
                Observation::success_json(output)
            }
            Err(e) => {
                warn!(tool = %call.tool_name, call_id = %call.id, error = %e, "tool failed");
                Observation::failure(e.to_string())
            }
        }
    }

    async fn try_invoke(&self, call: &ToolCall) -> Result<serde_json::Value, ToolError> {
        let (spec, kind) =
            self.registry
                .lookup(&call.tool_name)
                .ok_or_else(|| ToolError::UnknownTool {
                    name: call.tool_name.clone(),
                    available: self.registry.names().join(", "),
                })?;

        let args = spec
            .coerce(call.input.clone())
            .map_err(|reason| ToolError::SchemaMismatch {
                tool: spec.name.clone(),
                reason,
            })?;
        let input = kind.parse(args)?;

        let timeout = self.settings.timeout();
        tokio::time::timeout(timeout, input.run(&self.settings))
            .await
            .map_err(|_| ToolError::Timeout(timeout.as_secs()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn executor(dir: &tempfile::TempDir) -> Executor {
        let db = dir.path().join("app.db");
        let settings = ToolSettings::with_database(db.to_str().unwrap());
        Executor::new(ToolRegistry::builtin(&settings).unwrap(), &settings)
    }

    #[tokio::test]
    async fn unknown_tool_is_a_failure_observation() {
        let dir = tempfile::tempdir().unwrap();
        let obs = executor(&dir)
            .invoke(&ToolCall::new("delete_everything", json!({})))
            .await;
        assert!(obs.is_failure());
        let text = obs.text();
        assert!(text.contains("tool not found: delete_everything"));
        assert!(text.contains("read_file"));
    }

    #[tokio::test]
    async fn schema_mismatch_is_a_failure_observation() {
        let dir = tempfile::tempdir().unwrap();
        let obs = executor(&dir)
            .invoke(&ToolCall::new("write_file", json!({ "path": "x.txt" })))
            .await;
        assert!(obs.is_failure());
        assert!(obs.text().contains("invalid input for write_file"));
    }

    #[tokio::test]
    async fn handler_fault_is_a_failure_observation() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let obs = executor(&dir)
            .invoke(&ToolCall::new(
                "read_file",
                json!({ "path": missing.to_str().unwrap() }),
            ))
            .await;
        assert!(obs.is_failure());
        assert!(obs.text().starts_with("Error reading file"));
    }

    #[tokio::test]
    async fn write_then_read_through_executor() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir);
        let path = dir.path().join("out.txt");
        let path = path.to_str().unwrap();

        let written = exec
            .invoke(&ToolCall::new("write_file", json!({ "path": path, "text": "héllo\n" })))
            .await;
        assert_eq!(written, Observation::success("Successfully written to file."));

        let read = exec.invoke(&ToolCall::new("read_file", json!(path))).await;
        assert_eq!(read, Observation::success("héllo\n"));
    }

    #[tokio::test]
    async fn sql_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir);

        let select = exec
            .invoke(&ToolCall::new("execute_sql", json!({ "statement": "SELECT 1" })))
            .await;
        assert_eq!(
            select,
            Observation::success_json(json!({ "status": "Success", "rows": [[1]] }))
        );

        let create = exec
            .invoke(&ToolCall::new(
                "execute_sql",
                json!({ "statement": "CREATE TABLE t(x int)" }),
            ))
            .await;
        assert_eq!(
            create,
            Observation::success_json(json!({ "status": "Success", "rows": null }))
        );

        let bad = exec
            .invoke(&ToolCall::new("execute_sql", json!({ "statement": "DROP TABLE nope" })))
            .await;
        assert!(bad.is_failure());
        assert!(bad.text().starts_with("Error: "));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let obs = executor(&dir)
            .invoke(&ToolCall::new("run_command", json!({ "command": "exit 1" })))
            .await;
        assert!(obs.is_failure());
        assert!(obs.text().contains("exit code 1"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ToolSettings {
            timeout_secs: 1,
            ..ToolSettings::with_database(dir.path().join("app.db").to_str().unwrap())
        };
        let exec = Executor::new(ToolRegistry::builtin(&settings).unwrap(), &settings);
        let obs = exec
            .invoke(&ToolCall::new("run_command", json!({ "command": "sleep 5" })))
            .await;
        assert_eq!(obs, Observation::failure("timed out after 1s"));
    }
}
