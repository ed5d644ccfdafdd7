//! `run_command`: shell command execution.

use crate::ToolError;
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;

const EMPTY_OUTPUT: &str = "Command ran successfully.";

/// Run `command` through the host shell, returning stdout on success.
pub(crate) async fn run(command: &str) -> Result<Value, ToolError> {
    let (shell, shell_arg) = if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };

    tracing::info!(command, "running shell command");

    let output = Command::new(shell)
        .arg(shell_arg)
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ToolError::Execution(format!("Error running command: {e}")))?;

    if !output.status.success() {
        return Err(ToolError::Command {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.is_empty() {
        Ok(Value::String(EMPTY_OUTPUT.to_string()))
    } else {
        Ok(Value::String(stdout.into_owned()))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_stdout() {
        let out = run("echo hello").await.unwrap();
        assert_eq!(out, Value::String("hello\n".into()));
    }

    #[tokio::test]
    async fn empty_stdout_gets_fixed_message() {
        let out = run("true").await.unwrap();
        assert_eq!(out, Value::String(EMPTY_OUTPUT.into()));
    }

    #[tokio::test]
    async fn nonzero_exit_carries_code_and_stderr() {
        let err = run("echo oops >&2; exit 3").await.unwrap_err();
        match err {
            ToolError::Command { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "oops\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
