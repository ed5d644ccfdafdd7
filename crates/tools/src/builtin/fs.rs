//! `read_file` / `write_file`.

use crate::ToolError;
use serde_json::Value;

const WRITE_OK: &str = "Successfully written to file.";

pub(crate) async fn read(path: &str) -> Result<Value, ToolError> {
    tracing::debug!(path, "reading file");
    tokio::fs::read_to_string(path)
        .await
        .map(Value::String)
        .map_err(|e| ToolError::Io(format!("Error reading file {path}: {e}")))
}

/// Overwrite `path` with `text`. No backup is kept.
pub(crate) async fn write(path: &str, text: &str) -> Result<Value, ToolError> {
    tracing::debug!(path, bytes = text.len(), "writing file");
    tokio::fs::write(path, text)
        .await
        .map_err(|e| ToolError::Io(format!("Error writing file {path}: {e}")))?;
    Ok(Value::String(WRITE_OK.to_string()))
}
