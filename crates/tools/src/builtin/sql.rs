//! `execute_sql`: one statement against the project database.
//!
//! A fresh connection is opened per call and closed before returning.

use crate::ToolError;
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde_json::{Value, json};

/// Run `statement` against the SQLite database at `database_url`.
///
/// Reads (statements starting with `SELECT`, case-insensitive) return their
/// rows; everything else runs in a transaction that is committed and returns
/// `rows: null`.
pub(crate) fn execute(database_url: &str, statement: &str) -> Result<Value, ToolError> {
    let path = database_path(database_url).map_err(ToolError::Execution)?;
    let mut conn = Connection::open(path)?;

    let result = run_statement(&mut conn, statement);
    let closed = conn.close().map_err(|(_, e)| ToolError::from(e));

    let value = result?;
    closed?;
    Ok(value)
}

fn run_statement(conn: &mut Connection, statement: &str) -> Result<Value, ToolError> {
    if is_read(statement) {
        let mut stmt = conn.prepare(statement)?;
        let columns = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..columns)
                    .map(|i| row.get_ref(i).map(cell_to_json))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(rows = rows.len(), "query returned");
        Ok(json!({ "status": "Success", "rows": rows }))
    } else {
        let tx = conn.transaction()?;
        tx.execute_batch(statement)?;
        tx.commit()?;
        Ok(json!({ "status": "Success", "rows": null }))
    }
}

fn is_read(statement: &str) -> bool {
    statement.trim_start().to_uppercase().starts_with("SELECT")
}

/// File path behind a database URL.
///
/// Accepts `sqlite://path`, `sqlite:path` and bare paths. Any other
/// `scheme://` URL is rejected.
pub(crate) fn database_path(url: &str) -> Result<&str, String> {
    if let Some(path) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    {
        return Ok(path);
    }
    match url.split_once("://") {
        Some((scheme, _)) => Err(format!(
            "unsupported database scheme `{scheme}`: only SQLite databases are supported"
        )),
        None => Ok(url),
    }
}

fn cell_to_json(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => json!(i),
        ValueRef::Real(f) => json!(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => json!(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db").to_str().unwrap().to_string();
        (dir, path)
    }

    #[test]
    fn select_returns_rows() {
        let (_dir, db) = temp_db();
        let out = execute(&db, "SELECT 1").unwrap();
        assert_eq!(out, json!({ "status": "Success", "rows": [[1]] }));
    }

    #[test]
    fn lowercase_select_is_a_read() {
        let (_dir, db) = temp_db();
        let out = execute(&db, "  select 'a', 2.5, null").unwrap();
        assert_eq!(out["rows"], json!([["a", 2.5, null]]));
    }

    #[test]
    fn writes_commit_and_return_no_rows() {
        let (_dir, db) = temp_db();
        let out = execute(&db, "CREATE TABLE t(x int)").unwrap();
        assert_eq!(out, json!({ "status": "Success", "rows": null }));

        execute(&db, "INSERT INTO t VALUES (7)").unwrap();
        let out = execute(&db, "SELECT x FROM t").unwrap();
        assert_eq!(out["rows"], json!([[7]]));
    }

    #[test]
    fn failed_write_is_rolled_back() {
        let (_dir, db) = temp_db();
        execute(&db, "CREATE TABLE t(x int)").unwrap();
        let err = execute(&db, "INSERT INTO t VALUES (1); INSERT INTO nope VALUES (2)").unwrap_err();
        assert!(matches!(err, ToolError::Sql(_)));
        assert!(err.to_string().starts_with("Error: "));

        let out = execute(&db, "SELECT count(*) FROM t").unwrap();
        assert_eq!(out["rows"], json!([[0]]));
    }

    #[test]
    fn invalid_sql_is_an_error() {
        let (_dir, db) = temp_db();
        assert!(execute(&db, "SELEC oops").is_err());
        assert!(execute(&db, "SELECT * FROM missing").is_err());
    }

    #[test]
    fn url_prefixes_are_stripped() {
        assert_eq!(database_path("sqlite://data/app.db").unwrap(), "data/app.db");
        assert_eq!(database_path("sqlite:app.db").unwrap(), "app.db");
        assert_eq!(database_path("app.db").unwrap(), "app.db");
    }

    #[test]
    fn other_schemes_are_rejected() {
        let err = database_path("postgresql://user:pw@db.supabase.co:5432/postgres").unwrap_err();
        assert!(err.contains("`postgresql`"));

        let err = execute("postgres://localhost/app", "SELECT 1").unwrap_err();
        assert!(matches!(err, ToolError::Execution(_)));
    }
}
