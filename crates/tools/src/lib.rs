//! Autodev tools: the fixed set of side-effecting actions the model may invoke.
//!
//! This crate owns everything between "the model asked for a tool" and "here is
//! the observation to feed back": the tool catalogue, input validation, the
//! four built-in tools, and the executor boundary that turns every fault into
//! an [`Observation`].
//!
//! # Overview
//!
//! - **ToolRegistry**: name → [`ToolKind`] dispatch table plus the
//!   model-facing [`ToolSpec`] catalogue. Duplicate names are rejected when
//!   the registry is built.
//! - **Executor**: validates a [`ToolCall`] against its spec, runs the typed
//!   handler under a timeout, and always returns an [`Observation`].
//! - **Built-in tools**: `run_command`, `read_file`, `write_file`,
//!   `execute_sql`.
//!
//! # Example
//!
//! ```no_run
//! use tools::{Executor, ToolCall, ToolRegistry, ToolSettings};
//! use serde_json::json;
//!
//! # async fn example() -> tools::Result<()> {
//! let settings = ToolSettings::with_database("autodev.db");
//! let registry = ToolRegistry::builtin(&settings)?;
//! let executor = Executor::new(registry, &settings);
//!
//! let call = ToolCall::new("read_file", json!({ "path": "Cargo.toml" }));
//! let observation = executor.invoke(&call).await;
//! println!("{observation}");
//! # Ok(())
//! # }
//! ```

mod builtin;
mod call;
mod error;
mod executor;
mod registry;
mod settings;
mod spec;

pub use builtin::{ToolInput, ToolKind};
pub use call::{Observation, ToolCall};
pub use error::{Error, Result, ToolError};
pub use executor::Executor;
pub use registry::ToolRegistry;
pub use settings::ToolSettings;
pub use spec::{FieldSpec, FieldType, ToolSpec};
