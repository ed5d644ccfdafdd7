//! Autodev runtime: the conversational tool loop.
//!
//! This crate turns a hosted model into an agent that can act on the local
//! project through the tools crate, and wraps it in a console session.
//!
//! # Overview
//!
//! - **ModelBackend**: a trait abstracting LLM providers (Anthropic,
//!   OpenAI-compatible).
//! - **SessionBackend**: chooses the next action for a turn. The
//!   [`PromptedBackend`] implementation prompts a model with the tool
//!   catalogue and parses its JSON action blob.
//! - **Agent**: runs one turn, routing tool calls to the executor until a
//!   final answer or a limit is reached.
//! - **Session**: owns the append-only [`Transcript`].
//! - **Driver**: the console loop, ended by the `Exit` line.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{
//!     Agent, AgentLimits, AnthropicAuth, AnthropicBackend, Driver, PromptedBackend, Session,
//! };
//! use std::time::Duration;
//! use tools::{Executor, ToolRegistry, ToolSettings};
//!
//! # async fn example() -> runtime::Result<()> {
//! let settings = ToolSettings::with_database("app.db");
//! let executor = Executor::new(ToolRegistry::builtin(&settings).unwrap(), &settings);
//! let model = AnthropicBackend::builder(AnthropicAuth::ApiKey("sk-ant-api01-...".into()), "claude-sonnet-4-20250514")
//!     .build();
//! let backend = PromptedBackend::new(model, Duration::from_secs(120));
//!
//! let agent = Agent::new(backend, executor, AgentLimits::default());
//! let session = Session::new(agent).with_system("You are a careful developer.");
//! Driver::new(session).run(std::io::stdin().lock(), std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

pub mod action;
mod agent;
mod backend;
mod driver;
mod error;
pub mod model;
pub mod prompt;
mod providers;
mod session;
mod transcript;

#[cfg(test)]
mod testing;

// Agent loop
pub use agent::{Agent, AgentLimits, TurnOutcome};

// Action selection
pub use backend::{PromptedBackend, ScratchEntry, Selection, SelectionRequest, SessionBackend};

// Console loop
pub use driver::{Driver, DriverState, EXIT_SENTINEL, render_outcome};

// Error types
pub use error::{Error, Result};

// Provider-agnostic model types
pub use model::{Message, ModelBackend, ModelError, ModelRequest, ModelResponse, Role, Usage};

// Provider adapters
pub use providers::{
    AnthropicAuth, AnthropicBackend, AnthropicBackendBuilder, OpenAiBackend, OpenAiBackendBuilder,
};

// Session management
pub use session::Session;
pub use transcript::{Step, Transcript, Turn};
