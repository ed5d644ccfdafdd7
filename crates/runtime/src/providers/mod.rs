//! LLM provider adapters.
//!
//! Each provider implements [`ModelBackend`](crate::model::ModelBackend) for its specific API.

mod anthropic;
mod openai;

pub use anthropic::{AnthropicAuth, AnthropicBackend, AnthropicBackendBuilder};
pub use openai::{OpenAiBackend, OpenAiBackendBuilder};
