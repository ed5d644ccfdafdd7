//! Action selection: the seam between the agent loop and the model.

use std::future::Future;
use std::time::Duration;

use tools::{ToolCall, ToolSpec};
use tracing::debug;

use crate::action::{Action, ParseError, parse_action};
use crate::model::{ModelBackend, ModelError, ModelRequest};
use crate::prompt;
use crate::transcript::{Step, Transcript};

/// Work done so far within the current turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ScratchEntry {
    /// A tool call and its observation.
    Step(Step),
    /// Output that could not be parsed, kept so the model can correct itself.
    Rejected(ParseError),
}

/// Inputs to one selection round.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub transcript: &'a Transcript,
    pub input: &'a str,
    pub catalogue: &'a [ToolSpec],
    pub scratch: &'a [ScratchEntry],
}

/// What the model chose to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Call(ToolCall),
    Final(String),
    ParseFailure(ParseError),
}

impl From<Result<Action, ParseError>> for Selection {
    fn from(parsed: Result<Action, ParseError>) -> Self {
        match parsed {
            Ok(Action::Tool(call)) => Self::Call(call),
            Ok(Action::Final(answer)) => Self::Final(answer),
            Err(e) => Self::ParseFailure(e),
        }
    }
}

/// Chooses the next action for a turn.
///
/// Implementations include the hosted-model [`PromptedBackend`] and scripted
/// doubles in tests.
pub trait SessionBackend: Send + Sync {
    fn select_action(
        &self,
        request: SelectionRequest<'_>,
    ) -> impl Future<Output = Result<Selection, ModelError>> + Send;
}

/// [`SessionBackend`] that prompts a [`ModelBackend`] with the
/// structured-chat protocol and parses its reply.
pub struct PromptedBackend<M> {
    model: M,
    timeout: Duration,
}

impl<M: ModelBackend> PromptedBackend<M> {
    pub fn new(model: M, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<M: ModelBackend> SessionBackend for PromptedBackend<M> {
    async fn select_action(&self, request: SelectionRequest<'_>) -> Result<Selection, ModelError> {
        let system = prompt::system_text(request.transcript, request.catalogue);
        let messages = prompt::messages(request.transcript, request.input, request.scratch);

        let call = self.model.call(ModelRequest {
            system: Some(&system),
            messages: &messages,
        });
        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ModelError::Timeout(self.timeout.as_secs()))??;

        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "model responded"
        );

        Ok(parse_action(&response.text).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message, ModelResponse, Role, Usage};
    use serde_json::json;
    use std::sync::Mutex;

    /// Replies with canned text and remembers what it was sent.
    struct CannedModel {
        reply: String,
        delay: Duration,
        seen: Mutex<Vec<(Option<String>, Vec<Message>)>>,
    }

    impl CannedModel {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ModelBackend for CannedModel {
        async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
            self.seen.lock().unwrap().push((
                request.system.map(str::to_string),
                request.messages.to_vec(),
            ));
            tokio::time::sleep(self.delay).await;
            Ok(ModelResponse {
                text: self.reply.clone(),
                usage: Usage::default(),
            })
        }
    }

    fn request<'a>(transcript: &'a Transcript) -> SelectionRequest<'a> {
        SelectionRequest {
            transcript,
            input: "list the files",
            catalogue: &[],
            scratch: &[],
        }
    }

    #[tokio::test]
    async fn tool_reply_becomes_call() {
        let backend = PromptedBackend::new(
            CannedModel::new(r#"{"action": "run_command", "action_input": {"command": "ls"}}"#),
            Duration::from_secs(5),
        );
        let transcript = Transcript::with_system("rules");
        let selection = backend.select_action(request(&transcript)).await.unwrap();
        match selection {
            Selection::Call(call) => {
                assert_eq!(call.tool_name, "run_command");
                assert_eq!(call.input, json!({ "command": "ls" }));
            }
            other => panic!("unexpected selection: {other:?}"),
        }

        let seen = backend.model().seen.lock().unwrap();
        let (system, messages) = &seen[0];
        assert!(system.as_deref().unwrap().starts_with("rules"));
        assert_eq!(messages, &[Message::user("list the files")]);
        assert_eq!(messages[0].role, Role::User);
    }

    #[tokio::test]
    async fn garbage_reply_is_parse_failure() {
        let backend = PromptedBackend::new(CannedModel::new("no idea"), Duration::from_secs(5));
        let transcript = Transcript::new();
        let selection = backend.select_action(request(&transcript)).await.unwrap();
        assert!(matches!(selection, Selection::ParseFailure(e) if e.raw == "no idea"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_model_times_out() {
        let mut model = CannedModel::new("{}");
        model.delay = Duration::from_secs(30);
        let backend = PromptedBackend::new(model, Duration::from_secs(2));
        let transcript = Transcript::new();
        let err = backend.select_action(request(&transcript)).await.unwrap_err();
        assert!(matches!(err, ModelError::Timeout(2)));
    }
}
