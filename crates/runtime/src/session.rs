//! Session management.

use crate::agent::{Agent, TurnOutcome};
use crate::backend::SessionBackend;
use crate::transcript::{Transcript, Turn};
use crate::Result;

/// A conversation session: the agent plus the transcript it accumulates.
///
/// Lives from process start to the exit sentinel; nothing is persisted.
pub struct Session<B> {
    agent: Agent<B>,
    transcript: Transcript,
}

impl<B: SessionBackend> Session<B> {
    /// Create a session with an empty transcript.
    pub fn new(agent: Agent<B>) -> Self {
        Self {
            agent,
            transcript: Transcript::new(),
        }
    }

    /// Seed the transcript with a system turn.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.transcript.push(Turn::system(system));
        self
    }

    pub fn agent(&self) -> &Agent<B> {
        &self.agent
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Run one turn for `input`.
    ///
    /// On success the human input and one assistant turn carrying the tool
    /// trace are appended, degraded turns included. A model failure before
    /// any tool call leaves the transcript unchanged.
    pub async fn chat(&mut self, input: &str) -> Result<TurnOutcome> {
        let outcome = self.agent.run(&self.transcript, input).await?;

        self.transcript.push(Turn::human(input));
        self.transcript
            .push(Turn::assistant(outcome.answer.clone(), outcome.steps.clone()));

        Ok(outcome)
    }
}
