//! The tool-invocation loop for a single turn.

use tools::{Executor, ToolSpec};
use tracing::{debug, info, warn};

use crate::backend::{ScratchEntry, Selection, SelectionRequest, SessionBackend};
use crate::model::ModelError;
use crate::transcript::{Step, Transcript};

const DEFAULT_MAX_ITERATIONS: usize = 15;
const DEFAULT_MAX_PARSE_RETRIES: usize = 3;

/// Bounds on one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentLimits {
    /// Maximum model calls per turn, parse failures included.
    pub max_iterations: usize,
    /// Unparseable replies tolerated before giving up.
    pub max_parse_retries: usize,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_parse_retries: DEFAULT_MAX_PARSE_RETRIES,
        }
    }
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub answer: String,
    /// Tool calls in the order they were issued.
    pub steps: Vec<Step>,
    /// True when a limit cut the turn short.
    pub degraded: bool,
}

/// Drives a [`SessionBackend`] until it produces a final answer, routing
/// every tool call through the [`Executor`].
pub struct Agent<B> {
    backend: B,
    executor: Executor,
    catalogue: Vec<ToolSpec>,
    limits: AgentLimits,
}

impl<B: SessionBackend> Agent<B> {
    /// The tool catalogue is captured here and stays fixed for the agent's
    /// lifetime.
    pub fn new(backend: B, executor: Executor, limits: AgentLimits) -> Self {
        let catalogue = executor.catalogue().to_vec();
        Self {
            backend,
            executor,
            catalogue,
            limits,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn catalogue(&self) -> &[ToolSpec] {
        &self.catalogue
    }

    /// Run one turn for `input` against the history in `transcript`.
    ///
    /// Only model failures before any tool has run are returned as errors.
    /// Tool faults are already observations, and exhausted limits or a model
    /// failure after a tool call become a degraded answer.
    pub async fn run(&self, transcript: &Transcript, input: &str) -> Result<TurnOutcome, ModelError> {
        let mut scratch: Vec<ScratchEntry> = Vec::new();
        let mut parse_failures = 0;

        for iteration in 1..=self.limits.max_iterations {
            debug!(iteration, scratch = scratch.len(), "selecting next action");

            let selection = match self
                .backend
                .select_action(SelectionRequest {
                    transcript,
                    input,
                    catalogue: &self.catalogue,
                    scratch: &scratch,
                })
                .await
            {
                Ok(selection) => selection,
                // Steps already ran; their side effects must reach the transcript.
                Err(e) if scratch.iter().any(|s| matches!(s, ScratchEntry::Step(_))) => {
                    warn!(iteration, error = %e, "model failed mid-turn");
                    return Ok(finish(format!("model request failed: {e}"), scratch, true));
                }
                Err(e) => return Err(e),
            };

            match selection {
                Selection::Final(answer) => {
                    info!(iteration, "agent returned final answer");
                    return Ok(finish(answer, scratch, false));
                }
                Selection::Call(call) => {
                    let observation = self.executor.invoke(&call).await;
                    scratch.push(ScratchEntry::Step(Step { call, observation }));
                }
                Selection::ParseFailure(err) => {
                    parse_failures += 1;
                    warn!(parse_failures, reason = %err.reason, "unparseable model output");
                    if parse_failures > self.limits.max_parse_retries {
                        let answer = format!(
                            "I could not produce a well-formed response after {parse_failures} attempts ({}).",
                            err.reason
                        );
                        return Ok(finish(answer, scratch, true));
                    }
                    scratch.push(ScratchEntry::Rejected(err));
                }
            }
        }

        warn!(max_iterations = self.limits.max_iterations, "iteration limit reached");
        let answer = format!(
            "Agent stopped after {} iterations without a final answer.",
            self.limits.max_iterations
        );
        Ok(finish(answer, scratch, true))
    }
}

fn finish(answer: String, scratch: Vec<ScratchEntry>, degraded: bool) -> TurnOutcome {
    let steps = scratch
        .into_iter()
        .filter_map(|entry| match entry {
            ScratchEntry::Step(step) => Some(step),
            ScratchEntry::Rejected(_) => None,
        })
        .collect();
    TurnOutcome {
        answer,
        steps,
        degraded,
    }
}
