//! Test doubles shared by the agent, session and driver tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tools::{Executor, ToolCall, ToolRegistry, ToolSettings};

use crate::action::ParseError;
use crate::backend::{ScratchEntry, Selection, SelectionRequest, SessionBackend};
use crate::model::ModelError;

/// Replays a fixed list of selections, one per call.
///
/// Runs out into a final answer of `"script exhausted"`.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<Selection, ModelError>>>,
    calls: AtomicUsize,
    scratch_seen: Mutex<Vec<Vec<ScratchEntry>>>,
}

impl ScriptedBackend {
    pub fn new(script: impl IntoIterator<Item = Selection>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().map(Ok).collect()),
            ..Self::default()
        }
    }

    pub fn from_results(script: impl IntoIterator<Item = Result<Selection, ModelError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn failing(error: ModelError) -> Self {
        Self::from_results([Err(error)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Scratch record handed to each call, in call order.
    pub fn scratch_seen(&self) -> Vec<Vec<ScratchEntry>> {
        self.scratch_seen.lock().unwrap().clone()
    }
}

impl SessionBackend for ScriptedBackend {
    async fn select_action(&self, request: SelectionRequest<'_>) -> Result<Selection, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scratch_seen
            .lock()
            .unwrap()
            .push(request.scratch.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Selection::Final("script exhausted".into())))
    }
}

pub fn call(tool: &str, input: Value) -> Selection {
    Selection::Call(ToolCall::new(tool, input))
}

pub fn final_answer(text: &str) -> Selection {
    Selection::Final(text.into())
}

pub fn garbage(raw: &str) -> Selection {
    Selection::ParseFailure(ParseError {
        raw: raw.into(),
        reason: "no JSON action blob found".into(),
    })
}

/// Executor with the built-in tools and a database inside `dir`.
pub fn executor(dir: &tempfile::TempDir) -> Executor {
    let db = dir.path().join("app.db");
    let settings = ToolSettings::with_database(db.to_str().unwrap());
    Executor::new(ToolRegistry::builtin(&settings).unwrap(), &settings)
}
