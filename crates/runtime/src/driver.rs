//! Console driver loop.
//!
//! ```text
//! AwaitingInput --line--> Processing --outcome--> AwaitingInput
//!       |
//!       +--"Exit" / end of input--> Terminated
//! ```

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::Result;
use crate::agent::TurnOutcome;
use crate::backend::SessionBackend;
use crate::session::Session;

/// Line that ends the session. Compared case-sensitively.
pub const EXIT_SENTINEL: &str = "Exit";

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    AwaitingInput,
    Processing,
    Terminated,
}

/// Reads one line per turn, runs it through the session and renders the
/// answer with its tool trace.
pub struct Driver<B> {
    session: Session<B>,
    state: DriverState,
}

impl<B: SessionBackend> Driver<B> {
    pub fn new(session: Session<B>) -> Self {
        Self {
            session,
            state: DriverState::AwaitingInput,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    /// Loop until the exit sentinel or end of input.
    pub async fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<()> {
        while self.state != DriverState::Terminated {
            write!(output, "Human: ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                info!("end of input");
                self.state = DriverState::Terminated;
                break;
            }

            self.handle_line(line.trim_end_matches(['\r', '\n']), &mut output)
                .await?;
        }
        Ok(())
    }

    /// Process one input line.
    pub async fn handle_line<W: Write>(&mut self, line: &str, output: &mut W) -> Result<()> {
        if self.state == DriverState::Terminated {
            return Ok(());
        }
        if line == EXIT_SENTINEL {
            info!("exit sentinel received");
            self.state = DriverState::Terminated;
            return Ok(());
        }
        if line.trim().is_empty() {
            return Ok(());
        }

        self.state = DriverState::Processing;
        let result = self.session.chat(line).await;
        self.state = DriverState::AwaitingInput;

        match result {
            Ok(outcome) => render_outcome(output, &outcome)?,
            Err(e) => {
                warn!(error = %e, "turn failed");
                writeln!(output, "Error: {e}\n")?;
            }
        }
        Ok(())
    }
}

/// Print the tool trace followed by the final answer.
pub fn render_outcome<W: Write>(output: &mut W, outcome: &TurnOutcome) -> std::io::Result<()> {
    writeln!(output, "AI: ")?;
    for step in &outcome.steps {
        writeln!(output, "Action: {} {}", step.call.tool_name, step.call.input)?;
        let label = if step.observation.is_failure() {
            "Observation (failed)"
        } else {
            "Observation"
        };
        writeln!(output, "{label}: {}", step.observation.text())?;
    }
    writeln!(output, "\nThis was the outcome: {}.\n", outcome.answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, AgentLimits};
    use crate::model::ModelError;
    use crate::testing::{ScriptedBackend, call, executor, final_answer};
    use crate::transcript::Turn;
    use serde_json::json;

    fn driver(dir: &tempfile::TempDir, backend: ScriptedBackend) -> Driver<ScriptedBackend> {
        let agent = Agent::new(backend, executor(dir), AgentLimits::default());
        Driver::new(Session::new(agent).with_system("rules"))
    }

    async fn run(driver: &mut Driver<ScriptedBackend>, input: &str) -> String {
        let mut out = Vec::new();
        driver.run(input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn exit_first_line_terminates_without_model_calls() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(&dir, ScriptedBackend::new([final_answer("unused")]));
        let out = run(&mut driver, "Exit\nhello\n").await;

        assert_eq!(driver.state(), DriverState::Terminated);
        assert_eq!(driver.session().agent().backend().calls(), 0);
        assert_eq!(driver.session().transcript().len(), 1);
        assert_eq!(out, "Human: ");
    }

    #[tokio::test]
    async fn sentinel_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(&dir, ScriptedBackend::new([final_answer("bye")]));
        run(&mut driver, "exit\nExit\n").await;

        assert_eq!(driver.session().agent().backend().calls(), 1);
        assert_eq!(driver.session().transcript().turns()[1], Turn::human("exit"));
    }

    #[tokio::test]
    async fn turn_renders_trace_and_answer() {
        let dir = tempfile::tempdir().unwrap();
        let script = [
            call("execute_sql", json!({ "statement": "SELECT 1" })),
            final_answer("The database is reachable"),
        ];
        let mut driver = driver(&dir, ScriptedBackend::new(script));
        let out = run(&mut driver, "check the db\nExit\n").await;

        assert!(out.contains("AI: \nAction: execute_sql {\"statement\":\"SELECT 1\"}\n"));
        assert!(out.contains("Observation: {\"rows\":[[1]],\"status\":\"Success\"}"));
        assert!(out.contains("This was the outcome: The database is reachable."));
        assert_eq!(driver.session().transcript().assistant_turns(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_is_reported_and_session_continues() {
        let dir = tempfile::tempdir().unwrap();
        let script = [
            call("run_command", json!({ "command": "exit 1" })),
            final_answer("The command failed"),
            final_answer("Still here"),
        ];
        let mut driver = driver(&dir, ScriptedBackend::new(script));
        let out = run(&mut driver, "run it\nare you ok?\n").await;

        assert!(out.contains("Observation (failed): Command failed with exit code 1"));
        assert!(out.contains("This was the outcome: Still here."));
        assert_eq!(driver.session().transcript().assistant_turns(), 2);
        assert_eq!(driver.state(), DriverState::Terminated);
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(&dir, ScriptedBackend::new([final_answer("ok")]));
        run(&mut driver, "\n   \nExit\n").await;

        assert_eq!(driver.session().agent().backend().calls(), 0);
        assert_eq!(driver.session().transcript().len(), 1);
    }

    #[tokio::test]
    async fn model_error_mid_turn_still_renders_trace() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::from_results([
            Ok(call("execute_sql", json!({ "statement": "SELECT 1" }))),
            Err(ModelError::Api("overloaded".into())),
        ]);
        let mut driver = driver(&dir, backend);
        let out = run(&mut driver, "check the db\nExit\n").await;

        assert!(out.contains("Action: execute_sql {\"statement\":\"SELECT 1\"}"));
        assert!(out.contains("This was the outcome: model request failed: "));
        assert!(!out.contains("Error: "));
        assert_eq!(driver.session().transcript().assistant_turns(), 1);
    }

    #[tokio::test]
    async fn model_error_is_printed_and_loop_continues() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::failing(ModelError::Network("connection refused".into()));
        let mut driver = driver(&dir, backend);
        let out = run(&mut driver, "hello\nhello again\nExit\n").await;

        assert!(out.contains("Error: network: connection refused"));
        assert!(out.contains("This was the outcome: script exhausted."));
        assert_eq!(driver.session().transcript().assistant_turns(), 1);
    }
}
