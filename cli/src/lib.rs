//! Command implementations behind the `ramify` binary.
//!
//! `main.rs` parses arguments and sets up logging; everything that touches a backend or
//! formats a result lives here so it can be tested without a process.
//!
//! Commands:
//! - `tot`: tree-of-thoughts search on a 24-game problem ([`run_tot`]).
//! - `cot`: one chain-of-thought call ([`run_cot`]).
//! - `debate`: blackboard debate between agents ([`run_debate`]).
//! - `check`: evaluate an arithmetic expression against 24 ([`check_expression`]).

use std::path::Path;
use std::sync::Arc;

use ramify::task::Task;
use ramify::{
    evaluate, single_agent_solve, BackendError, BlackboardDebate, DebateConfig, DebateOutcome,
    EvalError, Game24Oracle, Game24Task, GeminiBackend, GenerationBackend, MockBackend, Prompts,
    SearchOutcome, SearchParams, SingleAgentAnswer, TracingProgress, TreeSearch,
};
use serde::Serialize;

/// Errors of one CLI run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("backend: {0}")]
    Backend(#[from] BackendError),
    #[error("invalid expression: {0}")]
    Expression(#[from] EvalError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which command a backend is built for. Only matters offline: `tot` gets the 24-game oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Search,
    Conversation,
}

/// Reply of the offline backend for chain of thought and debate.
pub const MOCK_REPLY: &str = "[FINISH] mock backend: no model was called. Answer: 0";

/// Gemini from the environment, or an offline backend when `mock` is set.
pub fn make_backend(mock: bool, mode: Mode) -> Result<Arc<dyn GenerationBackend>, RunError> {
    if !mock {
        let gemini = GeminiBackend::from_env()?;
        tracing::info!(model = gemini.model(), "using gemini backend");
        return Ok(Arc::new(gemini));
    }
    tracing::info!(?mode, "using offline backend");
    Ok(match mode {
        Mode::Search => Arc::new(Game24Oracle),
        Mode::Conversation => Arc::new(MockBackend::with_reply(MOCK_REPLY).with_tokens_per_call(0)),
    })
}

/// Prompt templates from `PROMPTS_DIR` (or `./prompts`), else the embedded ones.
pub fn load_prompts() -> Prompts {
    ramify::prompts::load_or_default(None)
}

/// Tree-of-thoughts search on the 24-game numbers in `problem`.
pub async fn run_tot(
    backend: Arc<dyn GenerationBackend>,
    prompts: &Prompts,
    problem: &str,
    params: SearchParams,
) -> SearchOutcome {
    let task = Arc::new(Game24Task::with_prompts(prompts));
    let search = TreeSearch::new(backend, task).with_instruction(prompts.tot_system_prompt());
    search
        .solve_with_progress(problem, params, &mut TracingProgress)
        .await
}

/// Search result as printed: the answer lines, then a one-line summary. JSON when `json`.
pub fn format_tot(outcome: &SearchOutcome, json: bool) -> Result<String, RunError> {
    if json {
        return Ok(serde_json::to_string_pretty(outcome)?);
    }
    let termination = serde_json::to_value(outcome.termination)?;
    Ok(format!(
        "{}\n-- {} after {} round(s); {} tokens, {} calls ({} failed)",
        outcome.answer,
        termination.as_str().unwrap_or("unknown"),
        outcome.rounds_completed,
        outcome.tokens,
        outcome.backend_calls,
        outcome.failed_calls
    ))
}

pub async fn run_cot(
    backend: &dyn GenerationBackend,
    prompts: &Prompts,
    problem: &str,
) -> Result<SingleAgentAnswer, RunError> {
    Ok(single_agent_solve(backend, prompts, problem).await?)
}

pub fn format_cot(answer: &SingleAgentAnswer) -> String {
    match answer.answer {
        Some(n) => format!("{}\n\nAnswer: {}", answer.reply.trim_end(), n),
        None => answer.reply.trim_end().to_string(),
    }
}

pub async fn run_debate(
    backend: Arc<dyn GenerationBackend>,
    prompts: Prompts,
    problem: &str,
    config: DebateConfig,
) -> DebateOutcome {
    BlackboardDebate::new(backend)
        .with_prompts(prompts)
        .with_config(config)
        .run(problem)
        .await
}

/// Debate report followed by the extracted final answer, if any.
pub fn format_debate(outcome: &DebateOutcome) -> String {
    let mut out = outcome.report();
    match outcome.final_answer() {
        Some(n) => out.push_str(&format!("\nFinal answer: {}\n", n)),
        None => out.push_str("\nFinal answer: none\n"),
    }
    out
}

/// Value of a checked expression and whether it solves the game.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckReport {
    pub expression: String,
    pub value: f64,
    pub solves: bool,
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = if self.solves { "solves 24" } else { "does not solve 24" };
        write!(f, "{} = {}: {}", self.expression, self.value, verdict)
    }
}

/// Evaluates `expression`. With `numbers`, it must also use exactly those four numbers.
pub fn check_expression(expression: &str, numbers: Option<&str>) -> Result<CheckReport, RunError> {
    let value = evaluate(expression)?;
    let task = Game24Task::new();
    let solves = match numbers {
        Some(n) => task.check_solution_with_numbers(expression, n),
        None => task.check_solution(expression),
    };
    Ok(CheckReport {
        expression: expression.trim().to_string(),
        value,
        solves,
    })
}

/// Writes `text` to `path`, or to stdout when `path` is `None`.
pub fn write_output(text: &str, path: Option<&Path>) -> Result<(), RunError> {
    match path {
        Some(p) => {
            std::fs::write(p, format!("{}\n", text.trim_end()))?;
            tracing::info!(path = %p.display(), "output written");
        }
        None => {
            println!("{}", text.trim_end());
            std::io::Write::flush(&mut std::io::stdout())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_tot_finds_a_path() {
        let backend = make_backend(true, Mode::Search).unwrap();
        let outcome = run_tot(backend, &Prompts::default(), "4 9 10 13", SearchParams::new(3, 5, 3)).await;
        let text = format_tot(&outcome, false).unwrap();
        assert!(text.contains("(left: 24)"));
        assert!(text.contains("-- solved after 3 round(s)"));
    }

    #[tokio::test]
    async fn tot_json_carries_termination() {
        let backend = make_backend(true, Mode::Search).unwrap();
        let outcome = run_tot(backend, &Prompts::default(), "1 2 3", SearchParams::default()).await;
        let json: serde_json::Value = serde_json::from_str(&format_tot(&outcome, true).unwrap()).unwrap();
        assert_eq!(json["termination"], "invalid");
        assert_eq!(json["answer"], "invalid input");
    }

    #[tokio::test]
    async fn offline_cot_and_debate() {
        let backend = make_backend(true, Mode::Conversation).unwrap();
        let cot = run_cot(backend.as_ref(), &Prompts::default(), "q").await.unwrap();
        assert_eq!(format_cot(&cot), format!("{}\n\nAnswer: 0", MOCK_REPLY));

        let debate = run_debate(backend, Prompts::default(), "q", DebateConfig::default()).await;
        assert_eq!(debate.blackboard.entries().len(), 6);
        assert!(format_debate(&debate).ends_with("Final answer: 0\n"));
    }

    #[test]
    fn check_reports_value_and_verdict() {
        let r = check_expression("(6 - 4) * (4 + 8)", Some("4 4 6 8")).unwrap();
        assert!(r.solves);
        assert_eq!(r.to_string(), "(6 - 4) * (4 + 8) = 24: solves 24");

        let r = check_expression("(6 - 4) * (4 + 8)", Some("1 2 3 4")).unwrap();
        assert!(!r.solves);
        assert!(matches!(check_expression("6 *", None), Err(RunError::Expression(_))));
    }

    #[test]
    fn write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_output("hello\n\n", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
