//! # Ramify
//!
//! Tree-of-thoughts search over a text-generation backend, plus two baselines to compare
//! it against. The model only ever sees prompts; all search state lives here.
//!
//! ## How a search runs
//!
//! - **Propose**: every frontier node asks the backend for `k` next steps, all parents
//!   concurrently.
//! - **Evaluate**: every candidate's remaining state is judged sure / likely / impossible,
//!   again concurrently, and mapped to a bucket score ([`ScorePolicy`]).
//! - **Select**: the `b` best candidates become the next frontier (stable on ties).
//!
//! After `d` rounds the best path from the root is the answer. Only the orchestrator
//! mutates the tree and the usage counters; backend calls never share mutable state.
//!
//! ## Main modules
//!
//! - [`backend`]: [`GenerationBackend`] trait, [`MockBackend`], [`GeminiBackend`].
//! - [`task`]: [`Task`] trait and the Game of 24 ([`Game24Task`], [`Game24Oracle`], [`evaluate`]).
//! - [`tot`]: [`SearchTree`], [`ScorePolicy`], [`TreeSearch`] and its [`SearchOutcome`].
//! - [`prompts`]: YAML prompt templates, embedded or loaded from `PROMPTS_DIR`.
//! - [`baseline`]: [`chain_of_thought`] and the [`BlackboardDebate`].
//! - [`message`]: [`Message`] turns for multi-turn conversations.
//! - [`error`]: [`BackendError`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ramify::{Game24Oracle, Game24Task, SearchParams, TreeSearch};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let search = TreeSearch::new(Arc::new(Game24Oracle), Arc::new(Game24Task::default()));
//! let outcome = search.solve("4 9 10 13", SearchParams::new(3, 5, 3)).await;
//! println!("{}", outcome.answer);
//! # }
//! ```

pub mod backend;
pub mod baseline;
pub mod error;
pub mod message;
pub mod prompts;
pub mod task;
pub mod tot;

pub use backend::{
    generate_blocking, GeminiBackend, Generation, GenerationBackend, MockBackend,
};
pub use baseline::{
    answers_match, chain_of_thought, extract_final_number, extract_reference_answer,
    single_agent_solve, Blackboard, BlackboardDebate, Contribution, ContributionTag,
    DebateConfig, DebateOutcome, SingleAgentAnswer,
};
pub use error::BackendError;
pub use message::Message;
pub use prompts::{LoadError as PromptLoadError, Prompts};
pub use task::{evaluate, EvalError, Game24Oracle, Game24Task, Task, GAME24_TARGET};
pub use tot::{
    NodeId, ProgressSink, RankedStep, ScorePolicy, SearchNode, SearchOutcome, SearchParams,
    SearchTree, Termination, TracingProgress, TreeSearch, INVALID_INPUT, NO_SOLUTION,
};
