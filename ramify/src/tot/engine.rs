//! Tree-of-thoughts search: propose → evaluate → select, one round per depth level.
//!
//! Each round, every frontier node asks the backend for `k` next steps (all calls in
//! flight at once), every proposal is scored by a second call (again all at once), and
//! the `b` best proposals across the whole round become the next frontier. Backend
//! failures only degrade the round: a failed propose call contributes no proposals and a
//! failed value call scores in the lowest bucket.
//!
//! The tree is mutated only after a batch of calls has resolved, so dropping the
//! [`TreeSearch::solve`] future mid-round never leaves a node without a score.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::Instrument;

use super::progress::{NoProgress, ProgressSink, RankedStep};
use super::scoring::{select_top, split_proposals, ScorePolicy};
use super::tree::{NodeId, SearchTree};
use crate::backend::{Generation, GenerationBackend};
use crate::error::BackendError;
use crate::prompts::Prompts;
use crate::task::Task;

/// Answer when the problem fails [`Task::validate_input`].
pub const INVALID_INPUT: &str = "invalid input";

/// Answer when the search ends with an empty frontier.
pub const NO_SOLUTION: &str = "no solution found";

/// Search shape: `k` proposals per frontier node, `b` nodes kept per round, `d` rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct SearchParams {
    pub k: usize,
    pub b: usize,
    pub d: usize,
}

impl SearchParams {
    pub fn new(k: usize, b: usize, d: usize) -> Self {
        Self { k, b, d }
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self { k: 3, b: 5, d: 3 }
    }
}

/// How a search ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// All `d` rounds ran.
    Solved,
    /// Stopped before depth `d` (a round produced no proposals, or nothing to search).
    Exhausted,
    /// The problem failed validation; no backend call was made.
    Invalid,
}

/// Result of one search.
#[derive(Clone, Debug, Serialize)]
pub struct SearchOutcome {
    pub termination: Termination,
    /// History of the best frontier node, one step per line, or a sentinel.
    pub answer: String,
    /// Steps of the best path, root first. Empty for sentinel answers.
    pub steps: Vec<String>,
    /// Final frontier, best first.
    pub frontier: Vec<RankedStep>,
    pub rounds_completed: usize,
    /// Tokens reported across every propose and value call.
    pub tokens: u64,
    pub backend_calls: usize,
    pub failed_calls: usize,
}

impl SearchOutcome {
    fn invalid() -> Self {
        Self {
            termination: Termination::Invalid,
            answer: INVALID_INPUT.to_string(),
            steps: Vec::new(),
            frontier: Vec::new(),
            rounds_completed: 0,
            tokens: 0,
            backend_calls: 0,
            failed_calls: 0,
        }
    }

    /// True when the answer is a path rather than a sentinel.
    pub fn has_path(&self) -> bool {
        !self.steps.is_empty()
    }
}

impl std::fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.answer)
    }
}

/// A scored proposal not yet attached to the tree.
#[derive(Debug)]
struct Thought {
    parent: NodeId,
    content: String,
    score: f64,
}

/// Round-scoped call accounting, updated only by the orchestrating task.
#[derive(Debug, Default)]
struct Usage {
    tokens: u64,
    calls: usize,
    failed: usize,
}

impl Usage {
    fn record(&mut self, result: &Result<Generation, BackendError>) {
        self.calls += 1;
        match result {
            Ok(g) => self.tokens += g.tokens,
            Err(_) => self.failed += 1,
        }
    }
}

/// Tree-of-thoughts search engine over a [`GenerationBackend`] and a [`Task`].
pub struct TreeSearch {
    backend: Arc<dyn GenerationBackend>,
    task: Arc<dyn Task>,
    policy: ScorePolicy,
    instruction: String,
}

impl TreeSearch {
    /// Engine with the default score policy and the default system instruction.
    pub fn new(backend: Arc<dyn GenerationBackend>, task: Arc<dyn Task>) -> Self {
        Self {
            backend,
            task,
            policy: ScorePolicy::default(),
            instruction: Prompts::default().tot_system_prompt().to_string(),
        }
    }

    pub fn with_score_policy(mut self, policy: ScorePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Instruction text sent with every call.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn score_policy(&self) -> &ScorePolicy {
        &self.policy
    }

    /// Runs a search and returns its outcome; `outcome.answer` is the history or a sentinel.
    pub async fn solve(&self, problem: &str, params: SearchParams) -> SearchOutcome {
        self.solve_with_progress(problem, params, &mut NoProgress)
            .await
    }

    /// Like [`solve`](Self::solve), reporting each round's new frontier to `progress`.
    pub async fn solve_with_progress(
        &self,
        problem: &str,
        params: SearchParams,
        progress: &mut dyn ProgressSink,
    ) -> SearchOutcome {
        self.solve_with_tree(problem, params, progress).await.0
    }

    /// Like [`solve_with_progress`](Self::solve_with_progress), also returning the explored tree.
    pub async fn solve_with_tree(
        &self,
        problem: &str,
        params: SearchParams,
        progress: &mut dyn ProgressSink,
    ) -> (SearchOutcome, SearchTree) {
        let span = tracing::info_span!(
            "tot_search",
            task = self.task.name(),
            problem = %problem,
            k = params.k,
            b = params.b,
            d = params.d
        );
        self.run(problem, params, progress).instrument(span).await
    }

    /// Blocking form of [`solve`](Self::solve). Must not be called from inside an async runtime.
    pub fn solve_blocking(
        &self,
        problem: &str,
        params: SearchParams,
    ) -> std::io::Result<SearchOutcome> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(rt.block_on(self.solve(problem, params)))
    }

    async fn run(
        &self,
        problem: &str,
        params: SearchParams,
        progress: &mut dyn ProgressSink,
    ) -> (SearchOutcome, SearchTree) {
        let mut tree = SearchTree::new();
        if !self.task.validate_input(problem) {
            tracing::info!("input rejected by task validation");
            return (SearchOutcome::invalid(), tree);
        }

        let mut usage = Usage::default();
        let mut frontier: Vec<NodeId> = Vec::new();
        let mut rounds_completed = 0;
        let mut termination = Termination::Solved;

        if params.k == 0 || params.b == 0 || params.d == 0 {
            tracing::debug!("nothing to search");
            termination = Termination::Exhausted;
        } else {
            let framing = self.task.prompt(problem);
            for round in 1..=params.d {
                let parents = if round == 1 {
                    vec![tree.root()]
                } else {
                    frontier.clone()
                };
                let candidates = self
                    .propose(&tree, problem, &framing, &parents, params.k, &mut usage)
                    .await;
                if candidates.is_empty() {
                    tracing::info!(round, "no proposals; stopping early");
                    termination = Termination::Exhausted;
                    break;
                }
                let thoughts = self.evaluate(&framing, candidates, &mut usage).await;
                let kept = select_top(thoughts, params.b, |t| t.score);
                frontier = kept
                    .into_iter()
                    .map(|t| tree.attach(t.parent, t.content, t.score))
                    .collect();
                rounds_completed = round;
                tracing::debug!(round, kept = frontier.len(), tokens = usage.tokens, "round selected");
                progress.on_round(round, &ranked(&tree, &frontier));
            }
        }

        let (answer, steps) = match frontier.first() {
            Some(&best) => (
                tree.history(best),
                tree.path(best).into_iter().map(str::to_string).collect(),
            ),
            None => (NO_SOLUTION.to_string(), Vec::new()),
        };
        tracing::info!(
            ?termination,
            rounds = rounds_completed,
            tokens = usage.tokens,
            calls = usage.calls,
            failed = usage.failed,
            "search finished"
        );
        let outcome = SearchOutcome {
            termination,
            answer,
            steps,
            frontier: ranked(&tree, &frontier),
            rounds_completed,
            tokens: usage.tokens,
            backend_calls: usage.calls,
            failed_calls: usage.failed,
        };
        (outcome, tree)
    }

    /// State a node's children are proposed from: the raw problem for the root, else the
    /// node's remaining state (possibly empty).
    fn state_of(&self, tree: &SearchTree, id: NodeId, problem: &str) -> String {
        match tree.get(id) {
            Some(node) if node.is_root() => problem.trim().to_string(),
            Some(node) => self.task.extract_remaining_state(node.content()),
            None => String::new(),
        }
    }

    /// One propose call per parent, all concurrent. Returns `(parent, step)` in parent
    /// order, then line order.
    async fn propose(
        &self,
        tree: &SearchTree,
        problem: &str,
        framing: &str,
        parents: &[NodeId],
        k: usize,
        usage: &mut Usage,
    ) -> Vec<(NodeId, String)> {
        let mut requests = Vec::with_capacity(parents.len());
        for &parent in parents {
            let state = self.state_of(tree, parent, problem);
            if state.is_empty() {
                tracing::debug!(parent = parent.index(), "parent has no remaining state; not expanded");
                continue;
            }
            let prompt = format!("{}\n\n{}", framing, self.task.propose_prompt(&state, k));
            requests.push((parent, prompt));
        }

        let calls = requests.iter().map(|(parent, prompt)| async move {
            (*parent, self.backend.generate(prompt, &self.instruction).await)
        });
        let results = join_all(calls).await;

        let mut candidates = Vec::new();
        for (parent, result) in results {
            usage.record(&result);
            match result {
                Ok(generation) => {
                    let lines = split_proposals(&generation.text);
                    tracing::debug!(parent = parent.index(), proposals = lines.len(), "proposed");
                    candidates.extend(lines.into_iter().map(|line| (parent, line)));
                }
                Err(e) => {
                    tracing::warn!(parent = parent.index(), error = %e, "propose call failed; no proposals from this parent");
                }
            }
        }
        candidates
    }

    /// Scores every candidate. Steps without a remaining state get the low bucket without a
    /// backend call; the rest are evaluated concurrently.
    async fn evaluate(
        &self,
        framing: &str,
        candidates: Vec<(NodeId, String)>,
        usage: &mut Usage,
    ) -> Vec<Thought> {
        let calls = candidates.iter().map(|(_, content)| {
            let state = self.task.extract_remaining_state(content);
            async move {
                if state.is_empty() {
                    return None;
                }
                let prompt = format!("{}\n\n{}", framing, self.task.value_prompt(&state));
                Some(self.backend.generate(&prompt, &self.instruction).await)
            }
        });
        let results = join_all(calls).await;

        candidates
            .into_iter()
            .zip(results)
            .map(|((parent, content), result)| {
                let score = match result {
                    None => {
                        tracing::debug!(step = %content, "no remaining state; lowest score");
                        self.policy.low
                    }
                    Some(result) => {
                        usage.record(&result);
                        match result {
                            Ok(generation) => self.policy.score(&generation.text),
                            Err(e) => {
                                tracing::warn!(step = %content, error = %e, "value call failed; lowest score");
                                self.policy.low
                            }
                        }
                    }
                };
                Thought {
                    parent,
                    content,
                    score,
                }
            })
            .collect()
    }
}

fn ranked(tree: &SearchTree, frontier: &[NodeId]) -> Vec<RankedStep> {
    frontier
        .iter()
        .map(|&id| RankedStep {
            content: tree[id].content().to_string(),
            score: tree[id].score(),
        })
        .collect()
}
