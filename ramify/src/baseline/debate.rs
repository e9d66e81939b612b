//! Multi-agent blackboard debate.
//!
//! `agents` agents each keep their own conversation memory. In every round the agents
//! speak in turn; rounds count from 0, and from round 1 on each agent is first shown the
//! shared blackboard. Every reply goes to the speaker's memory and to the blackboard.
//! There is no search or scoring: a fixed number of rounds, then the blackboard is the
//! result.

use std::sync::Arc;

use serde::Serialize;

use super::answer::extract_final_number;
use crate::backend::GenerationBackend;
use crate::message::Message;
use crate::prompts::{render, Prompts};

/// Tag an agent opens its contribution with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionTag {
    Finish,
    Explore,
    Critique,
    Question,
}

impl ContributionTag {
    const ALL: [ContributionTag; 4] = [
        ContributionTag::Finish,
        ContributionTag::Explore,
        ContributionTag::Critique,
        ContributionTag::Question,
    ];

    pub fn marker(self) -> &'static str {
        match self {
            Self::Finish => "[FINISH]",
            Self::Explore => "[EXPLORE]",
            Self::Critique => "[CRITIQUE]",
            Self::Question => "[QUESTION]",
        }
    }

    /// Earliest tag marker in `text` (case-insensitive).
    pub fn detect(text: &str) -> Option<Self> {
        let upper = text.to_uppercase();
        Self::ALL
            .into_iter()
            .filter_map(|t| upper.find(t.marker()).map(|pos| (pos, t)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, t)| t)
    }
}

/// One blackboard entry.
#[derive(Clone, Debug, Serialize)]
pub struct Contribution {
    pub agent: usize,
    /// Round index, starting at 0.
    pub round: usize,
    pub content: String,
    pub tag: Option<ContributionTag>,
}

/// Shared, append-only record of contributions.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Blackboard {
    entries: Vec<Contribution>,
}

impl Blackboard {
    pub fn entries(&self) -> &[Contribution] {
        &self.entries
    }

    pub fn push(&mut self, agent: usize, round: usize, content: impl Into<String>) {
        let content = content.into();
        let tag = ContributionTag::detect(&content);
        self.entries.push(Contribution {
            agent,
            round,
            content,
            tag,
        });
    }

    /// Text shown to agents: `Empty`, or each entry as `Agent i (Round r): ...`.
    pub fn summary(&self) -> String {
        if self.entries.is_empty() {
            return "Empty".to_string();
        }
        self.entries
            .iter()
            .map(|e| format!("Agent {} (Round {}): {}", e.agent, e.round, e.content.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebateConfig {
    pub rounds: usize,
    pub agents: usize,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            agents: 2,
        }
    }
}

/// Blackboard, per-agent memories and accounting of a finished debate.
#[derive(Clone, Debug, Serialize)]
pub struct DebateOutcome {
    pub blackboard: Blackboard,
    pub memories: Vec<Vec<Message>>,
    pub tokens: u64,
    pub failed_calls: usize,
}

const RULE: &str = "--------------------------------------------------------------------------------";

impl DebateOutcome {
    /// Number from the last `[FINISH]` contribution, else from the last contribution.
    pub fn final_answer(&self) -> Option<i64> {
        let entries = self.blackboard.entries();
        entries
            .iter()
            .rev()
            .find(|e| e.tag == Some(ContributionTag::Finish))
            .or_else(|| entries.last())
            .and_then(|e| extract_final_number(&e.content))
    }

    /// Plain-text report: the final blackboard, then every agent's memory.
    pub fn report(&self) -> String {
        let mut out = String::from("=== FINAL BLACKBOARD ===\n\n");
        for e in self.blackboard.entries() {
            out.push_str(&format!("Agent {} (Round {}):\n{}\n{}\n", e.agent, e.round, e.content, RULE));
        }
        out.push_str("=== AGENT MEMORIES ===\n\n");
        for (i, memory) in self.memories.iter().enumerate() {
            out.push_str(&format!("AGENT {} - Total messages: {}\n", i, memory.len()));
            for (j, m) in memory.iter().enumerate() {
                out.push_str(&format!("[Message {}] Role: {}\n{}\n{}\n", j, m.role(), m.text(), RULE));
            }
        }
        out
    }
}

/// Runs blackboard debates against one backend.
pub struct BlackboardDebate {
    backend: Arc<dyn GenerationBackend>,
    prompts: Prompts,
    config: DebateConfig,
}

impl BlackboardDebate {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            prompts: Prompts::default(),
            config: DebateConfig::default(),
        }
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_config(mut self, config: DebateConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs all rounds. A failed call is logged and that agent skips the round.
    pub async fn run(&self, problem: &str) -> DebateOutcome {
        let instruction = self.prompts.debate_system_prompt();
        let opening = render(self.prompts.debate_opening(), &[("input", problem)]);
        let mut memories: Vec<Vec<Message>> = (0..self.config.agents)
            .map(|_| vec![Message::user(opening.clone())])
            .collect();
        let mut blackboard = Blackboard::default();
        let mut tokens = 0;
        let mut failed_calls = 0;

        for round in 0..self.config.rounds {
            for (agent, memory) in memories.iter_mut().enumerate() {
                let before = memory.len();
                if round > 0 {
                    let update = render(
                        self.prompts.debate_update(),
                        &[("blackboard", &blackboard.summary())],
                    );
                    memory.push(Message::user(update));
                }
                match self.backend.converse(memory, instruction).await {
                    Ok(generation) => {
                        tokens += generation.tokens;
                        memory.push(Message::model(generation.text.clone()));
                        blackboard.push(agent, round, generation.text);
                    }
                    Err(e) => {
                        failed_calls += 1;
                        memory.truncate(before);
                        tracing::warn!(agent, round, error = %e, "debate call failed; agent skips round");
                    }
                }
            }
            tracing::debug!(round, entries = blackboard.entries().len(), "debate round done");
        }

        DebateOutcome {
            blackboard,
            memories,
            tokens,
            failed_calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::error::BackendError;

    #[test]
    fn detect_returns_earliest_tag() {
        assert_eq!(
            ContributionTag::detect("[critique] no. [FINISH] 20"),
            Some(ContributionTag::Critique)
        );
        assert_eq!(ContributionTag::detect("plain"), None);
    }

    #[test]
    fn empty_blackboard_summary() {
        assert_eq!(Blackboard::default().summary(), "Empty");
    }

    #[tokio::test]
    async fn agents_speak_each_round_and_see_blackboard_later() {
        let backend = Arc::new(MockBackend::with_reply("[EXPLORE] 10 + 10 = 20"));
        let debate = BlackboardDebate::new(backend.clone()).with_config(DebateConfig {
            rounds: 2,
            agents: 2,
        });
        let out = debate.run("Solve 10 + 10").await;
        assert_eq!(out.blackboard.entries().len(), 4);
        assert_eq!(backend.calls(), 4);
        assert_eq!(out.tokens, 40);
        // opening, reply, update, reply
        assert_eq!(out.memories[0].len(), 4);
        assert!(out.memories[0][2].text().contains("Agent 0 (Round 0)"));
        let second_round_prompt = &backend.prompts()[2];
        assert!(second_round_prompt.contains("Agent 1 (Round 0)"));
        assert_eq!(out.blackboard.entries()[3].round, 1);
        assert_eq!(out.final_answer(), Some(20));
    }

    #[tokio::test]
    async fn failed_call_skips_agent_for_that_round() {
        let backend = Arc::new(MockBackend::new(|prompt, _| {
            if prompt.contains("discussed so far") {
                Err(BackendError::other("flaky"))
            } else {
                Ok("[FINISH] 20".to_string())
            }
        }));
        let out = BlackboardDebate::new(backend)
            .with_config(DebateConfig {
                rounds: 2,
                agents: 2,
            })
            .run("Solve 10 + 10")
            .await;
        assert_eq!(out.blackboard.entries().len(), 2);
        assert_eq!(out.failed_calls, 2);
        assert_eq!(out.memories[1].len(), 2);
    }

    #[test]
    fn report_lists_blackboard_then_memories() {
        let mut blackboard = Blackboard::default();
        blackboard.push(0, 0, "[FINISH] 20");
        let out = DebateOutcome {
            blackboard,
            memories: vec![vec![Message::user("q"), Message::model("[FINISH] 20")]],
            tokens: 0,
            failed_calls: 0,
        };
        let report = out.report();
        assert!(report.starts_with("=== FINAL BLACKBOARD ==="));
        assert!(report.contains("Agent 0 (Round 0):\n[FINISH] 20"));
        assert!(report.contains("AGENT 0 - Total messages: 2"));
        assert!(report.contains("[Message 1] Role: model"));
    }
}
