//! Comparison baselines: single-shot chain of thought and a multi-agent blackboard debate.

pub mod answer;
pub mod cot;
pub mod debate;

pub use answer::{answers_match, extract_final_number, extract_reference_answer};
pub use cot::{chain_of_thought, single_agent_solve, SingleAgentAnswer};
pub use debate::{
    Blackboard, BlackboardDebate, Contribution, ContributionTag, DebateConfig, DebateOutcome,
};
