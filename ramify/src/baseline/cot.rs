//! Single-shot chain-of-thought baseline.

use serde::Serialize;

use super::answer::extract_final_number;
use crate::backend::{Generation, GenerationBackend};
use crate::error::BackendError;
use crate::prompts::{render, Prompts};

/// One chain-of-thought call for `problem`, without a system instruction.
pub async fn chain_of_thought(
    backend: &dyn GenerationBackend,
    prompts: &Prompts,
    problem: &str,
) -> Result<Generation, BackendError> {
    let prompt = render(prompts.cot_prompt(), &[("input", problem)]);
    let generation = backend.generate(&prompt, "").await?;
    tracing::debug!(tokens = generation.tokens, "chain of thought done");
    Ok(generation)
}

/// Reply of the single-agent baseline with its extracted numeric answer.
#[derive(Clone, Debug, Serialize)]
pub struct SingleAgentAnswer {
    pub reply: String,
    pub answer: Option<i64>,
    pub tokens: u64,
}

/// Chain of thought followed by [`extract_final_number`].
pub async fn single_agent_solve(
    backend: &dyn GenerationBackend,
    prompts: &Prompts,
    problem: &str,
) -> Result<SingleAgentAnswer, BackendError> {
    let generation = chain_of_thought(backend, prompts, problem).await?;
    Ok(SingleAgentAnswer {
        answer: extract_final_number(&generation.text),
        reply: generation.text,
        tokens: generation.tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    #[tokio::test]
    async fn chain_of_thought_renders_problem_into_prompt() {
        let backend = MockBackend::with_reply("10 + 10 = 20");
        let out = chain_of_thought(&backend, &Prompts::default(), "Solve 10 + 10")
            .await
            .unwrap();
        assert_eq!(out.text, "10 + 10 = 20");
        let prompt = &backend.prompts()[0];
        assert!(prompt.contains("Problem: Solve 10 + 10"));
        assert!(prompt.contains("step by step"));
    }

    #[tokio::test]
    async fn single_agent_extracts_last_number() {
        let backend = MockBackend::with_reply("First 4, so the answer is 20.").with_tokens_per_call(7);
        let out = single_agent_solve(&backend, &Prompts::default(), "q")
            .await
            .unwrap();
        assert_eq!(out.answer, Some(20));
        assert_eq!(out.tokens, 7);
    }

    #[tokio::test]
    async fn failure_propagates() {
        let backend = MockBackend::failing("down");
        assert!(chain_of_thought(&backend, &Prompts::default(), "q").await.is_err());
    }
}
