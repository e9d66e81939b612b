//! Chain-of-thought and blackboard debate against scripted backends, plus prompt overrides.


use std::sync::Arc;

use ramify::{
    chain_of_thought, prompts, BlackboardDebate, ContributionTag, DebateConfig, MockBackend,
    Prompts,
};

#[tokio::test]
async fn cot_uses_prompt_loaded_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("baseline.yaml"),
        "cot_prompt: \"Q: {input}\\nThink.\"\n",
    )
    .unwrap();
    let loaded = prompts::load(Some(dir.path())).unwrap();
    let backend = MockBackend::with_reply("20");
    let out = chain_of_thought(&backend, &loaded, "10 + 10").await.unwrap();
    assert_eq!(out.text, "20");
    assert_eq!(backend.prompts()[0], "Q: 10 + 10\nThink.");
}

#[tokio::test]
async fn debate_agents_alternate_and_finish() {
    let backend = Arc::new(MockBackend::new(|prompt, _| {
        if prompt.contains("discussed so far") {
            Ok("[FINISH] The answer is 72.".to_string())
        } else {
            Ok("[EXPLORE] 48 in April, 24 in May.".to_string())
        }
    }));
    let out = BlackboardDebate::new(backend.clone())
        .with_prompts(Prompts::default())
        .with_config(DebateConfig {
            rounds: 2,
            agents: 3,
        })
        .run("How many clips in April and May?")
        .await;

    let entries = out.blackboard.entries();
    assert_eq!(entries.len(), 6);
    assert_eq!(
        entries.iter().map(|e| (e.agent, e.round)).collect::<Vec<_>>(),
        vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
    );
    assert_eq!(entries[0].tag, Some(ContributionTag::Explore));
    assert_eq!(entries[5].tag, Some(ContributionTag::Finish));
    assert_eq!(out.final_answer(), Some(72));
    assert_eq!(out.memories.len(), 3);
    assert!(out.report().contains("=== AGENT MEMORIES ==="));
    assert_eq!(backend.calls(), 6);
}

#[tokio::test]
async fn zero_rounds_makes_no_calls() {
    let backend = Arc::new(MockBackend::with_reply("x"));
    let out = BlackboardDebate::new(backend.clone())
        .with_config(DebateConfig {
            rounds: 0,
            agents: 2,
        })
        .run("q")
        .await;
    assert!(out.blackboard.entries().is_empty());
    assert_eq!(out.blackboard.summary(), "Empty");
    assert_eq!(out.final_answer(), None);
    assert_eq!(backend.calls(), 0);
}
