//! End-to-end search on the Game of 24 with the offline oracle backend.


use std::sync::Arc;

use ramify::task::Task;
use ramify::{Game24Oracle, Game24Task, SearchParams, Termination, TreeSearch};

#[tokio::test]
async fn oracle_search_reaches_24() {
    let task = Arc::new(Game24Task::new());
    let search = TreeSearch::new(Arc::new(Game24Oracle), task.clone());
    let out = search.solve("4 9 10 13", SearchParams::new(3, 5, 3)).await;

    assert_eq!(out.termination, Termination::Solved);
    assert_eq!(out.steps.len(), 3);
    let last = out.steps.last().unwrap();
    assert_eq!(task.extract_remaining_state(last), "24");
    assert_eq!(out.frontier[0].score, 20.0);
    assert_eq!(out.tokens, 0);
    assert_eq!(out.failed_calls, 0);
}

#[tokio::test]
async fn unsolvable_numbers_still_return_a_path() {
    let search = TreeSearch::new(Arc::new(Game24Oracle), Arc::new(Game24Task::new()));
    let out = search.solve("1 1 1 1", SearchParams::new(2, 2, 3)).await;
    assert_eq!(out.termination, Termination::Solved);
    assert!(out.has_path());
    assert!(out.frontier.iter().all(|s| s.score < 1.0));
}

#[test]
fn blocking_solve_with_oracle() {
    let search = TreeSearch::new(Arc::new(Game24Oracle), Arc::new(Game24Task::new()));
    let out = search
        .solve_blocking("4 4 6 8", SearchParams::new(3, 5, 3))
        .unwrap();
    assert_eq!(out.termination, Termination::Solved);
    assert!(out.answer.ends_with("(left: 24)"));
}
