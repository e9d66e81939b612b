//! Per-round progress reporting.

use serde::Serialize;

/// A frontier entry as reported after each round.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedStep {
    pub content: String,
    pub score: f64,
}

/// Receives the new frontier (best first) after every completed round.
pub trait ProgressSink {
    fn on_round(&mut self, round: usize, frontier: &[RankedStep]);
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, &[RankedStep]),
{
    fn on_round(&mut self, round: usize, frontier: &[RankedStep]) {
        self(round, frontier)
    }
}

/// Discards progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_round(&mut self, _round: usize, _frontier: &[RankedStep]) {}
}

/// Logs each round's ranking at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_round(&mut self, round: usize, frontier: &[RankedStep]) {
        tracing::info!(round, kept = frontier.len(), "round complete");
        for (rank, step) in frontier.iter().enumerate() {
            tracing::info!(round, rank, score = step.score, step = %step.content, "frontier");
        }
    }
}
