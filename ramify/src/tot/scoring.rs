//! Proposal parsing, bucket scoring and top-b selection.

use serde::{Deserialize, Serialize};

/// Discrete scores assigned to value responses by keyword.
///
/// A response containing `sure` (any case) scores `sure`; otherwise one containing
/// `likely` scores `likely`; anything else, including failed calls and steps without
/// a remaining state, scores `low`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScorePolicy {
    pub sure: f64,
    pub likely: f64,
    pub low: f64,
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            sure: 20.0,
            likely: 1.0,
            low: 0.001,
        }
    }
}

impl ScorePolicy {
    /// Bucket score of a value response. `sure` takes precedence over `likely`.
    pub fn score(&self, response: &str) -> f64 {
        let lower = response.to_lowercase();
        if lower.contains("sure") {
            self.sure
        } else if lower.contains("likely") {
            self.likely
        } else {
            self.low
        }
    }
}

/// One candidate step per non-blank line of a propose response.
pub fn split_proposals(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keeps the `b` highest-scoring items, best first. Ties keep input order.
pub fn select_top<T>(mut items: Vec<T>, b: usize, score: impl Fn(&T) -> f64) -> Vec<T> {
    items.sort_by(|x, y| score(y).total_cmp(&score(x)));
    items.truncate(b);
    items
}
