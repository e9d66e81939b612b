//! The 24 game: combine four numbers with `+ - * /` to reach 24.
//!
//! Steps look like `4 + 8 = 12 (left: 4 6 12)`; the `(left: ...)` annotation is the
//! remaining state the search continues from.

use std::collections::HashSet;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::arith::{evaluate, literals};
use super::Task;
use crate::backend::{Generation, GenerationBackend};
use crate::error::BackendError;
use crate::prompts::{render, Prompts};

pub const GAME24_TARGET: f64 = 24.0;

const EPSILON: f64 = 1e-6;

static LEFT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(left:\s*([^)]*)\)").expect("left-annotation regex"));

static PROPOSE_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)propose\s+(\d+)").expect("propose-count regex"));

/// 24 game task with prompt templates from [`Prompts`].
#[derive(Clone, Debug)]
pub struct Game24Task {
    framing: String,
    propose: String,
    value: String,
}

impl Default for Game24Task {
    fn default() -> Self {
        Self::with_prompts(&Prompts::default())
    }
}

impl Game24Task {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the `game24` templates of `prompts`.
    pub fn with_prompts(prompts: &Prompts) -> Self {
        Self {
            framing: prompts.game24_framing().to_string(),
            propose: prompts.game24_propose().to_string(),
            value: prompts.game24_value().to_string(),
        }
    }

    /// Like [`Task::check_solution`], and the expression must use exactly `numbers`
    /// (whitespace-separated) as a multiset of literals.
    ///
    /// Literals are compared by magnitude: a leading `-` in the expression parses as an
    /// operator, so `-24 1 1 1` is matched by `-(-24) * 1 * 1 * 1` and also by `24 * 1 * 1 * 1`.
    pub fn check_solution_with_numbers(&self, expression: &str, numbers: &str) -> bool {
        if !self.check_solution(expression) {
            return false;
        }
        let Some(expected) = parse_numbers(numbers) else {
            return false;
        };
        let mut expected: Vec<f64> = expected.into_iter().map(f64::abs).collect();
        let mut used = literals(answer_lhs(expression));
        expected.sort_by(f64::total_cmp);
        used.sort_by(f64::total_cmp);
        expected.len() == used.len()
            && expected
                .iter()
                .zip(used.iter())
                .all(|(a, b)| (a - b).abs() < EPSILON)
    }
}

/// Strips an `Answer:` prefix and a trailing `= 24`.
fn answer_lhs(expression: &str) -> &str {
    let s = expression.trim();
    let s = s
        .strip_prefix("Answer:")
        .or_else(|| s.strip_prefix("answer:"))
        .unwrap_or(s);
    s.split('=').next().unwrap_or("").trim()
}

fn parse_numbers(s: &str) -> Option<Vec<f64>> {
    s.split_whitespace().map(|t| t.parse::<f64>().ok()).collect()
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

impl Task for Game24Task {
    fn name(&self) -> &str {
        "game24"
    }

    fn validate_input(&self, raw: &str) -> bool {
        raw.split_whitespace().count() == 4
    }

    fn prompt(&self, raw: &str) -> String {
        render(&self.framing, &[("input", raw.trim())])
    }

    fn propose_prompt(&self, state: &str, k: usize) -> String {
        render(&self.propose, &[("state", state), ("k", &k.to_string())])
    }

    fn value_prompt(&self, state: &str) -> String {
        render(&self.value, &[("state", state)])
    }

    fn check_solution(&self, expression: &str) -> bool {
        match evaluate(answer_lhs(expression)) {
            Ok(v) => (v - GAME24_TARGET).abs() < EPSILON,
            Err(_) => false,
        }
    }

    fn extract_remaining_state(&self, step: &str) -> String {
        LEFT_RE
            .captures(step)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }
}

/// True when `nums` can be combined into 24.
fn can_reach(nums: &[f64]) -> bool {
    if nums.len() == 1 {
        return (nums[0] - GAME24_TARGET).abs() < EPSILON;
    }
    for i in 0..nums.len() {
        for j in 0..nums.len() {
            if i == j {
                continue;
            }
            let rest: Vec<f64> = nums
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != i && *idx != j)
                .map(|(_, v)| *v)
                .collect();
            let (a, b) = (nums[i], nums[j]);
            let mut results = vec![a + b, a - b, a * b];
            if b.abs() > EPSILON {
                results.push(a / b);
            }
            for r in results {
                let mut next = rest.clone();
                next.push(r);
                if can_reach(&next) {
                    return true;
                }
            }
        }
    }
    false
}

/// One integer-valued step from `nums`, as `(line, remaining)`.
fn integer_steps(nums: &[f64]) -> Vec<(String, Vec<f64>)> {
    let mut out = Vec::new();
    for i in 0..nums.len() {
        for j in (i + 1)..nums.len() {
            let (hi, lo) = if nums[i] >= nums[j] {
                (nums[i], nums[j])
            } else {
                (nums[j], nums[i])
            };
            let mut ops = vec![('+', hi + lo), ('-', hi - lo), ('*', hi * lo)];
            if lo.abs() > EPSILON && (hi / lo).fract() == 0.0 {
                ops.push(('/', hi / lo));
            }
            for (op, r) in ops {
                let mut left: Vec<f64> = nums
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != i && *idx != j)
                    .map(|(_, v)| *v)
                    .collect();
                left.push(r);
                left.sort_by(f64::total_cmp);
                let line = format!(
                    "{} {} {} = {} (left: {})",
                    format_number(hi),
                    op,
                    format_number(lo),
                    format_number(r),
                    left.iter().map(|v| format_number(*v)).collect::<Vec<_>>().join(" ")
                );
                out.push((line, left));
            }
        }
    }
    out
}

/// Offline backend that answers the 24-game propose and value prompts by exhaustive search.
///
/// It reads the last `Input:` line of the prompt; prompts containing `Possible next steps`
/// are proposals, everything else is a value request. Useful for demos and for
/// exercising the engine without a model. Reports zero tokens.
#[derive(Clone, Debug, Default)]
pub struct Game24Oracle;

impl Game24Oracle {
    fn state_of(prompt: &str) -> Option<Vec<f64>> {
        let line = prompt
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| l.starts_with("Input:"))?;
        parse_numbers(line.trim_start_matches("Input:"))
    }

    fn propose(nums: &[f64], k: Option<usize>) -> String {
        let mut seen = HashSet::new();
        let mut steps = integer_steps(nums);
        steps.retain(|(line, _)| seen.insert(line.clone()));
        // solvable branches first; stable within each group
        steps.sort_by_key(|(_, left)| !can_reach(left));
        let limit = k.unwrap_or(steps.len());
        steps
            .into_iter()
            .take(limit)
            .map(|(line, _)| line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn value(nums: &[f64]) -> &'static str {
        if !nums.is_empty() && can_reach(nums) {
            "sure"
        } else {
            "impossible"
        }
    }
}

#[async_trait]
impl GenerationBackend for Game24Oracle {
    async fn generate(&self, prompt: &str, _instruction: &str) -> Result<Generation, BackendError> {
        let nums = Self::state_of(prompt)
            .ok_or_else(|| BackendError::Malformed("no numeric Input line in prompt".to_string()))?;
        let text = if prompt.contains("Possible next steps") {
            let k = PROPOSE_COUNT_RE
                .captures(prompt)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<usize>().ok());
            Self::propose(&nums, k)
        } else {
            Self::value(&nums).to_string()
        };
        Ok(Generation::new(text, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_input_requires_four_tokens() {
        let t = Game24Task::new();
        assert!(t.validate_input("4 9 10 13"));
        assert!(t.validate_input("  1   1 4 6 "));
        assert!(!t.validate_input("4 9 10"));
        assert!(!t.validate_input("4 9 10 13 1"));
        assert!(!t.validate_input(""));
    }

    #[test]
    fn extract_remaining_state_reads_left_annotation() {
        let t = Game24Task::new();
        assert_eq!(t.extract_remaining_state("4 + 8 = 12 (left: 6 12)"), "6 12");
        assert_eq!(t.extract_remaining_state("(left: 24) extra (left: 1)"), "24");
        assert_eq!(t.extract_remaining_state("4 + 8 = 12"), "");
        assert_eq!(t.extract_remaining_state("4 + 8 = 12 (left: 6 12"), "");
        assert_eq!(t.extract_remaining_state("(left: )"), "");
    }

    #[test]
    fn check_solution_accepts_expressions_equal_to_24() {
        let t = Game24Task::new();
        assert!(t.check_solution("(6 - 4) * (4 + 8)"));
        assert!(t.check_solution("Answer: (6 - 4) * (4 + 8) = 24"));
        assert!(t.check_solution("8 / (3 - 8 / 3)"));
        assert!(!t.check_solution("4 + 4 + 6 + 8"));
        assert!(!t.check_solution("1 / 0"));
        assert!(!t.check_solution("not math"));
    }

    #[test]
    fn check_solution_with_numbers_requires_exact_multiset() {
        let t = Game24Task::new();
        assert!(t.check_solution_with_numbers("(6 - 4) * (4 + 8)", "4 4 6 8"));
        assert!(!t.check_solution_with_numbers("(6 - 4) * (4 + 8)", "4 5 6 8"));
        assert!(!t.check_solution_with_numbers("24", "4 4 6 8"));
        assert!(!t.check_solution_with_numbers("(6 - 4) * (4 + 8)", "a b c d"));
    }

    #[test]
    fn negative_numbers_match_by_magnitude() {
        let t = Game24Task::new();
        assert!(t.validate_input("-24 1 1 1"));
        assert!(t.check_solution_with_numbers("-(-24) * 1 * 1 * 1", "-24 1 1 1"));
        assert!(!t.check_solution_with_numbers("-(-24) * 1 * 1", "-24 1 1 1"));
    }

    #[test]
    fn deeply_nested_answer_is_rejected() {
        let t = Game24Task::new();
        let nested = format!("{}24{}", "(".repeat(200_000), ")".repeat(200_000));
        assert!(!t.check_solution(&nested));
        assert!(!t.check_solution(&"(".repeat(100_000)));
        assert!(!t.check_solution_with_numbers(&nested, "24 1 1 1"));
    }

    #[test]
    fn prompts_embed_state_and_k() {
        let t = Game24Task::new();
        assert!(t.prompt("4 9 10 13").contains("4 9 10 13"));
        let p = t.propose_prompt("6 12", 3);
        assert!(p.contains("Input: 6 12"));
        assert!(p.contains("Propose 3"));
        assert!(t.value_prompt("6 12").contains("Input: 6 12"));
    }

    #[test]
    fn can_reach_matches_known_cases() {
        assert!(can_reach(&[4.0, 9.0, 10.0, 13.0]));
        assert!(can_reach(&[3.0, 3.0, 8.0, 8.0]));
        assert!(!can_reach(&[1.0, 1.0, 1.0, 1.0]));
        assert!(can_reach(&[24.0]));
    }

    #[tokio::test]
    async fn oracle_proposes_parseable_steps_and_judges_states() {
        let t = Game24Task::new();
        let oracle = Game24Oracle;
        let propose = format!("{}\n{}", t.prompt("4 9 10 13"), t.propose_prompt("4 9 10 13", 3));
        let out = oracle.generate(&propose, "").await.unwrap();
        let lines: Vec<&str> = out.text.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert!(!t.extract_remaining_state(line).is_empty());
        }
        let first_left = t.extract_remaining_state(lines[0]);
        let value = format!("{}\n{}", t.prompt("4 9 10 13"), t.value_prompt(&first_left));
        assert_eq!(oracle.generate(&value, "").await.unwrap().text, "sure");
        let hopeless = t.value_prompt("1 1");
        assert_eq!(oracle.generate(&hopeless, "").await.unwrap().text, "impossible");
    }
}
