//! Problem domains for the tree search.
//!
//! A [`Task`] validates the initial problem, frames every request, builds the propose and
//! value prompts for a search state, extracts the remaining state from a generated step,
//! and verifies final answers. The engine knows nothing else about the domain; adding a
//! domain means implementing this trait.

mod arith;
mod game24;

pub use arith::{evaluate, literals, EvalError};
pub use game24::{Game24Oracle, Game24Task, GAME24_TARGET};

/// Domain capability consumed by [`crate::tot::TreeSearch`].
pub trait Task: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Structural precondition on the raw problem; search does not start when false.
    fn validate_input(&self, raw: &str) -> bool;

    /// Task framing included in every request of a search: goal, step format, examples.
    fn prompt(&self, raw: &str) -> String;

    /// Request for `k` next steps from `state`.
    fn propose_prompt(&self, state: &str, k: usize) -> String;

    /// Request to judge how promising `state` is.
    fn value_prompt(&self, state: &str) -> String;

    /// Verifies a final answer. Not used by the search loop.
    fn check_solution(&self, expression: &str) -> bool;

    /// Remaining state annotated in a step, or `""` when absent or malformed.
    ///
    /// Callers treat `""` as "cannot continue from this step".
    fn extract_remaining_state(&self, step: &str) -> String;
}
