//! Tree-of-thoughts search.
//!
//! - [`tree`]: [`SearchTree`] arena of [`SearchNode`]s with parent back-references.
//! - [`scoring`]: proposal splitting, [`ScorePolicy`] bucket scores, [`select_top`].
//! - [`progress`]: [`ProgressSink`] for per-round frontier reports.
//! - [`engine`]: [`TreeSearch`], the propose → evaluate → select loop.

pub mod engine;
pub mod progress;
pub mod scoring;
pub mod tree;

pub use engine::{
    SearchOutcome, SearchParams, Termination, TreeSearch, INVALID_INPUT, NO_SOLUTION,
};
pub use progress::{NoProgress, ProgressSink, RankedStep, TracingProgress};
pub use scoring::{select_top, split_proposals, ScorePolicy};
pub use tree::{NodeId, SearchNode, SearchTree};
