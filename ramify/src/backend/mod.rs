//! Generation backend abstraction: given a prompt and instruction text, return generated
//! text and the token usage of the call.
//!
//! The tree search, the chain-of-thought baseline and the blackboard debate all talk to
//! the model through [`GenerationBackend`]. Implementations: [`MockBackend`] (scripted
//! responses for tests), [`GeminiBackend`] (Gemini `generateContent` over HTTP) and
//! [`crate::task::Game24Oracle`] (offline arithmetic oracle for demos).
//!
//! # Blocking use
//!
//! The trait is async. Synchronous callers use [`generate_blocking`], which drives one
//! call on a private current-thread runtime.

mod gemini;
mod mock;

pub use gemini::{GeminiBackend, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
pub use mock::MockBackend;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::message::{render_transcript, Message};

/// Result of one backend call: generated text plus reported token usage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// Generated text (may be empty).
    pub text: String,
    /// Total tokens the service reported for this call (prompt + completion); 0 if unknown.
    pub tokens: u64,
}

impl Generation {
    pub fn new(text: impl Into<String>, tokens: u64) -> Self {
        Self {
            text: text.into(),
            tokens,
        }
    }
}

/// Text-generation capability.
///
/// Any call may fail; callers decide how to degrade. Per-call timeouts are the
/// implementation's concern.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generates text for `prompt` under the system-level `instruction` (may be empty).
    async fn generate(&self, prompt: &str, instruction: &str) -> Result<Generation, BackendError>;

    /// Multi-turn variant: `history` alternates user and model turns, ending with a user turn.
    ///
    /// Default renders the history into one transcript prompt and calls [`generate`](Self::generate).
    async fn converse(
        &self,
        history: &[Message],
        instruction: &str,
    ) -> Result<Generation, BackendError> {
        self.generate(&render_transcript(history), instruction).await
    }
}

#[async_trait]
impl<B: GenerationBackend + ?Sized> GenerationBackend for Arc<B> {
    async fn generate(&self, prompt: &str, instruction: &str) -> Result<Generation, BackendError> {
        (**self).generate(prompt, instruction).await
    }

    async fn converse(
        &self,
        history: &[Message],
        instruction: &str,
    ) -> Result<Generation, BackendError> {
        (**self).converse(history, instruction).await
    }
}

/// Blocking form of [`GenerationBackend::generate`].
///
/// Must not be called from inside an async runtime.
pub fn generate_blocking(
    backend: &dyn GenerationBackend,
    prompt: &str,
    instruction: &str,
) -> Result<Generation, BackendError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| BackendError::other(format!("runtime: {}", e)))?;
    rt.block_on(backend.generate(prompt, instruction))
}
