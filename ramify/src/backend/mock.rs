//! Scripted backend for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{Generation, GenerationBackend};
use crate::error::BackendError;

type Responder = dyn Fn(&str, &str) -> Result<String, BackendError> + Send + Sync;

/// Backend whose replies come from a closure over `(prompt, instruction)`.
///
/// Counts calls and records every prompt it receives so tests can assert on traffic.
pub struct MockBackend {
    responder: Box<Responder>,
    tokens_per_call: u64,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Backend that answers with `respond(prompt, instruction)`.
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str, &str) -> Result<String, BackendError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(respond),
            tokens_per_call: 10,
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Backend that always returns `text`.
    pub fn with_reply(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_, _| Ok(text.clone()))
    }

    /// Backend whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_, _| Err(BackendError::other(message.clone())))
    }

    /// Token usage reported for each successful call (default 10).
    pub fn with_tokens_per_call(mut self, tokens: u64) -> Self {
        self.tokens_per_call = tokens;
        self
    }

    /// Sleeps before answering; used to exercise concurrent fan-out.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls received so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in arrival order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, prompt: &str, instruction: &str) -> Result<Generation, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut p) = self.prompts.lock() {
            p.push(prompt.to_string());
        }
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let text = (self.responder)(prompt, instruction)?;
        Ok(Generation::new(text, self.tokens_per_call))
    }
}
