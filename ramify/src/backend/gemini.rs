//! Gemini backend: `models/{model}:generateContent` over HTTP.
//!
//! Requires `GEMINI_API_KEY` in the environment or passed to [`GeminiBackend::new`].
//! Optional: `RAMIFY_MODEL`, `RAMIFY_API_BASE`, `RAMIFY_TIMEOUT_SECS`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Generation, GenerationBackend};
use crate::error::BackendError;
use crate::message::Message;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const ENV_API_KEY: &str = "GEMINI_API_KEY";

/// Generation backend backed by the Gemini REST API.
pub struct GeminiBackend {
    /// API key (x-goog-api-key header).
    api_key: Arc<str>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    /// Creates a backend for `model` with the default base URL and timeout.
    pub fn new(api_key: impl Into<Arc<str>>, model: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(api_key, model, client))
    }

    /// Creates a backend with a custom HTTP client (timeouts, proxies).
    pub fn with_client(
        api_key: impl Into<Arc<str>>,
        model: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            client,
        }
    }

    /// Overrides the API base URL (e.g. a proxy or a local test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builds from `GEMINI_API_KEY`, `RAMIFY_MODEL`, `RAMIFY_API_BASE` and `RAMIFY_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, BackendError> {
        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(BackendError::MissingCredentials(ENV_API_KEY))?;
        let model = std::env::var("RAMIFY_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout = std::env::var("RAMIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;
        let backend = Self::with_client(api_key, model, client);
        Ok(match std::env::var("RAMIFY_API_BASE") {
            Ok(base) if !base.trim().is_empty() => backend.with_base_url(base),
            _ => backend,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn request(&self, body: &GenerateRequest) -> Result<Generation, BackendError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_ref())
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                code: status.as_u16(),
                body,
            });
        }
        let parsed: GenerateResponse = response.json().await?;
        tracing::debug!(model = %self.model, "gemini call completed");
        parsed.into_generation()
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, prompt: &str, instruction: &str) -> Result<Generation, BackendError> {
        let body = GenerateRequest::new(vec![Content::text("user", prompt)], instruction);
        self.request(&body).await
    }

    async fn converse(
        &self,
        history: &[Message],
        instruction: &str,
    ) -> Result<Generation, BackendError> {
        let contents = history
            .iter()
            .map(|m| Content::text(m.role(), m.text()))
            .collect();
        let body = GenerateRequest::new(contents, instruction);
        self.request(&body).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

impl GenerateRequest {
    fn new(contents: Vec<Content>, instruction: &str) -> Self {
        let system_instruction = if instruction.trim().is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: vec![Part {
                    text: instruction.to_string(),
                }],
            })
        };
        Self {
            contents,
            system_instruction,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u64,
}

impl GenerateResponse {
    /// Concatenates the text parts of the first candidate.
    fn into_generation(self) -> Result<Generation, BackendError> {
        let tokens = self
            .usage_metadata
            .map(|u| u.total_token_count)
            .unwrap_or(0);
        let content = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| BackendError::Malformed("no candidates in response".to_string()))?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        Ok(Generation { text, tokens })
    }
}
