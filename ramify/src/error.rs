//! Error types for generation backends.
//!
//! A [`BackendError`] never escapes the tree search: the engine logs it and substitutes
//! a fallback (no proposals, or the lowest score bucket). The baselines return it to
//! the caller because they have nothing to fall back to.

use thiserror::Error;

/// Failure of one backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    /// No API key configured for a backend that needs one.
    #[error("missing credentials: set {0}")]
    MissingCredentials(&'static str),
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success HTTP status from the service.
    #[error("status {code}: {body}")]
    Status { code: u16, body: String },
    /// The response could not be interpreted (no candidates, no text).
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Anything else, e.g. a scripted failure in tests.
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Shorthand for [`BackendError::Other`].
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_body() {
        let e = BackendError::Status {
            code: 429,
            body: "quota".to_string(),
        };
        assert_eq!(e.to_string(), "status 429: quota");
    }

    #[test]
    fn missing_credentials_names_the_variable() {
        let e = BackendError::MissingCredentials("GEMINI_API_KEY");
        assert!(e.to_string().contains("GEMINI_API_KEY"));
    }
}
