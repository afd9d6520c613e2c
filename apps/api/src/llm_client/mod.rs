/// LLM Client — the single point of entry for all completion calls.
///
/// ARCHITECTURAL RULE: No other module may call a completion provider directly.
/// All LLM interactions MUST go through `LlmClient::complete`.
///
/// The client walks an ordered list of model identifiers (highest quality first).
/// Each model is tried exactly once; a failure moves on to the next model and the
/// last model's failure is surfaced with its classification intact.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod openai;
pub mod prompts;

#[cfg(test)]
pub mod mock;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Provider rejected the API key: {0}")]
    InvalidCredential(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Completion timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No completion models are configured")]
    NoModels,

    #[error("All {attempts} models failed; last error: {last}")]
    Exhausted { attempts: usize, last: Box<LlmError> },
}

/// Caller-facing classification of a completion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    QuotaExceeded,
    InvalidCredential,
    RateLimited,
    Timeout,
    Other,
}

impl LlmError {
    /// Classification of this error. `Exhausted` reports the kind of the last failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            LlmError::QuotaExceeded(_) => FailureKind::QuotaExceeded,
            LlmError::InvalidCredential(_) => FailureKind::InvalidCredential,
            LlmError::RateLimited(_) => FailureKind::RateLimited,
            LlmError::Timeout(_) => FailureKind::Timeout,
            LlmError::Exhausted { last, .. } => last.kind(),
            _ => FailureKind::Other,
        }
    }
}

/// Per-call sampling options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Raw provider output for one model.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Usage,
}

/// A text-completion backend. One call = one model, no retries.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
        options: CompletionOptions,
    ) -> Result<Completion, LlmError>;
}

/// The single LLM client used by the generation pipeline.
/// Cheap to clone and holds no mutable state.
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn CompletionProvider>,
    models: Arc<[String]>,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn CompletionProvider>, models: Vec<String>, timeout: Duration) -> Self {
        Self {
            provider,
            models: models.into(),
            timeout,
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Runs one completion, falling back across the configured models in order.
    ///
    /// Returns the model's text with any wrapping code fence removed.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        options: CompletionOptions,
    ) -> Result<String, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for (index, model) in self.models.iter().enumerate() {
            debug!(
                "Trying model {} ({}/{}), prompt={} chars, max_tokens={}",
                model,
                index + 1,
                self.models.len(),
                system.len() + user.len(),
                options.max_output_tokens
            );

            let attempt = tokio::time::timeout(
                self.timeout,
                self.provider.complete(model, system, user, options),
            )
            .await
            .unwrap_or(Err(LlmError::Timeout(self.timeout)));

            let outcome = attempt.and_then(|completion| {
                let text = strip_code_fences(&completion.text);
                if text.is_empty() {
                    Err(LlmError::EmptyContent)
                } else {
                    Ok((text.to_string(), completion.usage))
                }
            });

            match outcome {
                Ok((text, usage)) => {
                    info!(
                        "Completion succeeded with model {}: input_tokens={}, output_tokens={}",
                        model, usage.input_tokens, usage.output_tokens
                    );
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Model {} failed: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(last) => Err(LlmError::Exhausted {
                attempts: self.models.len(),
                last: Box::new(last),
            }),
            None => Err(LlmError::NoModels),
        }
    }
}

/// Strips a ```markdown ... ``` (or bare ```) fence wrapping the whole output.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("markdown", "md", "text", ...) on the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
