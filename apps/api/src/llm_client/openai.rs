//! OpenAI Chat Completions backend for `LlmClient`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Completion, CompletionOptions, CompletionProvider, LlmError, Usage};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}

/// Chat Completions client. One request per `complete` call; fallback lives in `LlmClient`.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
        options: CompletionOptions,
    ) -> Result<Completion, LlmError> {
        let request_body = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: options.temperature,
            max_tokens: options.max_output_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout)
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &body));
        }

        let chat: ChatResponse = serde_json::from_str(&body)?;
        let usage = chat
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();
        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyContent)?;

        debug!("OpenAI {} returned {} chars", model, text.len());
        Ok(Completion { text, usage })
    }
}

/// Maps an error response onto the client's failure taxonomy.
fn classify_error(status: u16, body: &str) -> LlmError {
    let parsed = serde_json::from_str::<OpenAiError>(body).ok().map(|e| e.error);
    let code = parsed
        .as_ref()
        .and_then(|e| e.code.clone().or_else(|| e.error_type.clone()));
    let message = parsed
        .map(|e| e.message)
        .unwrap_or_else(|| body.to_string());

    match (status, code.as_deref()) {
        (_, Some("insufficient_quota")) => LlmError::QuotaExceeded(message),
        (401, _) | (_, Some("invalid_api_key")) => LlmError::InvalidCredential(message),
        (429, _) => LlmError::RateLimited(message),
        _ => LlmError::Api { status, message },
    }
}
