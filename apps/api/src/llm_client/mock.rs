//! Scripted completion provider for deterministic tests.
//!
//! Each call pops the next `Step` from a FIFO script and records what was asked.
//! An exhausted script answers with a 500 so over-calling shows up as a failure.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{Completion, CompletionOptions, CompletionProvider, LlmClient, LlmError, Usage};

pub enum Step {
    Reply(String),
    Fail(LlmError),
    /// Never answers within any sane timeout.
    Hang,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub system: String,
    pub user: String,
    pub options: CompletionOptions,
}

pub struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
        options: CompletionOptions,
    ) -> Result<Completion, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            system: system.to_string(),
            user: user.to_string(),
            options,
        });
        let step = self.script.lock().unwrap().pop_front();

        match step {
            Some(Step::Reply(text)) => Ok(Completion {
                text,
                usage: Usage::default(),
            }),
            Some(Step::Fail(e)) => Err(e),
            Some(Step::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::EmptyContent)
            }
            None => Err(LlmError::Api {
                status: 500,
                message: "script exhausted".to_string(),
            }),
        }
    }
}

/// Client over a scripted provider with the three-model fallback list used in tests.
pub fn scripted_client(provider: Arc<ScriptedProvider>) -> LlmClient {
    LlmClient::new(
        provider,
        vec![
            "gpt-4".to_string(),
            "gpt-4-turbo-preview".to_string(),
            "gpt-3.5-turbo".to_string(),
        ],
        Duration::from_secs(60),
    )
}

/// A failure that every model in the list reports.
pub fn provider_down() -> Step {
    Step::Fail(LlmError::Api {
        status: 503,
        message: "service unavailable".to_string(),
    })
}
