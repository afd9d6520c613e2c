use std::str::FromStr;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::llm_client::CompletionOptions;

/// Shape of the Gap Reconciler's output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStrategy {
    /// The model emits one complete, merged resume.
    #[default]
    FullMerge,
    /// The model emits only the roles missing from the draft plus the closing
    /// sections; the service splices them onto the draft.
    RemainingRoles,
}

impl FromStr for ReconcileStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full_merge" | "full-merge" => Ok(ReconcileStrategy::FullMerge),
            "remaining_roles" | "remaining-roles" => Ok(ReconcileStrategy::RemainingRoles),
            other => Err(format!(
                "unknown reconcile strategy '{other}' (expected full_merge or remaining_roles)"
            )),
        }
    }
}

/// Sampling budgets for each pipeline stage.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub draft: CompletionOptions,
    /// Lower temperature and a larger ceiling than `draft`: this pass fills in
    /// what is missing and must have room for the whole career.
    pub reconcile: CompletionOptions,
    pub role_extraction: CompletionOptions,
    pub strategy: ReconcileStrategy,
    /// Pins the year used for the recency window. `None` = current UTC year.
    pub current_year: Option<i32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            draft: CompletionOptions {
                temperature: 0.3,
                max_output_tokens: 4000,
            },
            reconcile: CompletionOptions {
                temperature: 0.1,
                max_output_tokens: 8000,
            },
            role_extraction: CompletionOptions {
                temperature: 0.1,
                max_output_tokens: 2048,
            },
            strategy: ReconcileStrategy::FullMerge,
            current_year: None,
        }
    }
}

impl GenerationSettings {
    pub fn year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| Utc::now().year())
    }
}
