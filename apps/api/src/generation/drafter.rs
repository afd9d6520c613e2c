//! Initial Drafter — pass 1. One completion under a fixed output ceiling, so long
//! careers come back partial. The draft carries a self-reported role list that
//! the reconciler can fall back on.

use serde::Serialize;
use tracing::info;

use crate::extraction::SourceText;
use crate::llm_client::{LlmClient, LlmError};

use super::prompts::{draft_prompt, DRAFT_SYSTEM};
use super::roles::{normalize_for_match, parse_verification_list, retain_grounded, RoleRecord};
use super::settings::GenerationSettings;

const VERIFICATION_HEADER: &str = "ROLE VERIFICATION LIST";

/// Candidate resume text following the section convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DraftResume {
    text: String,
}

impl DraftResume {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// The roles the model says it found, parsed from the trailing verification list.
    pub fn self_reported_roles(&self) -> Vec<RoleRecord> {
        parse_verification_list(&self.text)
    }

    /// Self-reported roles whose title and company occur in `source`.
    pub fn grounded_roles(&self, source: &SourceText) -> Vec<RoleRecord> {
        retain_grounded(self.self_reported_roles(), source.as_str())
    }

    /// The draft with the verification list (and anything after it) removed.
    pub fn without_verification_list(&self) -> &str {
        let mut offset = 0;
        for line in self.text.split_inclusive('\n') {
            if line.to_ascii_uppercase().contains(VERIFICATION_HEADER) {
                return self.text[..offset].trim_end();
            }
            offset += line.len();
        }
        self.text.trim_end()
    }

    /// True when both the role's title and company appear in the resume body.
    pub fn contains_role(&self, role: &RoleRecord) -> bool {
        let body = normalize_for_match(self.without_verification_list());
        body.contains(&normalize_for_match(&role.title))
            && body.contains(&normalize_for_match(&role.company))
    }
}

/// Produces the pass-1 draft. A failure here fails the whole generation.
pub async fn draft_initial(
    llm: &LlmClient,
    source: &SourceText,
    job_description: Option<&str>,
    settings: &GenerationSettings,
) -> Result<DraftResume, LlmError> {
    let prompt = draft_prompt(source.as_str(), job_description, settings.year());
    let text = llm.complete(DRAFT_SYSTEM, &prompt, settings.draft).await?;

    let draft = DraftResume::new(text);
    info!(
        "Initial draft: {} chars, {} self-reported roles",
        draft.as_str().len(),
        draft.self_reported_roles().len()
    );
    Ok(draft)
}
