//! Gap Reconciler — pass 2. Grounds the merge in a fresh role extraction over the
//! source, works out which roles the draft dropped, and asks for the rest.

use serde::Serialize;
use tracing::{info, warn};

use crate::document::{section_header, Section};
use crate::extraction::SourceText;
use crate::llm_client::{LlmClient, LlmError};

use super::drafter::DraftResume;
use super::prompts::{
    reconcile_prompt, ReconcilePromptInput, FULL_MERGE_TEMPLATE, RECONCILE_SYSTEM,
    REMAINING_ROLES_TEMPLATE,
};
use super::roles::{extract_roles, RoleRecord};
use super::settings::{GenerationSettings, ReconcileStrategy};

/// The final completion failed. Carries the grounded roles computed before the
/// failure so a degraded result can still report them.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct ReconcileError {
    pub source: LlmError,
    pub ground_truth: Vec<RoleRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    /// Final resume text, without any verification list.
    pub text: String,
    pub ground_truth: Vec<RoleRecord>,
    /// Roles that were absent from the draft when pass 2 started.
    pub missing: Vec<RoleRecord>,
}

pub async fn reconcile(
    llm: &LlmClient,
    draft: &DraftResume,
    source: &SourceText,
    job_description: Option<&str>,
    settings: &GenerationSettings,
) -> Result<Reconciliation, ReconcileError> {
    let ground_truth = ground_truth(llm, draft, source, settings).await;
    let missing = missing_roles(&ground_truth, draft);
    info!(
        "Reconciling ({:?}): {} roles in source, {} missing from draft",
        settings.strategy,
        ground_truth.len(),
        missing.len()
    );

    let template = match settings.strategy {
        ReconcileStrategy::FullMerge => FULL_MERGE_TEMPLATE,
        ReconcileStrategy::RemainingRoles => REMAINING_ROLES_TEMPLATE,
    };
    let prompt = reconcile_prompt(
        template,
        &ReconcilePromptInput {
            initial_resume: draft.without_verification_list(),
            source_text: source.as_str(),
            job_description,
            roles: &ground_truth,
            missing: &missing,
        },
    );

    let reply = match llm.complete(RECONCILE_SYSTEM, &prompt, settings.reconcile).await {
        Ok(reply) => DraftResume::new(reply),
        Err(source) => {
            return Err(ReconcileError {
                source,
                ground_truth,
            })
        }
    };

    let text = match settings.strategy {
        ReconcileStrategy::FullMerge => reply.without_verification_list().to_string(),
        ReconcileStrategy::RemainingRoles => {
            splice_fragment(draft.without_verification_list(), reply.without_verification_list())
        }
    };

    Ok(Reconciliation {
        text,
        ground_truth,
        missing,
    })
}

/// A fresh extraction over the source. When that fails or finds nothing, the
/// draft's own list is used after the same grounding check.
async fn ground_truth(
    llm: &LlmClient,
    draft: &DraftResume,
    source: &SourceText,
    settings: &GenerationSettings,
) -> Vec<RoleRecord> {
    match extract_roles(llm, source, &settings.role_extraction).await {
        Ok(roles) if !roles.is_empty() => return roles,
        Ok(_) => warn!("Role extraction found no grounded roles; using the draft's list"),
        Err(e) => warn!("Role extraction failed ({}); using the draft's list", e),
    }
    draft.grounded_roles(source)
}

/// Ground-truth roles whose title or company does not appear in the draft body.
pub fn missing_roles(ground_truth: &[RoleRecord], draft: &DraftResume) -> Vec<RoleRecord> {
    ground_truth
        .iter()
        .filter(|role| !draft.contains_role(role))
        .cloned()
        .collect()
}

/// Appends a remaining-roles fragment to the draft's header, summary and
/// experience. Each closing section comes from the fragment when it has one,
/// otherwise from the draft.
pub fn splice_fragment(draft: &str, fragment: &str) -> String {
    let (head, draft_closing) = split_closing(draft);
    let (roles, fragment_closing) = split_closing(fragment);
    let roles: Vec<&str> = roles
        .into_iter()
        .filter(|line| {
            !matches!(
                section_header(line).map(Section::from_header),
                Some(Section::Experience)
            )
        })
        .collect();

    let mut closing: Vec<&[&str]> = draft_closing
        .iter()
        .map(|(section, lines)| {
            fragment_closing
                .iter()
                .find(|(s, _)| s == section)
                .map_or(lines, |(_, replacement)| replacement)
                .as_slice()
        })
        .collect();
    closing.extend(
        fragment_closing
            .iter()
            .filter(|(s, _)| !draft_closing.iter().any(|(d, _)| d == s))
            .map(|(_, lines)| lines.as_slice()),
    );

    let mut parts = vec![
        head.join("\n").trim_end().to_string(),
        roles.join("\n").trim().to_string(),
    ];
    parts.extend(closing.iter().map(|lines| lines.join("\n").trim().to_string()));
    parts.retain(|part| !part.is_empty());
    parts.join("\n\n")
}

type ClosingSection<'a> = (Section, Vec<&'a str>);

/// Splits `text` at its first closing header into the lines before it and the
/// closing sections, each starting with its header line. A verification list
/// ends the text.
fn split_closing(text: &str) -> (Vec<&str>, Vec<ClosingSection<'_>>) {
    let mut body = Vec::new();
    let mut closing: Vec<ClosingSection<'_>> = Vec::new();

    for line in text.lines() {
        if let Some(name) = section_header(line) {
            if name.contains("VERIFICATION") {
                break;
            }
            let section = Section::from_header(name);
            if matches!(
                section,
                Section::Education | Section::Certifications | Section::Skills
            ) {
                closing.push((section, vec![line]));
                continue;
            }
        }
        match closing.last_mut() {
            Some((_, lines)) => lines.push(line),
            None => body.push(line),
        }
    }
    (body, closing)
}
