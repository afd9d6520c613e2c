//! Reconciliation pipeline: extraction → initial draft → gap reconciliation.
//!
//! Stages run strictly in sequence. Text problems abort before any completion
//! call, a failed draft aborts the run, and a failed reconciliation degrades to
//! the draft with a warning attached.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::{SourceText, TextExtractor};
use crate::llm_client::LlmClient;

use super::drafter::{draft_initial, DraftResume};
use super::reconciler::reconcile;
use super::roles::{extract_roles, RoleRecord};
use super::settings::{GenerationSettings, ReconcileStrategy};

/// An uploaded resume file.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub bytes: Bytes,
    pub mime_type: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub resume: String,
    /// True when pass 2 failed and `resume` is the pass-1 draft only.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub roles: Vec<RoleRecord>,
    pub missing_roles: Vec<RoleRecord>,
    pub source_chars: usize,
    pub initial_chars: usize,
    pub strategy: ReconcileStrategy,
}

pub struct ReconciliationPipeline {
    extractor: Arc<dyn TextExtractor>,
    llm: LlmClient,
    settings: GenerationSettings,
}

impl ReconciliationPipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        llm: LlmClient,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            extractor,
            llm,
            settings,
        }
    }

    /// File → validated source text. Never touches the completion client.
    pub async fn extract(&self, upload: DocumentUpload) -> Result<SourceText, AppError> {
        let text = self
            .extractor
            .extract(upload.bytes, &upload.mime_type, upload.file_name.as_deref())
            .await?;
        let source = SourceText::new(text)?;
        info!(
            "Source text ready: {} bytes, {} chars",
            source.byte_len(),
            source.char_len()
        );
        Ok(source)
    }

    /// Full run over an uploaded file. One call = one billable generation.
    pub async fn run(
        &self,
        upload: DocumentUpload,
        job_description: Option<&str>,
    ) -> Result<GenerationOutcome, AppError> {
        let source = self.extract(upload).await?;
        self.run_text(&source, job_description).await
    }

    /// Full run over text that is already extracted.
    pub async fn run_text(
        &self,
        source: &SourceText,
        job_description: Option<&str>,
    ) -> Result<GenerationOutcome, AppError> {
        let job_description = non_blank(job_description);
        let draft = self.draft(source, job_description).await?;
        Ok(self.complete(&draft, source, job_description).await)
    }

    /// Pass 1 only.
    pub async fn draft(
        &self,
        source: &SourceText,
        job_description: Option<&str>,
    ) -> Result<DraftResume, AppError> {
        info!(
            "Generating initial draft from {} chars of source text",
            source.char_len()
        );
        Ok(draft_initial(&self.llm, source, non_blank(job_description), &self.settings).await?)
    }

    /// Pass 2 over an existing draft. Never fails: a reconciliation error
    /// yields the draft with `degraded = true`.
    pub async fn complete(
        &self,
        draft: &DraftResume,
        source: &SourceText,
        job_description: Option<&str>,
    ) -> GenerationOutcome {
        let job_description = non_blank(job_description);
        let initial_chars = draft.as_str().chars().count();

        match reconcile(&self.llm, draft, source, job_description, &self.settings).await {
            Ok(reconciled) => {
                info!(
                    "Reconciled resume: {} -> {} chars, {} roles added",
                    initial_chars,
                    reconciled.text.chars().count(),
                    reconciled.missing.len()
                );
                GenerationOutcome {
                    resume: reconciled.text,
                    degraded: false,
                    warning: None,
                    roles: reconciled.ground_truth,
                    missing_roles: reconciled.missing,
                    source_chars: source.char_len(),
                    initial_chars,
                    strategy: self.settings.strategy,
                }
            }
            Err(e) => {
                warn!("Gap reconciliation failed, returning initial draft: {}", e);
                GenerationOutcome {
                    resume: draft.without_verification_list().to_string(),
                    degraded: true,
                    warning: Some(format!(
                        "The resume could not be completed ({e}). Some roles from your history may be missing."
                    )),
                    roles: e.ground_truth,
                    missing_roles: Vec::new(),
                    source_chars: source.char_len(),
                    initial_chars,
                    strategy: self.settings.strategy,
                }
            }
        }
    }

    /// Standalone Role Extractor pass.
    pub async fn analyze_roles(&self, source: &SourceText) -> Result<Vec<RoleRecord>, AppError> {
        Ok(extract_roles(&self.llm, source, &self.settings.role_extraction).await?)
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}
