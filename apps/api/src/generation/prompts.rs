// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, RESUME_FORMAT};

use super::allocation::{allocation_instruction, recency_instruction};
use super::roles::RoleRecord;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Fills `{name}` placeholders in a single pass over `template`. Substituted
/// values are never rescanned, so braces inside model output or uploaded text
/// stay literal. Unknown names are left untouched.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// Role extraction
// ────────────────────────────────────────────────────────────────────────────

/// System prompt for role extraction — line-oriented output only.
pub const ROLE_EXTRACTION_SYSTEM: &str = "You are a resume analyst. \
    Your only job is to enumerate every job or role in a career history. \
    Copy titles, company names and dates EXACTLY as written. \
    Never invent, merge, or rename roles. \
    Respond with ROLE lines only, no commentary.";

/// Replace `{source_text}` before sending.
pub const ROLE_EXTRACTION_TEMPLATE: &str = r#"List EVERY job/role found in the career history below, most recent first.

Output one line per role, in this EXACT format:
ROLE: [Job Title] | [Company Name] | [Start Year – End Year] | [Location or N/A]

RULES:
1. Be exhaustive: include internships, contract roles, and roles mentioned only briefly
2. Use the exact title and company spelling from the source
3. If the same company has several titles, emit one ROLE line per title
4. Do NOT output any role that does not appear in the source
5. Do NOT output anything other than ROLE lines

CAREER HISTORY:
{source_text}"#;

pub fn role_extraction_prompt(source_text: &str) -> String {
    fill(ROLE_EXTRACTION_TEMPLATE, &[("source_text", source_text)])
}

// ────────────────────────────────────────────────────────────────────────────
// Initial draft (pass 1)
// ────────────────────────────────────────────────────────────────────────────

pub const DRAFT_SYSTEM: &str = "You are an expert resume writer. \
    You create a professional resume from a career history, including as many roles \
    as fit in a single response. Output the resume text only.";

/// Replace: {grounding_instruction}, {bullet_allocation}, {recency_instruction},
///          {resume_format}, {tailoring}, {source_text}
pub const DRAFT_TEMPLATE: &str = r#"Create an initial resume including AS MANY roles as possible from this career history. Use the full response allowance to include the maximum number of roles.

{grounding_instruction}

{bullet_allocation}

{recency_instruction}

{resume_format}

After the TECHNICAL SKILLS section, append this section listing ALL roles you found in the source, including the ones you could not fit:
**ROLE VERIFICATION LIST**
1. [Job Title] | [Company] | [Years] | [Position: 1st/2nd/3rd/4th+]
2. [Job Title] | [Company] | [Years] | [Position: 1st/2nd/3rd/4th+]

This is pass 1. A second pass will fill in any roles you leave out.

{tailoring}

CAREER HISTORY:
{source_text}"#;

pub fn draft_prompt(source_text: &str, job_description: Option<&str>, year: i32) -> String {
    fill(
        DRAFT_TEMPLATE,
        &[
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("bullet_allocation", &allocation_instruction()),
            ("recency_instruction", &recency_instruction(year)),
            ("resume_format", RESUME_FORMAT),
            ("tailoring", &tailoring_instruction(job_description)),
            ("source_text", source_text),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Gap reconciliation (pass 2)
// ────────────────────────────────────────────────────────────────────────────

pub const RECONCILE_SYSTEM: &str = "You are an expert resume writer completing a partially \
    generated resume. Accuracy matters more than style: every role in the career history \
    must appear, with its exact title, company and dates. Output the resume text only.";

/// Full merge. Replace: {grounding_instruction}, {bullet_allocation}, {resume_format},
///                      {roles}, {missing_roles}, {tailoring}, {initial_resume}, {source_text}
pub const FULL_MERGE_TEMPLATE: &str = r#"Complete the resume below so that it contains EVERY role from the career history.

{grounding_instruction}

ALL ROLES IN THE CAREER HISTORY (most recent first):
{roles}

ROLES MISSING FROM THE CURRENT RESUME:
{missing_roles}

INSTRUCTIONS:
1. Keep every role already present in the current resume and its bullets
2. Add each missing role in chronological position (most recent first)
3. Output ONE complete resume: header, summary, all experience, education, certifications, skills
4. Do NOT include a ROLE VERIFICATION LIST

{bullet_allocation}

{resume_format}

{tailoring}

CURRENT RESUME (pass 1):
{initial_resume}

CAREER HISTORY:
{source_text}"#;

/// Remaining roles only. Same placeholders as `FULL_MERGE_TEMPLATE`.
pub const REMAINING_ROLES_TEMPLATE: &str = r#"The resume below was cut off. Write ONLY the part that is missing.

{grounding_instruction}

ALL ROLES IN THE CAREER HISTORY (most recent first):
{roles}

ROLES TO WRITE NOW:
{missing_roles}

INSTRUCTIONS:
1. Start directly with the first missing role's **Job Title** **Year – Year** line
2. Do NOT repeat the name, contact line, summary, or any role already written
3. After the last role, write the EDUCATION, CERTIFICATIONS and TECHNICAL SKILLS sections
4. Do NOT include a ROLE VERIFICATION LIST

{bullet_allocation}

{resume_format}

{tailoring}

RESUME SO FAR (pass 1):
{initial_resume}

CAREER HISTORY:
{source_text}"#;

pub struct ReconcilePromptInput<'a> {
    pub initial_resume: &'a str,
    pub source_text: &'a str,
    pub job_description: Option<&'a str>,
    pub roles: &'a [RoleRecord],
    pub missing: &'a [RoleRecord],
}

pub fn reconcile_prompt(template: &str, input: &ReconcilePromptInput<'_>) -> String {
    let missing = if input.missing.is_empty() {
        "None detected. Verify every role above is present and complete the resume.".to_string()
    } else {
        role_list(input.missing)
    };

    fill(
        template,
        &[
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("bullet_allocation", &allocation_instruction()),
            ("resume_format", RESUME_FORMAT),
            ("roles", &role_list(input.roles)),
            ("missing_roles", &missing),
            ("tailoring", &tailoring_instruction(input.job_description)),
            ("initial_resume", input.initial_resume),
            ("source_text", input.source_text),
        ],
    )
}

/// Numbered `rank. Title | Company | Dates` lines, with the bullet count each role gets.
pub fn role_list(roles: &[RoleRecord]) -> String {
    roles
        .iter()
        .map(|r| {
            format!(
                "{}. {} | {} | {} ({} bullets)",
                r.recency_rank,
                r.title,
                r.company,
                r.date_range,
                super::allocation::bullets_for(r.recency_rank)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn tailoring_instruction(job_description: Option<&str>) -> String {
    match job_description {
        Some(jd) => format!(
            "CUSTOMIZATION: Tailor the summary, bullet emphasis and skills toward this job \
             description, using only facts from the career history:\n{jd}"
        ),
        None => "GOAL: Include every role with the proper bullet allocation.".to_string(),
    }
}
