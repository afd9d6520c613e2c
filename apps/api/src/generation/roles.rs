//! Role Extractor — enumerates every employment entry in a block of source text.
//!
//! The model is asked for `ROLE: title | company | years | location` lines. Parsing
//! is best-effort: anything that does not match is discarded. Every parsed record is
//! then checked against the source, and records whose title or company cannot be
//! found there are dropped as hallucinations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extraction::SourceText;
use crate::generation::prompts::{role_extraction_prompt, ROLE_EXTRACTION_SYSTEM};
use crate::llm_client::{CompletionOptions, LlmClient, LlmError};

/// One normalised employment entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub title: String,
    pub company: String,
    /// Free-form, usually "YYYY – YYYY" or "YYYY – Present".
    pub date_range: String,
    pub location: Option<String>,
    /// 1 = most recent.
    pub recency_rank: usize,
}

/// Runs the extraction prompt over `source` and returns only grounded roles.
pub async fn extract_roles(
    llm: &LlmClient,
    source: &SourceText,
    options: &CompletionOptions,
) -> Result<Vec<RoleRecord>, LlmError> {
    let prompt = role_extraction_prompt(source.as_str());
    let analysis = llm.complete(ROLE_EXTRACTION_SYSTEM, &prompt, *options).await?;

    let parsed = parse_role_lines(&analysis);
    let parsed_count = parsed.len();
    let roles = retain_grounded(parsed, source.as_str());

    info!(
        "Role extraction: {} parsed, {} grounded in source",
        parsed_count,
        roles.len()
    );
    Ok(roles)
}

/// Parses `ROLE: <title> | <company> | <years> [| <location>]` lines.
pub fn parse_role_lines(text: &str) -> Vec<RoleRecord> {
    let records = text
        .lines()
        .filter_map(|line| {
            let line = strip_list_marker(line.trim()).replace("**", "");
            let rest = strip_prefix_ignore_case(line.trim(), "ROLE:")?;
            parse_fields(rest, true)
        })
        .collect();
    rank(records)
}

/// Parses the Initial Drafter's self-reported `ROLE VERIFICATION LIST`, whose
/// entries look like `1. Title | Company | Years | Position: 1st`.
pub fn parse_verification_list(text: &str) -> Vec<RoleRecord> {
    let mut in_list = false;
    let mut records = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.to_ascii_uppercase().contains("ROLE VERIFICATION LIST") {
            in_list = true;
            continue;
        }
        if !in_list {
            continue;
        }
        if crate::document::section_header(line).is_some() {
            break;
        }
        let entry = strip_list_marker(line).replace("**", "");
        // The fourth column is a position label in this list, not a location.
        if let Some(record) = parse_fields(&entry, false) {
            records.push(record);
        }
    }
    rank(records)
}

/// Keeps only records whose title and company both occur in `source`,
/// removes duplicates, and re-ranks in the surviving order.
pub fn retain_grounded(records: Vec<RoleRecord>, source: &str) -> Vec<RoleRecord> {
    let haystack = normalize_for_match(source);
    let mut seen = HashSet::new();

    let kept = records
        .into_iter()
        .filter(|r| {
            let grounded = haystack.contains(&normalize_for_match(&r.title))
                && haystack.contains(&normalize_for_match(&r.company));
            if !grounded {
                warn!(
                    "Dropping role not found in source text: {} at {}",
                    r.title, r.company
                );
            }
            grounded
        })
        .filter(|r| {
            seen.insert((
                normalize_for_match(&r.title),
                normalize_for_match(&r.company),
                normalize_for_match(&r.date_range),
            ))
        })
        .collect();
    rank(kept)
}

/// Lower-cases, unifies dashes, drops emphasis markers, and collapses whitespace
/// so that substring checks survive formatting differences.
pub fn normalize_for_match(text: &str) -> String {
    text.replace(['–', '—'], "-")
        .replace('*', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn parse_fields(line: &str, fourth_is_location: bool) -> Option<RoleRecord> {
    let fields: Vec<&str> = line.split('|').map(clean_field).collect();
    if fields.len() < 3 {
        return None;
    }
    let (title, company, years) = (fields[0], fields[1], fields[2]);
    if title.is_empty() || company.is_empty() {
        return None;
    }
    let location = fields
        .get(3)
        .filter(|_| fourth_is_location)
        .filter(|l| !is_placeholder(l))
        .map(|l| l.to_string());

    Some(RoleRecord {
        title: title.to_string(),
        company: company.to_string(),
        date_range: years.to_string(),
        location,
        recency_rank: 0,
    })
}

fn rank(mut records: Vec<RoleRecord>) -> Vec<RoleRecord> {
    for (index, record) in records.iter_mut().enumerate() {
        record.recency_rank = index + 1;
    }
    records
}

/// Trims whitespace and template brackets (`[Job Title]` echoes).
fn clean_field(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('[')
        .and_then(|f| f.strip_suffix(']'))
        .unwrap_or(field)
        .trim()
}

fn is_placeholder(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "" | "-" | "n/a" | "na" | "none" | "unknown" | "not available" | "not specified"
    )
}

/// Removes a leading `1.`, `2)`, `-`, `*`, `•` or `●` list marker.
fn strip_list_marker(line: &str) -> &str {
    let without_number = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if without_number.len() < line.len() {
        if let Some(rest) = without_number
            .strip_prefix('.')
            .or_else(|| without_number.strip_prefix(')'))
        {
            return rest.trim_start();
        }
        return line;
    }
    match line.strip_prefix(['-', '•', '●']) {
        Some(rest) => rest.trim_start(),
        // A single `*` is a list marker; `**` is bold and left for the caller.
        None => match line.strip_prefix('*') {
            Some(rest) if !rest.starts_with('*') => rest.trim_start(),
            _ => line,
        },
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &line[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::fixtures::{FIVE_ROLE_ANALYSIS, FIVE_ROLE_SOURCE};
    use crate::generation::settings::GenerationSettings;
    use crate::llm_client::mock::{provider_down, scripted_client, ScriptedProvider, Step};

    #[test]
    fn test_parse_role_lines_discards_noise() {
        let roles = parse_role_lines(FIVE_ROLE_ANALYSIS);
        // 7 ROLE lines (one hallucinated, one duplicate); prose lines are skipped.
        assert_eq!(roles.len(), 7);
        assert_eq!(roles[0].title, "Staff Software Engineer");
        assert_eq!(roles[0].company, "Northwind Analytics");
        assert_eq!(roles[0].date_range, "2021 - Present");
        assert_eq!(roles[0].location.as_deref(), Some("Boston, MA"));
        assert_eq!(roles[4].location, None);
        assert_eq!(roles[6].recency_rank, 7);
    }

    #[test]
    fn test_parse_role_lines_tolerates_markup() {
        let text = "1. **ROLE:** [CTO] | [Initech] | [2019 – 2022]\nrole: Dev | Hooli | 2017";
        let roles = parse_role_lines(text);
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].title, "CTO");
        assert_eq!(roles[0].company, "Initech");
        assert_eq!(roles[0].location, None);
        assert_eq!(roles[1].company, "Hooli");
    }

    #[test]
    fn test_parse_role_lines_requires_three_fields() {
        assert!(parse_role_lines("ROLE: Engineer | Acme").is_empty());
        assert!(parse_role_lines("ROLE:  | Acme | 2020").is_empty());
    }

    #[test]
    fn test_retain_grounded_drops_hallucinations_and_duplicates() {
        let roles = retain_grounded(parse_role_lines(FIVE_ROLE_ANALYSIS), FIVE_ROLE_SOURCE);
        assert_eq!(roles.len(), 5);
        assert!(roles.iter().all(|r| r.company != "Globex Corporation"));
        let ranks: Vec<usize> = roles.iter().map(|r| r.recency_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_parse_verification_list() {
        let draft = "\
**TECHNICAL SKILLS**
Rust, Go

**ROLE VERIFICATION LIST**
1. Staff Software Engineer | Northwind Analytics | 2021 – Present | Position: 1st
2. [Senior Software Engineer] | [Contoso Health] | [2018 – 2021] | [Position: 2nd]
(continued)

**NOTES**
3. Ignored | Ignored Inc | 2000 | 4th+";
        let roles = parse_verification_list(draft);
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[1].company, "Contoso Health");
        assert_eq!(roles[1].location, None);
    }

    #[test]
    fn test_normalize_for_match() {
        assert_eq!(
            normalize_for_match("  **Senior   Engineer**  2019 – 2021 "),
            "senior engineer 2019 - 2021"
        );
    }

    #[tokio::test]
    async fn test_extract_roles_returns_exactly_the_source_roles() {
        let provider = ScriptedProvider::new(vec![Step::Reply(FIVE_ROLE_ANALYSIS.into())]);
        let llm = scripted_client(provider.clone());
        let source = SourceText::new(FIVE_ROLE_SOURCE).unwrap();
        let options = GenerationSettings::default().role_extraction;

        let roles = extract_roles(&llm, &source, &options).await.unwrap();

        assert_eq!(roles.len(), 5);
        for role in &roles {
            assert!(FIVE_ROLE_SOURCE.contains(&role.title), "{}", role.title);
            assert!(FIVE_ROLE_SOURCE.contains(&role.company), "{}", role.company);
        }
        let mut companies: Vec<&str> = roles.iter().map(|r| r.company.as_str()).collect();
        companies.sort_unstable();
        assert_eq!(
            companies,
            vec![
                "Contoso Health",
                "Fabrikam Logistics",
                "Litware Labs",
                "Northwind Analytics",
                "Tailspin Toys"
            ]
        );
        assert_eq!(provider.calls()[0].options, options);
    }

    #[tokio::test]
    async fn test_extract_roles_propagates_exhaustion() {
        let provider = ScriptedProvider::new(vec![provider_down(), provider_down(), provider_down()]);
        let llm = scripted_client(provider);
        let source = SourceText::new(FIVE_ROLE_SOURCE).unwrap();

        let err = extract_roles(&llm, &source, &GenerationSettings::default().role_extraction)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Exhausted { attempts: 3, .. }));
    }
}
