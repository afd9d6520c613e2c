//! Line-oriented resume parser.
//!
//! Input is model-generated text with no schema guarantee, so nothing here
//! rejects a document: every line is either consumed by the current section's
//! rule or skipped. `Section` is the parser state; a known `**HEADER**` line is
//! the only transition. Unknown headers such as `**KEY ACHIEVEMENTS**` inside
//! a job are skipped without leaving the current section.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{EducationEntry, JobEntry, ResumeStructured};
use crate::generation::allocation::truncate_to_allocation;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\*\s*([A-Z][A-Z\s&/]*?)\s*:?\s*\*\*\s*:?$").unwrap()
});

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

static DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d{4}\s*[-–—]+\s*(?:\d{4}|present|current)").unwrap()
});

/// Runs of underscores or dots used as visual leaders between title and dates.
static LEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_.]{2,}").unwrap());

const BULLET_GLYPHS: [char; 3] = ['●', '•', '-'];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    None,
    Summary,
    Experience,
    Education,
    Certifications,
    Skills,
    /// A section we do not render (the role verification list); its lines are skipped.
    Other,
}

impl Section {
    pub fn from_header(name: &str) -> Section {
        match name.trim().trim_end_matches(':').to_ascii_uppercase().as_str() {
            "PROFESSIONAL SUMMARY" | "SUMMARY" | "PROFILE" | "PROFESSIONAL PROFILE" => {
                Section::Summary
            }
            "PROFESSIONAL EXPERIENCE" | "EXPERIENCE" | "WORK EXPERIENCE"
            | "EMPLOYMENT HISTORY" => Section::Experience,
            "EDUCATION" => Section::Education,
            "CERTIFICATIONS" | "CERTIFICATION" | "LICENSES & CERTIFICATIONS" => {
                Section::Certifications
            }
            "TECHNICAL SKILLS" | "SKILLS" | "CORE COMPETENCIES" => Section::Skills,
            _ => Section::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AssembleOptions {
    /// Truncate each job's bullets to the recency allocation.
    pub enforce_allocation: bool,
}

/// Returns the header name when `line` is a `**SECTION NAME**` header.
pub fn section_header(line: &str) -> Option<&str> {
    HEADER
        .captures(line.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn is_known_header(line: &str) -> bool {
    section_header(line).is_some_and(|name| Section::from_header(name) != Section::Other)
}

pub fn parse(text: &str) -> ResumeStructured {
    parse_with(text, AssembleOptions::default())
}

pub fn parse_with(text: &str, options: AssembleOptions) -> ResumeStructured {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
    let mut parser = Parser::default();

    // An all-caps name still reads as a name unless it is a known section.
    if let Some(first) = lines.next_if(|l| !is_known_header(l)) {
        parser.resume.name = strip_emphasis(first).to_string();
        if let Some(second) = lines.next_if(|l| section_header(l).is_none()) {
            parser.resume.contact = second.to_string();
        }
    }
    for line in lines {
        parser.feed(line);
    }

    let mut resume = parser.finish();
    if options.enforce_allocation {
        for (index, job) in resume.experience.iter_mut().enumerate() {
            let dropped = truncate_to_allocation(index + 1, &mut job.bullets);
            if dropped > 0 {
                debug!("Dropped {} bullets over allocation from '{}'", dropped, job.title);
            }
        }
    }
    resume
}

#[derive(Default)]
struct Parser {
    resume: ResumeStructured,
    section: Section,
    job: Option<JobEntry>,
    awaiting_degree: bool,
    summary: Vec<String>,
    skills: Vec<String>,
}

impl Parser {
    fn feed(&mut self, line: &str) {
        if let Some(name) = section_header(line) {
            let next = Section::from_header(name);
            if next == Section::Other && !is_skipped_section(name) {
                debug!("Skipping unknown header '{}' inside {:?}", name, self.section);
                return;
            }
            self.flush_job();
            self.awaiting_degree = false;
            self.section = next;
            return;
        }

        match self.section {
            Section::Summary => self.summary.push(line.to_string()),
            Section::Experience => self.experience_line(line),
            Section::Education => self.education_line(line),
            Section::Certifications => {
                if let Some(item) = bullet_text(line) {
                    self.resume.certifications.push(item.to_string());
                }
            }
            Section::Skills => self
                .skills
                .push(bullet_text(line).unwrap_or(line).to_string()),
            Section::None | Section::Other => {}
        }
    }

    fn experience_line(&mut self, line: &str) {
        if line.starts_with("**") && YEAR.is_match(line) {
            self.flush_job();
            self.job = Some(job_header(line));
        } else if let Some(company) = single_emphasis(line) {
            if let Some(job) = self.job.as_mut() {
                job.company = company.to_string();
            }
        } else if let Some(bullet) = bullet_text(line) {
            if let Some(job) = self.job.as_mut() {
                job.bullets.push(bullet.to_string());
            }
        }
    }

    fn education_line(&mut self, line: &str) {
        if let Some(school) = school_line(line) {
            self.resume.education.push(EducationEntry {
                school: school.to_string(),
                degree: String::new(),
            });
            self.awaiting_degree = true;
        } else if self.awaiting_degree {
            if let Some(entry) = self.resume.education.last_mut() {
                entry.degree = line.to_string();
            }
            self.awaiting_degree = false;
        }
    }

    fn flush_job(&mut self) {
        if let Some(job) = self.job.take() {
            self.resume.experience.push(job);
        }
    }

    fn finish(mut self) -> ResumeStructured {
        self.flush_job();
        self.resume.summary = self.summary.join(" ");
        self.resume.skills = self.skills.join(" ");
        self.resume
    }
}

/// `**Title** **2019 – Present**`, `**Title** ____ **2019 - 2021**`, `**Title 2019 – 2021**`.
fn job_header(line: &str) -> JobEntry {
    let line = LEADER.replace_all(line, " ");
    let inner = &line[2..];
    let (mut title, remainder) = match inner.find("**") {
        Some(end) => (inner[..end].trim().to_string(), &inner[end + 2..]),
        None => (inner.trim().to_string(), ""),
    };

    let date_range = match DATE_RANGE.find(remainder) {
        Some(m) => m.as_str().to_string(),
        None if !strip_emphasis(remainder).is_empty() => strip_emphasis(remainder).to_string(),
        // Dates folded into the bold title.
        None => match DATE_RANGE.find(&title).or_else(|| YEAR.find(&title)) {
            Some(m) => {
                let start = m.start();
                let date = title[start..].trim().to_string();
                title = title[..start]
                    .trim_end_matches(|c: char| c.is_whitespace() || "|,-–—(".contains(c))
                    .to_string();
                date.trim_end_matches(')').to_string()
            }
            None => String::new(),
        },
    };

    JobEntry {
        title,
        date_range,
        company: String::new(),
        bullets: Vec::new(),
    }
}

/// Inner text of a `*...*` line (single emphasis, not bold).
fn single_emphasis(line: &str) -> Option<&str> {
    if line.starts_with("**") {
        return None;
    }
    let inner = line.strip_prefix('*')?.strip_suffix('*')?.trim();
    (!inner.is_empty()).then_some(inner)
}

/// `*School*`, or `**School**` when the bold text carries no year.
fn school_line(line: &str) -> Option<&str> {
    single_emphasis(line).or_else(|| {
        let inner = line.strip_prefix("**")?.strip_suffix("**")?.trim();
        (!inner.is_empty() && !inner.contains("**") && !YEAR.is_match(inner)).then_some(inner)
    })
}

/// Headers that open a section whose lines are dropped.
fn is_skipped_section(name: &str) -> bool {
    name.to_ascii_uppercase().contains("VERIFICATION")
}

fn bullet_text(line: &str) -> Option<&str> {
    line.strip_prefix(BULLET_GLYPHS)
        .map(str::trim)
        .filter(|b| !b.is_empty())
}

fn strip_emphasis(text: &str) -> &str {
    text.trim().trim_matches('*').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_JOB_RESUME: &str = "\
**Jane Doe**
Boston, MA | (555) 010-2000 | jane@example.com

**PROFESSIONAL SUMMARY**
Backend engineer with ten years of platform work.
Focused on data-heavy systems.

**PROFESSIONAL EXPERIENCE**

**Staff Software Engineer** **2021 – Present**
*Northwind Analytics – Boston, MA*
● Led the migration of the billing platform to event sourcing
● Cut p99 latency by 40% on the invoicing API
● Mentored six engineers
● Designed the multi-region failover plan
● Owned on-call tooling

**Software Engineer** **2015 – 2021**
*Fabrikam Logistics – Providence, RI*
● Owned routing microservices
● Built the carrier rate-shopping engine
● Reduced AWS spend by 25%

**EDUCATION**
*Northeastern University – Boston, MA*
B.S. Computer Science, 2012

**CERTIFICATIONS**
• AWS Certified Solutions Architect

**TECHNICAL SKILLS**
Rust, Go, PostgreSQL, Kafka

**ROLE VERIFICATION LIST**
1. Staff Software Engineer | Northwind Analytics | 2021 – Present | Position: 1st";

    #[test]
    fn test_parse_two_jobs_and_one_school() {
        let resume = parse(TWO_JOB_RESUME);

        assert_eq!(resume.name, "Jane Doe");
        assert_eq!(resume.contact, "Boston, MA | (555) 010-2000 | jane@example.com");
        assert_eq!(
            resume.summary,
            "Backend engineer with ten years of platform work. Focused on data-heavy systems."
        );
        assert_eq!(resume.experience.len(), 2);
        assert_eq!(resume.experience[0].bullets.len(), 5);
        assert_eq!(resume.experience[1].bullets.len(), 3);
        assert_eq!(resume.experience[0].title, "Staff Software Engineer");
        assert_eq!(resume.experience[0].date_range, "2021 – Present");
        assert_eq!(resume.experience[1].company, "Fabrikam Logistics – Providence, RI");
        assert_eq!(resume.education.len(), 1);
        assert_eq!(resume.education[0].degree, "B.S. Computer Science, 2012");
        assert_eq!(resume.certifications, vec!["AWS Certified Solutions Architect"]);
        assert_eq!(resume.skills, "Rust, Go, PostgreSQL, Kafka");
    }

    #[test]
    fn test_round_trip_is_idempotent() {
        let first = parse(TWO_JOB_RESUME);
        let second = parse(&crate::document::serialize(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_sections_are_skipped() {
        let resume = parse(TWO_JOB_RESUME);
        assert!(!resume.skills.contains("Position"));
        assert!(resume.experience.iter().all(|j| !j.bullets.iter().any(|b| b.contains('|'))));
    }

    #[test]
    fn test_missing_structure_degrades_gracefully() {
        let resume = parse("Just a name\n\nsome contact\nrandom prose that fits nowhere\n● orphan bullet");
        assert_eq!(resume.name, "Just a name");
        assert_eq!(resume.contact, "some contact");
        assert!(resume.experience.is_empty());
        assert!(resume.summary.is_empty());
    }

    #[test]
    fn test_job_header_variants() {
        let leader = job_header("**Senior Engineer** ________ **2018 - 2021**");
        assert_eq!(leader.title, "Senior Engineer");
        assert_eq!(leader.date_range, "2018 - 2021");

        let folded = job_header("**Senior Engineer | 2018 – Current**");
        assert_eq!(folded.title, "Senior Engineer");
        assert_eq!(folded.date_range, "2018 – Current");

        let free_form = job_header("**Intern** **Summer 2011**");
        assert_eq!(free_form.title, "Intern");
        assert_eq!(free_form.date_range, "Summer 2011");
    }

    #[test]
    fn test_bullets_and_company_before_a_job_are_ignored() {
        let text = "**Jane**\ncontact\n**EXPERIENCE**\n*Stray Co*\n- stray\n**Dev** **2019 – 2020**\n- kept";
        let resume = parse(text);
        assert_eq!(resume.experience.len(), 1);
        assert_eq!(resume.experience[0].company, "");
        assert_eq!(resume.experience[0].bullets, vec!["kept"]);
    }

    #[test]
    fn test_contact_absent_when_second_line_is_a_header() {
        let resume = parse("**Jane Doe**\n**SUMMARY**\nShort summary.");
        assert_eq!(resume.contact, "");
        assert_eq!(resume.summary, "Short summary.");
    }

    #[test]
    fn test_all_caps_name_is_still_the_name() {
        let resume = parse("**JANE DOE**
Boston, MA
**SUMMARY**
Short summary.");
        assert_eq!(resume.name, "JANE DOE");
        assert_eq!(resume.contact, "Boston, MA");
    }

    #[test]
    fn test_enforce_allocation_truncates_older_roles() {
        let mut text = String::from("**Jane**\ncontact\n**EXPERIENCE**\n");
        for (i, year) in (2016..2020).rev().enumerate() {
            text.push_str(&format!("**Role {i}** **{year} – {}**\n", year + 1));
            for b in 0..6 {
                text.push_str(&format!("● bullet {b}\n"));
            }
        }

        let lenient = parse(&text);
        assert!(lenient.experience.iter().all(|j| j.bullets.len() == 6));

        let strict = parse_with(&text, AssembleOptions { enforce_allocation: true });
        let counts: Vec<usize> = strict.experience.iter().map(|j| j.bullets.len()).collect();
        assert_eq!(counts, vec![5, 5, 5, 3]);
    }

    #[test]
    fn test_section_header_matching() {
        assert_eq!(section_header("**TECHNICAL SKILLS**"), Some("TECHNICAL SKILLS"));
        assert_eq!(section_header("  **EDUCATION**:"), Some("EDUCATION"));
        assert_eq!(section_header("**LICENSES & CERTIFICATIONS**"), Some("LICENSES & CERTIFICATIONS"));
        assert_eq!(section_header("**Staff Engineer** **2021 – Present**"), None);
        assert_eq!(section_header("**Jane Doe**"), None);
        assert_eq!(Section::from_header("WORK EXPERIENCE"), Section::Experience);
        assert_eq!(Section::from_header("ROLE VERIFICATION LIST"), Section::Other);
    }

    #[test]
    fn test_subheading_inside_experience_keeps_the_section() {
        let text = "\
**Jane**
contact
**EXPERIENCE**
**CTO** **2020 – 2024**
*Initech*
**KEY ACHIEVEMENTS**
● Led the platform rewrite
**Dev** **2015 – 2020**
*Hooli*
● Built search";
        let resume = parse(text);

        assert_eq!(resume.experience.len(), 2);
        assert_eq!(resume.experience[0].bullets, vec!["Led the platform rewrite"]);
        assert_eq!(resume.experience[1].company, "Hooli");
        assert_eq!(resume.experience[1].bullets, vec!["Built search"]);
    }

    #[test]
    fn test_verification_list_still_ends_the_skills_section() {
        let resume = parse("**Jane**\ncontact\n**SKILLS**\nRust\n**ROLE VERIFICATION LIST**\n1. CTO | Initech | 2020");
        assert_eq!(resume.skills, "Rust");
    }

    #[test]
    fn test_bold_school_line() {
        let resume = parse("**Jane**\ncontact\n**EDUCATION**\n**Northeastern University**\nB.S. Computer Science, 2012");
        assert_eq!(resume.education.len(), 1);
        assert_eq!(resume.education[0].school, "Northeastern University");
        assert_eq!(resume.education[0].degree, "B.S. Computer Science, 2012");

        let dated = parse("**Jane**\ncontact\n**EDUCATION**\n**B.S. 2012**");
        assert!(dated.education.is_empty());
    }
}
