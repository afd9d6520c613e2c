use super::ResumeStructured;

/// Renders the canonical text convention. Empty sections are omitted.
pub fn serialize(resume: &ResumeStructured) -> String {
    let mut blocks: Vec<String> = Vec::new();

    let mut header = vec![format!("**{}**", resume.name)];
    if !resume.contact.is_empty() {
        header.push(resume.contact.clone());
    }
    blocks.push(header.join("\n"));

    if !resume.summary.is_empty() {
        blocks.push(format!("**PROFESSIONAL SUMMARY**\n{}", resume.summary));
    }

    if !resume.experience.is_empty() {
        blocks.push("**PROFESSIONAL EXPERIENCE**".to_string());
        for job in &resume.experience {
            let mut lines = vec![format!("**{}** **{}**", job.title, job.date_range)];
            if !job.company.is_empty() {
                lines.push(format!("*{}*", job.company));
            }
            lines.extend(job.bullets.iter().map(|b| format!("● {b}")));
            blocks.push(lines.join("\n"));
        }
    }

    if !resume.education.is_empty() {
        let entries: Vec<String> = resume
            .education
            .iter()
            .map(|e| {
                if e.degree.is_empty() {
                    format!("*{}*", e.school)
                } else {
                    format!("*{}*\n{}", e.school, e.degree)
                }
            })
            .collect();
        blocks.push(format!("**EDUCATION**\n{}", entries.join("\n")));
    }

    if !resume.certifications.is_empty() {
        let items: Vec<String> = resume.certifications.iter().map(|c| format!("• {c}")).collect();
        blocks.push(format!("**CERTIFICATIONS**\n{}", items.join("\n")));
    }

    if !resume.skills.is_empty() {
        blocks.push(format!("**TECHNICAL SKILLS**\n{}", resume.skills));
    }

    blocks.join("\n\n")
}
