// Shared prompt fragments used by every resume-producing call.
// Each pipeline stage keeps its own templates in generation/prompts.rs.

/// Anti-hallucination rule carried by every prompt that reads source text.
pub const GROUNDING_INSTRUCTION: &str = "\
CRITICAL: Use EXACT company names, job titles, and dates as they appear in the source text. \
Every role, company, date, degree, and achievement you output must be verifiable by pointing \
to specific text in the source. Do NOT invent, interpolate, or embellish. \
If the source does not support a detail, omit it entirely.";

/// The section convention the Document Assembler parses.
pub const RESUME_FORMAT: &str = "\
FORMATTING STRUCTURE (follow exactly, one item per line):
**[Full Name]**
[City, State] | [Phone] | [Email] | [LinkedIn]

**PROFESSIONAL SUMMARY**
[3-4 sentences summarising the whole career]

**PROFESSIONAL EXPERIENCE**

**Job Title** **Year – Year**
*Company Name – City, State*
● Real achievement from the source text
● Quantified result from the source text

**EDUCATION**
*School Name – City, State*
Degree, Year

**CERTIFICATIONS**
• Real certification from the source

**TECHNICAL SKILLS**
Skills from the source text, comma separated";
