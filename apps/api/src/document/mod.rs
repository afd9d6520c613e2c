// Document Assembler: lenient parser from resume text to a structured record,
// plus the serializer that renders the canonical convention back out.
// Only export paths and the structure endpoint use this; the pipeline passes raw text.

pub mod parser;
pub mod serializer;

use serde::{Deserialize, Serialize};

pub use parser::{parse, parse_with, section_header, AssembleOptions, Section};
pub use serializer::serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeStructured {
    pub name: String,
    pub contact: String,
    pub summary: String,
    pub experience: Vec<JobEntry>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<String>,
    pub skills: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEntry {
    pub title: String,
    pub date_range: String,
    pub company: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub school: String,
    pub degree: String,
}
