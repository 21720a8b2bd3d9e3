//! Regex extraction of CV metadata: student name, contact details, and the
//! skills/education/experience sections.

use anyhow::{Context, Result};
use regex::Regex;

use crate::models::CvMetadata;

/// Compiled extraction rules, built once per processor.
pub struct CvExtractor {
    name_labeled: Regex,
    name_first_line: Regex,
    name_cv_title: Vec<Regex>,
    email: Regex,
    phone: Vec<Regex>,
    skills_header: Regex,
    tech: Vec<Regex>,
    education_header: Regex,
    education: Vec<Regex>,
    experience_header: Regex,
    experience: Vec<Regex>,
}

/// Placeholder used when no student name can be extracted. Also the
/// "unknown" marker the confidence labeller looks for in answers.
pub const UNKNOWN_NAME: &str = "Desconocido";

impl CvExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            name_labeled: compile(r"(?i)(?:NOMBRE|Name):\s*([A-Za-zÁÉÍÓÚáéíóúñÑ ]+)")?,
            // First line shaped like "Firstname Lastname" — case matters here.
            name_first_line: compile(r"(?m)^([A-Z][a-z]+\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)")?,
            name_cv_title: vec![
                compile(r"(?i)CV\s+(?:de\s+)?([A-Za-zÁÉÍÓÚáéíóúñÑ ]+)")?,
                compile(r"(?i)Curriculum\s+(?:Vitae\s+)?(?:de\s+)?([A-Za-zÁÉÍÓÚáéíóúñÑ ]+)")?,
            ],
            email: compile(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")?,
            phone: vec![
                compile(r"(?i)(?:Tel|Teléfono|Phone):\s*([\d \-()+.]+)")?,
                compile(r"\+?[\d][\d \-()]{9,14}")?,
            ],
            skills_header: compile(r"(?i)(?:HABILIDADES|SKILLS|COMPETENCIAS|TECNOLOGÍAS)")?,
            tech: vec![
                compile(
                    r"(?i)\b(?:Python|Java|JavaScript|C\+\+|C#|HTML|CSS|SQL|React|Angular|Vue|Node|Django|Flask)\b",
                )?,
                compile(r"(?i)\b(?:Machine Learning|AI|Data Science|Web Development|Frontend|Backend)\b")?,
                compile(r"(?i)\b(?:Git|Docker|Kubernetes|AWS|Azure|Google Cloud)\b")?,
            ],
            education_header: compile(r"(?i)(?:EDUCACIÓN|EDUCATION|FORMACIÓN ACADÉMICA)")?,
            education: vec![
                compile(r"(?i)(?:Licenciatura|Ingeniería|Master|Doctorado|Técnico)\s+en\s+[\w ]+")?,
                compile(r"(?i)Universidad\s+[\w ]+")?,
                compile(r"(?i)\b(?:Bachelor|Master|PhD|Degree)\s+[\w ]+")?,
            ],
            experience_header: compile(r"(?i)(?:EXPERIENCIA|EXPERIENCE|TRABAJO|EMPLOYMENT)")?,
            experience: vec![
                compile(
                    r"(?i)(?:Developer|Desarrollador|Analyst|Engineer|Consultant|Intern)\s*(?:en\s+|at\s+)?[\w ]+",
                )?,
                compile(r"(?i)(?:Empresa|Company):\s*[\w ]+")?,
            ],
        })
    }

    pub fn extract(&self, text: &str, filename: &str) -> CvMetadata {
        CvMetadata {
            filename: filename.to_string(),
            student_name: self.extract_name(text),
            email: self.extract_email(text),
            phone: self.extract_phone(text),
            skills: self.extract_skills(text),
            education: self.extract_education(text),
            experience: self.extract_experience(text),
        }
    }

    fn extract_name(&self, text: &str) -> String {
        let candidates = std::iter::once(&self.name_labeled)
            .chain(std::iter::once(&self.name_first_line))
            .chain(self.name_cv_title.iter());

        for pattern in candidates {
            if let Some(caps) = pattern.captures(text) {
                if let Some(m) = caps.get(1) {
                    let name = m.as_str().trim();
                    // A real name has at least two words of substance
                    if name.split_whitespace().count() >= 2 && name.len() > 3 {
                        return name.to_string();
                    }
                }
            }
        }

        UNKNOWN_NAME.to_string()
    }

    fn extract_email(&self, text: &str) -> String {
        self.email
            .find(text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    fn extract_phone(&self, text: &str) -> String {
        for pattern in &self.phone {
            if let Some(caps) = pattern.captures(text) {
                let m = caps.get(1).or_else(|| caps.get(0));
                if let Some(m) = m {
                    return m.as_str().trim().to_string();
                }
            }
        }
        String::new()
    }

    fn extract_skills(&self, text: &str) -> Vec<String> {
        let Some(section) = section_after(text, &self.skills_header) else {
            return Vec::new();
        };

        let mut skills: Vec<String> = Vec::new();
        for pattern in &self.tech {
            for m in pattern.find_iter(section) {
                let skill = m.as_str().to_string();
                if !skills.iter().any(|s| s.eq_ignore_ascii_case(&skill)) {
                    skills.push(skill);
                }
            }
        }
        skills
    }

    fn extract_education(&self, text: &str) -> Vec<String> {
        let Some(section) = section_after(text, &self.education_header) else {
            return Vec::new();
        };
        collect_matches(section, &self.education)
    }

    fn extract_experience(&self, text: &str) -> Vec<String> {
        let Some(section) = section_after(text, &self.experience_header) else {
            return Vec::new();
        };
        collect_matches(section, &self.experience)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("invalid extraction pattern: {pattern}"))
}

fn collect_matches(section: &str, patterns: &[Regex]) -> Vec<String> {
    let mut out = Vec::new();
    for pattern in patterns {
        for m in pattern.find_iter(section) {
            let item = m.as_str().trim().to_string();
            if !item.is_empty() && !out.contains(&item) {
                out.push(item);
            }
        }
    }
    out
}

/// Return the body of a section: the lines after the header up to a blank
/// line or the next all-caps heading.
fn section_after<'a>(text: &'a str, header: &Regex) -> Option<&'a str> {
    let found = header.find(text)?;
    let rest = &text[found.start()..];
    let body_start = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
    let body = &rest[body_start..];

    let mut end = body.len();
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_heading(trimmed) {
            end = offset;
            break;
        }
        offset += line.len();
    }
    Some(&body[..end])
}

fn is_heading(line: &str) -> bool {
    line.len() >= 3
        && line.chars().any(|c| c.is_uppercase())
        && line.chars().all(|c| c.is_uppercase() || c.is_whitespace())
}
