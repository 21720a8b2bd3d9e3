use anyhow::{Context, Result};
use regex::Regex;

use super::QueryCategory;

/// Named slots captured from the query text by classification rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedEntities {
    pub student_name: Option<String>,
    pub skill: Option<String>,
}

/// Rule-based query classifier.
///
/// Categories are evaluated in a fixed priority order: greeting →
/// student search → skill → experience → education → contact, with
/// general-info as the fallback. Within a category the first matching
/// rule wins. The rule set is compiled once at construction and never
/// mutated.
pub struct DecisionEngine {
    greeting: Vec<Regex>,
    student: Vec<Regex>,
    skill: Vec<Regex>,
    skill_capture: Vec<Regex>,
    experience: Vec<Regex>,
    education: Vec<Regex>,
    contact: Vec<Regex>,
}

impl DecisionEngine {
    pub fn new() -> Result<Self> {
        Ok(Self {
            greeting: compile(&[
                r"^(?:hola|buenos?\s+días?|buenas?\s+tardes?|buenas?\s+noches?)",
                r"^(?:saludos?|hi|hello)",
                r"^(?:qué\s+tal|como\s+estas?|como\s+está)",
            ])?,
            // Each student rule captures the name in group 1.
            student: compile(&[
                r"busca[r]?\s+estudiante[s]?\s+(?:llamado[s]?|de nombre|que se llam[ae])\s+(\w+)",
                r"estudiante[s]?\s+(?:con nombre|llamado[s]?)\s+(\w+)",
                r"quien es\s+(\w+)",
                r"información de\s+(\w+)",
                r"datos de[l]?\s+estudiante\s+(\w+)",
            ])?,
            skill: compile(&[
                r"(?:habilidades?|skills?|competencias?|conocimientos?)",
                r"(?:sabe|conoce|domina)\s+(?:de\s+)?(\w+)",
                r"experiencia en\s+(\w+)",
                r"tecnolog[íi]as?\s+(?:que\s+)?(?:maneja|conoce|domina)",
            ])?,
            skill_capture: compile(&[
                r"(?:sabe|conoce|domina)\s+(?:de\s+)?(\w+)",
                r"experiencia en\s+(\w+)",
                r"conocimientos?\s+(?:de|en)\s+(\w+)",
            ])?,
            experience: compile(&[
                r"experiencia\s+laboral",
                r"(?:trabajos?|empleos?)\s+(?:anteriores?|previos?)",
                r"(?:dónde|donde)\s+(?:ha\s+)?trabajado",
                r"empresas?\s+(?:donde\s+ha\s+trabajado|en\s+las\s+que\s+trabajó)",
            ])?,
            education: compile(&[
                r"(?:educación|estudios?|formación)\s+(?:académica?)?",
                r"(?:universidad|carrera|titulo|grado)",
                r"(?:dónde|donde)\s+(?:estudió|estudia)",
                r"(?:qué|que)\s+(?:estudió|estudia|carrera)",
            ])?,
            contact: compile(&[
                r"(?:contacto|teléfono|email|correo|dirección)",
                r"(?:cómo|como)\s+(?:contactar|comunicarse)",
                r"datos\s+de\s+contacto",
            ])?,
        })
    }

    /// Classify a query. Total and deterministic: every input gets exactly
    /// one category, and the same text always yields the same result.
    pub fn classify(&self, query: &str) -> (QueryCategory, ExtractedEntities) {
        let query = query.trim().to_lowercase();
        let mut entities = ExtractedEntities::default();

        if matches_any(&self.greeting, &query) {
            return (QueryCategory::Greeting, entities);
        }

        if let Some(name) = capture_first(&self.student, &query) {
            entities.student_name = Some(name);
            return (QueryCategory::StudentSearch, entities);
        }

        if matches_any(&self.skill, &query) {
            // Capture is best-effort: a category match without a captured
            // skill still classifies as a skill query.
            entities.skill = capture_first(&self.skill_capture, &query);
            return (QueryCategory::SkillQuery, entities);
        }

        if matches_any(&self.experience, &query) {
            return (QueryCategory::ExperienceQuery, entities);
        }

        if matches_any(&self.education, &query) {
            return (QueryCategory::EducationQuery, entities);
        }

        if matches_any(&self.contact, &query) {
            return (QueryCategory::ContactQuery, entities);
        }

        (QueryCategory::GeneralInfo, entities)
    }
}

fn compile(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(&format!("(?i){p}")).with_context(|| format!("invalid rule pattern: {p}"))
        })
        .collect()
}

fn matches_any(rules: &[Regex], query: &str) -> bool {
    rules.iter().any(|r| r.is_match(query))
}

/// Return group 1 of the first rule that matches and captures.
fn capture_first(rules: &[Regex], query: &str) -> Option<String> {
    for rule in rules {
        if let Some(caps) = rule.captures(query) {
            if let Some(m) = caps.get(1) {
                return Some(m.as_str().trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DecisionEngine {
        DecisionEngine::new().unwrap()
    }

    // ─── Greetings ───────────────────────────────────────

    #[test]
    fn test_hola_is_greeting() {
        let (cat, entities) = engine().classify("Hola");
        assert_eq!(cat, QueryCategory::Greeting);
        assert_eq!(entities, ExtractedEntities::default());
    }

    #[test]
    fn test_greeting_variants() {
        let e = engine();
        for q in ["buenos días", "buenas tardes", "hello", "saludos", "qué tal"] {
            assert_eq!(e.classify(q).0, QueryCategory::Greeting, "query: {q}");
        }
    }

    #[test]
    fn test_greeting_must_be_anchored() {
        // "hola" mid-sentence is not a greeting
        let (cat, _) = engine().classify("dime si maria dijo hola");
        assert_ne!(cat, QueryCategory::Greeting);
    }

    // ─── Student search ──────────────────────────────────

    #[test]
    fn test_busca_estudiante_llamado_captures_name() {
        let (cat, entities) = engine().classify("busca estudiante llamado Pedro");
        assert_eq!(cat, QueryCategory::StudentSearch);
        assert_eq!(entities.student_name.as_deref(), Some("pedro"));
    }

    #[test]
    fn test_informacion_de_captures_name() {
        let (cat, entities) = engine().classify("Busca información de Maria");
        assert_eq!(cat, QueryCategory::StudentSearch);
        assert_eq!(entities.student_name.as_deref(), Some("maria"));
    }

    #[test]
    fn test_quien_es() {
        let (cat, entities) = engine().classify("quien es carlos");
        assert_eq!(cat, QueryCategory::StudentSearch);
        assert_eq!(entities.student_name.as_deref(), Some("carlos"));
    }

    // ─── Skills ──────────────────────────────────────────

    #[test]
    fn test_skill_query_with_capture() {
        let (cat, entities) = engine().classify("¿quién tiene experiencia en Python?");
        assert_eq!(cat, QueryCategory::SkillQuery);
        assert_eq!(entities.skill.as_deref(), Some("python"));
    }

    #[test]
    fn test_skill_query_without_capture() {
        let (cat, entities) = engine().classify("muéstrame las habilidades disponibles");
        assert_eq!(cat, QueryCategory::SkillQuery);
        assert_eq!(entities.skill, None);
    }

    #[test]
    fn test_conocimientos_en_captures_skill() {
        let (cat, entities) = engine().classify("qué estudiantes tienen conocimientos en SQL");
        assert_eq!(cat, QueryCategory::SkillQuery);
        assert_eq!(entities.skill.as_deref(), Some("sql"));
    }

    // ─── Experience / education / contact ────────────────

    #[test]
    fn test_experience_query() {
        let (cat, _) = engine().classify("muéstrame la experiencia laboral");
        assert_eq!(cat, QueryCategory::ExperienceQuery);
    }

    #[test]
    fn test_donde_ha_trabajado() {
        let (cat, _) = engine().classify("donde ha trabajado");
        assert_eq!(cat, QueryCategory::ExperienceQuery);
    }

    #[test]
    fn test_education_query() {
        let (cat, _) = engine().classify("en qué universidad estudió");
        assert_eq!(cat, QueryCategory::EducationQuery);
    }

    #[test]
    fn test_contact_query() {
        let (cat, _) = engine().classify("dame el correo del estudiante");
        assert_eq!(cat, QueryCategory::ContactQuery);
    }

    // ─── Fallback ────────────────────────────────────────

    #[test]
    fn test_gibberish_falls_to_general_info() {
        let (cat, entities) = engine().classify("asdkjhasd");
        assert_eq!(cat, QueryCategory::GeneralInfo);
        assert_eq!(entities, ExtractedEntities::default());
    }

    #[test]
    fn test_empty_and_whitespace_fall_to_general_info() {
        assert_eq!(engine().classify("").0, QueryCategory::GeneralInfo);
        assert_eq!(engine().classify("   \t ").0, QueryCategory::GeneralInfo);
    }

    // ─── Determinism / priority ──────────────────────────

    #[test]
    fn test_classification_is_idempotent() {
        let e = engine();
        let first = e.classify("busca estudiante llamado Ana");
        for _ in 0..5 {
            assert_eq!(e.classify("busca estudiante llamado Ana"), first);
        }
    }

    #[test]
    fn test_greeting_takes_priority_over_student() {
        // Starts with a greeting even though it also names a student
        let (cat, _) = engine().classify("hola, busca estudiante llamado Ana");
        assert_eq!(cat, QueryCategory::Greeting);
    }

    #[test]
    fn test_student_takes_priority_over_skill() {
        let (cat, entities) = engine().classify("datos del estudiante luis que sabe python");
        assert_eq!(cat, QueryCategory::StudentSearch);
        assert_eq!(entities.student_name.as_deref(), Some("luis"));
    }

    #[test]
    fn test_case_insensitive() {
        let (cat, entities) = engine().classify("BUSCA ESTUDIANTE LLAMADO JUAN");
        assert_eq!(cat, QueryCategory::StudentSearch);
        assert_eq!(entities.student_name.as_deref(), Some("juan"));
    }
}
