use super::classify::ExtractedEntities;

/// Response template selected by the strategy resolver. Non-default
/// templates frame the synthesized answer; the greeting template is a
/// complete canned answer on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTemplate {
    Greeting,
    StudentProfile,
    SkillFocused,
    ExperienceFocused,
    EducationFocused,
    ContactFocused,
    Default,
}

pub const GREETING_ANSWER: &str = "¡Hola! Soy tu asistente para consultas sobre CVs de estudiantes.\n\
Puedo ayudarte a:\n\
- Buscar información específica de estudiantes\n\
- Consultar habilidades y competencias\n\
- Revisar experiencia laboral\n\
- Verificar información educativa\n\
- Obtener datos de contacto\n\n\
¿En qué puedo ayudarte hoy?";

impl ResponseTemplate {
    /// Wrap a synthesized answer in the template's framing. The default
    /// template passes the answer through untouched.
    pub fn wrap(&self, answer: &str, entities: &ExtractedEntities) -> String {
        match self {
            ResponseTemplate::Greeting => GREETING_ANSWER.to_string(),
            ResponseTemplate::StudentProfile => {
                let name = entities.student_name.as_deref().unwrap_or("el estudiante");
                format!(
                    "Basándome en la información encontrada sobre {name}:\n\n{answer}\n\n\
                     Esta información proviene de los CVs almacenados en nuestra base de datos."
                )
            }
            ResponseTemplate::SkillFocused => {
                let skill = entities.skill.as_deref().unwrap_or("las tecnologías consultadas");
                format!(
                    "Información sobre habilidades en {skill}:\n\n{answer}\n\n\
                     Estos datos han sido extraídos de los CVs de estudiantes disponibles."
                )
            }
            ResponseTemplate::ExperienceFocused => format!(
                "Información sobre experiencia laboral:\n\n{answer}\n\n\
                 Datos recopilados de los CVs de estudiantes."
            ),
            ResponseTemplate::EducationFocused => format!(
                "Información educativa encontrada:\n\n{answer}\n\n\
                 Información extraída de los CVs académicos."
            ),
            ResponseTemplate::ContactFocused => format!(
                "Datos de contacto disponibles:\n\n{answer}\n\n\
                 Información de contacto de los CVs."
            ),
            ResponseTemplate::Default => answer.to_string(),
        }
    }
}
