use super::classify::ExtractedEntities;
use super::templates::ResponseTemplate;
use super::QueryCategory;
use crate::store::SearchFilter;

/// Retrieval strategy derived from a classified query. Constructed once
/// per query and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStrategy {
    /// Answer from a canned template without touching the index.
    Direct { template: ResponseTemplate },
    /// Retrieve passages and synthesize an answer.
    Retrieve {
        /// Number of passages to retrieve; always > 0.
        max_results: usize,
        filter: SearchFilter,
        template: ResponseTemplate,
    },
}

impl SearchStrategy {
    pub fn template(&self) -> ResponseTemplate {
        match self {
            SearchStrategy::Direct { template } => *template,
            SearchStrategy::Retrieve { template, .. } => *template,
        }
    }
}

/// Map a category and its extracted entities to a retrieval strategy.
/// Pure: no side effects, no network or storage access.
pub fn resolve(category: QueryCategory, entities: &ExtractedEntities) -> SearchStrategy {
    match category {
        QueryCategory::Greeting => SearchStrategy::Direct {
            template: ResponseTemplate::Greeting,
        },
        QueryCategory::StudentSearch => SearchStrategy::Retrieve {
            max_results: 1,
            filter: SearchFilter {
                student_name: entities.student_name.clone(),
                skill: None,
            },
            template: ResponseTemplate::StudentProfile,
        },
        QueryCategory::SkillQuery => SearchStrategy::Retrieve {
            max_results: 3,
            filter: SearchFilter {
                student_name: None,
                skill: entities.skill.clone(),
            },
            template: ResponseTemplate::SkillFocused,
        },
        QueryCategory::ExperienceQuery => SearchStrategy::Retrieve {
            max_results: 5,
            filter: SearchFilter::default(),
            template: ResponseTemplate::ExperienceFocused,
        },
        QueryCategory::EducationQuery => SearchStrategy::Retrieve {
            max_results: 5,
            filter: SearchFilter::default(),
            template: ResponseTemplate::EducationFocused,
        },
        QueryCategory::ContactQuery => SearchStrategy::Retrieve {
            max_results: 3,
            filter: SearchFilter::default(),
            template: ResponseTemplate::ContactFocused,
        },
        QueryCategory::GeneralInfo | QueryCategory::Unknown => SearchStrategy::Retrieve {
            max_results: 5,
            filter: SearchFilter::default(),
            template: ResponseTemplate::Default,
        },
    }
}
