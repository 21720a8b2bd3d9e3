//! Decision engine: query classification and retrieval strategy resolution.
//!
//! The classifier is an ordered table of regex rules evaluated
//! first-match-wins; the resolver is a pure per-category lookup. Neither
//! touches the network or the store.

pub mod classify;
pub mod strategy;
pub mod templates;

pub use classify::{DecisionEngine, ExtractedEntities};
pub use strategy::{resolve, SearchStrategy};
pub use templates::ResponseTemplate;

use serde::{Deserialize, Serialize};

/// Category assigned to a query. Assignment is total: every query gets
/// exactly one, with `GeneralInfo` as the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    Greeting,
    StudentSearch,
    SkillQuery,
    ExperienceQuery,
    EducationQuery,
    ContactQuery,
    GeneralInfo,
    /// Reserved; the classifier never emits this (it degrades to
    /// `GeneralInfo`), but callers may carry it and the resolver maps it
    /// like the fallback.
    Unknown,
}
