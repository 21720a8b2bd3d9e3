use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::QueryCategory;

/// Metadata extracted from a single CV, copied onto every chunk of that CV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvMetadata {
    pub filename: String,
    pub student_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
}

/// A bounded-size slice of a CV's extracted text, the unit of retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocChunk {
    pub id: Uuid,
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub metadata: CvMetadata,
}

/// A retrieved chunk with its similarity score, produced fresh per query.
#[derive(Debug, Clone, Serialize)]
pub struct Passage {
    pub content: String,
    pub metadata: CvMetadata,
    pub score: f32,
}

/// Coarse, rule-derived indicator of answer trustworthiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    /// Synthesis or retrieval failed; the answer is a fixed apology.
    Error,
}

/// Query request
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

/// Query response
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub query_type: QueryCategory,
    /// Source filenames, deduplicated; order not significant.
    pub sources: Vec<String>,
    pub confidence: Confidence,
}

/// Ingest request. `directory` overrides the configured PDF directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestRequest {
    pub directory: Option<String>,
}

/// Aggregate statistics over a batch of processed chunks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub total_chunks: usize,
    pub total_files: usize,
    pub total_students: usize,
    pub students: Vec<String>,
    /// (skill, occurrence count), most frequent first, top 10.
    pub top_skills: Vec<(String, usize)>,
}

/// Ingest response
#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    pub message: String,
    pub stats: IngestStats,
}

/// A CV that has been ingested into the index, tracked for the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestedFile {
    pub filename: String,
    pub student_name: String,
    /// Skills extracted from the CV, kept so suggestions survive a restart.
    #[serde(default)]
    pub skills: Vec<String>,
    pub chunk_count: usize,
    pub ingested_at: DateTime<Utc>,
}

/// Vector backend statistics as reported by `GET /api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub backend: String,
    pub total_vectors: usize,
    pub dimension: usize,
}

/// System status response
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub store: StoreStats,
    pub documents: usize,
    pub chat_model: String,
    pub embedding_model: String,
}

/// Suggested queries response
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}
