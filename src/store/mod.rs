//! Vector store with two interchangeable backends: a local in-memory index
//! persisted to disk and a managed Pinecone index. The backend is chosen
//! once at construction; a remote connection failure falls back to the
//! local index with an advisory log, never a hard stop.

pub mod local;
pub mod pinecone;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::models::{CvMetadata, DocChunk, Passage, StoreStats};
use local::LocalIndex;
use pinecone::PineconeIndex;

/// Predicate over chunk metadata used to narrow search results. Fields
/// combine as a conjunction; an empty filter accepts everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Case-insensitive substring match against the student name.
    pub student_name: Option<String>,
    /// Case-insensitive substring match against the joined skill list.
    pub skill: Option<String>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.student_name.is_none() && self.skill.is_none()
    }

    /// Evaluate the filter against a chunk's metadata. Backend-agnostic:
    /// both backends accept exactly the chunks this returns true for.
    pub fn matches(&self, metadata: &CvMetadata) -> bool {
        if let Some(name) = &self.student_name {
            if !metadata
                .student_name
                .to_lowercase()
                .contains(&name.to_lowercase())
            {
                return false;
            }
        }
        if let Some(skill) = &self.skill {
            let skills = metadata.skills.join(" ").to_lowercase();
            if !skills.contains(&skill.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// The configured vector backend, fixed for the process lifetime.
pub enum VectorStore {
    Local(LocalIndex),
    Pinecone(PineconeIndex),
}

impl VectorStore {
    /// Construct the store. Tries Pinecone when credentials are configured;
    /// on any connection failure falls back to the local index so the
    /// service stays available.
    pub async fn connect(client: &reqwest::Client, config: &Config) -> Result<Self> {
        if config.pinecone.index_host.is_some() {
            match PineconeIndex::connect(client.clone(), &config.pinecone).await {
                Ok(index) => {
                    tracing::info!("Connected to Pinecone index {}", config.pinecone.index_name);
                    return Ok(VectorStore::Pinecone(index));
                }
                Err(e) => {
                    tracing::warn!("Pinecone unavailable, falling back to local index: {e:#}");
                }
            }
        }

        let index = LocalIndex::open_or_create(&config.vector_dir())?;
        tracing::info!("Using local vector index ({} entries)", index.entry_count());
        Ok(VectorStore::Local(index))
    }

    /// Add chunks with their embeddings. `embeddings` must be parallel
    /// with `chunks`.
    pub async fn add(&self, chunks: &[DocChunk], embeddings: Vec<Vec<f32>>) -> Result<()> {
        match self {
            VectorStore::Local(index) => index.add(chunks, embeddings),
            VectorStore::Pinecone(index) => index.add(chunks, embeddings).await,
        }
    }

    /// Search by similarity against a query embedding, highest score first.
    /// An empty index yields an empty list, never an error.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<Passage>> {
        match self {
            VectorStore::Local(index) => Ok(index.search(query_embedding, k, filter)),
            VectorStore::Pinecone(index) => index.search(query_embedding, k, filter).await,
        }
    }

    /// Remove every vector from the index.
    pub async fn clear(&self) -> Result<()> {
        match self {
            VectorStore::Local(index) => index.clear(),
            VectorStore::Pinecone(index) => index.clear().await,
        }
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        match self {
            VectorStore::Local(index) => Ok(index.stats()),
            VectorStore::Pinecone(index) => index.stats().await,
        }
    }
}
