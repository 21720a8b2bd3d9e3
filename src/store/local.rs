use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::{CvMetadata, DocChunk, Passage, StoreStats};

use super::SearchFilter;

/// A stored vector entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChunk {
    content: String,
    metadata: CvMetadata,
    embedding: Vec<f32>,
}

/// In-memory vector index with disk persistence and cosine similarity search.
pub struct LocalIndex {
    entries: RwLock<Vec<StoredChunk>>,
    persist_path: std::path::PathBuf,
}

impl LocalIndex {
    pub fn open_or_create(vector_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(vector_dir)?;
        let persist_path = vector_dir.join("vectors.json");

        let entries = if persist_path.exists() {
            let data =
                std::fs::read_to_string(&persist_path).context("Failed to read vector index")?;
            match serde_json::from_str(&data) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        "Discarding unreadable vector index {}: {e}",
                        persist_path.display()
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            entries: RwLock::new(entries),
            persist_path,
        })
    }

    /// Add chunks with their embeddings. `embeddings` must be parallel
    /// with `chunks`.
    pub fn add(&self, chunks: &[DocChunk], embeddings: Vec<Vec<f32>>) -> Result<()> {
        let mut entries = self.entries.write();

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            entries.push(StoredChunk {
                content: chunk.content.clone(),
                metadata: chunk.metadata.clone(),
                embedding,
            });
        }

        self.persist(&entries)
    }

    /// Search by cosine similarity against a query embedding. The filter is
    /// applied to every entry before truncation, so a filtered match can
    /// never be displaced by higher-ranked non-matching entries.
    pub fn search(&self, query_embedding: &[f32], k: usize, filter: &SearchFilter) -> Vec<Passage> {
        let entries = self.entries.read();

        let mut scored: Vec<(f32, &StoredChunk)> = entries
            .iter()
            .filter(|e| filter.matches(&e.metadata))
            .map(|e| (cosine_similarity(query_embedding, &e.embedding), e))
            .collect();

        // Sort descending by score
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(score, e)| Passage {
                content: e.content.clone(),
                metadata: e.metadata.clone(),
                score,
            })
            .collect()
    }

    pub fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write();
        entries.clear();
        self.persist(&entries)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }

    pub fn stats(&self) -> StoreStats {
        let entries = self.entries.read();
        StoreStats {
            backend: "local".to_string(),
            total_vectors: entries.len(),
            dimension: entries.first().map(|e| e.embedding.len()).unwrap_or(0),
        }
    }

    /// Write the index to disk. Atomic via temp file + rename, so a crash
    /// mid-write leaves the previous index intact.
    fn persist(&self, entries: &[StoredChunk]) -> Result<()> {
        let data = serde_json::to_string(entries)?;
        let tmp = self.persist_path.with_extension("json.tmp");
        std::fs::write(&tmp, data).context("Failed to write vector index")?;
        std::fs::rename(&tmp, &self.persist_path).context("Failed to replace vector index")?;
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for i in 0..a.len() {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn chunk(content: &str, student: &str, skills: &[&str]) -> DocChunk {
        DocChunk {
            id: Uuid::new_v4(),
            content: content.to_string(),
            chunk_index: 0,
            total_chunks: 1,
            metadata: CvMetadata {
                filename: format!("cv_{}.pdf", student.to_lowercase()),
                student_name: student.to_string(),
                skills: skills.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalIndex::open_or_create(dir.path()).unwrap();
        let results = index.search(&[1.0, 0.0], 5, &SearchFilter::default());
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_ranks_by_cosine_similarity() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalIndex::open_or_create(dir.path()).unwrap();

        let chunks = vec![
            chunk("experiencia laboral de maria", "Maria", &["Python"]),
            chunk("educación de carlos", "Carlos", &["Java"]),
        ];
        let embeddings = vec![vec![0.9, 0.1, 0.0], vec![0.0, 0.1, 0.9]];
        index.add(&chunks, embeddings).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 5, &SearchFilter::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].metadata.student_name, "Maria");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_filter_applied_before_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalIndex::open_or_create(dir.path()).unwrap();

        // Three chunks very close to the query and one distant chunk that
        // is the only filter match. k=1 must return the match.
        let chunks = vec![
            chunk("a", "Ana", &[]),
            chunk("b", "Berta", &[]),
            chunk("c", "Clara", &[]),
            chunk("d", "Maria", &[]),
        ];
        let embeddings = vec![
            vec![1.0, 0.0],
            vec![0.99, 0.01],
            vec![0.98, 0.02],
            vec![0.0, 1.0],
        ];
        index.add(&chunks, embeddings).unwrap();

        let filter = SearchFilter {
            student_name: Some("maria".to_string()),
            skill: None,
        };
        let results = index.search(&[1.0, 0.0], 1, &filter);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.student_name, "Maria");
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let index = LocalIndex::open_or_create(dir.path()).unwrap();
            index
                .add(&[chunk("contenido", "Maria", &[])], vec![vec![0.5, 0.5]])
                .unwrap();
        }
        let reopened = LocalIndex::open_or_create(dir.path()).unwrap();
        assert_eq!(reopened.entry_count(), 1);
        let results = reopened.search(&[0.5, 0.5], 1, &SearchFilter::default());
        assert_eq!(results[0].metadata.student_name, "Maria");
    }

    #[test]
    fn test_clear_empties_index_and_disk() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalIndex::open_or_create(dir.path()).unwrap();
        index
            .add(&[chunk("x", "Ana", &[])], vec![vec![1.0]])
            .unwrap();
        assert_eq!(index.entry_count(), 1);

        index.clear().unwrap();
        assert_eq!(index.entry_count(), 0);

        let reopened = LocalIndex::open_or_create(dir.path()).unwrap();
        assert_eq!(reopened.entry_count(), 0);
    }

    #[test]
    fn test_corrupt_index_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vectors.json"), "{not json").unwrap();

        let index = LocalIndex::open_or_create(dir.path()).unwrap();
        assert_eq!(index.entry_count(), 0);

        // The index stays usable after discarding the bad file
        index
            .add(&[chunk("x", "Ana", &[])], vec![vec![1.0]])
            .unwrap();
        let reopened = LocalIndex::open_or_create(dir.path()).unwrap();
        assert_eq!(reopened.entry_count(), 1);
    }

    #[test]
    fn test_persist_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalIndex::open_or_create(dir.path()).unwrap();
        index
            .add(&[chunk("x", "Ana", &[])], vec![vec![1.0]])
            .unwrap();
        index.clear().unwrap();

        assert!(dir.path().join("vectors.json").exists());
        assert!(!dir.path().join("vectors.json.tmp").exists());
    }

    #[test]
    fn test_stats_reports_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalIndex::open_or_create(dir.path()).unwrap();
        assert_eq!(index.stats().dimension, 0);

        index
            .add(&[chunk("x", "Ana", &[])], vec![vec![0.0, 0.0, 1.0]])
            .unwrap();
        let stats = index.stats();
        assert_eq!(stats.backend, "local");
        assert_eq!(stats.total_vectors, 1);
        assert_eq!(stats.dimension, 3);
    }

    #[test]
    fn test_cosine_similarity_edge_cases() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        let sim = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }
}
