use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::PineconeConfig;
use crate::models::{CvMetadata, DocChunk, Passage, StoreStats};

use super::SearchFilter;

/// Maximum bytes of chunk text stored in Pinecone metadata.
const MAX_METADATA_TEXT: usize = 1000;

/// Vectors per upsert request.
const UPSERT_BATCH: usize = 100;

/// Managed Pinecone index accessed over its HTTP API.
pub struct PineconeIndex {
    client: reqwest::Client,
    host: String,
    api_key: String,
}

#[derive(Serialize)]
struct UpsertRequest {
    vectors: Vec<PineconeVector>,
}

#[derive(Clone, Serialize)]
struct PineconeVector {
    id: String,
    values: Vec<f32>,
    metadata: PineconeMetadata,
}

/// Chunk metadata flattened into Pinecone's key/value model. The chunk
/// text rides along (truncated) so search results are self-contained.
#[derive(Clone, Serialize, Deserialize)]
struct PineconeMetadata {
    text: String,
    filename: String,
    student_name: String,
    #[serde(default)]
    skills: Vec<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    score: f32,
    metadata: Option<PineconeMetadata>,
}

#[derive(Deserialize)]
struct StatsResponse {
    #[serde(rename = "totalVectorCount", default)]
    total_vector_count: usize,
    #[serde(default)]
    dimension: usize,
}

impl PineconeIndex {
    /// Connect and verify the index is reachable. Errors here are the
    /// caller's cue to fall back to the local backend.
    pub async fn connect(client: reqwest::Client, config: &PineconeConfig) -> Result<Self> {
        let host = config
            .index_host
            .clone()
            .context("Pinecone index host not configured")?;
        let api_key = config
            .api_key
            .clone()
            .context("Pinecone API key not configured")?;

        let index = Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            api_key,
        };

        // Reachability probe; also validates credentials.
        index.stats().await.context("Pinecone index unreachable")?;
        Ok(index)
    }

    pub async fn add(&self, chunks: &[DocChunk], embeddings: Vec<Vec<f32>>) -> Result<()> {
        let vectors: Vec<PineconeVector> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, values)| PineconeVector {
                id: chunk.id.to_string(),
                values,
                metadata: PineconeMetadata {
                    text: truncate_bytes(&chunk.content, MAX_METADATA_TEXT),
                    filename: chunk.metadata.filename.clone(),
                    student_name: chunk.metadata.student_name.clone(),
                    skills: chunk.metadata.skills.clone(),
                },
            })
            .collect();

        for batch in vectors.chunks(UPSERT_BATCH) {
            let resp = self
                .client
                .post(format!("{}/vectors/upsert", self.host))
                .header("Api-Key", &self.api_key)
                .json(&UpsertRequest {
                    vectors: batch.to_vec(),
                })
                .send()
                .await
                .context("Failed to call Pinecone upsert API")?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("Pinecone upsert returned {status}: {body}");
            }
        }

        Ok(())
    }

    /// Query the index. The name filter is pushed down natively; the skill
    /// substring filter has no Pinecone operator, so the query overfetches
    /// 2k candidates and applies the same predicate client-side.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<Passage>> {
        let mut body = json!({
            "vector": query_embedding,
            "topK": k * 2,
            "includeMetadata": true,
        });
        if let Some(name) = &filter.student_name {
            body["filter"] = json!({ "student_name": { "$eq": name } });
        }

        let resp = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to call Pinecone query API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Pinecone query returned {status}: {body}");
        }

        let parsed: QueryResponse = resp
            .json()
            .await
            .context("Failed to parse Pinecone query response")?;

        let mut passages: Vec<Passage> = parsed
            .matches
            .into_iter()
            .filter_map(|m| {
                let meta = m.metadata?;
                let metadata = CvMetadata {
                    filename: meta.filename,
                    student_name: meta.student_name,
                    skills: meta.skills,
                    ..Default::default()
                };
                // Same predicate the local backend uses; the pushed-down
                // name filter already passes it.
                if !filter.matches(&metadata) {
                    return None;
                }
                Some(Passage {
                    content: meta.text,
                    metadata,
                    score: m.score,
                })
            })
            .collect();

        passages.truncate(k);
        Ok(passages)
    }

    pub async fn clear(&self) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/vectors/delete", self.host))
            .header("Api-Key", &self.api_key)
            .json(&json!({ "deleteAll": true }))
            .send()
            .await
            .context("Failed to call Pinecone delete API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Pinecone delete returned {status}: {body}");
        }

        Ok(())
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        let resp = self
            .client
            .post(format!("{}/describe_index_stats", self.host))
            .header("Api-Key", &self.api_key)
            .json(&json!({}))
            .send()
            .await
            .context("Failed to call Pinecone stats API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Pinecone stats returned {status}: {body}");
        }

        let parsed: StatsResponse = resp
            .json()
            .await
            .context("Failed to parse Pinecone stats response")?;

        Ok(StoreStats {
            backend: "pinecone".to_string(),
            total_vectors: parsed.total_vector_count,
            dimension: parsed.dimension,
        })
    }
}

/// Truncate to at most `max` bytes on a char boundary.
fn truncate_bytes(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text() {
        assert_eq!(truncate_bytes("hola", 100), "hola");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let text = "educación y más texto".repeat(100);
        let out = truncate_bytes(&text, MAX_METADATA_TEXT);
        assert!(out.len() <= MAX_METADATA_TEXT);
        assert!(text.is_char_boundary(out.len()));
    }

    #[test]
    fn test_query_response_parses_without_metadata() {
        let json = r#"{"matches":[{"id":"a","score":0.9}]}"#;
        let parsed: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.matches.len(), 1);
        assert!(parsed.matches[0].metadata.is_none());
    }

    #[test]
    fn test_stats_response_parses_pinecone_shape() {
        let json = r#"{"namespaces":{},"dimension":768,"totalVectorCount":42}"#;
        let parsed: StatsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.total_vector_count, 42);
        assert_eq!(parsed.dimension, 768);
    }
}
