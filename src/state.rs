use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::engine::DecisionEngine;
use crate::models::IngestedFile;
use crate::store::VectorStore;

/// Shared application state, wrapped in an `Arc` by the router.
pub struct AppState {
    pub config: Config,
    pub engine: DecisionEngine,
    pub store: VectorStore,
    /// CVs currently in the index, persisted to `documents.json`.
    pub documents: RwLock<Vec<IngestedFile>>,
    pub http_client: reqwest::Client,
    /// Single permit; a second concurrent ingest gets 409 instead of
    /// racing the first one.
    pub ingest_lock: Semaphore,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;

        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .context("failed to build http client")?;

        let store = VectorStore::connect(&http_client, &config).await?;
        let documents = load_documents(&config.db_path())?;

        Ok(Arc::new(Self {
            config,
            engine: DecisionEngine::new()?,
            store,
            documents: RwLock::new(documents),
            http_client,
            ingest_lock: Semaphore::new(1),
        }))
    }

    /// Write the document list to disk. Atomic via temp file + rename.
    pub fn persist_documents(&self) -> Result<()> {
        let path = self.config.db_path();
        let json = {
            let documents = self.documents.read();
            serde_json::to_string_pretty(&*documents)?
        };

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}

fn load_documents(path: &Path) -> Result<Vec<IngestedFile>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_load_documents_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let docs = load_documents(&dir.path().join("documents.json")).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_load_documents_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");
        let docs = vec![IngestedFile {
            filename: "cv_ana.pdf".to_string(),
            student_name: "Ana Torres".to_string(),
            skills: vec!["Python".to_string()],
            chunk_count: 4,
            ingested_at: Utc::now(),
        }];
        std::fs::write(&path, serde_json::to_string(&docs).unwrap()).unwrap();

        let loaded = load_documents(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].filename, "cv_ana.pdf");
        assert_eq!(loaded[0].skills, vec!["Python".to_string()]);
    }

    #[test]
    fn test_load_documents_rejects_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_documents(&path).is_err());
    }
}
