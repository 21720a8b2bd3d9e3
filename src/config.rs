use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where index data and document bookkeeping are stored
    pub data_dir: PathBuf,
    /// Directory scanned for CV PDFs on ingest
    pub pdf_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Characters per chunk when splitting extracted text
    pub chunk_size: usize,
    /// Overlap in characters between consecutive chunks
    pub chunk_overlap: usize,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Pinecone backend configuration (local index when unset)
    pub pinecone: PineconeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai" (any OpenAI-compatible API, e.g. Groq)
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for answer synthesis
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Sampling temperature for answer synthesis
    pub temperature: f32,
    /// Token cap for answer synthesis
    pub max_tokens: u32,
}

/// Configuration for the managed Pinecone index. The remote backend is only
/// attempted when both `api_key` and `index_host` are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    pub api_key: Option<String>,
    /// Index host, e.g. "https://cv-index-abc123.svc.us-east-1-aws.pinecone.io"
    pub index_host: Option<String>,
    pub index_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            pdf_dir: PathBuf::from("./cvs"),
            bind_addr: "127.0.0.1:9000".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            llm: LlmConfig::default(),
            pinecone: PineconeConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.2".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            api_key: None,
            temperature: 0.1,
            max_tokens: 1024,
        }
    }
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index_host: None,
            index_name: "student-cv-index".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("CV_SEARCH_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("CV_SEARCH_PDF_DIR") {
            config.pdf_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("CV_SEARCH_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(val) = std::env::var("CV_SEARCH_CHUNK_SIZE") {
            if let Ok(v) = val.parse() {
                config.chunk_size = v;
            }
        }
        if let Ok(val) = std::env::var("CV_SEARCH_CHUNK_OVERLAP") {
            if let Ok(v) = val.parse() {
                config.chunk_overlap = v;
            }
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(val) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(t) = val.parse() {
                config.llm.temperature = t;
            }
        }
        if let Ok(val) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(t) = val.parse() {
                config.llm.max_tokens = t;
            }
        }
        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            config.pinecone.api_key = Some(key);
        }
        if let Ok(host) = std::env::var("PINECONE_INDEX_HOST") {
            config.pinecone.index_host = Some(host);
        }
        if let Ok(name) = std::env::var("PINECONE_INDEX_NAME") {
            config.pinecone.index_name = name;
        }

        config
    }

    /// Validate required credentials. This is the only hard startup failure:
    /// everything downstream degrades to a user-facing message instead.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.llm.provider == "openai" && self.llm.api_key.as_deref().unwrap_or("").is_empty() {
            anyhow::bail!("LLM_API_KEY is required when LLM_PROVIDER is \"openai\"");
        }
        if self.pinecone.index_host.is_some()
            && self.pinecone.api_key.as_deref().unwrap_or("").is_empty()
        {
            anyhow::bail!("PINECONE_API_KEY is required when PINECONE_INDEX_HOST is set");
        }
        if self.chunk_overlap >= self.chunk_size {
            anyhow::bail!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap,
                self.chunk_size
            );
        }
        Ok(())
    }

    pub fn vector_dir(&self) -> PathBuf {
        self.data_dir.join("vectors")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("documents.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_openai_without_key_rejected() {
        let mut config = Config::default();
        config.llm.provider = "openai".to_string();
        assert!(config.validate().is_err());
        config.llm.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pinecone_host_without_key_rejected() {
        let mut config = Config::default();
        config.pinecone.index_host = Some("https://example.pinecone.io".to_string());
        assert!(config.validate().is_err());
        config.pinecone.api_key = Some("pc-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_below_chunk_size() {
        let mut config = Config::default();
        config.chunk_overlap = config.chunk_size;
        assert!(config.validate().is_err());
    }
}
