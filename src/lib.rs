//! # cv-search
//!
//! A Rust web application for ingesting PDF CVs and answering natural
//! language questions about them with a retrieval-augmented pipeline.
//!
//! ## Architecture
//!
//! Each query runs through a single synchronous pass:
//!
//! ```text
//!                  ┌──────────────┐
//!                  │  User Query  │
//!                  └──────┬───────┘
//!                         │
//!                         ▼
//!             ┌───────────────────────┐
//!             │   Query Classifier    │
//!             │  ordered regex rules, │
//!             │  first match wins     │
//!             └───────────┬───────────┘
//!                         │ (category, entities)
//!                         ▼
//!             ┌───────────────────────┐
//!             │   Strategy Resolver   │
//!             │  category → k, filter,│
//!             │  response template    │
//!             └───────────┬───────────┘
//!                         │ greeting? ──► canned answer
//!                         ▼
//!             ┌───────────────────────┐
//!             │     Vector Store      │
//!             │  local / Pinecone,    │
//!             │  cosine top-k + filter│
//!             └───────────┬───────────┘
//!                         │ passages (empty ──► "no info" answer)
//!                         ▼
//!             ┌───────────────────────┐
//!             │   Answer Synthesis    │
//!             │  one LLM call, no     │
//!             │  retries; failure ──► │
//!             │  apology + "error"    │
//!             └───────────┬───────────┘
//!                         │
//!                         ▼
//!             ┌───────────────────────┐
//!             │ answer + confidence + │
//!             │ deduplicated sources  │
//!             └───────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, storage, and LLM settings
//! - [`models`] - Shared data types: chunks, passages, request/response types
//! - [`engine`] - Query classification and retrieval strategy resolution
//! - [`store`] - Vector store with local in-memory and Pinecone backends
//! - [`llm`] - Embedding generation and chat completion via Ollama or OpenAI-compatible APIs
//! - [`ingest`] - PDF text extraction, CV metadata extraction, and chunking
//! - [`agent`] - Per-query orchestration: retrieve, synthesize, label confidence
//! - [`api`] - Axum HTTP handlers for querying and document management
//! - [`state`] - Shared application state holding the store, config, and bookkeeping

pub mod agent;
pub mod api;
pub mod config;
pub mod engine;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod state;
pub mod store;
