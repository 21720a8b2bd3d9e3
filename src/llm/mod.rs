//! LLM client plumbing: batch embeddings and single-shot chat completion
//! against Ollama or any OpenAI-compatible API.

pub mod embeddings;
pub mod generate;
