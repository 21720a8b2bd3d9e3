use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::info;

use super::internal_error;
use crate::ingest::{self, CvProcessor};
use crate::llm::embeddings;
use crate::models::{
    DocChunk, IngestRequest, IngestResponse, IngestedFile, StatusResponse, SuggestionsResponse,
};
use crate::state::AppState;

/// `POST /api/ingest` — process a directory of PDF CVs into the index.
/// Only one ingest may run at a time; a concurrent request gets a 409.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    body: Option<Json<IngestRequest>>,
) -> Result<Json<IngestResponse>, (StatusCode, String)> {
    let _permit = state.ingest_lock.try_acquire().map_err(|_| {
        (
            StatusCode::CONFLICT,
            "an ingest is already running".to_string(),
        )
    })?;

    let req = body.map(|Json(req)| req).unwrap_or_default();
    let dir = req
        .directory
        .map(PathBuf::from)
        .unwrap_or_else(|| state.config.pdf_dir.clone());

    // PDF parsing is CPU-bound; keep it off the async runtime
    let chunk_size = state.config.chunk_size;
    let chunk_overlap = state.config.chunk_overlap;
    let scan_dir = dir.clone();
    let chunks: Vec<DocChunk> = tokio::task::spawn_blocking(move || {
        let processor = CvProcessor::new(chunk_size, chunk_overlap)?;
        processor.process_directory(&scan_dir)
    })
    .await
    .map_err(|e| internal_error(e.into()))?
    .map_err(internal_error)?;

    if chunks.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("no readable PDF files found in {}", dir.display()),
        ));
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = embeddings::embed_batch(&state.http_client, &state.config.llm, &texts)
        .await
        .map_err(internal_error)?;
    state
        .store
        .add(&chunks, embeddings)
        .await
        .map_err(internal_error)?;

    let stats = ingest::compute_stats(&chunks);
    update_document_list(&state, &chunks);
    state.persist_documents().map_err(internal_error)?;

    info!(
        files = stats.total_files,
        chunks = stats.total_chunks,
        "ingest complete"
    );
    Ok(Json(IngestResponse {
        message: format!(
            "Ingesta completada: {} archivos, {} fragmentos",
            stats.total_files, stats.total_chunks
        ),
        stats,
    }))
}

fn update_document_list(state: &AppState, chunks: &[DocChunk]) {
    let mut files: Vec<IngestedFile> = Vec::new();
    for chunk in chunks {
        match files.iter_mut().find(|f| f.filename == chunk.metadata.filename) {
            Some(file) => file.chunk_count += 1,
            None => files.push(IngestedFile {
                filename: chunk.metadata.filename.clone(),
                student_name: chunk.metadata.student_name.clone(),
                skills: chunk.metadata.skills.clone(),
                chunk_count: 1,
                ingested_at: Utc::now(),
            }),
        }
    }

    let mut documents = state.documents.write();
    for file in files {
        documents.retain(|d| d.filename != file.filename);
        documents.push(file);
    }
}

/// `GET /api/documents` — list the CVs currently in the index.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<IngestedFile>> {
    Json(state.documents.read().clone())
}

/// `DELETE /api/documents` — drop every vector and the document list.
pub async fn clear(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state.store.clear().await.map_err(internal_error)?;
    state.documents.write().clear();
    state.persist_documents().map_err(internal_error)?;

    info!("index cleared");
    Ok(Json(serde_json::json!({ "message": "índice vaciado" })))
}

/// `GET /api/status` — backend, vector count, and configured models.
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, (StatusCode, String)> {
    let store = state.store.stats().await.map_err(internal_error)?;
    let documents = state.documents.read().len();
    Ok(Json(StatusResponse {
        store,
        documents,
        chat_model: state.config.llm.chat_model.clone(),
        embedding_model: state.config.llm.embedding_model.clone(),
    }))
}

/// `GET /api/suggestions` — example questions seeded from the corpus.
pub async fn suggestions(State(state): State<Arc<AppState>>) -> Json<SuggestionsResponse> {
    let stats = {
        let documents = state.documents.read();
        ingest::stats_from_documents(&documents)
    };
    Json(SuggestionsResponse {
        suggestions: ingest::suggest_queries(&stats),
    })
}
