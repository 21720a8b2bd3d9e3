use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::agent;
use crate::models::{QueryRequest, QueryResponse};
use crate::state::AppState;

/// `POST /api/query` — answer a question about the ingested CVs.
///
/// Failures inside the pipeline come back as a 200 with confidence
/// `error`; only an empty question is rejected outright.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, String)> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "question must not be empty".to_string(),
        ));
    }

    Ok(Json(agent::answer(&state, question).await))
}
