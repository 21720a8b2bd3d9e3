//! HTTP handlers. Each handler returns `Result<Json<T>, (StatusCode,
//! String)>`; errors map to plain-text status responses.

pub mod documents;
pub mod query;

use axum::http::StatusCode;

pub(crate) fn internal_error(err: anyhow::Error) -> (StatusCode, String) {
    tracing::error!("internal error: {err:#}");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
}
