use anyhow::{Context, Result};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cv_search::api;
use cv_search::config::Config;
use cv_search::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    config.validate()?;

    let state = AppState::new(config).await?;
    let bind_addr = state.config.bind_addr.clone();

    let app = Router::new()
        .route("/", get(serve_index))
        .route("/api/query", post(api::query::query))
        .route("/api/ingest", post(api::documents::ingest))
        .route(
            "/api/documents",
            get(api::documents::list).delete(api::documents::clear),
        )
        .route("/api/status", get(api::documents::status))
        .route("/api/suggestions", get(api::documents::suggestions))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("listening on http://{bind_addr}");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}
