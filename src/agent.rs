//! Query orchestration: classify the question, resolve a retrieval
//! strategy, search the vector store, and synthesize a grounded answer.
//! Any retrieval or synthesis failure degrades to a fixed apology with
//! confidence `error`; the endpoint itself never fails.

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::engine::templates::GREETING_ANSWER;
use crate::engine::{resolve, ExtractedEntities, ResponseTemplate, SearchStrategy};
use crate::llm;
use crate::models::{Confidence, Passage, QueryResponse};
use crate::state::AppState;
use crate::store::SearchFilter;

/// Answer when retrieval returns nothing.
pub const NO_RESULTS_ANSWER: &str =
    "Lo siento, no encontré información relevante para tu consulta en los CVs almacenados.";

/// Answer when retrieval or synthesis fails.
pub const FAILURE_ANSWER: &str =
    "Lo siento, ocurrió un error al generar la respuesta. Por favor, intenta de nuevo.";

/// Most of a passage is noise past this point; keep prompts bounded.
const CONTEXT_CHARS_PER_PASSAGE: usize = 500;

/// Answer a user question end to end.
pub async fn answer(state: &AppState, question: &str) -> QueryResponse {
    let (category, entities) = state.engine.classify(question);
    let strategy = resolve(category, &entities);
    info!(?category, "classified query");

    let (max_results, filter, template) = match strategy {
        SearchStrategy::Direct { .. } => {
            return QueryResponse {
                answer: GREETING_ANSWER.to_string(),
                query_type: category,
                sources: Vec::new(),
                confidence: Confidence::High,
            };
        }
        SearchStrategy::Retrieve {
            max_results,
            filter,
            template,
        } => (max_results, filter, template),
    };

    match synthesize(state, question, max_results, &filter, template, &entities).await {
        Ok((answer, sources, confidence)) => QueryResponse {
            answer,
            query_type: category,
            sources,
            confidence,
        },
        Err(err) => {
            error!("query failed: {err:#}");
            QueryResponse {
                answer: FAILURE_ANSWER.to_string(),
                query_type: category,
                sources: Vec::new(),
                confidence: Confidence::Error,
            }
        }
    }
}

async fn synthesize(
    state: &AppState,
    question: &str,
    max_results: usize,
    filter: &SearchFilter,
    template: ResponseTemplate,
    entities: &ExtractedEntities,
) -> Result<(String, Vec<String>, Confidence)> {
    let embedding = llm::embeddings::embed_single(&state.http_client, &state.config.llm, question)
        .await
        .context("failed to embed query")?;

    let passages = state
        .store
        .search(&embedding, max_results, filter)
        .await
        .context("vector search failed")?;

    if passages.is_empty() {
        return Ok((NO_RESULTS_ANSWER.to_string(), Vec::new(), Confidence::Low));
    }

    let context = build_context(&passages);
    let prompt = build_prompt(&context, question);
    let raw = llm::generate::complete(&state.http_client, &state.config.llm, &prompt)
        .await
        .context("answer synthesis failed")?;

    let answer = template.wrap(raw.trim(), entities);
    let confidence = label_confidence(&context, &answer);
    let sources = collect_sources(&passages);
    Ok((answer, sources, confidence))
}

/// Format retrieved passages into the context block of the prompt.
fn build_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "DOCUMENTO {}:\nArchivo: {}\nEstudiante: {}\nContenido: {}\nPuntuación: {:.3}\n---",
                i + 1,
                p.metadata.filename,
                p.metadata.student_name,
                truncate_chars(&p.content, CONTEXT_CHARS_PER_PASSAGE),
                p.score,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Eres un asistente especializado en responder preguntas sobre CVs de estudiantes.\n\n\
         Contexto de los CVs:\n{context}\n\n\
         Pregunta: {question}\n\n\
         Instrucciones:\n\
         - Responde únicamente con la información del contexto\n\
         - Si la información no está en el contexto, responde \"Desconocido\"\n\
         - Sé conciso y preciso\n\n\
         Respuesta:"
    )
}

/// Rule-derived confidence: a long context the model did not punt on is
/// high, a moderate one is medium, anything else is low.
fn label_confidence(context: &str, answer: &str) -> Confidence {
    let context_len = context.chars().count();
    if context_len > 1000 && !answer.contains("Desconocido") {
        Confidence::High
    } else if context_len > 500 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Filenames backing the answer, deduplicated in retrieval order.
fn collect_sources(passages: &[Passage]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for passage in passages {
        if !sources.contains(&passage.metadata.filename) {
            sources.push(passage.metadata.filename.clone());
        }
    }
    sources
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
