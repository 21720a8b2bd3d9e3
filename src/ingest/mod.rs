//! PDF ingestion pipeline: read CVs from disk, pull out structured
//! metadata, and split the text into overlapping chunks ready for
//! embedding.

pub mod chunk;
pub mod metadata;
pub mod pdf;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{CvMetadata, DocChunk, IngestStats, IngestedFile};
use metadata::{CvExtractor, UNKNOWN_NAME};

pub struct CvProcessor {
    chunk_size: usize,
    chunk_overlap: usize,
    extractor: CvExtractor,
}

impl CvProcessor {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Ok(Self {
            chunk_size,
            chunk_overlap,
            extractor: CvExtractor::new()?,
        })
    }

    /// Process every `.pdf` under `dir` into chunks. Unreadable or empty
    /// files are logged and skipped rather than failing the whole run.
    pub fn process_directory(&self, dir: &Path) -> Result<Vec<DocChunk>> {
        let mut pdf_paths: Vec<_> = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read pdf directory {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
            })
            .collect();
        pdf_paths.sort();

        let mut chunks = Vec::new();
        for path in &pdf_paths {
            match self.process_file(path) {
                Ok(file_chunks) => {
                    info!(file = %path.display(), chunks = file_chunks.len(), "processed cv");
                    chunks.extend(file_chunks);
                }
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "skipping cv");
                }
            }
        }
        Ok(chunks)
    }

    pub fn process_file(&self, path: &Path) -> Result<Vec<DocChunk>> {
        let text = pdf::extract_text(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.process_text(&text, &filename)
    }

    /// Chunk already-extracted text. Split out from `process_file` so the
    /// pipeline can be exercised without real PDF fixtures.
    pub fn process_text(&self, text: &str, filename: &str) -> Result<Vec<DocChunk>> {
        if text.trim().is_empty() {
            anyhow::bail!("no text extracted from {filename}");
        }

        let metadata = self.extractor.extract(text, filename);
        let pieces = chunk::split_text(text, self.chunk_size, self.chunk_overlap);
        let total = pieces.len();

        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(i, content)| DocChunk {
                id: Uuid::new_v4(),
                content,
                chunk_index: i,
                total_chunks: total,
                metadata: metadata.clone(),
            })
            .collect())
    }
}

/// Aggregate corpus statistics over a batch of chunks.
pub fn compute_stats(chunks: &[DocChunk]) -> IngestStats {
    let mut files: Vec<String> = Vec::new();
    let mut students: Vec<String> = Vec::new();
    let mut skill_counts: BTreeMap<String, usize> = BTreeMap::new();

    let mut seen_files: Vec<&str> = Vec::new();
    for chunk in chunks {
        let meta: &CvMetadata = &chunk.metadata;
        if !files.contains(&meta.filename) {
            files.push(meta.filename.clone());
        }
        if meta.student_name != UNKNOWN_NAME && !students.contains(&meta.student_name) {
            students.push(meta.student_name.clone());
        }
        // Count each skill once per file, not once per chunk
        if !seen_files.contains(&meta.filename.as_str()) {
            seen_files.push(&meta.filename);
            for skill in &meta.skills {
                *skill_counts.entry(skill.to_lowercase()).or_insert(0) += 1;
            }
        }
    }

    let mut top_skills: Vec<(String, usize)> = skill_counts.into_iter().collect();
    top_skills.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_skills.truncate(10);

    IngestStats {
        total_chunks: chunks.len(),
        total_files: files.len(),
        total_students: students.len(),
        students,
        top_skills,
    }
}

/// Rebuild corpus statistics from the persisted document list, so stats
/// and suggestions survive a restart without re-reading the PDFs.
pub fn stats_from_documents(documents: &[IngestedFile]) -> IngestStats {
    let mut students: Vec<String> = Vec::new();
    let mut skill_counts: BTreeMap<String, usize> = BTreeMap::new();

    for doc in documents {
        if doc.student_name != UNKNOWN_NAME && !students.contains(&doc.student_name) {
            students.push(doc.student_name.clone());
        }
        for skill in &doc.skills {
            *skill_counts.entry(skill.to_lowercase()).or_insert(0) += 1;
        }
    }

    let mut top_skills: Vec<(String, usize)> = skill_counts.into_iter().collect();
    top_skills.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_skills.truncate(10);

    IngestStats {
        total_chunks: documents.iter().map(|d| d.chunk_count).sum(),
        total_files: documents.len(),
        total_students: students.len(),
        students,
        top_skills,
    }
}

/// Suggested questions for the chat UI, seeded from the ingested corpus.
pub fn suggest_queries(stats: &IngestStats) -> Vec<String> {
    let mut suggestions = vec![
        "¿Qué estudiantes hay registrados?".to_string(),
        "¿Quién tiene experiencia laboral?".to_string(),
        "¿Qué formación académica tienen los estudiantes?".to_string(),
    ];

    for name in stats.students.iter().take(3) {
        suggestions.push(format!("Busca información de {name}"));
    }
    for (skill, _) in stats.top_skills.iter().take(3) {
        suggestions.push(format!("¿Quién sabe {skill}?"));
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CV: &str = "\
Ana Torres
ana.torres@example.com

HABILIDADES
Python y SQL para análisis de datos.

EXPERIENCIA
Developer en DataCo
";

    fn processor() -> CvProcessor {
        CvProcessor::new(1000, 200).unwrap()
    }

    #[test]
    fn test_process_text_builds_chunks_with_metadata() {
        let chunks = processor().process_text(SAMPLE_CV, "cv_ana.pdf").unwrap();
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].total_chunks, chunks.len());
        assert_eq!(chunks[0].metadata.student_name, "Ana Torres");
        assert_eq!(chunks[0].metadata.filename, "cv_ana.pdf");
    }

    #[test]
    fn test_process_text_rejects_empty_input() {
        assert!(processor().process_text("   \n ", "cv.pdf").is_err());
    }

    #[test]
    fn test_chunk_ids_are_unique() {
        let long_text = format!("Ana Torres\n\n{}", "palabra ".repeat(600));
        let chunks = processor().process_text(&long_text, "cv.pdf").unwrap();
        assert!(chunks.len() > 1);
        let first = chunks[0].id;
        assert!(chunks[1..].iter().all(|c| c.id != first));
    }

    #[test]
    fn test_compute_stats_counts_files_and_students() {
        let mut chunks = processor().process_text(SAMPLE_CV, "cv_ana.pdf").unwrap();
        let other = "Luis Perez\n\nHABILIDADES\nPython y Docker en proyectos.\n";
        chunks.extend(processor().process_text(other, "cv_luis.pdf").unwrap());

        let stats = compute_stats(&chunks);
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.total_chunks, chunks.len());
        assert!(stats.students.contains(&"Ana Torres".to_string()));

        let python = stats
            .top_skills
            .iter()
            .find(|(skill, _)| skill == "python")
            .map(|(_, count)| *count);
        assert_eq!(python, Some(2));
    }

    #[test]
    fn test_unknown_students_excluded_from_stats() {
        let chunks = processor()
            .process_text("texto sin nombre reconocible aquí", "cv.pdf")
            .unwrap();
        let stats = compute_stats(&chunks);
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.total_files, 1);
    }

    fn ingested(filename: &str, student: &str, skills: &[&str]) -> IngestedFile {
        IngestedFile {
            filename: filename.to_string(),
            student_name: student.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            chunk_count: 2,
            ingested_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_stats_from_documents_carries_skills() {
        let documents = vec![
            ingested("cv_ana.pdf", "Ana Torres", &["Python", "SQL"]),
            ingested("cv_luis.pdf", "Luis Perez", &["Python"]),
        ];
        let stats = stats_from_documents(&documents);

        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_chunks, 4);
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.top_skills[0], ("python".to_string(), 2));

        let suggestions = suggest_queries(&stats);
        assert!(suggestions.iter().any(|s| s.contains("python")));
    }

    #[test]
    fn test_stats_from_documents_excludes_unknown_students() {
        let documents = vec![ingested("cv.pdf", UNKNOWN_NAME, &[])];
        let stats = stats_from_documents(&documents);
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.total_files, 1);
    }

    #[test]
    fn test_suggestions_include_students_and_skills() {
        let chunks = processor().process_text(SAMPLE_CV, "cv_ana.pdf").unwrap();
        let stats = compute_stats(&chunks);
        let suggestions = suggest_queries(&stats);
        assert!(suggestions.iter().any(|s| s.contains("Ana Torres")));
        assert!(suggestions.iter().any(|s| s.contains("python")));
        assert!(suggestions.len() >= 3);
    }
}
