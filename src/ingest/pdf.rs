use std::path::Path;

use anyhow::{Context, Result};

/// Extract the raw text of a PDF file.
///
/// `pdf_extract` panics on some malformed documents, so extraction runs
/// inside `catch_unwind` and surfaces panics as ordinary errors.
pub fn extract_text(path: &Path) -> Result<String> {
    let path_buf = path.to_path_buf();
    let result = std::panic::catch_unwind(move || pdf_extract::extract_text(&path_buf));

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => Err(err).with_context(|| format!("failed to extract text from {}", path.display())),
        Err(_) => anyhow::bail!("pdf parser panicked on {}", path.display()),
    }
}
