//! Character-budget text splitter with overlap.
//!
//! CVs are prose, so splitting is by character count with a preference for
//! natural boundaries: the splitter takes a window of `chunk_size` chars,
//! backs up to the nearest newline (then space) in the second half of the
//! window, and starts the next chunk `chunk_overlap` chars before the cut.

/// Split text into overlapping chunks of at most `chunk_size` characters.
/// `chunk_overlap` must be smaller than `chunk_size` (enforced by config
/// validation at startup).
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.trim().is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return vec![text.trim().to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let cut = if end < chars.len() {
            find_break(&chars, start, end).unwrap_or(end)
        } else {
            end
        };

        let chunk: String = chars[start..cut].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if cut >= chars.len() {
            break;
        }
        // Overlap backwards from the cut, but always make progress.
        start = cut.saturating_sub(chunk_overlap).max(start + 1);
    }

    chunks
}

/// Find a natural break position in the second half of the window:
/// prefer a newline, then a space. Returns the index just past the break.
fn find_break(chars: &[char], start: usize, end: usize) -> Option<usize> {
    let floor = start + (end - start) / 2;

    for i in (floor..end).rev() {
        if chars[i] == '\n' {
            return Some(i + 1);
        }
    }
    for i in (floor..end).rev() {
        if chars[i] == ' ' {
            return Some(i + 1);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(split_text("", 100, 20).is_empty());
        assert!(split_text("   \n  ", 100, 20).is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_text("experiencia laboral en Acme", 100, 20);
        assert_eq!(chunks, vec!["experiencia laboral en Acme"]);
    }

    #[test]
    fn test_chunks_respect_size_budget() {
        let text = "palabra ".repeat(500);
        let chunks = split_text(&text, 100, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100, "chunk too long: {chunk}");
        }
    }

    #[test]
    fn test_prefers_newline_break() {
        let line = "x".repeat(60);
        let text = format!("{line}\n{line}\n{line}");
        let chunks = split_text(&text, 100, 10);
        // First chunk should end at the line boundary, not mid-line
        assert_eq!(chunks[0], line);
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let text = "uno dos tres cuatro cinco seis siete ocho nueve diez ".repeat(20);
        let chunks = split_text(&text, 120, 40);
        assert!(chunks.len() >= 2);
        // The tail of chunk N should reappear at the head of chunk N+1
        let first_tail: String = chunks[0].chars().rev().take(20).collect::<String>();
        let tail: String = first_tail.chars().rev().collect();
        assert!(
            chunks[1].contains(tail.trim()),
            "expected overlap {tail:?} in {:?}",
            chunks[1]
        );
    }

    #[test]
    fn test_always_makes_progress_with_large_overlap() {
        // Overlap nearly as large as the chunk must still terminate
        let text = "a".repeat(2000);
        let chunks = split_text(&text, 100, 99);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_unicode_text_splits_cleanly() {
        let text = "educación académica formación ingeniería ".repeat(50);
        let chunks = split_text(&text, 80, 10);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 80);
        }
    }
}
