//! Character-based text chunking for corpus indexing.

/// Split `text` into chunks of at most `size` characters, each sharing
/// `overlap` characters with its predecessor.
///
/// A chunk ends at the last whitespace in its second half when there is
/// one, so words are rarely cut. Blank chunks are dropped.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || size == 0 {
        return Vec::new();
    }
    let overlap = overlap.min(size.saturating_sub(1));

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let mut end = (start + size).min(chars.len());

        if end < chars.len() {
            let floor = start + size / 2;
            if let Some(pos) = (floor..end).rev().find(|&i| chars[i].is_whitespace()) {
                end = pos + 1;
            }
        }

        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end >= chars.len() {
            break;
        }
        // Begin the next chunk on a word start inside the overlap when possible
        let candidate = end.saturating_sub(overlap).max(start + 1);
        start = (candidate..=end)
            .find(|&i| i > 0 && chars[i - 1].is_whitespace())
            .unwrap_or(candidate);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("The present perfect links past and present.", 500, 100);
        assert_eq!(chunks, vec!["The present perfect links past and present."]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("", 500, 100).is_empty());
        assert!(chunk_text("   \n  ", 500, 100).is_empty());
    }

    #[test]
    fn chunks_respect_size_and_overlap() {
        let text = "word ".repeat(300);
        let chunks = chunk_text(&text, 100, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
        // Neighbouring chunks share text
        let tail: String = chunks[0].chars().rev().take(10).collect::<Vec<_>>().into_iter().rev().collect();
        assert!(chunks[1].contains(tail.trim()));
    }

    #[test]
    fn breaks_at_whitespace() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        for chunk in chunk_text(text, 20, 5) {
            for word in chunk.split_whitespace() {
                assert!(text.split_whitespace().any(|w| w == word), "cut word: {word}");
            }
        }
    }

    #[test]
    fn handles_multibyte_text() {
        let text = "Xin chào các bạn. ".repeat(50);
        let chunks = chunk_text(&text, 64, 16);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 64));
    }

    #[test]
    fn unbroken_text_still_progresses() {
        let text = "x".repeat(250);
        let chunks = chunk_text(&text, 100, 20);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 100);
    }
}
