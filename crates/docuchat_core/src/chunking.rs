//! crates/docuchat_core/src/chunking.rs
//!
//! Splits extracted document text into bounded, overlapping chunks suitable
//! for independent storage and retrieval.
//!
//! The policy is deliberately simple: accumulate blank-line-delimited
//! paragraphs into a buffer, close the buffer once the next paragraph would
//! push it past the size limit, and seed the next buffer with a word-based
//! overlap taken from the tail of the closed one.

/// Configuration for text chunking.
#[derive(Debug, Clone)]
pub struct ChunkPolicy {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap length in characters; roughly `overlap / 10` trailing words
    /// of a closed chunk are carried into the next one.
    pub overlap: usize,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl ChunkPolicy {
    /// Number of trailing words carried from one chunk into the next.
    pub fn overlap_words(&self) -> usize {
        self.overlap / 10
    }
}

/// Splits `text` into ordered chunk strings under the given policy.
///
/// A single paragraph larger than `chunk_size` is emitted as one oversized
/// chunk; no hard upper bound is enforced. Whitespace-only input yields no
/// chunks.
pub fn chunk_text(text: &str, policy: &ChunkPolicy) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in split_paragraphs(text) {
        // Close the running buffer once this paragraph would overflow it.
        if !current.trim().is_empty() && current.len() + paragraph.len() > policy.chunk_size {
            let closed = current.trim().to_string();
            let overlap = trailing_words(&closed, policy.overlap_words());
            current = if overlap.is_empty() {
                paragraph.to_string()
            } else {
                format!("{} {}", overlap, paragraph)
            };
            chunks.push(closed);
        } else if current.is_empty() {
            current = paragraph.to_string();
        } else {
            current.push(' ');
            current.push_str(&paragraph);
        }
    }

    let trailing = current.trim();
    if !trailing.is_empty() {
        chunks.push(trailing.to_string());
    }
    chunks
}

/// Splits text on blank-line boundaries, keeping single newlines inside a
/// paragraph. Runs of blank (whitespace-only) lines collapse into one break.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}

/// The last `count` space-separated words of `text`, or all of it when it
/// has fewer.
fn trailing_words(text: &str, count: usize) -> String {
    let words: Vec<&str> = text.split(' ').collect();
    let start = words.len().saturating_sub(count);
    words[start..].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A paragraph of `words` copies of `word`, space separated.
    fn paragraph(word: &str, words: usize) -> String {
        vec![word; words].join(" ")
    }

    #[test]
    fn short_input_yields_single_trimmed_chunk() {
        let policy = ChunkPolicy::default();
        let chunks = chunk_text("  hello world  \n", &policy);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn whitespace_only_input_yields_nothing() {
        let policy = ChunkPolicy::default();
        assert!(chunk_text("", &policy).is_empty());
        assert!(chunk_text("  \n\n   \n", &policy).is_empty());
    }

    #[test]
    fn paragraphs_under_the_limit_accumulate_into_one_chunk() {
        let policy = ChunkPolicy::default();
        let text = "first paragraph\n\nsecond paragraph\n \nthird paragraph";
        let chunks = chunk_text(text, &policy);
        assert_eq!(
            chunks,
            vec!["first paragraph second paragraph third paragraph".to_string()]
        );
    }

    #[test]
    fn overflow_closes_chunk_and_seeds_overlap() {
        let policy = ChunkPolicy::default();
        // Each paragraph is 75 eight-char words => 599 chars, so any two
        // paragraphs overflow the 1000-char limit.
        let p1 = paragraph("p1-word", 75);
        let p2 = paragraph("p2-word", 75);
        let text = format!("{}\n\n{}", p1, p2);

        let chunks = chunk_text(&text, &policy);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], p1);

        // The second chunk starts with the last 20 words of the first.
        let overlap = paragraph("p1-word", policy.overlap_words());
        assert_eq!(chunks[1], format!("{} {}", overlap, p2));
    }

    #[test]
    fn stripping_overlap_prefixes_reconstructs_the_paragraphs() {
        let policy = ChunkPolicy::default();
        let paragraphs: Vec<String> = (1..=4)
            .map(|i| paragraph(&format!("p{}-word", i), 75))
            .collect();
        let text = paragraphs.join("\n\n");

        let chunks = chunk_text(&text, &policy);
        assert_eq!(chunks.len(), paragraphs.len());

        let mut reconstructed: Vec<String> = vec![chunks[0].clone()];
        for chunk in &chunks[1..] {
            let words: Vec<&str> = chunk.split(' ').collect();
            reconstructed.push(words[policy.overlap_words()..].join(" "));
        }
        assert_eq!(reconstructed.join(" "), paragraphs.join(" "));
    }

    #[test]
    fn oversized_paragraph_becomes_one_oversized_chunk() {
        let policy = ChunkPolicy::default();
        let huge = paragraph("word", 500); // 2499 chars
        let chunks = chunk_text(&huge, &policy);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].len() > policy.chunk_size);
        assert_eq!(chunks[0], huge);
    }

    #[test]
    fn oversized_paragraph_after_content_closes_the_buffer_first() {
        let policy = ChunkPolicy::default();
        let small = paragraph("small", 10);
        let huge = paragraph("huge", 400);
        let chunks = chunk_text(&format!("{}\n\n{}", small, huge), &policy);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], small);
        assert!(chunks[1].ends_with(&huge));
        assert!(chunks[1].len() > policy.chunk_size);
    }
}
