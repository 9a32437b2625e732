//! Property tests for the fixed-window chunker.

use proptest::prelude::*;
use textbook_rag::chunking::{FixedWindowChunker, chunk_id};

/// Generate a (chunk_size, chunk_overlap) pair satisfying overlap < size.
fn arb_chunk_params() -> impl Strategy<Value = (usize, usize)> {
    (5usize..80).prop_flat_map(|size| (Just(size), 0..size))
}

/// Prose-like text: words, sentence punctuation, newlines.
fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z .!?\n]{0,300}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every emitted chunk has non-empty trimmed text, is bounded by
    /// chunk_size characters, and is a contiguous slice of the input.
    #[test]
    fn chunks_are_nonempty_bounded_substrings(
        text in arb_text(),
        (size, overlap) in arb_chunk_params(),
    ) {
        let chunker = FixedWindowChunker::new(size, overlap);
        let chunks = chunker.chunk_text(&text, "doc.md", "Section");

        for chunk in &chunks {
            prop_assert!(!chunk.text.trim().is_empty());
            prop_assert!(chunk.text.chars().count() <= size);
            prop_assert!(text.contains(&chunk.text), "chunk {:?} not in input", chunk.text);
        }
    }

    /// Text that fits in a single window yields exactly one chunk equal to
    /// the trimmed input (or none, if the input is all whitespace).
    #[test]
    fn short_text_yields_single_chunk(
        text in arb_text(),
        (size, overlap) in arb_chunk_params(),
    ) {
        prop_assume!(text.chars().count() <= size);
        let chunker = FixedWindowChunker::new(size, overlap);
        let chunks = chunker.chunk_text(&text, "doc.md", "Section");

        if text.trim().is_empty() {
            prop_assert!(chunks.is_empty());
        } else {
            prop_assert_eq!(chunks.len(), 1);
            prop_assert_eq!(chunks[0].text.as_str(), text.trim());
            prop_assert_eq!(chunks[0].chunk_index, 0);
        }
    }

    /// With no overlap, concatenating all chunks reconstructs the input
    /// modulo the whitespace trimmed at cut points.
    #[test]
    fn zero_overlap_chunks_reconstruct_the_input(
        text in arb_text(),
        size in 5usize..80,
    ) {
        let chunker = FixedWindowChunker::new(size, 0);
        let chunks = chunker.chunk_text(&text, "doc.md", "Section");

        let rebuilt: String =
            chunks.iter().flat_map(|c| c.text.chars()).filter(|c| !c.is_whitespace()).collect();
        let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(rebuilt, original);
    }

    /// Chunk indices are strictly increasing within one chunking pass.
    #[test]
    fn chunk_indices_are_strictly_increasing(
        text in arb_text(),
        (size, overlap) in arb_chunk_params(),
    ) {
        let chunker = FixedWindowChunker::new(size, overlap);
        let chunks = chunker.chunk_text(&text, "doc.md", "Section");
        for window in chunks.windows(2) {
            prop_assert!(window[0].chunk_index < window[1].chunk_index);
        }
    }

    /// Chunk ids are pure functions of (text, source_file, chunk_index).
    #[test]
    fn chunk_id_is_pure(text in "[a-z ]{0,50}", file in "[a-z]{1,10}\\.md", index in 0usize..100) {
        prop_assert_eq!(chunk_id(&text, &file, index), chunk_id(&text, &file, index));
        prop_assert_ne!(chunk_id(&text, &file, index), chunk_id(&text, &file, index + 1));
    }
}
