//! Behavior and property tests for the separator chunker.

use docqa_retrieval::chunking::{Chunker, SeparatorChunker};
use docqa_retrieval::document::Document;
use docqa_retrieval::error::RetrievalError;
use proptest::prelude::*;

fn chunk_texts(chunker: &SeparatorChunker, text: &str) -> Vec<String> {
    chunker.chunk(&Document::new("doc", text)).into_iter().map(|c| c.text).collect()
}

#[test]
fn packs_tokens_up_to_max_size() {
    let chunker = SeparatorChunker::new(11, " ").unwrap();
    assert_eq!(
        chunk_texts(&chunker, "alpha beta gamma delta"),
        vec!["alpha beta".to_string(), "gamma delta".to_string()],
    );
}

#[test]
fn flushes_when_next_token_would_overflow() {
    // With a 10-character bound "gamma delta" (11 chars) no longer fits in
    // one chunk, so each token becomes its own chunk.
    let chunker = SeparatorChunker::new(10, " ").unwrap();
    assert_eq!(
        chunk_texts(&chunker, "alpha beta gamma delta"),
        vec!["alpha beta".to_string(), "gamma".to_string(), "delta".to_string()],
    );
}

#[test]
fn oversized_token_becomes_its_own_chunk() {
    let chunker = SeparatorChunker::new(5, " ").unwrap();
    let chunks = chunk_texts(&chunker, "hi incomprehensibilities yo");
    assert_eq!(
        chunks,
        vec!["hi".to_string(), "incomprehensibilities".to_string(), "yo".to_string()],
    );
    assert!(chunks[1].len() > 5);
}

#[test]
fn single_oversized_token_is_emitted_alone() {
    let chunker = SeparatorChunker::new(3, " ").unwrap();
    assert_eq!(chunk_texts(&chunker, "incomprehensibilities"), vec!["incomprehensibilities"]);
}

#[test]
fn sizes_count_characters_not_bytes() {
    // "héllo wörld" is 11 characters but 13 bytes; it fits in one chunk.
    let chunker = SeparatorChunker::new(11, " ").unwrap();
    assert_eq!(chunk_texts(&chunker, "héllo wörld"), vec!["héllo wörld".to_string()]);
}

#[test]
fn multibyte_token_is_not_misclassified_as_oversized() {
    // 7 characters, 11 bytes: exactly at the bound, not an oversized token.
    let chunker = SeparatorChunker::new(7, " ").unwrap();
    assert_eq!(chunk_texts(&chunker, "ünïcödé"), vec!["ünïcödé".to_string()]);
}

#[test]
fn empty_text_yields_no_chunks() {
    let chunker = SeparatorChunker::new(10, " ").unwrap();
    assert!(chunk_texts(&chunker, "").is_empty());
}

#[test]
fn separator_runs_collapse() {
    // Splitting drops empty tokens, so runs of the separator collapse to a
    // single separator when the chunks are rejoined.
    let chunker = SeparatorChunker::new(20, " ").unwrap();
    assert_eq!(chunk_texts(&chunker, "alpha   beta  gamma"), vec!["alpha beta gamma"]);
}

#[test]
fn chunking_is_deterministic() {
    let chunker = SeparatorChunker::new(7, " ").unwrap();
    let doc = Document::new("doc", "one two three four five six seven");
    assert_eq!(chunker.chunk(&doc), chunker.chunk(&doc));
}

#[test]
fn chunks_carry_sequence_and_document_id() {
    let chunker = SeparatorChunker::new(5, " ").unwrap();
    let chunks = chunker.chunk(&Document::new("kb", "aa bb cc dd"));
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.seq, i);
        assert_eq!(chunk.document_id, "kb");
        assert_eq!(chunk.id, format!("kb_{i}"));
    }
}

#[test]
fn overlap_carries_trailing_tokens() {
    let chunker = SeparatorChunker::new(10, " ").unwrap().with_overlap(4).unwrap();
    assert_eq!(
        chunk_texts(&chunker, "aa bb cc dd ee"),
        vec!["aa bb cc".to_string(), "cc dd ee".to_string()],
    );
}

#[test]
fn overlap_is_dropped_when_it_would_overflow() {
    let chunker = SeparatorChunker::new(10, " ").unwrap().with_overlap(4).unwrap();
    let chunks = chunk_texts(&chunker, "aa bb cc ddddddddd");
    assert_eq!(chunks, vec!["aa bb cc".to_string(), "ddddddddd".to_string()]);
    for chunk in &chunks {
        assert!(chunk.len() <= 10);
    }
}

#[test]
fn zero_max_size_is_invalid() {
    assert!(matches!(
        SeparatorChunker::new(0, " "),
        Err(RetrievalError::InvalidConfig(_)),
    ));
}

#[test]
fn overlap_must_be_less_than_max_size() {
    let chunker = SeparatorChunker::new(10, " ").unwrap();
    assert!(matches!(chunker.with_overlap(10), Err(RetrievalError::InvalidConfig(_))));
}

/// **Property: chunker round-trip.**
/// *For any* text and `max_size > 0`, joining the output chunks with the
/// separator SHALL reproduce the input text up to separator-run collapsing,
/// and every chunk SHALL fit within `max_size` unless it is a single
/// oversized token.
mod prop_chunker_round_trip {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn rejoin_reproduces_collapsed_input(
            text in "[a-zéß ]{0,120}",
            max_size in 1usize..40,
        ) {
            let chunker = SeparatorChunker::new(max_size, " ").unwrap();
            let chunks = chunk_texts(&chunker, &text);

            let collapsed: Vec<&str> = text.split(' ').filter(|t| !t.is_empty()).collect();
            prop_assert_eq!(chunks.join(" "), collapsed.join(" "));
        }

        #[test]
        fn chunks_respect_size_bound_except_oversized_tokens(
            text in "[a-zéß ]{0,120}",
            max_size in 1usize..40,
        ) {
            let chunker = SeparatorChunker::new(max_size, " ").unwrap();
            for chunk in chunk_texts(&chunker, &text) {
                if chunk.chars().count() > max_size {
                    // Only a single token may exceed the bound.
                    prop_assert!(
                        !chunk.contains(' '),
                        "oversized chunk contains a separator: {:?}",
                        chunk,
                    );
                }
            }
        }
    }
}
