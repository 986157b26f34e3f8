//! Build, search, and persistence tests for the vector index.

use docqa_retrieval::document::Chunk;
use docqa_retrieval::error::RetrievalError;
use docqa_retrieval::index::VectorIndex;
use proptest::prelude::*;

fn chunk(seq: usize, text: &str) -> Chunk {
    Chunk {
        id: format!("doc_{seq}"),
        seq,
        text: text.to_string(),
        document_id: "doc".to_string(),
    }
}

#[test]
fn build_rejects_mismatched_lengths() {
    let err = VectorIndex::build(vec![chunk(0, "a")], vec![]).unwrap_err();
    assert!(matches!(err, RetrievalError::SizeMismatch { chunks: 1, vectors: 0 }));
}

#[test]
fn build_rejects_inconsistent_dimensions() {
    let err = VectorIndex::build(
        vec![chunk(0, "a"), chunk(1, "b")],
        vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]],
    )
    .unwrap_err();
    assert!(matches!(err, RetrievalError::DimensionMismatch { expected: 2, actual: 3 }));
}

#[test]
fn search_on_empty_index_fails() {
    let index = VectorIndex::build(Vec::new(), Vec::new()).unwrap();
    assert!(matches!(index.search(&[1.0, 0.0], 1), Err(RetrievalError::EmptyIndex)));
}

#[test]
fn search_rejects_wrong_query_dimension() {
    let index = VectorIndex::build(vec![chunk(0, "a")], vec![vec![1.0, 0.0]]).unwrap();
    assert!(matches!(
        index.search(&[1.0, 0.0, 0.0], 1),
        Err(RetrievalError::DimensionMismatch { expected: 2, actual: 3 }),
    ));
}

#[test]
fn search_returns_nearest_first() {
    let index = VectorIndex::build(
        vec![chunk(0, "east"), chunk(1, "north"), chunk(2, "northeast")],
        vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
    )
    .unwrap();

    let results = index.search(&[1.0, 0.1], 3).unwrap();
    assert_eq!(results[0].chunk.text, "east");
    for window in results.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
}

#[test]
fn ties_break_by_insertion_order() {
    let index = VectorIndex::build(
        vec![chunk(0, "first"), chunk(1, "second")],
        vec![vec![1.0, 0.0], vec![1.0, 0.0]],
    )
    .unwrap();

    let results = index.search(&[0.5, 0.5], 2).unwrap();
    assert_eq!(results[0].chunk.seq, 0);
    assert_eq!(results[1].chunk.seq, 1);
}

#[test]
fn k_larger_than_index_returns_all() {
    let index = VectorIndex::build(
        vec![chunk(0, "a"), chunk(1, "b")],
        vec![vec![1.0, 0.0], vec![0.0, 1.0]],
    )
    .unwrap();
    assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 2);
}

#[tokio::test]
async fn save_then_load_preserves_search_results() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kb.index.json");

    let index = VectorIndex::build(
        vec![chunk(0, "alpha beta"), chunk(1, "gamma delta"), chunk(2, "epsilon")],
        vec![vec![0.9, 0.1, 0.0], vec![0.1, 0.9, 0.2], vec![0.0, 0.2, 1.0]],
    )
    .unwrap();

    let query = [0.2, 0.8, 0.1];
    let before = index.search(&query, 3).unwrap();

    index.save(&path).await.unwrap();
    let restored = VectorIndex::load(&path).await.unwrap();

    assert_eq!(restored.len(), index.len());
    assert_eq!(restored.chunks(), index.chunks());

    let after = restored.search(&query, 3).unwrap();
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.chunk, a.chunk);
        assert!((b.score - a.score).abs() < 1e-6);
    }
}

#[tokio::test]
async fn load_missing_index_fails_with_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = VectorIndex::load(dir.path().join("nope.json")).await.unwrap_err();
    assert!(matches!(err, RetrievalError::IndexNotFound(_)));
}

#[tokio::test]
async fn load_corrupt_index_fails_with_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    tokio::fs::write(&path, b"not json at all").await.unwrap();

    let err = VectorIndex::load(&path).await.unwrap_err();
    assert!(matches!(err, RetrievalError::IndexCorrupt { .. }));
}

#[tokio::test]
async fn load_unknown_snapshot_version_fails_with_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.json");
    tokio::fs::write(&path, br#"{"version":99,"dimensions":2,"chunks":[],"vectors":[]}"#)
        .await
        .unwrap();

    let err = VectorIndex::load(&path).await.unwrap_err();
    assert!(matches!(err, RetrievalError::IndexCorrupt { .. }));
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// **Property: search ordering.**
/// *For any* set of stored vectors and any query, search results SHALL be
/// ordered by non-increasing cosine similarity and bounded in count by both
/// `k` and the index size.
mod prop_search_ordering {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded(
            vectors in proptest::collection::vec(arb_normalized_embedding(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            k in 1usize..25,
        ) {
            let chunks: Vec<Chunk> =
                (0..vectors.len()).map(|i| chunk(i, &format!("chunk {i}"))).collect();
            let stored = vectors.len();

            let index = VectorIndex::build(chunks, vectors).unwrap();
            let results = index.search(&query, k).unwrap();

            prop_assert!(results.len() <= k);
            prop_assert!(results.len() <= stored);
            prop_assert_eq!(results.len(), k.min(stored));

            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}
