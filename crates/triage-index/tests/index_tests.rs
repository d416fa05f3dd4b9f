use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use triage_core::traits::{DocumentSource, EmbeddingProvider};
use triage_core::types::SourceDocument;
use triage_core::{Error, Result};
use triage_embed::HashEmbedder;
use triage_index::{IndexPaths, JsonCorpusSource, RetrievalEngine, VectorIndex};

const DIM: usize = 64;

struct StaticSource {
    documents: Vec<SourceDocument>,
}

impl StaticSource {
    fn new(answers: &[&str]) -> Self {
        Self {
            documents: answers
                .iter()
                .enumerate()
                .map(|(i, answer)| SourceDocument {
                    id: Some(i as u64 + 1),
                    answer: (*answer).to_string(),
                    body: format!("question {}", i + 1),
                })
                .collect(),
        }
    }
}

impl DocumentSource for StaticSource {
    fn fetch_documents(&self) -> Result<Vec<SourceDocument>> {
        Ok(self.documents.clone())
    }
}

struct FailingSource;

impl DocumentSource for FailingSource {
    fn fetch_documents(&self) -> Result<Vec<SourceDocument>> {
        Err(Error::Operation("source offline".to_string()))
    }
}

fn paths_in(dir: &TempDir) -> IndexPaths {
    IndexPaths {
        vectors: dir.path().join("index/vectors.bin"),
        documents: dir.path().join("index/documents.json"),
    }
}

fn provider() -> Arc<dyn EmbeddingProvider> {
    Arc::new(HashEmbedder::new(DIM))
}

#[test]
fn builds_from_source_and_persists_both_artifacts() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    let source = StaticSource::new(&["reset your password", "check your payment method"]);

    let index = VectorIndex::load_or_build(paths.clone(), provider(), &source).unwrap();
    let stats = index.stats();
    assert_eq!(stats.vector_count, 2);
    assert_eq!(stats.document_count, 2);
    assert_eq!(stats.dimension, DIM);
    assert!(paths.vectors.exists());
    assert!(paths.documents.exists());
}

#[test]
fn reload_restores_the_persisted_index() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    let source = StaticSource::new(&["clear your browser cache", "contact support by email"]);

    let first = VectorIndex::load_or_build(paths.clone(), provider(), &source).unwrap();
    let before = first.search(&first_query(), 2).unwrap();
    drop(first);

    // Reload must not consult the source at all.
    let reloaded = VectorIndex::load_or_build(paths, provider(), &FailingSource).unwrap();
    assert_eq!(reloaded.stats().document_count, 2);
    let after = reloaded.search(&first_query(), 2).unwrap();
    assert_eq!(before, after);
}

fn first_query() -> Vec<f32> {
    provider().embed("clear your browser cache").unwrap()
}

#[test]
fn failing_source_falls_back_to_seed_corpus() {
    let dir = TempDir::new().unwrap();
    let index = VectorIndex::load_or_build(paths_in(&dir), provider(), &FailingSource).unwrap();
    assert_eq!(index.stats().document_count, 5);
    let doc = index.document_at(0).unwrap();
    assert_eq!(doc.id, 1);
    assert!(doc.answer.contains("reset your password"));
}

#[test]
fn blank_answers_are_filtered_before_embedding() {
    let dir = TempDir::new().unwrap();
    let source = StaticSource::new(&["keep me", "   ", "and me"]);
    let index = VectorIndex::load_or_build(paths_in(&dir), provider(), &source).unwrap();
    assert_eq!(index.stats().vector_count, 2);
}

#[test]
fn search_returns_descending_scores_with_self_match_first() {
    let dir = TempDir::new().unwrap();
    let source = StaticSource::new(&[
        "restart the application",
        "update your billing address",
        "export the report as csv",
    ]);
    let index = VectorIndex::load_or_build(paths_in(&dir), provider(), &source).unwrap();

    let query = provider().embed("update your billing address").unwrap();
    let hits = index.search(&query, 3).unwrap();
    assert_eq!(hits.len(), 3);
    // The stored vector for the same text scores highest (cosine 1).
    assert_eq!(hits[0].0, 1);
    assert!((hits[0].1 - 1.0).abs() < 1e-4);
    assert!(hits[0].1 >= hits[1].1 && hits[1].1 >= hits[2].1);
}

#[test]
fn search_truncates_to_index_size_and_k_zero_is_empty() {
    let dir = TempDir::new().unwrap();
    let source = StaticSource::new(&["only answer"]);
    let index = VectorIndex::load_or_build(paths_in(&dir), provider(), &source).unwrap();

    let query = provider().embed("anything").unwrap();
    assert_eq!(index.search(&query, 10).unwrap().len(), 1);
    assert!(index.search(&query, 0).unwrap().is_empty());
}

#[test]
fn search_rejects_mismatched_query_dimension() {
    let dir = TempDir::new().unwrap();
    let source = StaticSource::new(&["only answer"]);
    let index = VectorIndex::load_or_build(paths_in(&dir), provider(), &source).unwrap();

    let err = index.search(&vec![0.5f32; DIM + 1], 3).unwrap_err();
    assert!(matches!(
        err,
        Error::DimensionMismatch {
            expected: DIM,
            actual
        } if actual == DIM + 1
    ));
}

#[test]
fn add_document_assigns_next_id_and_survives_reload() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    let source = StaticSource::new(&["first answer", "second answer"]);

    let index = VectorIndex::load_or_build(paths.clone(), provider(), &source).unwrap();
    let id = index.add_document("third answer", "third question").unwrap();
    assert_eq!(id, 3);
    assert_eq!(index.stats().document_count, 3);
    drop(index);

    let reloaded = VectorIndex::load_or_build(paths, provider(), &FailingSource).unwrap();
    assert_eq!(reloaded.stats().document_count, 3);
    let query = provider().embed("third answer").unwrap();
    let hits = reloaded.search(&query, 1).unwrap();
    let doc = reloaded.document_at(hits[0].0).unwrap();
    assert_eq!(doc.id, 3);
    assert_eq!(doc.answer, "third answer");
}

#[test]
fn corrupt_document_artifact_triggers_rebuild_not_failure() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    let source = StaticSource::new(&["good answer one", "good answer two"]);

    let index = VectorIndex::load_or_build(paths.clone(), provider(), &source).unwrap();
    drop(index);
    fs::write(&paths.documents, b"{ not json").unwrap();

    let recovered = VectorIndex::load_or_build(paths.clone(), provider(), &source).unwrap();
    assert_eq!(recovered.stats().document_count, 2);
    // The repaired artifacts were flushed back out.
    let raw = fs::read_to_string(&paths.documents).unwrap();
    assert!(raw.contains("good answer one"));
}

#[test]
fn missing_vector_artifact_triggers_rebuild() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    let source = StaticSource::new(&["lonely answer"]);

    let index = VectorIndex::load_or_build(paths.clone(), provider(), &source).unwrap();
    drop(index);
    fs::remove_file(&paths.vectors).unwrap();

    let recovered = VectorIndex::load_or_build(paths, provider(), &source).unwrap();
    assert_eq!(recovered.stats().document_count, 1);
}

#[test]
fn json_corpus_source_reads_json_and_jsonl_files() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("a.json"),
        r#"[{"id": 1, "answer": "from the array file", "body": "q1"}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("b.jsonl"),
        "{\"answer\": \"from the line file\"}\n\n{\"answer\": \"second line\", \"body\": \"q3\"}\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let docs = JsonCorpusSource::new(dir.path()).fetch_documents().unwrap();
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0].answer, "from the array file");
    assert_eq!(docs[1].id, None);
    assert_eq!(docs[2].body, "q3");
}

#[test]
fn json_corpus_source_errors_when_directory_has_no_corpus_files() {
    let dir = TempDir::new().unwrap();
    let err = JsonCorpusSource::new(dir.path()).fetch_documents().unwrap_err();
    assert!(matches!(err, Error::Operation(_)));
}

#[test]
fn recommend_returns_ranked_results_and_empty_for_blank_queries() {
    let dir = TempDir::new().unwrap();
    let provider = provider();
    let source: Arc<dyn DocumentSource> = Arc::new(StaticSource::new(&[
        "reset your password from the login page",
        "check your payment method in settings",
    ]));
    let index = Arc::new(
        VectorIndex::load_or_build(paths_in(&dir), provider.clone(), source.as_ref()).unwrap(),
    );
    let engine = RetrievalEngine::new(index, provider, source);

    let recs = engine
        .recommend("reset your password from the login page", 2)
        .unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].document_id, 1);
    assert_eq!(recs[0].rank, 1);
    assert_eq!(recs[1].rank, 2);
    assert!(recs[0].similarity_score >= recs[1].similarity_score);

    assert!(engine.recommend(" \t  ", 2).unwrap().is_empty());
}

#[test]
fn rebuild_index_replaces_contents_from_the_source() {
    let dir = TempDir::new().unwrap();
    let provider = provider();
    let initial = StaticSource::new(&["old answer"]);
    let index = Arc::new(
        VectorIndex::load_or_build(paths_in(&dir), provider.clone(), &initial).unwrap(),
    );
    assert_eq!(index.stats().document_count, 1);

    let replacement: Arc<dyn DocumentSource> =
        Arc::new(StaticSource::new(&["new one", "new two", "new three"]));
    let engine = RetrievalEngine::new(index.clone(), provider, replacement);
    engine.rebuild_index().unwrap();
    assert_eq!(index.stats().document_count, 3);
}
