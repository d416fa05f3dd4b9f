//! Flat exact-search vector store with paired on-disk artifacts.
//!
//! Vectors are stored L2-normalized so inner product equals cosine
//! similarity. The store keeps two parallel sequences, vectors and
//! documents, joined by position; both are flushed together after every
//! mutation and read together at load. One artifact without the other is
//! treated as "index absent", and any structural inconsistency triggers
//! a full rebuild rather than partial repair, which keeps the
//! parallel-length invariant trivially true.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use triage_core::traits::{DocumentSource, EmbeddingProvider};
use triage_core::types::{Document, IndexStats, IndexedVector, SourceDocument};
use triage_core::{Error, Result};

use crate::seed;

/// Caller-supplied locations of the two paired artifacts.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub vectors: PathBuf,
    pub documents: PathBuf,
}

/// Serialized form of the vector artifact.
#[derive(Serialize, Deserialize)]
struct VectorArtifact {
    dimension: usize,
    vectors: Vec<IndexedVector>,
}

struct IndexState {
    dimension: usize,
    vectors: Vec<IndexedVector>,
    documents: Vec<Document>,
}

/// Exact nearest-neighbor index over knowledge-base answers.
///
/// Concurrent readers proceed in parallel; `add_document` and `rebuild`
/// serialize behind the write lock so readers never observe a torn
/// (mismatched-length) state.
pub struct VectorIndex {
    state: RwLock<IndexState>,
    paths: IndexPaths,
    provider: Arc<dyn EmbeddingProvider>,
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-12);
    for x in v {
        *x /= norm;
    }
}

impl VectorIndex {
    /// Load the paired artifacts, or rebuild from `source`, or fall back
    /// to the built-in seed corpus. The service is never left indexless;
    /// only a failing embedding provider makes this fail.
    pub fn load_or_build(
        paths: IndexPaths,
        provider: Arc<dyn EmbeddingProvider>,
        source: &dyn DocumentSource,
    ) -> Result<Self> {
        match Self::load_artifacts(&paths, provider.dimension()) {
            Ok(state) => {
                info!(
                    vectors = state.vectors.len(),
                    dimension = state.dimension,
                    path = %paths.vectors.display(),
                    "loaded vector index"
                );
                Ok(Self {
                    state: RwLock::new(state),
                    paths,
                    provider,
                })
            }
            Err(e) => {
                warn!(error = %e, "index artifacts unusable, rebuilding from source");
                let state = Self::build_state(provider.as_ref(), source)?;
                let index = Self {
                    state: RwLock::new(state),
                    paths,
                    provider,
                };
                if let Err(e) = index.persist(&index.read_state()) {
                    warn!(error = %e, "could not persist rebuilt index");
                }
                Ok(index)
            }
        }
    }

    fn load_artifacts(paths: &IndexPaths, expected_dimension: usize) -> Result<IndexState> {
        if !paths.vectors.exists() || !paths.documents.exists() {
            return Err(Error::IndexCorrupt("index artifacts absent".to_string()));
        }
        let vector_file = BufReader::new(fs::File::open(&paths.vectors)?);
        let artifact: VectorArtifact = bincode::deserialize_from(vector_file)
            .map_err(|e| Error::IndexCorrupt(format!("vector artifact: {e}")))?;
        let document_file = BufReader::new(fs::File::open(&paths.documents)?);
        let documents: Vec<Document> = serde_json::from_reader(document_file)
            .map_err(|e| Error::IndexCorrupt(format!("document artifact: {e}")))?;

        if artifact.vectors.len() != documents.len() {
            return Err(Error::IndexCorrupt(format!(
                "artifact lengths diverge: {} vectors, {} documents",
                artifact.vectors.len(),
                documents.len()
            )));
        }
        if artifact
            .vectors
            .iter()
            .any(|v| v.vector.len() != artifact.dimension)
        {
            return Err(Error::IndexCorrupt(
                "vector with wrong dimension in artifact".to_string(),
            ));
        }
        if artifact.dimension != expected_dimension {
            return Err(Error::IndexCorrupt(format!(
                "artifact dimension {} does not match provider dimension {}",
                artifact.dimension, expected_dimension
            )));
        }
        Ok(IndexState {
            dimension: artifact.dimension,
            vectors: artifact.vectors,
            documents,
        })
    }

    /// Embed a document corpus into a fresh state. Falls back to the
    /// seed corpus when the source errors or yields nothing usable.
    fn build_state(provider: &dyn EmbeddingProvider, source: &dyn DocumentSource) -> Result<IndexState> {
        let mut records = match source.fetch_documents() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "rebuild source failed, using seed corpus");
                seed::seed_documents()
            }
        };
        records.retain(|r| !r.answer.trim().is_empty());
        if records.is_empty() {
            warn!("rebuild source yielded no usable documents, using seed corpus");
            records = seed::seed_documents();
        }
        Self::embed_records(provider, records)
    }

    fn embed_records(
        provider: &dyn EmbeddingProvider,
        records: Vec<SourceDocument>,
    ) -> Result<IndexState> {
        let documents: Vec<Document> = records
            .into_iter()
            .enumerate()
            .map(|(i, r)| Document {
                id: r.id.unwrap_or(i as u64 + 1),
                answer: r.answer,
                body: r.body,
            })
            .collect();
        let answers: Vec<String> = documents.iter().map(|d| d.answer.clone()).collect();
        let mut embeddings = provider.embed_batch(&answers)?;
        for v in &mut embeddings {
            l2_normalize(v);
        }
        let dimension = provider.dimension();
        let vectors = documents
            .iter()
            .zip(embeddings)
            .map(|(d, vector)| IndexedVector {
                document_id: d.id,
                vector,
            })
            .collect::<Vec<_>>();
        info!(documents = documents.len(), dimension, "built vector index");
        Ok(IndexState {
            dimension,
            vectors,
            documents,
        })
    }

    fn read_state(&self) -> RwLockReadGuard<'_, IndexState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, IndexState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Exact inner-product search: up to `min(k, vector_count)` results
    /// in descending score order, ties broken by ascending position. An
    /// empty index yields an empty result, not an error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        let state = self.read_state();
        if state.vectors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != state.dimension {
            return Err(Error::DimensionMismatch {
                expected: state.dimension,
                actual: query.len(),
            });
        }
        let mut scored: Vec<(usize, f32)> = state
            .vectors
            .iter()
            .enumerate()
            .map(|(pos, iv)| {
                let score = iv
                    .vector
                    .iter()
                    .zip(query)
                    .map(|(a, b)| a * b)
                    .sum::<f32>();
                (pos, score)
            })
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k.min(state.vectors.len()));
        Ok(scored)
    }

    /// Embed and append one document, then flush both artifacts.
    ///
    /// The append and flush happen under a single write-lock scope; a
    /// failed flush rolls the in-memory append back so the index never
    /// diverges from disk. Returns the newly assigned id.
    pub fn add_document(&self, answer: &str, body: &str) -> Result<u64> {
        let mut vector = self.provider.embed(answer)?;
        l2_normalize(&mut vector);

        let mut state = self.write_state();
        if vector.len() != state.dimension {
            return Err(Error::DimensionMismatch {
                expected: state.dimension,
                actual: vector.len(),
            });
        }
        let id = state.documents.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        state.vectors.push(IndexedVector {
            document_id: id,
            vector,
        });
        state.documents.push(Document {
            id,
            answer: answer.to_string(),
            body: body.to_string(),
        });
        if let Err(e) = self.persist(&state) {
            state.vectors.pop();
            state.documents.pop();
            return Err(e);
        }
        info!(id, "added document to knowledge base");
        Ok(id)
    }

    /// Replace the whole index from `source` and flush. Used at startup
    /// recovery and by the retrieval layer's lazy empty-index rebuild.
    pub fn rebuild(&self, source: &dyn DocumentSource) -> Result<()> {
        let fresh = Self::build_state(self.provider.as_ref(), source)?;
        let mut state = self.write_state();
        *state = fresh;
        self.persist(&state)
    }

    fn persist(&self, state: &IndexState) -> Result<()> {
        for path in [&self.paths.vectors, &self.paths.documents] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        let artifact = VectorArtifact {
            dimension: state.dimension,
            vectors: state.vectors.clone(),
        };
        let vector_file = BufWriter::new(fs::File::create(&self.paths.vectors)?);
        bincode::serialize_into(vector_file, &artifact)
            .map_err(|e| Error::Operation(format!("writing vector artifact: {e}")))?;
        let document_file = BufWriter::new(fs::File::create(&self.paths.documents)?);
        serde_json::to_writer(document_file, &state.documents)
            .map_err(|e| Error::Operation(format!("writing document artifact: {e}")))?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.read_state().dimension
    }

    /// Document at a given vector position, if the position is in
    /// bounds. Readers racing a mutation may see either side of it.
    pub fn document_at(&self, position: usize) -> Option<Document> {
        self.read_state().documents.get(position).cloned()
    }

    pub fn stats(&self) -> IndexStats {
        let state = self.read_state();
        IndexStats {
            vector_count: state.vectors.len(),
            dimension: state.dimension,
            document_count: state.documents.len(),
            index_path: self.paths.vectors.display().to_string(),
        }
    }
}
