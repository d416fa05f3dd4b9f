//! Ranked recommendation over the vector index.

use std::sync::Arc;

use tracing::{info, warn};

use triage_core::traits::{DocumentSource, EmbeddingProvider};
use triage_core::types::Recommendation;
use triage_core::Result;
use triage_text::normalize;

use crate::store::{l2_normalize, VectorIndex};

/// Orchestrates embedding and index search into ranked recommendations.
///
/// Holds the rebuild source so an index found empty at query time can be
/// lazily rebuilt once before answering.
pub struct RetrievalEngine {
    index: Arc<VectorIndex>,
    provider: Arc<dyn EmbeddingProvider>,
    source: Arc<dyn DocumentSource>,
}

impl RetrievalEngine {
    pub fn new(
        index: Arc<VectorIndex>,
        provider: Arc<dyn EmbeddingProvider>,
        source: Arc<dyn DocumentSource>,
    ) -> Self {
        Self {
            index,
            provider,
            source,
        }
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Force a full rebuild from the configured source.
    pub fn rebuild_index(&self) -> Result<()> {
        self.index.rebuild(self.source.as_ref())
    }

    /// Find up to `top_k` similar knowledge-base answers for a query.
    ///
    /// A query that normalizes to nothing yields an empty list, not an
    /// error: at this layer "nothing to recommend" and "invalid query"
    /// are the same answer, and input validation lives upstream.
    pub fn recommend(&self, query_text: &str, top_k: usize) -> Result<Vec<Recommendation>> {
        let cleaned = normalize(query_text);
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }
        let embedding = self.provider.embed(&cleaned)?;
        self.recommend_with_embedding(&embedding, top_k)
    }

    /// Same as `recommend`, for callers that already computed the query
    /// embedding and must not pay for it twice.
    pub fn recommend_with_embedding(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<Recommendation>> {
        if self.index.is_empty() {
            warn!("index is empty at query time, attempting rebuild");
            if let Err(e) = self.index.rebuild(self.source.as_ref()) {
                warn!(error = %e, "lazy index rebuild failed");
            }
        }

        let mut query = embedding.to_vec();
        l2_normalize(&mut query);

        let hits = self.index.search(&query, top_k)?;
        let mut recommendations = Vec::with_capacity(hits.len());
        for (position, score) in hits {
            // Positions past the document store mean the index and
            // documents desynchronized; drop them rather than guess.
            let Some(document) = self.index.document_at(position) else {
                warn!(position, "search hit outside document bounds, discarding");
                continue;
            };
            recommendations.push(Recommendation {
                document_id: document.id,
                answer: document.answer,
                body: document.body,
                similarity_score: score,
                rank: recommendations.len() + 1,
            });
        }
        info!(results = recommendations.len(), "recommendation query served");
        Ok(recommendations)
    }
}
