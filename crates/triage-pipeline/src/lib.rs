//! Request-scoped ticket analysis: normalization, classification,
//! language detection, and retrieval composed into one result.

pub mod init;

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use triage_core::traits::EmbeddingProvider;
use triage_core::types::{Classification, LanguageDetection, Recommendation, TicketAnalysis};
use triage_core::{Error, Result};
use triage_index::RetrievalEngine;
use triage_text::{classify, normalize, LanguageDetector};

pub use init::{spawn_init, PipelineConfig, PipelineHandle, PipelineState};

const EMBEDDING_PREVIEW_LEN: usize = 5;

/// The composed analysis pipeline. All components are constructed by
/// the process entry point and injected; the pipeline owns no ambient
/// state and every call is independent.
pub struct AnalysisPipeline {
    provider: Arc<dyn EmbeddingProvider>,
    detector: LanguageDetector,
    engine: RetrievalEngine,
    top_k: usize,
    prefer_secondary_language: bool,
}

impl AnalysisPipeline {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        detector: LanguageDetector,
        engine: RetrievalEngine,
        top_k: usize,
        prefer_secondary_language: bool,
    ) -> Self {
        Self {
            provider,
            detector,
            engine,
            top_k,
            prefer_secondary_language,
        }
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    /// Analyze one ticket.
    ///
    /// Fails fast when normalization leaves nothing to analyze and when
    /// the embedding capability is gone; every other stage failure
    /// degrades to a partial result rather than discarding the analysis.
    pub fn analyze(&self, text: &str) -> Result<TicketAnalysis> {
        let started = Instant::now();
        let cleaned = normalize(text);
        if cleaned.is_empty() {
            return Err(Error::EmptyInput(
                "no meaningful text content after normalization".to_string(),
            ));
        }

        let embedding = self.provider.embed(&cleaned)?;
        let language = self.detector.detect(&cleaned, self.prefer_secondary_language);
        let classification = classify(&cleaned);

        // Reuse the ticket embedding; the query must not be embedded twice.
        let recommendations = match self
            .engine
            .recommend_with_embedding(&embedding, self.top_k)
        {
            Ok(recommendations) => recommendations,
            Err(e) => {
                warn!(error = %e, "retrieval failed, returning analysis without recommendations");
                Vec::new()
            }
        };

        let embedding_preview = embedding
            .iter()
            .take(EMBEDDING_PREVIEW_LEN)
            .copied()
            .collect();
        Ok(assemble(
            classification,
            language,
            recommendations,
            embedding_preview,
            started.elapsed().as_secs_f64() * 1000.0,
        ))
    }
}

/// Canned suggestions shown when retrieval produced nothing.
fn fallback_articles(classification: &Classification) -> Vec<String> {
    vec![
        format!(
            "How to resolve {}",
            classification.category.to_string().to_lowercase()
        ),
        format!(
            "Common {} priority issues",
            classification.priority.to_string().to_lowercase()
        ),
        "General troubleshooting guide".to_string(),
    ]
}

fn assemble(
    classification: Classification,
    language: LanguageDetection,
    recommendations: Vec<Recommendation>,
    embedding_preview: Vec<f32>,
    processing_time_ms: f64,
) -> TicketAnalysis {
    let suggested_articles = if recommendations.is_empty() {
        fallback_articles(&classification)
    } else {
        recommendations.iter().map(|r| r.answer.clone()).collect()
    };
    TicketAnalysis {
        priority: classification.priority,
        confidence: classification.confidence,
        category: classification.category,
        sentiment: classification.sentiment,
        language,
        recommendations,
        matched_keywords: classification.matched_keywords,
        embedding_preview,
        suggested_articles,
        processing_time_ms,
    }
}

/// Analysis without any model-backed capability: rules plus keyword
/// language detection only. Served while initialization is still
/// running so early requests degrade instead of blocking.
pub(crate) fn degraded_analysis(text: &str) -> Result<TicketAnalysis> {
    let started = Instant::now();
    let cleaned = normalize(text);
    if cleaned.is_empty() {
        return Err(Error::EmptyInput(
            "no meaningful text content after normalization".to_string(),
        ));
    }
    let classification = classify(&cleaned);
    let language = triage_text::language::keyword_fallback(&cleaned);
    Ok(assemble(
        classification,
        language,
        Vec::new(),
        Vec::new(),
        started.elapsed().as_secs_f64() * 1000.0,
    ))
}
