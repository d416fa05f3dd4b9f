//! Background pipeline initialization.
//!
//! Model and index acquisition are slow (disk and CPU bound) and must
//! not block request handling. `spawn_init` runs the whole build on a
//! blocking task and publishes the result through a shared handle;
//! requests that arrive while the build runs are served degraded.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{error, info};

use triage_core::config::{expand_path, Config};
use triage_core::types::TicketAnalysis;
use triage_core::{Error, Result};
use triage_embed::provider_from_settings;
use triage_index::{IndexPaths, JsonCorpusSource, RetrievalEngine, VectorIndex};
use triage_text::LanguageDetector;

use crate::AnalysisPipeline;

/// Everything the build needs, resolved up front so the background task
/// owns plain data.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub vector_path: PathBuf,
    pub document_path: PathBuf,
    pub corpus_dir: PathBuf,
    pub embedding_provider: String,
    pub embedding_dimension: usize,
    pub model_dir: Option<PathBuf>,
    pub top_k: usize,
    pub prefer_secondary_language: bool,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            vector_path: expand_path(
                config.get_or("index.vector_path", "data/index/vectors.bin".to_string()),
            ),
            document_path: expand_path(
                config.get_or("index.document_path", "data/index/documents.json".to_string()),
            ),
            corpus_dir: expand_path(config.get_or("corpus.dir", "data/corpus".to_string())),
            embedding_provider: config.get_or("embedding.provider", "minilm".to_string()),
            embedding_dimension: config
                .get_or("embedding.dimension", triage_embed::DEFAULT_DIMENSION),
            model_dir: triage_embed::resolve_model_dir(config),
            top_k: config.get_or("retrieval.top_k", 3),
            prefer_secondary_language: config.get_or("language.prefer_secondary", false),
        }
    }
}

/// Construct every component and compose the pipeline. Blocking; run it
/// on a worker thread in async contexts.
pub fn build_pipeline(config: &PipelineConfig) -> Result<AnalysisPipeline> {
    let provider = provider_from_settings(
        &config.embedding_provider,
        config.embedding_dimension,
        config.model_dir.as_deref(),
    )?;
    let detector = LanguageDetector::new();
    let source = Arc::new(JsonCorpusSource::new(config.corpus_dir.clone()));
    let index = Arc::new(VectorIndex::load_or_build(
        IndexPaths {
            vectors: config.vector_path.clone(),
            documents: config.document_path.clone(),
        },
        provider.clone(),
        source.as_ref(),
    )?);
    let engine = RetrievalEngine::new(index, provider.clone(), source);
    Ok(AnalysisPipeline::new(
        provider,
        detector,
        engine,
        config.top_k,
        config.prefer_secondary_language,
    ))
}

/// Lifecycle of the background build.
pub enum PipelineState {
    Warming,
    Ready(Arc<AnalysisPipeline>),
    Failed(String),
}

/// Shared, cheaply clonable view of the pipeline lifecycle.
#[derive(Clone)]
pub struct PipelineHandle {
    state: Arc<RwLock<PipelineState>>,
}

impl PipelineHandle {
    fn new(state: PipelineState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Analyze a ticket with whatever is currently available.
    ///
    /// While warming, rules and keyword language detection still run
    /// and recommendations are empty. A failed build means the process
    /// has no embedding capability, which is fatal for analysis.
    pub fn analyze(&self, text: &str) -> Result<TicketAnalysis> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        match &*state {
            PipelineState::Ready(pipeline) => pipeline.analyze(text),
            PipelineState::Warming => crate::degraded_analysis(text),
            PipelineState::Failed(reason) => Err(Error::ModelUnavailable(reason.clone())),
        }
    }

    pub fn pipeline(&self) -> Option<Arc<AnalysisPipeline>> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        match &*state {
            PipelineState::Ready(pipeline) => Some(pipeline.clone()),
            _ => None,
        }
    }

    pub fn is_warming(&self) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        matches!(&*state, PipelineState::Warming)
    }

    /// Wait for the background build to settle, returning the pipeline
    /// or the build failure.
    pub async fn wait_ready(&self) -> Result<Arc<AnalysisPipeline>> {
        loop {
            {
                let state = self.state.read().unwrap_or_else(|e| e.into_inner());
                match &*state {
                    PipelineState::Ready(pipeline) => return Ok(pipeline.clone()),
                    PipelineState::Failed(reason) => {
                        return Err(Error::ModelUnavailable(reason.clone()))
                    }
                    PipelineState::Warming => {}
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }

    fn publish(&self, state: PipelineState) {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        *guard = state;
    }
}

/// Start the pipeline build on a background blocking task and return
/// immediately with a handle that serves degraded results until the
/// build settles.
pub fn spawn_init(config: PipelineConfig) -> PipelineHandle {
    let handle = PipelineHandle::new(PipelineState::Warming);
    let publisher = handle.clone();
    tokio::spawn(async move {
        let built = tokio::task::spawn_blocking(move || build_pipeline(&config)).await;
        match built {
            Ok(Ok(pipeline)) => {
                info!("pipeline initialization complete");
                publisher.publish(PipelineState::Ready(Arc::new(pipeline)));
            }
            Ok(Err(e)) => {
                error!(error = %e, "pipeline initialization failed");
                publisher.publish(PipelineState::Failed(e.to_string()));
            }
            Err(e) => {
                error!(error = %e, "pipeline initialization task panicked");
                publisher.publish(PipelineState::Failed(e.to_string()));
            }
        }
    });
    handle
}
