//! Embedding providers for the ticket pipeline.
//!
//! The real provider is a candle-based MiniLM-class sentence encoder
//! loaded from a local model directory. The hashing provider is a
//! deterministic stand-in for tests and development; set
//! `APP_USE_FAKE_EMBEDDINGS=1` (or `embedding.provider = "hash"`) to
//! select it without touching any model files.

pub mod device;
pub mod hash;
pub mod minilm;

use std::sync::Arc;

use tracing::info;
use triage_core::config::{expand_path, Config};
use triage_core::traits::EmbeddingProvider;
use triage_core::Result;

pub use hash::HashEmbedder;
pub use minilm::MiniLmEmbedder;

/// Dimension of the MiniLM family and the default for the hashing
/// provider, so the two stay interchangeable on disk.
pub const DEFAULT_DIMENSION: usize = 384;

fn fake_embeddings_requested() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Construct a provider from already-resolved settings.
///
/// Model acquisition happens here, once; a missing or unloadable model
/// is `Error::ModelUnavailable` and permanent for the process.
pub fn provider_from_settings(
    kind: &str,
    dimension: usize,
    model_dir: Option<&std::path::Path>,
) -> Result<Arc<dyn EmbeddingProvider>> {
    if fake_embeddings_requested() || kind == "hash" {
        info!(dimension, "using deterministic hash embedder");
        return Ok(Arc::new(HashEmbedder::new(dimension)));
    }
    let model_dir = match model_dir {
        Some(dir) => dir.to_path_buf(),
        None => minilm::locate_model_dir()?,
    };
    Ok(Arc::new(MiniLmEmbedder::load(&model_dir)?))
}

/// Construct the embedding provider named by the loaded configuration.
pub fn default_provider(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    let kind: String = config.get_or("embedding.provider", "minilm".to_string());
    let dimension: usize = config.get_or("embedding.dimension", DEFAULT_DIMENSION);
    let model_dir = resolve_model_dir(config);
    provider_from_settings(&kind, dimension, model_dir.as_deref())
}

/// Model directory from config, when set and present on disk.
pub fn resolve_model_dir(config: &Config) -> Option<std::path::PathBuf> {
    config
        .get::<String>("embedding.model_dir")
        .ok()
        .map(expand_path)
        .filter(|d| d.exists())
}

/// Resolve an override for the model directory from the environment,
/// mirroring the config key `embedding.model_dir`.
pub(crate) fn model_dir_override() -> Option<std::path::PathBuf> {
    std::env::var("APP_EMBEDDING_MODEL_DIR")
        .ok()
        .map(expand_path)
}
