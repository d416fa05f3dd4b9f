use crate::types::SourceDocument;
use crate::Result;

/// Maps text to a fixed-dimension dense vector.
///
/// `dimension` is fixed per provider instance; blank input is rejected
/// with `Error::EmptyInput`. A provider's first call may trigger one-time
/// model acquisition, which fails with `Error::ModelUnavailable`.
pub trait EmbeddingProvider: Send + Sync {
    fn dimension(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// External supplier of corpus documents for index (re)builds.
pub trait DocumentSource: Send + Sync {
    fn fetch_documents(&self) -> Result<Vec<SourceDocument>>;
}
