//! Deterministic hashing embedder.
//!
//! Buckets each whitespace token into the vector by xxHash, with a small
//! positional component so reordered text embeds differently, then
//! L2-normalizes. Same text always yields the same vector, which is what
//! the index and pipeline tests rely on.

use std::hash::{Hash, Hasher};

use twox_hash::XxHash64;

use triage_core::traits::EmbeddingProvider;
use triage_core::{Error, Result};

pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput("text cannot be blank".to_string()));
        }
        let mut v = vec![0f32; self.dimension];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dimension;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(Error::EmptyInput("texts cannot be empty".to_string()));
        }
        texts.iter().map(|t| self.embed(t)).collect()
    }
}
