//! Local MiniLM-class sentence encoder on candle.
//!
//! Loads tokenizer.json + config.json + model.safetensors from a model
//! directory, runs the BERT encoder, and pools with a masked mean
//! followed by L2 normalization so inner product equals cosine
//! similarity downstream.

use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use triage_core::traits::EmbeddingProvider;
use triage_core::{Error, Result};

use crate::device::select_device;

const MAX_LEN: usize = 256;

pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
}

fn unavailable(context: &str, err: impl std::fmt::Display) -> Error {
    Error::ModelUnavailable(format!("{context}: {err}"))
}

fn tensor_err(err: candle_core::Error) -> Error {
    Error::Operation(format!("embedding forward pass: {err}"))
}

impl MiniLmEmbedder {
    /// One-time model acquisition. Any failure here is fatal for the
    /// embedding capability; callers fall back per their own policy.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let started = Instant::now();
        let device = select_device();

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| unavailable("loading tokenizer", e))?;

        let config_path = model_dir.join("config.json");
        let config_text = std::fs::read_to_string(&config_path)
            .map_err(|e| unavailable("reading model config", e))?;
        let config: BertConfig =
            serde_json::from_str(&config_text).map_err(|e| unavailable("parsing model config", e))?;

        let weights_path = model_dir.join("model.safetensors");
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)
                .map_err(|e| unavailable("mapping model weights", e))?
        };
        let model =
            BertModel::load(vb, &config).map_err(|e| unavailable("building encoder", e))?;

        info!(
            model_dir = %model_dir.display(),
            hidden_size = config.hidden_size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "embedding model loaded"
        );
        Ok(Self {
            model,
            tokenizer,
            device,
            dimension: config.hidden_size,
        })
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let enc = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::Operation(format!("tokenization failed: {e}")))?;
        let mut ids = enc.get_ids().to_vec();
        let mut mask = enc.get_attention_mask().to_vec();
        if ids.len() > MAX_LEN {
            ids.truncate(MAX_LEN);
            mask.truncate(MAX_LEN);
        }
        let len = ids.len();

        let input_ids = Tensor::new(ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(tensor_err)?;
        let attention_mask = Tensor::new(mask.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(tensor_err)?;
        let token_type_ids =
            Tensor::zeros((1, len), DType::U32, &self.device).map_err(tensor_err)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(tensor_err)?;

        // Masked mean over the sequence axis, then unit-normalize.
        let mask_f = attention_mask.to_dtype(hidden.dtype()).map_err(tensor_err)?;
        let mask_3d = mask_f
            .unsqueeze(2)
            .and_then(|m| m.broadcast_as(hidden.shape()))
            .map_err(tensor_err)?;
        let summed = (&hidden * &mask_3d)
            .and_then(|h| h.sum(1))
            .map_err(tensor_err)?;
        let counts = mask_f.sum_keepdim(1).map_err(tensor_err)?;
        let mean = summed.broadcast_div(&counts).map_err(tensor_err)?;
        let norm = mean
            .sqr()
            .and_then(|m| m.sum_keepdim(1))
            .and_then(|m| m.sqrt())
            .map_err(tensor_err)?;
        let embedding = mean.broadcast_div(&norm).map_err(tensor_err)?;

        let values: Vec<f32> = embedding
            .squeeze(0)
            .and_then(|e| e.to_vec1())
            .map_err(tensor_err)?;
        debug!(tokens = len, "embedded text");
        Ok(values)
    }
}

impl EmbeddingProvider for MiniLmEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput("text cannot be blank".to_string()));
        }
        self.encode(text)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(Error::EmptyInput("texts cannot be empty".to_string()));
        }
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Locate the on-disk model directory: explicit env override first, then
/// the conventional checkout locations.
pub fn locate_model_dir() -> Result<PathBuf> {
    if let Some(dir) = crate::model_dir_override() {
        if dir.exists() {
            info!(dir = %dir.display(), "using APP_EMBEDDING_MODEL_DIR");
            return Ok(dir);
        }
    }
    for candidate in ["models/all-MiniLM-L6-v2", "../models/all-MiniLM-L6-v2"] {
        let dir = PathBuf::from(candidate);
        if dir.exists() {
            info!(dir = %dir.display(), "using model dir");
            return Ok(dir);
        }
    }
    Err(Error::ModelUnavailable(
        "could not locate an embedding model directory".to_string(),
    ))
}
