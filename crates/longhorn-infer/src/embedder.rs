//! Embedding engine trait and the fallback used when no model loads.
//!
//! Implementations:
//! - `OnnxEmbedder`: ONNX Runtime with paraphrase-MiniLM-L6-v2 (requires the `onnx` feature)
//! - `UnavailableEmbedder`: fails every call with the reason the model is missing

use longhorn_core::{Error, Result};
use ndarray::{Array1, Array2};

/// Embedding dimension of paraphrase-MiniLM-L6-v2.
pub const DEFAULT_DIM: usize = 384;

/// Trait for embedding backends.
pub trait EmbedderBackend: Send + Sync {
    /// Generate an embedding for a text string.
    fn embed(&self, text: &str) -> Result<Array1<f32>>;

    /// Embed a batch of texts into an `(N, dim)` matrix, one row per text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Array2<f32>> {
        let dim = self.dimension();
        let mut matrix = Array2::zeros((texts.len(), dim));
        for (i, text) in texts.iter().enumerate() {
            let embedding = self.embed(text)?;
            if embedding.len() != dim {
                return Err(Error::Inference(format!(
                    "embedding has {} dims, expected {}",
                    embedding.len(),
                    dim
                )));
            }
            matrix.row_mut(i).assign(&embedding);
        }
        Ok(matrix)
    }

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    /// Check if the embedder is available (model loaded).
    fn is_available(&self) -> bool;
}

/// Embedder that fails every request. Installed when the model cannot load.
pub struct UnavailableEmbedder {
    dim: usize,
    reason: String,
}

impl UnavailableEmbedder {
    pub fn new(dim: usize, reason: impl Into<String>) -> Self {
        Self {
            dim,
            reason: reason.into(),
        }
    }
}

impl EmbedderBackend for UnavailableEmbedder {
    fn embed(&self, _text: &str) -> Result<Array1<f32>> {
        Err(Error::Inference(self.reason.clone()))
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn is_available(&self) -> bool {
        false
    }
}
