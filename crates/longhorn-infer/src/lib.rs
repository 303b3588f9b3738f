//! Longhorn Infer: sentence embeddings and similarity ranking.
//!
//! Provides the `EmbedderBackend` trait for generating embeddings.
//! When the `onnx` feature is enabled and model files are present,
//! `OnnxEmbedder` loads paraphrase-MiniLM-L6-v2 for 384-dim embeddings.
//! Without it, `UnavailableEmbedder` is used and every embed call fails.

pub mod embedder;
pub mod onnx_embedder;
pub mod similarity;

pub use embedder::{EmbedderBackend, UnavailableEmbedder, DEFAULT_DIM};
pub use similarity::{cosine_scores, cosine_similarity, top_k_indices};

#[cfg(feature = "onnx")]
pub use onnx_embedder::OnnxEmbedder;

use std::path::Path;
use std::sync::Arc;

/// Create the best available embedder for the given model directory.
///
/// Tries ONNX first (if feature enabled and model files present),
/// falls back to `UnavailableEmbedder` so the server can still start.
pub fn create_embedder(model_dir: &Path) -> Arc<dyn EmbedderBackend> {
    #[cfg(feature = "onnx")]
    {
        match OnnxEmbedder::load(model_dir) {
            Ok(embedder) => {
                tracing::info!("Using ONNX embedder (dim={})", embedder.dimension());
                return Arc::new(embedder);
            }
            Err(e) => {
                tracing::warn!("ONNX embedder unavailable: {}. Questions will fail until it loads.", e);
            }
        }
    }

    #[cfg(not(feature = "onnx"))]
    {
        tracing::warn!(
            "ONNX feature disabled; no embedder for {}",
            model_dir.display()
        );
    }

    Arc::new(UnavailableEmbedder::new(
        DEFAULT_DIM,
        format!("no embedding model loaded from {}", model_dir.display()),
    ))
}
