//! ONNX-based embedding engine using paraphrase-MiniLM-L6-v2.
//!
//! Loads a SentenceTransformers ONNX export and its tokenizer to generate
//! 384-dimensional float32 embeddings. Requires the `onnx` feature.

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;

    use longhorn_core::{Error, Result};
    use ndarray::Array1;
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::{Tokenizer, TruncationParams};
    use tracing::{debug, info};

    use crate::embedder::{EmbedderBackend, DEFAULT_DIM};

    /// paraphrase-MiniLM-L6-v2 truncates input to 128 word pieces.
    const MAX_SEQ_LEN: usize = 128;

    /// ONNX embedding engine using paraphrase-MiniLM-L6-v2.
    pub struct OnnxEmbedder {
        session: Mutex<Session>,
        tokenizer: Tokenizer,
        dimension: usize,
    }

    impl OnnxEmbedder {
        /// Load an ONNX model and tokenizer from the given directory.
        ///
        /// Expects:
        /// - `model_dir/model.onnx`: the ONNX model file
        /// - `model_dir/tokenizer.json`: the HuggingFace tokenizer
        pub fn load(model_dir: &Path) -> Result<Self> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            if !model_path.exists() {
                return Err(Error::Inference(format!(
                    "Model not found: {}",
                    model_path.display()
                )));
            }
            if !tokenizer_path.exists() {
                return Err(Error::Inference(format!(
                    "Tokenizer not found: {}",
                    tokenizer_path.display()
                )));
            }

            // With load-dynamic, ORT_DYLIB_PATH must point to libonnxruntime.so
            ort::init().commit();

            let session = Session::builder()
                .map_err(|e| inference("Failed to create session builder", e))?
                .with_intra_threads(2)
                .map_err(|e| inference("Failed to set threads", e))?
                .commit_from_file(&model_path)
                .map_err(|e| inference("Failed to load ONNX model", e))?;

            let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| inference("Failed to load tokenizer", e))?;
            truncate_to_max_len(&mut tokenizer)?;

            info!(
                "ONNX embedder loaded: dim={}, model={}",
                DEFAULT_DIM,
                model_path.display()
            );

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                dimension: DEFAULT_DIM,
            })
        }

        fn infer(&self, text: &str) -> Result<Array1<f32>> {
            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| inference("Tokenization failed", e))?;

            let input_ids = encoding.get_ids();
            let attention_mask = encoding.get_attention_mask();
            let seq_len = input_ids.len();
            debug!("Embedding {} chars as {} tokens", text.len(), seq_len);

            let ids_data: Vec<i64> = input_ids.iter().map(|&id| id as i64).collect();
            let mask_data: Vec<i64> = attention_mask.iter().map(|&m| m as i64).collect();
            let type_ids_data: Vec<i64> = vec![0i64; seq_len];

            let ids_tensor = Tensor::from_array(([1usize, seq_len], ids_data))
                .map_err(|e| inference("Failed to create ids tensor", e))?;
            let mask_tensor = Tensor::from_array(([1usize, seq_len], mask_data))
                .map_err(|e| inference("Failed to create mask tensor", e))?;
            let type_ids_tensor = Tensor::from_array(([1usize, seq_len], type_ids_data))
                .map_err(|e| inference("Failed to create type_ids tensor", e))?;

            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![ids_tensor, mask_tensor, type_ids_tensor])
                .map_err(|e| inference("ONNX inference failed", e))?;

            // SentenceTransformers exports output either
            //   [1, seq_len, dim] token embeddings (mean pooling needed) or
            //   [1, dim] sentence embedding (already pooled).
            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| inference("Failed to extract output tensor", e))?;

            let shape_dims: Vec<i64> = shape.iter().copied().collect();

            match shape_dims.as_slice() {
                [_, _, dim] => mean_pool(data, attention_mask, *dim as usize),
                [_, dim] => {
                    let dim = *dim as usize;
                    Ok(Array1::from_vec(data[..dim].to_vec()))
                }
                _ => Err(Error::Inference(format!(
                    "Unexpected output shape: {:?}",
                    shape_dims
                ))),
            }
        }
    }

    /// Attention-masked mean over `[1][seq_len][dim]` token embeddings.
    fn mean_pool(data: &[f32], attention_mask: &[u32], dim: usize) -> Result<Array1<f32>> {
        let mask_sum: f32 = attention_mask.iter().map(|&m| m as f32).sum();
        if mask_sum < 1e-9 {
            return Err(Error::Inference("empty attention mask".into()));
        }

        let mut pooled = Array1::zeros(dim);
        for (i, &m) in attention_mask.iter().enumerate() {
            if m > 0 {
                let offset = i * dim;
                for d in 0..dim {
                    pooled[d] += data[offset + d] * m as f32;
                }
            }
        }
        Ok(pooled / mask_sum)
    }

    /// Cut encodings to `MAX_SEQ_LEN` word pieces, leaving room for the
    /// `[CLS]`/`[SEP]` pair the post-processor adds.
    pub(super) fn truncate_to_max_len(tokenizer: &mut Tokenizer) -> Result<()> {
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| inference("Failed to configure truncation", e))?;
        Ok(())
    }

    fn inference(context: &str, e: impl std::fmt::Display) -> Error {
        Error::Inference(format!("{}: {}", context, e))
    }

    impl EmbedderBackend for OnnxEmbedder {
        fn embed(&self, text: &str) -> Result<Array1<f32>> {
            self.infer(text)
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn is_available(&self) -> bool {
            true
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxEmbedder;
