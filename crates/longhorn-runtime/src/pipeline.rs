//! Question answering: cached document → query embedding → ranking →
//! prompt → generation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use longhorn_chat::{GenerationClient, PromptComposer};
use longhorn_core::{Error, Result};
use longhorn_infer::EmbedderBackend;
use tracing::{debug, info};

use crate::cache::DocumentCache;
use crate::types::{DocumentRecord, DEFAULT_TOP_K};

/// Everything computed before the generation call.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub record: Arc<DocumentRecord>,
    /// `(row, score)` per selected context slot, best first.
    pub ranked: Vec<(usize, f32)>,
    pub prompt: String,
}

/// Owns the document cache and the clients a question passes through.
pub struct AnswerPipeline {
    cache: DocumentCache,
    embedder: Arc<dyn EmbedderBackend>,
    generator: Arc<dyn GenerationClient>,
    composer: PromptComposer,
    top_k: usize,
}

impl AnswerPipeline {
    pub fn new(embedder: Arc<dyn EmbedderBackend>, generator: Arc<dyn GenerationClient>) -> Self {
        Self {
            cache: DocumentCache::new(),
            embedder,
            generator,
            composer: PromptComposer::new(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Number of context slots to select. Values below 1 are raised to 1.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub fn embedder(&self) -> &Arc<dyn EmbedderBackend> {
        &self.embedder
    }

    /// Load (or reuse) the document, embed the question, rank and compose
    /// the prompt. CPU-bound and blocking.
    pub fn retrieve(&self, path: &Path, question: &str) -> Result<Retrieval> {
        let record = self.cache.get_or_compute(path, self.embedder.as_ref())?;
        let query = self.embedder.embed(question)?;

        let contexts = record.select_contexts(&query, self.top_k);
        if contexts.is_empty() {
            return Err(Error::Inference(format!(
                "no embeddings for {}",
                path.display()
            )));
        }
        debug!(
            "Selected {} contexts, best score {:.4}",
            contexts.len(),
            contexts[0].score
        );

        let texts: Vec<&str> = contexts.iter().map(|c| c.text).collect();
        let prompt = self.composer.compose(question, &texts);
        let ranked = contexts.iter().map(|c| (c.row, c.score)).collect();

        Ok(Retrieval {
            record,
            ranked,
            prompt,
        })
    }

    /// Answer `question` against the PDF at `path`.
    ///
    /// Retrieval runs on a blocking task; the generation call is awaited
    /// directly.
    pub async fn answer(self: &Arc<Self>, path: &Path, question: &str) -> Result<String> {
        let start = Instant::now();

        let pipeline = Arc::clone(self);
        let path_buf: PathBuf = path.to_path_buf();
        let question_owned = question.to_string();
        let retrieval =
            tokio::task::spawn_blocking(move || pipeline.retrieve(&path_buf, &question_owned))
                .await
                .map_err(|e| Error::Internal(format!("retrieval task failed: {}", e)))??;

        let answer = self.generator.generate(&retrieval.prompt).await?;

        info!(
            "Answered {} char question in {}ms ({} char prompt)",
            question.len(),
            start.elapsed().as_millis(),
            retrieval.prompt.len()
        );
        Ok(answer)
    }
}
