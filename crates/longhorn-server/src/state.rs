//! Shared application state.

use std::path::Path;
use std::sync::Arc;

use longhorn_chat::{GeminiClient, GenerationClient, PromptComposer};
use longhorn_core::{LonghornConfig, Result};
use longhorn_infer::EmbedderBackend;
use longhorn_runtime::AnswerPipeline;
use tracing::{info, warn};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: LonghornConfig,
    pub pipeline: Arc<AnswerPipeline>,
}

impl AppState {
    /// Wire the pipeline from configuration and an already-loaded embedder.
    pub fn new(config: LonghornConfig, embedder: Arc<dyn EmbedderBackend>) -> Result<Self> {
        let client = GeminiClient::new(&config.gemini)?;
        if client.has_api_key() {
            info!("Generation model: {}", client.model());
        } else {
            warn!(
                "GOOGLE_API_KEY is not set; questions to {} will fail until it is provided",
                client.model()
            );
        }
        let generator: Arc<dyn GenerationClient> = Arc::new(client);
        Ok(Self::with_clients(config, embedder, generator))
    }

    /// Wire the pipeline with explicit clients.
    pub fn with_clients(
        config: LonghornConfig,
        embedder: Arc<dyn EmbedderBackend>,
        generator: Arc<dyn GenerationClient>,
    ) -> Self {
        let pipeline = AnswerPipeline::new(embedder, generator)
            .with_composer(
                PromptComposer::new().with_max_context_chars(config.document.max_context_chars),
            )
            .with_top_k(config.document.top_k);

        Self {
            config,
            pipeline: Arc::new(pipeline),
        }
    }

    /// The PDF every question is answered against.
    pub fn document_path(&self) -> &Path {
        &self.config.document.pdf_path
    }
}
