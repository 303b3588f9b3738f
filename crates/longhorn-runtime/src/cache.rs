//! Per-path cache of extracted PDF text and its embedding.
//!
//! Entries are filled on first use and kept for the life of the cache. They
//! are never refreshed if the file changes on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use longhorn_core::Result;
use longhorn_infer::EmbedderBackend;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::types::DocumentRecord;

/// Thread-safe map from document path to its loaded record.
#[derive(Default)]
pub struct DocumentCache {
    entries: RwLock<HashMap<PathBuf, Arc<DocumentRecord>>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached record for `path`, loading the PDF and embedding its
    /// full text on a miss.
    pub fn get_or_compute(
        &self,
        path: &Path,
        embedder: &dyn EmbedderBackend,
    ) -> Result<Arc<DocumentRecord>> {
        self.get_or_insert_with(path, || {
            let text = longhorn_ingest::load_pdf_text(path)?;
            let embeddings = embedder.embed_batch(&[text.as_str()])?;
            Ok(DocumentRecord::new(path, text, embeddings))
        })
    }

    /// Return the cached record for `path`, building it with `load` on a miss.
    ///
    /// `load` runs without the lock held. Two callers racing on the same
    /// uncached path may both load; the first insert is kept and both get it.
    /// A failed load caches nothing.
    pub fn get_or_insert_with<F>(&self, path: &Path, load: F) -> Result<Arc<DocumentRecord>>
    where
        F: FnOnce() -> Result<DocumentRecord>,
    {
        if let Some(hit) = self.get(path) {
            debug!(
                "Document cache hit: {} (loaded {}s ago)",
                path.display(),
                hit.loaded_at()
                    .elapsed()
                    .map(|age| age.as_secs())
                    .unwrap_or_default()
            );
            return Ok(hit);
        }

        let record = Arc::new(load()?);

        let mut entries = self.entries.write();
        let stored = entries
            .entry(path.to_path_buf())
            .or_insert_with(|| {
                info!(
                    "Cached {} ({} chars, {} embedding rows)",
                    record.path().display(),
                    record.text().len(),
                    record.embeddings().nrows()
                );
                record.clone()
            })
            .clone();
        Ok(stored)
    }

    /// Cached record for `path`, if loaded.
    pub fn get(&self, path: &Path) -> Option<Arc<DocumentRecord>> {
        self.entries.read().get(path).cloned()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.read().contains_key(path)
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
