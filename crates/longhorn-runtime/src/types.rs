//! Runtime types.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use longhorn_infer::{cosine_scores, top_k_indices};
use ndarray::{Array1, Array2};

/// Default number of contexts selected per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Extracted text of one PDF together with its embedding.
///
/// Immutable once built. Each embedding row was computed from the whole
/// `text`; the document is not split into chunks.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    path: PathBuf,
    text: String,
    embeddings: Array2<f32>,
    loaded_at: SystemTime,
}

/// One selected context slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedContext<'a> {
    /// Embedding row the slot was ranked from.
    pub row: usize,
    /// Cosine similarity between the query and that row.
    pub score: f32,
    pub text: &'a str,
}

impl DocumentRecord {
    pub fn new(path: impl Into<PathBuf>, text: String, embeddings: Array2<f32>) -> Self {
        Self {
            path: path.into(),
            text,
            embeddings,
            loaded_at: SystemTime::now(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `(rows, dim)`; one row for a whole-document embedding.
    pub fn embeddings(&self) -> &Array2<f32> {
        &self.embeddings
    }

    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    /// Rank the embedding rows against `query` and fill `k` context slots.
    ///
    /// Slots follow descending score. Every row stands for the whole text, so
    /// once the rows run out the remaining slots repeat the best row. With a
    /// single-row record all `k` slots hold the same text.
    pub fn select_contexts(&self, query: &Array1<f32>, k: usize) -> Vec<RankedContext<'_>> {
        let scores = cosine_scores(query.view(), self.embeddings.view());
        let ranked = top_k_indices(scores.view(), k);
        let Some(&best) = ranked.first() else {
            return Vec::new();
        };

        (0..k)
            .map(|slot| {
                let row = ranked.get(slot).copied().unwrap_or(best);
                RankedContext {
                    row,
                    score: scores[row],
                    text: &self.text,
                }
            })
            .collect()
    }
}
