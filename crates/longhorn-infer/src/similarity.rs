//! Cosine similarity and top-k ranking over embedding matrices.

use std::cmp::Ordering;

use ndarray::{Array1, ArrayView1, ArrayView2};

/// Norms below this are treated as zero vectors.
const NORM_EPSILON: f32 = 1e-9;

/// Cosine similarity of two vectors. Zero when either vector has no magnitude.
pub fn cosine_similarity(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a < NORM_EPSILON || norm_b < NORM_EPSILON {
        return 0.0;
    }
    a.dot(&b) / (norm_a * norm_b)
}

/// Score `query` against every row of `matrix`: `(N, dim) · (dim,) → (N,)`.
///
/// Rows and query are normalized first, so each score is a cosine similarity.
/// Zero-magnitude rows score 0.0; a zero-magnitude query scores 0.0 everywhere.
pub fn cosine_scores(query: ArrayView1<'_, f32>, matrix: ArrayView2<'_, f32>) -> Array1<f32> {
    let q_norm = query.dot(&query).sqrt();
    if q_norm < NORM_EPSILON {
        return Array1::zeros(matrix.nrows());
    }
    let q = &query / q_norm;

    let mut normalized = matrix.to_owned();
    for mut row in normalized.rows_mut() {
        let norm = row.dot(&row).sqrt();
        if norm > NORM_EPSILON {
            row /= norm;
        } else {
            row.fill(0.0);
        }
    }

    normalized.dot(&q)
}

/// Row indices ordered by descending score, truncated to `min(k, N)`.
///
/// NaN scores sort last.
pub fn top_k_indices(scores: ArrayView1<'_, f32>, k: usize) -> Vec<usize> {
    let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
    });
    indexed.truncate(k);
    indexed.into_iter().map(|(i, _)| i).collect()
}
