//! Runtime: the per-document embedding cache and the pipeline that turns a
//! question into an answer.

pub mod cache;
pub mod pipeline;
pub mod types;

pub use cache::DocumentCache;
pub use pipeline::{AnswerPipeline, Retrieval};
pub use types::*;
