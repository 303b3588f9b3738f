//! Longhorn Ingest: text extraction from the source PDF.

pub mod pdf;

pub use pdf::{load_pdf_text, page_count};
