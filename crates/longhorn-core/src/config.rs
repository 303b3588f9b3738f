//! Configuration loaded once from the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 5500;
pub const DEFAULT_PDF_PATH: &str = "University_of_Texas_at_Austin.pdf";
pub const DEFAULT_MODEL_DIR: &str = "models/paraphrase-MiniLM-L6-v2";
pub const DEFAULT_CONTEXT_TOP_K: usize = 3;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

/// The document being answered against and how it is embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// PDF path, relative to the working directory unless absolute.
    pub pdf_path: PathBuf,
    /// Directory holding `model.onnx` and `tokenizer.json`.
    pub model_dir: PathBuf,
    /// Number of ranked contexts selected per query.
    pub top_k: usize,
    /// Cap on context characters placed in the prompt. `None` means unbounded.
    pub max_context_chars: Option<usize>,
}

/// Remote generation settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub timeout: Option<Duration>,
}

// The API key must never reach the logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.into(),
            temperature: 0.9,
            top_p: 1.0,
            top_k: 1,
            max_output_tokens: 1000,
            timeout: None,
        }
    }
}

/// Top-level Longhorn configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LonghornConfig {
    pub server: ServerConfig,
    pub document: DocumentConfig,
    pub gemini: GeminiConfig,
}

impl LonghornConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server = ServerConfig {
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
        };

        let document = DocumentConfig {
            pdf_path: get("LONGHORN_PDF_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PDF_PATH)),
            model_dir: get("LONGHORN_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR)),
            top_k: parse_or(&get, "LONGHORN_TOP_K", DEFAULT_CONTEXT_TOP_K)?,
            max_context_chars: parse_opt(&get, "LONGHORN_MAX_CONTEXT_CHARS")?,
        };
        if document.top_k == 0 {
            return Err(Error::Config("LONGHORN_TOP_K must be at least 1".into()));
        }

        let defaults = GeminiConfig::default();
        let gemini = GeminiConfig {
            api_key: get("GOOGLE_API_KEY"),
            model: get("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: get("GEMINI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            temperature: parse_or(&get, "GEMINI_TEMPERATURE", defaults.temperature)?,
            top_p: parse_or(&get, "GEMINI_TOP_P", defaults.top_p)?,
            top_k: parse_or(&get, "GEMINI_TOP_K", defaults.top_k)?,
            max_output_tokens: parse_or(
                &get,
                "GEMINI_MAX_OUTPUT_TOKENS",
                defaults.max_output_tokens,
            )?,
            timeout: parse_opt::<u64, _>(&get, "GEMINI_TIMEOUT_SECS")?.map(Duration::from_secs),
        };

        Ok(Self {
            server,
            document,
            gemini,
        })
    }
}

fn parse_or<T, F>(get: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(get, key)?.unwrap_or(default))
}

fn parse_opt<T, F>(get: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("invalid value for {}: {:?}", key, raw))),
        None => Ok(None),
    }
}
