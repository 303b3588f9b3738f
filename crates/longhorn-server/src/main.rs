//! Longhorn answers questions about one PDF with MiniLM embeddings and Gemini.

use std::sync::Arc;

use longhorn_core::LonghornConfig;
use longhorn_server::{build_router, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env once; values already in the environment win.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Failed to read .env: {}", e),
    }

    let args: Vec<String> = std::env::args().collect();
    let command = Command::from_args(&args);

    match &command {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::Unknown(other) => {
            eprintln!("Unknown command: {}. Use 'longhorn help' for usage.", other);
            std::process::exit(1);
        }
        Command::Check | Command::Serve => {}
    }

    let config = LonghornConfig::from_env()?;

    if command == Command::Check {
        let ok = check(&config);
        std::process::exit(if ok { 0 } else { 1 });
    }

    info!("Document: {}", config.document.pdf_path.display());

    let embedder = longhorn_infer::create_embedder(&config.document.model_dir);
    let port = config.server.port;
    let state = Arc::new(AppState::new(config, embedder)?);

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Longhorn server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Top-level command taken from the first CLI argument.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Serve,
    Check,
    Help,
    Unknown(String),
}

impl Command {
    fn from_args(args: &[String]) -> Self {
        match args.get(1).map(String::as_str) {
            None => Command::Serve,
            Some("--check" | "check") => Command::Check,
            Some("--help" | "-h" | "help") => Command::Help,
            Some(other) => Command::Unknown(other.to_string()),
        }
    }
}

fn print_help() {
    println!("Longhorn: question answering over a single PDF");
    println!();
    println!("Usage: longhorn [command]");
    println!();
    println!("Commands:");
    println!("  (none)    Start the server");
    println!("  check     Verify the PDF, embedding model and API key");
    println!("  help      Show this help message");
}

/// Report whether everything a question needs is in place.
fn check(config: &LonghornConfig) -> bool {
    let mut ok = true;

    let pdf = &config.document.pdf_path;
    match longhorn_ingest::page_count(pdf) {
        Ok(pages) => println!("  PDF:       {} ({} pages)", pdf.display(), pages),
        Err(e) => {
            println!("  PDF:       FAILED: {}", e);
            ok = false;
        }
    }

    let embedder = longhorn_infer::create_embedder(&config.document.model_dir);
    if embedder.is_available() {
        println!(
            "  Embedder:  {} (dim={})",
            config.document.model_dir.display(),
            embedder.dimension()
        );
    } else {
        println!(
            "  Embedder:  FAILED: no model in {}",
            config.document.model_dir.display()
        );
        ok = false;
    }

    if config.gemini.api_key.is_some() {
        println!("  Gemini:    {} (key set)", config.gemini.model);
    } else {
        println!("  Gemini:    FAILED: GOOGLE_API_KEY is not set");
        ok = false;
    }

    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_arguments_serves() {
        assert_eq!(Command::from_args(&args(&["longhorn"])), Command::Serve);
    }

    #[test]
    fn test_command_names() {
        for name in ["check", "--check"] {
            assert_eq!(Command::from_args(&args(&["longhorn", name])), Command::Check);
        }
        for name in ["help", "--help", "-h"] {
            assert_eq!(Command::from_args(&args(&["longhorn", name])), Command::Help);
        }
        assert_eq!(
            Command::from_args(&args(&["longhorn", "serve-forever"])),
            Command::Unknown("serve-forever".into())
        );
    }

    #[test]
    fn test_help_does_not_need_valid_config() {
        // A bad PORT fails config parsing, but help is dispatched first.
        let broken = LonghornConfig::from_lookup(|key| match key {
            "PORT" => Some("not-a-port".into()),
            _ => None,
        });
        assert!(broken.is_err());
        assert_eq!(Command::from_args(&args(&["longhorn", "help"])), Command::Help);
    }
}
