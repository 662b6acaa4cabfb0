
use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::advisor::{Advisor, AdvisorSettings};
use crate::chat::{Banner, ChatSession, run_repl};
use crate::config::{Config, Credentials};
use crate::index::{IndexLoader, IndexManifest};
use crate::openai::OpenAiClient;

/// Load `advisor.toml` under `root`, apply environment overrides and validate
#[inline]
pub fn load_config(root: &Path) -> Result<Config> {
    let mut config = Config::load(root).context("Failed to load configuration")?;
    config
        .apply_env_overrides()
        .context("Invalid environment override")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn connect_client(config: &Config) -> Result<Arc<OpenAiClient>> {
    let credentials = Credentials::from_env()?;
    let client = OpenAiClient::new(config, &credentials)?;
    Ok(Arc::new(client))
}

async fn build_advisor(config: Config) -> Result<(Advisor, IndexManifest)> {
    let client = connect_client(&config)?;
    let settings = AdvisorSettings::from(&config);
    let embedder: Arc<OpenAiClient> = Arc::clone(&client);
    let loader = IndexLoader::new(config, embedder);

    let index = loader
        .get_index()
        .await
        .context("Failed to load the accessibility index")?;
    let manifest = index.manifest().clone();

    Ok((Advisor::new(client, index, settings), manifest))
}

/// Check that the provider answers and serves the configured embedding model
#[inline]
pub fn check_provider(config: &Config, credentials: &Credentials) -> Result<()> {
    let client = OpenAiClient::new(config, credentials)?;
    client.health_check()
}

/// One-line description of a built index
#[inline]
pub fn index_summary(manifest: &IndexManifest) -> String {
    format!(
        "Index: {} passages from {} documents ({}, built {})",
        manifest.entry_count,
        manifest.document_count,
        manifest.embedding_model,
        manifest.built_at.format("%Y-%m-%d %H:%M UTC")
    )
}

/// Start the interactive chat
#[inline]
pub async fn chat(root: &Path) -> Result<()> {
    let config = load_config(root)?;

    eprintln!("{}", style("Initializing advisor...").dim());
    let (advisor, manifest) = build_advisor(config).await?;

    let banner = Banner {
        index_summary: Some(index_summary(&manifest)),
    };
    run_repl(ChatSession::new(advisor), &banner).await
}

/// Answer a single question and print the response
#[inline]
pub async fn ask(root: &Path, question: &str) -> Result<()> {
    let config = load_config(root)?;
    let (advisor, _) = build_advisor(config).await?;

    let response = advisor.answer(question).await?;
    println!("{}", response);
    Ok(())
}

/// Build the index if needed, or unconditionally with `rebuild`
#[inline]
pub async fn build_index(root: &Path, rebuild: bool) -> Result<()> {
    let config = load_config(root)?;
    let client = connect_client(&config)?;
    let mut loader = IndexLoader::new(config, client);

    let index = if rebuild {
        info!("Rebuilding index at {}", loader.index_path().display());
        loader.rebuild().await?
    } else {
        loader.get_index().await?
    };

    let manifest = index.manifest();
    println!("{}", style("✓ Index ready").green());
    println!("  Location: {}", loader.index_path().display());
    println!("  Documents: {}", manifest.document_count);
    println!("  Entries: {}", manifest.entry_count);
    println!("  Embedding model: {}", manifest.embedding_model);
    if let Some(dimension) = manifest.dimension {
        println!("  Dimension: {}", dimension);
    }
    if manifest.entry_count == 0 {
        warn!("The index is empty; answers will not cite any documents");
    }

    Ok(())
}

/// Print the persisted index state and the provider's health
#[inline]
pub fn show_status(root: &Path) -> Result<()> {
    let config = load_config(root)?;
    let index_path = config.index_path();

    println!("{}", style("📊 Accessibility Advisor Status").bold().cyan());
    println!();
    println!("Project root: {}", config.project_root().display());
    println!(
        "Documents directory: {} ({})",
        config.docs_dir().display(),
        if config.docs_dir().is_dir() {
            "present"
        } else {
            "missing"
        }
    );
    println!();

    match IndexManifest::read(&index_path)? {
        Some(manifest) => {
            println!("{}", style(index_summary(&manifest)).green());
            println!("  Location: {}", index_path.display());
            println!(
                "  Chunking: {} chars, {} overlap",
                manifest.chunk_size, manifest.chunk_overlap
            );
            if manifest.embedding_model != config.models.embedding_model {
                println!(
                    "{}",
                    style(format!(
                        "⚠ Configured embedding model '{}' differs; run `index --rebuild`",
                        config.models.embedding_model
                    ))
                    .yellow()
                );
            }
        }
        None => println!("{}", style("Index: not built").yellow()),
    }

    println!();
    println!("{}", style("Provider:").bold());
    match Credentials::from_env() {
        Ok(credentials) => match check_provider(&config, &credentials) {
            Ok(()) => {
                println!(
                    "{}",
                    style(format!("✓ Connected to {}", config.provider.base_url)).green()
                );
                println!("  Verifier model: {}", config.models.verifier_model);
                println!("  Advisor model: {}", config.models.advisor_model);
                println!("  Embedding model: {}", config.models.embedding_model);
            }
            Err(e) => {
                warn!("Provider health check failed: {:#}", e);
                println!(
                    "{}",
                    style(format!("⚠ {} is unhealthy: {:#}", config.provider.base_url, e))
                        .yellow()
                );
            }
        },
        Err(e) => println!("{}", style(format!("✗ {}", e)).red()),
    }

    if config.build_lock_path().exists() {
        println!(
            "{}",
            style(format!(
                "⚠ Build lock present at {}",
                config.build_lock_path().display()
            ))
            .yellow()
        );
    }

    Ok(())
}
