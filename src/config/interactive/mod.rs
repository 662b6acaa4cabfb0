
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};
use std::path::Path;

use super::{Config, Credentials, ModelConfig, ProviderConfig};

#[inline]
pub fn run_interactive_config(project_root: &Path) -> Result<()> {
    println!("{}", style("🍁 Accessibility Advisor Configuration").bold().cyan());
    println!();

    let mut config = load_existing_config(project_root)?;

    println!("{}", style("Model Provider").bold().yellow());
    println!("Any OpenAI-compatible endpoint can serve embeddings and completions.");
    println!();

    configure_provider(&mut config.provider)?;

    println!();
    println!("{}", style("Models").bold().yellow());
    configure_models(&mut config.models)?;

    let k_results: usize = Input::new()
        .with_prompt("Passages retrieved per question")
        .default(config.retrieval.k_results)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=50).contains(input) {
                Ok(())
            } else {
                Err("Must be between 1 and 50")
            }
        })
        .interact_text()?;
    config.retrieval.k_results = k_results;

    println!();
    match Credentials::from_env() {
        Ok(_) => println!("{}", style("✓ API key found in environment").green()),
        Err(e) => {
            println!("{}", style(format!("⚠ Warning: {e}")).yellow());
            println!("The advisor cannot embed documents or answer questions without it.");
        }
    }

    println!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        println!("{}", style("✓ Configuration saved successfully!").green());
        println!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
        println!(
            "{}",
            style("If you changed the embedding model, rebuild the index with `index --rebuild`.")
                .dim()
        );
    } else {
        println!("Configuration not saved.");
    }

    Ok(())
}

/// Print the configuration in effect, including environment overrides
#[inline]
pub fn show_config(project_root: &Path) -> Result<()> {
    let config = effective_config(project_root, |key| std::env::var(key).ok())?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Models:").bold().yellow());
    eprintln!("  Verifier: {}", style(&config.models.verifier_model).cyan());
    eprintln!("  Advisor: {}", style(&config.models.advisor_model).cyan());
    eprintln!("  Embedding: {}", style(&config.models.embedding_model).cyan());
    eprintln!("  Temperature: {}", style(config.models.temperature).cyan());

    eprintln!();
    eprintln!("{}", style("Provider:").bold().yellow());
    match config.provider.base_url() {
        Ok(url) => eprintln!("  Base URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Base URL: {} ({})", style("Invalid").red(), e),
    }
    eprintln!(
        "  Embedding Batch Size: {}",
        style(config.provider.embedding_batch_size).cyan()
    );
    eprintln!(
        "  Request Timeout: {}s",
        style(config.provider.request_timeout_seconds).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Index:").bold().yellow());
    eprintln!("  Chunk Size: {}", style(config.chunking.chunk_size).cyan());
    eprintln!("  Chunk Overlap: {}", style(config.chunking.chunk_overlap).cyan());
    eprintln!("  Results per Question: {}", style(config.retrieval.k_results).cyan());
    eprintln!("  Documents: {}", style(config.docs_dir().display()).cyan());
    eprintln!("  Index Path: {}", style(config.index_path().display()).cyan());

    eprintln!();
    eprintln!("Config file: {}", style(config.config_file_path().display()).dim());

    Ok(())
}

fn effective_config<F>(project_root: &Path, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::load(project_root).context("Failed to load configuration")?;
    config
        .apply_overrides_from(lookup)
        .context("Invalid environment override")?;
    Ok(config)
}

fn load_existing_config(project_root: &Path) -> Result<Config> {
    Config::load(project_root).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("Existing configuration is invalid. Starting from defaults.").yellow()
            );
            Ok(Config {
                base_dir: project_root.to_path_buf(),
                ..Config::default()
            })
        },
        |config| {
            if config.config_file_path().exists() {
                eprintln!("{}", style("Found existing configuration.").green());
            }
            Ok(config)
        },
    )
}

fn configure_provider(provider: &mut ProviderConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("API base URL")
        .default(provider.base_url.clone())
        .validate_with(|input: &String| -> Result<(), String> {
            let candidate = ProviderConfig {
                base_url: input.clone(),
                ..ProviderConfig::default()
            };
            candidate.base_url().map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Embedding batch size")
        .default(provider.embedding_batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 2048 {
                Err("Batch size must be 2048 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    provider.set_base_url(base_url)?;
    provider.set_embedding_batch_size(batch_size)?;

    Ok(())
}

fn configure_models(models: &mut ModelConfig) -> Result<()> {
    let verifier: String = Input::new()
        .with_prompt("Relevance check model")
        .default(models.verifier_model.clone())
        .validate_with(non_empty)
        .interact_text()?;

    let advisor: String = Input::new()
        .with_prompt("Answer model")
        .default(models.advisor_model.clone())
        .validate_with(non_empty)
        .interact_text()?;

    let embedding: String = Input::new()
        .with_prompt("Embedding model")
        .default(models.embedding_model.clone())
        .validate_with(non_empty)
        .interact_text()?;

    models.set_verifier_model(verifier)?;
    models.set_advisor_model(advisor)?;
    models.set_embedding_model(embedding)?;

    Ok(())
}

#[expect(clippy::ptr_arg, reason = "dialoguer validators for String inputs receive &String")]
fn non_empty(input: &String) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("Model name cannot be empty")
    } else {
        Ok(())
    }
}
