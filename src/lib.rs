use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error(
        "Index was built with embedding model '{index_model}' but '{configured_model}' is configured; rebuild it with `index --rebuild`"
    )]
    IndexModelMismatch {
        index_model: String,
        configured_model: String,
    },

    #[error("Index build already in progress (lock file {0}); remove it if no build is running")]
    IndexLocked(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AdvisorError {
    #[inline]
    fn from(error: config::ConfigError) -> Self {
        Self::Config(error.to_string())
    }
}

pub mod advisor;
pub mod chat;
pub mod commands;
pub mod config;
pub mod database;
pub mod documents;
pub mod embeddings;
pub mod index;
pub mod llm;
pub mod openai;
pub mod retrieval;
