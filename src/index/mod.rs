// Similarity index
// Builds the LanceDB table from the docs corpus once and reopens it on later runs

#[cfg(test)]
mod tests;

pub mod lock;
pub mod manifest;

pub use lock::BuildLock;
pub use manifest::IndexManifest;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::database::{EmbeddingRecord, VectorStore};
use crate::documents::load_documents;
use crate::embeddings::{Chunk, Embedder, split_documents};
use crate::retrieval::{Retriever, SearchHit};
use crate::{AdvisorError, Result};

/// Handle to a built similarity index
pub struct Index {
    store: VectorStore,
    embedder: Arc<dyn Embedder>,
    manifest: IndexManifest,
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("manifest", &self.manifest)
            .finish_non_exhaustive()
    }
}

impl Index {
    /// Open the persisted index, `None` when no completed build exists.
    ///
    /// Fails with [`AdvisorError::IndexModelMismatch`] when the index was embedded
    /// with a different model than `embedder` uses.
    #[inline]
    pub async fn open(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Option<Self>> {
        let index_dir = config.index_path();
        let Some(manifest) = IndexManifest::read(&index_dir)? else {
            debug!("No index manifest at {}", index_dir.display());
            return Ok(None);
        };

        if manifest.embedding_model != embedder.model_name() {
            return Err(AdvisorError::IndexModelMismatch {
                index_model: manifest.embedding_model,
                configured_model: embedder.model_name().to_string(),
            });
        }

        let store = VectorStore::connect(&index_dir).await?;
        if manifest.entry_count > 0 && store.vector_dimension() != manifest.dimension {
            return Err(AdvisorError::Index(format!(
                "Index table dimension {:?} does not match manifest dimension {:?}",
                store.vector_dimension(),
                manifest.dimension
            )));
        }

        info!(
            "Loaded index with {} entries built {}",
            manifest.entry_count, manifest.built_at
        );
        Ok(Some(Self {
            store,
            embedder,
            manifest,
        }))
    }

    /// Ingest, chunk and embed the corpus, replacing any existing index.
    ///
    /// Holds the build lock for the duration; a concurrent build fails with
    /// [`AdvisorError::IndexLocked`].
    #[inline]
    pub async fn build(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let _lock = BuildLock::acquire(&config.build_lock_path())?;

        let documents = load_documents(&config.docs_dir(), config.project_root())?;
        let chunks = split_documents(&documents, &config.chunking);
        info!(
            "Building index from {} documents ({} chunks)",
            documents.len(),
            chunks.len()
        );

        let index_dir = config.index_path();
        IndexManifest::remove(&index_dir)?;
        let mut store = VectorStore::connect(&index_dir).await?;
        store.drop_table_if_exists().await?;

        let batch_size = config.provider.embedding_batch_size.max(1) as usize;
        let bar = progress_bar(chunks.len());

        for batch in chunks.chunks(batch_size) {
            let vectors = embed_chunks(&embedder, batch).await?;

            if store.vector_dimension().is_none() {
                let dimension = vectors.first().map_or(0, Vec::len);
                if dimension == 0 {
                    return Err(AdvisorError::Embedding(
                        "Embedding service returned an empty vector".to_string(),
                    ));
                }
                store.reset(dimension).await?;
            }

            let records: Vec<EmbeddingRecord> = batch
                .iter()
                .cloned()
                .zip(vectors)
                .map(|(chunk, vector)| EmbeddingRecord::new(chunk, vector))
                .collect();
            store.store_embeddings_batch(&records).await?;
            bar.inc(records.len() as u64);
        }
        bar.finish_and_clear();

        if chunks.is_empty() {
            warn!("Corpus produced no chunks, the index is empty");
        }

        let manifest = IndexManifest::new(
            embedder.model_name(),
            store.vector_dimension(),
            store.count_embeddings().await?,
            documents.len(),
            &config.chunking,
        );
        manifest.write(&index_dir)?;

        info!(
            "Index built with {} entries at {}",
            manifest.entry_count,
            index_dir.display()
        );
        Ok(Self {
            store,
            embedder,
            manifest,
        })
    }

    /// Open the persisted index, building it first when none exists
    #[inline]
    pub async fn load_or_build(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        match Self::open(config, Arc::clone(&embedder)).await? {
            Some(index) => Ok(index),
            None => {
                info!("No persisted index found, building one");
                Self::build(config, embedder).await
            }
        }
    }

    #[inline]
    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.manifest.entry_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.manifest.entry_count == 0
    }
}

#[async_trait]
impl Retriever for Index {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if self.is_empty() || k == 0 {
            debug!("Skipping search on empty index");
            return Ok(Vec::new());
        }

        let embedder = Arc::clone(&self.embedder);
        let query_text = query.to_string();
        let query_vector = tokio::task::spawn_blocking(move || embedder.embed(&query_text))
            .await
            .map_err(|e| AdvisorError::Embedding(format!("Embedding task failed: {}", e)))??;

        let results = self.store.search_similar(&query_vector, k).await?;
        debug!("Retrieved {} passages for query", results.len());
        Ok(results.into_iter().map(SearchHit::from).collect())
    }
}

/// Owns the application's single index handle.
///
/// The first [`IndexLoader::get_index`] call loads or builds the index; every later
/// call returns the same handle.
pub struct IndexLoader {
    config: Config,
    embedder: Arc<dyn Embedder>,
    index: OnceCell<Arc<Index>>,
}

impl IndexLoader {
    #[inline]
    pub fn new(config: Config, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            config,
            embedder,
            index: OnceCell::new(),
        }
    }

    #[inline]
    pub async fn get_index(&self) -> Result<Arc<Index>> {
        self.index
            .get_or_try_init(|| async {
                Index::load_or_build(&self.config, Arc::clone(&self.embedder))
                    .await
                    .map(Arc::new)
            })
            .await
            .map(Arc::clone)
    }

    /// Rebuild the index from the corpus and make it the handle later calls return
    #[inline]
    pub async fn rebuild(&mut self) -> Result<Arc<Index>> {
        let index = Arc::new(Index::build(&self.config, Arc::clone(&self.embedder)).await?);
        self.index = OnceCell::new_with(Some(Arc::clone(&index)));
        Ok(index)
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.index.initialized()
    }

    #[inline]
    pub fn index_path(&self) -> PathBuf {
        self.config.index_path()
    }
}

async fn embed_chunks(embedder: &Arc<dyn Embedder>, batch: &[Chunk]) -> Result<Vec<Vec<f32>>> {
    let texts: Vec<String> = batch.iter().map(|chunk| chunk.content.clone()).collect();
    let expected = texts.len();
    let embedder = Arc::clone(embedder);

    let vectors = tokio::task::spawn_blocking(move || embedder.embed_batch(&texts))
        .await
        .map_err(|e| AdvisorError::Embedding(format!("Embedding task failed: {}", e)))??;

    if vectors.len() != expected {
        return Err(AdvisorError::Embedding(format!(
            "Expected {} embeddings, received {}",
            expected,
            vectors.len()
        )));
    }
    Ok(vectors)
}

fn progress_bar(len: usize) -> ProgressBar {
    if console::user_attended_stderr() {
        ProgressBar::new(len as u64).with_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] Embedding chunks {wide_bar}")
                .expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    }
}
