
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::embeddings::ChunkingConfig;
use crate::{AdvisorError, Result};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Describes a completed index build.
///
/// Written after every row has been stored, so its presence marks the table as usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub embedding_model: String,
    /// Vector dimension, absent when the corpus produced no chunks
    pub dimension: Option<usize>,
    pub entry_count: usize,
    pub document_count: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub built_at: DateTime<Utc>,
}

impl IndexManifest {
    #[inline]
    pub fn new(
        embedding_model: &str,
        dimension: Option<usize>,
        entry_count: usize,
        document_count: usize,
        chunking: &ChunkingConfig,
    ) -> Self {
        Self {
            embedding_model: embedding_model.to_string(),
            dimension,
            entry_count,
            document_count,
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
            built_at: Utc::now(),
        }
    }

    #[inline]
    pub fn path(index_dir: &Path) -> PathBuf {
        index_dir.join(MANIFEST_FILE_NAME)
    }

    /// Read the manifest from `index_dir`, `None` when no build has completed there
    #[inline]
    pub fn read(index_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path(index_dir);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let manifest = serde_json::from_str(&content).map_err(|e| {
            AdvisorError::Index(format!("Corrupt index manifest {}: {}", path.display(), e))
        })?;
        Ok(Some(manifest))
    }

    /// Persist the manifest, replacing any previous one atomically
    #[inline]
    pub fn write(&self, index_dir: &Path) -> Result<()> {
        fs::create_dir_all(index_dir)?;

        let path = Self::path(index_dir);
        let tmp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AdvisorError::Index(format!("Failed to serialize manifest: {}", e)))?;

        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &path)?;

        debug!("Wrote index manifest to {}", path.display());
        Ok(())
    }

    /// Delete the manifest so the index is treated as unbuilt
    #[inline]
    pub fn remove(index_dir: &Path) -> Result<()> {
        let path = Self::path(index_dir);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
