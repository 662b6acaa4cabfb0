// Embeddings module
// Splits documents into chunks and defines the embedding service seam

pub mod chunking;

pub use chunking::{Chunk, ChunkingConfig, split_documents, split_text};

use crate::Result;

/// Turns text into fixed-dimension vectors for a named embedding model
pub trait Embedder: Send + Sync {
    /// Name of the model producing the vectors, recorded in the index manifest
    fn model_name(&self) -> &str;

    /// Embed a batch of texts, returning one vector per input in input order
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()])?;
        vectors.pop().ok_or_else(|| {
            crate::AdvisorError::Embedding("Embedding service returned no vectors".to_string())
        })
    }
}
