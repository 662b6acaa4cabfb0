// Vector database module
// Stores one embedded chunk per row in a local LanceDB table


pub mod vector_store;

pub use vector_store::{SearchResult, VectorStore};

use uuid::Uuid;

use crate::embeddings::Chunk;

/// Embedding record stored in LanceDB
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    /// Unique identifier for this row
    pub id: String,
    /// The vector embedding, all records in a table share one dimension
    pub vector: Vec<f32>,
    /// The chunk this embedding represents, stored alongside it
    pub chunk: Chunk,
}

impl EmbeddingRecord {
    #[inline]
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            vector,
            chunk,
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}
