// Retrieval seam
// The advisor asks for passages through `Retriever`; `Index` is the production implementation


use async_trait::async_trait;
use std::fmt::Write;

use crate::Result;
use crate::database::SearchResult;
use crate::documents::DocumentMetadata;

pub const NO_RESULTS_MESSAGE: &str = "No relevant documents found.";

/// A passage returned for a query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub content: String,
    pub metadata: DocumentMetadata,
    /// Cosine similarity, higher is closer
    pub score: f32,
}

impl From<SearchResult> for SearchHit {
    #[inline]
    fn from(result: SearchResult) -> Self {
        Self {
            content: result.chunk.content,
            metadata: result.chunk.metadata,
            score: result.similarity_score,
        }
    }
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `k` passages ordered by descending similarity.
    ///
    /// An empty index yields an empty list, not an error.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>>;
}

/// Render hits as a numbered block the advisor prompt can cite from
#[inline]
pub fn format_results(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    let mut rendered = String::new();
    for (i, hit) in hits.iter().enumerate() {
        if i > 0 {
            rendered.push_str("\n\n");
        }
        let _ = write!(
            rendered,
            "[Result {}] Source: {} (Jurisdiction: {})\n{}",
            i + 1,
            hit.metadata.source,
            hit.metadata.jurisdiction,
            hit.content
        );
    }
    rendered
}
