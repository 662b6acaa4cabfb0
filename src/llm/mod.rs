// Language model seam
// The advisor talks to completion models only through this trait

use crate::Result;

/// Produces a free-form completion for a single prompt
pub trait ChatModel: Send + Sync {
    fn complete(&self, model: &str, prompt: &str) -> Result<String>;
}
