//! The embedding/summarizer adapter port (§4.G).

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::Embedding;

/// Narrow interface producing a fixed-dim embedding from short text and a
/// short summary from longer text.
///
/// Implementations are expected to be non-fatal to callers: a failure here
/// should be logged and treated as "no embedding/summary available" by the
/// sync pipeline, never as a reason to drop the whole repository.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a short text (name + description + summary + topics, joined
    /// by `". "`).
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Summarize a longer text into a short purpose sentence.
    async fn summarize(&self, text: &str) -> Result<String>;

    /// Dimension of vectors this provider produces.
    fn dimensions(&self) -> usize;
}
