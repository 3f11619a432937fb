//! Core traits defining the interfaces to external collaborators.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DenseHit, ProviderResponse};

/// Vector similarity search over the ingested corpus.
///
/// Implementations live outside this workspace (embedding model plus vector
/// store). Distances are non-negative and smaller means closer.
#[async_trait]
pub trait DenseIndex: Send + Sync {
    /// Return at most `k` hits, nearest first.
    ///
    /// Must tolerate `k` larger than the corpus.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<DenseHit>>;
}

/// Live web search.
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Run a search. Failures are returned as errors and never retried.
    async fn search(&self, query: &str) -> Result<ProviderResponse>;
}

/// Sampling parameters for a single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Maximum tokens in the completion.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.1,
        }
    }
}

/// Language model that turns an assembled prompt into an answer.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for a single prompt string.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}
