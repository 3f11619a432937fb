//! Query engine for hybrid retrieval over an indexed corpus.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use docqa_core::{DenseHit, DenseIndex, DocumentChunk, ScoredCandidate, SearchConfig};

use crate::fusion::{fuse_scores, FusionWeights};
use crate::lexical::LexicalIndex;

/// A corpus together with the indexes built from it.
///
/// Built in one step from the ingestion output and never updated in place,
/// so the lexical index, the dense index and the chunk list always agree.
pub struct IndexedCorpus {
    chunks: Vec<DocumentChunk>,
    lexical: LexicalIndex,
    dense: Option<Arc<dyn DenseIndex>>,
}

impl IndexedCorpus {
    /// Build the lexical index over `chunks` and attach the dense index.
    pub fn new(chunks: Vec<DocumentChunk>, dense: Option<Arc<dyn DenseIndex>>) -> Self {
        let lexical = LexicalIndex::build(&chunks);
        info!(
            "Indexed {} chunks (dense index: {})",
            chunks.len(),
            if dense.is_some() { "attached" } else { "none" }
        );
        Self {
            chunks,
            lexical,
            dense,
        }
    }

    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn has_dense(&self) -> bool {
        self.dense.is_some()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl std::fmt::Debug for IndexedCorpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedCorpus")
            .field("chunks", &self.chunks.len())
            .field("dense", &self.dense.is_some())
            .finish()
    }
}

/// Which signals contributed to a retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    Hybrid,
    LexicalOnly,
    DenseOnly,
    /// No corpus loaded, or both signals missing.
    Unavailable,
}

/// Ranked candidates for one query.
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Fused candidates, best first.
    pub candidates: Vec<ScoredCandidate>,

    /// Signals used.
    pub mode: RetrievalMode,

    /// Retrieval latency in milliseconds.
    pub latency_ms: u64,
}

impl Retrieval {
    fn unavailable() -> Self {
        Self {
            candidates: Vec::new(),
            mode: RetrievalMode::Unavailable,
            latency_ms: 0,
        }
    }

    /// Ranked chunks, best first.
    pub fn chunks(&self) -> Vec<DocumentChunk> {
        self.candidates.iter().map(|c| c.chunk.clone()).collect()
    }
}

/// Hybrid retrieval engine.
///
/// Runs BM25 over the corpus and a dense similarity search, then fuses the
/// two with normalized weighted scores.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    weights: FusionWeights,
    top_k: usize,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

impl QueryEngine {
    /// Create a new query engine.
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            weights: FusionWeights::from(config),
            top_k: config.top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve up to `top_k` chunks for the query.
    ///
    /// Without a corpus this returns nothing and computes nothing. A failing
    /// dense index degrades to lexical-only ranking.
    pub async fn retrieve(&self, corpus: Option<&IndexedCorpus>, query: &str) -> Retrieval {
        let Some(corpus) = corpus else {
            debug!("No corpus loaded, skipping retrieval");
            return Retrieval::unavailable();
        };

        let start = Instant::now();

        let dense_hits = match &corpus.dense {
            Some(dense) => self.dense_search(dense.as_ref(), query).await,
            None => Vec::new(),
        };
        let lexical_scores = corpus.lexical.score(query);

        debug!(
            "Dense search returned {} hits, lexical scored {} chunks",
            dense_hits.len(),
            lexical_scores.len()
        );

        let mode = match (lexical_scores.is_empty(), dense_hits.is_empty()) {
            (false, false) => RetrievalMode::Hybrid,
            (false, true) => RetrievalMode::LexicalOnly,
            (true, false) => RetrievalMode::DenseOnly,
            (true, true) => return Retrieval::unavailable(),
        };

        let candidates = fuse_scores(
            &corpus.chunks,
            &lexical_scores,
            &dense_hits,
            self.weights,
            self.top_k,
        );

        let latency_ms = start.elapsed().as_millis() as u64;

        info!(
            "Retrieved {} chunks ({:?}) in {}ms",
            candidates.len(),
            mode,
            latency_ms
        );

        Retrieval {
            candidates,
            mode,
            latency_ms,
        }
    }

    async fn dense_search(&self, dense: &dyn DenseIndex, query: &str) -> Vec<DenseHit> {
        match dense.similarity_search(query, self.top_k).await {
            Ok(mut hits) => {
                hits.truncate(self.top_k);
                hits
            }
            Err(e) => {
                warn!("Dense search failed, falling back to lexical ranking: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docqa_core::{DocQaError, Result};
    use ulid::Ulid;

    /// Dense index returning fixed distances per chunk content.
    struct FixedDense {
        hits: Vec<DenseHit>,
    }

    #[async_trait]
    impl DenseIndex for FixedDense {
        async fn similarity_search(&self, _query: &str, k: usize) -> Result<Vec<DenseHit>> {
            Ok(self.hits.iter().take(k).cloned().collect())
        }
    }

    struct BrokenDense;

    #[async_trait]
    impl DenseIndex for BrokenDense {
        async fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<DenseHit>> {
            Err(DocQaError::dense_index("index file missing"))
        }
    }

    fn chunks() -> Vec<DocumentChunk> {
        [
            "solar panels convert sunlight into electricity",
            "wind turbines generate power from moving air",
            "hydroelectric dams store water behind walls",
        ]
        .iter()
        .enumerate()
        .map(|(page, text)| DocumentChunk::new(Ulid::nil(), page as u32, *text))
        .collect()
    }

    #[test]
    fn test_query_engine_default() {
        let engine = QueryEngine::default();
        assert_eq!(engine.top_k(), 8);
    }

    #[tokio::test]
    async fn test_no_corpus_is_unavailable() {
        let engine = QueryEngine::default();
        let retrieval = engine.retrieve(None, "solar").await;
        assert_eq!(retrieval.mode, RetrievalMode::Unavailable);
        assert!(retrieval.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_lexical_only_without_dense() {
        let corpus = IndexedCorpus::new(chunks(), None);
        let engine = QueryEngine::default();

        let retrieval = engine.retrieve(Some(&corpus), "wind power").await;
        assert_eq!(retrieval.mode, RetrievalMode::LexicalOnly);
        assert_eq!(retrieval.candidates[0].chunk.page, 1);
    }

    #[tokio::test]
    async fn test_hybrid_combines_signals() {
        let chunks = chunks();
        let dense = FixedDense {
            hits: vec![
                DenseHit::new(chunks[2].clone(), 0.1),
                DenseHit::new(chunks[0].clone(), 0.9),
            ],
        };
        let corpus = IndexedCorpus::new(chunks, Some(Arc::new(dense)));
        let engine = QueryEngine::default();

        let retrieval = engine.retrieve(Some(&corpus), "hydroelectric water").await;
        assert_eq!(retrieval.mode, RetrievalMode::Hybrid);
        assert_eq!(retrieval.candidates[0].chunk.page, 2);
        assert_eq!(retrieval.candidates.len(), 3);
    }

    #[tokio::test]
    async fn test_dense_only_for_empty_corpus_with_dense_index() {
        let stray = DocumentChunk::new(Ulid::nil(), 7, "externally indexed passage");
        let dense = FixedDense {
            hits: vec![DenseHit::new(stray.clone(), 0.3)],
        };
        let corpus = IndexedCorpus::new(Vec::new(), Some(Arc::new(dense)));

        let retrieval = QueryEngine::default().retrieve(Some(&corpus), "passage").await;
        assert_eq!(retrieval.mode, RetrievalMode::DenseOnly);
        assert_eq!(retrieval.chunks(), vec![stray]);
    }

    #[tokio::test]
    async fn test_dense_failure_degrades_to_lexical() {
        let corpus = IndexedCorpus::new(chunks(), Some(Arc::new(BrokenDense)));
        let retrieval = QueryEngine::default().retrieve(Some(&corpus), "solar").await;

        assert_eq!(retrieval.mode, RetrievalMode::LexicalOnly);
        assert_eq!(retrieval.candidates[0].chunk.page, 0);
    }

    #[tokio::test]
    async fn test_top_k_applies_in_every_mode() {
        let config = SearchConfig {
            top_k: 2,
            ..Default::default()
        };
        let engine = QueryEngine::new(&config);
        let corpus = IndexedCorpus::new(chunks(), None);

        let retrieval = engine.retrieve(Some(&corpus), "power").await;
        assert_eq!(retrieval.candidates.len(), 2);
    }
}
