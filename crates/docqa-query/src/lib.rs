//! docqa-query - Hybrid retrieval and context fusion
//!
//! This crate combines BM25 keyword ranking with dense similarity search,
//! decides when a question needs live web results, and assembles the cited
//! context handed to the language model.
//!
//! # Features
//!
//! - In-memory BM25 (Okapi) index over the loaded corpus
//! - Normalized weighted fusion of lexical and dense scores
//! - Graceful single-signal fallback
//! - Keyword heuristic for web augmentation
//! - Context and citation assembly
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_query::{ContextAssembler, IndexedCorpus, QueryEngine};
//!
//! let corpus = IndexedCorpus::new(chunks, Some(dense_index));
//! let retrieval = QueryEngine::default().retrieve(Some(&corpus), "error handling").await;
//! let bundle = ContextAssembler::default().assemble(&retrieval.chunks(), None);
//! ```

mod context;
mod engine;
mod fusion;
mod lexical;
pub mod web;

pub use context::ContextAssembler;
pub use engine::{IndexedCorpus, QueryEngine, Retrieval, RetrievalMode};
pub use fusion::{fuse_scores, FusionWeights};
pub use lexical::{tokenize, LexicalIndex};

// Re-export for convenience
pub use docqa_core::{ContextBundle, ScoredCandidate, WebResult};
