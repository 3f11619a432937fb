//! Core domain types for the document Q&A engine.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use ulid::Ulid;

/// Stable identifier of a chunk within an ingested corpus.
pub type ChunkId = Ulid;

/// A chunk of an ingested document, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Unique identifier (ULID).
    #[serde(default = "Ulid::new")]
    pub id: ChunkId,

    /// Document this chunk was cut from.
    #[serde(default)]
    pub source_id: Ulid,

    /// Page in the source document (0-based).
    #[serde(default)]
    pub page: u32,

    /// Chunk text content.
    pub content: String,
}

impl DocumentChunk {
    /// Create a new chunk with a fresh identifier.
    pub fn new(source_id: Ulid, page: u32, content: impl Into<String>) -> Self {
        Self {
            id: Ulid::new(),
            source_id,
            page,
            content: content.into(),
        }
    }

    /// Page number as shown to users (1-based).
    pub fn display_page(&self) -> u32 {
        self.page + 1
    }
}

/// A single dense-index result. Smaller distance means closer.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseHit {
    pub chunk: DocumentChunk,
    pub distance: f32,
}

impl DenseHit {
    pub fn new(chunk: DocumentChunk, distance: f32) -> Self {
        Self { chunk, distance }
    }
}

/// A fused retrieval candidate with its raw and normalized scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// The candidate chunk.
    pub chunk: DocumentChunk,

    /// Raw lexical (BM25) score.
    pub lexical_score: f32,

    /// Raw dense distance (0 when the chunk had no dense hit).
    pub dense_distance: f32,

    /// Lexical score divided by the maximum lexical score, in [0, 1].
    pub normalized_lexical: f32,

    /// One minus the distance divided by the maximum distance, in [0, 1].
    pub normalized_dense_similarity: f32,

    /// Weighted blend of the two normalized components.
    pub combined_score: f32,

    /// Position in the dense result list, if the chunk was a dense hit.
    pub dense_rank: Option<usize>,
}

/// One result returned by a web search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebHit {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

/// Providers send `null` for missing snippet fields.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Raw response of a web search provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Provider-synthesized answer, if any.
    #[serde(default)]
    pub answer: Option<String>,

    /// Ranked result list.
    #[serde(default)]
    pub results: Vec<WebHit>,
}

/// Normalized outcome of a web search. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebResult {
    pub success: bool,
    pub answer: Option<String>,
    pub hits: Vec<WebHit>,
    pub error: Option<String>,
}

impl WebResult {
    /// A successful search.
    pub fn succeeded(answer: Option<String>, hits: Vec<WebHit>) -> Self {
        Self {
            success: true,
            answer,
            hits,
            error: None,
        }
    }

    /// A failed search carrying the provider's error message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            answer: None,
            hits: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The assembled context handed to the generation step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextBundle {
    /// Ranked chunk contents separated by blank lines.
    pub document_context: String,

    /// Distinct 1-based page numbers, ascending.
    pub page_citations: Vec<u32>,

    /// Formatted web answer and snippets.
    pub web_context: String,

    /// Up to three (title, url) pairs.
    pub web_sources: Vec<(String, String)>,
}

impl ContextBundle {
    /// Whether any document passage made it into the context.
    pub fn has_document_context(&self) -> bool {
        !self.document_context.is_empty()
    }

    /// Whether a web section made it into the context.
    pub fn has_web_context(&self) -> bool {
        !self.web_context.is_empty()
    }

    /// Citation block appended to the generated answer.
    ///
    /// Empty when neither document pages nor web sources are available.
    pub fn citation_suffix(&self) -> String {
        let mut parts = Vec::new();

        if self.has_document_context() && !self.page_citations.is_empty() {
            let pages: Vec<String> = self.page_citations.iter().map(u32::to_string).collect();
            parts.push(format!("\n\n**Document Pages:** {}", pages.join(", ")));
        }

        if !self.web_sources.is_empty() {
            parts.push("\n\n**Web Sources:**".to_string());
            for (idx, (title, url)) in self.web_sources.iter().enumerate() {
                parts.push(format!("{}. [{}]({})", idx + 1, title, url));
            }
        }

        parts.join("\n")
    }
}

/// Collect distinct 1-based pages from the given chunks, ascending.
pub fn page_citations<'a>(chunks: impl IntoIterator<Item = &'a DocumentChunk>) -> Vec<u32> {
    chunks
        .into_iter()
        .map(DocumentChunk::display_page)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Answer style requested by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseMode {
    /// Short, direct answers.
    Concise,
    /// Comprehensive, in-depth responses.
    #[default]
    Detailed,
}

impl ResponseMode {
    pub const ALL: [ResponseMode; 2] = [ResponseMode::Concise, ResponseMode::Detailed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concise => "Concise",
            Self::Detailed => "Detailed",
        }
    }

    /// Parse a mode name case-insensitively, falling back to Detailed.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "concise" => Self::Concise,
            _ => Self::Detailed,
        }
    }
}

impl std::fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to web augmentation for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WebStatus {
    /// The query did not look time-sensitive.
    NotTriggered,
    /// Triggered, but no provider is configured.
    Unavailable,
    /// Provider results were added to the context.
    Used,
    /// Provider failed; the answer was produced without web context.
    Failed(String),
}

/// A completed answer with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    /// Generated text including the citation suffix.
    pub text: String,

    /// Pages cited from the document corpus.
    pub page_citations: Vec<u32>,

    /// Web augmentation outcome.
    pub web: WebStatus,

    /// Served from the conversation cache.
    pub cached: bool,
}
