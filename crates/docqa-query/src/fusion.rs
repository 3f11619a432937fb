//! Weighted score fusion of lexical and dense retrieval results.

use std::cmp::Ordering;
use std::collections::HashMap;

use docqa_core::{ChunkId, DenseHit, DocumentChunk, ScoredCandidate, SearchConfig};

/// Relative weights of the two normalized signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub dense: f32,
    pub lexical: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            dense: 0.6,
            lexical: 0.4,
        }
    }
}

impl From<&SearchConfig> for FusionWeights {
    fn from(config: &SearchConfig) -> Self {
        Self {
            dense: config.dense_weight,
            lexical: config.lexical_weight,
        }
    }
}

/// Maximum of the values, or 1 when the maximum is not positive.
fn guarded_max(values: impl Iterator<Item = f32>) -> f32 {
    let max = values.fold(f32::NEG_INFINITY, f32::max);
    if max > 0.0 {
        max
    } else {
        1.0
    }
}

fn new_candidate(chunk: &DocumentChunk) -> ScoredCandidate {
    ScoredCandidate {
        chunk: chunk.clone(),
        lexical_score: 0.0,
        dense_distance: 0.0,
        normalized_lexical: 0.0,
        normalized_dense_similarity: 0.0,
        combined_score: 0.0,
        dense_rank: None,
    }
}

/// Fuse corpus-aligned lexical scores with dense hits into one ranking.
///
/// Lexical scores are divided by their maximum; dense distances become
/// similarities via `1 - distance / max_distance`. Candidates are merged by
/// chunk id and ranked by the weighted sum, descending. Equal scores keep
/// dense rank order, then corpus order.
///
/// An empty `lexical_scores` or `dense_hits` reduces this to a single-signal
/// ranking over the other input; both empty yields no results.
///
/// # Arguments
/// * `corpus` - Chunks in ingestion order
/// * `lexical_scores` - Raw BM25 scores aligned with `corpus`
/// * `dense_hits` - Dense results, nearest first
/// * `weights` - Signal weights
/// * `k` - Maximum number of candidates to return
pub fn fuse_scores(
    corpus: &[DocumentChunk],
    lexical_scores: &[f32],
    dense_hits: &[DenseHit],
    weights: FusionWeights,
    k: usize,
) -> Vec<ScoredCandidate> {
    let max_lexical = guarded_max(lexical_scores.iter().copied());
    let max_distance = guarded_max(dense_hits.iter().map(|hit| hit.distance));

    let mut candidates: Vec<ScoredCandidate> = Vec::with_capacity(lexical_scores.len());
    let mut by_id: HashMap<ChunkId, usize> = HashMap::with_capacity(lexical_scores.len());

    for (chunk, &raw) in corpus.iter().zip(lexical_scores) {
        if by_id.contains_key(&chunk.id) {
            continue;
        }
        let mut candidate = new_candidate(chunk);
        candidate.lexical_score = raw;
        candidate.normalized_lexical = (raw / max_lexical).clamp(0.0, 1.0);
        by_id.insert(chunk.id, candidates.len());
        candidates.push(candidate);
    }

    for (rank, hit) in dense_hits.iter().enumerate() {
        let slot = match by_id.get(&hit.chunk.id) {
            Some(&slot) => slot,
            None => {
                by_id.insert(hit.chunk.id, candidates.len());
                candidates.push(new_candidate(&hit.chunk));
                candidates.len() - 1
            }
        };

        let candidate = &mut candidates[slot];
        if candidate.dense_rank.is_some() {
            // Repeated hit for the same chunk; the nearer one already counted.
            continue;
        }
        candidate.dense_rank = Some(rank);
        candidate.dense_distance = hit.distance;
        candidate.normalized_dense_similarity = (1.0 - hit.distance / max_distance).clamp(0.0, 1.0);
    }

    for candidate in &mut candidates {
        candidate.combined_score = weights.dense * candidate.normalized_dense_similarity
            + weights.lexical * candidate.normalized_lexical;
    }

    // Stable sort keeps insertion (corpus) order as the final tie-break.
    candidates.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| match (a.dense_rank, b.dense_rank) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });

    candidates.truncate(k);
    candidates
}
