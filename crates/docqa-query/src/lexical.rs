//! In-memory BM25 (Okapi) index over a fixed corpus.

use std::collections::HashMap;

use docqa_core::DocumentChunk;

/// BM25 term-frequency saturation.
const K1: f32 = 1.5;

/// BM25 length normalization.
const B: f32 = 0.75;

/// Floor applied to negative idf values, as a fraction of the average idf.
const EPSILON: f32 = 0.25;

/// Lowercase whitespace tokenization shared by indexing and querying.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Bag-of-words ranking structure built once per corpus.
///
/// Scores are raw and corpus-dependent; normalization is left to the fuser.
#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    /// Term frequencies per chunk, in corpus order.
    term_freqs: Vec<HashMap<String, u32>>,

    /// Token count per chunk.
    doc_lens: Vec<usize>,

    /// Average token count.
    avg_doc_len: f32,

    /// Inverse document frequency per term.
    idf: HashMap<String, f32>,
}

impl LexicalIndex {
    /// Build the index from the corpus, in corpus order.
    pub fn build(corpus: &[DocumentChunk]) -> Self {
        let mut term_freqs = Vec::with_capacity(corpus.len());
        let mut doc_lens = Vec::with_capacity(corpus.len());
        let mut doc_counts: HashMap<String, u32> = HashMap::new();

        for chunk in corpus {
            let tokens = tokenize(&chunk.content);
            doc_lens.push(tokens.len());

            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_default() += 1;
            }
            for term in freqs.keys() {
                *doc_counts.entry(term.clone()).or_default() += 1;
            }
            term_freqs.push(freqs);
        }

        let total_len: usize = doc_lens.iter().sum();
        let avg_doc_len = if corpus.is_empty() {
            0.0
        } else {
            total_len as f32 / corpus.len() as f32
        };

        let idf = Self::compute_idf(&doc_counts, corpus.len());

        Self {
            term_freqs,
            doc_lens,
            avg_doc_len,
            idf,
        }
    }

    fn compute_idf(doc_counts: &HashMap<String, u32>, corpus_size: usize) -> HashMap<String, f32> {
        let n = corpus_size as f32;
        let mut idf = HashMap::with_capacity(doc_counts.len());
        let mut idf_sum = 0.0f32;
        let mut negative = Vec::new();

        for (term, &count) in doc_counts {
            let df = count as f32;
            let value = (n - df + 0.5).ln() - (df + 0.5).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term.clone(), value);
        }

        // Terms in more than half the corpus get a small positive weight
        // instead of a penalty, so every score stays non-negative.
        let average = if idf.is_empty() {
            0.0
        } else {
            idf_sum / idf.len() as f32
        };
        let floor = (EPSILON * average).max(0.0);
        for term in negative {
            idf.insert(term, floor);
        }

        idf
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.term_freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.term_freqs.is_empty()
    }

    /// Score every chunk against the query, aligned with corpus order.
    ///
    /// Returns an empty vector for an empty corpus.
    pub fn score(&self, query: &str) -> Vec<f32> {
        let tokens = tokenize(query);
        let avg_doc_len = if self.avg_doc_len > 0.0 {
            self.avg_doc_len
        } else {
            1.0
        };

        self.term_freqs
            .iter()
            .zip(&self.doc_lens)
            .map(|(freqs, &doc_len)| {
                let norm = K1 * (1.0 - B + B * doc_len as f32 / avg_doc_len);
                tokens
                    .iter()
                    .map(|token| {
                        let tf = freqs.get(token).copied().unwrap_or(0) as f32;
                        if tf == 0.0 {
                            return 0.0;
                        }
                        let idf = self.idf.get(token).copied().unwrap_or(0.0);
                        idf * (tf * (K1 + 1.0)) / (tf + norm)
                    })
                    .sum()
            })
            .collect()
    }
}
