//! Context assembly: ranked passages plus web snippets into one bundle.

use docqa_core::{page_citations, ContextBundle, DocumentChunk, SearchConfig, WebResult};

/// Separator between document passages.
const PASSAGE_SEPARATOR: &str = "\n\n";

/// Characters of web result content kept per snippet.
const SNIPPET_CHARS: usize = 300;

/// Web results quoted in the context and cited as sources.
const MAX_WEB_RESULTS: usize = 3;

/// Builds [`ContextBundle`]s. Pure; inputs are never modified.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    citation_chunks: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self { citation_chunks: 3 }
    }
}

impl ContextAssembler {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            citation_chunks: config.citation_chunks,
        }
    }

    /// Assemble the context for ranked chunks and an optional web result.
    ///
    /// Only the first `citation_chunks` chunks contribute page citations.
    /// Failed web results contribute nothing.
    pub fn assemble(&self, ranked: &[DocumentChunk], web: Option<&WebResult>) -> ContextBundle {
        let document_context = ranked
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR);

        let page_citations = page_citations(ranked.iter().take(self.citation_chunks));

        let web = web.filter(|w| w.success);
        let web_context = web.map(format_web_context).unwrap_or_default();
        let web_sources = web
            .map(|w| {
                w.hits
                    .iter()
                    .take(MAX_WEB_RESULTS)
                    .map(|hit| (hit.title.clone(), hit.url.clone()))
                    .collect()
            })
            .unwrap_or_default();

        ContextBundle {
            document_context,
            page_citations,
            web_context,
            web_sources,
        }
    }
}

/// Format a successful web result for the prompt.
fn format_web_context(web: &WebResult) -> String {
    let mut parts = Vec::new();

    if let Some(answer) = web.answer.as_deref().filter(|a| !a.is_empty()) {
        parts.push(format!("Web Search Answer: {}", answer));
    }

    if !web.hits.is_empty() {
        parts.push("\nWeb Search Results:".to_string());
        for (idx, hit) in web.hits.iter().take(MAX_WEB_RESULTS).enumerate() {
            let snippet: String = hit.content.chars().take(SNIPPET_CHARS).collect();
            parts.push(format!("{}. {}: {}", idx + 1, hit.title, snippet));
        }
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::WebHit;
    use ulid::Ulid;

    fn chunk(page: u32, content: &str) -> DocumentChunk {
        DocumentChunk::new(Ulid::nil(), page, content)
    }

    fn hit(n: usize) -> WebHit {
        WebHit {
            title: format!("Title {}", n),
            url: format!("https://example.com/{}", n),
            content: format!("content {}", n),
        }
    }

    #[test]
    fn test_document_context_joined() {
        let ranked = vec![chunk(0, "first"), chunk(1, "second")];
        let bundle = ContextAssembler::default().assemble(&ranked, None);
        assert_eq!(bundle.document_context, "first\n\nsecond");
    }

    #[test]
    fn test_citations_from_top_three_only() {
        let ranked = vec![chunk(1, "a"), chunk(1, "b"), chunk(4, "c"), chunk(8, "d")];
        let bundle = ContextAssembler::default().assemble(&ranked, None);
        assert_eq!(bundle.page_citations, vec![2, 5]);
    }

    #[test]
    fn test_no_web_sources_without_web_result() {
        let ranked = vec![chunk(0, "a")];
        let bundle = ContextAssembler::default().assemble(&ranked, None);

        assert!(bundle.web_context.is_empty());
        assert!(!bundle.citation_suffix().contains("Web Sources"));
        assert!(bundle.citation_suffix().contains("**Document Pages:** 1"));
    }

    #[test]
    fn test_failed_web_result_is_ignored() {
        let failed = WebResult::failed("boom");
        let bundle = ContextAssembler::default().assemble(&[], Some(&failed));

        assert!(bundle.web_context.is_empty());
        assert!(bundle.web_sources.is_empty());
        assert!(bundle.citation_suffix().is_empty());
    }

    #[test]
    fn test_web_context_format() {
        let web = WebResult::succeeded(
            Some("Rain expected".to_string()),
            (1..=5).map(hit).collect(),
        );
        let bundle = ContextAssembler::default().assemble(&[], Some(&web));

        assert_eq!(
            bundle.web_context,
            "Web Search Answer: Rain expected\n\nWeb Search Results:\n\
             1. Title 1: content 1\n2. Title 2: content 2\n3. Title 3: content 3"
        );
        assert_eq!(bundle.web_sources.len(), 3);
        assert_eq!(bundle.web_sources[0].1, "https://example.com/1");
    }

    #[test]
    fn test_web_snippet_truncated_by_chars() {
        let mut long = hit(1);
        long.content = "é".repeat(400);
        let web = WebResult::succeeded(None, vec![long]);

        let bundle = ContextAssembler::default().assemble(&[], Some(&web));
        let line = bundle.web_context.lines().last().unwrap();
        let snippet = line.trim_start_matches("1. Title 1: ");
        assert_eq!(snippet.chars().count(), 300);
        assert!(!bundle.web_context.contains("Web Search Answer"));
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let ranked = vec![chunk(2, "x"), chunk(0, "y")];
        let web = WebResult::succeeded(Some("a".to_string()), vec![hit(1)]);
        let assembler = ContextAssembler::default();

        let first = assembler.assemble(&ranked, Some(&web));
        let second = assembler.assemble(&ranked, Some(&web));
        assert_eq!(first, second);
        assert_eq!(first.citation_suffix(), second.citation_suffix());
    }
}
