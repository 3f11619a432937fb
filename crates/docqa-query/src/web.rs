//! Web augmentation trigger and provider response normalization.

use tracing::warn;

use docqa_core::{ProviderResponse, Result, WebResult};

/// Markers of time-sensitive questions.
pub const TRIGGER_KEYWORDS: [&str; 16] = [
    "current",
    "latest",
    "recent",
    "today",
    "now",
    "news",
    "weather",
    "stock",
    "price",
    "score",
    "update",
    "2024",
    "2025",
    "this year",
    "this month",
    "this week",
];

/// Whether a query should be augmented with live web results.
///
/// Plain case-insensitive substring matching against [`TRIGGER_KEYWORDS`]:
/// "know" matches "now". Recall is preferred over precision here.
pub fn should_trigger(query: &str) -> bool {
    let query = query.to_lowercase();
    TRIGGER_KEYWORDS.iter().any(|keyword| query.contains(keyword))
}

/// Normalize a provider call into a [`WebResult`]. Errors become failed results.
pub fn adapt(response: Result<ProviderResponse>) -> WebResult {
    match response {
        Ok(response) => {
            let answer = response.answer.filter(|a| !a.trim().is_empty());
            WebResult::succeeded(answer, response.results)
        }
        Err(e) => {
            warn!("Web search failed: {}", e);
            WebResult::failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::{DocQaError, WebHit};

    #[test]
    fn test_trigger_on_temporal_query() {
        assert!(should_trigger("What's the current weather in Paris?"));
        assert!(should_trigger("LATEST NEWS on the election"));
        assert!(should_trigger("How did the market do this week"));
        assert!(should_trigger("results from 2025"));
    }

    #[test]
    fn test_no_trigger_on_document_query() {
        assert!(!should_trigger("Summarize chapter 2"));
        assert!(!should_trigger("Explain the methodology section"));
    }

    #[test]
    fn test_trigger_is_substring_based() {
        assert!(should_trigger("What do you know about rivers?"));
    }

    #[test]
    fn test_adapt_success() {
        let response = ProviderResponse {
            answer: Some("Sunny, 21C".to_string()),
            results: vec![WebHit {
                title: "Forecast".to_string(),
                url: "https://weather.example".to_string(),
                content: "Clear skies".to_string(),
            }],
        };

        let result = adapt(Ok(response));
        assert!(result.success);
        assert_eq!(result.answer.as_deref(), Some("Sunny, 21C"));
        assert_eq!(result.hits.len(), 1);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_adapt_drops_blank_answer() {
        let response = ProviderResponse {
            answer: Some("   ".to_string()),
            results: Vec::new(),
        };
        assert!(adapt(Ok(response)).answer.is_none());
    }

    #[test]
    fn test_adapt_failure() {
        let result = adapt(Err(DocQaError::provider("tavily", "rate limited")));
        assert!(!result.success);
        assert!(result.hits.is_empty());
        assert!(result.error.unwrap().contains("rate limited"));
    }
}
