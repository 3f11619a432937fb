//! Tavily web search client.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use docqa_core::{DocQaError, ProviderResponse, Result, WebConfig, WebSearchProvider};

use crate::{auth_headers, http_client};

const PROVIDER: &str = "tavily";

/// Web search over the Tavily API.
pub struct TavilySearch {
    client: Client,
    api_base: String,
    api_key: String,
    max_results: u32,
    search_depth: String,
}

impl TavilySearch {
    /// Create a client from configuration.
    pub fn new(config: &WebConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(DocQaError::config("web.api_key is not set"));
        }

        Ok(Self {
            client: http_client(PROVIDER, config.timeout_ms)?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_results: config.max_results,
            search_depth: config.search_depth.clone(),
        })
    }

    fn request_body(&self, query: &str) -> Value {
        serde_json::json!({
            "query": query,
            "max_results": self.max_results,
            "search_depth": self.search_depth,
            "include_answer": true,
        })
    }
}

#[async_trait]
impl WebSearchProvider for TavilySearch {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(&self, query: &str) -> Result<ProviderResponse> {
        debug!("Web search: {:?}", query);

        let res = self
            .client
            .post(format!("{}/search", self.api_base))
            .headers(auth_headers(PROVIDER, &self.api_key)?)
            .json(&self.request_body(query))
            .send()
            .await
            .map_err(|e| DocQaError::provider(PROVIDER, e.to_string()))?;

        let json: Value = res
            .error_for_status()
            .map_err(|e| DocQaError::provider(PROVIDER, e.to_string()))?
            .json()
            .await
            .map_err(|e| DocQaError::provider(PROVIDER, e.to_string()))?;

        parse_search_response(json)
    }
}

fn parse_search_response(json: Value) -> Result<ProviderResponse> {
    if !json.get("results").map_or(false, Value::is_array) {
        return Err(DocQaError::provider(
            PROVIDER,
            "Search response is missing results array.",
        ));
    }
    Ok(serde_json::from_value(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{closed_port, respond_once};

    fn client_for(api_base: String) -> TavilySearch {
        TavilySearch::new(&WebConfig {
            api_base,
            api_key: "k".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        let err = TavilySearch::new(&WebConfig::default()).err().unwrap();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_request_body() {
        let config = WebConfig {
            api_key: "k".to_string(),
            ..Default::default()
        };
        let client = TavilySearch::new(&config).unwrap();
        let body = client.request_body("rust news");

        assert_eq!(body["query"], "rust news");
        assert_eq!(body["max_results"], 5);
        assert_eq!(body["search_depth"], "basic");
        assert_eq!(body["include_answer"], true);
    }

    #[test]
    fn test_parses_results() {
        let json = serde_json::json!({
            "answer": "It is sunny.",
            "results": [
                { "title": "Weather", "url": "https://w.example", "content": "Sunny", "score": 0.9 }
            ]
        });
        let response = parse_search_response(json).unwrap();
        assert_eq!(response.answer.as_deref(), Some("It is sunny."));
        assert_eq!(response.results[0].title, "Weather");
    }

    #[test]
    fn test_missing_results_is_error() {
        let err = parse_search_response(serde_json::json!({ "detail": "bad key" })).unwrap_err();
        assert_eq!(err.error_code(), "PROVIDER_ERROR");
    }

    #[tokio::test]
    async fn test_search_returns_parsed_response() {
        let base = respond_once(
            200,
            r#"{"answer":"Sunny.","results":[{"title":"Forecast","url":"https://w.example","content":null}]}"#,
        )
        .await;

        let response = client_for(base).search("weather today").await.unwrap();
        assert_eq!(response.answer.as_deref(), Some("Sunny."));
        assert_eq!(response.results[0].url, "https://w.example");
        assert_eq!(response.results[0].content, "");
    }

    #[tokio::test]
    async fn test_error_status_is_provider_error() {
        let base = respond_once(401, r#"{"detail":"bad key"}"#).await;

        let err = client_for(base).search("news").await.unwrap_err();
        assert_eq!(err.error_code(), "PROVIDER_ERROR");
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_provider_error() {
        let err = client_for(closed_port()).search("news").await.unwrap_err();
        assert_eq!(err.error_code(), "PROVIDER_ERROR");
    }
}
