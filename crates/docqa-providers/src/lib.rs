//! docqa-providers - HTTP clients for external collaborators
//!
//! - [`TavilySearch`]: web search implementing [`WebSearchProvider`]
//! - [`ChatCompletions`]: OpenAI-compatible chat API implementing [`Generator`]

mod chat;
mod tavily;
#[cfg(test)]
mod test_server;

pub use chat::ChatCompletions;
pub use tavily::TavilySearch;

// Re-export the traits for convenience
pub use docqa_core::{Generator, WebSearchProvider};

use std::time::Duration;

use docqa_core::{DocQaError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;

/// Build bearer authorization headers.
pub fn auth_headers(provider: &str, api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .map_err(|e| DocQaError::provider(provider, format!("Invalid API key: {}", e)))?;
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Build an HTTP client with a request timeout.
fn http_client(provider: &str, timeout_ms: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| DocQaError::provider(provider, e.to_string()))
}
