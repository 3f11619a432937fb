//! Configuration types for the document Q&A engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{DocQaError, Result};
use crate::traits::GenerationParams;
use crate::types::ResponseMode;

/// Environment variable holding the chat API key.
pub const GENERATION_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable holding the web search API key.
pub const WEB_API_KEY_ENV: &str = "TAVILY_API_KEY";

/// Main configuration for docqa.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocQaConfig {
    /// Retrieval and fusion configuration.
    #[serde(default)]
    pub search: SearchConfig,

    /// Web augmentation configuration.
    #[serde(default)]
    pub web: WebConfig,

    /// Chat model configuration.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Per response mode settings.
    #[serde(default)]
    pub modes: ModesConfig,

    /// Conversation cache policy.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Chat history bounds.
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Retrieval and fusion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of chunks retrieved per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Weight of the normalized dense similarity.
    #[serde(default = "default_dense_weight")]
    pub dense_weight: f32,

    /// Weight of the normalized lexical score.
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f32,

    /// How many top-ranked chunks contribute page citations.
    #[serde(default = "default_citation_chunks")]
    pub citation_chunks: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 8,
            dense_weight: 0.6,
            lexical_weight: 0.4,
            citation_chunks: 3,
        }
    }
}

impl SearchConfig {
    /// Reject weights and limits that cannot produce a meaningful ranking.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(DocQaError::config("search.top_k must be at least 1"));
        }
        if self.dense_weight < 0.0 || self.lexical_weight < 0.0 {
            return Err(DocQaError::config("search weights must be non-negative"));
        }
        if self.dense_weight + self.lexical_weight <= 0.0 {
            return Err(DocQaError::config("search weights must not both be zero"));
        }
        Ok(())
    }
}

/// Web augmentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Allow web augmentation at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Search API base URL.
    #[serde(default = "default_web_api_base")]
    pub api_base: String,

    /// Search API key (falls back to `TAVILY_API_KEY`).
    #[serde(default)]
    pub api_key: String,

    /// Results requested from the provider.
    #[serde(default = "default_web_max_results")]
    pub max_results: u32,

    /// Provider search depth ("basic" or "advanced").
    #[serde(default = "default_search_depth")]
    pub search_depth: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: default_web_api_base(),
            api_key: String::new(),
            max_results: 5,
            search_depth: default_search_depth(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Chat model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_generation_api_base")]
    pub api_base: String,

    /// API key (falls back to `GROQ_API_KEY`).
    #[serde(default)]
    pub api_key: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_base: default_generation_api_base(),
            api_key: String::new(),
            model: default_model(),
            temperature: 0.1,
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Settings for one response mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Human-readable description.
    pub description: String,

    /// Completion token limit.
    pub max_tokens: u32,

    /// Instruction placed at the top of the prompt.
    pub instruction: String,
}

/// Response mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModesConfig {
    #[serde(default = "default_concise")]
    pub concise: ModeConfig,

    #[serde(default = "default_detailed")]
    pub detailed: ModeConfig,
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self {
            concise: default_concise(),
            detailed: default_detailed(),
        }
    }
}

impl ModesConfig {
    pub fn for_mode(&self, mode: ResponseMode) -> &ModeConfig {
        match mode {
            ResponseMode::Concise => &self.concise,
            ResponseMode::Detailed => &self.detailed,
        }
    }
}

/// Conversation cache policy. Absent limits mean unbounded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached responses; oldest entries are evicted first.
    #[serde(default)]
    pub max_entries: Option<usize>,

    /// Entry lifetime in seconds.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

/// Chat history bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Messages kept in the session.
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// User/assistant turns replayed into the prompt.
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_messages: 20,
            context_turns: 3,
        }
    }
}

// Default value functions

fn default_true() -> bool {
    true
}

fn default_top_k() -> usize {
    8
}

fn default_dense_weight() -> f32 {
    0.6
}

fn default_lexical_weight() -> f32 {
    0.4
}

fn default_citation_chunks() -> usize {
    3
}

fn default_web_api_base() -> String {
    "https://api.tavily.com".to_string()
}

fn default_web_max_results() -> u32 {
    5
}

fn default_search_depth() -> String {
    "basic".to_string()
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_generation_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_concise() -> ModeConfig {
    ModeConfig {
        description: "Short, direct answers".to_string(),
        max_tokens: 512,
        instruction: "Provide a brief, concise answer. Be direct and to the point. \
                      Use 2-3 sentences maximum."
            .to_string(),
    }
}

fn default_detailed() -> ModeConfig {
    ModeConfig {
        description: "Comprehensive, in-depth responses".to_string(),
        max_tokens: 2048,
        instruction: "Provide a comprehensive, detailed answer. Include explanations, \
                      examples, and context where relevant."
            .to_string(),
    }
}

fn default_max_messages() -> usize {
    20
}

fn default_context_turns() -> usize {
    3
}

impl DocQaConfig {
    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| DocQaError::config(format!("Failed to parse config: {}", e)))?;
        config.search.validate()?;
        Ok(config)
    }

    /// Load configuration from default paths.
    pub fn load_default() -> Result<Self> {
        // Try user config first
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("docqa").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        // Try local config
        let local_config = PathBuf::from("docqa.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        Ok(Self::default())
    }

    /// Fill empty API keys from the process environment.
    pub fn with_env_keys(self) -> Self {
        self.with_keys_from(|name| std::env::var(name).ok())
    }

    /// Fill empty API keys using the given lookup.
    pub fn with_keys_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.generation.api_key.is_empty() {
            if let Some(key) = lookup(GENERATION_API_KEY_ENV) {
                self.generation.api_key = key;
            }
        }
        if self.web.api_key.is_empty() {
            if let Some(key) = lookup(WEB_API_KEY_ENV) {
                self.web.api_key = key;
            }
        }
        self
    }

    /// Generation parameters for a response mode.
    pub fn generation_params(&self, mode: ResponseMode) -> GenerationParams {
        GenerationParams {
            max_tokens: self.modes.for_mode(mode).max_tokens,
            temperature: self.generation.temperature,
        }
    }
}
