//! Error types for the document Q&A engine.

use thiserror::Error;

/// Result type alias using DocQaError.
pub type Result<T> = std::result::Result<T, DocQaError>;

/// Errors that can occur in the docqa system.
///
/// Degraded-but-valid states (no corpus loaded, web search failed) are not
/// errors; they surface as empty context instead.
#[derive(Error, Debug)]
pub enum DocQaError {
    /// Invalid argument provided.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Dense index query failed.
    #[error("Dense index error: {message}")]
    DenseIndex { message: String },

    /// External provider (web search, chat API) failed.
    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    /// Language model generation failed.
    #[error("Generation failed: {message}")]
    Generation { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DocQaError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a dense index error.
    pub fn dense_index(message: impl Into<String>) -> Self {
        Self::DenseIndex {
            message: message.into(),
        }
    }

    /// Create a provider error.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a generation error.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::DenseIndex { .. } => "DENSE_INDEX_ERROR",
            Self::Provider { .. } => "PROVIDER_ERROR",
            Self::Generation { .. } => "GENERATION_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Config { .. } => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DocQaError::provider("tavily", "401 Unauthorized");
        let text = err.to_string();
        assert!(text.contains("tavily"));
        assert!(text.contains("401"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DocQaError::generation("boom").error_code(),
            "GENERATION_ERROR"
        );
        assert_eq!(
            DocQaError::invalid_argument("empty query").error_code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(DocQaError::config("no key").error_code(), "CONFIG_ERROR");
        assert_eq!(
            DocQaError::dense_index("offline").error_code(),
            "DENSE_INDEX_ERROR"
        );
    }
}
