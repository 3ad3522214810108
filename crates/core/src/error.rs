//! Error types for the Parley domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level [`Error`]
//! wraps them so `?` works across crate boundaries.

use thiserror::Error;

/// The top-level error type for all Parley operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("A tool named '{0}' is already registered")]
    DuplicateName(String),

    #[error("Invalid tool input: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },
}

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Indexing failed: {0}")]
    Indexing(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Rejections of caller input at the session boundary.
///
/// None of these mutate session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Invalid level '{0}'. Choose one of: beginner, intermediate, advanced")]
    InvalidLevel(String),

    #[error("Unknown model tier '{0}'. Choose one of: fast, balanced, smart, coding")]
    UnknownTier(String),

    #[error("No API key configured for the language-model service")]
    MissingCredential,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::ExecutionFailed {
            tool_name: "Knowledge Lookup".into(),
            reason: "service unavailable".into(),
        });
        assert!(err.to_string().contains("Knowledge Lookup"));
        assert!(err.to_string().contains("service unavailable"));
    }

    #[test]
    fn tool_timeout_names_tool_and_limit() {
        let err = ToolError::Timeout {
            tool_name: "Knowledge Lookup".into(),
            timeout_secs: 20,
        };
        assert_eq!(err.to_string(), "Tool timed out: Knowledge Lookup after 20s");
    }

    #[test]
    fn session_error_lists_valid_choices() {
        let err = SessionError::InvalidLevel("expert".into());
        let text = err.to_string();
        assert!(text.contains("expert"));
        assert!(text.contains("intermediate"));
    }
}
