//! Crate-wide error hierarchy for gitlab-gateway.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type GitLabResult<T> = Result<T, GitLabError>;

/// Root error type for the gitlab-gateway crate.
#[derive(Debug, Error)]
pub enum GitLabError {
    /// GitLab answered with an error or could not be reached.
    #[error(transparent)]
    Provider(#[from] GitLabProviderError),

    /// Configuration problems (bad/missing token, base URL).
    #[error(transparent)]
    Config(#[from] GitLabConfigError),
}

/// Provider-level failure, mapped from HTTP status where available.
#[derive(Debug, Error)]
pub enum GitLabProviderError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (non-2xx) not covered by specific variants.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of a GitLab response.
    #[error("invalid gitlab response: {0}")]
    InvalidResponse(String),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum GitLabConfigError {
    /// Missing access token.
    #[error("missing gitlab token")]
    MissingToken,

    /// Invalid base URL.
    #[error("invalid gitlab url: {0}")]
    InvalidBaseUrl(String),

    /// Token contains characters not allowed in a header.
    #[error("gitlab token is not a valid header value")]
    InvalidToken,
}

impl GitLabProviderError {
    /// Maps a non-success HTTP status to a provider error.
    pub fn from_status(status: StatusCode) -> Self {
        let code = status.as_u16();
        match code {
            401 => GitLabProviderError::Unauthorized,
            403 => GitLabProviderError::Forbidden,
            404 => GitLabProviderError::NotFound,
            429 => GitLabProviderError::RateLimited,
            500..=599 => GitLabProviderError::Server(code),
            _ => GitLabProviderError::HttpStatus(code),
        }
    }
}

// ===== Conversions for `?` ergonomics at the crate root =====

impl From<reqwest::Error> for GitLabError {
    fn from(e: reqwest::Error) -> Self {
        GitLabError::Provider(GitLabProviderError::from(e))
    }
}

impl From<reqwest::Error> for GitLabProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return GitLabProviderError::Timeout;
        }
        if let Some(status) = e.status() {
            return GitLabProviderError::from_status(status);
        }
        if e.is_decode() {
            return GitLabProviderError::InvalidResponse(e.to_string());
        }
        GitLabProviderError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            GitLabProviderError::from_status(StatusCode::UNAUTHORIZED),
            GitLabProviderError::Unauthorized
        ));
        assert!(matches!(
            GitLabProviderError::from_status(StatusCode::NOT_FOUND),
            GitLabProviderError::NotFound
        ));
        assert!(matches!(
            GitLabProviderError::from_status(StatusCode::TOO_MANY_REQUESTS),
            GitLabProviderError::RateLimited
        ));
        assert!(matches!(
            GitLabProviderError::from_status(StatusCode::BAD_GATEWAY),
            GitLabProviderError::Server(502)
        ));
        assert!(matches!(
            GitLabProviderError::from_status(StatusCode::CONFLICT),
            GitLabProviderError::HttpStatus(409)
        ));
    }
}
