//! eBird-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EbirdError {
    #[error("Invalid or missing API key")]
    InvalidApiKey,

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl EbirdError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidApiKey => {
                "eBird rejected the API key. Check your settings.".to_string()
            }
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::NotFound(_) => "Location or checklist not found.".to_string(),
            Self::ApiError(msg) => format!("eBird error: {}", msg),
            Self::CacheError(_) => "Local cache error".to_string(),
            Self::NetworkError(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::NetworkError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        let err = EbirdError::InvalidApiKey;
        assert!(err.user_message().contains("API key"));

        let err = EbirdError::RateLimited(30);
        assert!(err.user_message().contains("30"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(EbirdError::RateLimited(10).is_retryable());
        assert!(!EbirdError::NotFound("L123".into()).is_retryable());
        assert!(!EbirdError::InvalidApiKey.is_retryable());
    }
}
