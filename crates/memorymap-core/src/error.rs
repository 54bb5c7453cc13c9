use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryMapError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("request cancelled")]
    Cancelled,
}

impl MemoryMapError {
    /// Returns `true` when the error is likely transient (HTTP 429/5xx,
    /// network timeouts, connection refused). Only used to pick log levels
    /// and user-facing hints; nothing is retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Storage(msg) => is_transient_message(msg),
            _ => false,
        }
    }
}

fn is_transient_message(msg: &str) -> bool {
    let msg_lower = msg.to_lowercase();
    let patterns = [
        "timeout",
        "timed out",
        "temporarily unavailable",
        "resource busy",
    ];
    patterns.iter().any(|p| msg_lower.contains(p))
}

pub type Result<T> = std::result::Result<T, MemoryMapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_429() {
        let err = MemoryMapError::Api {
            status: 429,
            message: "rate limit exceeded".into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_transient_503() {
        let err = MemoryMapError::Api {
            status: 503,
            message: "service unavailable".into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_transient_storage_busy() {
        let err = MemoryMapError::Storage("resource busy, try again".into());
        assert!(err.is_transient());
    }

    #[test]
    fn test_permanent_401() {
        let err = MemoryMapError::Api {
            status: 401,
            message: "Invalid credentials".into(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_permanent_validation() {
        let err = MemoryMapError::InvalidInput("Title is required".into());
        assert!(!err.is_transient());
        assert!(!MemoryMapError::Cancelled.is_transient());
    }

    #[test]
    fn test_api_display() {
        let err = MemoryMapError::Api {
            status: 404,
            message: "Entry not found".into(),
        };
        assert_eq!(err.to_string(), "API error 404: Entry not found");
    }
}
