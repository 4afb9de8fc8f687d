//! Error types for the lookup client.

use thiserror::Error;

/// Errors that can occur when calling the lookup endpoint.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure reaching the endpoint, including the
    /// per-call timeout.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the endpoint. `message` is the upstream
    /// `msg` field when the error body parses as JSON.
    #[error("API error: {status} {status_text}{}", upstream_detail(.message))]
    Http {
        status: u16,
        status_text: String,
        message: Option<String>,
    },

    /// The call was aborted via the cancellation token. Deliberate,
    /// not a failure; the runner must not synthesize placeholder
    /// entries for it.
    #[error("lookup cancelled")]
    Cancelled,
}

impl ClientError {
    /// Returns true when this error is a deliberate cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

fn upstream_detail(message: &Option<String>) -> String {
    match message {
        Some(msg) => format!(" ({msg})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_without_upstream_message() {
        let err = ClientError::Http {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            message: None,
        };
        assert_eq!(err.to_string(), "API error: 500 Internal Server Error");
    }

    #[test]
    fn test_http_error_appends_upstream_message() {
        let err = ClientError::Http {
            status: 401,
            status_text: "Unauthorized".to_string(),
            message: Some("등록되지 않은 인증키 입니다.".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "API error: 401 Unauthorized (등록되지 않은 인증키 입니다.)"
        );
    }

    #[test]
    fn test_is_cancelled() {
        assert!(ClientError::Cancelled.is_cancelled());
        let err = ClientError::Http {
            status: 404,
            status_text: "Not Found".to_string(),
            message: None,
        };
        assert!(!err.is_cancelled());
    }
}
