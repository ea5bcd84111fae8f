//! API error types

/// Errors that can occur while calling a list endpoint.
///
/// Every variant collapses to a single human-readable message via `Display`,
/// which is what the table surfaces to the user.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response (status >= 400).
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message from the envelope, or the raw body.
        message: String,
    },

    /// The server answered with `success: false`.
    #[error("{0}")]
    Envelope(String),

    /// Network error during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the response body.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        assert_eq!(
            ApiError::http(500, "Failed to fetch users").to_string(),
            "HTTP 500: Failed to fetch users"
        );
        assert_eq!(
            ApiError::Envelope("Failed to fetch users".into()).to_string(),
            "Failed to fetch users"
        );
        assert_eq!(ApiError::http(404, "nope").status_code(), Some(404));
        assert_eq!(ApiError::parse_with_body("bad json", "<html>").status_code(), None);
    }
}
