//! Remote API error type.

use std::fmt;
use std::io;

/// Failure while talking to the remote API or writing what it returned.
#[derive(Debug)]
pub enum ApiError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    Curl(curl::Error),
    /// Non-2xx response, with the API's error message if it sent one.
    Http { code: u32, message: Option<String> },
    /// Metadata response could not be understood.
    Metadata(String),
    /// Media response did not match the requested range.
    Range(String),
    /// Writing received bytes to the local sink failed.
    Sink(io::Error),
    /// Request URL could not be built.
    Url(url::ParseError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Curl(e) => write!(f, "{}", e),
            ApiError::Http {
                code,
                message: Some(msg),
            } => write!(f, "HTTP {}: {}", code, msg),
            ApiError::Http { code, message: None } => write!(f, "HTTP {}", code),
            ApiError::Metadata(msg) => write!(f, "bad metadata response: {}", msg),
            ApiError::Range(msg) => write!(f, "bad media response: {}", msg),
            ApiError::Sink(e) => write!(f, "write: {}", e),
            ApiError::Url(e) => write!(f, "url: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Curl(e) => Some(e),
            ApiError::Sink(e) => Some(e),
            ApiError::Url(e) => Some(e),
            ApiError::Http { .. } | ApiError::Metadata(_) | ApiError::Range(_) => None,
        }
    }
}

impl From<curl::Error> for ApiError {
    fn from(e: curl::Error) -> Self {
        ApiError::Curl(e)
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::Url(e)
    }
}
