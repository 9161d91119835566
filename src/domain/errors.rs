use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InvalidUri(String),
    ConnectionFailed(String),
    Timeout,
    InvalidRequest(String),
    UnsupportedMethod(String),
    PayloadTooLarge(usize),
    NotFound(String),
    Unavailable(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidUri(msg) => write!(f, "Invalid URI: {}", msg),
            ApiError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            ApiError::Timeout => write!(f, "Operation timed out"),
            ApiError::InvalidRequest(msg) => write!(f, "{}", msg),
            ApiError::UnsupportedMethod(method) => write!(f, "Unsupported method: {}", method),
            ApiError::PayloadTooLarge(limit) => write!(f, "Request body exceeds {} bytes", limit),
            ApiError::NotFound(msg) => write!(f, "{}", msg),
            ApiError::Unavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

pub type Result<T> = std::result::Result<T, ApiError>;
