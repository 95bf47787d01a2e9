use thiserror::Error;

/// Any failure to obtain a page from the collection endpoint.
///
/// Transport failures, non-200 statuses and undecodable bodies all collapse
/// into this one kind; the message is for logs and the status bar only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Network error: {message}")]
pub struct NetworkError {
    pub message: String,
}

impl NetworkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        NetworkError::new(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Debounce delay must not be negative (got {0}ms)")]
    NegativeDebounce(i64),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Request timeout must be at least one second")]
    ZeroTimeout,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export")]
    NoRecords,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FetchResult<T> = Result<T, NetworkError>;
