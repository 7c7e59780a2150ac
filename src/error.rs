use thiserror::Error;

/// Errors returned by the API client and the resource layer
#[derive(Debug, Error)]
pub enum Error {
    /// The API endpoint rejected the request with an error envelope
    #[error("The API endpoint returned: {code}, {message}")]
    Provider { code: i64, message: String },

    /// The request never produced a response (timeout, refused connection, DNS)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON or did not fit the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// An error status whose body was not a response envelope
    #[error("The API endpoint answered HTTP {status} with an undecodable body: {source}")]
    UnexpectedStatus {
        status: u16,
        source: serde_json::Error,
    },

    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("API email and key are required")]
    MissingCredentials,
}

impl Error {
    /// Returns the HTTP status when it is part of the error
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the provider error code when the API rejected the request
    #[must_use]
    pub const fn provider_code(&self) -> Option<i64> {
        match self {
            Self::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
