use reqwest::StatusCode;
use thiserror::Error;

/// Why a call to the weather provider produced no data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or other transport failure.
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-2xx status.
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The body could not be decoded into the expected shape.
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn endpoint(&self) -> &'static str {
        match self {
            FetchError::Network { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Decode { endpoint, .. } => endpoint,
        }
    }
}
