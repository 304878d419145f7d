use reqwest::StatusCode;

use crate::{RequestDescriptor, Response};

/// Error type returned by [`crate::AuthenticatedClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response was received (network failure, timeout, unreadable body).
    #[error("transport error: {source}")]
    Transport {
        source: reqwest::Error,
        /// The request that failed, as it was sent.
        request: Box<RequestDescriptor>,
    },
    /// Non-success HTTP status with the buffered response.
    #[error("http error {}: {}", .response.status.as_u16(), .response.body)]
    Http {
        response: Box<Response>,
        /// The request that failed, including its retry flag.
        request: Box<RequestDescriptor>,
    },
    /// Failure reported by a recovery callback that has no HTTP shape of its own.
    #[error("recovery failed: {0}")]
    Recovery(String),
    /// Request body could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),
    /// Response body could not be decoded into the requested type.
    #[error("decode error: {0}")]
    Decode(String),
    /// Header name or value rejected by the HTTP layer.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    /// Client configuration rejected at construction time.
    #[error("invalid client config: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of the failure response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { response, .. } => Some(response.status),
            Self::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    /// The request descriptor attached to transport and HTTP failures.
    pub fn request(&self) -> Option<&RequestDescriptor> {
        match self {
            Self::Transport { request, .. } | Self::Http { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
