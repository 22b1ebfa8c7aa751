//! Error types for promptline
//!
//! Errors fall into two families, matching how the handler has to answer:
//!
//! - [`RequestError`] - the inbound event was unusable (HTTP 400)
//! - [`InvokeError`] - the model call or its response failed (HTTP 500)
//!
//! [`DispatchError`] flattens both for the dispatcher.

use thiserror::Error;

/// The inbound event could not be turned into a prompt.
///
/// The `Display` text of each variant is the message returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Gateway event whose `body` is missing, null or empty
    #[error("Missing or empty request body")]
    MissingBody,

    /// Gateway event whose string `body` is not valid JSON
    #[error("Invalid JSON in request body")]
    InvalidJson,

    /// No usable `prompt` after extraction
    #[error("Missing prompt in request")]
    MissingPrompt,

    /// Event matched none of the known shapes
    #[error("Invalid request format")]
    InvalidFormat,

    /// Legacy gateway mode: decoded body has no usable `prompt`
    #[error("Missing 'prompt' in request body")]
    MissingBodyPrompt,
}

/// Error types for model invocation
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Authentication or authorization failed (expired tokens, invalid credentials, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting or throttling
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Network or connectivity issues
    #[error("Network error: {0}")]
    Network(String),

    /// Service unavailable or temporary issues
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Model-side errors (content filtered, context too long, etc.)
    #[error("Model error: {0}")]
    Model(String),

    /// Invalid configuration (unknown model ID, bad ARN, missing access, etc.)
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The model answered with a body that is not JSON
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Anything that doesn't fit above
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for InvokeError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// Any failure the dispatcher can turn into an error outcome
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Bad input, answered with 400
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Upstream failure, answered with 500
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

impl DispatchError {
    /// HTTP status used when this error is answered through an envelope
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Request(_) => 400,
            Self::Invoke(_) => 500,
        }
    }

    /// Returns true if the failure happened at or after the model call
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Invoke(_))
    }
}
