//! Error types for the timeline store.
//!
//! Uses `thiserror` for typed errors that surface from every loader and
//! from the key-value mirror: transport failures, bad status codes,
//! undecodable or invalid payloads, storage I/O.

use timeline_types::{Endpoint, PayloadError, UnknownEventType};

/// Errors that can occur during store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A loader ran before any timeline slug was selected.
    #[error("no timeline selected")]
    NoSlug,

    /// The request never produced a response (connect, timeout, TLS).
    #[error("HTTP error on {endpoint}: {message}")]
    Http {
        /// Endpoint that was requested.
        endpoint: Endpoint,
        /// Transport error description.
        message: String,
    },

    /// The backend answered with a non-success status.
    #[error("{endpoint} returned {status}")]
    Status {
        /// Endpoint that was requested.
        endpoint: Endpoint,
        /// HTTP status code.
        status: u16,
    },

    /// The response body did not match the expected schema.
    #[error("could not decode {endpoint} response: {message}")]
    Decode {
        /// Endpoint that was requested.
        endpoint: Endpoint,
        /// Decoder error description.
        message: String,
    },

    /// The response body decoded but failed validation.
    #[error("invalid {endpoint} payload: {source}")]
    InvalidPayload {
        /// Endpoint that was requested.
        endpoint: Endpoint,
        /// The violated rule.
        source: PayloadError,
    },

    /// A name outside the fixed event-type set was used.
    #[error(transparent)]
    UnknownEventType(#[from] UnknownEventType),

    /// The key-value mirror could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    /// Endpoint involved in the failure, when there is one.
    pub const fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Self::Http { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. }
            | Self::InvalidPayload { endpoint, .. } => Some(*endpoint),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
