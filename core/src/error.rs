//! Error types for the transit API client.
//!
//! # Design
//! Configuration and argument problems are raised before any request is
//! built. `EmptyResponse` is reported when the API answers with nothing
//! usable, which almost always means the arguments selected nothing. Network
//! failures keep their original error as the source and are never retried.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `TransitClient` and its collaborators.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable endpoint identifier was supplied.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The operation does not declare this argument name.
    #[error("{operation} does not accept argument `{argument}`")]
    UnsupportedArgument {
        operation: &'static str,
        argument: String,
    },

    /// A singleton lookup was invoked without an identifier.
    #[error("{operation} requires argument `{argument}`")]
    MissingArgument {
        operation: &'static str,
        argument: &'static str,
    },

    /// The API returned an empty payload.
    #[error("no data returned from API, check your arguments")]
    EmptyResponse,

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body was not valid JSON for the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A resource object carried a different `type` than the decoder expects.
    #[error("expected resource of type `{expected}`, found `{found}`")]
    UnexpectedType { expected: &'static str, found: String },

    /// A timestamp attribute could not be parsed.
    #[error("invalid timestamp `{value}`: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}
