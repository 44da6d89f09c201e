//! Error types for the Notion API client.
//!
//! # Design
//! HTTP status codes are never turned into errors: a 4xx/5xx response whose
//! body is valid JSON comes back as an ordinary value, and callers inspect it
//! themselves (see `is_error_payload`). Errors are reserved for failures
//! where no usable JSON exists: the network failed, the body was not JSON,
//! or a paginated envelope was missing the fields the loop depends on.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `NotionClient` parse methods and the `Notion` gateway.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, or timeout failure. Never retried.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body was not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A resource identifier was empty.
    #[error("resource identifier must not be empty")]
    EmptyId,

    /// A query page lacked `results`/`has_more`, or claimed more results
    /// without a cursor. Carries the decoded payload for inspection.
    #[error("unexpected query response: {0}")]
    UnexpectedResponse(Value),

    /// `query_database` fetched `limit` pages and the API still reported more.
    #[error("pagination stopped after {limit} pages")]
    PageLimitExceeded { limit: usize },

    /// Client configuration was missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Whether a decoded response is an API-level error payload
/// (`{"object": "error", ...}`) rather than a resource.
pub fn is_error_payload(value: &Value) -> bool {
    value.get("object").and_then(Value::as_str) == Some("error")
}
