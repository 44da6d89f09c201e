//! Blocking client for the Notion REST API.
//!
//! # Overview
//! Two halves:
//! - The request gateway: `NotionClient` builds `HttpRequest` values and
//!   parses `HttpResponse` values without touching the network
//!   (host-does-IO), and `Notion` pairs it with a `Transport` to run the
//!   round trips. Responses are returned as `serde_json::Value`.
//! - The property codec (`property`): pure builders for property value
//!   fragments and a decoder back to primitive values.
//!
//! # Design
//! - Credentials and headers are fixed when a client is built.
//! - HTTP status codes are not interpreted. API error payloads come back as
//!   ordinary values; only transport failures and non-JSON bodies are errors.
//! - `query_database` is the one multi-request operation: it follows cursors
//!   in a loop, optionally capped by `ClientConfig::max_pages`.
//! - The crate logs through `tracing` and installs no subscriber.

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod property;
pub mod transport;
pub mod types;

pub use client::NotionClient;
pub use config::ClientConfig;
pub use error::{is_error_payload, ApiError};
pub use gateway::Notion;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use property::{decode, decode_properties, PropertyKind, PropertyValue, UnknownPropertyKind};
pub use transport::{Transport, UreqTransport};
pub use types::QueryPage;
