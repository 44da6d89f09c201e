//! Request bodies and the query page envelope.
//!
//! # Design
//! Page, database, and block payloads stay as `serde_json::Value`: the
//! gateway passes them through without interpreting them. Only the pieces
//! the client itself reads or writes get a struct.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST pages`.
#[derive(Debug, Serialize)]
pub struct CreatePage<'a> {
    pub parent: &'a Value,
    pub properties: &'a Value,
}

/// Body of `PATCH pages/{id}` when updating properties.
#[derive(Debug, Serialize)]
pub struct UpdatePage<'a> {
    pub properties: &'a Value,
}

/// Body of `PATCH pages/{id}` when archiving or restoring.
#[derive(Debug, Serialize)]
pub struct ArchivePage {
    pub archived: bool,
}

/// Body of `POST databases/{id}/query`. Serializes to `{}` without a cursor.
#[derive(Debug, Default, Serialize)]
pub struct QueryDatabase<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<&'a str>,
}

/// One page of a database query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryPage {
    pub results: Vec<Value>,
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}
