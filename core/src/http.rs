//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `NotionClient` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching
//! the network; a `Transport` implementation (see `transport.rs`) performs
//! the round trip in between.
//!
//! All fields use owned types so values can be queued, recorded, and
//! replayed in tests without lifetime concerns.

use std::fmt;

/// HTTP method for a request. The remote API only needs these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: base endpoint, resource segment, and identifier already
/// joined. `body` is serialized JSON when present.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// Headers carry the bearer token, so it is masked here.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case("authorization") {
                    (k.as_str(), "Bearer ***")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

/// An HTTP response described as plain data.
///
/// `body` holds the raw bytes; UTF-8 and JSON are only checked when
/// `NotionClient` parses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/v1/pages/abc".to_string(),
            headers: vec![("Notion-Version".to_string(), "2021-08-16".to_string())],
            body: None,
        };
        assert_eq!(req.header("notion-version"), Some("2021-08-16"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn debug_masks_bearer_token() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/v1/pages/abc".to_string(),
            headers: vec![("authorization".to_string(), "Bearer secret_abc".to_string())],
            body: None,
        };
        let printed = format!("{req:?}");
        assert!(!printed.contains("secret_abc"));
        assert!(printed.contains("Bearer ***"));
    }

    #[test]
    fn method_display() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }
}
