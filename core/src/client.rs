//! Stateless HTTP request builder and response parser for the Notion API.
//!
//! # Design
//! `NotionClient` holds the base URL and the fixed header set, both derived
//! once from a `ClientConfig`. Each gateway operation is split into a
//! `build_*` method producing an `HttpRequest` and a parse method consuming
//! the `HttpResponse`. The caller (or `Notion`, the blocking gateway) runs
//! the round trip in between.
//!
//! Parsing never looks at the status code. Any body that is valid JSON is
//! returned as-is, including the API's own error payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ArchivePage, CreatePage, QueryDatabase, QueryPage, UpdatePage};

/// Synchronous, stateless request builder for the Notion API.
#[derive(Clone)]
pub struct NotionClient {
    base_url: String,
    headers: Vec<(String, String)>,
}

impl NotionClient {
    /// Client for the public API endpoint with the default version.
    pub fn new(token: &str) -> Self {
        Self::from_config(&ClientConfig::new(token))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers: vec![
                ("authorization".to_string(), format!("Bearer {}", config.token)),
                ("notion-version".to_string(), config.notion_version.clone()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn build_retrieve_page(&self, page_id: &str) -> Result<HttpRequest, ApiError> {
        let url = self.resource_url("pages", page_id)?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_create_page(
        &self,
        parent: &Value,
        properties: &Value,
    ) -> Result<HttpRequest, ApiError> {
        let body = to_body(&CreatePage { parent, properties })?;
        let url = format!("{}/pages", self.base_url);
        Ok(self.request(HttpMethod::Post, url, Some(body)))
    }

    pub fn build_update_page(
        &self,
        page_id: &str,
        properties: &Value,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.resource_url("pages", page_id)?;
        let body = to_body(&UpdatePage { properties })?;
        Ok(self.request(HttpMethod::Patch, url, Some(body)))
    }

    /// Soft-delete (`archived = true`) or restore (`archived = false`) a page.
    pub fn build_archive_page(&self, page_id: &str, archived: bool) -> Result<HttpRequest, ApiError> {
        let url = self.resource_url("pages", page_id)?;
        let body = to_body(&ArchivePage { archived })?;
        Ok(self.request(HttpMethod::Patch, url, Some(body)))
    }

    pub fn build_retrieve_database(&self, database_id: &str) -> Result<HttpRequest, ApiError> {
        let url = self.resource_url("databases", database_id)?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    /// Request for one page of a database query, starting at `start_cursor`
    /// when given. An empty cursor counts as none.
    pub fn build_query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let url = format!("{}/query", self.resource_url("databases", database_id)?);
        let start_cursor = start_cursor.filter(|c| !c.is_empty());
        let body = to_body(&QueryDatabase { start_cursor })?;
        Ok(self.request(HttpMethod::Post, url, Some(body)))
    }

    pub fn build_retrieve_block(&self, block_id: &str) -> Result<HttpRequest, ApiError> {
        let url = self.resource_url("blocks", block_id)?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    /// `data` is sent verbatim as the PATCH body.
    pub fn build_update_block(&self, block_id: &str, data: &Value) -> Result<HttpRequest, ApiError> {
        let url = self.resource_url("blocks", block_id)?;
        let body = to_body(data)?;
        Ok(self.request(HttpMethod::Patch, url, Some(body)))
    }

    /// Decode any response body as JSON, whatever the status.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Decode one page of a database query.
    ///
    /// Fails with `UnexpectedResponse` when the envelope lacks `results` or
    /// `has_more`, or reports more results without a cursor to fetch them.
    pub fn parse_query_page(&self, response: HttpResponse) -> Result<QueryPage, ApiError> {
        let value = self.parse_response(response)?;
        let page = match QueryPage::deserialize(&value) {
            Ok(page) => page,
            Err(_) => return Err(ApiError::UnexpectedResponse(value)),
        };
        if page.has_more && page.next_cursor.is_none() {
            return Err(ApiError::UnexpectedResponse(value));
        }
        Ok(page)
    }

    fn resource_url(&self, collection: &str, id: &str) -> Result<String, ApiError> {
        if id.is_empty() {
            return Err(ApiError::EmptyId);
        }
        Ok(format!("{}/{collection}/{id}", self.base_url))
    }

    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: self.headers.clone(),
            body,
        }
    }
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn to_body<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> NotionClient {
        NotionClient::from_config(
            &ClientConfig::new("secret_abc").with_base_url("http://localhost:3000/v1"),
        )
    }

    fn body(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn headers_fixed_at_construction() {
        let req = client().build_retrieve_page("abc").unwrap();
        assert_eq!(req.header("authorization"), Some("Bearer secret_abc"));
        assert_eq!(req.header("notion-version"), Some("2021-08-16"));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn default_client_targets_public_api() {
        let req = NotionClient::new("t").build_retrieve_block("b1").unwrap();
        assert_eq!(req.url, "https://api.notion.com/v1/blocks/b1");
    }

    #[test]
    fn build_retrieve_page_produces_correct_request() {
        let req = client().build_retrieve_page("abc").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/v1/pages/abc");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_page_wraps_parent_and_properties() {
        let parent = json!({"database_id": "db1"});
        let properties = json!({"Name": {"title": [{"text": {"content": "Hi"}}]}});
        let req = client().build_create_page(&parent, &properties).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/v1/pages");
        assert_eq!(body(&req), json!({"parent": parent, "properties": properties}));
    }

    #[test]
    fn build_update_page_sends_only_properties() {
        let properties = json!({"Done": {"checkbox": true}});
        let req = client().build_update_page("abc", &properties).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "http://localhost:3000/v1/pages/abc");
        assert_eq!(body(&req), json!({"properties": {"Done": {"checkbox": true}}}));
    }

    #[test]
    fn build_archive_page_sends_flag() {
        let req = client().build_archive_page("abc", true).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(body(&req), json!({"archived": true}));

        let req = client().build_archive_page("abc", false).unwrap();
        assert_eq!(body(&req), json!({"archived": false}));
    }

    #[test]
    fn build_retrieve_database_produces_correct_request() {
        let req = client().build_retrieve_database("db1").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/v1/databases/db1");
    }

    #[test]
    fn build_query_database_with_and_without_cursor() {
        let req = client().build_query_database("db1", None).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/v1/databases/db1/query");
        assert_eq!(body(&req), json!({}));

        let req = client().build_query_database("db1", Some("cur")).unwrap();
        assert_eq!(body(&req), json!({"start_cursor": "cur"}));
    }

    #[test]
    fn build_query_database_drops_empty_cursor() {
        let req = client().build_query_database("db1", Some("")).unwrap();
        assert_eq!(body(&req), json!({}));
    }

    #[test]
    fn build_update_block_passes_data_verbatim() {
        let data = json!({"paragraph": {"rich_text": []}, "archived": false});
        let req = client().build_update_block("b1", &data).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "http://localhost:3000/v1/blocks/b1");
        assert_eq!(body(&req), data);
    }

    #[test]
    fn empty_ids_are_rejected() {
        let c = client();
        assert!(matches!(c.build_retrieve_page(""), Err(ApiError::EmptyId)));
        assert!(matches!(c.build_retrieve_database(""), Err(ApiError::EmptyId)));
        assert!(matches!(c.build_query_database("", None), Err(ApiError::EmptyId)));
        assert!(matches!(c.build_update_block("", &json!({})), Err(ApiError::EmptyId)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let c = NotionClient::from_config(
            &ClientConfig::new("t").with_base_url("http://localhost:3000/v1/"),
        );
        let req = c.build_retrieve_page("abc").unwrap();
        assert_eq!(req.url, "http://localhost:3000/v1/pages/abc");
    }

    #[test]
    fn parse_response_returns_error_payload_as_value() {
        let value = client()
            .parse_response(response(
                404,
                r#"{"object":"error","status":404,"code":"object_not_found","message":"nope"}"#,
            ))
            .unwrap();
        assert_eq!(value["code"], "object_not_found");
    }

    #[test]
    fn parse_response_bad_json() {
        let err = client().parse_response(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));

        let err = client().parse_response(response(502, "")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn parse_response_invalid_utf8_is_decode_error() {
        let resp = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: b"\xff\xfe{not json".to_vec(),
        };
        let err = client().parse_response(resp).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn parse_query_page_success() {
        let page = client()
            .parse_query_page(response(
                200,
                r#"{"object":"list","results":[{"id":"a"},{"id":"b"}],"has_more":true,"next_cursor":"b2"}"#,
            ))
            .unwrap();
        assert_eq!(page.results, vec![json!({"id": "a"}), json!({"id": "b"})]);
        assert!(page.has_more);
        assert_eq!(page.next_cursor.as_deref(), Some("b2"));
    }

    #[test]
    fn parse_query_page_error_payload_is_unexpected() {
        let err = client()
            .parse_query_page(response(
                401,
                r#"{"object":"error","status":401,"code":"unauthorized","message":"bad token"}"#,
            ))
            .unwrap_err();
        match err {
            ApiError::UnexpectedResponse(value) => assert_eq!(value["code"], "unauthorized"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_query_page_more_without_cursor_is_unexpected() {
        let err = client()
            .parse_query_page(response(
                200,
                r#"{"results":[],"has_more":true,"next_cursor":null}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedResponse(_)));
    }

    #[test]
    fn debug_omits_token() {
        let printed = format!("{:?}", client());
        assert!(!printed.contains("secret_abc"));
    }
}
