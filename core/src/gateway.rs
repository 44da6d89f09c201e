//! Blocking gateway: `NotionClient` request building plus a `Transport`.
//!
//! Every operation except `query_database` is exactly one round trip and
//! returns the decoded body unchanged. `query_database` follows cursors
//! until the API reports no more results and returns the concatenated rows.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::NotionClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::QueryPage;

/// Authenticated client for the Notion API.
///
/// Holds no mutable state, so one instance can be shared across threads
/// whenever the transport allows it.
#[derive(Debug, Clone)]
pub struct Notion<T = UreqTransport> {
    client: NotionClient,
    transport: T,
    max_pages: Option<usize>,
}

impl Notion<UreqTransport> {
    /// Gateway for the public endpoint, authenticated with `token`.
    pub fn new(token: &str) -> Self {
        Self::from_config(&ClientConfig::new(token))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }

    /// Gateway configured from `NOTION_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::from_config(&ClientConfig::from_env()?))
    }
}

impl<T: Transport> Notion<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: NotionClient::from_config(config),
            transport,
            max_pages: config.max_pages.filter(|&limit| limit > 0),
        }
    }

    pub fn client(&self) -> &NotionClient {
        &self.client
    }

    pub fn retrieve_page(&self, page_id: &str) -> Result<Value, ApiError> {
        let req = self.client.build_retrieve_page(page_id)?;
        self.send(req)
    }

    pub fn create_page(&self, parent: &Value, properties: &Value) -> Result<Value, ApiError> {
        let req = self.client.build_create_page(parent, properties)?;
        self.send(req)
    }

    pub fn update_page(&self, page_id: &str, properties: &Value) -> Result<Value, ApiError> {
        let req = self.client.build_update_page(page_id, properties)?;
        self.send(req)
    }

    /// Soft-delete a page, or restore it with `archived = false`.
    pub fn archive_page(&self, page_id: &str, archived: bool) -> Result<Value, ApiError> {
        let req = self.client.build_archive_page(page_id, archived)?;
        self.send(req)
    }

    pub fn retrieve_database(&self, database_id: &str) -> Result<Value, ApiError> {
        let req = self.client.build_retrieve_database(database_id)?;
        self.send(req)
    }

    /// Fetch every row of a database query, starting at `start_cursor`.
    ///
    /// Rows come back in page order, then in-page order. Unlike the other
    /// operations this returns the rows, not the paginated envelope.
    pub fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<Vec<Value>, ApiError> {
        let mut rows = Vec::new();
        let mut cursor = start_cursor.map(str::to_string);
        let mut pages = 0usize;

        loop {
            if let Some(limit) = self.max_pages {
                if pages >= limit {
                    warn!(database_id, limit, "query pagination stopped at page limit");
                    return Err(ApiError::PageLimitExceeded { limit });
                }
            }

            let page = self.query_database_page(database_id, cursor.as_deref())?;
            pages += 1;
            debug!(
                database_id,
                page = pages,
                results = page.results.len(),
                has_more = page.has_more,
                "query page received"
            );
            rows.extend(page.results);

            if !page.has_more {
                return Ok(rows);
            }
            cursor = page.next_cursor;
        }
    }

    /// Fetch a single page of a database query.
    pub fn query_database_page(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<QueryPage, ApiError> {
        let req = self.client.build_query_database(database_id, start_cursor)?;
        let response = self.execute(req)?;
        self.client.parse_query_page(response)
    }

    pub fn retrieve_block(&self, block_id: &str) -> Result<Value, ApiError> {
        let req = self.client.build_retrieve_block(block_id)?;
        self.send(req)
    }

    /// Patch a block with caller-supplied `data`, sent verbatim.
    pub fn update_block(&self, block_id: &str, data: &Value) -> Result<Value, ApiError> {
        let req = self.client.build_update_block(block_id, data)?;
        self.send(req)
    }

    fn send(&self, req: HttpRequest) -> Result<Value, ApiError> {
        let response = self.execute(req)?;
        self.client.parse_response(response)
    }

    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %req.method, url = %req.url, "notion request");
        let response = self.transport.execute(req)?;
        debug!(status = response.status, "notion response");
        Ok(response)
    }
}
