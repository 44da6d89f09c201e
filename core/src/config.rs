//! Client configuration.
//!
//! The secret token is supplied by the embedding application, either
//! directly or through `NOTION_TOKEN`. Nothing here is mutated once a client
//! has been built from it.

use std::fmt;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1/";
pub const DEFAULT_NOTION_VERSION: &str = "2021-08-16";

pub const ENV_TOKEN: &str = "NOTION_TOKEN";
pub const ENV_BASE_URL: &str = "NOTION_BASE_URL";
pub const ENV_VERSION: &str = "NOTION_VERSION";
pub const ENV_MAX_PAGES: &str = "NOTION_MAX_PAGES";

/// Settings for a `NotionClient` / `Notion` gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub token: String,
    pub notion_version: String,
    pub base_url: String,
    /// Upper bound on pages fetched by one `query_database` call.
    /// `None` (or `Some(0)`) follows cursors until `has_more` is false.
    pub max_pages: Option<usize>,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_pages: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_notion_version(mut self, version: impl Into<String>) -> Self {
        self.notion_version = version.into();
        self
    }

    /// Cap query pagination at `max_pages`; 0 removes the cap.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = (max_pages > 0).then_some(max_pages);
        self
    }

    /// Read configuration from the process environment.
    ///
    /// `NOTION_TOKEN` is required; the other variables fall back to defaults.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let token = lookup(ENV_TOKEN)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{ENV_TOKEN} is not set")))?;
        let mut config = Self::new(token);

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(version) = lookup(ENV_VERSION) {
            config.notion_version = version;
        }
        if let Some(raw) = lookup(ENV_MAX_PAGES) {
            let max_pages = raw
                .parse::<usize>()
                .map_err(|e| ApiError::Config(format!("{ENV_MAX_PAGES}={raw:?}: {e}")))?;
            config = config.with_max_pages(max_pages);
        }
        Ok(config)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"***")
            .field("notion_version", &self.notion_version)
            .field("base_url", &self.base_url)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}
