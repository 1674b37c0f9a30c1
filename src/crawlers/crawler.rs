use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::parsers::ParserType;

/// A fetched document
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects
    pub url: Url,

    /// How the body should be parsed
    pub parser_type: ParserType,

    /// Response body
    pub html: String,
}

impl Page {
    pub fn html(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            parser_type: ParserType::Html,
            html: html.into(),
        }
    }
}

/// Source of pages for the crawler
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a single URL once; failures are reported as `Error::Fetch`
    async fn fetch(&self, url: &Url) -> Result<Page>;
}
