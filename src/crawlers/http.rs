use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::redirect::{Attempt, Policy};
use url::Url;

use crate::config::CrawlConfig;
use crate::crawlers::crawler::{Fetcher, Page};
use crate::error::{Error, Result};
use crate::parsers::ParserType;
use crate::utils::same_site;

const MAX_REDIRECTS: usize = 10;

/// Fetches pages with a plain HTTP GET
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .redirect(scoped_redirects(config.same_host_only))
            .build()
            .map_err(|e| Error::Config(format!("build http client: {}", e)))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

/// Follow redirects only while they stay in the scope of the first URL of the chain
fn scoped_redirects(same_host_only: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        if redirect_in_scope(&attempt, same_host_only) {
            attempt.follow()
        } else {
            ::log::debug!("Not following redirect out of scope to {}", attempt.url());
            attempt.stop()
        }
    })
}

fn redirect_in_scope(attempt: &Attempt<'_>, same_host_only: bool) -> bool {
    let Some(origin) = attempt.previous().first() else {
        return true;
    };
    match (origin.host_str(), attempt.url().host_str()) {
        (Some(from), Some(to)) => same_site(from, to, same_host_only),
        _ => false,
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Page> {
        ::log::debug!("GET {}", url);

        let mut response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5")
            .send()
            .await
            .map_err(|e| Error::fetch(url, e))?;

        let status = response.status();
        if status.is_redirection() {
            return Err(Error::fetch(url, format!("redirect not followed ({})", status)));
        }
        if !status.is_success() {
            return Err(Error::fetch(url, format!("http status {}", status)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let parser_type = ParserType::from_content_type(content_type.as_deref());
        if parser_type != ParserType::Html {
            return Err(Error::fetch(
                url,
                format!(
                    "not an html document ({})",
                    content_type.unwrap_or_default()
                ),
            ));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| Error::fetch(url, e))? {
            let room = self.max_body_bytes - body.len();
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if body.len() >= self.max_body_bytes {
                ::log::debug!("Body of {} cut at {} bytes", url, self.max_body_bytes);
                break;
            }
        }

        Ok(Page {
            url: final_url,
            parser_type,
            html: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
