use regex::Regex;
use url::Url;

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use crate::utils::same_site;

/// Assets that never carry a form
const ASSET_PATTERN: &str =
    r"(?i)\.(jpe?g|png|gif|webp|bmp|css|js|ico|svg|woff2?|ttf|eot|pdf|zip|gz|rar|7z|mp3|mp4|avi|mov|xml|rss)$";

/// Configuration for URL filtering in crawlers
#[derive(Debug, Clone)]
pub struct UrlFilterConfig {
    /// Host of the seed; scope is derived from it
    pub seed_host: String,

    /// Require the exact seed host (modulo `www.`) instead of the registrable domain
    pub same_host_only: bool,

    /// Regex patterns for URLs to include (if empty, all URLs are included unless excluded)
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over include patterns)
    pub exclude_patterns: Vec<String>,
}

impl UrlFilterConfig {
    /// Filter configuration for one seed
    pub fn for_seed(seed: &Url, crawl: &CrawlConfig) -> Self {
        let mut exclude_patterns = vec![ASSET_PATTERN.to_string()];
        exclude_patterns.extend(crawl.exclude_patterns.iter().cloned());

        Self {
            seed_host: seed.host_str().unwrap_or_default().to_ascii_lowercase(),
            same_host_only: crawl.same_host_only,
            include_patterns: crawl.include_patterns.clone(),
            exclude_patterns,
        }
    }
}

/// Decides which discovered URLs belong to the crawl
#[derive(Debug)]
pub struct UrlFilter {
    config: UrlFilterConfig,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Create a new URL filter from configuration
    pub fn new(config: UrlFilterConfig) -> Result<Self> {
        let include_regexes = compile_all(&config.include_patterns)?;
        let exclude_regexes = compile_all(&config.exclude_patterns)?;

        Ok(Self {
            config,
            include_regexes,
            exclude_regexes,
        })
    }

    /// Filter scoped to a seed with the crawl's include/exclude rules
    pub fn for_seed(seed: &Url, crawl: &CrawlConfig) -> Result<Self> {
        Self::new(UrlFilterConfig::for_seed(seed, crawl))
    }

    /// Determine if a URL should be crawled based on all filtering rules
    pub fn should_crawl(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        if !self.is_in_domain_scope(url) {
            return false;
        }

        // Exclusions take precedence
        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|re| re.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|re| re.is_match(url_str))
    }

    /// Check if a URL shares the seed's registrable domain (or host)
    pub fn is_in_domain_scope(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        same_site(&self.config.seed_host, host, self.config.same_host_only)
    }
}

/// Strip the fragment; `url` already lowercases scheme and host
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| Error::pattern(p, e)))
        .collect()
}
