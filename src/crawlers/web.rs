use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use url::Url;

use crate::config::CrawlConfig;
use crate::crawlers::crawler::Fetcher;
use crate::detector::FormDetector;
use crate::error::Result;
use crate::filter::{UrlFilter, normalize_url};
use crate::parsers::{LinkRef, Parser, html};
use crate::results::SiteReport;
use crate::utils::visit_key;

/// Schemes that never lead to a page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    pub url: Url,
    /// Number of links followed from the seed
    pub depth: usize,
}

/// Visited set and pending queue of a single seed crawl.
///
/// A URL is recorded as visited when it is enqueued, so it can never be queued
/// (or fetched) twice. `www.host` and `host` share one entry.
#[derive(Debug, Default)]
pub struct CrawlState {
    visited: HashSet<String>,
    queue: VecDeque<QueuedUrl>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a normalized URL unless it was seen before; priority URLs go to the front
    pub fn enqueue(&mut self, url: Url, depth: usize, priority: bool) -> bool {
        if !self.mark_visited(&url) {
            ::log::trace!("Skipping already visited or queued link: {}", url);
            return false;
        }

        let queued = QueuedUrl { url, depth };
        if priority {
            self.queue.push_front(queued);
        } else {
            self.queue.push_back(queued);
        }
        true
    }

    /// Record a URL as visited; false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(visit_key(url))
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(&visit_key(url))
    }

    /// Next URL to fetch
    pub fn next(&mut self) -> Option<QueuedUrl> {
        self.queue.pop_front()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Absolute, normalized, in-scope links of a page, resolved against `source`
pub fn collect_links<'a>(
    html: &str,
    source: &Url,
    filter: &'a UrlFilter,
) -> impl Iterator<Item = Url> + use<'a> {
    let (base_href, links) = html::parse_links_only(html);
    resolve_links(source, base_href.as_deref(), links, filter).map(|(url, _)| url)
}

/// Resolve raw links lazily, dropping malformed, non-http and out-of-scope ones
fn resolve_links<'a>(
    source: &Url,
    base_href: Option<&str>,
    links: Vec<LinkRef>,
    filter: &'a UrlFilter,
) -> impl Iterator<Item = (Url, LinkRef)> + use<'a> {
    let base = base_href
        .and_then(|href| source.join(href).ok())
        .unwrap_or_else(|| source.clone());

    links.into_iter().filter_map(move |link| {
        let lowered = link.href.to_ascii_lowercase();
        if SKIPPED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
            return None;
        }

        let resolved = base.join(&link.href).ok()?;
        let normalized = normalize_url(&resolved);
        if !filter.should_crawl(&normalized) {
            ::log::debug!("URL filter rejected: {}", normalized);
            return None;
        }

        Some((normalized, link))
    })
}

/// Crawls one seed at a time, sequentially
pub struct SiteCrawler<'a, F: Fetcher> {
    fetcher: &'a F,
    detector: &'a FormDetector,
    config: &'a CrawlConfig,
}

impl<'a, F: Fetcher> SiteCrawler<'a, F> {
    pub fn new(fetcher: &'a F, detector: &'a FormDetector, config: &'a CrawlConfig) -> Self {
        Self {
            fetcher,
            detector,
            config,
        }
    }

    /// Crawl the seed's site and report every page with a matching form
    pub async fn crawl(&self, seed: &Url) -> Result<SiteReport> {
        let filter = UrlFilter::for_seed(seed, self.config)?;
        let mut state = CrawlState::new();
        let mut report = SiteReport::new(seed.as_str());

        let seed = normalize_url(seed);
        state.enqueue(seed.clone(), 0, false);
        if self.config.max_depth > 0 {
            self.enqueue_probes(&seed, &filter, &mut state);
        }

        ::log::info!("Starting crawl of {}", seed);

        while let Some(next) = state.next() {
            let attempts = report.pages_fetched + report.pages_failed;
            if attempts >= self.config.max_pages {
                ::log::info!(
                    "Page limit of {} reached for {} ({} pending)",
                    self.config.max_pages,
                    seed,
                    state.pending() + 1
                );
                report.note("page_limit_reached");
                break;
            }

            if attempts > 0 && self.config.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
            }

            let page = match self.fetcher.fetch(&next.url).await {
                Ok(page) => page,
                Err(e) => {
                    ::log::warn!("Skipping page: {}", e);
                    report.pages_failed += 1;
                    if next.url == seed {
                        report.note("cannot_open_seed");
                    }
                    continue;
                }
            };
            report.pages_fetched += 1;

            let page_url = normalize_url(&page.url);
            if page_url != next.url {
                if !filter.should_crawl(&page_url) {
                    ::log::debug!("{} redirected out of scope to {}", next.url, page_url);
                    continue;
                }
                if !state.mark_visited(&page_url) {
                    ::log::debug!("{} redirected to already visited {}", next.url, page_url);
                    continue;
                }
            }

            let parsed = Parser::parse(&page.html, page.parser_type);

            if let Some(record) = self.detector.detect_parsed(&page_url, &parsed, &page.html) {
                ::log::info!(
                    "Found form on {} (kinds: {:?})",
                    page_url,
                    record.kinds
                );
                if record.captcha {
                    report.note(format!("captcha_on:{}", page_url));
                }
                report.records.push(record);
            }

            if next.depth >= self.config.max_depth {
                continue;
            }

            let mut queued = 0;
            for (url, link) in resolve_links(&page_url, parsed.base_href.as_deref(), parsed.links, &filter) {
                let priority = self.is_priority(&url, &link);
                if state.enqueue(url, next.depth + 1, priority) {
                    queued += 1;
                }
            }
            ::log::debug!("Queued {} new links from {}", queued, page_url);
        }

        if report.records.is_empty() {
            report.note("no_form_found");
        }

        ::log::info!(
            "Finished {}: {} pages fetched, {} failed, {} forms",
            seed,
            report.pages_fetched,
            report.pages_failed,
            report.records.len()
        );

        Ok(report)
    }

    fn enqueue_probes(&self, seed: &Url, filter: &UrlFilter, state: &mut CrawlState) {
        for path in &self.config.probe_paths {
            match seed.join(path) {
                Ok(url) => {
                    let url = normalize_url(&url);
                    if filter.should_crawl(&url) {
                        state.enqueue(url, 1, false);
                    }
                }
                Err(e) => ::log::warn!("Ignoring probe path {:?}: {}", path, e),
            }
        }
    }

    /// Links that look like they lead to a submission page
    fn is_priority(&self, url: &Url, link: &LinkRef) -> bool {
        let text = link.text.to_lowercase();
        let href = url.as_str().to_lowercase();
        self.config
            .priority_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .any(|k| text.contains(&k) || href.contains(&k))
    }
}
