pub mod config;
pub mod crawlers;
pub mod detector;
pub mod error;
pub mod export;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ScanConfig;
pub use error::{Error, Result};
pub use results::{CrawlReport, FormRecord, SiteReport};

use std::collections::HashSet;
use std::path::Path;

use crawlers::{Fetcher, HttpFetcher, SiteCrawler};
use detector::FormDetector;
use export::Exporter;

/// Lifecycle of a scan; it only ever moves forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CrawlPhase {
    Idle,
    Crawling,
    Exporting,
    Done,
}

impl CrawlPhase {
    fn next(self) -> Option<CrawlPhase> {
        match self {
            CrawlPhase::Idle => Some(CrawlPhase::Crawling),
            CrawlPhase::Crawling => Some(CrawlPhase::Exporting),
            CrawlPhase::Exporting => Some(CrawlPhase::Done),
            CrawlPhase::Done => None,
        }
    }
}

/// Main builder: crawl a list of seeds, then export what was found
pub struct FormScan {
    seeds: Vec<String>,
    config: ScanConfig,
    phase: CrawlPhase,
}

impl FormScan {
    /// Create a new scan for the given seed URLs
    pub fn new<I, S>(seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seeds: seeds.into_iter().map(Into::into).collect(),
            config: ScanConfig::default(),
            phase: CrawlPhase::Idle,
        }
    }

    /// Use a configuration; its seeds are crawled before the builder's own
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        let mut seeds = config.seeds.clone();
        seeds.append(&mut self.seeds);
        self.seeds = seeds;
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let config = ScanConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, json: &str) -> Result<Self> {
        let config = ScanConfig::from_json(json)?;
        Ok(self.with_config(config))
    }

    /// Set the maximum number of pages fetched per seed
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.crawl.max_pages = max_pages;
        self
    }

    /// Set the maximum link depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.crawl.max_depth = max_depth;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn seeds(&self) -> &[String] {
        &self.seeds
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn advance(&mut self, to: CrawlPhase) -> Result<()> {
        if self.phase.next() != Some(to) {
            return Err(Error::InvalidPhase {
                from: self.phase,
                to,
            });
        }
        ::log::debug!("Scan phase {:?} -> {:?}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    /// Crawl every seed over HTTP
    pub async fn crawl(&mut self) -> Result<CrawlReport> {
        let fetcher = HttpFetcher::new(&self.config.crawl)?;
        self.crawl_with(&fetcher).await
    }

    /// Crawl every seed with the given fetcher, one seed after the other
    pub async fn crawl_with<F: Fetcher>(&mut self, fetcher: &F) -> Result<CrawlReport> {
        self.advance(CrawlPhase::Crawling)?;

        let detector = FormDetector::new(&self.config.detector)?;
        let crawler = SiteCrawler::new(fetcher, &detector, &self.config.crawl);

        let mut report = CrawlReport::default();
        let mut seen = HashSet::new();
        let mut first_invalid = None;

        for raw in &self.seeds {
            let seed = match utils::parse_seed(raw) {
                Ok(seed) => seed,
                Err(e) => {
                    ::log::warn!("Skipping seed: {}", e);
                    let mut site = SiteReport::new(raw);
                    site.note("invalid_seed");
                    report.sites.push(site);
                    first_invalid.get_or_insert(e);
                    continue;
                }
            };

            if !seen.insert(seed.to_string()) {
                ::log::debug!("Seed {} listed twice", seed);
                continue;
            }

            report.sites.push(crawler.crawl(&seed).await?);
        }

        if seen.is_empty() {
            return Err(first_invalid.unwrap_or_else(|| Error::InvalidSeed {
                url: String::new(),
                reason: "no seed url given".to_string(),
            }));
        }

        ::log::info!(
            "Crawled {} sites: {} pages fetched, {} failed, {} forms",
            seen.len(),
            report.pages_fetched(),
            report.pages_failed(),
            report.records().len()
        );

        Ok(report)
    }

    /// Write the report's records (and the optional full report); returns the record count
    pub fn export(&mut self, report: &CrawlReport) -> Result<usize> {
        self.advance(CrawlPhase::Exporting)?;

        let exporter = Exporter::new(self.config.export.clone());
        let written = exporter.export(&report.records())?;
        exporter.export_report(report)?;

        self.advance(CrawlPhase::Done)?;
        Ok(written)
    }

    /// Crawl then export
    pub async fn run(mut self) -> Result<(CrawlReport, usize)> {
        let report = self.crawl().await?;
        let written = self.export(&report)?;
        Ok((report, written))
    }
}
