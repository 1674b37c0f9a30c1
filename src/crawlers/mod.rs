pub mod crawler;
pub mod http;
pub mod web;

pub use crawler::{Fetcher, Page};
pub use http::HttpFetcher;
pub use web::{CrawlState, SiteCrawler, collect_links};
