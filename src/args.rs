use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use form_finder::config::{ExportFormat, ScanConfig, WriteMode};

#[derive(Parser, Debug)]
#[command(name = "form-finder")]
#[command(about = "Crawls a site's internal links and lists pages with comment, contact or submission forms")]
#[command(version)]
pub struct Args {
    /// Seed URL, or a file with one URL per line
    pub input: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Append to the output file instead of overwriting it
    #[arg(long)]
    pub append: bool,

    /// Also write the full per-site report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Maximum pages fetched per seed
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Maximum link depth from the seed
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Pause between requests in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// User-Agent header
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Stay on the seed host instead of its whole registrable domain
    #[arg(long)]
    pub same_host_only: bool,

    /// Distinct field kinds a form needs to be reported
    #[arg(long)]
    pub min_kinds: Option<usize>,

    /// Do not report pages carrying a captcha
    #[arg(long)]
    pub skip_captcha: bool,

    /// Extra path probed on every seed (repeatable), e.g. /submit.php
    #[arg(long = "probe")]
    pub probe_paths: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Tsv,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ExportFormat::Text,
            FormatArg::Tsv => ExportFormat::Tsv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

impl Args {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut ScanConfig) {
        if let Some(output) = &self.output {
            config.export.output = output.clone();
        }
        if let Some(format) = self.format {
            config.export.format = format.into();
        }
        if self.append {
            config.export.mode = WriteMode::Append;
        }
        if let Some(report) = &self.report {
            config.export.report = Some(report.clone());
        }
        if let Some(max_pages) = self.max_pages {
            config.crawl.max_pages = max_pages;
        }
        if let Some(max_depth) = self.max_depth {
            config.crawl.max_depth = max_depth;
        }
        if let Some(timeout) = self.timeout {
            config.crawl.timeout_secs = timeout;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.crawl.delay_ms = delay_ms;
        }
        if let Some(user_agent) = &self.user_agent {
            config.crawl.user_agent = user_agent.clone();
        }
        if self.same_host_only {
            config.crawl.same_host_only = true;
        }
        if let Some(min_kinds) = self.min_kinds {
            config.detector.min_matched_kinds = min_kinds;
        }
        if self.skip_captcha {
            config.detector.skip_captcha_pages = true;
        }
        config.crawl.probe_paths.extend(self.probe_paths.iter().cloned());
    }
}
