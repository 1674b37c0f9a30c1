use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Top-level configuration, usually loaded from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Seed URLs to crawl (the CLI input is appended to these)
    #[serde(default)]
    pub seeds: Vec<String>,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Configuration for the site crawler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Maximum number of pages fetched per seed
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum link depth from the seed (0 fetches the seed only)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between two requests, in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Bodies larger than this are truncated before parsing
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Only follow links on the seed host (ignoring `www.`), not the whole registrable domain
    #[serde(default)]
    pub same_host_only: bool,

    /// Regex patterns for URLs to include
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Links whose text or href contain one of these are crawled first
    #[serde(default = "default_priority_keywords")]
    pub priority_keywords: Vec<String>,

    /// Paths probed on every seed in addition to discovered links (e.g. "/submit.php")
    #[serde(default)]
    pub probe_paths: Vec<String>,
}

/// A recognized kind of form field and the regex that identifies it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPattern {
    /// Kind reported in results, e.g. "email"
    pub kind: String,

    /// Case-insensitive regex matched against field name, id, placeholder, label and type
    pub pattern: String,
}

impl FieldPattern {
    pub fn new(kind: &str, pattern: &str) -> Self {
        Self {
            kind: kind.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Configuration for the form detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default = "default_field_patterns")]
    pub field_patterns: Vec<FieldPattern>,

    /// Distinct field kinds a form needs before it counts as a match
    #[serde(default = "default_min_matched_kinds")]
    pub min_matched_kinds: usize,

    /// Count an otherwise unrecognized `<textarea>` as a "message" field
    #[serde(default = "default_true")]
    pub textarea_is_message: bool,

    /// Regex flagging captcha-protected pages
    #[serde(default = "default_captcha_pattern")]
    pub captcha_pattern: String,

    /// Drop records for pages that carry a captcha
    #[serde(default)]
    pub skip_captcha_pages: bool,
}

/// Output format of the exported file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One page URL per line
    #[default]
    Text,
    /// Tab separated values with a header row
    Tsv,
    /// Pretty JSON array (JSON Lines when appending)
    Json,
}

/// Whether an existing output file is replaced or extended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    #[default]
    Overwrite,
    Append,
}

/// Configuration for the result exporter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default)]
    pub format: ExportFormat,

    #[serde(default)]
    pub mode: WriteMode,

    /// Optional path for the full per-site report as JSON
    #[serde(default)]
    pub report: Option<PathBuf>,
}

impl ScanConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }
}

fn default_max_pages() -> usize {
    200
}

fn default_max_depth() -> usize {
    3
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_max_body_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_user_agent() -> String {
    format!("form-finder/{}", env!("CARGO_PKG_VERSION"))
}

fn default_priority_keywords() -> Vec<String> {
    [
        "submit",
        "add site",
        "add url",
        "add-site",
        "suggest",
        "list your site",
        "contact",
        "guest post",
        "guest-post",
        "write for us",
        "write-for-us",
        "signup",
        "register",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// The built-in field kinds
pub fn default_field_patterns() -> Vec<FieldPattern> {
    vec![
        FieldPattern::new("email", r"e-?mail"),
        FieldPattern::new(
            "name",
            r"\bname\b|author|full[-_ ]?name|your[-_ ]?name|first[-_ ]?name|last[-_ ]?name",
        ),
        FieldPattern::new("message", r"message|enquiry|inquiry|\bbody\b|\bcontent\b"),
        FieldPattern::new("comment", r"comment"),
        FieldPattern::new("url", r"url|website|homepage"),
        FieldPattern::new("subject", r"subject|title"),
        FieldPattern::new("phone", r"phone|\btel\b"),
    ]
}

fn default_min_matched_kinds() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_captcha_pattern() -> String {
    r"captcha|recaptcha|g-recaptcha|hcaptcha".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("forms.txt")
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            timeout_secs: default_timeout_secs(),
            delay_ms: 0,
            max_body_bytes: default_max_body_bytes(),
            user_agent: default_user_agent(),
            same_host_only: false,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            priority_keywords: default_priority_keywords(),
            probe_paths: Vec::new(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            field_patterns: default_field_patterns(),
            min_matched_kinds: default_min_matched_kinds(),
            textarea_is_message: true,
            captcha_pattern: default_captcha_pattern(),
            skip_captcha_pages: false,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: ExportFormat::default(),
            mode: WriteMode::default(),
            report: None,
        }
    }
}
