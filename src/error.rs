use std::path::PathBuf;

use crate::CrawlPhase;

/// Errors produced by the scanner library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file could not be read or decoded
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A seed URL could not be parsed or is not http(s)
    #[error("invalid seed url {url:?}: {reason}")]
    InvalidSeed { url: String, reason: String },

    /// A user supplied regex did not compile
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A single page could not be fetched
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Results could not be written
    #[error("failed to export results to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scan was driven out of order
    #[error("cannot move from {from:?} to {to:?}")]
    InvalidPhase { from: CrawlPhase, to: CrawlPhase },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn pattern(pattern: &str, source: regex::Error) -> Self {
        Error::Pattern {
            pattern: pattern.to_string(),
            source,
        }
    }

    pub(crate) fn fetch(url: impl ToString, reason: impl ToString) -> Self {
        Error::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
