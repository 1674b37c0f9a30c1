use std::net::IpAddr;
use std::path::Path;

use url::Url;

use crate::error::{Error, Result};

/// Second-level labels that act as a suffix under two-letter country TLDs (`example.co.uk`)
const GENERIC_SECOND_LEVEL: &[&str] = &["ac", "co", "com", "edu", "gov", "net", "org", "ne", "or"];

/// Host without a leading `www.`
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Approximate registrable domain of a host.
///
/// Keeps the last two labels, or the last three when the host ends in a generic
/// second-level label under a two-letter country code. IP addresses and single
/// label hosts such as `localhost` are returned unchanged.
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_ok() {
        return host;
    }

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() <= 2 {
        return labels.join(".");
    }

    let tld = labels[labels.len() - 1];
    let sld = labels[labels.len() - 2];
    let keep = if tld.len() == 2 && GENERIC_SECOND_LEVEL.contains(&sld) {
        3
    } else {
        2
    };

    labels[labels.len().saturating_sub(keep)..].join(".")
}

/// Whether two hosts belong to the same crawl scope
pub fn same_site(seed_host: &str, host: &str, same_host_only: bool) -> bool {
    let seed_host = seed_host.to_ascii_lowercase();
    let host = host.to_ascii_lowercase();
    if same_host_only {
        strip_www(&host) == strip_www(&seed_host)
    } else {
        registrable_domain(&host) == registrable_domain(&seed_host)
    }
}

/// Visited-set key of a URL: `www.` is dropped so both spellings of a page count once
pub fn visit_key(url: &Url) -> String {
    let Some(bare) = url.host_str().and_then(|h| h.strip_prefix("www.")) else {
        return url.to_string();
    };

    let mut key = url.clone();
    match key.set_host(Some(bare)) {
        Ok(()) => key.to_string(),
        Err(_) => url.to_string(),
    }
}

/// Parse a seed, adding `https://` when the scheme is missing
pub fn parse_seed(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let mut url = Url::parse(&candidate).map_err(|e| Error::InvalidSeed {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::InvalidSeed {
            url: raw.to_string(),
            reason: "only http and https are supported".to_string(),
        });
    }
    if url.host_str().is_none() {
        return Err(Error::InvalidSeed {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    url.set_fragment(None);
    Ok(url)
}

/// Read seeds from a file with one URL per line; blank lines and `#` comments are skipped
pub fn read_seed_list(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_seed_lines(&contents))
}

fn parse_seed_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_string())
        .collect()
}
