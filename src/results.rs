use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One `<option>` of a `<select>` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: Option<String>,
    pub text: String,
}

/// Metadata of a single form control
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// `input`, `textarea` or `select`
    pub tag: String,

    /// `type` attribute, or the tag name when absent
    #[serde(rename = "type")]
    pub field_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,

    /// Text of the associated `<label>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub required: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl FieldInfo {
    /// The name used when reporting this field (name, then id)
    pub fn display_name(&self) -> Option<&str> {
        let non_empty = |s: &&str| !s.is_empty();
        self.name
            .as_deref()
            .filter(non_empty)
            .or_else(|| self.id.as_deref().filter(non_empty))
    }
}

/// A detected submission form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    /// URL of the page containing the form
    pub page_url: String,

    /// Absolute form target (the page itself when `action` is missing)
    pub action: String,

    /// Upper-cased HTTP method
    pub method: String,

    /// Position of the form within the page
    pub form_index: usize,

    /// Names of the fields that matched a field pattern
    pub recognized_fields: BTreeSet<String>,

    /// Field kinds that matched, e.g. "email", "message"
    pub kinds: BTreeSet<String>,

    /// The page looks captcha protected
    pub captcha: bool,

    /// Every control of the form
    pub fields: Vec<FieldInfo>,
}

/// Outcome of crawling one seed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteReport {
    pub seed: String,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub records: Vec<FormRecord>,
    pub notes: Vec<String>,
}

impl SiteReport {
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            ..Self::default()
        }
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

/// Outcome of a whole scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlReport {
    pub sites: Vec<SiteReport>,
}

impl CrawlReport {
    /// All records, one per page URL, ordered by page URL
    pub fn records(&self) -> Vec<FormRecord> {
        dedup_records(self.sites.iter().flat_map(|s| s.records.iter()))
    }

    pub fn pages_fetched(&self) -> usize {
        self.sites.iter().map(|s| s.pages_fetched).sum()
    }

    pub fn pages_failed(&self) -> usize {
        self.sites.iter().map(|s| s.pages_failed).sum()
    }
}

/// Keep the first record per page URL and order by page URL
pub fn dedup_records<'a>(records: impl IntoIterator<Item = &'a FormRecord>) -> Vec<FormRecord> {
    let mut by_page: BTreeMap<&str, &FormRecord> = BTreeMap::new();
    for record in records {
        by_page.entry(record.page_url.as_str()).or_insert(record);
    }
    by_page.into_values().cloned().collect()
}
