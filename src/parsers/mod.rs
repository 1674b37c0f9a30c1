pub mod html;

#[cfg(test)]
mod tests;

use crate::results::FieldInfo;

/// Enum to represent different types of content parsers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserType {
    /// HTML parser
    Html,
    /// Anything else; yields neither links nor forms
    Other,
}

impl ParserType {
    /// Determines the parser type from a `Content-Type` header; a missing header is assumed HTML
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            None => ParserType::Html,
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                if ct.contains("text/html") || ct.contains("application/xhtml") {
                    ParserType::Html
                } else {
                    ParserType::Other
                }
            }
        }
    }
}

/// A hyperlink as written in the markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    /// Raw `href` (or `data-href`) value
    pub href: String,
    /// Whitespace-normalized anchor text
    pub text: String,
}

/// A `<form>` element and its controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInfo {
    /// Position among the page's forms
    pub index: usize,
    /// Raw `action` attribute
    pub action: Option<String>,
    /// Upper-cased method, GET when absent
    pub method: String,
    pub id: Option<String>,
    pub fields: Vec<FieldInfo>,
}

/// Result of parsing content
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Value of `<base href>`, if any
    pub base_href: Option<String>,
    /// Extracted links
    pub links: Vec<LinkRef>,
    /// Extracted forms
    pub forms: Vec<FormInfo>,
}

impl ParseResult {
    /// A result with nothing in it
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Entry point that picks the parser for a content type
pub struct Parser;

impl Parser {
    /// Parse content based on the parser type
    pub fn parse(content: &str, parser_type: ParserType) -> ParseResult {
        match parser_type {
            ParserType::Html => html::parse(content),
            ParserType::Other => ParseResult::empty(),
        }
    }
}
