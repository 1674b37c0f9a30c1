//! Heuristic classification of submission forms.
//!
//! Every control of a form is matched against an ordered list of field
//! patterns; the first pattern that matches gives the control its kind. A form
//! is reported when it carries enough distinct kinds (an email plus a message,
//! a name plus a comment, ...). Search boxes, login forms and newsletter
//! sign-ups normally carry at most one recognized kind and are ignored.

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};
use url::Url;

use crate::config::DetectorConfig;
use crate::error::{Error, Result};
use crate::parsers::{FormInfo, ParseResult, html};
use crate::results::{FieldInfo, FormRecord};

/// Input types that never identify a form's purpose
const UNCLASSIFIED_TYPES: &[&str] = &["hidden", "submit", "button", "reset", "image", "password"];

const MESSAGE_KIND: &str = "message";

#[derive(Debug)]
struct CompiledPattern {
    kind: String,
    regex: Regex,
}

/// Classifies forms found in page markup
#[derive(Debug)]
pub struct FormDetector {
    patterns: Vec<CompiledPattern>,
    captcha: Regex,
    min_matched_kinds: usize,
    textarea_is_message: bool,
    skip_captcha_pages: bool,
}

impl FormDetector {
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        let patterns = config
            .field_patterns
            .iter()
            .map(|p| {
                Ok(CompiledPattern {
                    kind: p.kind.clone(),
                    regex: case_insensitive(&p.pattern)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            captcha: case_insensitive(&config.captcha_pattern)?,
            min_matched_kinds: config.min_matched_kinds.max(1),
            textarea_is_message: config.textarea_is_message,
            skip_captcha_pages: config.skip_captcha_pages,
        })
    }

    /// Best matching form of the page, if any
    pub fn detect(&self, page_url: &Url, html: &str) -> Option<FormRecord> {
        best_record(self.detect_all(page_url, html))
    }

    /// Every matching form of the page, in document order
    pub fn detect_all(&self, page_url: &Url, html: &str) -> Vec<FormRecord> {
        let parsed = html::parse(html);
        self.detect_forms(page_url, parsed.base_href.as_deref(), &parsed.forms, html)
    }

    /// Best matching form from an already parsed page
    pub fn detect_parsed(&self, page_url: &Url, parsed: &ParseResult, html: &str) -> Option<FormRecord> {
        best_record(self.detect_forms(page_url, parsed.base_href.as_deref(), &parsed.forms, html))
    }

    /// Matching forms among `forms`; `html` is only scanned for captcha markers
    pub fn detect_forms(
        &self,
        page_url: &Url,
        base_href: Option<&str>,
        forms: &[FormInfo],
        html: &str,
    ) -> Vec<FormRecord> {
        if forms.is_empty() {
            return Vec::new();
        }

        let captcha = self.has_captcha(html);
        if captcha && self.skip_captcha_pages {
            ::log::debug!("Skipping captcha protected page: {}", page_url);
            return Vec::new();
        }

        let base = base_href
            .and_then(|href| page_url.join(href).ok())
            .unwrap_or_else(|| page_url.clone());

        forms
            .iter()
            .filter_map(|form| self.match_form(page_url, &base, form, captcha))
            .collect()
    }

    /// Whether the markup mentions a captcha widget
    pub fn has_captcha(&self, html: &str) -> bool {
        self.captcha.is_match(html)
    }

    /// Kind of a single control, if it is recognized
    pub fn classify(&self, field: &FieldInfo) -> Option<&str> {
        if UNCLASSIFIED_TYPES.contains(&field.field_type.as_str()) {
            return None;
        }

        let type_hint = (field.tag == "input").then_some(field.field_type.as_str());
        let haystacks = [
            field.name.as_deref(),
            field.id.as_deref(),
            type_hint,
            field.aria_label.as_deref(),
            field.label.as_deref(),
            field.placeholder.as_deref(),
        ];

        let matched = haystacks.iter().flatten().find_map(|text| {
            self.patterns
                .iter()
                .find(|p| p.regex.is_match(text))
                .map(|p| p.kind.as_str())
        });

        match matched {
            Some(kind) => Some(kind),
            None if self.textarea_is_message && field.tag == "textarea" => Some(MESSAGE_KIND),
            None => None,
        }
    }

    fn match_form(&self, page_url: &Url, base: &Url, form: &FormInfo, captcha: bool) -> Option<FormRecord> {
        let mut kinds = BTreeSet::new();
        let mut recognized_fields = BTreeSet::new();

        for field in &form.fields {
            if let Some(kind) = self.classify(field) {
                kinds.insert(kind.to_string());
                recognized_fields.insert(field.display_name().unwrap_or(kind).to_string());
            }
        }

        if kinds.len() < self.min_matched_kinds {
            ::log::trace!(
                "Form {} on {} has kinds {:?}, not a match",
                form.index,
                page_url,
                kinds
            );
            return None;
        }

        Some(FormRecord {
            page_url: page_url.to_string(),
            action: resolve_action(base, form.action.as_deref()),
            method: form.method.clone(),
            form_index: form.index,
            recognized_fields,
            kinds,
            captcha,
            fields: form.fields.clone(),
        })
    }
}

/// Form with the most matched kinds, the earliest one on ties
pub fn best_record(records: Vec<FormRecord>) -> Option<FormRecord> {
    records.into_iter().fold(None, |best, record| match best {
        Some(b) if b.kinds.len() >= record.kinds.len() => Some(b),
        _ => Some(record),
    })
}

fn resolve_action(base: &Url, action: Option<&str>) -> String {
    match action {
        None => base.to_string(),
        Some(raw) => match base.join(raw) {
            Ok(mut url) => {
                url.set_fragment(None);
                url.to_string()
            }
            Err(_) => raw.to_string(),
        },
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::pattern(pattern, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldPattern;

    fn detector() -> FormDetector {
        FormDetector::new(&DetectorConfig::default()).unwrap()
    }

    fn page() -> Url {
        Url::parse("https://example.com/blog/post").unwrap()
    }

    #[test]
    fn test_email_message_form_matches() {
        let html = r#"<form action="/send" method="post">
            <input type="text" name="email">
            <textarea name="message"></textarea>
            <button type="submit">Send</button>
        </form>"#;

        let record = detector().detect(&page(), html).expect("form should match");
        assert_eq!(record.page_url, "https://example.com/blog/post");
        assert_eq!(record.action, "https://example.com/send");
        assert_eq!(record.method, "POST");
        assert_eq!(
            record.kinds.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["email", "message"]
        );
        assert_eq!(
            record.recognized_fields.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["email", "message"]
        );
        assert!(!record.captcha);
    }

    #[test]
    fn test_page_without_form_does_not_match() {
        let html = "<html><body><p>email us at hi@example.com, leave a message</p></body></html>";
        assert!(detector().detect(&page(), html).is_none());
        assert!(detector().detect(&page(), "").is_none());
    }

    #[test]
    fn test_single_kind_forms_are_ignored() {
        let newsletter = r#"<form><input type="email" name="subscribe"><input type="submit"></form>"#;
        assert!(detector().detect(&page(), newsletter).is_none());

        let search = r#"<form role="search"><input name="s"></form>"#;
        assert!(detector().detect(&page(), search).is_none());

        let login = r#"<form><input name="username"><input type="password" name="password"></form>"#;
        assert!(detector().detect(&page(), login).is_none());
    }

    #[test]
    fn test_wordpress_comment_form() {
        let html = r#"<form action="https://example.com/wp-comments-post.php" method="post" id="commentform">
            <p><label for="comment">Comment</label><textarea id="comment" name="comment"></textarea></p>
            <p><label for="author">Name</label><input id="author" name="author" type="text"></p>
            <p><label for="email">Email</label><input id="email" name="email" type="email"></p>
            <p><label for="url">Website</label><input id="url" name="url" type="url"></p>
            <input type="hidden" name="comment_post_ID" value="42">
        </form>"#;

        let record = detector().detect(&page(), html).unwrap();
        assert_eq!(record.action, "https://example.com/wp-comments-post.php");
        assert_eq!(
            record.kinds.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["comment", "email", "name", "url"]
        );
        assert!(!record.recognized_fields.contains("comment_post_ID"));
        assert_eq!(record.fields.len(), 5);
    }

    #[test]
    fn test_labels_and_placeholders_classify_fields() {
        let html = r#"<form>
            <input name="f1" placeholder="Your E-mail">
            <label>Tell us about your guest post <textarea name="f2"></textarea></label>
        </form>"#;

        let record = detector().detect(&page(), html).unwrap();
        assert!(record.kinds.contains("email"));
        assert!(record.recognized_fields.contains("f1"));
        assert!(record.recognized_fields.contains("f2"));
    }

    #[test]
    fn test_unlabelled_textarea_counts_as_message() {
        let html = r#"<form><input name="email"><textarea name="x1"></textarea></form>"#;
        assert!(detector().detect(&page(), html).is_some());

        let config = DetectorConfig {
            textarea_is_message: false,
            ..DetectorConfig::default()
        };
        let strict = FormDetector::new(&config).unwrap();
        assert!(strict.detect(&page(), html).is_none());
    }

    #[test]
    fn test_custom_patterns() {
        let config = DetectorConfig {
            field_patterns: vec![
                FieldPattern::new("email", "correo"),
                FieldPattern::new("message", "mensaje"),
            ],
            ..DetectorConfig::default()
        };
        let detector = FormDetector::new(&config).unwrap();

        let html = r#"<form><input name="correo"><input name="mensaje"></form>"#;
        assert!(detector.detect(&page(), html).is_some());

        let html = r#"<form><input name="email"><input name="phone"></form>"#;
        assert!(detector.detect(&page(), html).is_none());
    }

    #[test]
    fn test_best_form_is_reported() {
        let html = r#"
            <form action="/a"><input name="email"><input name="name"></form>
            <form action="/b"><input name="email"><input name="name"><textarea name="message"></textarea></form>
            <form action="/c"><input name="email"><input name="website"><textarea name="comment"></textarea></form>"#;

        let all = detector().detect_all(&page(), html);
        assert_eq!(all.len(), 3);

        let best = detector().detect(&page(), html).unwrap();
        assert_eq!(best.form_index, 1);
        assert_eq!(best.action, "https://example.com/b");
    }

    #[test]
    fn test_action_defaults_and_base_href() {
        let html = r#"<html><head><base href="https://example.com/sub/"></head><body>
            <form><input name="email"><textarea name="message"></textarea></form>
            <form action="submit.php#f"><input name="email"><textarea name="message"></textarea></form>
        </body></html>"#;

        let all = detector().detect_all(&page(), html);
        assert_eq!(all[0].action, "https://example.com/sub/");
        assert_eq!(all[1].action, "https://example.com/sub/submit.php");
    }

    #[test]
    fn test_captcha_flag_and_skip() {
        let html = r#"<form><input name="email"><textarea name="message"></textarea>
            <div class="g-recaptcha" data-sitekey="x"></div></form>"#;

        let record = detector().detect(&page(), html).unwrap();
        assert!(record.captcha);

        let config = DetectorConfig {
            skip_captcha_pages: true,
            ..DetectorConfig::default()
        };
        assert!(FormDetector::new(&config).unwrap().detect(&page(), html).is_none());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = DetectorConfig {
            field_patterns: vec![FieldPattern::new("email", "[")],
            ..DetectorConfig::default()
        };
        assert!(matches!(
            FormDetector::new(&config),
            Err(Error::Pattern { .. })
        ));
    }
}
