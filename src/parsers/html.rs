use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::parsers::{FormInfo, LinkRef, ParseResult};
use crate::results::{FieldInfo, SelectOption};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href], area[href]"));
static DATA_HREF: LazyLock<Selector> = LazyLock::new(|| selector("[data-href]"));
static BASE: LazyLock<Selector> = LazyLock::new(|| selector("base[href]"));
static FORM: LazyLock<Selector> = LazyLock::new(|| selector("form"));
static CONTROL: LazyLock<Selector> = LazyLock::new(|| selector("input, textarea, select"));
static LABEL_FOR: LazyLock<Selector> = LazyLock::new(|| selector("label[for]"));
static OPTION: LazyLock<Selector> = LazyLock::new(|| selector("option"));

/// Parses HTML content to extract links and forms
pub fn parse(html: &str) -> ParseResult {
    let doc = Html::parse_document(html);

    let links = extract_links(&doc);
    let forms = extract_forms(&doc);
    ::log::debug!(
        "HTML parser found {} links and {} forms",
        links.len(),
        forms.len()
    );

    ParseResult {
        base_href: extract_base_href(&doc),
        links,
        forms,
    }
}

/// Parses HTML content and only extracts links
pub fn parse_links_only(html: &str) -> (Option<String>, Vec<LinkRef>) {
    let doc = Html::parse_document(html);
    (extract_base_href(&doc), extract_links(&doc))
}

fn extract_base_href(doc: &Html) -> Option<String> {
    doc.select(&BASE)
        .filter_map(|e| e.value().attr("href"))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

fn extract_links(doc: &Html) -> Vec<LinkRef> {
    let anchors = doc.select(&LINK).filter_map(|e| {
        e.value().attr("href").map(|href| LinkRef {
            href: href.trim().to_string(),
            text: element_text(&e),
        })
    });

    // Clickable spans/divs carrying their target in data-href
    let data_links = doc.select(&DATA_HREF).filter_map(|e| {
        e.value().attr("data-href").map(|href| LinkRef {
            href: href.trim().to_string(),
            text: element_text(&e),
        })
    });

    anchors
        .chain(data_links)
        .filter(|link| !link.href.is_empty())
        .collect()
}

fn extract_forms(doc: &Html) -> Vec<FormInfo> {
    let labels_by_id: HashMap<String, String> = doc
        .select(&LABEL_FOR)
        .filter_map(|label| {
            let target = label.value().attr("for")?.trim();
            let text = element_text(&label);
            (!target.is_empty() && !text.is_empty()).then(|| (target.to_string(), text))
        })
        .collect();

    doc.select(&FORM)
        .enumerate()
        .map(|(index, form)| FormInfo {
            index,
            action: attr(&form, "action"),
            method: attr(&form, "method")
                .map(|m| m.to_ascii_uppercase())
                .unwrap_or_else(|| "GET".to_string()),
            id: attr(&form, "id"),
            fields: form
                .select(&CONTROL)
                .map(|control| extract_field(&control, &labels_by_id))
                .collect(),
        })
        .collect()
}

fn extract_field(control: &ElementRef, labels_by_id: &HashMap<String, String>) -> FieldInfo {
    let tag = control.value().name().to_ascii_lowercase();
    let field_type = attr(control, "type")
        .map(|t| t.to_ascii_lowercase())
        .unwrap_or_else(|| tag.clone());
    let id = attr(control, "id");

    let label = id
        .as_ref()
        .and_then(|id| labels_by_id.get(id).cloned())
        .or_else(|| ancestor_label(control));

    let options = if tag == "select" {
        control
            .select(&OPTION)
            .map(|o| SelectOption {
                value: o.value().attr("value").map(str::to_string),
                text: element_text(&o),
            })
            .collect()
    } else {
        Vec::new()
    };

    FieldInfo {
        field_type,
        name: attr(control, "name"),
        id,
        placeholder: attr(control, "placeholder"),
        aria_label: attr(control, "aria-label"),
        label,
        required: control.value().attr("required").is_some(),
        options,
        tag,
    }
}

/// Text of the closest enclosing `<label>`
fn ancestor_label(control: &ElementRef) -> Option<String> {
    control
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "label")
        .map(|label| element_text(&label))
        .filter(|text| !text.is_empty())
}

/// Trimmed, non-empty attribute value
fn attr(element: &ElementRef, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
