use crate::parsers::html;

#[cfg(test)]
mod link_tests {
    use super::*;

    #[test]
    fn test_anchor_links_and_text() {
        let (base, links) = html::parse_links_only(
            r#"<html><body>
                <a href="/contact">  Contact
                    us </a>
                <a href="">empty</a>
                <a>no href</a>
                <map><area href="/submit.php"></map>
            </body></html>"#,
        );

        assert_eq!(base, None);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href, "/contact");
        assert_eq!(links[0].text, "Contact us");
        assert_eq!(links[1].href, "/submit.php");
        assert_eq!(links[1].text, "");
    }

    #[test]
    fn test_data_href_and_base() {
        let (base, links) = html::parse_links_only(
            r#"<html><head><base href="https://example.com/blog/"></head><body>
                <div role="button" data-href="suggest-site">Suggest a site</div>
            </body></html>"#,
        );

        assert_eq!(base.as_deref(), Some("https://example.com/blog/"));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "suggest-site");
        assert_eq!(links[0].text, "Suggest a site");
    }
}

#[cfg(test)]
mod form_tests {
    use super::*;

    #[test]
    fn test_form_attributes() {
        let forms = html::parse(
            r#"<form id="contact" action="/send" method="post">
                <input type="email" name="email" required>
            </form>
            <form><input name="q"></form>"#,
        )
        .forms;

        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].index, 0);
        assert_eq!(forms[0].action.as_deref(), Some("/send"));
        assert_eq!(forms[0].method, "POST");
        assert_eq!(forms[0].id.as_deref(), Some("contact"));

        assert_eq!(forms[1].index, 1);
        assert_eq!(forms[1].action, None);
        assert_eq!(forms[1].method, "GET");
    }

    #[test]
    fn test_field_metadata() {
        let forms = html::parse(
            r#"<form>
                <label for="f-name">Your  Name</label>
                <input id="f-name" name="your-name" placeholder="Jane">
                <label>Message <textarea name="msg"></textarea></label>
                <select name="topic">
                    <option value="ads">Advertising</option>
                    <option>Other</option>
                </select>
                <input type="hidden" name="token" value="x">
            </form>"#,
        )
        .forms;

        let fields = &forms[0].fields;
        assert_eq!(fields.len(), 4);

        assert_eq!(fields[0].tag, "input");
        assert_eq!(fields[0].field_type, "input");
        assert_eq!(fields[0].name.as_deref(), Some("your-name"));
        assert_eq!(fields[0].label.as_deref(), Some("Your Name"));
        assert_eq!(fields[0].placeholder.as_deref(), Some("Jane"));
        assert!(!fields[0].required);

        assert_eq!(fields[1].tag, "textarea");
        assert_eq!(fields[1].field_type, "textarea");
        assert_eq!(fields[1].label.as_deref(), Some("Message"));

        assert_eq!(fields[2].tag, "select");
        assert_eq!(fields[2].options.len(), 2);
        assert_eq!(fields[2].options[0].value.as_deref(), Some("ads"));
        assert_eq!(fields[2].options[0].text, "Advertising");
        assert_eq!(fields[2].options[1].value, None);

        assert_eq!(fields[3].field_type, "hidden");
    }

    #[test]
    fn test_garbage_yields_nothing() {
        assert!(html::parse("").forms.is_empty());
        assert!(html::parse("<<<not really html>>>").forms.is_empty());
    }
}
