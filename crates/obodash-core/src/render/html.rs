const BOOTSTRAP_CSS: &str =
    "https://stackpath.bootstrapcdn.com/bootstrap/4.3.1/css/bootstrap.min.css";

fn escape(text: &str, attribute: bool) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\'' if attribute => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_text(text: &str) -> String {
    escape(text, false)
}

pub fn escape_attribute(text: &str) -> String {
    escape(text, true)
}

/// `<a href=...>` opening in a new tab.
pub fn external_link(href: &str, label: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
        escape_attribute(href),
        escape_text(label)
    )
}

/// Wraps `body` in the shared Bootstrap page shell.
pub fn page(title: &str, body: &str) -> String {
    let mut html = String::with_capacity(body.len() + 512);
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("  <meta charset=\"utf-8\" />\n");
    html.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n",
    );
    html.push_str("  <link rel=\"stylesheet\" href=\"");
    html.push_str(BOOTSTRAP_CSS);
    html.push_str("\">\n  <title>");
    html.push_str(&escape_text(title));
    html.push_str("</title>\n</head>\n<body>\n<div class=\"container\">\n");
    html.push_str(body);
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_text_replaces_core_entities() {
        assert_eq!(escape_text("a&b<c>d\"'x"), "a&amp;b&lt;c&gt;d\"'x");
    }

    #[test]
    fn escape_attribute_replaces_quotes() {
        assert_eq!(escape_attribute("a&b<c>d\"'x"), "a&amp;b&lt;c&gt;d&quot;&#39;x");
    }

    #[test]
    fn page_escapes_title_and_keeps_body() {
        let html = page("<FOO>", "<p>body</p>");
        assert!(html.contains("<title>&lt;FOO&gt;</title>"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.starts_with("<!doctype html>"));
    }
}
