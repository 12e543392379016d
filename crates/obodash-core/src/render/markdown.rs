use std::collections::BTreeMap;

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use super::html::page;

const TABLE_OPEN: &str = "<table class=\"table table-sm table-striped\">";

/// A rendered Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    pub html: String,
    /// Text of the first level-one heading.
    pub title: Option<String>,
}

#[must_use]
pub fn render_markdown_html(content: &str) -> String {
    render_markdown(content).html
}

/// Standalone page for a Markdown document, titled by its first heading.
#[must_use]
pub fn render_markdown_page(content: &str, fallback_title: &str) -> String {
    let document = render_markdown(content);
    let title = document.title.as_deref().unwrap_or(fallback_title);
    page(title, &document.html)
}

/// Renders dashboard docs: raw HTML shows as text, unsafe link schemes are dropped,
/// links to sibling `.md` files point at their rendered `.html`, and every heading
/// gets an anchor id.
#[must_use]
pub fn render_markdown(content: &str) -> MarkdownDocument {
    let mut events = Parser::new_ext(content, markdown_options())
        .map(rewrite_event)
        .collect::<Vec<_>>();

    let headings = collect_headings(&events);
    let title = headings
        .iter()
        .find(|heading| heading.level == HeadingLevel::H1)
        .map(|heading| heading.text.trim().to_string())
        .filter(|title| !title.is_empty());
    assign_anchors(&mut events, &headings);

    let mut output = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    // Raw HTML was demoted to escaped text above, so every literal tag here is ours.
    let html = output.replace("<table>", TABLE_OPEN);
    MarkdownDocument { html, title }
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_DEFINITION_LIST);
    options
}

fn rewrite_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: link_destination(&dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = if allowed_destination(&dest_url, false) {
                dest_url
            } else {
                CowStr::from("")
            };
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    }
}

fn link_destination(dest_url: &str) -> CowStr<'static> {
    if !allowed_destination(dest_url, true) {
        return CowStr::from("#");
    }
    let value = dest_url.trim();
    if scheme(value).is_some() {
        return CowStr::from(value.to_string());
    }
    CowStr::from(local_document_link(value))
}

/// `docs/scoring.md#formula` -> `docs/scoring.html#formula`.
fn local_document_link(value: &str) -> String {
    let split = value.find(['#', '?']).unwrap_or(value.len());
    let (path, suffix) = value.split_at(split);
    let is_markdown = path.len() > 3
        && path
            .get(path.len() - 3..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".md"));
    if is_markdown {
        format!("{}.html{suffix}", &path[..path.len() - 3])
    } else {
        value.to_string()
    }
}

fn allowed_destination(value: &str, allow_mailto: bool) -> bool {
    let value = value.trim();
    if value.starts_with("//") {
        return false;
    }
    match scheme(value) {
        None => true,
        Some(scheme) => {
            scheme.eq_ignore_ascii_case("http")
                || scheme.eq_ignore_ascii_case("https")
                || (allow_mailto && scheme.eq_ignore_ascii_case("mailto"))
        }
    }
}

/// URI scheme, if the value starts with one.
fn scheme(value: &str) -> Option<&str> {
    let (scheme, _) = value.split_once(':')?;
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid = starts_alpha && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

struct Heading {
    start: usize,
    level: HeadingLevel,
    text: String,
    explicit_id: bool,
}

fn collect_headings(events: &[Event<'_>]) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut open: Option<Heading> = None;
    for (index, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                open = Some(Heading {
                    start: index,
                    level: *level,
                    text: id.as_deref().unwrap_or_default().to_string(),
                    explicit_id: id.is_some(),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = open.as_mut().filter(|heading| !heading.explicit_id) {
                    heading.text.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => headings.extend(open.take()),
            _ => {}
        }
    }
    headings
}

fn assign_anchors(events: &mut [Event<'_>], headings: &[Heading]) {
    let mut seen = BTreeMap::<String, usize>::new();
    for heading in headings {
        if heading.explicit_id {
            seen.insert(heading.text.clone(), 1);
            continue;
        }
        let base = slug(&heading.text);
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;
        let anchor = if *count == 1 {
            base
        } else {
            format!("{base}-{}", *count - 1)
        };
        if let Some(Event::Start(Tag::Heading { id, .. })) = events.get_mut(heading.start) {
            *id = Some(CowStr::from(anchor));
        }
    }
}

fn slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug.to_string()
    }
}
