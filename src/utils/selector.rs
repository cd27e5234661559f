//! CSS selector parsing and snapshot text helpers.

use scraper::{ElementRef, Html, Node, Selector};

use super::text::collapse_whitespace;

/// Parses a CSS selector with a safe fallback.
///
/// If parsing fails, logs an error and returns a selector that matches nothing
/// (`*:not(*)`). Profile selectors are static, so a typo degrades to an empty
/// field instead of aborting the crawl.
///
/// # Arguments
///
/// * `selector_str` - The CSS selector string to parse
/// * `context` - Context description for error logging (e.g., "card field model_name")
pub fn parse_selector_with_fallback(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        log::error!(
            "Failed to parse CSS selector '{}' in {}: {}. Using fallback selector.",
            selector_str,
            context,
            e
        );
        Selector::parse("*:not(*)")
            .unwrap_or_else(|e| panic!("fallback selector must parse: {e}"))
    })
}

/// Elements rendered on their own line.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Elements whose text is never rendered.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

fn render_into(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                // source line breaks render as spaces
                out.extend(text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }));
            }
            Node::Element(e) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = e.name();
                if name == "br" {
                    out.push('\n');
                } else if HIDDEN_ELEMENTS.contains(&name) {
                    continue;
                } else if BLOCK_ELEMENTS.contains(&name) {
                    out.push('\n');
                    render_into(child, out);
                    out.push('\n');
                } else if name == "td" || name == "th" {
                    out.push(' ');
                    render_into(child, out);
                    out.push(' ');
                } else {
                    render_into(child, out);
                }
            }
            _ => {}
        }
    }
}

/// Rendered text of an element, approximating the browser's `innerText`.
///
/// Adjacent text nodes are concatenated as they appear (no separator), source
/// line breaks count as spaces, and `<br>` or a block-element boundary is a
/// `\n`.
pub fn rendered_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    render_into(element, &mut out);
    out
}

/// Visible text of an element on one line, whitespace collapsed.
///
/// `<span>3,150</span><span>만원</span>` reads `3,150만원`.
pub fn node_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&rendered_text(element))
}

/// Non-empty rendered lines of an element. Inline markup stays on its line.
pub fn node_lines(element: ElementRef<'_>) -> Vec<String> {
    rendered_text(element)
        .split('\n')
        .map(collapse_whitespace)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Elements under `root` matching `selector`, in document order.
pub fn select_all<'a>(root: ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    let parsed = parse_selector_with_fallback(selector, "snapshot query");
    root.select(&parsed).collect()
}

/// Text of every element matching `selector` in a page snapshot.
pub fn select_texts(html: &Html, selector: &str) -> Vec<String> {
    select_all(html.root_element(), selector)
        .into_iter()
        .map(node_text)
        .collect()
}
