//! Reduce an HTML document to its readable article text.
//!
//! Picks the main content container, drops boilerplate subtrees and emits
//! the remaining text nodes one per line.

use indexmap::IndexMap;
use scraper::{ElementRef, Html, Node, Selector};

/// Containers tried in order before falling back to paragraph density.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    "#content",
    "#main",
    ".post-content",
    ".entry-content",
    ".article-body",
    ".content",
    ".main",
];

/// Elements never part of the readable text.
const SKIP_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript", "iframe", "form", "svg",
    "button", "template",
];

/// Class or id words marking navigation, ads and similar chrome.
const SKIP_MARKERS: &[&str] = &[
    "nav",
    "navbar",
    "menu",
    "sidebar",
    "footer",
    "header",
    "ad",
    "ads",
    "advert",
    "advertisement",
    "banner",
    "cookie",
    "share",
    "social",
];

/// Title and readable text of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readable {
    pub title: Option<String>,
    pub text: String,
}

/// Extract the readable subset of an HTML document.
pub fn extract_readable(html: &str) -> Readable {
    let document = Html::parse_document(html);
    Readable {
        title: extract_title(&document),
        text: extract_text(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

fn extract_text(document: &Html) -> String {
    let candidates = CONTENT_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .filter_map(|selector| document.select(&selector).next())
        .chain(densest_paragraph_container(document))
        .chain(body(document));

    for container in candidates {
        let mut lines = Vec::new();
        collect_lines(container, &mut lines);
        if !lines.is_empty() {
            return lines.join("\n");
        }
    }

    String::new()
}

fn body(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("body").ok()?;
    document.select(&selector).next()
}

/// Element whose direct `<p>` children hold the most text.
fn densest_paragraph_container(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("p").ok()?;
    let mut scores = IndexMap::new();

    for paragraph in document.select(&selector) {
        if let Some(parent) = paragraph.parent().and_then(ElementRef::wrap) {
            let len: usize = paragraph.text().map(|t| t.trim().len()).sum();
            *scores.entry(parent.id()).or_insert(0usize) += len;
        }
    }

    // First container in document order wins ties.
    let top = scores.values().copied().max().filter(|&score| score > 0)?;
    let id = scores
        .iter()
        .find(|(_, &score)| score == top)
        .map(|(id, _)| *id)?;

    document.tree.get(id).and_then(ElementRef::wrap)
}

fn is_boilerplate(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if SKIP_TAGS.contains(&value.name()) {
        return true;
    }
    if value.attr("role") == Some("navigation") {
        return true;
    }
    value
        .classes()
        .chain(value.id())
        .any(|token| is_marker(&token.to_ascii_lowercase()))
}

/// `menu`, `main-menu`, `menu-top` all match the `menu` marker.
fn is_marker(token: &str) -> bool {
    token
        .split(['-', '_'])
        .any(|part| SKIP_MARKERS.contains(&part))
}

fn collect_lines(element: ElementRef<'_>, lines: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let line = collapse_whitespace(text);
                if !line.is_empty() {
                    lines.push(line);
                }
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    if !is_boilerplate(el) {
                        collect_lines(el, lines);
                    }
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
