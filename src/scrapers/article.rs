//! Main-content text extraction from a single press-release page.
//!
//! The DOM held by `scraper` is immutable, so instead of deleting noise
//! elements the way a mutable-DOM library would, the walk below simply
//! skips their subtrees while collecting visible text.

use once_cell::sync::Lazy;
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::utils::collapse_whitespace;

/// Minimum cleaned-text length for a page to count as meaningful content.
const MIN_CONTENT_LEN: usize = 100;

/// Elements whose subtrees never contribute article text.
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "noscript",
];

/// Class names marking navigation chrome rather than content.
const EXCLUDED_CLASSES: &[&str] = &["nav", "navigation", "menu", "sidebar"];

/// Likely main-content containers, in priority order.
static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "main",
        r#"[role="main"]"#,
        ".main",
        ".content",
        ".post",
        ".article",
        ".press-release",
        ".news",
        "article",
        ".entry-content",
        ".post-content",
    ]
    .iter()
    .map(|css| Selector::parse(css).unwrap())
    .collect()
});

static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// Extract the visible main-content text of an article page.
///
/// Tries the content-container selectors in order and takes the first
/// match; when none match (or the match holds no text), falls back to the
/// whole `body`. Returns `None` when the page yields no meaningful content
/// (under [`MIN_CONTENT_LEN`] characters after whitespace collapse).
pub fn extract_article_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let mut content = String::new();
    for selector in CONTENT_SELECTORS.iter() {
        if let Some(element) = document.select(selector).next() {
            content = visible_text(element);
            break;
        }
    }

    if content.trim().is_empty() {
        if let Some(body) = document.select(&BODY_SELECTOR).next() {
            content = visible_text(body);
        }
    }

    let content = collapse_whitespace(&content);
    if content.len() < MIN_CONTENT_LEN {
        debug!(bytes = content.len(), "Page yielded no meaningful content");
        return None;
    }
    Some(content)
}

/// Collect the text of a subtree, skipping noise elements entirely.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    walk(*root, &mut out);
    out
}

fn walk(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(element) => {
            if EXCLUDED_TAGS.contains(&element.name())
                || element.classes().any(|c| EXCLUDED_CLASSES.contains(&c))
            {
                return;
            }
            for child in node.children() {
                walk(child, out);
            }
        }
        Node::Text(text) => {
            out.push_str(&text);
            out.push(' ');
        }
        _ => {
            for child in node.children() {
                walk(child, out);
            }
        }
    }
}
