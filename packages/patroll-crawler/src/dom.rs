//! Queries over fetched markup.
//!
//! [`Document`] owns the raw HTML plus the URL it came from and answers the
//! handful of questions the navigator and extractor ask: first matching
//! text, link collection with relative-path resolution, locating a link
//! that follows a marker phrase, and reading the block after a label.
//!
//! `scraper::Html` is not `Send`, so every query parses locally and only
//! owned data leaves this module; no parse state survives across awaits.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

/// An anchor extracted from a document, href resolved to absolute form
/// when the document URL allows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// A fetched page: source URL, raw markup, and fetch time.
#[derive(Debug, Clone)]
pub struct Document {
    url: String,
    html: String,
    fetched_at: DateTime<Utc>,
}

impl Document {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            fetched_at: Utc::now(),
        }
    }

    /// URL this document was fetched from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw markup as fetched.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// True when at least one element matches the selector.
    pub fn has_selector(&self, selector: &str) -> bool {
        let Some(sel) = compile(selector) else {
            return false;
        };
        let html = Html::parse_document(&self.html);
        html.select(&sel).next().is_some()
    }

    /// Collapsed text of the first element matching the selector.
    pub fn first_text(&self, selector: &str) -> Option<String> {
        let sel = compile(selector)?;
        let html = Html::parse_document(&self.html);
        html.select(&sel).next().map(element_text)
    }

    /// Collapsed text of every element matching the selector, in
    /// document order.
    pub fn texts(&self, selector: &str) -> Vec<String> {
        let Some(sel) = compile(selector) else {
            return Vec::new();
        };
        let html = Html::parse_document(&self.html);
        html.select(&sel).map(element_text).collect()
    }

    /// Every anchor-like element matching the selector that carries an
    /// href, in document order, hrefs resolved against the document URL.
    pub fn links(&self, selector: &str) -> Vec<Link> {
        let Some(sel) = compile(selector) else {
            return Vec::new();
        };
        let html = Html::parse_document(&self.html);
        html.select(&sel)
            .filter_map(|el| self.link_from(el))
            .collect()
    }

    /// Locate the link introduced by a marker phrase.
    ///
    /// Finds the first element whose own text contains `needle`; if that
    /// element is itself an anchor its link is returned, otherwise the
    /// first following-sibling anchor is. Later marker occurrences are
    /// tried when an earlier one has no usable anchor.
    pub fn link_after_text(&self, needle: &str) -> Option<Link> {
        let html = Html::parse_document(&self.html);
        for node in html.root_element().descendants() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            if !own_text(el).contains(needle) {
                continue;
            }
            if el.value().name() == "a" {
                if let Some(link) = self.link_from(el) {
                    return Some(link);
                }
            }
            let sibling_anchor = el
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|sib| sib.value().name() == "a");
            if let Some(anchor) = sibling_anchor {
                if let Some(link) = self.link_from(anchor) {
                    return Some(link);
                }
            }
        }
        None
    }

    /// Text of the element matching `selector` that immediately follows
    /// the one whose own text contains `label`, in document order.
    pub fn text_after_label(&self, selector: &str, label: &str) -> Option<String> {
        let sel = compile(selector)?;
        let html = Html::parse_document(&self.html);
        let mut label_seen = false;
        for el in html.select(&sel) {
            if label_seen {
                return Some(element_text(el));
            }
            if own_text(el).contains(label) {
                label_seen = true;
            }
        }
        None
    }

    /// Resolve an href against the document URL. Absolute inputs pass
    /// through; unresolvable inputs are returned unchanged.
    pub fn absolute(&self, href: &str) -> String {
        match Url::parse(&self.url).and_then(|base| base.join(href)) {
            Ok(resolved) => resolved.to_string(),
            Err(_) => href.to_string(),
        }
    }

    fn link_from(&self, el: ElementRef<'_>) -> Option<Link> {
        el.value().attr("href").map(|href| Link {
            href: self.absolute(href),
            text: element_text(el),
        })
    }
}

fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(err) => {
            warn!(selector = selector, error = %err, "invalid CSS selector");
            None
        }
    }
}

/// Whitespace-collapsed text of an element and its descendants.
fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// Whitespace-collapsed text of the element's direct text children only.
/// Mirrors matching on an element's own text rather than its subtree, so
/// wrapper elements never shadow the block actually carrying a marker.
fn own_text(el: ElementRef<'_>) -> String {
    let direct: String = el
        .children()
        .filter_map(|child| child.value().as_text().map(|t| t.text.to_string()))
        .collect();
    collapse_whitespace(&direct)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
