// src/document.rs

//! Read-only document tree used by the extraction engine.
//!
//! A thin layer over [`scraper::Html`] that answers the handful of questions
//! the site rules ask: "first/all descendants with this tag whose attribute
//! holds this value", "text of this node", "value of this attribute".

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

/// How an attribute value is compared against the configured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrMatch {
    /// The configured value equals one of the whitespace-separated tokens
    /// of the attribute (how `class="item news"` matches `news`).
    #[default]
    Token,
    /// The whole attribute value equals the configured value.
    Exact,
}

impl AttrMatch {
    pub fn matches(self, actual: &str, expected: &str) -> bool {
        match self {
            AttrMatch::Token => actual.split_whitespace().any(|token| token == expected),
            AttrMatch::Exact => actual == expected,
        }
    }
}

/// Matches elements by tag name and, optionally, one attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementMatcher {
    pub tag: String,
    pub attr: Option<(String, String)>,
    pub mode: AttrMatch,
}

impl ElementMatcher {
    /// Matcher on tag name only.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attr: None,
            mode: AttrMatch::default(),
        }
    }

    /// Matcher on tag name plus `name=value`.
    pub fn with_attr(
        tag: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
        mode: AttrMatch,
    ) -> Self {
        Self {
            tag: tag.into(),
            attr: Some((name.into(), value.into())),
            mode,
        }
    }

    fn matches(&self, element: &ElementRef<'_>) -> bool {
        let el = element.value();
        if el.name() != self.tag {
            return false;
        }
        match &self.attr {
            None => true,
            Some((name, expected)) => el
                .attr(name)
                .is_some_and(|actual| self.mode.matches(actual, expected)),
        }
    }
}

/// A parsed markup document.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse a full HTML document. Parsing is lenient and never fails.
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// First element in document order matching `matcher`.
    pub fn find(&self, matcher: &ElementMatcher) -> Option<Node<'_>> {
        self.elements().find(|el| matcher.matches(el)).map(Node)
    }

    /// All elements in document order matching `matcher`.
    pub fn find_all(&self, matcher: &ElementMatcher) -> Vec<Node<'_>> {
        self.elements()
            .filter(|el| matcher.matches(el))
            .map(Node)
            .collect()
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html
            .tree
            .root()
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
    }
}

/// An element inside a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// Tag name of this element.
    pub fn tag(&self) -> &'a str {
        self.0.value().name()
    }

    /// Attribute value, if present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    /// Text of this element and all its descendants, whitespace collapsed.
    pub fn text(&self) -> String {
        let raw: String = self.0.text().collect();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// First descendant (excluding this node) matching `matcher`.
    pub fn find(&self, matcher: &ElementMatcher) -> Option<Node<'a>> {
        self.elements().find(|el| matcher.matches(el)).map(Node)
    }

    /// All descendants (excluding this node) matching `matcher`.
    pub fn find_all(&self, matcher: &ElementMatcher) -> Vec<Node<'a>> {
        self.elements()
            .filter(|el| matcher.matches(el))
            .map(Node)
            .collect()
    }

    /// First descendant with the given tag name.
    pub fn find_tag(&self, tag: &str) -> Option<Node<'a>> {
        self.elements().find(|el| el.value().name() == tag).map(Node)
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'a>> + use<'a> {
        self.0.descendants().skip(1).filter_map(ElementRef::wrap)
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("tag", &self.tag())
            .field("class", &self.attr("class"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="news item" id="first">
            <h3 class="title"><a href="/a">  First
              headline </a></h3>
            <span class="date">2024-10-25</span>
          </div>
          <div class="news">
            <h3 class="title"><a href="/b">Second</a></h3>
          </div>
          <div class="other"><p>ignored</p></div>
        </body></html>
    "#;

    #[test]
    fn test_token_match_on_class_list() {
        let doc = Document::parse(PAGE);
        let matcher = ElementMatcher::with_attr("div", "class", "news", AttrMatch::Token);
        let found = doc.find_all(&matcher);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].attr("id"), Some("first"));
    }

    #[test]
    fn test_exact_match_rejects_partial_class_list() {
        let doc = Document::parse(PAGE);
        let matcher = ElementMatcher::with_attr("div", "class", "news", AttrMatch::Exact);
        let found = doc.find_all(&matcher);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].attr("id"), None);
    }

    #[test]
    fn test_attr_matching_is_case_sensitive() {
        let doc = Document::parse(PAGE);
        let matcher = ElementMatcher::with_attr("div", "class", "News", AttrMatch::Token);
        assert!(doc.find(&matcher).is_none());
    }

    #[test]
    fn test_text_collapses_whitespace() {
        let doc = Document::parse(PAGE);
        let title = doc
            .find(&ElementMatcher::with_attr("h3", "class", "title", AttrMatch::Token))
            .unwrap();
        assert_eq!(title.text(), "First headline");
    }

    #[test]
    fn test_node_find_excludes_self() {
        let doc = Document::parse(r#"<div class="x"><div class="x" id="inner"></div></div>"#);
        let matcher = ElementMatcher::with_attr("div", "class", "x", AttrMatch::Token);
        let outer = doc.find(&matcher).unwrap();
        assert_eq!(outer.attr("id"), None);
        let inner = outer.find(&matcher).unwrap();
        assert_eq!(inner.attr("id"), Some("inner"));
        assert!(inner.find(&matcher).is_none());
    }

    #[test]
    fn test_find_tag_navigates_to_anchor() {
        let doc = Document::parse(PAGE);
        let block = doc
            .find(&ElementMatcher::with_attr("div", "class", "news", AttrMatch::Token))
            .unwrap();
        let anchor = block.find_tag("a").unwrap();
        assert_eq!(anchor.tag(), "a");
        assert_eq!(anchor.attr("href"), Some("/a"));
    }
}
