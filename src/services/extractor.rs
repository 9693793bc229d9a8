// src/services/extractor.rs

//! Rule-driven extraction of the newest item on a page.
//!
//! Runs four steps in order, each with its own failure:
//! content block -> publication date (with cutoff) -> title and link ->
//! absolute URL.

use chrono::NaiveDateTime;

use crate::document::{Document, Node};
use crate::error::ExtractError;
use crate::models::{DateLocator, ElementQuery, ExtractedItem, Extraction, RuleSet, TitleLocator};
use crate::services::dates::parse_date;
use crate::utils::url::resolve_link;

/// Applies site rules to fetched pages.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    cutoff: NaiveDateTime,
}

impl Extractor {
    /// Create an extractor that treats items older than `cutoff` as stale.
    pub fn new(cutoff: NaiveDateTime) -> Self {
        Self { cutoff }
    }

    /// Parse `markup` and extract the newest item.
    pub fn extract_markup(&self, markup: &str, rules: &RuleSet) -> Result<Extraction, ExtractError> {
        let document = Document::parse(markup);
        self.extract(&document, rules)
    }

    /// Extract the newest item from a parsed document.
    pub fn extract(&self, document: &Document, rules: &RuleSet) -> Result<Extraction, ExtractError> {
        let blocks = locate_content(document, &rules.content)?;
        let block = blocks[0];

        let published_at = locate_date(document, block, rules)?;
        if published_at < self.cutoff {
            log::debug!(
                "[{}] newest item dated {} is before cutoff {}",
                rules.name,
                published_at,
                self.cutoff
            );
            return Ok(Extraction::Stale { published_at });
        }

        let (title, raw_link) = locate_title(block, &rules.title)?;
        let endpoint = resolve_link(&rules.base_url, rules.real_url.as_deref(), &raw_link)?;

        Ok(Extraction::Item(ExtractedItem {
            title,
            endpoint,
            published_at,
        }))
    }
}

/// All content blocks: alternatives in configured order, document order
/// within each. The first one is the block later steps work on.
pub fn locate_content<'a>(
    document: &'a Document,
    query: &ElementQuery,
) -> Result<Vec<Node<'a>>, ExtractError> {
    let blocks: Vec<Node<'a>> = query
        .matchers()
        .flat_map(|matcher| document.find_all(&matcher))
        .collect();

    if blocks.is_empty() {
        return Err(ExtractError::ContentNotFound {
            tag: query.tag.clone(),
            attr: query.attr.clone(),
            alternatives: query.alternatives.clone(),
        });
    }
    Ok(blocks)
}

/// Find the date element and parse its text.
pub fn locate_date<'a>(
    document: &'a Document,
    block: Node<'a>,
    rules: &RuleSet,
) -> Result<NaiveDateTime, ExtractError> {
    let node = match &rules.date {
        DateLocator::NestedSingle(matcher) => block.find(matcher),
        // No backtracking: the first hit at each level is the only path tried.
        DateLocator::NestedChain(tags) => tags.iter().try_fold(block, |node, tag| node.find_tag(tag)),
        DateLocator::Global(matcher) => document.find(matcher),
    }
    .ok_or(ExtractError::DateElementNotFound)?;

    let raw = node.text();
    if raw.is_empty() {
        return Err(ExtractError::DateEmpty);
    }
    parse_date(&raw, &rules.date_formats)
}

/// Find the title node in `block` and read its text and raw link.
pub fn locate_title(block: Node<'_>, locator: &TitleLocator) -> Result<(String, String), ExtractError> {
    let node = match locator {
        TitleLocator::ContentBlock => block,
        TitleLocator::Alternatives(query) => query
            .matchers()
            .find_map(|matcher| block.find(&matcher))
            .ok_or(ExtractError::TitleNotFound)?,
    };

    let (title, href) = match node.find_tag("a") {
        Some(anchor) => (anchor.text(), anchor.attr("href")),
        None => (node.text(), node.attr("href")),
    };
    let href = href
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or(ExtractError::LinkNotFound)?;

    Ok((title, href.to_string()))
}
