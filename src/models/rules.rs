// src/models/rules.rs

//! Per-site extraction rules.
//!
//! Sites are written in the config as a flat table of string rules
//! ([`SiteConfig`]). They are validated and compiled once at load time into
//! a [`RuleSet`], so a malformed site stops startup instead of failing on
//! every tick.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::document::{AttrMatch, ElementMatcher};
use crate::error::AppError;
use crate::services::DateLayout;

/// A site as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site name, also the fingerprint key
    pub name: String,

    /// Page to watch; its scheme, host and path drive link resolution
    pub base_url: String,

    /// Prefix used verbatim instead of the base path for relative links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_url: Option<String>,

    /// Locator rules
    pub rules: ParseRules,

    /// Reference-date layouts, tried in order
    #[serde(default)]
    pub date_formats: Vec<String>,
}

/// Raw locator rules. Alternatives are comma-separated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseRules {
    pub content: String,
    pub content_tag: String,
    pub content_mode: String,
    pub date_tag: String,
    pub date_mode: String,
    pub date: String,
    pub date_in: String,
    pub title_mode: String,
    pub title_tag: String,
    pub title: String,
    /// `token` (default) or `exact`
    #[serde(rename = "match")]
    pub match_mode: AttrMatch,
}

impl Default for ParseRules {
    fn default() -> Self {
        Self {
            content: String::new(),
            content_tag: "div".to_string(),
            content_mode: "class".to_string(),
            date_tag: String::new(),
            date_mode: String::new(),
            date: String::new(),
            date_in: String::new(),
            title_mode: String::new(),
            title_tag: "h3".to_string(),
            title: String::new(),
            match_mode: AttrMatch::default(),
        }
    }
}

/// Tag + attribute with an ordered list of accepted values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementQuery {
    pub tag: String,
    pub attr: String,
    pub alternatives: Vec<String>,
    pub mode: AttrMatch,
}

impl ElementQuery {
    /// One matcher per alternative, in configured order.
    pub fn matchers(&self) -> impl Iterator<Item = ElementMatcher> + '_ {
        self.alternatives
            .iter()
            .map(|value| ElementMatcher::with_attr(&self.tag, &self.attr, value, self.mode))
    }
}

/// Where the publication date lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateLocator {
    /// One element inside the content block.
    NestedSingle(ElementMatcher),
    /// Descend from the content block one tag at a time.
    NestedChain(Vec<String>),
    /// Anywhere in the document.
    Global(ElementMatcher),
}

/// Where the title (and its link) lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleLocator {
    /// The content block itself is the title node.
    ContentBlock,
    /// First alternative that matches inside the content block.
    Alternatives(ElementQuery),
}

/// Validated rules for one site.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "SiteConfig")]
pub struct RuleSet {
    pub name: String,
    pub base_url: String,
    pub real_url: Option<String>,
    pub content: ElementQuery,
    pub date: DateLocator,
    pub title: TitleLocator,
    pub date_formats: Vec<DateLayout>,
}

impl TryFrom<SiteConfig> for RuleSet {
    type Error = AppError;

    fn try_from(site: SiteConfig) -> Result<Self, Self::Error> {
        let name = site.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("site name is empty"));
        }
        let invalid = |what: String| AppError::validation(format!("site '{name}': {what}"));

        let base = Url::parse(&site.base_url)
            .map_err(|e| invalid(format!("base_url '{}' is invalid: {e}", site.base_url)))?;
        if base.host_str().is_none() {
            return Err(invalid(format!("base_url '{}' has no host", site.base_url)));
        }

        let rules = site.rules;
        let mode = rules.match_mode;

        let content = ElementQuery {
            tag: non_empty(&rules.content_tag).ok_or_else(|| invalid("content_tag is empty".into()))?,
            attr: non_empty(&rules.content_mode)
                .ok_or_else(|| invalid("content_mode is empty".into()))?,
            alternatives: split_alternatives(&rules.content),
            mode,
        };
        if content.alternatives.is_empty() {
            return Err(invalid("content has no alternatives".into()));
        }

        let date_tag = non_empty(&rules.date_tag).ok_or_else(|| invalid("date_tag is empty".into()))?;
        let date_mode = rules.date_mode.trim();
        if !date_mode.is_empty() && rules.date.trim().is_empty() {
            return Err(invalid(format!("date_mode '{date_mode}' is set but date is empty")));
        }
        let date_matcher = || {
            if date_mode.is_empty() {
                ElementMatcher::tag(&date_tag)
            } else {
                ElementMatcher::with_attr(&date_tag, date_mode, rules.date.trim(), mode)
            }
        };
        let date = if rules.date_in.trim() == "yes" {
            if date_mode.is_empty() {
                DateLocator::NestedChain(split_alternatives(&date_tag))
            } else {
                DateLocator::NestedSingle(date_matcher())
            }
        } else {
            DateLocator::Global(date_matcher())
        };

        let title = match non_empty(&rules.title_mode) {
            None => TitleLocator::ContentBlock,
            Some(attr) => {
                let query = ElementQuery {
                    tag: non_empty(&rules.title_tag)
                        .ok_or_else(|| invalid("title_tag is empty".into()))?,
                    attr,
                    alternatives: split_alternatives(&rules.title),
                    mode,
                };
                if query.alternatives.is_empty() {
                    return Err(invalid("title has no alternatives".into()));
                }
                TitleLocator::Alternatives(query)
            }
        };

        if site.date_formats.is_empty() {
            return Err(invalid("date_formats is empty".into()));
        }
        let date_formats = site
            .date_formats
            .iter()
            .map(|f| f.parse::<DateLayout>().map_err(|e| invalid(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name,
            base_url: site.base_url,
            real_url: site.real_url.filter(|r| !r.trim().is_empty()),
            content,
            date,
            title,
            date_formats,
        })
    }
}

/// Split a comma-separated rule into trimmed, non-empty values.
pub fn split_alternatives(rule: &str) -> Vec<String> {
    rule.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(rules: ParseRules) -> SiteConfig {
        SiteConfig {
            name: "Example".to_string(),
            base_url: "https://example.com/news".to_string(),
            real_url: None,
            rules,
            date_formats: vec!["2006-01-02".to_string()],
        }
    }

    fn rules() -> ParseRules {
        ParseRules {
            content: "news-item, list-item".to_string(),
            date_tag: "span".to_string(),
            date_mode: "class".to_string(),
            date: "date".to_string(),
            date_in: "yes".to_string(),
            title_mode: "class".to_string(),
            title: "title,headline".to_string(),
            ..ParseRules::default()
        }
    }

    #[test]
    fn test_split_alternatives_trims_and_drops_empty() {
        assert_eq!(split_alternatives(" a, b ,,c,"), vec!["a", "b", "c"]);
        assert!(split_alternatives(" , ").is_empty());
    }

    #[test]
    fn test_compile_nested_single_date() {
        let set = RuleSet::try_from(site(rules())).unwrap();
        assert_eq!(set.content.alternatives, vec!["news-item", "list-item"]);
        assert_eq!(set.content.tag, "div");
        assert_eq!(
            set.date,
            DateLocator::NestedSingle(ElementMatcher::with_attr(
                "span",
                "class",
                "date",
                AttrMatch::Token
            ))
        );
        assert!(matches!(set.title, TitleLocator::Alternatives(ref q) if q.tag == "h3"));
    }

    #[test]
    fn test_compile_nested_chain_date() {
        let mut r = rules();
        r.date_mode = String::new();
        r.date_tag = "ul, li,span".to_string();
        let set = RuleSet::try_from(site(r)).unwrap();
        assert_eq!(
            set.date,
            DateLocator::NestedChain(vec!["ul".into(), "li".into(), "span".into()])
        );
    }

    #[test]
    fn test_compile_global_date() {
        let mut r = rules();
        r.date_in = "no".to_string();
        let set = RuleSet::try_from(site(r)).unwrap();
        assert!(matches!(set.date, DateLocator::Global(_)));
    }

    #[test]
    fn test_empty_title_mode_uses_content_block() {
        let mut r = rules();
        r.title_mode = String::new();
        let set = RuleSet::try_from(site(r)).unwrap();
        assert_eq!(set.title, TitleLocator::ContentBlock);
    }

    #[test]
    fn test_rejects_empty_content() {
        let mut r = rules();
        r.content = " , ".to_string();
        let err = RuleSet::try_from(site(r)).unwrap_err();
        assert!(err.to_string().contains("content has no alternatives"));
    }

    #[test]
    fn test_rejects_date_mode_without_value() {
        let mut r = rules();
        r.date = "  ".to_string();
        let err = RuleSet::try_from(site(r)).unwrap_err();
        assert!(err.to_string().contains("date is empty"), "{err}");

        // Same for a global date element.
        let mut r = rules();
        r.date_in = String::new();
        r.date = String::new();
        assert!(RuleSet::try_from(site(r)).is_err());
    }

    #[test]
    fn test_rejects_empty_date_formats() {
        let mut s = site(rules());
        s.date_formats.clear();
        let err = RuleSet::try_from(s).unwrap_err();
        assert!(err.to_string().contains("date_formats is empty"));
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let mut s = site(rules());
        s.base_url = "/news".to_string();
        assert!(RuleSet::try_from(s).is_err());
    }

    #[test]
    fn test_blank_real_url_is_ignored() {
        let mut s = site(rules());
        s.real_url = Some("  ".to_string());
        let set = RuleSet::try_from(s).unwrap();
        assert_eq!(set.real_url, None);
    }

    #[test]
    fn test_deserialize_from_toml() {
        let set: RuleSet = toml::from_str(
            r#"
            name = "Press"
            base_url = "https://example.com/press"
            date_formats = ["2006年01月02日", "2006-01-02"]

            [rules]
            content = "item"
            content_tag = "li"
            date_tag = "time"
            match = "exact"
            "#,
        )
        .unwrap();
        assert_eq!(set.content.tag, "li");
        assert_eq!(set.content.mode, AttrMatch::Exact);
        assert_eq!(set.date, DateLocator::Global(ElementMatcher::tag("time")));
        assert_eq!(set.date_formats.len(), 2);
    }
}
