// src/utils/url.rs

//! Turning the raw `href` found on a page into the canonical item URL.

use url::{ParseError, Url};

use crate::error::ExtractError;

/// Resolve a potentially relative link against a site's base URL.
///
/// - Absolute links (with a scheme) are returned unchanged, byte for byte.
/// - With `real_url` set, the link is appended to it verbatim.
/// - Otherwise the link is joined onto the base path with [`join_dedup`]
///   and prefixed with the base URL's scheme and host.
///
/// # Examples
/// ```
/// use newswatch::utils::url::resolve_link;
///
/// assert_eq!(
///     resolve_link("https://example.com/news", None, "/news/a").unwrap(),
///     "https://example.com/news/a"
/// );
/// ```
pub fn resolve_link(base: &str, real_url: Option<&str>, raw: &str) -> Result<String, ExtractError> {
    let base_url = Url::parse(base).map_err(|source| url_error(base, source))?;

    match Url::parse(raw) {
        Ok(_) => return Ok(raw.to_string()),
        Err(ParseError::RelativeUrlWithoutBase) => {}
        Err(source) => return Err(url_error(raw, source)),
    }
    // Relative, but it still has to be syntactically valid.
    base_url.join(raw).map_err(|source| url_error(raw, source))?;

    if let Some(prefix) = real_url.filter(|prefix| !prefix.is_empty()) {
        return Ok(format!("{prefix}{raw}"));
    }

    let host = base_url
        .host_str()
        .ok_or_else(|| url_error(base, ParseError::EmptyHost))?;
    let origin = match base_url.port() {
        Some(port) => format!("{}://{host}:{port}", base_url.scheme()),
        None => format!("{}://{host}", base_url.scheme()),
    };

    Ok(format!("{origin}{}", join_dedup(base_url.path(), raw)))
}

/// Join a relative link onto a base path so the base path appears once.
///
/// Anything before the link's first `/` is dropped, then every occurrence
/// of the base path is removed from the joined path and a single copy is
/// put back in front. A slug that happens to contain the base path is
/// mangled by this; sites relying on such slugs should set `real_url`.
pub fn join_dedup(base_path: &str, raw: &str) -> String {
    let cleaned = raw.find('/').map_or(raw, |idx| &raw[idx..]);
    let base = base_path.trim_end_matches('/');
    let relative = cleaned.trim_start_matches('/');
    let joined = format!("{base}/{relative}");

    if base.is_empty() {
        return joined;
    }
    format!("{base}{}", joined.replace(base, ""))
}

fn url_error(input: &str, source: ParseError) -> ExtractError {
    ExtractError::UrlParse {
        input: input.to_string(),
        source,
    }
}
