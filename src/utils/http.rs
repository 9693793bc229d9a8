// src/utils/http.rs

//! HTTP fetching utilities.

use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// How much of the body is scanned for a `<meta>` charset.
const META_SNIFF_BYTES: usize = 2048;

/// Turns a URL into page markup decoded to UTF-8.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Plain HTTP fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP {status}")));
        }

        let header_charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);
        let bytes = response.bytes().await?;

        Ok(decode_html(&bytes, header_charset.as_deref()))
    }
}

/// Decode a page body to UTF-8.
///
/// Charset precedence: byte-order mark, `Content-Type` header, `<meta>`
/// declaration, then UTF-8. Undecodable bytes become U+FFFD.
pub fn decode_html(bytes: &[u8], header_charset: Option<&str>) -> String {
    let encoding = header_charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| sniff_meta_charset(bytes).and_then(|l| Encoding::for_label(l.as_bytes())))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::debug!("Page contained bytes invalid for {}", used.name());
    }
    text.into_owned()
}

/// Extract the charset parameter of a `Content-Type` value.
pub fn charset_from_content_type(value: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (key, val) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| val.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Find a charset declared by `<meta charset>` or `<meta http-equiv>`.
pub fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(META_SNIFF_BYTES)]);
    let pattern =
        regex::Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_\-:.]+)"#).ok()?;
    pattern
        .captures(&head)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; charset=GBK"),
            Some("GBK".to_string())
        );
        assert_eq!(
            charset_from_content_type("text/html;Charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn test_sniff_meta_charset() {
        assert_eq!(
            sniff_meta_charset(br#"<html><head><meta charset="gb2312"></head>"#),
            Some("gb2312".to_string())
        );
        assert_eq!(
            sniff_meta_charset(
                br#"<meta http-equiv="Content-Type" content="text/html; charset=Shift_JIS">"#
            ),
            Some("Shift_JIS".to_string())
        );
        assert_eq!(sniff_meta_charset(b"<html><body>plain</body></html>"), None);
    }

    #[test]
    fn test_decode_gbk_page_from_meta() {
        let (body, _, _) = encoding_rs::GBK.encode("<div>新闻发布</div>");
        let mut page = br#"<html><head><meta charset="gbk"></head><body>"#.to_vec();
        page.extend_from_slice(&body);

        let decoded = decode_html(&page, None);
        assert!(decoded.contains("<div>新闻发布</div>"));
    }

    #[test]
    fn test_header_charset_wins_over_meta() {
        let (body, _, _) = encoding_rs::GBK.encode("公告");
        let mut page = br#"<meta charset="iso-8859-1">"#.to_vec();
        page.extend_from_slice(&body);

        assert!(decode_html(&page, Some("gbk")).contains("公告"));
    }

    #[test]
    fn test_defaults_to_utf8() {
        assert_eq!(decode_html("日本語".as_bytes(), None), "日本語");
        assert_eq!(decode_html("x".as_bytes(), Some("no-such-charset")), "x");
    }
}
