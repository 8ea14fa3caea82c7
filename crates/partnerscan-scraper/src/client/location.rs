//! Page addressing for remote listings and saved local captures.
//!
//! Local paths are turned into `file://` URLs so that relative "next page"
//! links in a saved capture resolve exactly like they do online.

use reqwest::Url;

use crate::error::ScraperError;

/// Parses a source `url` setting into a fetchable page URL.
///
/// Accepts `http://`, `https://` and `file://` URLs, or a plain filesystem
/// path (relative paths are made absolute against the working directory).
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] for malformed URLs, unsupported
/// schemes, or paths that cannot be made absolute.
pub fn parse_location(raw: &str) -> Result<Url, ScraperError> {
    let raw = raw.trim();
    let invalid = |reason: String| ScraperError::InvalidUrl {
        url: raw.to_owned(),
        reason,
    };

    if raw.is_empty() {
        return Err(invalid("empty location".to_owned()));
    }

    if raw.contains("://") {
        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        return match url.scheme() {
            "http" | "https" => {
                if url.host_str().is_none() {
                    Err(invalid("missing host".to_owned()))
                } else {
                    Ok(url)
                }
            }
            "file" => Ok(url),
            other => Err(invalid(format!("unsupported scheme '{other}'"))),
        };
    }

    let absolute = std::path::absolute(raw).map_err(|e| invalid(e.to_string()))?;
    Url::from_file_path(&absolute).map_err(|()| invalid("not an absolute file path".to_owned()))
}

/// Resolves a "next page" `href` against the page it was found on.
///
/// Returns `None` for empty hrefs, in-page anchors and `javascript:` links.
#[must_use]
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    match url.scheme() {
        "http" | "https" | "file" => Some(url),
        _ => None,
    }
}

/// Identity of a page for cycle detection: the URL without its fragment.
#[must_use]
pub fn page_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_remote_urls() {
        let url = parse_location("https://unibank.az/cards/ucardpartners").unwrap();
        assert_eq!(url.host_str(), Some("unibank.az"));
    }

    #[test]
    fn rejects_unsupported_scheme_and_garbage() {
        assert!(matches!(
            parse_location("ftp://bank.example/list"),
            Err(ScraperError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_location("https://"),
            Err(ScraperError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_location("   "),
            Err(ScraperError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn plain_path_becomes_file_url() {
        let url = parse_location("/tmp/captures/bolkart.html").unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/captures/bolkart.html"));
    }

    #[test]
    fn resolves_relative_links_for_remote_and_local_pages() {
        let remote = parse_location("https://bank.example/az/partners?page=1").unwrap();
        assert_eq!(
            resolve_link(&remote, "?page=2").unwrap().as_str(),
            "https://bank.example/az/partners?page=2"
        );
        assert_eq!(
            resolve_link(&remote, "/az/partners/page/3#top").unwrap().as_str(),
            "https://bank.example/az/partners/page/3"
        );

        let local = parse_location("/tmp/captures/page1.html").unwrap();
        let next = resolve_link(&local, "page2.html").unwrap();
        assert_eq!(next.scheme(), "file");
        assert!(next.path().ends_with("/captures/page2.html"));
    }

    #[test]
    fn ignores_anchor_and_script_links() {
        let base = parse_location("https://bank.example/partners").unwrap();
        assert!(resolve_link(&base, "#").is_none());
        assert!(resolve_link(&base, "javascript:void(0)").is_none());
        assert!(resolve_link(&base, "  ").is_none());
        assert!(resolve_link(&base, "mailto:info@bank.example").is_none());
    }

    #[test]
    fn page_key_ignores_fragment() {
        let a = Url::parse("https://bank.example/p?page=2#list").unwrap();
        let b = Url::parse("https://bank.example/p?page=2").unwrap();
        assert_eq!(page_key(&a), page_key(&b));
    }
}
