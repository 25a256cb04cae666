// File: kudos-core/src/links/validate.rs

use thiserror::Error;
use url::{Host, Url};

/// Why a link value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The field exists but was never given a value.
    #[error("link is required")]
    Missing,

    #[error("link is empty")]
    Empty,

    #[error("not a valid URL: {0}")]
    Malformed(String),
}

const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Checks a raw link value and returns the parsed URL.
///
/// Surrounding whitespace is ignored. A scheme is optional (`twitch.tv/x`
/// passes as `http://twitch.tv/x`); the host must be an IP address or a
/// dotted domain ending in an alphabetic TLD.
pub fn validate_link(raw: Option<&str>) -> Result<Url, LinkError> {
    let raw = raw.ok_or(LinkError::Missing)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LinkError::Empty);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(LinkError::Malformed("contains whitespace".into()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    let url = Url::parse(&candidate).map_err(|e| LinkError::Malformed(e.to_string()))?;

    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(LinkError::Malformed(format!("unsupported scheme '{}'", url.scheme())));
    }

    match url.host() {
        Some(Host::Domain(domain)) => check_domain(domain)?,
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
        None => return Err(LinkError::Malformed("missing host".into())),
    }
    Ok(url)
}

fn check_domain(domain: &str) -> Result<(), LinkError> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(LinkError::Malformed(format!("'{}' has no top-level domain", domain)));
    }
    for label in &labels {
        let ok = !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-');
        if !ok {
            return Err(LinkError::Malformed(format!("bad host label '{}'", label)));
        }
    }
    let tld = labels[labels.len() - 1];
    let tld_ok = tld.starts_with("xn--") || (tld.len() >= 2 && tld.chars().all(char::is_alphabetic));
    if !tld_ok {
        return Err(LinkError::Malformed(format!("bad top-level domain '{}'", tld)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_links() {
        for ok in [
            "https://twitch.tv/x",
            "  https://www.youtube.com/@asmongold  ",
            "kick.com/xqc",
            "http://192.168.0.1:8080/live",
            "ftp://files.example.org/clip.mp4",
            "https://rumble.com/c/foo?bar=1#baz",
        ] {
            assert!(validate_link(Some(ok)).is_ok(), "{} should be valid", ok);
        }
    }

    #[test]
    fn rejects_malformed_links() {
        for bad in [
            "not a url",
            "https://twitch",
            "localhost",
            "https://",
            "javascript:alert(1)",
            "ws://twitch.tv/socket",
            "https://twitch.tv/a b",
            "https://-bad-.com",
            "https://example.c0m",
        ] {
            assert!(
                matches!(validate_link(Some(bad)), Err(LinkError::Malformed(_))),
                "{} should be malformed",
                bad
            );
        }
    }

    #[test]
    fn missing_and_empty_are_distinct() {
        assert_eq!(validate_link(None), Err(LinkError::Missing));
        assert_eq!(validate_link(Some("")), Err(LinkError::Empty));
        assert_eq!(validate_link(Some("   \t")), Err(LinkError::Empty));
    }

    #[test]
    fn scheme_less_link_is_read_as_http() {
        let url = validate_link(Some("tiktok.com/@someone")).unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("tiktok.com"));
    }
}
