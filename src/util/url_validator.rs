use thiserror::Error;
use url::Url;

/// Errors that can occur when validating a link before opening it.
#[derive(Error, Debug, PartialEq)]
pub enum UrlValidationError {
    /// The link could not be parsed, even against the site root.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The link uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The link is site-relative and there is no absolute root to resolve it against.
    #[error("Relative link '{0}' has no site to resolve against")]
    Unresolvable(String),
}

/// Resolves a card or topic link to an absolute URL that is safe to hand to
/// the system browser.
///
/// Absolute links are used as-is; site-relative links (`/post.html`) are
/// joined onto `site`. Only `http` and `https` are accepted, so a crafted
/// index cannot make the browser open `file://` or `javascript:` targets.
///
/// # Examples
///
/// ```
/// use postgrid::util::validate_url_for_open;
/// use url::Url;
///
/// let site = Url::parse("https://example.com/content/index.json").unwrap();
/// let url = validate_url_for_open("/posts/a.html", Some(&site)).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/posts/a.html");
///
/// assert!(validate_url_for_open("file:///etc/passwd", Some(&site)).is_err());
/// assert!(validate_url_for_open("/posts/a.html", None).is_err());
/// ```
pub fn validate_url_for_open(link: &str, site: Option<&Url>) -> Result<Url, UrlValidationError> {
    let url = match Url::parse(link) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => match site {
            Some(site) => site.join(link)?,
            None => return Err(UrlValidationError::Unresolvable(link.to_string())),
        },
        Err(e) => return Err(e.into()),
    };

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Url {
        Url::parse("https://blog.example.org/content/index.json").unwrap()
    }

    #[test]
    fn test_absolute_http_links_accepted() {
        let url = validate_url_for_open("http://news.example.org/a", None).unwrap();
        assert_eq!(url.host_str(), Some("news.example.org"));
    }

    #[test]
    fn test_relative_link_joined_onto_site() {
        let url = validate_url_for_open("/blog?topic=rust", Some(&site())).unwrap();
        assert_eq!(url.as_str(), "https://blog.example.org/blog?topic=rust");
    }

    #[test]
    fn test_relative_link_without_site_rejected() {
        assert_eq!(
            validate_url_for_open("/a.html", None),
            Err(UrlValidationError::Unresolvable("/a.html".to_string()))
        );
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        for link in ["file:///etc/passwd", "javascript:alert(1)", "ftp://example.com"] {
            assert!(matches!(
                validate_url_for_open(link, Some(&site())),
                Err(UrlValidationError::UnsupportedScheme(_))
            ));
        }
    }

    #[test]
    fn test_relative_to_file_site_is_not_http() {
        let file_site = Url::parse("file:///srv/www/content/index.json").unwrap();
        assert!(matches!(
            validate_url_for_open("/a.html", Some(&file_site)),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
    }
}
