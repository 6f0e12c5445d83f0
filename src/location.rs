//! Page location handling.
//!
//! The listing page reads a `topic` query parameter on load to pre-apply a
//! filter, and drops it again (pushing a new history entry, no reload) when
//! the filter is cleared. Locations may be absolute URLs or site-relative
//! paths like `/blog?topic=go`, so the query is handled directly with
//! `form_urlencoded` rather than requiring an absolute [`url::Url`].

use std::fmt;
use url::form_urlencoded;

/// Query parameter that carries a pre-selected topic.
pub const TOPIC_PARAM: &str = "topic";

/// Join a base URL and path segments with single slashes.
///
/// Empty segments are skipped and runs of `/` collapse to one, except the
/// `//` that follows a scheme (`https://`), which is preserved.
///
/// ```
/// use postgrid::location::build_url;
///
/// assert_eq!(build_url("/site/", &["/blog/", "post.html"]), "/site/blog/post.html");
/// assert_eq!(build_url("", &["content", "index.json"]), "content/index.json");
/// assert_eq!(build_url("https://example.com/", &["blog"]), "https://example.com/blog");
/// ```
pub fn build_url(base: &str, segments: &[&str]) -> String {
    let joined = std::iter::once(base)
        .chain(segments.iter().copied())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    let (scheme, rest) = match joined.find("://") {
        Some(idx) => joined.split_at(idx + 3),
        None => ("", joined.as_str()),
    };

    let mut out = String::with_capacity(joined.len());
    out.push_str(scheme);
    let mut previous_slash = false;
    for c in rest.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(c);
    }
    out
}

/// A page URL split into path, query pairs and fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    path: String,
    query: Vec<(String, String)>,
    fragment: Option<String>,
}

impl PageLocation {
    pub fn parse(raw: &str) -> Self {
        let (rest, fragment) = match raw.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (raw, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        Self {
            path: path.to_string(),
            query: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            fragment,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_param(&self, key: &str) -> bool {
        self.query.iter().any(|(k, _)| k == key)
    }

    /// The pre-selected topic, ignoring an empty `?topic=`.
    pub fn topic(&self) -> Option<&str> {
        self.query_param(TOPIC_PARAM).filter(|t| !t.is_empty())
    }

    /// Copy of this location with every occurrence of `key` removed.
    pub fn without_param(&self, key: &str) -> Self {
        Self {
            path: self.path.clone(),
            query: self
                .query
                .iter()
                .filter(|(k, _)| k != key)
                .cloned()
                .collect(),
            fragment: self.fragment.clone(),
        }
    }

    /// Copy of this location with `key` set to `value`, replacing old values.
    pub fn with_param(&self, key: &str, value: &str) -> Self {
        let mut next = self.without_param(key);
        next.query.push((key.to_string(), value.to_string()));
        next
    }
}

impl fmt::Display for PageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            write!(f, "?{}", encoded)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

/// In-app navigation history: `push` mirrors `history.pushState`.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<PageLocation>,
}

impl History {
    pub fn new(initial: PageLocation) -> Self {
        Self {
            entries: vec![initial],
        }
    }

    pub fn push(&mut self, location: PageLocation) {
        tracing::debug!(location = %location, "Pushing history entry");
        self.entries.push(location);
    }

    pub fn current(&self) -> &PageLocation {
        // Never empty: constructed with an initial entry and only grows
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_collapses_slashes() {
        assert_eq!(build_url("/", &["/blog"]), "/blog");
        assert_eq!(build_url("site//", &["//a//", "b"]), "site/a/b");
    }

    #[test]
    fn test_build_url_skips_empty_segments() {
        assert_eq!(build_url("", &["", "blog", ""]), "blog");
        assert_eq!(build_url("", &[]), "");
    }

    #[test]
    fn test_build_url_keeps_scheme() {
        assert_eq!(
            build_url("http://localhost:8080", &["content", "index.json"]),
            "http://localhost:8080/content/index.json"
        );
    }

    #[test]
    fn test_parse_topic_param() {
        let location = PageLocation::parse("/blog?topic=go");
        assert_eq!(location.path(), "/blog");
        assert_eq!(location.topic(), Some("go"));
    }

    #[test]
    fn test_topic_is_percent_decoded() {
        let location = PageLocation::parse("/blog?topic=web%20dev");
        assert_eq!(location.topic(), Some("web dev"));
    }

    #[test]
    fn test_empty_topic_is_none() {
        assert_eq!(PageLocation::parse("/blog?topic=").topic(), None);
        assert_eq!(PageLocation::parse("/blog").topic(), None);
    }

    #[test]
    fn test_without_param_keeps_other_params_and_fragment() {
        let location = PageLocation::parse("https://example.com/blog?page=2&topic=go#top");
        let cleared = location.without_param(TOPIC_PARAM);
        assert_eq!(cleared.to_string(), "https://example.com/blog?page=2#top");
        assert!(!cleared.has_param(TOPIC_PARAM));
    }

    #[test]
    fn test_without_only_param_drops_question_mark() {
        let cleared = PageLocation::parse("/blog?topic=go").without_param(TOPIC_PARAM);
        assert_eq!(cleared.to_string(), "/blog");
    }

    #[test]
    fn test_with_param_replaces() {
        let location = PageLocation::parse("/blog?topic=go").with_param(TOPIC_PARAM, "rust");
        assert_eq!(location.topic(), Some("rust"));
        assert_eq!(location.to_string(), "/blog?topic=rust");
    }

    #[test]
    fn test_history_push() {
        let mut history = History::new(PageLocation::parse("/blog?topic=go"));
        history.push(PageLocation::parse("/blog"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().to_string(), "/blog");
    }
}
