use serde::Deserialize;
use std::sync::Arc;

use super::LoadError;

/// The full article index for one page view.
///
/// Loaded once and never mutated; `Arc` so the controller and host can share
/// it without copying records.
pub type FullIndex = Arc<[ArticleRecord]>;

/// One entry of `content/index.json`.
///
/// `url` and `title` are required. Everything else is optional and a JSON
/// `null` is treated the same as an absent key. The site generator also
/// writes `slug`, `category` and `lang`; they are kept for callers that want
/// them but play no part in filtering or rendering. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub written: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

impl ArticleRecord {
    /// Minimal record with only the required fields set.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            written: None,
            description: None,
            topics: None,
            slug: None,
            category: None,
            lang: None,
        }
    }

    /// Topic tags in index order; empty when the record has none.
    pub fn topics(&self) -> &[String] {
        self.topics.as_deref().unwrap_or(&[])
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics().iter().any(|t| t == topic)
    }

    /// Description, with the generator's `""` placeholder treated as absent.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// Parse the raw index document.
///
/// The top level must be an array and every element must match
/// [`ArticleRecord`]'s shape; a single malformed element rejects the whole
/// document, since a partially-loaded index would page inconsistently.
pub fn parse_index(bytes: &[u8]) -> Result<FullIndex, LoadError> {
    let records: Vec<ArticleRecord> = serde_json::from_slice(bytes)?;
    tracing::debug!(records = records.len(), "Parsed article index");
    Ok(records.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generator_output() {
        let json = br#"[
            {
                "slug": "blog/go-tools",
                "title": "Go tooling",
                "description": "",
                "written": "2025-04-17",
                "topics": ["go", "tools"],
                "url": "/blog/go-tools.html",
                "category": "blog",
                "lang": "en",
                "content_id": null,
                "alternate_languages": []
            }
        ]"#;

        let index = parse_index(json).unwrap();
        assert_eq!(index.len(), 1);
        let record = &index[0];
        assert_eq!(record.title, "Go tooling");
        assert_eq!(record.written.as_deref(), Some("2025-04-17"));
        assert_eq!(record.topics(), ["go".to_string(), "tools".to_string()]);
        assert_eq!(record.category.as_deref(), Some("blog"));
        // Empty description from the generator counts as missing
        assert_eq!(record.description(), None);
    }

    #[test]
    fn test_optional_fields_may_be_missing_or_null() {
        let json = br#"[
            {"url": "/a", "title": "A"},
            {"url": "/b", "title": "B", "written": null, "topics": null, "description": null}
        ]"#;

        let index = parse_index(json).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.iter().all(|r| r.written.is_none()));
        assert!(index.iter().all(|r| r.topics().is_empty()));
    }

    #[test]
    fn test_preserves_document_order() {
        let json = br#"[{"url": "/3", "title": "3"}, {"url": "/1", "title": "1"}, {"url": "/2", "title": "2"}]"#;
        let index = parse_index(json).unwrap();
        let urls: Vec<_> = index.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["/3", "/1", "/2"]);
    }

    #[test]
    fn test_rejects_non_array_document() {
        let result = parse_index(br#"{"articles": []}"#);
        assert!(matches!(result, Err(LoadError::Malformed(_))));
    }

    #[test]
    fn test_rejects_record_missing_title() {
        let result = parse_index(br#"[{"url": "/a"}]"#);
        assert!(matches!(result, Err(LoadError::Malformed(_))));
    }

    #[test]
    fn test_rejects_wrong_topic_type() {
        let result = parse_index(br#"[{"url": "/a", "title": "A", "topics": "go"}]"#);
        assert!(matches!(result, Err(LoadError::Malformed(_))));
    }

    #[test]
    fn test_rejects_invalid_json() {
        assert!(parse_index(b"<html>404</html>").is_err());
        assert!(parse_index(b"").is_err());
    }

    #[test]
    fn test_empty_array_is_valid() {
        let index = parse_index(b"[]").unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_has_topic() {
        let mut record = ArticleRecord::new("/a", "A");
        assert!(!record.has_topic("go"));
        record.topics = Some(vec!["go".into()]);
        assert!(record.has_topic("go"));
        assert!(!record.has_topic("Go"));
    }
}
