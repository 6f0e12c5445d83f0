use std::fmt::Write as _;

use super::CardFragment;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl CardFragment {
    /// Render the site's `post-card` markup.
    ///
    /// Topic links whose topic satisfies `is_selected` carry the extra
    /// `selected` class, mirroring the filter toggles.
    pub fn to_html(&self, is_selected: impl Fn(&str) -> bool) -> String {
        let mut html = String::new();
        html.push_str("<article class=\"post-card\">\n");
        html.push_str("  <div class=\"post-card-content\">\n");
        // Writing to a String cannot fail
        let _ = writeln!(
            html,
            "    <h3><a href=\"{}\">{}</a></h3>",
            escape_html(&self.href),
            escape_html(&self.title)
        );

        if self.date.is_some() || !self.topics.is_empty() {
            html.push_str("    <div class=\"post-meta\">\n");
            if let Some(date) = &self.date {
                let _ = writeln!(
                    html,
                    "      <time datetime=\"{}\">{}</time>",
                    escape_html(&date.datetime),
                    escape_html(&date.text)
                );
            }
            if !self.topics.is_empty() {
                html.push_str("      <div class=\"post-topics\">");
                for link in &self.topics {
                    let class = if is_selected(&link.topic) {
                        "post-topic selected"
                    } else {
                        "post-topic"
                    };
                    let topic = escape_html(&link.topic);
                    let _ = write!(
                        html,
                        "<a href=\"{}\" class=\"{}\" data-topic=\"{}\">{}</a>",
                        escape_html(&link.href),
                        class,
                        topic,
                        topic
                    );
                }
                html.push_str("</div>\n");
            }
            html.push_str("    </div>\n");
        }

        if let Some(excerpt) = &self.excerpt {
            let _ = writeln!(html, "    <p class=\"post-excerpt\">{}</p>", escape_html(excerpt));
        }

        html.push_str("  </div>\n");
        html.push_str("</article>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{render_card, CardContext, DateStyle};
    use crate::index::ArticleRecord;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_full_card_markup() {
        let record = ArticleRecord {
            written: Some("2025-04-17".into()),
            description: Some("Notes".into()),
            topics: Some(vec!["go".into(), "tools".into()]),
            ..ArticleRecord::new("/blog/a.html", "A & B")
        };
        let card = render_card(&record, &CardContext::new("", DateStyle::Iso));

        let expected = concat!(
            "<article class=\"post-card\">\n",
            "  <div class=\"post-card-content\">\n",
            "    <h3><a href=\"/blog/a.html\">A &amp; B</a></h3>\n",
            "    <div class=\"post-meta\">\n",
            "      <time datetime=\"2025-04-17\">2025-04-17</time>\n",
            "      <div class=\"post-topics\">",
            "<a href=\"blog?topic=go\" class=\"post-topic selected\" data-topic=\"go\">go</a>",
            "<a href=\"blog?topic=tools\" class=\"post-topic\" data-topic=\"tools\">tools</a>",
            "</div>\n",
            "    </div>\n",
            "    <p class=\"post-excerpt\">Notes</p>\n",
            "  </div>\n",
            "</article>\n",
        );
        assert_eq!(card.to_html(|t| t == "go"), expected);
    }

    #[test]
    fn test_minimal_card_omits_meta_and_excerpt() {
        let card = render_card(&ArticleRecord::new("/a", "A"), &CardContext::default());
        let html = card.to_html(|_| false);
        assert!(!html.contains("post-meta"));
        assert!(!html.contains("post-excerpt"));
        assert!(html.contains("<h3><a href=\"/a\">A</a></h3>"));
    }

    #[test]
    fn test_script_in_title_is_escaped() {
        let card = render_card(
            &ArticleRecord::new("/x", "<script>alert(1)</script>"),
            &CardContext::default(),
        );
        let html = card.to_html(|_| false);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
