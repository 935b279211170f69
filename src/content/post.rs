//! Post, Page and Doc models

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::path::PathBuf;

use crate::error::ContentError;

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Publication date
    pub date: NaiveDate,

    /// Last updated date
    pub updated: Option<NaiveDate>,

    /// Short summary shown on the post card
    pub description: String,

    /// Site-relative URL (`/posts/hello-world/`)
    pub url: String,

    /// Tag labels in authored order
    pub tags: Vec<String>,

    /// Rendered HTML content
    #[serde(skip)]
    pub content: String,

    /// Source file path (relative)
    #[serde(skip)]
    pub source: String,
}

impl Post {
    /// Create a post, checking the date and url invariants
    pub fn new(
        title: &str,
        date: &str,
        description: &str,
        url: &str,
        tags: Vec<String>,
    ) -> Result<Self, ContentError> {
        Self::dated(title, parse_date(date)?, description, url, tags)
    }

    /// Create a post from an already parsed date
    pub fn dated(
        title: &str,
        date: NaiveDate,
        description: &str,
        url: &str,
        tags: Vec<String>,
    ) -> Result<Self, ContentError> {
        if title.trim().is_empty() {
            return Err(ContentError::MissingTitle {
                source_path: url.to_string(),
            });
        }

        Ok(Self {
            title: title.to_string(),
            date,
            updated: None,
            description: description.to_string(),
            url: validate_site_path(url)?,
            tags,
            content: String::new(),
            source: String::new(),
        })
    }

    /// Tag labels, without blank ones or ones with no usable slug (`!!!`)
    pub fn tag_labels(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !slug::slugify(t).is_empty())
    }
}

/// A standalone page (About, Me, Sponsor)
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,
    pub description: String,
    pub url: String,
    /// `page` or `profile`
    pub layout: String,
    #[serde(skip)]
    pub content: String,
    #[serde(skip)]
    pub source: String,
}

/// A documentation article inside a doc section
#[derive(Debug, Clone, Serialize)]
pub struct Doc {
    pub title: String,
    pub description: String,
    /// Section key (`devops`, `backend`)
    pub section: String,
    pub slug: String,
    pub order: Option<i64>,
    pub url: String,
    /// Section landing page (`index.md`)
    pub is_index: bool,
    #[serde(skip)]
    pub content: String,
    /// Rendered table of contents, empty when the doc has no headings
    #[serde(skip)]
    pub toc: String,
    #[serde(skip)]
    pub source: String,
}

/// Parse a front-matter date into a calendar date
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, either followed by a time, and RFC 3339.
pub fn parse_date(value: &str) -> Result<NaiveDate, ContentError> {
    let s = value.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    Err(ContentError::InvalidDate {
        value: value.to_string(),
    })
}

/// Check that `url` is a site-relative path and return it
pub fn validate_site_path(url: &str) -> Result<String, ContentError> {
    let invalid = || ContentError::InvalidUrl {
        url: url.to_string(),
    };

    if !url.starts_with('/') || url.starts_with("//") {
        return Err(invalid());
    }
    if url.contains("://") || url.contains(['?', '#', '"', '\'', '<', '>']) {
        return Err(invalid());
    }
    if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid());
    }
    if url.split('/').any(|segment| segment == "..") {
        return Err(invalid());
    }

    Ok(url.to_string())
}

/// Output file for a site-relative url (`/a/b/` -> `a/b/index.html`)
pub fn output_file(url: &str) -> PathBuf {
    let clean = url.trim_matches('/');
    if clean.ends_with(".html") {
        PathBuf::from(clean)
    } else if clean.is_empty() {
        PathBuf::from("index.html")
    } else {
        PathBuf::from(clean).join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post() {
        let post = Post::new(
            "Hello",
            "2024-06-15",
            "First post",
            "/posts/hello/",
            vec!["backend".into()],
        )
        .unwrap();
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(post.url, "/posts/hello/");
    }

    #[test]
    fn test_tag_labels_skip_unusable() {
        let post = Post::new(
            "Hello",
            "2024-06-15",
            "",
            "/posts/hello/",
            vec![" devops ".into(), "".into(), "!!!".into(), "Backend".into()],
        )
        .unwrap();
        assert_eq!(post.tag_labels().collect::<Vec<_>>(), vec!["devops", "Backend"]);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15").unwrap(), expected);
        assert_eq!(parse_date("2024/01/15").unwrap(), expected);
        assert_eq!(parse_date("2024-01-15 10:30:00").unwrap(), expected);
        assert_eq!(parse_date("2024-01-15 10:30").unwrap(), expected);
        assert_eq!(parse_date("2024-01-15T10:30:00").unwrap(), expected);
        assert_eq!(parse_date("2024-01-15T10:30:00+08:00").unwrap(), expected);
    }

    #[test]
    fn test_invalid_date() {
        assert_eq!(
            parse_date("2024-13-40"),
            Err(ContentError::InvalidDate {
                value: "2024-13-40".to_string()
            })
        );
        assert!(parse_date("yesterday").is_err());
        assert!(Post::new("T", "not a date", "", "/posts/t/", vec![]).is_err());
    }

    #[test]
    fn test_invalid_urls() {
        for url in [
            "posts/hello/",
            "https://example.com/",
            "//cdn.example.com/a",
            "/posts/../etc/",
            "/posts/a b/",
            "/search?q=1",
            "/posts/\"onload=\"x/",
        ] {
            assert!(validate_site_path(url).is_err(), "{url} should be rejected");
        }
        assert!(validate_site_path("/").is_ok());
        assert!(validate_site_path("/devops/docker/").is_ok());
    }

    #[test]
    fn test_missing_title() {
        let err = Post::new("  ", "2024-01-01", "", "/posts/x/", vec![]).unwrap_err();
        assert!(matches!(err, ContentError::MissingTitle { .. }));
    }

    #[test]
    fn test_output_file() {
        assert_eq!(output_file("/"), PathBuf::from("index.html"));
        assert_eq!(
            output_file("/posts/hello/"),
            PathBuf::from("posts/hello/index.html")
        );
        assert_eq!(output_file("/404.html"), PathBuf::from("404.html"));
    }
}
