//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    pub posts_dir: String,
    pub tag_dir: String,

    // Writing
    pub default_layout: String,
    pub render_drafts: bool,
    pub date_format: String,
    pub feed_limit: usize,
    pub highlight: HighlightConfig,

    // Shell
    pub nav: Vec<NavEntry>,
    pub profile: ProfileConfig,
    pub footer: FooterConfig,

    // Documentation sections
    pub docs: Vec<DocSectionConfig>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "docblog".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            posts_dir: "posts".to_string(),
            tag_dir: "tags".to_string(),

            default_layout: "post".to_string(),
            render_drafts: false,
            date_format: "YYYY-MM-DD".to_string(),
            feed_limit: 20,
            highlight: HighlightConfig::default(),

            nav: default_nav(),
            profile: ProfileConfig::default(),
            footer: FooterConfig::default(),

            docs: vec![
                DocSectionConfig::new("devops", "DevOps"),
                DocSectionConfig::new("backend", "Backend"),
            ],

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Find a documentation section by key
    pub fn doc_section(&self, key: &str) -> Option<&DocSectionConfig> {
        self.docs.iter().find(|s| s.key == key)
    }
}

fn default_nav() -> Vec<NavEntry> {
    [
        ("Home", "/"),
        ("Posts", "/posts/"),
        ("Tags", "/tags/"),
        ("About", "/about/"),
        ("DevOps", "/devops/"),
        ("Backend", "/backend/"),
        ("Me", "/me/"),
        ("Sponsor", "/sponsor/"),
    ]
    .into_iter()
    .map(|(name, path)| NavEntry {
        name: name.to_string(),
        path: path.to_string(),
    })
    .collect()
}

/// A top-level navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    pub name: String,
    pub path: String,
}

/// A labelled outbound link (profile socials, footer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub name: String,
    pub url: String,
}

/// Profile card shown on the home page and `profile` pages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub location: String,
    pub links: Vec<LinkEntry>,
}

/// Footer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    /// Copyright holder; falls back to the site author
    pub copyright: String,
    /// First year of the copyright range, if any
    pub since: Option<i32>,
    pub links: Vec<LinkEntry>,
}

/// A documentation section such as DevOps or Backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocSectionConfig {
    /// Section key, also the URL prefix (`/devops/`)
    pub key: String,
    pub title: String,
    /// Directory under `source_dir`; defaults to the key
    pub dir: Option<String>,
    /// Explicit sidebar; generated from the section's docs when empty
    pub sidebar: Vec<SidebarGroupConfig>,
}

impl DocSectionConfig {
    pub fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            dir: None,
            sidebar: Vec::new(),
        }
    }

    /// Source directory of this section, relative to `source_dir`
    pub fn source_dir(&self) -> &str {
        self.dir.as_deref().unwrap_or(&self.key)
    }
}

/// A titled group of doc slugs in a section sidebar
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarGroupConfig {
    pub title: String,
    pub items: Vec<String>,
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_numbers: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_numbers: true,
        }
    }
}
