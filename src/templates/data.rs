//! Data structures for template context
//!
//! Text fields are HTML-escaped when the view is built; templates print them as-is.

use serde::Serialize;

use crate::config::{DocSectionConfig, LinkEntry, SiteConfig};
use crate::content::{Doc, Post};
use crate::helpers::{
    date_iso, format_date, html_escape, is_active_path, is_external, tag_url, url_for,
};

/// Site-wide values used by the page shell
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub language: String,
    pub home: String,
    pub css_url: String,
    pub feed_url: String,
    pub generator_version: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: html_escape(&config.title),
            subtitle: html_escape(&config.subtitle),
            description: html_escape(&config.description),
            language: config.language.clone(),
            home: url_for(config, "/"),
            css_url: url_for(config, "css/style.css"),
            feed_url: url_for(config, "atom.xml"),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A navigation entry as rendered for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub name: String,
    pub url: String,
    pub active: bool,
    pub external: bool,
}

/// Navigation for the page at `current_path`
pub fn nav_links(config: &SiteConfig, current_path: &str) -> Vec<NavLink> {
    config
        .nav
        .iter()
        .map(|entry| NavLink {
            name: html_escape(&entry.name),
            url: url_for(config, &entry.path),
            active: is_active_path(&entry.path, current_path),
            external: is_external(&entry.path),
        })
        .collect()
}

/// A labelled link
#[derive(Debug, Clone, Serialize)]
pub struct LinkData {
    pub name: String,
    pub url: String,
}

fn links(config: &SiteConfig, entries: &[LinkEntry]) -> Vec<LinkData> {
    entries
        .iter()
        .map(|link| LinkData {
            name: html_escape(&link.name),
            url: url_for(config, &link.url),
        })
        .collect()
}

/// Profile card
#[derive(Debug, Clone, Serialize)]
pub struct ProfileData {
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub location: String,
    pub links: Vec<LinkData>,
}

impl ProfileData {
    pub fn from_config(config: &SiteConfig) -> Self {
        let profile = &config.profile;
        let name = if profile.name.is_empty() {
            &config.author
        } else {
            &profile.name
        };

        Self {
            name: html_escape(name),
            avatar: if profile.avatar.is_empty() {
                String::new()
            } else {
                url_for(config, &profile.avatar)
            },
            bio: html_escape(&profile.bio),
            location: html_escape(&profile.location),
            links: links(config, &profile.links),
        }
    }
}

/// Footer shell
#[derive(Debug, Clone, Serialize)]
pub struct FooterData {
    pub copyright: String,
    /// `2019-2024`, or just the current year
    pub years: String,
    pub links: Vec<LinkData>,
}

impl FooterData {
    pub fn from_config(config: &SiteConfig, current_year: i32) -> Self {
        let footer = &config.footer;
        let holder = if footer.copyright.is_empty() {
            &config.author
        } else {
            &footer.copyright
        };
        let years = match footer.since {
            Some(since) if since < current_year => format!("{}-{}", since, current_year),
            _ => current_year.to_string(),
        };

        Self {
            copyright: html_escape(holder),
            years,
            links: links(config, &footer.links),
        }
    }
}

/// A tag chip
#[derive(Debug, Clone, Serialize)]
pub struct TagChip {
    pub label: String,
    pub url: String,
    pub count: Option<usize>,
}

impl TagChip {
    pub fn new(config: &SiteConfig, label: &str) -> Self {
        Self {
            label: html_escape(label),
            url: url_for(config, &tag_url(config, label)),
            count: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// A post card in a listing
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub url: String,
    pub date: String,
    pub date_iso: String,
    pub description: String,
    pub tags: Vec<TagChip>,
}

impl PostCard {
    pub fn from_post(config: &SiteConfig, post: &Post) -> Self {
        Self {
            title: html_escape(&post.title),
            url: url_for(config, &post.url),
            date: format_date(&post.date, &config.date_format),
            date_iso: date_iso(&post.date),
            description: html_escape(&post.description),
            tags: post
                .tag_labels()
                .map(|label| TagChip::new(config, label))
                .collect(),
        }
    }
}

/// Cards for a list of posts, preserving order
pub fn post_cards(config: &SiteConfig, posts: &[&Post]) -> Vec<PostCard> {
    posts
        .iter()
        .map(|post| PostCard::from_post(config, post))
        .collect()
}

/// Posts of one year on the posts archive
#[derive(Debug, Clone, Serialize)]
pub struct YearGroup {
    pub year: i32,
    pub posts: Vec<PostCard>,
}

/// Previous/next link on a post page
#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

impl NavPost {
    pub fn from_post(config: &SiteConfig, post: &Post) -> Self {
        Self {
            title: html_escape(&post.title),
            url: url_for(config, &post.url),
        }
    }
}

/// Docs section sidebar
#[derive(Debug, Clone, Serialize)]
pub struct SidebarData {
    pub title: String,
    pub url: String,
    pub groups: Vec<SidebarGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SidebarGroup {
    pub title: String,
    pub items: Vec<SidebarLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SidebarLink {
    pub title: String,
    pub url: String,
    pub active: bool,
}

impl SidebarData {
    /// Build the sidebar of `section` with the doc at `current_url` highlighted
    ///
    /// Uses the configured groups when present, otherwise one untitled group
    /// with every doc except the section index.
    pub fn build(
        config: &SiteConfig,
        section: &DocSectionConfig,
        docs: &[Doc],
        current_url: &str,
    ) -> Self {
        let link = |doc: &Doc| SidebarLink {
            title: html_escape(&doc.title),
            url: url_for(config, &doc.url),
            active: doc.url == current_url,
        };

        let groups = if section.sidebar.is_empty() {
            vec![SidebarGroup {
                title: String::new(),
                items: docs.iter().filter(|d| !d.is_index).map(link).collect(),
            }]
        } else {
            section
                .sidebar
                .iter()
                .map(|group| SidebarGroup {
                    title: html_escape(&group.title),
                    items: group
                        .items
                        .iter()
                        .filter_map(|slug| {
                            let doc = docs.iter().find(|d| &d.slug == slug);
                            if doc.is_none() {
                                tracing::warn!(
                                    "Sidebar of {} lists unknown doc `{}`",
                                    section.key,
                                    slug
                                );
                            }
                            doc.map(link)
                        })
                        .collect(),
                })
                .collect()
        };

        Self {
            title: html_escape(&section.title),
            url: url_for(config, &format!("/{}/", section.key)),
            groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NavEntry, SidebarGroupConfig};

    fn doc(slug: &str, title: &str) -> Doc {
        Doc {
            title: title.to_string(),
            description: String::new(),
            section: "devops".to_string(),
            slug: slug.to_string(),
            order: None,
            url: if slug.is_empty() {
                "/devops/".to_string()
            } else {
                format!("/devops/{}/", slug)
            },
            is_index: slug.is_empty(),
            content: String::new(),
            toc: String::new(),
            source: String::new(),
        }
    }

    #[test]
    fn test_nav_marks_current_entry() {
        let config = SiteConfig::default();
        let nav = nav_links(&config, "/devops/docker/");
        let active: Vec<_> = nav.iter().filter(|l| l.active).map(|l| l.name.as_str()).collect();
        assert_eq!(active, vec!["DevOps"]);

        let home = nav_links(&config, "/");
        let active: Vec<_> = home.iter().filter(|l| l.active).map(|l| l.name.as_str()).collect();
        assert_eq!(active, vec!["Home"]);
    }

    #[test]
    fn test_nav_external_entry() {
        let config = SiteConfig {
            nav: vec![NavEntry {
                name: "Sponsor".to_string(),
                path: "https://github.com/sponsors/me".to_string(),
            }],
            ..SiteConfig::default()
        };
        let nav = nav_links(&config, "/");
        assert!(nav[0].external);
        assert!(!nav[0].active);
        assert_eq!(nav[0].url, "https://github.com/sponsors/me");
    }

    #[test]
    fn test_post_card() {
        let config = SiteConfig::default();
        let post = Post::new(
            "Tokio & friends",
            "2024-06-15",
            "Async <runtime> notes",
            "/posts/tokio/",
            vec!["backend".to_string(), " ".to_string(), "devops".to_string()],
        )
        .unwrap();
        let card = PostCard::from_post(&config, &post);
        assert_eq!(card.title, "Tokio &amp; friends");
        assert_eq!(card.description, "Async &lt;runtime&gt; notes");
        assert_eq!(card.date, "2024-06-15");
        let labels: Vec<_> = card.tags.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["backend", "devops"]);
        assert_eq!(card.tags[0].url, "/tags/backend/");

        let post = Post::new("Odd", "2024-06-15", "", "/posts/odd/", vec!["!!!".to_string()])
            .unwrap();
        let card = PostCard::from_post(&config, &post);
        assert!(card.tags.is_empty());
    }

    #[test]
    fn test_footer_years() {
        let mut config = SiteConfig::default();
        assert_eq!(FooterData::from_config(&config, 2024).years, "2024");
        config.footer.since = Some(2019);
        let footer = FooterData::from_config(&config, 2024);
        assert_eq!(footer.years, "2019-2024");
        assert_eq!(footer.copyright, "John Doe");
    }

    #[test]
    fn test_profile_falls_back_to_author() {
        let config = SiteConfig::default();
        let profile = ProfileData::from_config(&config);
        assert_eq!(profile.name, "John Doe");
        assert!(profile.avatar.is_empty());
    }

    #[test]
    fn test_generated_sidebar() {
        let config = SiteConfig::default();
        let section = config.doc_section("devops").unwrap();
        let docs = vec![doc("", "DevOps"), doc("docker", "Docker"), doc("nginx", "Nginx")];
        let sidebar = SidebarData::build(&config, section, &docs, "/devops/nginx/");
        assert_eq!(sidebar.groups.len(), 1);
        let items: Vec<_> = sidebar.groups[0]
            .items
            .iter()
            .map(|i| (i.title.as_str(), i.active))
            .collect();
        assert_eq!(items, vec![("Docker", false), ("Nginx", true)]);
    }

    #[test]
    fn test_configured_sidebar_skips_unknown() {
        let config = SiteConfig::default();
        let mut section = config.doc_section("devops").unwrap().clone();
        section.sidebar = vec![SidebarGroupConfig {
            title: "Web".to_string(),
            items: vec!["nginx".to_string(), "caddy".to_string(), "docker".to_string()],
        }];
        let docs = vec![doc("docker", "Docker"), doc("nginx", "Nginx")];
        let sidebar = SidebarData::build(&config, &section, &docs, "/devops/");
        let titles: Vec<_> = sidebar.groups[0].items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Nginx", "Docker"]);
        assert_eq!(sidebar.url, "/devops/");
    }
}
