//! Content loader - loads posts, pages and docs from the source directory

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{parse_date, validate_site_path, Doc, FrontMatter, MarkdownRenderer, Page, Post};
use crate::config::DocSectionConfig;
use crate::helpers::{squash_whitespace, strip_html, toc, truncate};
use crate::listing;
use crate::Site;

/// Longest description derived from a post body
const DESCRIPTION_LENGTH: usize = 160;

/// Deepest heading level listed in a doc's table of contents
const TOC_DEPTH: usize = 3;

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        let highlight = &site.config.highlight;
        let renderer = MarkdownRenderer::with_options(&highlight.theme, highlight.line_numbers);
        Self { site, renderer }
    }

    /// Load all posts, newest first
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let posts_dir = self.site.source_dir.join(&self.site.config.posts_dir);
        if !posts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for path in markdown_files(&posts_dir) {
            match self.load_post(&path) {
                Ok(Some(post)) => posts.push(post),
                Ok(None) => tracing::debug!("Skipping draft {:?}", path),
                Err(e) => tracing::warn!("Failed to load post {:?}: {}", path, e),
            }
        }

        listing::sort_by_date_desc(&mut posts);

        Ok(posts)
    }

    /// Load a single post; drafts yield `None` unless drafts are rendered
    fn load_post(&self, path: &Path) -> Result<Option<Post>> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        if fm.draft && !self.site.config.render_drafts {
            return Ok(None);
        }

        let date = match fm.date.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => file_date(path),
        };
        let updated = fm.updated.as_deref().map(parse_date).transpose()?;

        let slug = content_slug(path);
        let url = fm.url.clone().unwrap_or_else(|| {
            format!("/{}/{}/", self.site.config.posts_dir.trim_matches('/'), slug)
        });

        let (excerpt_md, full_md) = MarkdownRenderer::split_excerpt(body);
        let content_html = self.renderer.render(&full_md)?;

        let description = match fm.description {
            Some(description) => description,
            None => {
                let summary_html = match excerpt_md {
                    Some(excerpt) => self.renderer.render(&excerpt)?,
                    None => content_html.clone(),
                };
                summarize(&summary_html)
            }
        };

        let title = fm.title.unwrap_or_else(|| file_stem(path));

        let mut post = Post::dated(&title, date, &description, &url, fm.tags)?;
        post.updated = updated;
        post.content = content_html;
        post.source = self.relative_source(path);

        Ok(Some(post))
    }

    /// Load standalone pages: markdown under the source dir outside posts and doc sections
    pub fn load_pages(&self) -> Result<Vec<Page>> {
        let source_dir = &self.site.source_dir;
        if !source_dir.exists() {
            return Ok(Vec::new());
        }

        let reserved: Vec<&str> = std::iter::once(self.site.config.posts_dir.as_str())
            .chain(self.site.config.docs.iter().map(|s| s.source_dir()))
            .collect();

        let mut pages = Vec::new();

        for path in markdown_files(source_dir) {
            let relative = path.strip_prefix(source_dir).unwrap_or(&path);
            let first = relative
                .components()
                .next()
                .and_then(|c| c.as_os_str().to_str())
                .unwrap_or_default();

            // Only top-level components decide; nested files inherit
            if relative.components().count() > 1 && reserved.contains(&first) {
                continue;
            }

            match self.load_page(&path) {
                Ok(Some(page)) => pages.push(page),
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to load page {:?}: {}", path, e),
            }
        }

        pages.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(pages)
    }

    fn load_page(&self, path: &Path) -> Result<Option<Page>> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        if fm.draft && !self.site.config.render_drafts {
            return Ok(None);
        }

        let source = self.relative_source(path);
        let url = match fm.url {
            Some(url) => url,
            None => page_url(&source),
        };
        if url == "/" {
            tracing::warn!("{} would replace the home page, skipping", source);
            return Ok(None);
        }
        let url = validate_site_path(&url)?;

        let content_html = self.renderer.render(body)?;

        Ok(Some(Page {
            title: fm.title.unwrap_or_else(|| file_stem(path)),
            description: fm.description.unwrap_or_default(),
            url,
            layout: fm.layout.unwrap_or_else(|| "page".to_string()),
            content: content_html,
            source,
        }))
    }

    /// Load the docs of one section, in sidebar order
    pub fn load_docs(&self, section: &DocSectionConfig) -> Result<Vec<Doc>> {
        let section_dir = self.site.source_dir.join(section.source_dir());
        if !section_dir.exists() {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();

        for path in markdown_files(&section_dir) {
            match self.load_doc(section, &section_dir, &path) {
                Ok(Some(doc)) => docs.push(doc),
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to load doc {:?}: {}", path, e),
            }
        }

        sort_docs(&mut docs);
        Ok(docs)
    }

    fn load_doc(
        &self,
        section: &DocSectionConfig,
        section_dir: &Path,
        path: &Path,
    ) -> Result<Option<Doc>> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        if fm.draft && !self.site.config.render_drafts {
            return Ok(None);
        }

        let relative = path
            .strip_prefix(section_dir)
            .map_err(|_| anyhow!("{:?} is outside {:?}", path, section_dir))?;
        let slug = doc_slug(relative);
        let is_index = slug.is_empty();

        let url = match fm.url {
            Some(url) => url,
            None if is_index => format!("/{}/", section.key),
            None => format!("/{}/{}/", section.key, slug),
        };
        let url = validate_site_path(&url)?;

        let rendered = self.renderer.render_with_headings(body)?;

        let title = match fm.title {
            Some(title) => title,
            None if is_index => section.title.clone(),
            None => file_stem(path),
        };

        Ok(Some(Doc {
            title,
            description: fm.description.unwrap_or_default(),
            section: section.key.clone(),
            slug,
            order: fm.order,
            url,
            is_index,
            toc: toc(&rendered.headings, TOC_DEPTH),
            content: rendered.html,
            source: self.relative_source(path),
        }))
    }

    fn relative_source(&self, path: &Path) -> String {
        path.strip_prefix(&self.site.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Sort docs by explicit order, then title; the section index comes first
pub fn sort_docs(docs: &mut [Doc]) {
    docs.sort_by(|a, b| {
        b.is_index
            .cmp(&a.is_index)
            .then_with(|| a.order.unwrap_or(i64::MAX).cmp(&b.order.unwrap_or(i64::MAX)))
            .then_with(|| a.title.cmp(&b.title))
    });
}

/// Markdown files under `dir`, skipping `_` and `.` prefixed entries
fn markdown_files(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e
                    .file_name()
                    .to_str()
                    .map(|s| s.starts_with('_') || s.starts_with('.'))
                    .unwrap_or(false)
        })
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_markdown_file(p))
        .collect();
    files.sort();
    files
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string()
}

/// Slug of a post file: its stem, or its folder for `folder/index.md`
fn content_slug(path: &Path) -> String {
    let stem = file_stem(path);
    if stem == "index" {
        if let Some(parent) = path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()) {
            return parent.to_string();
        }
    }
    stem
}

/// Slug of a doc relative to its section dir; empty for the section index
fn doc_slug(relative: &Path) -> String {
    let without_ext = relative.with_extension("");
    let slug = without_ext.to_string_lossy().replace('\\', "/");
    if slug == "index" {
        String::new()
    } else {
        slug.trim_end_matches("/index").to_string()
    }
}

/// URL of a standalone page from its source path
///
/// `about.md` -> `/about/`, `sponsor/index.md` -> `/sponsor/`, `404.md` -> `/404.html`
fn page_url(source: &str) -> String {
    let without_ext = source
        .trim_end_matches(".md")
        .trim_end_matches(".markdown");

    if without_ext == "404" {
        return "/404.html".to_string();
    }
    if without_ext == "index" {
        return "/".to_string();
    }
    let path = without_ext.trim_end_matches("/index");
    format!("/{}/", path)
}

/// Plain-text summary of rendered HTML
fn summarize(html: &str) -> String {
    let text = squash_whitespace(&strip_html(html));
    truncate(&text, DESCRIPTION_LENGTH, None)
}

/// Date of a post without a `date` field: its file's modification day
fn file_date(path: &Path) -> NaiveDate {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| chrono::DateTime::<Local>::from(t).date_naive())
        .unwrap_or_else(|_| Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(dir: &TempDir) -> Site {
        Site::with_config(dir.path(), SiteConfig::default())
    }

    #[test]
    fn test_load_posts_sorted_and_validated() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(
            &source,
            "posts/first.md",
            "---\ntitle: First\ndate: 2024-01-01\ndescription: Hello\ntags: [backend, devops]\n---\nBody",
        );
        write(
            &source,
            "posts/second.md",
            "---\ntitle: Second\ndate: 2024-06-15\n---\nSummary here.\n<!-- more -->\nRest",
        );
        write(
            &source,
            "posts/broken.md",
            "---\ntitle: Broken\ndate: 2024-02-30\n---\nBody",
        );
        write(
            &source,
            "posts/draft.md",
            "---\ntitle: Draft\ndate: 2025-01-01\ndraft: true\n---\nBody",
        );

        let site = site(&dir);
        let posts = ContentLoader::new(&site).load_posts().unwrap();

        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "First"]);
        assert_eq!(posts[0].url, "/posts/second/");
        assert_eq!(posts[0].description, "Summary here.");
        assert_eq!(posts[1].tags, vec!["backend", "devops"]);
        assert_eq!(posts[1].source, "posts/first.md");
    }

    #[test]
    fn test_missing_posts_dir() {
        let dir = TempDir::new().unwrap();
        let site = site(&dir);
        assert!(ContentLoader::new(&site).load_posts().unwrap().is_empty());
    }

    #[test]
    fn test_load_pages_skips_posts_and_docs() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(&source, "about.md", "---\ntitle: About\nlayout: profile\n---\nHi");
        write(&source, "sponsor/index.md", "---\ntitle: Sponsor\n---\nThanks");
        write(&source, "404.md", "---\ntitle: Lost\n---\nNothing here");
        write(&source, "posts/p.md", "---\ntitle: P\ndate: 2024-01-01\n---\n");
        write(&source, "devops/docker.md", "---\ntitle: Docker\n---\n");
        write(&source, "_drafts/wip.md", "---\ntitle: WIP\n---\n");

        let site = site(&dir);
        let pages = ContentLoader::new(&site).load_pages().unwrap();
        let urls: Vec<_> = pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["/404.html", "/about/", "/sponsor/"]);
        assert_eq!(pages[1].layout, "profile");
    }

    #[test]
    fn test_load_docs() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(&source, "devops/index.md", "Welcome to the DevOps notes");
        write(
            &source,
            "devops/nginx.md",
            "---\ntitle: Nginx\norder: 2\n---\n## Install\n\n## Configure\n",
        );
        write(&source, "devops/docker.md", "---\ntitle: Docker\norder: 1\n---\nText");
        write(&source, "devops/ci/jenkins.md", "---\ntitle: Jenkins\n---\nText");

        let site = site(&dir);
        let section = site.config.doc_section("devops").unwrap().clone();
        let docs = ContentLoader::new(&site).load_docs(&section).unwrap();

        let slugs: Vec<_> = docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["", "docker", "nginx", "ci/jenkins"]);
        assert!(docs[0].is_index);
        assert_eq!(docs[0].title, "DevOps");
        assert_eq!(docs[0].url, "/devops/");
        assert_eq!(docs[3].url, "/devops/ci/jenkins/");
        assert!(docs[2].toc.contains("href=\"#install\""));
        assert!(docs[1].toc.is_empty());
    }

    #[test]
    fn test_page_url() {
        assert_eq!(page_url("about.md"), "/about/");
        assert_eq!(page_url("sponsor/index.md"), "/sponsor/");
        assert_eq!(page_url("404.md"), "/404.html");
        assert_eq!(page_url("index.md"), "/");
    }
}
