//! Generator module - writes the static site using the built-in Tera templates

use anyhow::{anyhow, Result};
use chrono::Datelike;
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::config::DocSectionConfig;
use crate::content::{output_file, Doc, Page, Post};
use crate::helpers::{
    absolutize_urls, date_iso, date_rfc3339, escape_xml, format_date, full_url_for, html_escape,
    strip_invalid_xml_chars, tag_url, url_for,
};
use crate::listing::{self, TagIndex};
use crate::templates::{
    nav_links, post_cards, FooterData, NavPost, PostCard, ProfileData, SidebarData, SiteData,
    TagChip, TemplateRenderer, YearGroup,
};
use crate::Site;

/// Stylesheet written to `css/style.css`
const STYLESHEET: &str = include_str!("../templates/site/assets/style.css");

/// URL of the not-found page
const NOT_FOUND_URL: &str = "/404.html";

/// A documentation section with its loaded docs
pub struct DocSection {
    pub config: DocSectionConfig,
    pub docs: Vec<Doc>,
}

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
    site_data: SiteData,
    footer: FooterData,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let current_year = chrono::Local::now().year();

        Ok(Self {
            site: site.clone(),
            renderer,
            site_data: SiteData::from_config(&site.config),
            footer: FooterData::from_config(&site.config, current_year),
        })
    }

    /// Generate the entire site
    pub fn generate(&self, posts: &[Post], pages: &[Page], sections: &[DocSection]) -> Result<()> {
        fs::create_dir_all(&self.site.public_dir)?;

        self.write_file("css/style.css", STYLESHEET)?;
        self.copy_source_assets()?;

        let ordered = listing::ordered_by_date_desc(posts);

        self.generate_index(&ordered)?;
        self.generate_posts_archive(&ordered)?;
        self.generate_post_pages(&ordered)?;
        self.generate_tag_pages(&ordered)?;
        self.generate_pages(pages)?;

        for section in sections {
            self.generate_doc_section(section)?;
        }

        self.generate_post_feed(&ordered)?;
        self.generate_atom_feed(&ordered)?;

        Ok(())
    }

    /// Create a base context with the page shell variables
    ///
    /// `title` is escaped here; `description` is plain text that the head
    /// template strips, truncates and escapes.
    fn create_base_context(&self, current_path: &str, title: &str, description: &str) -> Context {
        let config = &self.site.config;
        let description = if description.is_empty() {
            config.description.as_str()
        } else {
            description
        };

        let mut context = Context::new();
        context.insert("site", &self.site_data);
        context.insert("nav", &nav_links(config, current_path));
        context.insert("footer", &self.footer);
        context.insert("profile", &ProfileData::from_config(config));
        context.insert("current_path", current_path);
        context.insert("page_title", &html_escape(title));
        context.insert("page_description", description);
        context
    }

    /// Home page: profile card and every post as a card, newest first
    fn generate_index(&self, posts: &[&Post]) -> Result<()> {
        let mut context = self.create_base_context("/", "", "");
        context.insert("posts", &post_cards(&self.site.config, posts));

        let html = self.renderer.render("index.html", &context)?;
        self.write_page("/", &html)?;
        tracing::info!("Generated home page with {} posts", posts.len());
        Ok(())
    }

    /// Posts archive grouped by year
    fn generate_posts_archive(&self, posts: &[&Post]) -> Result<()> {
        let config = &self.site.config;
        let years: Vec<YearGroup> = listing::group_by_year(posts)
            .into_iter()
            .map(|(year, posts)| YearGroup {
                year,
                posts: post_cards(config, &posts),
            })
            .collect();

        let url = format!("/{}/", config.posts_dir.trim_matches('/'));
        let mut context = self.create_base_context(&url, "Posts", "");
        context.insert("years", &years);
        context.insert("total", &posts.len());

        let html = self.renderer.render("posts.html", &context)?;
        self.write_page(&url, &html)
    }

    /// Individual post pages with previous (older) and next (newer) links
    fn generate_post_pages(&self, posts: &[&Post]) -> Result<()> {
        let config = &self.site.config;

        for (i, post) in posts.iter().enumerate() {
            let prev_post = posts.get(i + 1).map(|p| NavPost::from_post(config, p));
            let next_post = i
                .checked_sub(1)
                .and_then(|j| posts.get(j))
                .map(|p| NavPost::from_post(config, p));

            let mut context = self.create_base_context(&post.url, &post.title, &post.description);
            context.insert("post", &PostCard::from_post(config, post));
            context.insert("content", &post.content);
            context.insert(
                "updated",
                &post
                    .updated
                    .filter(|u| *u != post.date)
                    .map(|u| format_date(&u, &config.date_format)),
            );
            context.insert("prev_post", &prev_post);
            context.insert("next_post", &next_post);

            let html = self.renderer.render("post.html", &context)?;
            self.write_page(&post.url, &html)?;
        }

        Ok(())
    }

    /// Tag cloud and one page per tag
    fn generate_tag_pages(&self, posts: &[&Post]) -> Result<()> {
        let config = &self.site.config;
        let index = TagIndex::build(posts);
        let tags_url = format!("/{}/", config.tag_dir.trim_matches('/'));

        let chips: Vec<TagChip> = index
            .iter()
            .map(|(tag, posts)| TagChip::new(config, tag).with_count(posts.len()))
            .collect();

        let mut context = self.create_base_context(&tags_url, "Tags", "");
        context.insert("tags", &chips);
        let html = self.renderer.render("tags.html", &context)?;
        self.write_page(&tags_url, &html)?;

        for (tag, tag_posts) in index.iter() {
            let url = tag_url(config, tag);
            let title = format!("Tag: {}", tag);

            let mut context = self.create_base_context(&url, &title, "");
            context.insert("tag_name", &html_escape(tag));
            context.insert("posts", &post_cards(config, tag_posts));

            let html = self.renderer.render("tag.html", &context)?;
            self.write_page(&url, &html)?;
        }

        tracing::info!("Generated {} tag pages", index.len());
        Ok(())
    }

    /// Standalone pages; a `404` page replaces the built-in one
    fn generate_pages(&self, pages: &[Page]) -> Result<()> {
        let mut has_not_found = false;

        for page in pages {
            if page.url == NOT_FOUND_URL {
                has_not_found = true;
                self.generate_not_found(&page.title, &page.content)?;
                continue;
            }

            let mut context = self.create_base_context(&page.url, &page.title, &page.description);
            context.insert("content", &page.content);
            context.insert("show_profile", &(page.layout == "profile"));

            let html = self.renderer.render("page.html", &context)?;
            self.write_page(&page.url, &html)?;
        }

        if !has_not_found {
            self.generate_not_found("Page not found", "")?;
        }

        tracing::info!("Generated {} pages", pages.len());
        Ok(())
    }

    fn generate_not_found(&self, title: &str, content: &str) -> Result<()> {
        let mut context = self.create_base_context(NOT_FOUND_URL, title, "");
        context.insert("content", content);
        let html = self.renderer.render("404.html", &context)?;
        self.write_page(NOT_FOUND_URL, &html)
    }

    /// One docs section: its landing page and every doc, each with the sidebar
    fn generate_doc_section(&self, section: &DocSection) -> Result<()> {
        let config = &self.site.config;
        let key = &section.config.key;
        let section_url = format!("/{}/", key);

        let children: Vec<NavPost> = section
            .docs
            .iter()
            .filter(|d| !d.is_index)
            .map(|d| NavPost {
                title: html_escape(&d.title),
                url: url_for(config, &d.url),
            })
            .collect();
        let no_children: &[NavPost] = &[];

        for doc in &section.docs {
            let sidebar = SidebarData::build(config, &section.config, &section.docs, &doc.url);

            let mut context = self.create_base_context(&doc.url, &doc.title, &doc.description);
            context.insert("sidebar", &sidebar);
            context.insert("content", &doc.content);
            context.insert("toc", &doc.toc);
            context.insert(
                "children",
                if doc.is_index { &children[..] } else { no_children },
            );

            let html = self.renderer.render("doc.html", &context)?;
            self.write_page(&doc.url, &html)?;
        }

        // Sections without an index.md still get a landing page
        if !section.docs.iter().any(|d| d.is_index) {
            let sidebar = SidebarData::build(config, &section.config, &section.docs, &section_url);
            let mut context = self.create_base_context(&section_url, &section.config.title, "");
            context.insert("sidebar", &sidebar);
            context.insert("content", "");
            context.insert("toc", "");
            context.insert("children", &children);

            let html = self.renderer.render("doc.html", &context)?;
            self.write_page(&section_url, &html)?;
        }

        tracing::info!("Generated {} docs in {}", section.docs.len(), key);
        Ok(())
    }

    /// Generated post feed: the post records as JSON, newest first
    fn generate_post_feed(&self, posts: &[&Post]) -> Result<()> {
        let records: Vec<serde_json::Value> = posts
            .iter()
            .map(|p| {
                serde_json::json!({
                    "title": p.title,
                    "date": date_iso(&p.date),
                    "description": p.description,
                    "url": p.url,
                    "tags": p.tag_labels().collect::<Vec<_>>(),
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&records)?;
        self.write_file("posts.json", &json)?;
        tracing::info!("Generated posts.json");
        Ok(())
    }

    /// Generate Atom feed of the most recent posts
    fn generate_atom_feed(&self, posts: &[&Post]) -> Result<()> {
        let config = &self.site.config;
        let base_url = config.url.trim_end_matches('/');

        let updated = posts
            .first()
            .map(|p| date_rfc3339(&p.updated.unwrap_or(p.date)))
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        if !config.subtitle.is_empty() {
            feed.push_str(&format!(
                "  <subtitle>{}</subtitle>\n",
                escape_xml(&config.subtitle)
            ));
        }
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            full_url_for(config, "atom.xml")
        ));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", full_url_for(config, "/")));
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}</id>\n", full_url_for(config, "/")));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        for post in posts.iter().take(config.feed_limit) {
            let link = full_url_for(config, &post.url);
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", link));
            feed.push_str(&format!("    <id>{}</id>\n", link));
            feed.push_str(&format!(
                "    <published>{}</published>\n",
                date_rfc3339(&post.date)
            ));
            feed.push_str(&format!(
                "    <updated>{}</updated>\n",
                date_rfc3339(&post.updated.unwrap_or(post.date))
            ));
            if !post.description.is_empty() {
                feed.push_str(&format!(
                    "    <summary>{}</summary>\n",
                    escape_xml(&post.description)
                ));
            }
            for tag in post.tag_labels() {
                feed.push_str(&format!("    <category term=\"{}\"/>\n", escape_xml(tag)));
            }
            let content = strip_invalid_xml_chars(&absolutize_urls(&post.content, base_url))
                .replace("]]>", "]]]]><![CDATA[>");
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                content
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        self.write_file("atom.xml", &feed)?;
        tracing::info!("Generated atom.xml");
        Ok(())
    }

    /// Copy non-markdown files from the source directory
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.site.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(source_dir)
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
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str());
            if matches!(ext, Some("md") | Some("markdown")) {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            tracing::debug!("Copied: {:?} -> {:?}", path, dest);
        }

        Ok(())
    }

    /// Write a rendered page to the output file for its site-relative url
    fn write_page(&self, url: &str, html: &str) -> Result<()> {
        let relative = output_file(url);
        self.write_file(&relative, html)
    }

    fn write_file<P: AsRef<Path>>(&self, relative: P, content: &str) -> Result<()> {
        let output_path = self.site.public_dir.join(relative.as_ref());
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, content)
            .map_err(|e| anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn post(title: &str, date: &str, tags: &[&str]) -> Post {
        let mut post = Post::new(
            title,
            date,
            &format!("About {}", title),
            &format!("/posts/{}/", slug::slugify(title)),
            tags.iter().map(|t| t.to_string()).collect(),
        )
        .unwrap();
        post.content = format!("<p>{} body</p>", title);
        post
    }

    fn doc(slug: &str, title: &str) -> Doc {
        Doc {
            title: title.to_string(),
            description: String::new(),
            section: "devops".to_string(),
            slug: slug.to_string(),
            order: None,
            url: format!("/devops/{}/", slug),
            is_index: false,
            content: format!("<p>{}</p>", title),
            toc: String::new(),
            source: String::new(),
        }
    }

    fn generate(posts: &[Post], pages: &[Page], sections: &[DocSection]) -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        Generator::new(&site)
            .unwrap()
            .generate(posts, pages, sections)
            .unwrap();
        (dir, site)
    }

    fn read(site: &Site, relative: &str) -> String {
        fs::read_to_string(site.public_dir.join(relative)).unwrap()
    }

    #[test]
    fn test_home_lists_posts_newest_first() {
        let posts = vec![
            post("January", "2024-01-01", &[]),
            post("June", "2024-06-15", &["backend", "devops"]),
            post("December", "2023-12-31", &[]),
        ];
        let (_dir, site) = generate(&posts, &[], &[]);

        let html = read(&site, "index.html");
        let june = html.find(">June</a>").unwrap();
        let january = html.find(">January</a>").unwrap();
        let december = html.find(">December</a>").unwrap();
        assert!(june < january && january < december);
        assert_eq!(html.matches("class=\"post-card\"").count(), 3);
        assert_eq!(html.matches("class=\"tag-row\"").count(), 1);
        assert!(html.contains("profile-card"));
        assert!(html.contains(r#"<a href="/" class="active" aria-current="page">Home</a>"#));
    }

    #[test]
    fn test_empty_site() {
        let (_dir, site) = generate(&[], &[], &[]);
        let html = read(&site, "index.html");
        assert!(html.contains("No posts yet."));
        assert!(!html.contains("post-card\""));
        assert_eq!(read(&site, "posts.json").trim(), "[]");
        assert!(site.public_dir.join("404.html").exists());
        assert!(site.public_dir.join("css/style.css").exists());
        assert!(read(&site, "tags/index.html").contains("No tags yet."));
    }

    #[test]
    fn test_post_pages_and_feeds() {
        let posts = vec![
            post("Older", "2023-05-01", &["devops"]),
            post("Newer", "2024-05-01", &["devops", "backend"]),
        ];
        let (_dir, site) = generate(&posts, &[], &[]);

        let newer = read(&site, "posts/newer/index.html");
        assert!(newer.contains("<p>Newer body</p>"));
        assert!(newer.contains(r#"class="post-prev" href="/posts/older/""#));
        assert!(!newer.contains("post-next"));

        let feed: Vec<serde_json::Value> =
            serde_json::from_str(&read(&site, "posts.json")).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0]["title"], "Newer");
        assert_eq!(feed[0]["date"], "2024-05-01");
        assert_eq!(feed[0]["tags"], serde_json::json!(["devops", "backend"]));
        assert_eq!(feed[1]["url"], "/posts/older/");

        let atom = read(&site, "atom.xml");
        assert!(atom.contains("<link href=\"http://example.com/posts/newer/\"/>"));
        assert!(atom.contains("<category term=\"backend\"/>"));

        let archive = read(&site, "posts/index.html");
        assert!(archive.find(">2024</h2>").unwrap() < archive.find(">2023</h2>").unwrap());
    }

    #[test]
    fn test_tag_pages() {
        let posts = vec![
            post("One", "2024-01-01", &["devops"]),
            post("Two", "2024-02-01", &["devops", "Backend"]),
            post("Three", "2023-05-01", &["backend"]),
        ];
        let (_dir, site) = generate(&posts, &[], &[]);

        let tags = read(&site, "tags/index.html");
        assert!(tags.contains(r#"href="/tags/devops/">devops<span class="tag-count">2</span>"#));
        assert_eq!(tags.matches(r#"href="/tags/backend/""#).count(), 1);
        assert!(tags.contains(r#"href="/tags/backend/">Backend<span class="tag-count">2</span>"#));

        let devops = read(&site, "tags/devops/index.html");
        assert!(devops.find(">Two</a>").unwrap() < devops.find(">One</a>").unwrap());

        let backend = read(&site, "tags/backend/index.html");
        assert!(backend.contains(">Two</a>"));
        assert!(backend.contains(">Three</a>"));
    }

    #[test]
    fn test_titles_and_descriptions_are_escaped() {
        let mut generic = post("Generics", "2024-01-01", &[]);
        generic.title = "Generics <T> & co".to_string();
        generic.description = r#"Say "hi" <b>"#.to_string();
        let pages = vec![Page {
            title: "Q&A <live>".to_string(),
            description: String::new(),
            url: "/qa/".to_string(),
            layout: "page".to_string(),
            content: String::new(),
            source: "qa.md".to_string(),
        }];
        let (_dir, site) = generate(&[generic], &pages, &[]);

        let html = read(&site, "posts/generics/index.html");
        assert!(html.contains("<title>Generics &lt;T&gt; &amp; co | docblog</title>"));
        assert!(html.contains(r#"<meta name="description" content="Say &quot;hi&quot; ">"#));
        assert!(!html.contains("<T>"));

        let page = read(&site, "qa/index.html");
        assert!(page.contains(r#"<h1 class="page-title">Q&amp;A &lt;live&gt;</h1>"#));
    }

    #[test]
    fn test_pages_and_custom_not_found() {
        let pages = vec![
            Page {
                title: "About".to_string(),
                description: String::new(),
                url: "/about/".to_string(),
                layout: "profile".to_string(),
                content: "<p>About me</p>".to_string(),
                source: "about.md".to_string(),
            },
            Page {
                title: "Lost".to_string(),
                description: String::new(),
                url: "/404.html".to_string(),
                layout: "page".to_string(),
                content: "<p>Custom not found</p>".to_string(),
                source: "404.md".to_string(),
            },
        ];
        let (_dir, site) = generate(&[], &pages, &[]);

        let about = read(&site, "about/index.html");
        assert!(about.contains("<p>About me</p>"));
        assert!(about.contains("profile-card"));
        assert!(about.contains(r#"class="active" aria-current="page">About</a>"#));
        assert!(read(&site, "404.html").contains("Custom not found"));
    }

    #[test]
    fn test_doc_section_without_index() {
        let config = SiteConfig::default();
        let section = DocSection {
            config: config.doc_section("devops").unwrap().clone(),
            docs: vec![doc("docker", "Docker"), doc("nginx", "Nginx")],
        };
        let (_dir, site) = generate(&[], &[], &[section]);

        let docker = read(&site, "devops/docker/index.html");
        assert!(docker.contains("docs-sidebar"));
        assert!(docker.contains(r#"<a href="/devops/docker/" class="active">Docker</a>"#));
        assert!(docker.contains(r#"<a href="/devops/nginx/">Nginx</a>"#));

        let landing = read(&site, "devops/index.html");
        assert!(landing.contains("doc-children"));
        assert!(landing.contains(r#"class="active" aria-current="page">DevOps</a>"#));
    }
}
