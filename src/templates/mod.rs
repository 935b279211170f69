//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary. Presentational components (tag chip,
//! post card, profile card, navigation, header, footer, docs sidebar) are Tera
//! macros in `macros.html`; each also has a one-line wrapper template so it can
//! be rendered on its own.

mod data;

pub use data::*;

use anyhow::Result;
use std::collections::HashMap;
use tera::{Context, Tera};

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Views escape their text when built; Tera's escaper would also mangle `/` in URLs
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("macros.html", include_str!("site/macros.html")),
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("posts.html", include_str!("site/posts.html")),
            ("post.html", include_str!("site/post.html")),
            ("tags.html", include_str!("site/tags.html")),
            ("tag.html", include_str!("site/tag.html")),
            ("page.html", include_str!("site/page.html")),
            ("doc.html", include_str!("site/doc.html")),
            ("404.html", include_str!("site/404.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("site/partials/head.html"),
            ),
            // Standalone components
            (
                "components/tag_chip.html",
                include_str!("site/components/tag_chip.html"),
            ),
            (
                "components/post_card.html",
                include_str!("site/components/post_card.html"),
            ),
            (
                "components/profile_card.html",
                include_str!("site/components/profile_card.html"),
            ),
            (
                "components/nav.html",
                include_str!("site/components/nav.html"),
            ),
            (
                "components/header.html",
                include_str!("site/components/header.html"),
            ),
            (
                "components/footer.html",
                include_str!("site/components/footer.html"),
            ),
            (
                "components/sidebar.html",
                include_str!("site/components/sidebar.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("html_escape", html_escape_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Render a single tag chip
    pub fn render_tag_chip(&self, tag: &TagChip) -> Result<String> {
        self.render_component("components/tag_chip.html", "tag", tag)
    }

    /// Render a post card; the tag row is omitted when the post has no tags
    pub fn render_post_card(&self, post: &PostCard) -> Result<String> {
        self.render_component("components/post_card.html", "post", post)
    }

    /// Render the profile card
    pub fn render_profile_card(&self, profile: &ProfileData) -> Result<String> {
        self.render_component("components/profile_card.html", "profile", profile)
    }

    /// Render the navigation bar
    pub fn render_nav(&self, links: &[NavLink]) -> Result<String> {
        self.render_component("components/nav.html", "links", &links)
    }

    /// Render the site header (title and navigation)
    pub fn render_header(&self, site: &SiteData, links: &[NavLink]) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("links", &links);
        self.render("components/header.html", &context)
    }

    /// Render the site footer
    pub fn render_footer(&self, footer: &FooterData) -> Result<String> {
        self.render_component("components/footer.html", "footer", footer)
    }

    /// Render a docs sidebar
    pub fn render_sidebar(&self, sidebar: &SidebarData) -> Result<String> {
        self.render_component("components/sidebar.html", "sidebar", sidebar)
    }

    fn render_component<T: serde::Serialize + ?Sized>(
        &self,
        template_name: &str,
        key: &str,
        value: &T,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert(key, value);
        Ok(self.render(template_name, &context)?.trim().to_string())
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(crate::helpers::strip_html(&s)))
}

/// Tera filter: escape text for element content and attribute values
fn html_escape_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("html_escape", "value", String, value);
    Ok(tera::Value::String(crate::helpers::html_escape(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };

    Ok(tera::Value::String(crate::helpers::truncate(
        &s, length, None,
    )))
}
