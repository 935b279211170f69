//! Content module - handles posts, pages, docs and content processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::FrontMatter;
pub use markdown::{Heading, MarkdownRenderer, Rendered};
pub use post::{output_file, parse_date, validate_site_path, Doc, Page, Post};
