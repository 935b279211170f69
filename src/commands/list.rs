//! List site content

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::listing::{self, TagIndex};
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let loader = ContentLoader::new(site);

    match content_type {
        "post" | "posts" => {
            let posts = loader.load_posts()?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!(
                    "  {} - {} [{}]",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.source
                );
            }
        }
        "page" | "pages" => {
            let pages = loader.load_pages()?;
            println!("Pages ({}):", pages.len());
            for page in pages {
                println!("  {} {} [{}]", page.url, page.title, page.source);
            }
        }
        "doc" | "docs" => {
            for section in &site.config.docs {
                let docs = loader.load_docs(section)?;
                println!("{} ({}):", section.title, docs.len());
                for doc in docs {
                    println!("  {} {} [{}]", doc.url, doc.title, doc.source);
                }
            }
        }
        "tag" | "tags" => {
            let posts = loader.load_posts()?;
            let ordered = listing::ordered_by_date_desc(&posts);
            let index = TagIndex::build(&ordered);
            println!("Tags ({}):", index.len());
            let mut tags: Vec<_> = index.iter().map(|(tag, posts)| (tag, posts.len())).collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1));
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, page, doc, tag",
                content_type
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_list_types() {
        let dir = TempDir::new().unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        for kind in ["post", "pages", "doc", "tags"] {
            run(&site, kind).unwrap();
        }
        assert!(run(&site, "category").is_err());
    }
}
