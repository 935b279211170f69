//! Create a new post, page or doc

use anyhow::{anyhow, bail, Result};
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Create a new content file from its scaffold and return its path
///
/// Posts go to `source/<posts_dir>/`, pages to `source/`, and docs to the
/// directory of `section`.
pub fn create_post(
    site: &Site,
    title: &str,
    layout: &str,
    section: Option<&str>,
    path: Option<&str>,
) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let target_dir = match layout {
        "post" => site.source_dir.join(&site.config.posts_dir),
        "page" => site.source_dir.clone(),
        "doc" => {
            let key = section.ok_or_else(|| anyhow!("A doc needs --section <key>"))?;
            let section = site.config.doc_section(key).ok_or_else(|| {
                let known: Vec<&str> = site.config.docs.iter().map(|s| s.key.as_str()).collect();
                anyhow!("Unknown docs section `{}`. Available: {}", key, known.join(", "))
            })?;
            site.source_dir.join(section.source_dir())
        }
        other => bail!("Unknown layout: {}. Available: post, page, doc", other),
    };

    let name = match path {
        Some(p) => p.trim_end_matches(".md").to_string(),
        None => slug::slugify(title),
    };
    if name.is_empty() {
        bail!("Cannot derive a file name from title {:?}", title);
    }

    let file_path = target_dir.join(format!("{}.md", name));
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let scaffold_path = site
        .base_dir
        .join("scaffolds")
        .join(format!("{}.md", layout));
    let scaffold = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?
    } else if layout == "post" {
        "---\ntitle: {{ title }}\ndate: {{ date }}\ntags:\n---\n".to_string()
    } else {
        "---\ntitle: {{ title }}\n---\n".to_string()
    };

    let content = scaffold
        .replace("{{ title }}", &yaml_string(title))
        .replace("{{ date }}", &now.format("%Y-%m-%d %H:%M:%S").to_string());

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

/// Quote a title when it would not survive as a plain YAML scalar
fn yaml_string(value: &str) -> String {
    let plain = !value.is_empty()
        && !value.starts_with(|c: char| "-?:,[]{}#&*!|>'\"%@`".contains(c))
        && !value.contains(": ")
        && !value.contains(" #")
        && value.trim() == value;
    if plain {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::FrontMatter;
    use tempfile::TempDir;

    fn site() -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        (dir, site)
    }

    #[test]
    fn test_new_post() {
        let (_dir, site) = site();
        let path = create_post(&site, "My First Post", "post", None, None).unwrap();
        assert_eq!(path, site.source_dir.join("posts/my-first-post.md"));

        let content = fs::read_to_string(&path).unwrap();
        let (fm, _) = FrontMatter::parse(&content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("My First Post"));
        assert!(fm.date.is_some());

        assert!(create_post(&site, "My First Post", "post", None, None).is_err());
    }

    #[test]
    fn test_new_page_and_doc() {
        let (_dir, site) = site();
        let page = create_post(&site, "Uses", "page", None, None).unwrap();
        assert_eq!(page, site.source_dir.join("uses.md"));

        let doc = create_post(&site, "Kubernetes", "doc", Some("devops"), None).unwrap();
        assert_eq!(doc, site.source_dir.join("devops/kubernetes.md"));

        assert!(create_post(&site, "K8s", "doc", None, None).is_err());
        assert!(create_post(&site, "K8s", "doc", Some("frontend"), None).is_err());
        assert!(create_post(&site, "K8s", "gallery", None, None).is_err());
    }

    #[test]
    fn test_title_with_colon_is_quoted() {
        let (_dir, site) = site();
        let path = create_post(&site, "Rust: the \"good\" parts", "post", None, Some("rust"))
            .unwrap();
        assert!(path.ends_with("rust.md"));

        let content = fs::read_to_string(&path).unwrap();
        let (fm, _) = FrontMatter::parse(&content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Rust: the \"good\" parts"));
    }
}
