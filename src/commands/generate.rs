//! Generate static files

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::content::loader::ContentLoader;
use crate::generator::{DocSection, Generator};
use crate::{Site, CONFIG_FILE};

/// Load all content and generate the static site
pub fn run(site: &Site) -> Result<()> {
    let start = Instant::now();

    let loader = ContentLoader::new(site);
    let posts = loader.load_posts()?;
    let pages = loader.load_pages()?;

    let mut sections = Vec::with_capacity(site.config.docs.len());
    for section in &site.config.docs {
        let docs = loader.load_docs(section)?;
        sections.push(DocSection {
            config: section.clone(),
            docs,
        });
    }

    tracing::info!(
        "Loaded {} posts, {} pages and {} docs",
        posts.len(),
        pages.len(),
        sections.iter().map(|s| s.docs.len()).sum::<usize>()
    );

    let generator = Generator::new(site)?;
    generator.generate(&posts, &pages, &sections)?;

    tracing::info!("Generated in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Watch the source directory and config, regenerating on change
pub fn watch(site: &Site) -> Result<()> {
    watch_with(site, || {})
}

/// Regenerate after every debounced batch of changes
///
/// `on_rebuild` runs after each successful build. Changes made while a build
/// runs are queued by the debouncer and trigger the next build.
pub fn watch_with<F: FnMut()>(site: &Site, mut on_rebuild: F) -> Result<()> {
    let (tx, rx) = channel();

    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for (path, mode) in watch_paths(site) {
        debouncer.watcher().watch(&path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    for result in rx {
        match result {
            Ok(events) => {
                let changed: Vec<_> = events
                    .iter()
                    .map(|e| e.path.as_path())
                    .filter(|p| is_relevant(p))
                    .collect();
                if changed.is_empty() {
                    continue;
                }

                for path in &changed {
                    tracing::info!("File changed: {}", path.display());
                }

                // Config edits take effect without a restart
                match Site::new(&site.base_dir).and_then(|site| run(&site)) {
                    Ok(()) => on_rebuild(),
                    Err(e) => tracing::error!("Generation failed: {}", e),
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// Paths to watch; missing ones are skipped
fn watch_paths(site: &Site) -> Vec<(PathBuf, RecursiveMode)> {
    [
        (site.source_dir.clone(), RecursiveMode::Recursive),
        (site.base_dir.join(CONFIG_FILE), RecursiveMode::NonRecursive),
    ]
    .into_iter()
    .filter(|(path, _)| path.exists())
    .collect()
}

/// Editor and VCS noise that should not trigger a rebuild
fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}
