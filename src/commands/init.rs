//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Site;

const CONFIG_TEMPLATE: &str = r#"# docblog configuration

# Site
title: My Blog
subtitle: ''
description: 'Notes on DevOps and backend engineering'
author: John Doe
language: en

# URL
url: http://example.com
root: /

# Directory
source_dir: source
public_dir: public
posts_dir: posts
tag_dir: tags

# Writing
default_layout: post
render_drafts: false
date_format: YYYY-MM-DD
feed_limit: 20
highlight:
  theme: base16-ocean.dark
  line_numbers: true

# Navigation
nav:
  - { name: Home, path: / }
  - { name: Posts, path: /posts/ }
  - { name: Tags, path: /tags/ }
  - { name: About, path: /about/ }
  - { name: DevOps, path: /devops/ }
  - { name: Backend, path: /backend/ }
  - { name: Me, path: /me/ }
  - { name: Sponsor, path: /sponsor/ }

# Profile card
profile:
  name: John Doe
  avatar: ''
  bio: 'Writing about infrastructure and services.'
  location: ''
  links:
    - { name: GitHub, url: 'https://github.com/' }

# Footer
footer:
  copyright: ''
  links:
    - { name: Feed, url: /atom.xml }

# Documentation sections
docs:
  - key: devops
    title: DevOps
  - key: backend
    title: Backend
"#;

const POST_SCAFFOLD: &str = r#"---
title: {{ title }}
date: {{ date }}
description:
tags:
---
"#;

const PAGE_SCAFFOLD: &str = r#"---
title: {{ title }}
description:
---
"#;

const DOC_SCAFFOLD: &str = r#"---
title: {{ title }}
description:
order:
---
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let source = target_dir.join("source");

    fs::create_dir_all(source.join("posts"))?;
    fs::create_dir_all(source.join("devops"))?;
    fs::create_dir_all(source.join("backend"))?;
    fs::create_dir_all(target_dir.join("scaffolds"))?;

    write_new(&target_dir.join(crate::CONFIG_FILE), CONFIG_TEMPLATE)?;

    write_new(&target_dir.join("scaffolds/post.md"), POST_SCAFFOLD)?;
    write_new(&target_dir.join("scaffolds/page.md"), PAGE_SCAFFOLD)?;
    write_new(&target_dir.join("scaffolds/doc.md"), DOC_SCAFFOLD)?;

    let now = chrono::Local::now();
    let hello = format!(
        r#"---
title: Hello World
date: {}
description: The first post on this blog.
tags: [devops, backend]
---

Welcome! This is your very first post.

<!-- more -->

## Quick Start

### Create a new post

```bash
$ docblog new "My New Post"
```

### Run server

```bash
$ docblog server
```

### Generate static files

```bash
$ docblog generate
```
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );
    write_new(&source.join("posts/hello-world.md"), &hello)?;

    write_new(
        &source.join("about.md"),
        "---\ntitle: About\nlayout: profile\n---\n\nA few words about this site and its author.\n",
    )?;
    write_new(
        &source.join("me.md"),
        "---\ntitle: Me\n---\n\nWhat I am working on now.\n",
    )?;
    write_new(
        &source.join("sponsor.md"),
        "---\ntitle: Sponsor\n---\n\nIf these notes help you, consider sponsoring.\n",
    )?;

    write_new(
        &source.join("devops/index.md"),
        "---\ntitle: DevOps\n---\n\nNotes on building, shipping and running software.\n",
    )?;
    write_new(
        &source.join("devops/docker.md"),
        "---\ntitle: Docker\norder: 1\n---\n\n## Images\n\nKeep images small.\n\n## Containers\n\nOne process per container.\n",
    )?;
    write_new(
        &source.join("backend/index.md"),
        "---\ntitle: Backend\n---\n\nNotes on services, storage and APIs.\n",
    )?;
    write_new(
        &source.join("backend/http.md"),
        "---\ntitle: HTTP\norder: 1\n---\n\n## Status codes\n\nUse them precisely.\n",
    )?;

    tracing::info!("Initialized site in {:?}", target_dir);
    Ok(())
}

/// Write a file unless it already exists
fn write_new(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::warn!("Skipping existing file {:?}", path);
        return Ok(());
    }
    fs::write(path, content)?;
    tracing::debug!("Created: {:?}", path);
    Ok(())
}

/// Run the init command for an existing site
pub fn run(site: &Site) -> Result<()> {
    init_site(&site.base_dir)
}
