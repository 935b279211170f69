//! Post ordering and grouping
//!
//! Everything here works on the fully loaded post list; the home page, the
//! posts archive, tag pages and feeds all read their order from these helpers.

use chrono::Datelike;
use std::collections::BTreeMap;

use crate::content::Post;

/// Sort posts by publication date, newest first
///
/// The sort is stable, so posts sharing a date keep their input order.
pub fn sort_by_date_desc(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Borrowing variant of [`sort_by_date_desc`]
pub fn ordered_by_date_desc(posts: &[Post]) -> Vec<&Post> {
    let mut ordered: Vec<&Post> = posts.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));
    ordered
}

/// Group posts by year, newest year first, keeping the order within a year
pub fn group_by_year<'a>(posts: &[&'a Post]) -> Vec<(i32, Vec<&'a Post>)> {
    let mut years: BTreeMap<i32, Vec<&'a Post>> = BTreeMap::new();
    for post in posts {
        years.entry(post.date.year()).or_default().push(*post);
    }
    years.into_iter().rev().collect()
}

/// Posts grouped by tag
///
/// Labels that share a slug (`Backend`, `backend`) are one tag, shown with
/// the first label seen.
#[derive(Debug, Default)]
pub struct TagIndex<'a> {
    tags: BTreeMap<String, TagEntry<'a>>,
}

#[derive(Debug)]
struct TagEntry<'a> {
    label: String,
    posts: Vec<&'a Post>,
}

impl<'a> TagIndex<'a> {
    /// Build the index; each tag keeps the order of `posts`
    pub fn build(posts: &[&'a Post]) -> Self {
        let mut tags: BTreeMap<String, TagEntry<'a>> = BTreeMap::new();
        for post in posts {
            for label in post.tag_labels() {
                let entry = tags
                    .entry(slug::slugify(label))
                    .or_insert_with(|| TagEntry {
                        label: label.to_string(),
                        posts: Vec::new(),
                    });
                // A post listing the same tag twice appears once
                if !entry.posts.iter().any(|p| std::ptr::eq(*p, *post)) {
                    entry.posts.push(*post);
                }
            }
        }
        Self { tags }
    }

    /// Tags in slug order as (label, posts)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a Post])> {
        self.tags
            .values()
            .map(|e| (e.label.as_str(), e.posts.as_slice()))
    }

    /// Posts of the tag that `tag` slugifies to
    pub fn posts(&self, tag: &str) -> &[&'a Post] {
        self.tags
            .get(&slug::slugify(tag))
            .map(|e| e.posts.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
