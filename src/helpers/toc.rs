//! Table of contents

use super::html_escape;
use crate::content::Heading;

/// Build a nested table of contents from rendered headings
///
/// Headings deeper than `max_depth` are skipped, and the shallowest remaining
/// level becomes the top of the list. Returns an empty string when nothing is left.
pub fn toc(headings: &[Heading], max_depth: usize) -> String {
    let items: Vec<&Heading> = headings.iter().filter(|h| h.level <= max_depth).collect();
    let Some(base) = items.iter().map(|h| h.level).min() else {
        return String::new();
    };

    let mut html = r#"<ol class="toc">"#.to_string();
    let mut depth = 0;
    let mut open_item = false;

    for heading in items {
        let target = if open_item {
            (heading.level - base).min(depth + 1)
        } else {
            0
        };

        if open_item && target == depth + 1 {
            html.push_str(r#"<ol class="toc-child">"#);
            depth += 1;
        } else if open_item {
            html.push_str("</li>");
            while depth > target {
                html.push_str("</ol></li>");
                depth -= 1;
            }
        }

        html.push_str(&format!(
            r##"<li class="toc-item toc-level-{}"><a class="toc-link" href="#{}">{}</a>"##,
            heading.level,
            heading.id,
            html_escape(&heading.text)
        ));
        open_item = true;
    }

    html.push_str("</li>");
    while depth > 0 {
        html.push_str("</ol></li>");
        depth -= 1;
    }
    html.push_str("</ol>");
    html
}
