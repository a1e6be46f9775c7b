//! Heading ids and table of contents.

use std::collections::HashMap;
use std::fmt::Write;

use lucent_ast::{NodeId, NodeKind, Tree};

use crate::escape::{escape_html, slugify};

pub(crate) const SVG_ANCHOR: &str = r#"<svg viewBox="0 0 16 16" version="1.1" width="16" height="16"><path fill-rule="evenodd" d="M4 9h1v1H4c-1.5 0-3-1.69-3-3.5S2.55 3 4 3h4c1.45 0 3 1.69 3 3.5 0 1.41-.91 2.72-2 3.25V8.59c.58-.45 1-1.27 1-2.09C10 5.22 8.98 4 8 4H4c-.98 0-2 1.22-2 2.5S3 9 4 9zm9-3h-1v1h1c1 0 2 1.22 2 2.5S13.98 12 13 12H9c-.98 0-2-1.22-2-2.5 0-.83.42-1.64 1-2.09V6.25c-1.09.53-2 1.84-2 3.25C6 11.31 7.55 13 9 13h4c1.45 0 3-1.69 3-3.5S14.5 6 13 6z"></path></svg>"#;

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor id.
    pub id: String,
}

/// Heading ids computed ahead of the walk.
#[derive(Debug, Default)]
pub struct HeadingIds {
    ids: HashMap<NodeId, String>,
    toc: Vec<TocEntry>,
}

impl HeadingIds {
    /// Assign an id to every heading in document order.
    ///
    /// A `HeadingId` child wins; otherwise the slug of the heading text is
    /// used, suffixed `-1`, `-2`, ... on repeats.
    #[must_use]
    pub fn collect(tree: &Tree) -> Self {
        let mut ids = HashMap::new();
        let mut toc = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();

        for node in tree.descendants(tree.root()) {
            if tree[node].kind != NodeKind::Heading {
                continue;
            }
            let title = tree.text(node).trim().to_owned();
            let id = match tree.child_of_kind(node, NodeKind::HeadingId) {
                Some(custom) => tree[custom].tokens.clone(),
                None => generate_id(&mut counts, &title),
            };
            toc.push(TocEntry {
                level: tree[node].heading_level,
                title,
                id: id.clone(),
            });
            ids.insert(node, id);
        }

        Self { ids, toc }
    }

    /// Id of `heading`.
    #[must_use]
    pub fn get(&self, heading: NodeId) -> Option<&str> {
        self.ids.get(&heading).map(String::as_str)
    }

    #[must_use]
    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }
}

fn generate_id(counts: &mut HashMap<String, usize>, text: &str) -> String {
    let base_id = slugify(text);
    let count = counts.entry(base_id.clone()).or_default();
    let id = match *count {
        0 => base_id,
        n => format!("{base_id}-{n}"),
    };
    *count += 1;
    id
}

/// Render entries as nested lists inside a `vditor-toc` container.
pub fn render_toc(entries: &[TocEntry], out: &mut String) {
    out.push_str(r#"<div class="vditor-toc">"#);
    let mut levels: Vec<u8> = Vec::new();
    for entry in entries {
        while levels.last().is_some_and(|&top| top > entry.level) {
            out.push_str("</li></ul>");
            levels.pop();
        }
        if levels.last() == Some(&entry.level) {
            out.push_str("</li>");
        } else {
            out.push_str("<ul>");
            levels.push(entry.level);
        }
        write!(
            out,
            r##"<li><a href="#{}">{}</a>"##,
            escape_html(&entry.id),
            escape_html(&entry.title)
        )
        .unwrap();
    }
    for _ in levels {
        out.push_str("</li></ul>");
    }
    out.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucent_ast::{ParseOptions, parse};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collect_ids_with_duplicates() {
        let tree = parse("# Intro\n\n## Intro\n\n## Setup {#custom}\n", &ParseOptions::default());
        let ids = HeadingIds::collect(&tree);
        let found: Vec<&str> = ids.toc().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(found, vec!["intro", "intro-1", "custom"]);
        let first = tree.children(tree.root())[0];
        assert_eq!(ids.get(first), Some("intro"));
    }

    #[test]
    fn test_render_toc_nesting() {
        let entries = vec![
            TocEntry {
                level: 1,
                title: "A".to_owned(),
                id: "a".to_owned(),
            },
            TocEntry {
                level: 2,
                title: "B & C".to_owned(),
                id: "b".to_owned(),
            },
            TocEntry {
                level: 1,
                title: "D".to_owned(),
                id: "d".to_owned(),
            },
        ];
        let mut out = String::new();
        render_toc(&entries, &mut out);
        assert_eq!(
            out,
            concat!(
                r##"<div class="vditor-toc"><ul><li><a href="#a">A</a>"##,
                r##"<ul><li><a href="#b">B &amp; C</a></li></ul></li>"##,
                r##"<li><a href="#d">D</a></li></ul></div>"##,
                "\n"
            )
        );
    }

    #[test]
    fn test_render_empty_toc() {
        let mut out = String::new();
        render_toc(&[], &mut out);
        assert_eq!(out, "<div class=\"vditor-toc\"></div>\n");
    }
}
