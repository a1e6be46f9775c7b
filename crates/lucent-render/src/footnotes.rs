//! Deferred footnote collection and re-rendering.
//!
//! During the main walk, definitions are collected in first-encounter order
//! (either the definition itself or a reference to it) and references are
//! numbered from that order. After the walk each collected definition is
//! copied into an isolated tree, back-links are appended, and the copy is
//! rendered by a fresh renderer of the same backend.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use lucent_ast::{Node, NodeId, NodeKind, Tree};

use crate::escape::escape_html;

pub(crate) const FOOTNOTES_OPEN: &str =
    "<div class=\"footnotes-defs-div\"><hr class=\"footnotes-defs-hr\" />\n<ol class=\"footnotes-defs\">";
pub(crate) const FOOTNOTES_CLOSE: &str = "</ol></div>";

/// Ordinals by normalized label, shared with footnote-mode renderers.
pub type Ordinals = Arc<HashMap<String, usize>>;

#[derive(Debug)]
struct Collected {
    key: String,
    node: NodeId,
    /// Anchor ids of the in-text references, in document order.
    anchors: Vec<String>,
}

#[derive(Debug)]
enum Mode {
    Collecting,
    /// Rendering a definition; references resolve against the final ordinals.
    Rendering(Ordinals),
}

/// Result of resolving a footnote reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FootnoteRef {
    /// Known definition. `anchor` is the id of this reference site, absent
    /// inside footnote definitions.
    Resolved { ordinal: usize, anchor: Option<String> },
    Unresolved,
}

/// A collected definition ready to render.
#[derive(Debug)]
pub struct FootnoteEntry {
    pub ordinal: usize,
    /// Isolated copy of the definition content with back-links appended.
    pub tree: Arc<Tree>,
}

/// Per-renderer footnote state.
#[derive(Debug)]
pub struct Footnotes {
    index: HashMap<String, NodeId>,
    collected: Vec<Collected>,
    mode: Mode,
}

fn normalize(label: &str) -> String {
    label.to_lowercase()
}

impl Footnotes {
    /// Index the definitions of `tree`. The first definition of a label wins.
    #[must_use]
    pub fn new(tree: &Tree) -> Self {
        let mut index = HashMap::new();
        for node in tree.descendants(tree.root()) {
            if tree[node].kind == NodeKind::FootnotesDef {
                index.entry(normalize(&tree[node].tokens)).or_insert(node);
            }
        }
        Self {
            index,
            collected: Vec::new(),
            mode: Mode::Collecting,
        }
    }

    /// State for a renderer drawing one footnote definition.
    #[must_use]
    pub fn rendering(ordinals: Ordinals) -> Self {
        Self {
            index: HashMap::new(),
            collected: Vec::new(),
            mode: Mode::Rendering(ordinals),
        }
    }

    #[must_use]
    pub fn is_rendering(&self) -> bool {
        matches!(self.mode, Mode::Rendering(_))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.collected.iter().position(|c| c.key == key)
    }

    /// Collect `key` if it names a known definition; returns its 0-based slot.
    fn collect(&mut self, key: String) -> Option<usize> {
        if let Some(position) = self.position(&key) {
            return Some(position);
        }
        let node = *self.index.get(&key)?;
        self.collected.push(Collected {
            key,
            node,
            anchors: Vec::new(),
        });
        Some(self.collected.len() - 1)
    }

    /// Record a definition met during the walk.
    pub fn define(&mut self, label: &str) {
        if !self.is_rendering() {
            self.collect(normalize(label));
        }
    }

    /// Resolve a reference met during the walk.
    pub fn reference(&mut self, label: &str) -> FootnoteRef {
        let key = normalize(label);
        if let Mode::Rendering(ordinals) = &self.mode {
            return match ordinals.get(&key) {
                Some(&ordinal) => FootnoteRef::Resolved {
                    ordinal,
                    anchor: None,
                },
                None => FootnoteRef::Unresolved,
            };
        }

        let Some(slot) = self.collect(key) else {
            tracing::debug!(label, "Unresolved footnote reference");
            return FootnoteRef::Unresolved;
        };
        let ordinal = slot + 1;
        let entry = &mut self.collected[slot];
        let anchor = match entry.anchors.len() {
            0 => format!("footnotes-ref-{ordinal}"),
            n => format!("footnotes-ref-{ordinal}-{}", n + 1),
        };
        entry.anchors.push(anchor.clone());
        FootnoteRef::Resolved {
            ordinal,
            anchor: Some(anchor),
        }
    }

    /// Take the collected definitions, leaving the state empty.
    ///
    /// Definitions referenced only from inside other definitions are
    /// collected here, after the ones found by the walk.
    pub fn finish(&mut self, tree: &Tree) -> (Vec<FootnoteEntry>, Ordinals) {
        let mut i = 0;
        while i < self.collected.len() {
            let node = self.collected[i].node;
            let nested: Vec<String> = tree
                .descendants(node)
                .filter(|&n| tree[n].kind == NodeKind::FootnotesRef)
                .map(|n| normalize(&tree[n].tokens))
                .collect();
            for key in nested {
                self.collect(key);
            }
            i += 1;
        }

        let collected = std::mem::take(&mut self.collected);
        let ordinals: HashMap<String, usize> = collected
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key.clone(), i + 1))
            .collect();
        let entries = collected
            .into_iter()
            .enumerate()
            .map(|(i, c)| FootnoteEntry {
                ordinal: i + 1,
                tree: Arc::new(isolate(tree, c.node, &c.anchors)),
            })
            .collect();
        (entries, Arc::new(ordinals))
    }
}

/// Copy the content of a definition into a fresh tree and append back-links
/// to its last paragraph.
fn isolate(tree: &Tree, def: NodeId, anchors: &[String]) -> Tree {
    let mut isolated = Tree::new();
    let root = isolated.root();
    for &child in tree.children(def) {
        let copy = tree.copy_subtree(child, &mut isolated);
        isolated.append_child(root, copy);
    }
    if anchors.is_empty() {
        return isolated;
    }

    let target = match isolated.last_child(root) {
        Some(last) if isolated[last].kind == NodeKind::Paragraph => last,
        _ => isolated.push(root, Node::new(NodeKind::Paragraph)),
    };
    for anchor in anchors {
        isolated.push(
            target,
            Node::new(NodeKind::FootnotesBackRef).with_tokens(anchor.as_str()),
        );
    }
    isolated
}

/// Write the in-text reference markup.
pub(crate) fn write_reference(out: &mut String, reference: &FootnoteRef) {
    match reference {
        FootnoteRef::Resolved {
            ordinal,
            anchor: Some(anchor),
        } => write!(
            out,
            r##"<sup class="footnotes-ref" id="{anchor}"><a href="#footnotes-def-{ordinal}">{ordinal}</a></sup>"##
        )
        .unwrap(),
        FootnoteRef::Resolved {
            ordinal,
            anchor: None,
        } => write!(
            out,
            r##"<sup class="footnotes-ref"><a href="#footnotes-def-{ordinal}">{ordinal}</a></sup>"##
        )
        .unwrap(),
        FootnoteRef::Unresolved => out.push_str(r#"<sup class="footnotes-ref">0</sup>"#),
    }
}

/// Write the back-link to a reference site.
pub(crate) fn write_back_ref(out: &mut String, anchor: &str) {
    write!(
        out,
        r##" <a href="#{}" class="vditor-footnotes__goto-ref">↩</a>"##,
        escape_html(anchor)
    )
    .unwrap();
}

/// Assemble the trailing fragment, rendering each entry with `render`.
pub(crate) fn render_entries(
    entries: Vec<FootnoteEntry>,
    mut render: impl FnMut(Arc<Tree>) -> String,
) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut out = String::from(FOOTNOTES_OPEN);
    for entry in entries {
        write!(out, r#"<li id="footnotes-def-{}">"#, entry.ordinal).unwrap();
        out.push_str(&render(entry.tree));
        out.push_str("</li>\n");
    }
    out.push_str(FOOTNOTES_CLOSE);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucent_ast::{ParseOptions, parse};

    fn tree(markdown: &str) -> Tree {
        parse(markdown, &ParseOptions::default())
    }

    #[test]
    fn test_ordinals_follow_first_reference() {
        let tree = tree("x[^b] y[^a] z[^b]\n\n[^a]: A\n[^b]: B\n");
        let mut footnotes = Footnotes::new(&tree);
        assert_eq!(
            footnotes.reference("b"),
            FootnoteRef::Resolved {
                ordinal: 1,
                anchor: Some("footnotes-ref-1".to_owned())
            }
        );
        assert_eq!(
            footnotes.reference("A"),
            FootnoteRef::Resolved {
                ordinal: 2,
                anchor: Some("footnotes-ref-2".to_owned())
            }
        );
        assert_eq!(
            footnotes.reference("b"),
            FootnoteRef::Resolved {
                ordinal: 1,
                anchor: Some("footnotes-ref-1-2".to_owned())
            }
        );
        footnotes.define("a");
        footnotes.define("b");
        let (entries, ordinals) = footnotes.finish(&tree);
        assert_eq!(entries.len(), 2);
        assert_eq!(ordinals.get("b"), Some(&1));
        assert_eq!(ordinals.get("a"), Some(&2));
    }

    #[test]
    fn test_unresolved_reference() {
        let tree = tree("x[^missing]\n");
        let mut footnotes = Footnotes::new(&tree);
        assert_eq!(footnotes.reference("missing"), FootnoteRef::Unresolved);
        let mut out = String::new();
        write_reference(&mut out, &FootnoteRef::Unresolved);
        assert_eq!(out, r#"<sup class="footnotes-ref">0</sup>"#);
    }

    #[test]
    fn test_back_refs_appended_to_last_paragraph() {
        let tree = tree("x[^1] y[^1]\n\n[^1]: note\n");
        let mut footnotes = Footnotes::new(&tree);
        footnotes.reference("1");
        footnotes.reference("1");
        let (entries, _) = footnotes.finish(&tree);
        let isolated = &entries[0].tree;
        let paragraph = isolated.children(isolated.root())[0];
        let back_refs: Vec<&str> = isolated
            .children(paragraph)
            .iter()
            .filter(|&&c| isolated[c].kind == NodeKind::FootnotesBackRef)
            .map(|&c| isolated[c].tokens.as_str())
            .collect();
        assert_eq!(back_refs, vec!["footnotes-ref-1", "footnotes-ref-1-2"]);
    }

    #[test]
    fn test_nested_references_are_collected() {
        let tree = tree("x[^1]\n\n[^1]: see[^2]\n[^2]: inner\n");
        let mut footnotes = Footnotes::new(&tree);
        footnotes.reference("1");
        let (entries, ordinals) = footnotes.finish(&tree);
        assert_eq!(entries.len(), 2);
        assert_eq!(ordinals.get("2"), Some(&2));
        let (again, _) = footnotes.finish(&tree);
        assert!(again.is_empty());
    }

    #[test]
    fn test_rendering_mode_has_no_anchor() {
        let ordinals: Ordinals = Arc::new(HashMap::from([("x".to_owned(), 3)]));
        let mut footnotes = Footnotes::rendering(ordinals);
        assert!(footnotes.is_rendering());
        assert_eq!(
            footnotes.reference("X"),
            FootnoteRef::Resolved {
                ordinal: 3,
                anchor: None
            }
        );
    }

    #[test]
    fn test_render_entries_wrapper() {
        let entries = vec![FootnoteEntry {
            ordinal: 1,
            tree: Arc::new(Tree::new()),
        }];
        let html = render_entries(entries, |_| "<p>n</p>\n".to_owned());
        assert_eq!(
            html,
            "<div class=\"footnotes-defs-div\"><hr class=\"footnotes-defs-hr\" />\n<ol class=\"footnotes-defs\"><li id=\"footnotes-def-1\"><p>n</p>\n</li>\n</ol></div>"
        );
        assert_eq!(render_entries(Vec::new(), |_| String::new()), "");
    }
}
