//! Markdown list to ECharts tree JSON.
//!
//! Each list item becomes `{"name": text, "children": [...]}`; `children` is
//! present only for items that contain a nested list. A synthetic `Root`
//! wraps the output unless the document is a single list with a single
//! top-level item.

use std::sync::Arc;

use lucent_ast::{NodeId, NodeKind, ParseOptions, Tree, parse};
use serde_json::{Value, json};

use crate::engine::{Dispatch, Phase, Renderer, WalkStatus, Walker, skip_handler, walk};

/// Convert a Markdown list into ECharts tree JSON.
///
/// ```
/// use lucent_render::list_to_tree_json;
///
/// assert_eq!(
///     list_to_tree_json("- A\n- B\n"),
///     r#"{"name":"Root","children":[{"name":"A"},{"name":"B"}]}"#
/// );
/// assert_eq!(list_to_tree_json("plain text"), "{}");
/// ```
#[must_use]
pub fn list_to_tree_json(markdown: &str) -> String {
    let tree = parse(markdown, &ParseOptions::default());
    EChartsJsonRenderer::new(Arc::new(tree)).render()
}

struct Item {
    name: String,
    children: Vec<Value>,
    has_list: bool,
}

/// Renders the top-level lists of a document as an ECharts tree.
pub struct EChartsJsonRenderer {
    tree: Arc<Tree>,
    dispatch: Dispatch<Self>,
    items: Vec<Item>,
    /// Whether the first top-level node is a list.
    is_list: bool,
    /// Whether the unpruned document has no top-level nodes.
    source_empty: bool,
}

impl EChartsJsonRenderer {
    /// Bind a tree. Non-list top-level nodes are pruned from a copy.
    #[must_use]
    pub fn new(tree: Arc<Tree>) -> Self {
        let root = tree.root();
        let is_list = tree
            .first_child(root)
            .is_some_and(|first| tree[first].kind == NodeKind::List);
        let source_empty = tree.first_child(root).is_none();

        let pruned = if tree
            .children(root)
            .iter()
            .any(|&c| tree[c].kind != NodeKind::List)
        {
            let mut copy = (*tree).clone();
            for child in copy.children(root).to_vec() {
                if copy[child].kind != NodeKind::List {
                    copy.detach(child);
                }
            }
            Arc::new(copy)
        } else {
            tree
        };

        let mut dispatch = Dispatch::new()
            .on(NodeKind::Document, continue_handler)
            .on(NodeKind::List, continue_handler)
            .on(NodeKind::ListItem, Self::list_item)
            .on(NodeKind::Paragraph, continue_handler)
            .on(NodeKind::Text, Self::text)
            .on(NodeKind::LinkText, Self::text)
            .on_all(
                &[
                    NodeKind::Emphasis,
                    NodeKind::Strong,
                    NodeKind::Strikethrough,
                    NodeKind::Mark,
                    NodeKind::Link,
                    NodeKind::Tag,
                ],
                continue_handler,
            );
        dispatch.set_default(skip_handler);

        Self {
            tree: pruned,
            dispatch,
            items: vec![Item {
                name: String::new(),
                children: Vec::new(),
                has_list: false,
            }],
            is_list,
            source_empty,
        }
    }

    fn list_item(&mut self, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
        if phase.is_enter() {
            self.items.push(Item {
                name: String::new(),
                children: Vec::new(),
                has_list: tree.child_of_kind(node, NodeKind::List).is_some(),
            });
            return WalkStatus::Continue;
        }
        if self.items.len() > 1
            && let Some(item) = self.items.pop()
        {
            let value = if item.has_list {
                json!({ "name": item.name, "children": item.children })
            } else {
                json!({ "name": item.name })
            };
            if let Some(parent) = self.items.last_mut() {
                parent.children.push(value);
            }
        }
        WalkStatus::Continue
    }

    fn text(&mut self, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
        if self.items.len() > 1
            && let Some(item) = self.items.last_mut()
        {
            item.name.push_str(&tree[node].tokens);
        }
        WalkStatus::SkipChildren
    }
}

fn continue_handler(_: &mut EChartsJsonRenderer, _: &Tree, _: NodeId, _: Phase) -> WalkStatus {
    WalkStatus::Continue
}

impl Walker for EChartsJsonRenderer {
    fn dispatch(&self) -> &Dispatch<Self> {
        &self.dispatch
    }
}

impl Renderer for EChartsJsonRenderer {
    fn render(&mut self) -> String {
        if !self.is_list && !self.source_empty {
            return "{}".to_owned();
        }
        let tree = Arc::clone(&self.tree);
        let root = tree.root();
        walk(self, &tree, root);

        let lists = tree.children(root).len();
        let single_item = lists == 1
            && tree
                .first_child(root)
                .is_some_and(|list| tree.children(list).len() == 1);

        let mut children = std::mem::take(&mut self.items)
            .into_iter()
            .next()
            .map(|base| base.children)
            .unwrap_or_default();
        let value = if single_item && children.len() == 1 {
            children.remove(0)
        } else {
            json!({ "name": "Root", "children": children })
        };
        value.to_string()
    }
}
