//! KityMinder outline JSON.
//!
//! Headings are exploded first so every heading owns the blocks that
//! follow it up to the next heading of equal or higher level. Each block
//! then becomes `{"data": {...}, "children": [...]}` and the whole outline
//! is wrapped in `{"root": ...}`.

use std::sync::Arc;

use lucent_ast::{NodeId, NodeKind, Tree, new_node_id};
use serde_json::{Map, Value, json};

use crate::engine::{Dispatch, Phase, Renderer, WalkStatus, Walker, skip_handler, walk};
use crate::handlers::child_tokens;

const TEXT_LIMIT: usize = 16;

/// Blocks that become outline nodes.
const BLOCKS: &[NodeKind] = &[
    NodeKind::Paragraph,
    NodeKind::Heading,
    NodeKind::ThematicBreak,
    NodeKind::Blockquote,
    NodeKind::List,
    NodeKind::ListItem,
    NodeKind::HtmlBlock,
    NodeKind::CodeBlock,
    NodeKind::MathBlock,
    NodeKind::Table,
    NodeKind::SuperBlock,
    NodeKind::FootnotesDef,
];

struct Frame {
    data: Map<String, Value>,
    children: Vec<Value>,
}

/// Renders a tree as a KityMinder mind map.
pub struct KityMinderJsonRenderer {
    tree: Arc<Tree>,
    dispatch: Dispatch<Self>,
    title: String,
    stack: Vec<Frame>,
}

impl KityMinderJsonRenderer {
    /// Bind a tree. Headings are exploded on a copy.
    #[must_use]
    pub fn new(tree: Arc<Tree>) -> Self {
        let mut exploded = (*tree).clone();
        explode_headings(&mut exploded);

        let mut dispatch = Dispatch::new()
            .on(NodeKind::Document, document)
            .on_all(BLOCKS, block);
        dispatch.set_default(skip_handler);

        Self {
            tree: Arc::new(exploded),
            dispatch,
            title: String::new(),
            stack: Vec::new(),
        }
    }

    /// Text of the root node, usually the document title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Move the siblings following each top-level heading under it.
fn explode_headings(tree: &mut Tree) {
    let root = tree.root();
    let mut open: Vec<(u8, NodeId)> = Vec::new();
    for child in tree.children(root).to_vec() {
        if tree[child].kind == NodeKind::Heading {
            let level = tree[child].heading_level;
            while open.last().is_some_and(|&(top, _)| top >= level) {
                open.pop();
            }
            if let Some(&(_, parent)) = open.last() {
                tree.append_child(parent, child);
            }
            open.push((level, child));
        } else if let Some(&(_, parent)) = open.last() {
            tree.append_child(parent, child);
        }
    }
}

/// Inline text of a block, ignoring nested blocks.
fn inline_text(tree: &Tree, node: NodeId) -> String {
    tree.children(node)
        .iter()
        .filter(|&&child| !tree[child].kind.is_block())
        .map(|&child| tree.text(child))
        .collect()
}

fn block_text(tree: &Tree, node: NodeId) -> String {
    match tree[node].kind {
        NodeKind::Paragraph | NodeKind::Heading | NodeKind::Table => {
            tree.text(node).trim().to_owned()
        }
        NodeKind::ListItem => tree
            .child_of_kind(node, NodeKind::Paragraph)
            .map(|p| inline_text(tree, p))
            .unwrap_or_default(),
        NodeKind::CodeBlock => child_tokens(tree, node, NodeKind::CodeBlockCode).to_owned(),
        NodeKind::MathBlock => child_tokens(tree, node, NodeKind::MathBlockContent).to_owned(),
        NodeKind::HtmlBlock => tree[node].tokens.clone(),
        _ => String::new(),
    }
}

/// Cut to the first sixteen characters, marking the cut with `...`.
fn truncate(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= TEXT_LIMIT {
        return text.to_owned();
    }
    let mut cut: String = text.chars().take(TEXT_LIMIT).collect();
    cut.push_str("...");
    cut
}

fn priority(kind: NodeKind) -> Option<u8> {
    match kind {
        NodeKind::List => Some(1),
        NodeKind::Blockquote => Some(2),
        NodeKind::SuperBlock => Some(3),
        _ => None,
    }
}

fn node_data(tree: &Tree, node: NodeId, text: &str) -> Map<String, Value> {
    let kind = tree[node].kind;
    let id = if tree[node].id.is_empty() {
        new_node_id()
    } else {
        tree[node].id.clone()
    };
    let mut data = Map::new();
    data.insert("id".to_owned(), json!(id));
    data.insert("text".to_owned(), json!(truncate(text)));
    data.insert("type".to_owned(), json!(kind.name()));
    data.insert(
        "isContainer".to_owned(),
        json!(matches!(
            kind,
            NodeKind::Document
                | NodeKind::Blockquote
                | NodeKind::List
                | NodeKind::ListItem
                | NodeKind::SuperBlock
        )),
    );
    if let Some(priority) = priority(kind) {
        data.insert("priority".to_owned(), json!(priority));
    }
    data
}

fn document(r: &mut KityMinderJsonRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if phase.is_enter() {
        let title = r.title.clone();
        r.stack.push(Frame {
            data: node_data(tree, node, &title),
            children: Vec::new(),
        });
    }
    WalkStatus::Continue
}

fn block(r: &mut KityMinderJsonRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    // The first paragraph of a list item is the item's own text.
    if tree[node].kind == NodeKind::Paragraph
        && let Some(parent) = tree.parent(node)
        && tree[parent].kind == NodeKind::ListItem
        && tree.child_of_kind(parent, NodeKind::Paragraph) == Some(node)
    {
        return WalkStatus::SkipChildren;
    }

    if phase.is_enter() {
        let text = if tree[node].kind == NodeKind::Heading {
            inline_text(tree, node)
        } else {
            block_text(tree, node)
        };
        r.stack.push(Frame {
            data: node_data(tree, node, &text),
            children: Vec::new(),
        });
        return WalkStatus::Continue;
    }

    if r.stack.len() > 1
        && let Some(frame) = r.stack.pop()
        && let Some(parent) = r.stack.last_mut()
    {
        parent
            .children
            .push(json!({ "data": frame.data, "children": frame.children }));
    }
    WalkStatus::Continue
}

impl Walker for KityMinderJsonRenderer {
    fn dispatch(&self) -> &Dispatch<Self> {
        &self.dispatch
    }
}

impl Renderer for KityMinderJsonRenderer {
    fn render(&mut self) -> String {
        let tree = Arc::clone(&self.tree);
        self.stack.clear();
        walk(self, &tree, tree.root());
        let root = self.stack.pop().map_or(Value::Null, |frame| {
            json!({ "data": frame.data, "children": frame.children })
        });
        json!({ "root": root }).to_string()
    }
}
