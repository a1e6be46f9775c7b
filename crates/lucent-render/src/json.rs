//! Lossless JSON dump of the tree.
//!
//! Containers become `{"type", "value", "children"}`, flags
//! `{"flag", "children"}` and markers and leaves `{"type", "value"}`. The
//! output is the array of top-level nodes.

use std::sync::Arc;

use lucent_ast::{NodeCategory, NodeId, NodeKind, Tree};
use serde_json::{Map, Value, json};

use crate::engine::{Dispatch, Phase, Renderer, WalkStatus, Walker, walk};
use crate::handlers::link_dest_of;

/// Renders a tree as a JSON array of nodes.
///
/// ```
/// use std::sync::Arc;
///
/// use lucent_ast::{ParseOptions, parse};
/// use lucent_render::{JsonRenderer, Renderer};
///
/// let tree = Arc::new(parse("hi", &ParseOptions::default()));
/// assert_eq!(
///     JsonRenderer::new(tree).render(),
///     r#"[{"type":"NodeParagraph","value":"","children":[{"type":"NodeText","value":"hi"}]}]"#
/// );
/// ```
pub struct JsonRenderer {
    tree: Arc<Tree>,
    dispatch: Dispatch<Self>,
    /// Children being collected, innermost node last.
    stack: Vec<Vec<Value>>,
}

impl JsonRenderer {
    #[must_use]
    pub fn new(tree: Arc<Tree>) -> Self {
        let mut dispatch = Dispatch::new().on(NodeKind::Document, document);
        dispatch.set_default(node);
        Self {
            tree,
            dispatch,
            stack: vec![Vec::new()],
        }
    }

    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch<Self>) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn dispatch_mut(&mut self) -> &mut Dispatch<Self> {
        &mut self.dispatch
    }

    /// Render into a JSON value instead of a string.
    pub fn render_value(&mut self) -> Value {
        let tree = Arc::clone(&self.tree);
        self.stack = vec![Vec::new()];
        walk(self, &tree, tree.root());
        Value::Array(self.stack.pop().unwrap_or_default())
    }

    fn push(&mut self, value: Value) {
        if let Some(children) = self.stack.last_mut() {
            children.push(value);
        }
    }
}

impl Walker for JsonRenderer {
    fn dispatch(&self) -> &Dispatch<Self> {
        &self.dispatch
    }
}

impl Renderer for JsonRenderer {
    fn render(&mut self) -> String {
        self.render_value().to_string()
    }
}

/// Value of a container: the field that identifies it beyond its kind.
fn container_value(tree: &Tree, node: NodeId) -> String {
    let n = &tree[node];
    match n.kind {
        NodeKind::Heading => format!("h{}", n.heading_level),
        NodeKind::List | NodeKind::ListItem => n
            .list
            .as_ref()
            .map(|data| data.marker.clone())
            .unwrap_or_default(),
        NodeKind::CodeBlock => n
            .code_block
            .as_ref()
            .map(|data| data.info.clone())
            .unwrap_or_default(),
        NodeKind::Link | NodeKind::Image => link_dest_of(tree, node).to_owned(),
        _ => n.tokens.clone(),
    }
}

fn document(_: &mut JsonRenderer, _: &Tree, _: NodeId, _: Phase) -> WalkStatus {
    WalkStatus::Continue
}

fn node(r: &mut JsonRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    let kind = tree[node].kind;
    match kind.category() {
        NodeCategory::Marker | NodeCategory::Leaf => {
            r.push(json!({ "type": kind.name(), "value": tree[node].tokens }));
            WalkStatus::SkipChildren
        }
        NodeCategory::Container | NodeCategory::Flag if phase.is_enter() => {
            r.stack.push(Vec::new());
            WalkStatus::Continue
        }
        category => {
            let children = r.stack.pop().unwrap_or_default();
            let mut object = Map::new();
            if category == NodeCategory::Flag {
                object.insert("flag".to_owned(), json!(kind.name()));
            } else {
                object.insert("type".to_owned(), json!(kind.name()));
                object.insert("value".to_owned(), json!(container_value(tree, node)));
            }
            object.insert("children".to_owned(), Value::Array(children));
            r.push(Value::Object(object));
            WalkStatus::Continue
        }
    }
}
