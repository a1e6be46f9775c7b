//! Depth-first traversal and per-kind dispatch.
//!
//! Every backend owns a [`Dispatch`] table mapping node kinds to handler
//! functions. [`walk`] visits the tree in document order and calls the
//! handler for each node once on [`Phase::Enter`] and, unless the handler
//! skipped its children, once more on [`Phase::Exit`].

use std::collections::HashMap;

use lucent_ast::{NodeCategory, NodeId, NodeKind, Tree};

/// Handler result controlling descent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkStatus {
    /// Visit children, then call the handler again on exit.
    Continue,
    /// Do not visit children and do not call the exit phase.
    SkipChildren,
    /// Abort the whole walk.
    Stop,
}

/// Which side of a node the handler is called for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Enter,
    Exit,
}

impl Phase {
    #[must_use]
    pub fn is_enter(self) -> bool {
        self == Self::Enter
    }
}

/// Handler for one node kind.
pub type Handler<R> = fn(&mut R, &Tree, NodeId, Phase) -> WalkStatus;

/// Owned mapping from node kind to handler.
///
/// Unregistered kinds fall back to the default handler, which continues
/// into children and emits nothing unless replaced.
pub struct Dispatch<R> {
    handlers: HashMap<NodeKind, Handler<R>>,
    default: Handler<R>,
}

impl<R> Dispatch<R> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            default: continue_handler::<R>,
        }
    }

    /// Register a handler, returning the table for chaining.
    #[must_use]
    pub fn on(mut self, kind: NodeKind, handler: Handler<R>) -> Self {
        self.register(kind, handler);
        self
    }

    /// Register several kinds with the same handler.
    #[must_use]
    pub fn on_all(mut self, kinds: &[NodeKind], handler: Handler<R>) -> Self {
        for &kind in kinds {
            self.register(kind, handler);
        }
        self
    }

    /// Register or replace the handler for `kind`.
    pub fn register(&mut self, kind: NodeKind, handler: Handler<R>) {
        self.handlers.insert(kind, handler);
    }

    /// Replace the handler used for unregistered kinds.
    pub fn set_default(&mut self, handler: Handler<R>) {
        self.default = handler;
    }

    /// Handler for `kind`.
    #[must_use]
    pub fn handler(&self, kind: NodeKind) -> Handler<R> {
        self.handlers.get(&kind).copied().unwrap_or(self.default)
    }

    /// Whether `kind` has its own handler.
    #[must_use]
    pub fn is_registered(&self, kind: NodeKind) -> bool {
        self.handlers.contains_key(&kind)
    }
}

impl<R> Clone for Dispatch<R> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
            default: self.default,
        }
    }
}

impl<R> Default for Dispatch<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn continue_handler<R>(_: &mut R, _: &Tree, _: NodeId, _: Phase) -> WalkStatus {
    WalkStatus::Continue
}

/// Handler that emits nothing and skips the subtree.
pub fn skip_handler<R>(_: &mut R, _: &Tree, _: NodeId, _: Phase) -> WalkStatus {
    WalkStatus::SkipChildren
}

/// Default for output backends: containers and flags descend, markers and
/// leaves are skipped.
pub fn category_handler<R>(_: &mut R, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    match tree[node].kind.category() {
        NodeCategory::Container | NodeCategory::Flag => WalkStatus::Continue,
        NodeCategory::Marker | NodeCategory::Leaf => WalkStatus::SkipChildren,
    }
}

/// A backend driven by [`walk`].
pub trait Walker: Sized {
    fn dispatch(&self) -> &Dispatch<Self>;
}

/// Output contract shared by all backends.
pub trait Renderer {
    /// Render the bound tree and return the output.
    fn render(&mut self) -> String;
}

/// Walk `node` and its subtree, dispatching to `walker`'s handlers.
///
/// Returns [`WalkStatus::Stop`] if any handler aborted the walk, otherwise
/// [`WalkStatus::Continue`].
pub fn walk<W: Walker>(walker: &mut W, tree: &Tree, node: NodeId) -> WalkStatus {
    let handler = walker.dispatch().handler(tree[node].kind);
    match handler(walker, tree, node, Phase::Enter) {
        WalkStatus::Stop => return WalkStatus::Stop,
        WalkStatus::SkipChildren => return WalkStatus::Continue,
        WalkStatus::Continue => {}
    }
    for &child in tree.children(node) {
        if walk(walker, tree, child) == WalkStatus::Stop {
            return WalkStatus::Stop;
        }
    }
    match handler(walker, tree, node, Phase::Exit) {
        WalkStatus::Stop => WalkStatus::Stop,
        _ => WalkStatus::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucent_ast::Node;

    struct Recorder {
        dispatch: Dispatch<Self>,
        events: Vec<String>,
    }

    impl Walker for Recorder {
        fn dispatch(&self) -> &Dispatch<Self> {
            &self.dispatch
        }
    }

    fn record(r: &mut Recorder, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
        let label = if tree[node].tokens.is_empty() {
            tree[node].kind.name().to_owned()
        } else {
            tree[node].tokens.clone()
        };
        r.events.push(format!("{label}:{phase:?}"));
        WalkStatus::Continue
    }

    fn record_and_skip(r: &mut Recorder, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
        record(r, tree, node, phase);
        WalkStatus::SkipChildren
    }

    fn stop_on_b(r: &mut Recorder, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
        record(r, tree, node, phase);
        if tree[node].tokens == "b" {
            WalkStatus::Stop
        } else {
            WalkStatus::SkipChildren
        }
    }

    fn sample() -> Tree {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.push(root, Node::new(NodeKind::Paragraph));
        tree.push(p, Node::new(NodeKind::Text).with_tokens("a"));
        tree.push(p, Node::new(NodeKind::Text).with_tokens("b"));
        tree.push(root, Node::new(NodeKind::ThematicBreak).with_tokens("---"));
        tree
    }

    fn run(dispatch: Dispatch<Recorder>) -> (WalkStatus, Vec<String>) {
        let tree = sample();
        let mut recorder = Recorder {
            dispatch,
            events: Vec::new(),
        };
        let status = walk(&mut recorder, &tree, tree.root());
        (status, recorder.events)
    }

    #[test]
    fn test_enter_exit_order() {
        let dispatch = Dispatch::new()
            .on(NodeKind::Paragraph, record)
            .on(NodeKind::Text, record_and_skip)
            .on(NodeKind::ThematicBreak, record_and_skip);
        let (status, events) = run(dispatch);
        assert_eq!(status, WalkStatus::Continue);
        assert_eq!(
            events,
            vec![
                "NodeParagraph:Enter",
                "a:Enter",
                "b:Enter",
                "NodeParagraph:Exit",
                "---:Enter"
            ]
        );
    }

    #[test]
    fn test_skip_children_suppresses_exit() {
        let dispatch = Dispatch::new()
            .on(NodeKind::Paragraph, record_and_skip)
            .on(NodeKind::Text, record);
        let (_, events) = run(dispatch);
        assert_eq!(events, vec!["NodeParagraph:Enter"]);
    }

    #[test]
    fn test_stop_aborts_walk() {
        let dispatch = Dispatch::new()
            .on(NodeKind::Text, stop_on_b)
            .on(NodeKind::ThematicBreak, record);
        let (status, events) = run(dispatch);
        assert_eq!(status, WalkStatus::Stop);
        assert_eq!(events, vec!["a:Enter", "b:Enter"]);
    }

    #[test]
    fn test_default_handler_continues() {
        let dispatch = Dispatch::new().on(NodeKind::Text, record_and_skip);
        let (_, events) = run(dispatch);
        assert_eq!(events, vec!["a:Enter", "b:Enter"]);
    }

    #[test]
    fn test_replace_default() {
        let mut dispatch = Dispatch::new().on(NodeKind::Text, record_and_skip);
        dispatch.set_default(skip_handler);
        let (_, events) = run(dispatch);
        assert!(events.is_empty());
        assert!(!Dispatch::<Recorder>::new().is_registered(NodeKind::Text));
    }

    #[test]
    fn test_category_handler() {
        let mut dispatch = Dispatch::new().on(NodeKind::Text, record_and_skip);
        dispatch.set_default(category_handler);
        let mut tree = sample();
        let root = tree.root();
        let strong = tree.push(root, Node::new(NodeKind::Strong));
        tree.push(strong, Node::new(NodeKind::StrongOpenMarker).with_tokens("**"));
        tree.push(strong, Node::new(NodeKind::Text).with_tokens("c"));
        let mut recorder = Recorder {
            dispatch: dispatch.clone(),
            events: Vec::new(),
        };
        walk(&mut recorder, &tree, root);
        assert_eq!(recorder.events, vec!["a:Enter", "b:Enter", "c:Enter"]);
    }
}
