//! Arena-backed document tree.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Child lists
//! are index vectors, so unlinking a subtree is a vector removal and
//! relinking is an insertion. Detached nodes stay in the arena and are simply
//! unreachable from the root.

use std::ops::{Index, IndexMut};

use crate::node::{Node, NodeKind};

/// Stable index of a node in its [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Document tree rooted at a [`NodeKind::Document`] node.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only an empty document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
            root: NodeId(0),
        }
    }

    /// Root document node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Add an unattached node to the arena.
    ///
    /// Any parent or child links carried by `node` are cleared.
    pub fn add(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node);
        id
    }

    /// Add a node and append it to `parent`.
    pub fn push(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.add(node);
        self.append_child(parent, id);
        id
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Insert `child` at `index` among the children of `parent`.
    ///
    /// The index is clamped to the number of children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.index()].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Insert `child` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, child: NodeId) {
        if let Some(parent) = self.parent(sibling) {
            self.detach(child);
            let index = self.position(sibling).unwrap_or(0);
            self.insert_child(parent, index, child);
        }
    }

    /// Unlink `id` from its parent. The subtree below it is kept intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|&c| c != id);
        }
    }

    /// Parent of `id`.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Children of `id` in sibling order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Index of `id` among its siblings.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let pos = self.position(id)?;
        self.children(parent).get(pos + 1).copied()
    }

    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let pos = self.position(id)?;
        pos.checked_sub(1)
            .and_then(|p| self.children(parent).get(p).copied())
    }

    /// First direct child of the given kind.
    #[must_use]
    pub fn child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.nodes[c.index()].kind == kind)
    }

    /// Nearest ancestor of the given kind, excluding `id` itself.
    #[must_use]
    pub fn ancestor_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.nodes[node.index()].kind == kind {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Pre-order iterator over `id` and all its descendants.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Concatenated text content below `id`, markers excluded.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            let node = &self.nodes[node.index()];
            if node.kind.is_text_content() {
                out.push_str(&node.tokens);
            }
        }
        out
    }

    /// Deep-copy the subtree at `id` into another tree.
    ///
    /// Returns the id of the unattached copy in `into`.
    pub fn copy_subtree(&self, id: NodeId, into: &mut Tree) -> NodeId {
        let copy = into.add(self.nodes[id.index()].clone());
        for &child in self.children(id) {
            let child_copy = self.copy_subtree(child, into);
            into.append_child(copy, child_copy);
        }
        copy
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}

/// Pre-order traversal returned by [`Tree::descendants`].
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.push(root, Node::new(NodeKind::Paragraph));
        let a = tree.push(p, Node::new(NodeKind::Text).with_tokens("a"));
        let b = tree.push(p, Node::new(NodeKind::Text).with_tokens("b"));
        (tree, p, a, b)
    }

    #[test]
    fn test_siblings() {
        let (tree, p, a, b) = sample();
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.previous_sibling(b), Some(a));
        assert_eq!(tree.previous_sibling(a), None);
        assert_eq!(tree.parent(a), Some(p));
        assert_eq!(tree.first_child(p), Some(a));
        assert_eq!(tree.last_child(p), Some(b));
    }

    #[test]
    fn test_detach_and_relink() {
        let (mut tree, p, a, b) = sample();
        tree.detach(a);
        assert_eq!(tree.children(p), &[b]);
        assert_eq!(tree.parent(a), None);

        tree.insert_before(b, a);
        assert_eq!(tree.children(p), &[a, b]);
        assert_eq!(tree.text(p), "ab");
    }

    #[test]
    fn test_append_moves_existing_child() {
        let (mut tree, p, a, b) = sample();
        tree.append_child(p, a);
        assert_eq!(tree.children(p), &[b, a]);
    }

    #[test]
    fn test_descendants_preorder() {
        let (tree, p, a, b) = sample();
        let order: Vec<NodeId> = tree.descendants(tree.root()).collect();
        assert_eq!(order, vec![tree.root(), p, a, b]);
    }

    #[test]
    fn test_copy_subtree() {
        let (tree, p, _, _) = sample();
        let mut other = Tree::new();
        let copy = tree.copy_subtree(p, &mut other);
        let root = other.root();
        other.append_child(root, copy);
        assert_eq!(other.text(root), "ab");
        assert_eq!(other[copy].kind, NodeKind::Paragraph);
    }

    #[test]
    fn test_text_skips_markers() {
        let mut tree = Tree::new();
        let root = tree.root();
        let strong = tree.push(root, Node::new(NodeKind::Strong));
        tree.push(strong, Node::new(NodeKind::StrongOpenMarker).with_tokens("**"));
        tree.push(strong, Node::new(NodeKind::Text).with_tokens("bold"));
        tree.push(strong, Node::new(NodeKind::StrongCloseMarker).with_tokens("**"));
        assert_eq!(tree.text(strong), "bold");
    }
}
