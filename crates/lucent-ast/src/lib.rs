//! Document tree for the lucent renderers.
//!
//! The tree is an arena of [`Node`]s addressed by [`NodeId`]. Every node has
//! a closed [`NodeKind`] and belongs to exactly one [`NodeCategory`], which
//! fixes how backends treat it: containers open and close, flags only toggle
//! state, markers are punctuation and leaves emit their payload once.
//!
//! [`parse`] builds a tree from Markdown using pulldown-cmark, synthesizing
//! the marker nodes the event stream leaves implicit.
//!
//! # Example
//!
//! ```
//! use lucent_ast::{NodeKind, ParseOptions, parse};
//!
//! let tree = parse("- one\n- two\n", &ParseOptions::default());
//! let list = tree.children(tree.root())[0];
//! assert_eq!(tree[list].kind, NodeKind::List);
//! assert_eq!(tree.text(list), "onetwo");
//! ```

mod id;
mod node;
mod parse;
mod tree;

pub use id::new_node_id;
pub use node::{
    CodeBlockData, ListData, ListKind, Node, NodeCategory, NodeKind, TableAlign, TextMark,
};
pub use parse::{ParseOptions, parse};
pub use tree::{Descendants, NodeId, Tree};
