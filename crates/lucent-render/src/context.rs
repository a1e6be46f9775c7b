//! State shared by the HTML-family renderers.

use std::fmt::Write;
use std::sync::Arc;

use lucent_ast::{Node, NodeId, NodeKind, Tree};

use crate::autospace::{allow_space, space};
use crate::buffer::OutputBuffer;
use crate::escape::push_escaped;
use crate::footnotes::Footnotes;
use crate::heading::HeadingIds;
use crate::options::Options;
use crate::services::Services;
use crate::terms::fix_term_typo;
use crate::util::resolve_link;

/// Mutable render state plus the shared configuration.
#[derive(Debug)]
pub struct RenderContext {
    pub options: Arc<Options>,
    pub services: Arc<Services>,
    pub out: OutputBuffer,
    /// Depth of images being rendered. While non-zero only escaped text is
    /// written, so nested markup ends up as plain `alt` text.
    pub disable_tags: usize,
    pub footnotes: Footnotes,
    pub headings: HeadingIds,
    /// Next `data-node-index` value.
    pub node_index: usize,
}

impl RenderContext {
    #[must_use]
    pub fn new(tree: &Tree, options: Arc<Options>, services: Arc<Services>) -> Self {
        let node_index = options.node_index_start;
        Self {
            options,
            services,
            out: OutputBuffer::new(),
            disable_tags: 0,
            footnotes: Footnotes::new(tree),
            headings: HeadingIds::collect(tree),
            node_index,
        }
    }

    pub fn write(&mut self, s: &str) {
        self.out.write_str(s);
    }

    pub fn write_escaped(&mut self, s: &str) {
        let mut escaped = String::with_capacity(s.len());
        push_escaped(&mut escaped, s);
        self.out.write_str(&escaped);
    }

    /// Write markup only when no image is open.
    pub fn tag(&mut self, markup: &str) {
        if self.tags_enabled() {
            self.out.write_str(markup);
        }
    }

    #[must_use]
    pub fn tags_enabled(&self) -> bool {
        self.disable_tags == 0
    }

    pub fn enter_image(&mut self) {
        self.disable_tags += 1;
    }

    pub fn exit_image(&mut self) {
        self.disable_tags = self.disable_tags.saturating_sub(1);
    }

    /// Apply the configured text transforms to a text run.
    #[must_use]
    pub fn text(&self, tokens: &str) -> String {
        let mut text = if self.options.fix_term_typo {
            fix_term_typo(tokens)
        } else {
            tokens.to_owned()
        };
        if self.options.auto_space {
            text = space(&text);
        }
        text
    }

    /// Resolve a link or image destination.
    #[must_use]
    pub fn link_dest(&self, dest: &str) -> String {
        resolve_link(dest, &self.options.link_base, &self.options.link_path)
    }

    /// Write ` key="value"` for each IAL entry; `id` is renamed to the
    /// configured attribute name and, with `with_id`, filled from the block
    /// id when the IAL has none.
    pub fn write_ial(&mut self, node: &Node, with_id: bool) {
        let mut attrs = String::new();
        let mut has_id = false;
        for (key, value) in &node.ial {
            let key = if key == "id" {
                has_id = true;
                if !with_id {
                    continue;
                }
                self.options.kramdown_ial_id_render_name.as_str()
            } else {
                key.as_str()
            };
            write_attr(&mut attrs, key, value);
        }
        if with_id && !has_id && !node.id.is_empty() {
            write_attr(&mut attrs, &self.options.kramdown_ial_id_render_name, &node.id);
        }
        self.out.write_str(&attrs);
    }

    /// Space before an inline span whose previous sibling is text.
    pub fn space_before(&mut self, tree: &Tree, node: NodeId) {
        if !self.options.auto_space || !self.tags_enabled() {
            return;
        }
        let Some(prev) = tree.previous_sibling(node) else {
            return;
        };
        if !matches!(tree[prev].kind, NodeKind::Text | NodeKind::LinkText) {
            return;
        }
        let before = tree[prev].tokens.chars().last();
        let first = tree.text(node).chars().next();
        if let (Some(before), Some(first)) = (before, first)
            && allow_space(before, first)
        {
            self.out.write_char(' ');
        }
    }

    /// Space after an inline span, checked against its next sibling.
    pub fn space_after(&mut self, tree: &Tree, node: NodeId) {
        if !self.options.auto_space || !self.tags_enabled() {
            return;
        }
        let Some(next) = tree.next_sibling(node) else {
            return;
        };
        let last = tree.text(node).chars().last();
        let after = first_char(tree, next);
        if let (Some(last), Some(after)) = (last, after)
            && allow_space(last, after)
        {
            self.out.write_char(' ');
        }
    }

    /// Take and return the next top-level node index.
    pub fn next_node_index(&mut self) -> usize {
        let index = self.node_index;
        self.node_index += 1;
        index
    }
}

fn first_char(tree: &Tree, node: NodeId) -> Option<char> {
    match tree[node].kind {
        NodeKind::Text | NodeKind::LinkText | NodeKind::TextMark => tree[node].tokens.chars().next(),
        NodeKind::SoftBreak | NodeKind::HardBreak => Some('\n'),
        _ => tree.text(node).chars().next(),
    }
}

/// Append ` key="value"` with the value escaped.
pub(crate) fn write_attr(out: &mut String, key: &str, value: &str) {
    write!(out, " {key}=\"").unwrap();
    push_escaped(out, value);
    out.push('"');
}
