//! Handlers and node accessors shared by the HTML-family backends.

use lucent_ast::{NodeId, NodeKind, Tree};

use crate::context::RenderContext;
use crate::engine::{Phase, WalkStatus};
use crate::footnotes::{write_back_ref, write_reference};
use crate::heading::render_toc;

/// A backend that renders through a [`RenderContext`].
pub trait ContextBackend {
    fn ctx(&mut self) -> &mut RenderContext;
}

/// Destination of a link or image.
pub(crate) fn link_dest_of(tree: &Tree, node: NodeId) -> &str {
    tree.child_of_kind(node, NodeKind::LinkDest)
        .map_or("", |dest| tree[dest].tokens.as_str())
}

/// Title of a link or image, empty when absent.
pub(crate) fn link_title_of(tree: &Tree, node: NodeId) -> &str {
    tree.child_of_kind(node, NodeKind::LinkTitle)
        .map_or("", |title| tree[title].tokens.as_str())
}

/// Id and anchor text of a block reference.
pub(crate) fn block_ref_parts(tree: &Tree, node: NodeId) -> (&str, Option<&str>) {
    let id = tree
        .child_of_kind(node, NodeKind::BlockRefId)
        .map_or("", |id| tree[id].tokens.as_str());
    let text = tree
        .child_of_kind(node, NodeKind::BlockRefText)
        .map(|text| tree[text].tokens.as_str());
    (id, text)
}

/// Token payload of the first child of `kind`.
pub(crate) fn child_tokens(tree: &Tree, node: NodeId, kind: NodeKind) -> &str {
    tree.child_of_kind(node, kind)
        .map_or("", |child| tree[child].tokens.as_str())
}

pub(crate) fn text<R: ContextBackend>(
    r: &mut R,
    tree: &Tree,
    node: NodeId,
    _: Phase,
) -> WalkStatus {
    let ctx = r.ctx();
    let text = ctx.text(&tree[node].tokens);
    ctx.write_escaped(&text);
    WalkStatus::SkipChildren
}

pub(crate) fn html_entity<R: ContextBackend>(
    r: &mut R,
    tree: &Tree,
    node: NodeId,
    _: Phase,
) -> WalkStatus {
    r.ctx().write(&tree[node].tokens);
    WalkStatus::SkipChildren
}

pub(crate) fn hard_break<R: ContextBackend>(
    r: &mut R,
    _: &Tree,
    _: NodeId,
    _: Phase,
) -> WalkStatus {
    let ctx = r.ctx();
    if ctx.tags_enabled() {
        ctx.write("<br />\n");
    } else {
        ctx.write(" ");
    }
    WalkStatus::SkipChildren
}

pub(crate) fn soft_break<R: ContextBackend>(
    r: &mut R,
    _: &Tree,
    _: NodeId,
    _: Phase,
) -> WalkStatus {
    let ctx = r.ctx();
    if ctx.options.soft_break_to_hard_break && ctx.tags_enabled() {
        ctx.write("<br />\n");
    } else {
        ctx.write("\n");
    }
    WalkStatus::SkipChildren
}

/// Collect the definition; its content is rendered after the walk.
pub(crate) fn footnotes_def<R: ContextBackend>(
    r: &mut R,
    tree: &Tree,
    node: NodeId,
    _: Phase,
) -> WalkStatus {
    r.ctx().footnotes.define(&tree[node].tokens);
    WalkStatus::SkipChildren
}

pub(crate) fn footnotes_ref<R: ContextBackend>(
    r: &mut R,
    tree: &Tree,
    node: NodeId,
    _: Phase,
) -> WalkStatus {
    let ctx = r.ctx();
    // Suppressed references get no anchor, so no back-link points at them.
    if !ctx.tags_enabled() {
        ctx.footnotes.define(&tree[node].tokens);
        return WalkStatus::SkipChildren;
    }
    let reference = ctx.footnotes.reference(&tree[node].tokens);
    let mut html = String::new();
    write_reference(&mut html, &reference);
    ctx.tag(&html);
    WalkStatus::SkipChildren
}

pub(crate) fn footnotes_back_ref<R: ContextBackend>(
    r: &mut R,
    tree: &Tree,
    node: NodeId,
    _: Phase,
) -> WalkStatus {
    let mut html = String::new();
    write_back_ref(&mut html, &tree[node].tokens);
    r.ctx().write(&html);
    WalkStatus::SkipChildren
}

pub(crate) fn toc<R: ContextBackend>(r: &mut R, _: &Tree, _: NodeId, _: Phase) -> WalkStatus {
    let ctx = r.ctx();
    if ctx.options.toc {
        let mut html = String::new();
        render_toc(ctx.headings.toc(), &mut html);
        ctx.write(&html);
    }
    WalkStatus::SkipChildren
}
