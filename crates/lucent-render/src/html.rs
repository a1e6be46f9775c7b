//! Display HTML and its preview and export dialects.
//!
//! All three flavors share one handler table. The flavor only changes a few
//! details: preview HTML always carries block ids and attribute lists,
//! export HTML drops editor affordances (heading anchors, ids on list
//! items, checkbox inputs) and forces inline highlighting styles.

use std::fmt::Write;
use std::sync::Arc;

use lucent_ast::{ListKind, NodeId, NodeKind, TextMark, Tree};

use crate::code_block::render_code_block;
use crate::context::{RenderContext, write_attr};
use crate::engine::{Dispatch, Phase, Renderer, WalkStatus, Walker, category_handler, walk};
use crate::footnotes::{Footnotes, render_entries};
use crate::handlers::{
    ContextBackend, block_ref_parts, child_tokens, footnotes_back_ref, footnotes_def, footnotes_ref,
    hard_break, html_entity, link_dest_of, link_title_of, soft_break, text, toc,
};
use crate::heading::SVG_ANCHOR;
use crate::options::Options;
use crate::services::Services;

/// HTML dialect produced by [`HtmlRenderer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flavor {
    #[default]
    Html,
    /// Preview pane: block ids and attribute lists on every block.
    Preview,
    /// Document export: no editor affordances, inline code styles.
    Export,
}

/// Renders a tree to HTML.
///
/// ```
/// use std::sync::Arc;
///
/// use lucent_ast::{ParseOptions, parse};
/// use lucent_render::{HtmlRenderer, Options, Renderer};
///
/// let tree = Arc::new(parse("Hello *world*", &ParseOptions::default()));
/// let mut renderer = HtmlRenderer::new(tree, Arc::new(Options::default()));
/// assert_eq!(renderer.render(), "<p>Hello <em>world</em></p>\n");
/// ```
pub struct HtmlRenderer {
    tree: Arc<Tree>,
    ctx: RenderContext,
    flavor: Flavor,
    dispatch: Dispatch<Self>,
}

impl HtmlRenderer {
    /// Create a renderer with the default services.
    #[must_use]
    pub fn new(tree: Arc<Tree>, options: Arc<Options>) -> Self {
        Self::with_services(tree, options, Arc::new(Services::default()))
    }

    #[must_use]
    pub fn with_services(tree: Arc<Tree>, options: Arc<Options>, services: Arc<Services>) -> Self {
        let ctx = RenderContext::new(&tree, options, services);
        Self {
            tree,
            ctx,
            flavor: Flavor::Html,
            dispatch: Self::default_dispatch(),
        }
    }

    #[must_use]
    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Replace the whole handler table.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch<Self>) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Mutable access to the handler table for overriding single kinds.
    pub fn dispatch_mut(&mut self) -> &mut Dispatch<Self> {
        &mut self.dispatch
    }

    #[must_use]
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut RenderContext {
        &mut self.ctx
    }

    /// The stock handler table.
    #[must_use]
    pub fn default_dispatch() -> Dispatch<Self> {
        let mut dispatch = Dispatch::new()
            .on(NodeKind::Document, document)
            .on(NodeKind::Paragraph, paragraph)
            .on(NodeKind::Heading, heading)
            .on(NodeKind::ThematicBreak, thematic_break)
            .on(NodeKind::Blockquote, blockquote)
            .on(NodeKind::List, list)
            .on(NodeKind::ListItem, list_item)
            .on(NodeKind::TaskListItemMarker, task_marker)
            .on_all(&[NodeKind::HtmlBlock, NodeKind::InlineHtml], html)
            .on(NodeKind::HtmlEntity, html_entity)
            .on(NodeKind::CodeBlock, code_block)
            .on(NodeKind::MathBlock, math_block)
            .on(NodeKind::InlineMath, inline_math)
            .on_all(&[NodeKind::Text, NodeKind::LinkText], text)
            .on(NodeKind::CodeSpanContent, code_span_content)
            .on_all(
                &[
                    NodeKind::Emphasis,
                    NodeKind::Strong,
                    NodeKind::Strikethrough,
                    NodeKind::Mark,
                    NodeKind::Tag,
                    NodeKind::CodeSpan,
                ],
                inline_flag,
            )
            .on_all(
                &[
                    NodeKind::EmphasisOpenMarker,
                    NodeKind::EmphasisCloseMarker,
                    NodeKind::StrongOpenMarker,
                    NodeKind::StrongCloseMarker,
                    NodeKind::StrikethroughOpenMarker,
                    NodeKind::StrikethroughCloseMarker,
                    NodeKind::MarkOpenMarker,
                    NodeKind::MarkCloseMarker,
                    NodeKind::TagOpenMarker,
                    NodeKind::TagCloseMarker,
                    NodeKind::CodeSpanOpenMarker,
                    NodeKind::CodeSpanCloseMarker,
                ],
                inline_marker,
            )
            .on(NodeKind::HardBreak, hard_break)
            .on(NodeKind::SoftBreak, soft_break)
            .on(NodeKind::Link, link)
            .on(NodeKind::Image, image)
            .on(NodeKind::Table, table)
            .on(NodeKind::TableHead, table_head)
            .on(NodeKind::TableRow, table_row)
            .on(NodeKind::TableCell, table_cell)
            .on(NodeKind::FootnotesDef, footnotes_def)
            .on(NodeKind::FootnotesRef, footnotes_ref)
            .on(NodeKind::FootnotesBackRef, footnotes_back_ref)
            .on(NodeKind::BlockRef, block_ref)
            .on(NodeKind::TextMark, text_mark)
            .on(NodeKind::Toc, toc)
            .on(NodeKind::SuperBlock, super_block);
        dispatch.set_default(category_handler);
        dispatch
    }

    /// Render the collected footnote definitions.
    ///
    /// Consumes the collected state, so a second call returns an empty
    /// string. Renderers drawing a single definition return nothing.
    pub fn render_footnote_defs(&mut self) -> String {
        if self.ctx.footnotes.is_rendering() {
            return String::new();
        }
        let (entries, ordinals) = self.ctx.footnotes.finish(&self.tree);
        let options = Arc::clone(&self.ctx.options);
        let services = Arc::clone(&self.ctx.services);
        let dispatch = self.dispatch.clone();
        let flavor = self.flavor;
        render_entries(entries, |tree| {
            let mut renderer =
                Self::with_services(tree, Arc::clone(&options), Arc::clone(&services))
                    .with_flavor(flavor)
                    .with_dispatch(dispatch.clone());
            renderer.ctx.footnotes = Footnotes::rendering(Arc::clone(&ordinals));
            renderer.render()
        })
    }

    /// Write the attribute list of a block when this flavor shows it.
    fn write_ial(&mut self, tree: &Tree, node: NodeId, with_id: bool) {
        if self.flavor == Flavor::Preview || self.ctx.options.kramdown_block_ial {
            self.ctx.write_ial(&tree[node], with_id);
        }
    }

    fn heading_id(&self, tree: &Tree, node: NodeId) -> Option<String> {
        if self.flavor == Flavor::Preview && !tree[node].id.is_empty() {
            return Some(tree[node].id.clone());
        }
        if self.ctx.options.heading_id || self.flavor == Flavor::Preview {
            return self.ctx.headings.get(node).map(str::to_owned);
        }
        None
    }
}

impl ContextBackend for HtmlRenderer {
    fn ctx(&mut self) -> &mut RenderContext {
        &mut self.ctx
    }
}

impl Walker for HtmlRenderer {
    fn dispatch(&self) -> &Dispatch<Self> {
        &self.dispatch
    }
}

impl Renderer for HtmlRenderer {
    fn render(&mut self) -> String {
        let tree = Arc::clone(&self.tree);
        walk(self, &tree, tree.root());
        let mut out = self.ctx.out.take_string();
        out.push_str(&self.render_footnote_defs());
        out
    }
}

/// Whether `paragraph` sits directly in an item of a tight list.
fn in_tight_item(tree: &Tree, paragraph: NodeId) -> bool {
    tree.parent(paragraph)
        .filter(|&parent| tree[parent].kind == NodeKind::ListItem)
        .and_then(|item| tree[item].list.as_ref())
        .is_some_and(|data| data.tight)
}

fn document(_: &mut HtmlRenderer, _: &Tree, _: NodeId, _: Phase) -> WalkStatus {
    WalkStatus::Continue
}

fn paragraph(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if in_tight_item(tree, node) {
        if !phase.is_enter() && tree.next_sibling(node).is_some() {
            r.ctx.write("\n");
        }
        return WalkStatus::Continue;
    }
    if phase.is_enter() {
        r.ctx.write("<p");
        r.write_ial(tree, node, true);
        r.ctx.write(">");
        if r.ctx.options.chinese_paragraph_beginning_space {
            r.ctx.write("&emsp;&emsp;");
        }
    } else {
        r.ctx.write("</p>\n");
    }
    WalkStatus::Continue
}

fn heading(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    let level = tree[node].heading_level.clamp(1, 6);
    if phase.is_enter() {
        let mut open = format!("<h{level}");
        if let Some(id) = r.heading_id(tree, node) {
            write_attr(&mut open, "id", &id);
        }
        r.ctx.write(&open);
        r.write_ial(tree, node, false);
        r.ctx.write(">");
        return WalkStatus::Continue;
    }

    if r.ctx.options.heading_anchor
        && r.flavor != Flavor::Export
        && let Some(id) = r.ctx.headings.get(node)
    {
        let mut anchor = String::from("<a");
        write_attr(&mut anchor, "id", &format!("vditorAnchor-{id}"));
        anchor.push_str(r#" class="vditor-anchor""#);
        write_attr(&mut anchor, "href", &format!("#{id}"));
        anchor.push('>');
        anchor.push_str(SVG_ANCHOR);
        anchor.push_str("</a>");
        r.ctx.write(&anchor);
    }
    r.ctx.write(&format!("</h{level}>\n"));
    WalkStatus::Continue
}

fn thematic_break(r: &mut HtmlRenderer, _: &Tree, _: NodeId, _: Phase) -> WalkStatus {
    r.ctx.write("<hr />\n");
    WalkStatus::SkipChildren
}

fn blockquote(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if phase.is_enter() {
        r.ctx.write("<blockquote");
        r.write_ial(tree, node, true);
        r.ctx.write(">\n");
    } else {
        r.ctx.write("</blockquote>\n");
    }
    WalkStatus::Continue
}

fn list(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    let data = tree[node].list.clone().unwrap_or_default();
    let ordered = data.kind == ListKind::Ordered;
    let tag = if ordered { "ol" } else { "ul" };
    if phase.is_enter() {
        let mut open = format!("<{tag}");
        if ordered && data.start != 1 {
            write!(open, r#" start="{}""#, data.start).unwrap();
        }
        r.ctx.write(&open);
        r.write_ial(tree, node, true);
        r.ctx.write(">\n");
    } else {
        r.ctx.write(&format!("</{tag}>\n"));
    }
    WalkStatus::Continue
}

fn list_item(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if !phase.is_enter() {
        r.ctx.write("</li>\n");
        return WalkStatus::Continue;
    }
    let mut open = String::from("<li");
    if tree.child_of_kind(node, NodeKind::TaskListItemMarker).is_some() {
        write_attr(&mut open, "class", &r.ctx.options.gfm_task_list_item_class);
    }
    r.ctx.write(&open);
    let with_id = r.flavor != Flavor::Export;
    r.write_ial(tree, node, with_id);
    r.ctx.write(">");
    WalkStatus::Continue
}

fn task_marker(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let checked = tree[node].task_checked;
    let markup = match (r.flavor, checked) {
        (Flavor::Export, true) => "☑ ",
        (Flavor::Export, false) => "☐ ",
        (_, true) => r#"<input checked="" disabled="" type="checkbox" /> "#,
        (_, false) => r#"<input disabled="" type="checkbox" /> "#,
    };
    r.ctx.write(markup);
    WalkStatus::SkipChildren
}

fn html(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let raw = &tree[node].tokens;
    // Inside image alt text raw markup is plain text.
    if !r.ctx.tags_enabled() {
        r.ctx.write_escaped(raw);
    } else if r.ctx.options.sanitize {
        let clean = r.ctx.services.sanitizer.sanitize(raw);
        r.ctx.write(&clean);
    } else {
        r.ctx.write(raw);
    }
    WalkStatus::SkipChildren
}

fn code_block(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    render_code_block(&mut r.ctx, tree, node, r.flavor == Flavor::Export);
    WalkStatus::SkipChildren
}

fn math_block(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let content = child_tokens(tree, node, NodeKind::MathBlockContent);
    r.ctx.write(r#"<div class="language-math""#);
    r.write_ial(tree, node, true);
    r.ctx.write(">");
    r.ctx.write_escaped(content);
    r.ctx.write("</div>\n");
    WalkStatus::SkipChildren
}

fn inline_math(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let content = child_tokens(tree, node, NodeKind::InlineMathContent);
    r.ctx.space_before(tree, node);
    r.ctx.tag(r#"<span class="language-math">"#);
    r.ctx.write_escaped(content);
    r.ctx.tag("</span>");
    r.ctx.space_after(tree, node);
    WalkStatus::SkipChildren
}

fn code_span_content(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    r.ctx.write_escaped(&tree[node].tokens);
    WalkStatus::SkipChildren
}

fn inline_flag(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if phase.is_enter() {
        r.ctx.space_before(tree, node);
    } else {
        r.ctx.space_after(tree, node);
    }
    WalkStatus::Continue
}

fn inline_marker(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let markup = match tree[node].kind {
        NodeKind::EmphasisOpenMarker => "<em>",
        NodeKind::EmphasisCloseMarker | NodeKind::TagCloseMarker => "</em>",
        NodeKind::StrongOpenMarker => "<strong>",
        NodeKind::StrongCloseMarker => "</strong>",
        NodeKind::StrikethroughOpenMarker => "<del>",
        NodeKind::StrikethroughCloseMarker => "</del>",
        NodeKind::MarkOpenMarker => "<mark>",
        NodeKind::MarkCloseMarker => "</mark>",
        NodeKind::TagOpenMarker => r#"<em data-type="tag">"#,
        NodeKind::CodeSpanOpenMarker => "<code>",
        NodeKind::CodeSpanCloseMarker => "</code>",
        _ => "",
    };
    r.ctx.tag(markup);
    WalkStatus::SkipChildren
}

fn link(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if !phase.is_enter() {
        r.ctx.tag("</a>");
        r.ctx.space_after(tree, node);
        return WalkStatus::Continue;
    }
    r.ctx.space_before(tree, node);
    let mut open = String::from("<a");
    write_attr(&mut open, "href", &r.ctx.link_dest(link_dest_of(tree, node)));
    let title = link_title_of(tree, node);
    if !title.is_empty() {
        write_attr(&mut open, "title", title);
    }
    open.push('>');
    r.ctx.tag(&open);
    WalkStatus::Continue
}

fn image(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if phase.is_enter() {
        if r.ctx.tags_enabled() {
            r.ctx.out.push_scope();
            let dest = r.ctx.link_dest(link_dest_of(tree, node));
            let mut open = String::from("<img");
            match &r.ctx.options.image_lazy_loading {
                Some(placeholder) => {
                    write_attr(&mut open, "src", placeholder);
                    write_attr(&mut open, "data-src", &dest);
                }
                None => write_attr(&mut open, "src", &dest),
            }
            open.push_str(r#" alt=""#);
            r.ctx.write(&open);
        }
        r.ctx.enter_image();
        return WalkStatus::Continue;
    }

    r.ctx.exit_image();
    if r.ctx.tags_enabled() {
        let mut close = String::from("\"");
        let title = link_title_of(tree, node);
        if !title.is_empty() {
            write_attr(&mut close, "title", title);
        }
        close.push_str(" />");
        r.ctx.write(&close);
        if let Some(img) = r.ctx.out.pop_scope() {
            let img = if r.ctx.options.sanitize {
                r.ctx.services.sanitizer.sanitize(&img)
            } else {
                img
            };
            r.ctx.write(&img);
        }
    }
    WalkStatus::Continue
}

fn table(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if phase.is_enter() {
        r.ctx.write("<table");
        r.write_ial(tree, node, true);
        if tree.children(node).is_empty() {
            r.ctx.write("></table>\n");
            return WalkStatus::SkipChildren;
        }
        r.ctx.write(">\n");
    } else {
        r.ctx.write("</table>\n");
    }
    WalkStatus::Continue
}

fn table_head(r: &mut HtmlRenderer, _: &Tree, _: NodeId, phase: Phase) -> WalkStatus {
    if phase.is_enter() {
        r.ctx.write("<thead>\n<tr>\n");
    } else {
        r.ctx.write("</tr>\n</thead>\n");
    }
    WalkStatus::Continue
}

fn table_row(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    let is_body_row = |row: NodeId| tree[row].kind == NodeKind::TableRow;
    if phase.is_enter() {
        if !tree.previous_sibling(node).is_some_and(is_body_row) {
            r.ctx.write("<tbody>\n");
        }
        r.ctx.write("<tr>\n");
    } else {
        r.ctx.write("</tr>\n");
        if !tree.next_sibling(node).is_some_and(is_body_row) {
            r.ctx.write("</tbody>\n");
        }
    }
    WalkStatus::Continue
}

fn table_cell(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    let in_head = tree
        .parent(node)
        .is_some_and(|parent| tree[parent].kind == NodeKind::TableHead);
    let tag = if in_head { "th" } else { "td" };
    if phase.is_enter() {
        let mut open = format!("<{tag}");
        if let Some(align) = tree[node].cell_align.as_css() {
            write!(open, r#" style="text-align:{align}""#).unwrap();
        }
        open.push('>');
        r.ctx.write(&open);
    } else {
        r.ctx.write(&format!("</{tag}>\n"));
    }
    WalkStatus::Continue
}

fn block_ref(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let (id, anchor) = block_ref_parts(tree, node);
    r.ctx.space_before(tree, node);
    let mut open = String::from(r#"<span data-type="block-ref""#);
    write_attr(&mut open, "data-id", id);
    write_attr(&mut open, "data-subtype", if anchor.is_some() { "s" } else { "d" });
    open.push('>');
    r.ctx.tag(&open);
    let text = r.ctx.text(anchor.unwrap_or(id));
    r.ctx.write_escaped(&text);
    r.ctx.tag("</span>");
    r.ctx.space_after(tree, node);
    WalkStatus::SkipChildren
}

/// Open and close tags for each subtype of a text mark, outermost first.
pub(crate) fn text_mark_tags(mark: &TextMark) -> Vec<(String, &'static str)> {
    let mut tags = Vec::with_capacity(mark.types.len());
    for kind in &mark.types {
        let simple = match kind.as_str() {
            "strong" => Some(("<strong>", "</strong>")),
            "em" => Some(("<em>", "</em>")),
            "s" => Some(("<del>", "</del>")),
            "mark" => Some(("<mark>", "</mark>")),
            "code" => Some(("<code>", "</code>")),
            "kbd" => Some(("<kbd>", "</kbd>")),
            "u" => Some(("<u>", "</u>")),
            "sup" => Some(("<sup>", "</sup>")),
            "sub" => Some(("<sub>", "</sub>")),
            "tag" => Some((r#"<em data-type="tag">"#, "</em>")),
            _ => None,
        };
        if let Some((open, close)) = simple {
            tags.push((open.to_owned(), close));
            continue;
        }

        let mut open = String::new();
        let close = match kind.as_str() {
            "a" => {
                open.push_str("<a");
                write_attr(&mut open, "href", &mark.href);
                if !mark.title.is_empty() {
                    write_attr(&mut open, "title", &mark.title);
                }
                "</a>"
            }
            "block-ref" => {
                open.push_str(r#"<span data-type="block-ref""#);
                write_attr(&mut open, "data-id", &mark.block_ref_id);
                write_attr(&mut open, "data-subtype", &mark.block_ref_subtype);
                "</span>"
            }
            "file-annotation-ref" => {
                open.push_str(r#"<span data-type="file-annotation-ref""#);
                write_attr(&mut open, "data-id", &mark.file_annotation_ref_id);
                "</span>"
            }
            "inline-memo" => {
                open.push_str(r#"<span data-type="inline-memo""#);
                write_attr(&mut open, "data-inline-memo-content", &mark.inline_memo_content);
                "</span>"
            }
            other => {
                open.push_str("<span");
                write_attr(&mut open, "data-type", other);
                "</span>"
            }
        };
        open.push('>');
        tags.push((open, close));
    }
    tags
}

fn text_mark(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let Some(mark) = tree[node].text_mark.as_ref() else {
        let text = r.ctx.text(&tree[node].tokens);
        r.ctx.write_escaped(&text);
        return WalkStatus::SkipChildren;
    };

    r.ctx.space_before(tree, node);
    if mark.has("inline-math") {
        r.ctx.tag(r#"<span class="language-math">"#);
        r.ctx.write_escaped(&mark.inline_math_content);
        r.ctx.tag("</span>");
    } else {
        let tags = text_mark_tags(mark);
        for (open, _) in &tags {
            r.ctx.tag(open);
        }
        let text = if mark.has("code") {
            tree[node].tokens.clone()
        } else {
            r.ctx.text(&tree[node].tokens)
        };
        r.ctx.write_escaped(&text);
        for (_, close) in tags.iter().rev() {
            r.ctx.tag(close);
        }
    }
    r.ctx.space_after(tree, node);
    WalkStatus::SkipChildren
}

fn super_block(r: &mut HtmlRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if !phase.is_enter() {
        r.ctx.write("</div>\n");
        return WalkStatus::Continue;
    }
    let layout = tree
        .child_of_kind(node, NodeKind::SuperBlockLayoutMarker)
        .map_or("row", |m| tree[m].tokens.as_str());
    let mut open = String::from(r#"<div class="sb""#);
    write_attr(&mut open, "data-sb-layout", layout);
    r.ctx.write(&open);
    r.write_ial(tree, node, true);
    r.ctx.write(">\n");
    WalkStatus::Continue
}
