//! Editable block HTML.
//!
//! Every block becomes a `<div>` carrying `data-node-id`, `data-type` and
//! its attribute list, followed by an empty `protyle-attr` element. Top-level
//! blocks also get a running `data-node-index`. Inline spans are
//! `<span data-type="...">` elements the editor can toggle in place.

use std::fmt::Write;
use std::sync::Arc;

use lucent_ast::{ListKind, NodeId, NodeKind, Tree, new_node_id};

use crate::code_block::{code_of, language_of};
use crate::context::{RenderContext, write_attr};
use crate::engine::{Dispatch, Phase, Renderer, WalkStatus, Walker, category_handler, walk};
use crate::escape::push_escaped;
use crate::footnotes::{Footnotes, render_entries};
use crate::handlers::{
    ContextBackend, block_ref_parts, child_tokens, footnotes_back_ref, footnotes_def,
    footnotes_ref, hard_break, html_entity, link_dest_of, link_title_of, soft_break, text, toc,
};
use crate::options::Options;
use crate::services::Services;
use crate::util::is_remote;

const BLOCK_ATTR: &str = r#"<div class="protyle-attr" contenteditable="false"></div></div>"#;

/// Renders a tree to editable block HTML.
pub struct ProtyleRenderer {
    tree: Arc<Tree>,
    ctx: RenderContext,
    dispatch: Dispatch<Self>,
}

impl ProtyleRenderer {
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
            dispatch: Self::default_dispatch(),
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

    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    #[must_use]
    pub fn default_dispatch() -> Dispatch<Self> {
        let mut dispatch = Dispatch::new()
            .on(NodeKind::Paragraph, paragraph)
            .on(NodeKind::Heading, heading)
            .on(NodeKind::ThematicBreak, thematic_break)
            .on(NodeKind::Blockquote, container)
            .on(NodeKind::SuperBlock, container)
            .on(NodeKind::List, list)
            .on(NodeKind::ListItem, list_item)
            .on(NodeKind::HtmlBlock, html_block)
            .on(NodeKind::InlineHtml, inline_html)
            .on(NodeKind::HtmlEntity, html_entity)
            .on(NodeKind::CodeBlock, code_block)
            .on(NodeKind::MathBlock, math_block)
            .on(NodeKind::YamlFrontMatter, front_matter)
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
            .on(NodeKind::Toc, toc);
        dispatch.set_default(category_handler);
        dispatch
    }

    /// Render the collected footnote definitions; see
    /// [`HtmlRenderer::render_footnote_defs`](crate::HtmlRenderer::render_footnote_defs).
    pub fn render_footnote_defs(&mut self) -> String {
        if self.ctx.footnotes.is_rendering() {
            return String::new();
        }
        let (entries, ordinals) = self.ctx.footnotes.finish(&self.tree);
        let options = Arc::clone(&self.ctx.options);
        let services = Arc::clone(&self.ctx.services);
        let dispatch = self.dispatch.clone();
        render_entries(entries, |tree| {
            let mut renderer =
                Self::with_services(tree, Arc::clone(&options), Arc::clone(&services))
                    .with_dispatch(dispatch.clone());
            renderer.ctx.footnotes = Footnotes::rendering(Arc::clone(&ordinals));
            renderer.render()
        })
    }

    /// Write the opening `<div>` of a block.
    ///
    /// `extra` attributes come first, matching the editor's attribute order.
    fn open_block(&mut self, tree: &Tree, node: NodeId, class: &str, extra: &[(&str, &str)]) {
        let mut open = String::from("<div");
        for (key, value) in extra {
            write_attr(&mut open, key, value);
        }
        let id = if tree[node].id.is_empty() {
            new_node_id()
        } else {
            tree[node].id.clone()
        };
        write_attr(&mut open, "data-node-id", &id);
        let top_level = tree
            .parent(node)
            .is_some_and(|parent| tree[parent].kind == NodeKind::Document);
        if top_level && !self.ctx.footnotes.is_rendering() {
            write!(open, r#" data-node-index="{}""#, self.ctx.next_node_index()).unwrap();
        }
        write_attr(&mut open, "data-type", tree[node].kind.name());
        write_attr(&mut open, "class", class);
        self.ctx.write(&open);
        self.ctx.write_ial(&tree[node], false);
        self.ctx.write(">");
    }

    fn open_editable(&mut self) {
        let editable = if self.ctx.options.protyle_contenteditable {
            "true"
        } else {
            "false"
        };
        self.ctx
            .write(&format!(r#"<div contenteditable="{editable}" spellcheck="false">"#));
    }

    /// Placeholder block rendered client-side from `data-content`.
    fn render_node(&mut self, tree: &Tree, node: NodeId, subtype: &str, content: &str) {
        self.open_block(
            tree,
            node,
            "render-node",
            &[("data-subtype", subtype), ("data-content", content)],
        );
        self.ctx.write(r#"<div spin="1"></div>"#);
        self.ctx.write(BLOCK_ATTR);
    }
}

impl ContextBackend for ProtyleRenderer {
    fn ctx(&mut self) -> &mut RenderContext {
        &mut self.ctx
    }
}

impl Walker for ProtyleRenderer {
    fn dispatch(&self) -> &Dispatch<Self> {
        &self.dispatch
    }
}

impl Renderer for ProtyleRenderer {
    fn render(&mut self) -> String {
        let tree = Arc::clone(&self.tree);
        walk(self, &tree, tree.root());
        let mut out = self.ctx.out.take_string();
        out.push_str(&self.render_footnote_defs());
        out
    }
}

fn list_subtype(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Bullet => "u",
        ListKind::Ordered => "o",
        ListKind::Task => "t",
    }
}

fn paragraph(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if phase.is_enter() {
        r.open_block(tree, node, "p", &[]);
        r.open_editable();
    } else {
        r.ctx.write("</div>");
        r.ctx.write(BLOCK_ATTR);
    }
    WalkStatus::Continue
}

fn heading(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if phase.is_enter() {
        let level = format!("h{}", tree[node].heading_level.clamp(1, 6));
        r.open_block(tree, node, &level, &[("data-subtype", level.as_str())]);
        r.open_editable();
    } else {
        r.ctx.write("</div>");
        r.ctx.write(BLOCK_ATTR);
    }
    WalkStatus::Continue
}

fn thematic_break(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    r.open_block(tree, node, "hr", &[]);
    r.ctx.write("<div></div>");
    r.ctx.write(BLOCK_ATTR);
    WalkStatus::SkipChildren
}

/// Blockquotes and super blocks: children are blocks.
fn container(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if !phase.is_enter() {
        r.ctx.write(BLOCK_ATTR);
        return WalkStatus::Continue;
    }
    if tree[node].kind == NodeKind::SuperBlock {
        let layout = tree
            .child_of_kind(node, NodeKind::SuperBlockLayoutMarker)
            .map_or("row", |m| tree[m].tokens.as_str());
        r.open_block(tree, node, "sb", &[("data-sb-layout", layout)]);
    } else {
        r.open_block(tree, node, "bq", &[]);
    }
    WalkStatus::Continue
}

fn list(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if phase.is_enter() {
        let kind = tree[node].list.as_ref().map(|data| data.kind).unwrap_or_default();
        r.open_block(tree, node, "list", &[("data-subtype", list_subtype(kind))]);
    } else {
        r.ctx.write(BLOCK_ATTR);
    }
    WalkStatus::Continue
}

fn list_item(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if !phase.is_enter() {
        r.ctx.write(BLOCK_ATTR);
        return WalkStatus::Continue;
    }
    let data = tree[node].list.clone().unwrap_or_default();
    let checked = tree[node].task_checked;
    let class = if data.kind == ListKind::Task && checked {
        "li protyle-task--done"
    } else {
        "li"
    };
    r.open_block(
        tree,
        node,
        class,
        &[
            ("data-marker", data.marker.as_str()),
            ("data-subtype", list_subtype(data.kind)),
        ],
    );

    let action = match data.kind {
        ListKind::Bullet => {
            r##"<div class="protyle-action" draggable="true"><svg><use xlink:href="#iconDot"></use></svg></div>"##
                .to_owned()
        }
        ListKind::Ordered => {
            let mut action = String::from(
                r#"<div class="protyle-action protyle-action--order" contenteditable="false" draggable="true">"#,
            );
            push_escaped(&mut action, &data.marker);
            action.push_str("</div>");
            action
        }
        ListKind::Task => {
            let icon = if checked { "iconCheck" } else { "iconUncheck" };
            format!(
                r##"<div class="protyle-action protyle-action--task" draggable="true"><svg><use xlink:href="#{icon}"></use></svg></div>"##
            )
        }
    };
    r.ctx.write(&action);
    WalkStatus::Continue
}

fn html_block(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let raw = &tree[node].tokens;
    let content = if r.ctx.options.sanitize {
        r.ctx.services.sanitizer.sanitize(raw)
    } else {
        raw.clone()
    };
    r.open_block(tree, node, "render-node", &[("data-subtype", "block")]);
    let mut inner = String::from("<div><protyle-html");
    write_attr(&mut inner, "data-content", &content);
    inner.push_str("></protyle-html></div>");
    r.ctx.write(&inner);
    r.ctx.write(BLOCK_ATTR);
    WalkStatus::SkipChildren
}

fn inline_html(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    r.ctx.write_escaped(&tree[node].tokens);
    WalkStatus::SkipChildren
}

fn code_block(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let language = language_of(tree, node);
    let code = code_of(tree, node);
    if !language.is_empty() && r.ctx.options.is_diagram_language(&language) {
        r.render_node(tree, node, &language, code);
        return WalkStatus::SkipChildren;
    }

    r.open_block(tree, node, "code-block", &[]);
    let mut action =
        String::from(r#"<div class="protyle-action"><span class="protyle-action--first protyle-action__language">"#);
    push_escaped(&mut action, &language);
    action.push_str(concat!(
        r#"</span><span class="fn__flex-1"></span>"#,
        r##"<span class="protyle-icon protyle-icon--first protyle-action__copy"><svg><use xlink:href="#iconCopy"></use></svg></span>"##,
        r##"<span class="protyle-icon protyle-icon--last protyle-action__menu"><svg><use xlink:href="#iconMore"></use></svg></span></div>"##,
    ));
    r.ctx.write(&action);
    r.open_editable();
    r.ctx.write_escaped(code);
    r.ctx.write("</div>");
    r.ctx.write(BLOCK_ATTR);
    WalkStatus::SkipChildren
}

fn math_block(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let content = child_tokens(tree, node, NodeKind::MathBlockContent);
    r.render_node(tree, node, "math", content);
    WalkStatus::SkipChildren
}

fn front_matter(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    r.render_node(tree, node, "yaml", &tree[node].tokens);
    WalkStatus::SkipChildren
}

fn inline_math(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let content = child_tokens(tree, node, NodeKind::InlineMathContent);
    let mut span = String::from(r#"<span data-type="inline-math" data-subtype="math""#);
    write_attr(&mut span, "data-content", content);
    span.push_str(r#" contenteditable="false" class="render-node"></span>"#);
    r.ctx.space_before(tree, node);
    r.ctx.tag(&span);
    r.ctx.space_after(tree, node);
    WalkStatus::SkipChildren
}

fn code_span_content(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    r.ctx.write_escaped(&tree[node].tokens);
    WalkStatus::SkipChildren
}

fn inline_flag(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if phase.is_enter() {
        r.ctx.space_before(tree, node);
    } else {
        r.ctx.space_after(tree, node);
    }
    WalkStatus::Continue
}

/// Open markers start a `<span data-type>`, close markers end it.
fn inline_marker(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let data_type = match tree[node].kind {
        NodeKind::EmphasisOpenMarker => "em",
        NodeKind::StrongOpenMarker => "strong",
        NodeKind::StrikethroughOpenMarker => "s",
        NodeKind::MarkOpenMarker => "mark",
        NodeKind::TagOpenMarker => "tag",
        NodeKind::CodeSpanOpenMarker => "code",
        _ => {
            r.ctx.tag("</span>");
            return WalkStatus::SkipChildren;
        }
    };
    r.ctx.tag(&format!(r#"<span data-type="{data_type}">"#));
    WalkStatus::SkipChildren
}

fn link(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if !phase.is_enter() {
        r.ctx.tag("</span>");
        r.ctx.space_after(tree, node);
        return WalkStatus::Continue;
    }
    r.ctx.space_before(tree, node);
    let mut open = String::from(r#"<span data-type="a""#);
    write_attr(&mut open, "data-href", &r.ctx.link_dest(link_dest_of(tree, node)));
    let title = link_title_of(tree, node);
    if !title.is_empty() {
        write_attr(&mut open, "data-title", title);
    }
    open.push('>');
    r.ctx.tag(&open);
    WalkStatus::Continue
}

fn image(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if phase.is_enter() {
        if r.ctx.tags_enabled() {
            let dest = r.ctx.link_dest(link_dest_of(tree, node));
            let class = if r.ctx.options.protyle_mark_net_img && is_remote(&dest) {
                "img img--net"
            } else {
                "img"
            };
            r.ctx.write(&format!(
                r#"<span contenteditable="false" data-type="img" class="{class}">"#
            ));
            r.ctx.out.push_scope();
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
        r.ctx.write("</span>");
    }
    WalkStatus::Continue
}

fn table(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    if !phase.is_enter() {
        r.ctx.write("</table></div>");
        r.ctx.write(BLOCK_ATTR);
        return WalkStatus::Continue;
    }
    r.open_block(tree, node, "table", &[]);
    r.ctx.write(r#"<div contenteditable="false"><table contenteditable="true" spellcheck="false">"#);
    WalkStatus::Continue
}

fn table_head(r: &mut ProtyleRenderer, _: &Tree, _: NodeId, phase: Phase) -> WalkStatus {
    r.ctx.write(if phase.is_enter() {
        "<thead><tr>"
    } else {
        "</tr></thead>"
    });
    WalkStatus::Continue
}

fn table_row(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
    let is_body_row = |row: NodeId| tree[row].kind == NodeKind::TableRow;
    if phase.is_enter() {
        if !tree.previous_sibling(node).is_some_and(is_body_row) {
            r.ctx.write("<tbody>");
        }
        r.ctx.write("<tr>");
    } else {
        r.ctx.write("</tr>");
        if !tree.next_sibling(node).is_some_and(is_body_row) {
            r.ctx.write("</tbody>");
        }
    }
    WalkStatus::Continue
}

fn table_cell(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, phase: Phase) -> WalkStatus {
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
        r.ctx.write(&format!("</{tag}>"));
    }
    WalkStatus::Continue
}

fn block_ref(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let (id, anchor) = block_ref_parts(tree, node);
    let mut open = String::from(r#"<span data-type="block-ref""#);
    write_attr(&mut open, "data-id", id);
    write_attr(&mut open, "data-subtype", if anchor.is_some() { "s" } else { "d" });
    open.push('>');
    r.ctx.space_before(tree, node);
    r.ctx.tag(&open);
    r.ctx.write_escaped(anchor.unwrap_or(id));
    r.ctx.tag("</span>");
    r.ctx.space_after(tree, node);
    WalkStatus::SkipChildren
}

fn text_mark(r: &mut ProtyleRenderer, tree: &Tree, node: NodeId, _: Phase) -> WalkStatus {
    let Some(mark) = tree[node].text_mark.as_ref() else {
        r.ctx.write_escaped(&tree[node].tokens);
        return WalkStatus::SkipChildren;
    };

    let mut open = String::from("<span");
    write_attr(&mut open, "data-type", &mark.joined());
    if mark.has("a") {
        write_attr(&mut open, "data-href", &mark.href);
        if !mark.title.is_empty() {
            write_attr(&mut open, "data-title", &mark.title);
        }
    }
    if mark.has("block-ref") {
        write_attr(&mut open, "data-id", &mark.block_ref_id);
        write_attr(&mut open, "data-subtype", &mark.block_ref_subtype);
    }
    if mark.has("file-annotation-ref") {
        write_attr(&mut open, "data-id", &mark.file_annotation_ref_id);
    }
    if mark.has("inline-memo") {
        write_attr(&mut open, "data-inline-memo-content", &mark.inline_memo_content);
    }

    r.ctx.space_before(tree, node);
    if mark.has("inline-math") {
        write_attr(&mut open, "data-subtype", "math");
        write_attr(&mut open, "data-content", &mark.inline_math_content);
        open.push_str(r#" contenteditable="false" class="render-node"></span>"#);
        r.ctx.tag(&open);
    } else {
        open.push('>');
        r.ctx.tag(&open);
        r.ctx.write_escaped(&tree[node].tokens);
        r.ctx.tag("</span>");
    }
    r.ctx.space_after(tree, node);
    WalkStatus::SkipChildren
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucent_ast::{Node, ParseOptions, TextMark, parse};
    use pretty_assertions::assert_eq;

    const ATTR: &str = BLOCK_ATTR;

    /// Parse and give blocks predictable ids `b1`, `b2`, ... in document order.
    fn fixed_tree(markdown: &str) -> Tree {
        let mut tree = parse(markdown, &ParseOptions::default());
        let blocks: Vec<NodeId> = tree
            .descendants(tree.root())
            .filter(|&n| tree[n].kind.is_block() && tree[n].kind != NodeKind::Document)
            .collect();
        for (i, block) in blocks.into_iter().enumerate() {
            tree[block].id = format!("b{}", i + 1);
        }
        tree
    }

    fn render_with(markdown: &str, options: Options) -> String {
        let tree = Arc::new(fixed_tree(markdown));
        ProtyleRenderer::new(tree, Arc::new(options)).render()
    }

    fn render(markdown: &str) -> String {
        render_with(markdown, Options::default())
    }

    #[test]
    fn test_paragraphs_are_indexed() {
        assert_eq!(
            render("one\n\ntwo\n"),
            format!(
                "<div data-node-id=\"b1\" data-node-index=\"1\" data-type=\"NodeParagraph\" class=\"p\"><div contenteditable=\"true\" spellcheck=\"false\">one</div>{ATTR}\
                 <div data-node-id=\"b2\" data-node-index=\"2\" data-type=\"NodeParagraph\" class=\"p\"><div contenteditable=\"true\" spellcheck=\"false\">two</div>{ATTR}"
            )
        );
    }

    #[test]
    fn test_node_index_start() {
        let options = Options {
            node_index_start: 5,
            ..Options::default()
        };
        assert!(render_with("one\n", options).contains("data-node-index=\"5\""));
    }

    #[test]
    fn test_heading() {
        assert_eq!(
            render("## T\n"),
            format!(
                "<div data-subtype=\"h2\" data-node-id=\"b1\" data-node-index=\"1\" data-type=\"NodeHeading\" class=\"h2\"><div contenteditable=\"true\" spellcheck=\"false\">T</div>{ATTR}"
            )
        );
    }

    #[test]
    fn test_list() {
        assert_eq!(
            render("- a\n"),
            format!(
                "<div data-subtype=\"u\" data-node-id=\"b1\" data-node-index=\"1\" data-type=\"NodeList\" class=\"list\">\
                 <div data-marker=\"-\" data-subtype=\"u\" data-node-id=\"b2\" data-type=\"NodeListItem\" class=\"li\">\
                 <div class=\"protyle-action\" draggable=\"true\"><svg><use xlink:href=\"#iconDot\"></use></svg></div>\
                 <div data-node-id=\"b3\" data-type=\"NodeParagraph\" class=\"p\"><div contenteditable=\"true\" spellcheck=\"false\">a</div>{ATTR}\
                 {ATTR}{ATTR}"
            )
        );
    }

    #[test]
    fn test_task_and_ordered_items() {
        let html = render("- [x] done\n");
        assert!(html.contains("data-subtype=\"t\""));
        assert!(html.contains("class=\"li protyle-task--done\""));
        assert!(html.contains("#iconCheck"));
        assert!(!html.contains("<input"));

        let html = render("3. a\n");
        assert!(html.contains("data-marker=\"3.\" data-subtype=\"o\""));
        assert!(html.contains("protyle-action--order\" contenteditable=\"false\" draggable=\"true\">3.</div>"));
    }

    #[test]
    fn test_inline_spans() {
        let html = render("**b** [l](u \"t\") `c<`\n");
        assert!(html.contains(
            "<span data-type=\"strong\">b</span> <span data-type=\"a\" data-href=\"u\" data-title=\"t\">l</span> <span data-type=\"code\">c&lt;</span>"
        ));
    }

    #[test]
    fn test_span_markup_follows_markers() {
        let html = render("*e* ==m== #t#\n");
        assert!(html.contains(
            "<span data-type=\"em\">e</span> <span data-type=\"mark\">m</span> <span data-type=\"tag\">t</span>"
        ));
    }

    #[test]
    fn test_span_markup_dropped_in_image_alt() {
        let html = render("![**b**](p.png)\n");
        assert!(!html.contains("<span data-type=\"strong\">"));
    }

    #[test]
    fn test_block_ial_without_id() {
        let html = render("para\n{: id=\"x1\" style=\"color:red\"}\n");
        assert!(html.starts_with(
            "<div data-node-id=\"b1\" data-node-index=\"1\" data-type=\"NodeParagraph\" class=\"p\" style=\"color:red\">"
        ));
    }

    #[test]
    fn test_code_block() {
        let html = render("```rust\nfn x() {}\n```\n");
        assert!(html.contains("data-type=\"NodeCodeBlock\" class=\"code-block\">"));
        assert!(html.contains("protyle-action__language\">rust</span>"));
        assert!(html.contains("<div contenteditable=\"true\" spellcheck=\"false\">fn x() {}\n</div>"));
    }

    #[test]
    fn test_diagram_and_math_render_nodes() {
        let html = render("```mermaid\nA-->B\n```\n");
        assert!(html.starts_with(
            "<div data-subtype=\"mermaid\" data-content=\"A--&gt;B\n\" data-node-id=\"b1\""
        ));
        assert!(html.contains("class=\"render-node\"><div spin=\"1\"></div>"));

        let html = render("$$x^2$$\n");
        assert!(html.starts_with("<div data-subtype=\"math\" data-content=\"x^2\""));
        assert!(html.contains("data-type=\"NodeMathBlock\""));
    }

    #[test]
    fn test_contenteditable_off() {
        let options = Options {
            protyle_contenteditable: false,
            ..Options::default()
        };
        assert!(render_with("a\n", options).contains("<div contenteditable=\"false\" spellcheck=\"false\">a</div>"));
    }

    #[test]
    fn test_net_image() {
        let options = Options {
            protyle_mark_net_img: true,
            ..Options::default()
        };
        let html = render_with("![a](https://x.io/a.png) ![b](b.png)\n", options);
        assert!(html.contains(
            "<span contenteditable=\"false\" data-type=\"img\" class=\"img img--net\"><img src=\"https://x.io/a.png\" alt=\"a\" /></span>"
        ));
        assert!(html.contains(
            "<span contenteditable=\"false\" data-type=\"img\" class=\"img\"><img src=\"b.png\" alt=\"b\" /></span>"
        ));
    }

    #[test]
    fn test_table() {
        let html = render("| a |\n|---|\n| 1 |\n");
        assert!(html.contains(
            "<div contenteditable=\"false\"><table contenteditable=\"true\" spellcheck=\"false\"><thead><tr><th>a</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table></div>"
        ));
    }

    #[test]
    fn test_generated_ids() {
        let tree = Arc::new(parse("a\n", &ParseOptions::default()));
        let html = ProtyleRenderer::new(tree, Arc::new(Options::default())).render();
        let id = html
            .split("data-node-id=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        assert_eq!(id.len(), 22);
        assert_eq!(id.as_bytes()[14], b'-');
    }

    #[test]
    fn test_text_mark_span() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.push(root, Node::new(NodeKind::Paragraph).with_id("p1"));
        let mark = TextMark {
            types: vec!["a".to_owned(), "strong".to_owned()],
            href: "https://x.io".to_owned(),
            ..TextMark::default()
        };
        tree.push(p, Node::new(NodeKind::TextMark).with_tokens("x").with_text_mark(mark));
        let html = ProtyleRenderer::new(Arc::new(tree), Arc::new(Options::default())).render();
        assert!(html.contains("<span data-type=\"a strong\" data-href=\"https://x.io\">x</span>"));
    }

    #[test]
    fn test_footnotes_follow_blocks() {
        let html = render("x[^1]\n\n[^1]: note\n");
        assert!(html.contains("<sup class=\"footnotes-ref\" id=\"footnotes-ref-1\">"));
        assert!(html.contains("<li id=\"footnotes-def-1\"><div data-node-id="));
        assert!(html.ends_with("</ol></div>"));
    }
}
