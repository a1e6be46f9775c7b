//! Markdown to [`Tree`] conversion.
//!
//! Walks pulldown-cmark offset events and builds the arena, synthesizing the
//! marker children the event stream only implies (emphasis delimiters,
//! fences, brackets) from the source slice each event covers.

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

use crate::id::new_node_id;
use crate::node::{ListData, ListKind, Node, NodeKind, TableAlign};
use crate::tree::{NodeId, Tree};

/// A paragraph that is exactly a kramdown block IAL: `{: key="value" ...}`.
static IAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\{:\s*([^}]*)\}$").unwrap());

/// One `key="value"` pair inside an IAL.
static IAL_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([\w:-]+)="([^"]*)""#).unwrap());

/// Inline syntax pulldown-cmark does not know: `==mark==`, `#tag#` and
/// `((id "anchor"))` block references.
static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"==(?P<mark>[^=\n]+)==|\(\((?P<ref>[0-9A-Za-z-]+)(?:\s+"(?P<anchor>[^"\n]*)")?\)\)|#(?P<tag>[^#\s][^#\n]*?)#"#,
    )
    .unwrap()
});

/// Parser options.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[allow(clippy::struct_excessive_bools)]
pub struct ParseOptions {
    /// Tables, strikethrough and task lists.
    pub gfm: bool,
    pub footnotes: bool,
    /// `$inline$` and `$$display$$` math.
    pub math: bool,
    /// `# Heading {#id .class}`.
    pub heading_attributes: bool,
    /// Leading YAML front matter.
    pub front_matter: bool,
    /// Kramdown block IAL paragraphs.
    pub kramdown_ial: bool,
    /// `[toc]` paragraphs.
    pub toc: bool,
    /// `==mark==`.
    pub mark: bool,
    /// `#tag#`.
    pub tag: bool,
    /// `((id "text"))`.
    pub block_ref: bool,
    /// Give every block without an id a fresh one.
    pub assign_ids: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            footnotes: true,
            math: true,
            heading_attributes: true,
            front_matter: true,
            kramdown_ial: true,
            toc: true,
            mark: true,
            tag: true,
            block_ref: true,
            assign_ids: false,
        }
    }
}

impl ParseOptions {
    fn pulldown_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options |= Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS;
        }
        if self.footnotes {
            options |= Options::ENABLE_FOOTNOTES;
        }
        if self.math {
            options |= Options::ENABLE_MATH;
        }
        if self.heading_attributes {
            options |= Options::ENABLE_HEADING_ATTRIBUTES;
        }
        if self.front_matter {
            options |= Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
        }
        options
    }
}

/// Parse Markdown into a document tree.
///
/// # Example
///
/// ```
/// use lucent_ast::{NodeKind, ParseOptions, parse};
///
/// let tree = parse("# Title\n\nHello *world*", &ParseOptions::default());
/// let root = tree.root();
/// let kinds: Vec<NodeKind> = tree.children(root).iter().map(|&c| tree[c].kind).collect();
/// assert_eq!(kinds, vec![NodeKind::Heading, NodeKind::Paragraph]);
/// ```
#[must_use]
pub fn parse(markdown: &str, options: &ParseOptions) -> Tree {
    let mut builder = TreeBuilder::new(markdown, options);
    for (event, range) in Parser::new_ext(markdown, options.pulldown_options()).into_offset_iter()
    {
        builder.event(event, range);
    }
    builder.finish()
}

/// Open element on the builder stack.
struct Frame {
    node: NodeId,
    /// Paragraph synthesized around inline content of a tight list item.
    implicit: bool,
    /// Tag with no node of its own; children go to the enclosing node.
    transparent: bool,
    /// Children appended when the element closes.
    closing: Vec<Node>,
}

struct TreeBuilder<'a> {
    source: &'a str,
    options: &'a ParseOptions,
    tree: Tree,
    stack: Vec<Frame>,
    /// One entry per open list: whether an item held an explicit paragraph.
    loose: Vec<bool>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str, options: &'a ParseOptions) -> Self {
        let tree = Tree::new();
        let root = tree.root();
        Self {
            source,
            options,
            tree,
            stack: vec![Frame {
                node: root,
                implicit: false,
                transparent: false,
                closing: Vec::new(),
            }],
            loose: Vec::new(),
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().map_or(self.tree.root(), |f| f.node)
    }

    fn current_kind(&self) -> NodeKind {
        self.tree[self.current()].kind
    }

    fn slice(&self, range: &Range<usize>) -> &'a str {
        self.source.get(range.clone()).unwrap_or_default()
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, &range),
            Event::End(tag) => self.end(&tag, &range),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let fence = leading_run(self.slice(&range), '`');
                self.delimited(
                    NodeKind::CodeSpan,
                    [
                        NodeKind::CodeSpanOpenMarker,
                        NodeKind::CodeSpanContent,
                        NodeKind::CodeSpanCloseMarker,
                    ],
                    fence,
                    &code,
                );
            }
            Event::InlineMath(math) => self.delimited(
                NodeKind::InlineMath,
                [
                    NodeKind::InlineMathOpenMarker,
                    NodeKind::InlineMathContent,
                    NodeKind::InlineMathCloseMarker,
                ],
                "$",
                &math,
            ),
            Event::DisplayMath(math) => self.delimited(
                NodeKind::InlineMath,
                [
                    NodeKind::InlineMathOpenMarker,
                    NodeKind::InlineMathContent,
                    NodeKind::InlineMathCloseMarker,
                ],
                "$$",
                &math,
            ),
            Event::Html(html) => {
                if self.current_kind() == NodeKind::HtmlBlock {
                    let current = self.current();
                    self.tree[current].tokens.push_str(&html);
                } else {
                    self.block_leaf(Node::new(NodeKind::HtmlBlock).with_tokens(html.to_string()));
                }
            }
            Event::InlineHtml(html) => {
                self.inline_leaf(Node::new(NodeKind::InlineHtml).with_tokens(html.to_string()));
            }
            Event::FootnoteReference(label) => {
                self.inline_leaf(Node::new(NodeKind::FootnotesRef).with_tokens(label.to_string()));
            }
            Event::SoftBreak => self.inline_leaf(Node::new(NodeKind::SoftBreak).with_tokens("\n")),
            Event::HardBreak => self.inline_leaf(Node::new(NodeKind::HardBreak)),
            Event::Rule => {
                let tokens = self.slice(&range).trim();
                self.block_leaf(Node::new(NodeKind::ThematicBreak).with_tokens(tokens));
            }
            Event::TaskListMarker(checked) => self.task_marker(checked),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start(&mut self, tag: Tag<'_>, range: &Range<usize>) {
        let source = self.slice(range);
        match tag {
            Tag::Paragraph => {
                if self.current_kind() == NodeKind::ListItem
                    && let Some(loose) = self.loose.last_mut()
                {
                    *loose = true;
                }
                self.open(Node::new(NodeKind::Paragraph), Vec::new());
            }
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let level = level as u8;
                let mut node = Node::new(NodeKind::Heading).with_heading_level(level);
                if !classes.is_empty() {
                    let joined: Vec<&str> = classes.iter().map(AsRef::as_ref).collect();
                    node = node.with_ial("class", joined.join(" "));
                }
                for (key, value) in &attrs {
                    node = node.with_ial(key.to_string(), value.as_deref().unwrap_or_default());
                }
                let closing = id
                    .map(|id| vec![Node::new(NodeKind::HeadingId).with_tokens(id.to_string())])
                    .unwrap_or_default();
                let heading = self.open(node, closing);
                if source.trim_start().starts_with('#') {
                    let marker = "#".repeat(usize::from(level));
                    self.tree
                        .push(heading, Node::new(NodeKind::HeadingC8hMarker).with_tokens(marker));
                }
            }
            Tag::BlockQuote(_) => {
                let quote = self.open(Node::new(NodeKind::Blockquote), Vec::new());
                self.tree
                    .push(quote, Node::new(NodeKind::BlockquoteMarker).with_tokens(">"));
            }
            Tag::CodeBlock(kind) => {
                let (info, fenced) = match kind {
                    CodeBlockKind::Fenced(info) => (info.trim().to_owned(), true),
                    CodeBlockKind::Indented => (String::new(), false),
                };
                let block = self.open(
                    Node::new(NodeKind::CodeBlock).with_code_block(info.clone(), fenced),
                    Vec::new(),
                );
                if fenced {
                    let trimmed = source.trim_start();
                    let fence_char = if trimmed.starts_with('~') { '~' } else { '`' };
                    let fence = leading_run(trimmed, fence_char);
                    self.tree.push(
                        block,
                        Node::new(NodeKind::CodeBlockFenceOpenMarker).with_tokens(fence),
                    );
                    self.tree.push(
                        block,
                        Node::new(NodeKind::CodeBlockFenceInfoMarker).with_tokens(info),
                    );
                }
                self.tree.push(block, Node::new(NodeKind::CodeBlockCode));
            }
            Tag::HtmlBlock => {
                self.open(Node::new(NodeKind::HtmlBlock), Vec::new());
            }
            Tag::List(start) => {
                let data = ListData {
                    kind: if start.is_some() {
                        ListKind::Ordered
                    } else {
                        ListKind::Bullet
                    },
                    start: start.unwrap_or(1),
                    marker: list_marker(source),
                    tight: true,
                };
                self.open(Node::new(NodeKind::List).with_list(data), Vec::new());
                self.loose.push(false);
            }
            Tag::Item => {
                let mut data = self.tree[self.current()].list.clone().unwrap_or_default();
                data.marker = list_marker(source);
                self.open(Node::new(NodeKind::ListItem).with_list(data), Vec::new());
            }
            Tag::FootnoteDefinition(label) => {
                self.open(
                    Node::new(NodeKind::FootnotesDef).with_tokens(label.to_string()),
                    Vec::new(),
                );
            }
            Tag::Table(alignments) => {
                let mut node = Node::new(NodeKind::Table);
                node.table_aligns = alignments.iter().map(|a| table_align(*a)).collect();
                self.open(node, Vec::new());
            }
            Tag::TableHead => {
                self.open(Node::new(NodeKind::TableHead), Vec::new());
            }
            Tag::TableRow => {
                self.open(Node::new(NodeKind::TableRow), Vec::new());
            }
            Tag::TableCell => {
                let row = self.current();
                let column = self.tree.children(row).len();
                let align = self
                    .tree
                    .parent(row)
                    .and_then(|table| self.tree[table].table_aligns.get(column).copied())
                    .unwrap_or_default();
                let mut node = Node::new(NodeKind::TableCell);
                node.cell_align = align;
                self.open(node, Vec::new());
            }
            Tag::Emphasis => {
                let marker = source.get(..1).unwrap_or("*");
                self.open_delimited(
                    NodeKind::Emphasis,
                    NodeKind::EmphasisOpenMarker,
                    NodeKind::EmphasisCloseMarker,
                    marker,
                );
            }
            Tag::Strong => {
                let marker = source.get(..2).unwrap_or("**");
                self.open_delimited(
                    NodeKind::Strong,
                    NodeKind::StrongOpenMarker,
                    NodeKind::StrongCloseMarker,
                    marker,
                );
            }
            Tag::Strikethrough => {
                let marker = leading_run(source, '~');
                self.open_delimited(
                    NodeKind::Strikethrough,
                    NodeKind::StrikethroughOpenMarker,
                    NodeKind::StrikethroughCloseMarker,
                    marker,
                );
            }
            Tag::Link {
                dest_url, title, ..
            } => {
                self.ensure_paragraph();
                let link = self.open(Node::new(NodeKind::Link), link_tail(&dest_url, &title));
                self.tree
                    .push(link, Node::new(NodeKind::OpenBracket).with_tokens("["));
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.ensure_paragraph();
                let image = self.open(Node::new(NodeKind::Image), link_tail(&dest_url, &title));
                self.tree.push(image, Node::new(NodeKind::Bang).with_tokens("!"));
                self.tree
                    .push(image, Node::new(NodeKind::OpenBracket).with_tokens("["));
            }
            Tag::MetadataBlock(_) => {
                self.open(Node::new(NodeKind::YamlFrontMatter), Vec::new());
            }
            Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => {
                let node = self.current();
                self.stack.push(Frame {
                    node,
                    implicit: false,
                    transparent: true,
                    closing: Vec::new(),
                });
            }
        }
    }

    fn end(&mut self, tag: &TagEnd, range: &Range<usize>) {
        let Some(node) = self.close() else {
            return;
        };
        match tag {
            TagEnd::Paragraph => self.finish_paragraph(node),
            TagEnd::List(_) => {
                let tight = !self.loose.pop().unwrap_or(false);
                if let Some(list) = self.tree[node].list.as_mut() {
                    list.tight = tight;
                }
                let items = self.tree.children(node).to_vec();
                for item in items {
                    if let Some(list) = self.tree[item].list.as_mut() {
                        list.tight = tight;
                    }
                }
            }
            TagEnd::CodeBlock => {
                let fence = self
                    .tree
                    .child_of_kind(node, NodeKind::CodeBlockFenceOpenMarker)
                    .map(|m| self.tree[m].tokens.clone());
                if let Some(fence) = fence
                    && self.slice(range).trim_end().ends_with(fence.as_str())
                    && self.slice(range).trim().len() > fence.len()
                {
                    self.tree.push(
                        node,
                        Node::new(NodeKind::CodeBlockFenceCloseMarker).with_tokens(fence),
                    );
                }
            }
            _ => {}
        }
    }

    /// Pop the innermost frame, closing implicit paragraphs on the way.
    ///
    /// Returns the closed node, or `None` for transparent tags.
    fn close(&mut self) -> Option<NodeId> {
        self.close_implicit();
        if self.stack.len() <= 1 {
            return None;
        }
        let frame = self.stack.pop()?;
        if frame.transparent {
            return None;
        }
        for node in frame.closing {
            self.tree.push(frame.node, node);
        }
        Some(frame.node)
    }

    fn close_implicit(&mut self) {
        while self.stack.last().is_some_and(|f| f.implicit) {
            if let Some(frame) = self.stack.pop() {
                self.finish_paragraph(frame.node);
            }
        }
    }

    fn open(&mut self, node: Node, closing: Vec<Node>) -> NodeId {
        if node.kind.is_block() {
            self.close_implicit();
        }
        let parent = self.current();
        let id = self.tree.push(parent, node);
        self.stack.push(Frame {
            node: id,
            implicit: false,
            transparent: false,
            closing,
        });
        id
    }

    fn open_delimited(&mut self, kind: NodeKind, open: NodeKind, close: NodeKind, marker: &str) {
        self.ensure_paragraph();
        let node = self.open(
            Node::new(kind),
            vec![Node::new(close).with_tokens(marker)],
        );
        self.tree.push(node, Node::new(open).with_tokens(marker));
    }

    /// Wrap inline content of a tight list item in a paragraph.
    fn ensure_paragraph(&mut self) {
        if self.current_kind() == NodeKind::ListItem {
            let parent = self.current();
            let id = self.tree.push(parent, Node::new(NodeKind::Paragraph));
            self.stack.push(Frame {
                node: id,
                implicit: true,
                transparent: false,
                closing: Vec::new(),
            });
        }
    }

    fn inline_leaf(&mut self, node: Node) {
        self.ensure_paragraph();
        let parent = self.current();
        self.tree.push(parent, node);
    }

    fn block_leaf(&mut self, node: Node) {
        self.close_implicit();
        let parent = self.current();
        self.tree.push(parent, node);
    }

    fn delimited(&mut self, kind: NodeKind, parts: [NodeKind; 3], marker: &str, content: &str) {
        self.ensure_paragraph();
        let parent = self.current();
        let node = self.tree.push(parent, Node::new(kind));
        self.tree.push(node, Node::new(parts[0]).with_tokens(marker));
        self.tree.push(node, Node::new(parts[1]).with_tokens(content));
        self.tree.push(node, Node::new(parts[2]).with_tokens(marker));
    }

    fn text(&mut self, text: &str) {
        match self.current_kind() {
            NodeKind::CodeBlock => {
                let block = self.current();
                if let Some(code) = self.tree.child_of_kind(block, NodeKind::CodeBlockCode) {
                    self.tree[code].tokens.push_str(text);
                }
                return;
            }
            NodeKind::HtmlBlock | NodeKind::YamlFrontMatter => {
                let block = self.current();
                self.tree[block].tokens.push_str(text);
                return;
            }
            _ => {}
        }

        self.ensure_paragraph();
        let parent = self.current();
        let kind = if matches!(self.tree[parent].kind, NodeKind::Link | NodeKind::Image) {
            NodeKind::LinkText
        } else {
            NodeKind::Text
        };
        if let Some(last) = self.tree.last_child(parent)
            && self.tree[last].kind == kind
        {
            self.tree[last].tokens.push_str(text);
            return;
        }
        self.tree.push(parent, Node::new(kind).with_tokens(text));
    }

    fn task_marker(&mut self, checked: bool) {
        let mut marker = Node::new(NodeKind::TaskListItemMarker)
            .with_tokens(if checked { "[x]" } else { "[ ]" });
        marker.task_checked = checked;

        let current = self.current();
        let (item, before) = match self.tree[current].kind {
            NodeKind::ListItem => (current, None),
            NodeKind::Paragraph => match self.tree.parent(current) {
                Some(parent) if self.tree[parent].kind == NodeKind::ListItem => {
                    (parent, Some(current))
                }
                _ => return,
            },
            _ => return,
        };

        let marker = self.tree.add(marker);
        match before {
            Some(paragraph) => self.tree.insert_before(paragraph, marker),
            None => self.tree.append_child(item, marker),
        }

        self.tree[item].task_checked = checked;
        if let Some(list) = self.tree[item].list.as_mut() {
            list.kind = ListKind::Task;
        }
        if let Some(list) = self.tree.parent(item)
            && let Some(data) = self.tree[list].list.as_mut()
        {
            data.kind = ListKind::Task;
        }
    }

    /// Post-process a closed paragraph: ToC, kramdown IAL, display math.
    fn finish_paragraph(&mut self, paragraph: NodeId) {
        let children = self.tree.children(paragraph).to_vec();

        if let [only] = children.as_slice() {
            let only = *only;
            let kind = self.tree[only].kind;
            let text = self.tree[only].tokens.trim().to_owned();

            if kind == NodeKind::Text && self.options.toc && text.eq_ignore_ascii_case("[toc]") {
                self.tree.detach(only);
                self.tree[paragraph].kind = NodeKind::Toc;
                return;
            }

            if kind == NodeKind::Text
                && self.options.kramdown_ial
                && let Some(attrs) = parse_ial(&text)
            {
                let target = self
                    .tree
                    .previous_sibling(paragraph)
                    .or_else(|| self.tree.parent(paragraph))
                    .filter(|&t| self.tree[t].kind != NodeKind::Document);
                if let Some(target) = target {
                    self.apply_ial(target, &attrs);
                    self.tree.detach(paragraph);
                }
                return;
            }

            if kind == NodeKind::InlineMath {
                self.promote_display_math(paragraph, only);
                return;
            }
        }

        // `text\n{: id="x"}` attaches to the paragraph itself.
        if self.options.kramdown_ial
            && let [.., brk, last] = children.as_slice()
            && self.tree[*brk].kind == NodeKind::SoftBreak
            && self.tree[*last].kind == NodeKind::Text
            && let Some(attrs) = parse_ial(self.tree[*last].tokens.trim())
        {
            let (brk, last) = (*brk, *last);
            self.tree.detach(brk);
            self.tree.detach(last);
            self.apply_ial(paragraph, &attrs);
        }
    }

    fn apply_ial(&mut self, target: NodeId, attrs: &[(String, String)]) {
        let node = &mut self.tree[target];
        for (key, value) in attrs {
            if key == "id" {
                value.clone_into(&mut node.id);
            }
            node.set_ial(key, value);
        }
    }

    fn promote_display_math(&mut self, paragraph: NodeId, math: NodeId) {
        let is_display = self
            .tree
            .child_of_kind(math, NodeKind::InlineMathOpenMarker)
            .is_some_and(|m| self.tree[m].tokens == "$$");
        if !is_display {
            return;
        }
        let content = self
            .tree
            .child_of_kind(math, NodeKind::InlineMathContent)
            .map(|c| self.tree[c].tokens.clone())
            .unwrap_or_default();

        let block = self.tree.add(Node::new(NodeKind::MathBlock));
        self.tree
            .push(block, Node::new(NodeKind::MathBlockOpenMarker).with_tokens("$$"));
        self.tree
            .push(block, Node::new(NodeKind::MathBlockContent).with_tokens(content));
        self.tree
            .push(block, Node::new(NodeKind::MathBlockCloseMarker).with_tokens("$$"));
        self.tree.insert_before(paragraph, block);
        self.tree.detach(paragraph);
    }

    fn finish(mut self) -> Tree {
        while self.stack.len() > 1 {
            self.close();
        }
        let root = self.tree.root();

        if self.options.mark || self.options.tag || self.options.block_ref {
            let texts: Vec<NodeId> = self
                .tree
                .descendants(root)
                .filter(|&id| self.tree[id].kind == NodeKind::Text)
                .collect();
            for text in texts {
                self.split_inline_syntax(text);
            }
        }

        if self.options.assign_ids {
            let blocks: Vec<NodeId> = self.tree.descendants(root).collect();
            for id in blocks {
                let node = &mut self.tree[id];
                if node.kind.is_block() && node.kind != NodeKind::Document && node.id.is_empty() {
                    node.id = new_node_id();
                }
            }
        }

        self.tree
    }

    /// Replace a text node with the mark, tag and block-ref spans inside it.
    fn split_inline_syntax(&mut self, text: NodeId) {
        let source = self.tree[text].tokens.clone();
        let mut pieces: Vec<NodeId> = Vec::new();
        let mut last = 0;

        for caps in INLINE_RE.captures_iter(&source) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let span = if let Some(mark) = caps.name("mark").filter(|_| self.options.mark) {
                self.flag_span(
                    NodeKind::Mark,
                    NodeKind::MarkOpenMarker,
                    NodeKind::MarkCloseMarker,
                    "==",
                    mark.as_str(),
                )
            } else if let Some(tag) = caps.name("tag").filter(|_| self.options.tag) {
                self.flag_span(
                    NodeKind::Tag,
                    NodeKind::TagOpenMarker,
                    NodeKind::TagCloseMarker,
                    "#",
                    tag.as_str(),
                )
            } else if let Some(id) = caps.name("ref").filter(|_| self.options.block_ref) {
                let node = self.tree.add(Node::new(NodeKind::BlockRef));
                self.tree
                    .push(node, Node::new(NodeKind::BlockRefOpenMarker).with_tokens("(("));
                self.tree
                    .push(node, Node::new(NodeKind::BlockRefId).with_tokens(id.as_str()));
                if let Some(anchor) = caps.name("anchor") {
                    self.tree.push(
                        node,
                        Node::new(NodeKind::BlockRefText).with_tokens(anchor.as_str()),
                    );
                }
                self.tree
                    .push(node, Node::new(NodeKind::BlockRefCloseMarker).with_tokens("))"));
                node
            } else {
                continue;
            };

            if whole.start() > last {
                pieces.push(
                    self.tree
                        .add(Node::new(NodeKind::Text).with_tokens(&source[last..whole.start()])),
                );
            }
            pieces.push(span);
            last = whole.end();
        }

        if pieces.is_empty() {
            return;
        }
        if last < source.len() {
            pieces.push(
                self.tree
                    .add(Node::new(NodeKind::Text).with_tokens(&source[last..])),
            );
        }
        for piece in pieces {
            self.tree.insert_before(text, piece);
        }
        self.tree.detach(text);
    }

    fn flag_span(
        &mut self,
        kind: NodeKind,
        open: NodeKind,
        close: NodeKind,
        marker: &str,
        content: &str,
    ) -> NodeId {
        let node = self.tree.add(Node::new(kind));
        self.tree.push(node, Node::new(open).with_tokens(marker));
        self.tree
            .push(node, Node::new(NodeKind::Text).with_tokens(content));
        self.tree.push(node, Node::new(close).with_tokens(marker));
        node
    }
}

/// Parse `{: key="value" ...}` into attribute pairs.
fn parse_ial(text: &str) -> Option<Vec<(String, String)>> {
    let caps = IAL_RE.captures(text)?;
    let body = caps.get(1)?.as_str();
    let attrs: Vec<(String, String)> = IAL_ATTR_RE
        .captures_iter(body)
        .map(|c| (c[1].to_owned(), c[2].to_owned()))
        .collect();
    if attrs.is_empty() { None } else { Some(attrs) }
}

/// Closing children of a link or image.
fn link_tail(dest: &str, title: &str) -> Vec<Node> {
    let mut tail = vec![
        Node::new(NodeKind::CloseBracket).with_tokens("]"),
        Node::new(NodeKind::OpenParen).with_tokens("("),
        Node::new(NodeKind::LinkDest).with_tokens(dest),
    ];
    if !title.is_empty() {
        tail.push(Node::new(NodeKind::LinkTitle).with_tokens(title));
    }
    tail.push(Node::new(NodeKind::CloseParen).with_tokens(")"));
    tail
}

/// Leading run of `c` in `s`.
fn leading_run(s: &str, c: char) -> &str {
    let len = s.len() - s.trim_start_matches(c).len();
    &s[..len]
}

/// Source marker of a list item: `-`, `*`, `+`, or digits plus `.`/`)`.
fn list_marker(source: &str) -> String {
    let trimmed = source.trim_start();
    let digits = trimmed.len() - trimmed.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let delimiter = trimmed[digits..].chars().next().unwrap_or('.');
        format!("{}{delimiter}", &trimmed[..digits])
    } else {
        trimmed.chars().next().map(String::from).unwrap_or_default()
    }
}

fn table_align(alignment: Alignment) -> TableAlign {
    match alignment {
        Alignment::None => TableAlign::None,
        Alignment::Left => TableAlign::Left,
        Alignment::Center => TableAlign::Center,
        Alignment::Right => TableAlign::Right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(tree: &Tree, id: NodeId) -> Vec<NodeKind> {
        tree.children(id).iter().map(|&c| tree[c].kind).collect()
    }

    fn parse_default(markdown: &str) -> Tree {
        parse(markdown, &ParseOptions::default())
    }

    #[test]
    fn test_emphasis_markers() {
        let tree = parse_default("a *b* __c__");
        let p = tree.children(tree.root())[0];
        assert_eq!(
            kinds(&tree, p),
            vec![NodeKind::Text, NodeKind::Emphasis, NodeKind::Text, NodeKind::Strong]
        );
        let strong = tree.children(p)[3];
        assert_eq!(
            kinds(&tree, strong),
            vec![
                NodeKind::StrongOpenMarker,
                NodeKind::Text,
                NodeKind::StrongCloseMarker
            ]
        );
        assert_eq!(tree[tree.children(strong)[0]].tokens, "__");
    }

    #[test]
    fn test_heading_marker_and_id() {
        let tree = parse_default("## Title {#custom .big}\n");
        let h = tree.children(tree.root())[0];
        assert_eq!(tree[h].heading_level, 2);
        assert_eq!(
            kinds(&tree, h),
            vec![NodeKind::HeadingC8hMarker, NodeKind::Text, NodeKind::HeadingId]
        );
        assert_eq!(tree[tree.children(h)[2]].tokens, "custom");
        assert_eq!(tree[h].ial_value("class"), Some("big"));
        assert_eq!(tree.text(h), "Title");
    }

    #[test]
    fn test_tight_list_gets_paragraphs() {
        let tree = parse_default("- a\n- b\n");
        let list = tree.children(tree.root())[0];
        assert!(tree[list].list.as_ref().unwrap().tight);
        let item = tree.children(list)[0];
        assert_eq!(kinds(&tree, item), vec![NodeKind::Paragraph]);
        assert_eq!(tree.text(item), "a");
    }

    #[test]
    fn test_loose_list() {
        let tree = parse_default("- a\n\n- b\n");
        let list = tree.children(tree.root())[0];
        assert!(!tree[list].list.as_ref().unwrap().tight);
    }

    #[test]
    fn test_nested_list_closes_implicit_paragraph() {
        let tree = parse_default("- A\n  - B\n");
        let list = tree.children(tree.root())[0];
        let item = tree.children(list)[0];
        assert_eq!(kinds(&tree, item), vec![NodeKind::Paragraph, NodeKind::List]);
    }

    #[test]
    fn test_ordered_list_marker() {
        let tree = parse_default("3) x\n4) y\n");
        let list = tree.children(tree.root())[0];
        let data = tree[list].list.as_ref().unwrap();
        assert_eq!(data.kind, ListKind::Ordered);
        assert_eq!(data.start, 3);
        assert_eq!(data.marker, "3)");
    }

    #[test]
    fn test_task_list() {
        let tree = parse_default("- [x] done\n- [ ] todo\n");
        let list = tree.children(tree.root())[0];
        assert_eq!(tree[list].list.as_ref().unwrap().kind, ListKind::Task);
        let item = tree.children(list)[0];
        assert_eq!(
            kinds(&tree, item),
            vec![NodeKind::TaskListItemMarker, NodeKind::Paragraph]
        );
        assert!(tree[item].task_checked);
    }

    #[test]
    fn test_fenced_code_block() {
        let tree = parse_default("```rust\nfn main() {}\n```\n");
        let block = tree.children(tree.root())[0];
        assert_eq!(
            kinds(&tree, block),
            vec![
                NodeKind::CodeBlockFenceOpenMarker,
                NodeKind::CodeBlockFenceInfoMarker,
                NodeKind::CodeBlockCode,
                NodeKind::CodeBlockFenceCloseMarker
            ]
        );
        assert_eq!(tree[block].code_block.as_ref().unwrap().info, "rust");
        assert_eq!(tree.text(block), "fn main() {}\n");
    }

    #[test]
    fn test_link_children() {
        let tree = parse_default("[text](http://x.io \"T\")");
        let p = tree.children(tree.root())[0];
        let link = tree.children(p)[0];
        assert_eq!(
            kinds(&tree, link),
            vec![
                NodeKind::OpenBracket,
                NodeKind::LinkText,
                NodeKind::CloseBracket,
                NodeKind::OpenParen,
                NodeKind::LinkDest,
                NodeKind::LinkTitle,
                NodeKind::CloseParen
            ]
        );
    }

    #[test]
    fn test_display_math_becomes_block() {
        let tree = parse_default("$$\nx^2\n$$\n");
        let block = tree.children(tree.root())[0];
        assert_eq!(tree[block].kind, NodeKind::MathBlock);
        assert_eq!(tree.text(block).trim(), "x^2");
    }

    #[test]
    fn test_toc_paragraph() {
        let tree = parse_default("[toc]\n\n# A\n");
        assert_eq!(tree[tree.children(tree.root())[0]].kind, NodeKind::Toc);
    }

    #[test]
    fn test_block_ial_attaches_to_previous_block() {
        let tree = parse_default("# Head\n\n{: id=\"abc\" style=\"color:red\"}\n");
        let root = tree.root();
        assert_eq!(kinds(&tree, root), vec![NodeKind::Heading]);
        let heading = tree.children(root)[0];
        assert_eq!(tree[heading].id, "abc");
        assert_eq!(tree[heading].ial_value("style"), Some("color:red"));
    }

    #[test]
    fn test_trailing_ial_attaches_to_paragraph() {
        let tree = parse_default("text\n{: id=\"p1\"}\n");
        let p = tree.children(tree.root())[0];
        assert_eq!(tree[p].id, "p1");
        assert_eq!(kinds(&tree, p), vec![NodeKind::Text]);
    }

    #[test]
    fn test_footnotes() {
        let tree = parse_default("a[^1]\n\n[^1]: note\n");
        let root = tree.root();
        assert_eq!(kinds(&tree, root), vec![NodeKind::Paragraph, NodeKind::FootnotesDef]);
        let p = tree.children(root)[0];
        assert_eq!(kinds(&tree, p), vec![NodeKind::Text, NodeKind::FootnotesRef]);
    }

    #[test]
    fn test_table_alignment() {
        let tree = parse_default("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        let table = tree.children(tree.root())[0];
        assert_eq!(kinds(&tree, table), vec![NodeKind::TableHead, NodeKind::TableRow]);
        let row = tree.children(table)[1];
        let cell = tree.children(row)[1];
        assert_eq!(tree[cell].cell_align, TableAlign::Right);
    }

    #[test]
    fn test_inline_extensions() {
        let tree = parse_default("a ==b== #tag# ((20210101000000-abcdefg \"ref\"))");
        let p = tree.children(tree.root())[0];
        assert_eq!(
            kinds(&tree, p),
            vec![
                NodeKind::Text,
                NodeKind::Mark,
                NodeKind::Text,
                NodeKind::Tag,
                NodeKind::Text,
                NodeKind::BlockRef
            ]
        );
        let block_ref = tree.children(p)[5];
        let id = tree.child_of_kind(block_ref, NodeKind::BlockRefId).unwrap();
        assert_eq!(tree[id].tokens, "20210101000000-abcdefg");
    }

    #[test]
    fn test_inline_extensions_disabled() {
        let options = ParseOptions {
            mark: false,
            tag: false,
            block_ref: false,
            ..ParseOptions::default()
        };
        let tree = parse("a ==b==", &options);
        let p = tree.children(tree.root())[0];
        assert_eq!(kinds(&tree, p), vec![NodeKind::Text]);
    }

    #[test]
    fn test_assign_ids() {
        let options = ParseOptions {
            assign_ids: true,
            ..ParseOptions::default()
        };
        let tree = parse("a\n\nb\n", &options);
        for &child in tree.children(tree.root()) {
            assert!(!tree[child].id.is_empty());
        }
        assert!(tree[tree.root()].id.is_empty());
    }

    #[test]
    fn test_front_matter() {
        let tree = parse_default("---\ntitle: x\n---\n\nbody\n");
        let first = tree.children(tree.root())[0];
        assert_eq!(tree[first].kind, NodeKind::YamlFrontMatter);
        assert_eq!(tree[first].tokens.trim(), "title: x");
    }

    #[test]
    fn test_list_marker() {
        assert_eq!(list_marker("- a"), "-");
        assert_eq!(list_marker("  * a"), "*");
        assert_eq!(list_marker("12. a"), "12.");
    }
}
