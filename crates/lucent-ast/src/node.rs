//! Node kinds, categories and per-node data.

use crate::tree::NodeId;

/// Rendering category of a node kind.
///
/// Every kind belongs to exactly one category. Backends only change what
/// they emit per category, never when.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// Emits an opening construct on enter and the matching close on exit.
    Container,
    /// Carries no payload; markup comes from its marker children.
    Flag,
    /// Fixed syntactic punctuation, always a leaf.
    Marker,
    /// Emits its own payload once.
    Leaf,
}

/// Closed set of node kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    #[default]
    Document,
    Paragraph,
    Heading,
    HeadingC8hMarker,
    HeadingId,
    ThematicBreak,
    Blockquote,
    BlockquoteMarker,
    List,
    ListItem,
    TaskListItemMarker,
    HtmlBlock,
    InlineHtml,
    CodeBlock,
    CodeBlockFenceOpenMarker,
    CodeBlockFenceInfoMarker,
    CodeBlockCode,
    CodeBlockFenceCloseMarker,
    MathBlock,
    MathBlockOpenMarker,
    MathBlockContent,
    MathBlockCloseMarker,
    Text,
    Emphasis,
    EmphasisOpenMarker,
    EmphasisCloseMarker,
    Strong,
    StrongOpenMarker,
    StrongCloseMarker,
    Strikethrough,
    StrikethroughOpenMarker,
    StrikethroughCloseMarker,
    Mark,
    MarkOpenMarker,
    MarkCloseMarker,
    CodeSpan,
    CodeSpanOpenMarker,
    CodeSpanContent,
    CodeSpanCloseMarker,
    InlineMath,
    InlineMathOpenMarker,
    InlineMathContent,
    InlineMathCloseMarker,
    Tag,
    TagOpenMarker,
    TagCloseMarker,
    HardBreak,
    SoftBreak,
    Link,
    Image,
    Bang,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    LinkText,
    LinkDest,
    LinkTitle,
    HtmlEntity,
    Table,
    TableHead,
    TableRow,
    TableCell,
    FootnotesDef,
    FootnotesRef,
    FootnotesBackRef,
    BlockRef,
    BlockRefOpenMarker,
    BlockRefId,
    BlockRefText,
    BlockRefCloseMarker,
    TextMark,
    SuperBlock,
    SuperBlockOpenMarker,
    SuperBlockLayoutMarker,
    SuperBlockCloseMarker,
    Toc,
    YamlFrontMatter,
}

impl NodeKind {
    /// Stable external name, used by the JSON and block HTML dialects.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Document => "NodeDocument",
            Self::Paragraph => "NodeParagraph",
            Self::Heading => "NodeHeading",
            Self::HeadingC8hMarker => "NodeHeadingC8hMarker",
            Self::HeadingId => "NodeHeadingID",
            Self::ThematicBreak => "NodeThematicBreak",
            Self::Blockquote => "NodeBlockquote",
            Self::BlockquoteMarker => "NodeBlockquoteMarker",
            Self::List => "NodeList",
            Self::ListItem => "NodeListItem",
            Self::TaskListItemMarker => "NodeTaskListItemMarker",
            Self::HtmlBlock => "NodeHTMLBlock",
            Self::InlineHtml => "NodeInlineHTML",
            Self::CodeBlock => "NodeCodeBlock",
            Self::CodeBlockFenceOpenMarker => "NodeCodeBlockFenceOpenMarker",
            Self::CodeBlockFenceInfoMarker => "NodeCodeBlockFenceInfoMarker",
            Self::CodeBlockCode => "NodeCodeBlockCode",
            Self::CodeBlockFenceCloseMarker => "NodeCodeBlockFenceCloseMarker",
            Self::MathBlock => "NodeMathBlock",
            Self::MathBlockOpenMarker => "NodeMathBlockOpenMarker",
            Self::MathBlockContent => "NodeMathBlockContent",
            Self::MathBlockCloseMarker => "NodeMathBlockCloseMarker",
            Self::Text => "NodeText",
            Self::Emphasis => "NodeEmphasis",
            Self::EmphasisOpenMarker => "NodeEmphasisOpenMarker",
            Self::EmphasisCloseMarker => "NodeEmphasisCloseMarker",
            Self::Strong => "NodeStrong",
            Self::StrongOpenMarker => "NodeStrongOpenMarker",
            Self::StrongCloseMarker => "NodeStrongCloseMarker",
            Self::Strikethrough => "NodeStrikethrough",
            Self::StrikethroughOpenMarker => "NodeStrikethroughOpenMarker",
            Self::StrikethroughCloseMarker => "NodeStrikethroughCloseMarker",
            Self::Mark => "NodeMark",
            Self::MarkOpenMarker => "NodeMarkOpenMarker",
            Self::MarkCloseMarker => "NodeMarkCloseMarker",
            Self::CodeSpan => "NodeCodeSpan",
            Self::CodeSpanOpenMarker => "NodeCodeSpanOpenMarker",
            Self::CodeSpanContent => "NodeCodeSpanContent",
            Self::CodeSpanCloseMarker => "NodeCodeSpanCloseMarker",
            Self::InlineMath => "NodeInlineMath",
            Self::InlineMathOpenMarker => "NodeInlineMathOpenMarker",
            Self::InlineMathContent => "NodeInlineMathContent",
            Self::InlineMathCloseMarker => "NodeInlineMathCloseMarker",
            Self::Tag => "NodeTag",
            Self::TagOpenMarker => "NodeTagOpenMarker",
            Self::TagCloseMarker => "NodeTagCloseMarker",
            Self::HardBreak => "NodeHardBreak",
            Self::SoftBreak => "NodeSoftBreak",
            Self::Link => "NodeLink",
            Self::Image => "NodeImage",
            Self::Bang => "NodeBang",
            Self::OpenBracket => "NodeOpenBracket",
            Self::CloseBracket => "NodeCloseBracket",
            Self::OpenParen => "NodeOpenParen",
            Self::CloseParen => "NodeCloseParen",
            Self::LinkText => "NodeLinkText",
            Self::LinkDest => "NodeLinkDest",
            Self::LinkTitle => "NodeLinkTitle",
            Self::HtmlEntity => "NodeHTMLEntity",
            Self::Table => "NodeTable",
            Self::TableHead => "NodeTableHead",
            Self::TableRow => "NodeTableRow",
            Self::TableCell => "NodeTableCell",
            Self::FootnotesDef => "NodeFootnotesDef",
            Self::FootnotesRef => "NodeFootnotesRef",
            Self::FootnotesBackRef => "NodeFootnotesBackRef",
            Self::BlockRef => "NodeBlockRef",
            Self::BlockRefOpenMarker => "NodeBlockRefOpenMarker",
            Self::BlockRefId => "NodeBlockRefID",
            Self::BlockRefText => "NodeBlockRefText",
            Self::BlockRefCloseMarker => "NodeBlockRefCloseMarker",
            Self::TextMark => "NodeTextMark",
            Self::SuperBlock => "NodeSuperBlock",
            Self::SuperBlockOpenMarker => "NodeSuperBlockOpenMarker",
            Self::SuperBlockLayoutMarker => "NodeSuperBlockLayoutMarker",
            Self::SuperBlockCloseMarker => "NodeSuperBlockCloseMarker",
            Self::Toc => "NodeToC",
            Self::YamlFrontMatter => "NodeYamlFrontMatter",
        }
    }

    /// Rendering category of this kind.
    #[must_use]
    pub fn category(self) -> NodeCategory {
        match self {
            Self::Document
            | Self::Paragraph
            | Self::Heading
            | Self::Blockquote
            | Self::List
            | Self::ListItem
            | Self::CodeBlock
            | Self::MathBlock
            | Self::Link
            | Self::Image
            | Self::Table
            | Self::TableCell
            | Self::FootnotesDef
            | Self::SuperBlock => NodeCategory::Container,

            Self::Emphasis
            | Self::Strong
            | Self::Strikethrough
            | Self::Mark
            | Self::CodeSpan
            | Self::InlineMath
            | Self::Tag
            | Self::BlockRef
            | Self::TableHead
            | Self::TableRow => NodeCategory::Flag,

            Self::HeadingC8hMarker
            | Self::HeadingId
            | Self::BlockquoteMarker
            | Self::TaskListItemMarker
            | Self::CodeBlockFenceOpenMarker
            | Self::CodeBlockFenceInfoMarker
            | Self::CodeBlockFenceCloseMarker
            | Self::MathBlockOpenMarker
            | Self::MathBlockCloseMarker
            | Self::EmphasisOpenMarker
            | Self::EmphasisCloseMarker
            | Self::StrongOpenMarker
            | Self::StrongCloseMarker
            | Self::StrikethroughOpenMarker
            | Self::StrikethroughCloseMarker
            | Self::MarkOpenMarker
            | Self::MarkCloseMarker
            | Self::CodeSpanOpenMarker
            | Self::CodeSpanCloseMarker
            | Self::InlineMathOpenMarker
            | Self::InlineMathCloseMarker
            | Self::TagOpenMarker
            | Self::TagCloseMarker
            | Self::Bang
            | Self::OpenBracket
            | Self::CloseBracket
            | Self::OpenParen
            | Self::CloseParen
            | Self::BlockRefOpenMarker
            | Self::BlockRefCloseMarker
            | Self::SuperBlockOpenMarker
            | Self::SuperBlockLayoutMarker
            | Self::SuperBlockCloseMarker => NodeCategory::Marker,

            Self::ThematicBreak
            | Self::HtmlBlock
            | Self::InlineHtml
            | Self::CodeBlockCode
            | Self::MathBlockContent
            | Self::Text
            | Self::CodeSpanContent
            | Self::InlineMathContent
            | Self::HardBreak
            | Self::SoftBreak
            | Self::LinkText
            | Self::LinkDest
            | Self::LinkTitle
            | Self::HtmlEntity
            | Self::FootnotesRef
            | Self::FootnotesBackRef
            | Self::BlockRefId
            | Self::BlockRefText
            | Self::TextMark
            | Self::Toc
            | Self::YamlFrontMatter => NodeCategory::Leaf,
        }
    }

    /// Whether nodes of this kind are block-level.
    #[must_use]
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Self::Document
                | Self::Paragraph
                | Self::Heading
                | Self::ThematicBreak
                | Self::Blockquote
                | Self::List
                | Self::ListItem
                | Self::HtmlBlock
                | Self::CodeBlock
                | Self::MathBlock
                | Self::Table
                | Self::FootnotesDef
                | Self::SuperBlock
                | Self::Toc
                | Self::YamlFrontMatter
        )
    }

    /// Whether this kind carries renderable text content.
    #[must_use]
    pub fn is_text_content(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::LinkText
                | Self::CodeSpanContent
                | Self::InlineMathContent
                | Self::CodeBlockCode
                | Self::MathBlockContent
                | Self::BlockRefText
                | Self::TextMark
        )
    }
}

/// List flavor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListKind {
    #[default]
    Bullet,
    Ordered,
    Task,
}

/// List metadata shared by a list and its items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListData {
    pub kind: ListKind,
    /// First number of an ordered list.
    pub start: u64,
    /// Source marker (`-`, `*`, `1.`, `2)`).
    pub marker: String,
    /// Tight lists render items without paragraph tags.
    pub tight: bool,
}

/// Table column alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TableAlign {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl TableAlign {
    /// CSS `text-align` value, if any.
    #[must_use]
    pub fn as_css(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
        }
    }
}

/// Code block metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeBlockData {
    /// Fenced (```) as opposed to indented.
    pub fenced: bool,
    /// Full info string after the opening fence.
    pub info: String,
}

impl CodeBlockData {
    /// First whitespace-delimited word of the info string.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.info.split_whitespace().next()
    }
}

/// Unified inline span data.
///
/// `types` holds one or more subtypes such as `a`, `code`, `tag`,
/// `inline-math`, `inline-memo`, `block-ref` or `file-annotation-ref`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextMark {
    pub types: Vec<String>,
    pub href: String,
    pub title: String,
    pub inline_math_content: String,
    pub inline_memo_content: String,
    pub block_ref_id: String,
    /// `s` for static anchor text, `d` for dynamic.
    pub block_ref_subtype: String,
    pub file_annotation_ref_id: String,
}

impl TextMark {
    /// Whether the span carries the given subtype.
    #[must_use]
    pub fn has(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }

    /// Subtypes joined by a space, as used in `data-type`.
    #[must_use]
    pub fn joined(&self) -> String {
        self.types.join(" ")
    }
}

/// A node in the document arena.
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub kind: NodeKind,
    /// Raw token payload.
    pub tokens: String,
    /// Block id, empty when unassigned.
    pub id: String,
    /// Kramdown inline attribute list, in source order.
    pub ial: Vec<(String, String)>,
    pub heading_level: u8,
    pub list: Option<ListData>,
    pub task_checked: bool,
    pub table_aligns: Vec<TableAlign>,
    pub cell_align: TableAlign,
    pub code_block: Option<CodeBlockData>,
    pub text_mark: Option<TextMark>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    /// Create an unattached node of the given kind.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Set the token payload.
    #[must_use]
    pub fn with_tokens(mut self, tokens: impl Into<String>) -> Self {
        self.tokens = tokens.into();
        self
    }

    /// Set the block id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the heading level.
    #[must_use]
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level;
        self
    }

    /// Set list metadata.
    #[must_use]
    pub fn with_list(mut self, list: ListData) -> Self {
        self.list = Some(list);
        self
    }

    /// Set code block metadata.
    #[must_use]
    pub fn with_code_block(mut self, info: impl Into<String>, fenced: bool) -> Self {
        self.code_block = Some(CodeBlockData {
            fenced,
            info: info.into(),
        });
        self
    }

    /// Set text-mark data.
    #[must_use]
    pub fn with_text_mark(mut self, mark: TextMark) -> Self {
        self.text_mark = Some(mark);
        self
    }

    /// Append a kramdown attribute.
    #[must_use]
    pub fn with_ial(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ial.push((key.into(), value.into()));
        self
    }

    /// Look up a kramdown attribute.
    #[must_use]
    pub fn ial_value(&self, key: &str) -> Option<&str> {
        self.ial
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace a kramdown attribute.
    pub fn set_ial(&mut self, key: &str, value: &str) {
        if let Some(entry) = self.ial.iter_mut().find(|(k, _)| k == key) {
            value.clone_into(&mut entry.1);
        } else {
            self.ial.push((key.to_owned(), value.to_owned()));
        }
    }

    /// Parent node, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in sibling order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_disjoint() {
        assert_eq!(NodeKind::Paragraph.category(), NodeCategory::Container);
        assert_eq!(NodeKind::Strong.category(), NodeCategory::Flag);
        assert_eq!(NodeKind::StrongOpenMarker.category(), NodeCategory::Marker);
        assert_eq!(NodeKind::Text.category(), NodeCategory::Leaf);
        assert_eq!(NodeKind::TableRow.category(), NodeCategory::Flag);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(NodeKind::Paragraph.name(), "NodeParagraph");
        assert_eq!(NodeKind::HtmlBlock.name(), "NodeHTMLBlock");
        assert_eq!(NodeKind::Toc.name(), "NodeToC");
    }

    #[test]
    fn test_set_ial_replaces_existing() {
        let mut node = Node::new(NodeKind::Paragraph).with_ial("style", "color:red");
        node.set_ial("style", "color:blue");
        node.set_ial("id", "x");
        assert_eq!(node.ial_value("style"), Some("color:blue"));
        assert_eq!(node.ial.len(), 2);
    }

    #[test]
    fn test_code_block_language() {
        let node = Node::new(NodeKind::CodeBlock).with_code_block("rust title=main.rs", true);
        assert_eq!(node.code_block.unwrap().language(), Some("rust"));
    }
}
