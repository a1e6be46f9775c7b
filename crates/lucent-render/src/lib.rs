//! Rendering backends for lucent document trees.
//!
//! Every backend is a [`Walker`]: it owns a [`Dispatch`] table mapping each
//! node kind to a handler, and [`walk`] drives the handlers over the tree in
//! document order, calling each twice (enter and exit). Replacing a handler
//! changes the output for one kind without touching the rest.
//!
//! # Backends
//!
//! - [`HtmlRenderer`]: HTML in three [`Flavor`]s (plain, preview and export)
//! - [`ProtyleRenderer`]: block-editor DOM with stable node ids
//! - [`JsonRenderer`]: lossless JSON dump of the tree
//! - [`EChartsJsonRenderer`]: ECharts tree-series JSON from nested lists
//! - [`KityMinderJsonRenderer`]: KityMinder outline with exploded headings
//!
//! HTML-family backends share a [`RenderContext`] that carries the
//! [`Options`], the [`Services`] (highlighter, sanitizer and formatters),
//! the heading ids and the footnote state.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use lucent_ast::{ParseOptions, parse};
//! use lucent_render::{HtmlRenderer, Options, Renderer};
//!
//! let tree = Arc::new(parse("**Bold** text", &ParseOptions::default()));
//! let html = HtmlRenderer::new(tree, Arc::new(Options::default())).render();
//! assert_eq!(html, "<p><strong>Bold</strong> text</p>\n");
//! ```

pub mod autospace;
mod buffer;
mod code_block;
mod context;
mod echarts;
mod engine;
mod escape;
mod footnotes;
mod format;
mod handlers;
mod heading;
mod highlight;
mod html;
mod json;
mod kityminder;
mod options;
mod protyle;
mod sanitize;
mod services;
mod terms;
mod util;

pub use buffer::OutputBuffer;
pub use code_block::guess_language;
pub use context::RenderContext;
pub use echarts::{EChartsJsonRenderer, list_to_tree_json};
pub use engine::{
    Dispatch, Handler, Phase, Renderer, WalkStatus, Walker, category_handler, skip_handler, walk,
};
pub use escape::{escape_html, slugify};
pub use footnotes::{FootnoteEntry, FootnoteRef, Footnotes, Ordinals};
pub use format::{CommandFormatter, FormatError, SourceFormatter};
pub use handlers::ContextBackend;
pub use heading::{HeadingIds, TocEntry, render_toc};
pub use highlight::{
    FormatStyle, HighlightError, Highlighter, Lexer, SyntectHighlighter, Token, TokenStream,
};
pub use html::{Flavor, HtmlRenderer};
pub use json::JsonRenderer;
pub use kityminder::KityMinderJsonRenderer;
pub use options::Options;
pub use protyle::ProtyleRenderer;
pub use sanitize::{AmmoniaSanitizer, Sanitizer};
pub use services::Services;
pub use terms::fix_term_typo;
pub use util::resolve_link;
