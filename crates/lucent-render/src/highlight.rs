//! Syntax highlighting service.
//!
//! Code blocks reach the highlighter through the [`Highlighter`] trait.
//! [`SyntectHighlighter`] is the default implementation, backed by the
//! grammars and themes bundled with `syntect`.

use std::fmt::Write;
use std::sync::LazyLock;

use syntect::easy::ScopeRangeIterator;
use syntect::highlighting::{FontStyle, Style, ThemeSet};
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::escape::push_escaped;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Highlighting failure. Callers fall back to plain escaped text.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("Unknown lexer: {0}")]
    UnknownLexer(String),
    #[error("Tokenize error: {0}")]
    Tokenize(String),
    #[error("Unknown style: {0}")]
    UnknownStyle(String),
}

/// Handle to a grammar known to the highlighter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexer {
    name: String,
}

impl Lexer {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A run of source text with its scope stack, outermost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub scopes: Vec<String>,
}

/// Tokenized source.
#[derive(Clone, Debug, Default)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
}

impl TokenStream {
    /// Source text reassembled from the tokens.
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

/// Output style for [`Highlighter::format`].
#[derive(Clone, Debug)]
pub struct FormatStyle {
    /// Theme name, used in inline mode.
    pub name: String,
    /// Emit `style` attributes instead of `hl-*` classes.
    pub inline: bool,
    /// Prefix each line with a `highlight-ln` span.
    pub line_numbers: bool,
}

impl Default for FormatStyle {
    fn default() -> Self {
        Self {
            name: "InspiredGitHub".to_owned(),
            inline: false,
            line_numbers: false,
        }
    }
}

/// Syntax highlighter used for fenced code.
pub trait Highlighter: Send + Sync {
    /// Lexer for a language name or file extension.
    fn lexer(&self, language: &str) -> Option<Lexer>;

    /// Detect a lexer from the content itself.
    fn analyse(&self, text: &str) -> Option<Lexer>;

    fn tokenize(&self, lexer: &Lexer, text: &str) -> Result<TokenStream, HighlightError>;

    /// Render tokens as HTML spans. The caller supplies the `<pre><code>` wrapper.
    fn format(&self, tokens: &TokenStream, style: &FormatStyle) -> Result<String, HighlightError>;
}

/// [`Highlighter`] backed by `syntect`'s bundled grammars and themes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
    fn syntax(name: &str) -> Result<&'static SyntaxReference, HighlightError> {
        SYNTAX_SET
            .find_syntax_by_name(name)
            .ok_or_else(|| HighlightError::UnknownLexer(name.to_owned()))
    }

    fn is_plain(syntax: &SyntaxReference) -> bool {
        syntax.name == SYNTAX_SET.find_syntax_plain_text().name
    }
}

impl Highlighter for SyntectHighlighter {
    fn lexer(&self, language: &str) -> Option<Lexer> {
        let language = language.trim();
        if language.is_empty() {
            return None;
        }
        SYNTAX_SET
            .find_syntax_by_token(language)
            .map(|syntax| Lexer::new(syntax.name.clone()))
    }

    fn analyse(&self, text: &str) -> Option<Lexer> {
        let first_line = text.lines().next()?;
        SYNTAX_SET
            .find_syntax_by_first_line(first_line)
            .filter(|syntax| !Self::is_plain(syntax))
            .map(|syntax| Lexer::new(syntax.name.clone()))
    }

    fn tokenize(&self, lexer: &Lexer, text: &str) -> Result<TokenStream, HighlightError> {
        let syntax = Self::syntax(lexer.name())?;
        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut tokens = Vec::new();

        for line in LinesWithEndings::from(text) {
            let ops = state
                .parse_line(line, &SYNTAX_SET)
                .map_err(|e| HighlightError::Tokenize(format!("{e:?}")))?;
            for (range, op) in ScopeRangeIterator::new(&ops, line) {
                stack
                    .apply(op)
                    .map_err(|e| HighlightError::Tokenize(format!("{e:?}")))?;
                if range.is_empty() {
                    continue;
                }
                tokens.push(Token {
                    text: line[range].to_owned(),
                    scopes: stack.as_slice().iter().map(|s| s.build_string()).collect(),
                });
            }
        }

        Ok(TokenStream { tokens })
    }

    fn format(&self, tokens: &TokenStream, style: &FormatStyle) -> Result<String, HighlightError> {
        let highlighter = if style.inline {
            let theme = THEME_SET
                .themes
                .get(&style.name)
                .ok_or_else(|| HighlightError::UnknownStyle(style.name.clone()))?;
            Some(syntect::highlighting::Highlighter::new(theme))
        } else {
            None
        };

        let mut out = String::new();
        let mut line = 1usize;
        let mut at_line_start = true;

        for token in &tokens.tokens {
            let open = match &highlighter {
                Some(highlighter) => inline_span(highlighter, &token.scopes)?,
                None => class_span(&token.scopes),
            };
            for piece in token.text.split_inclusive('\n') {
                if at_line_start && style.line_numbers {
                    write!(out, r#"<span class="highlight-ln">{line}</span>"#).unwrap();
                    line += 1;
                }
                match &open {
                    Some(open) => {
                        out.push_str(open);
                        push_escaped(&mut out, piece);
                        out.push_str("</span>");
                    }
                    None => push_escaped(&mut out, piece),
                }
                at_line_start = piece.ends_with('\n');
            }
        }

        Ok(out)
    }
}

/// `hl-*` classes from the innermost scope; top-level text gets no span.
fn class_span(scopes: &[String]) -> Option<String> {
    if scopes.len() <= 1 {
        return None;
    }
    let innermost = scopes.last()?;
    let classes: Vec<String> = innermost.split('.').map(|atom| format!("hl-{atom}")).collect();
    Some(format!(r#"<span class="{}">"#, classes.join(" ")))
}

fn inline_span(
    highlighter: &syntect::highlighting::Highlighter<'_>,
    scopes: &[String],
) -> Result<Option<String>, HighlightError> {
    if scopes.len() <= 1 {
        return Ok(None);
    }
    let stack: ScopeStack = scopes
        .join(" ")
        .parse()
        .map_err(|e| HighlightError::Tokenize(format!("{e:?}")))?;
    let style = highlighter.style_for_stack(stack.as_slice());
    Ok(Some(format!(r#"<span style="{}">"#, css_for_style(style))))
}

fn css_for_style(style: Style) -> String {
    let fg = style.foreground;
    let mut css = format!("color:#{:02x}{:02x}{:02x}", fg.r, fg.g, fg.b);
    if style.font_style.contains(FontStyle::BOLD) {
        css.push_str(";font-weight:bold");
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        css.push_str(";font-style:italic");
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        css.push_str(";text-decoration:underline");
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rust_tokens() -> TokenStream {
        let highlighter = SyntectHighlighter;
        let lexer = highlighter.lexer("rust").unwrap();
        highlighter.tokenize(&lexer, "fn main() {}\n").unwrap()
    }

    #[test]
    fn test_lexer_lookup() {
        let highlighter = SyntectHighlighter;
        assert_eq!(highlighter.lexer("rs").map(|l| l.name().to_owned()), Some("Rust".to_owned()));
        assert!(highlighter.lexer("Python").is_some());
        assert!(highlighter.lexer("no-such-language").is_none());
        assert!(highlighter.lexer("").is_none());
    }

    #[test]
    fn test_analyse_shebang() {
        let highlighter = SyntectHighlighter;
        assert!(highlighter.analyse("#!/bin/bash\necho hi\n").is_some());
        assert!(highlighter.analyse("just words").is_none());
    }

    #[test]
    fn test_tokenize_preserves_text() {
        let tokens = rust_tokens();
        assert_eq!(tokens.text(), "fn main() {}\n");
        assert!(tokens.tokens.iter().all(|t| t.scopes[0] == "source.rust"));
    }

    #[test]
    fn test_format_classes() {
        let html = SyntectHighlighter
            .format(&rust_tokens(), &FormatStyle::default())
            .unwrap();
        assert!(html.contains(r#"<span class="hl-"#));
        assert!(html.contains("main"));
        assert!(!html.contains("style="));
    }

    #[test]
    fn test_format_inline_style() {
        let style = FormatStyle {
            inline: true,
            ..FormatStyle::default()
        };
        let html = SyntectHighlighter.format(&rust_tokens(), &style).unwrap();
        assert!(html.contains(r#"<span style="color:#"#));
    }

    #[test]
    fn test_format_unknown_style() {
        let style = FormatStyle {
            name: "no-such-theme".to_owned(),
            inline: true,
            line_numbers: false,
        };
        let err = SyntectHighlighter.format(&rust_tokens(), &style).unwrap_err();
        assert!(matches!(err, HighlightError::UnknownStyle(name) if name == "no-such-theme"));
    }

    #[test]
    fn test_format_line_numbers() {
        let tokens = TokenStream {
            tokens: vec![Token {
                text: "a <\nb\n".to_owned(),
                scopes: vec!["text.plain".to_owned()],
            }],
        };
        let style = FormatStyle {
            line_numbers: true,
            ..FormatStyle::default()
        };
        let html = SyntectHighlighter.format(&tokens, &style).unwrap();
        assert_eq!(
            html,
            concat!(
                r#"<span class="highlight-ln">1</span>a &lt;"#,
                "\n",
                r#"<span class="highlight-ln">2</span>b"#,
                "\n"
            )
        );
    }
}
