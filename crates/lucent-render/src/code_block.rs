//! Code block language resolution and highlighting.
//!
//! Resolution order: no language (content detection, optional label
//! guessing), client-side diagram languages, then the highlighter. Every
//! failure falls back to escaped plain text.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::LazyLock;

use lucent_ast::{NodeId, NodeKind, Tree};
use regex::Regex;

use crate::context::RenderContext;
use crate::echarts::list_to_tree_json;
use crate::escape::{escape_html, push_escaped};
use crate::highlight::{FormatStyle, Lexer};

/// Content signatures tried in order when guessing a language label.
static SIGNATURES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("bash", r"\A#!.*\b(ba|z)?sh\b"),
        ("php", r"\A\s*<\?php"),
        ("html", r"(?i)\A\s*<(!doctype|html)"),
        ("xml", r"\A\s*<\?xml"),
        ("go", r"(?m)^package\s+\w+\s*$"),
        ("rust", r"(?m)^\s*(pub\s+)?(fn|impl|use|mod)\s+\w+"),
        ("python", r"(?m)^\s*(def\s+\w+\(|from\s+\w+\s+import\s|import\s+\w+\s*$)"),
        ("cpp", r"(?m)^\s*#include\s*[<\x22]"),
        ("java", r"(?m)^\s*(public|private)\s+(static\s+)?(class|void)\s"),
        ("javascript", r"(?m)^\s*(const|let|var|function)\s+\w+"),
        ("sql", r"(?i)\A\s*(select|insert|update|delete|create)\s"),
        ("json", r"\A\s*[\[{]\s*\x22"),
    ]
    .into_iter()
    .map(|(language, pattern)| (language, Regex::new(pattern).unwrap()))
    .collect()
});

/// Parse fence info string into language and attributes.
///
/// Format: `language [key=value ...]`
#[must_use]
pub(crate) fn parse_fence_info(info: &str) -> (String, HashMap<String, String>) {
    let mut parts = info.split_whitespace();
    let language = parts.next().unwrap_or("").to_owned();

    let mut attrs = HashMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim_matches('"').trim_matches('\'');
            attrs.insert(key.to_owned(), value.to_owned());
        }
    }

    (language, attrs)
}

/// Guess a language label from the content.
#[must_use]
pub fn guess_language(code: &str) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|(_, re)| re.is_match(code))
        .map(|(language, _)| *language)
}

/// Source text of a code block.
pub(crate) fn code_of(tree: &Tree, node: NodeId) -> &str {
    tree.child_of_kind(node, NodeKind::CodeBlockCode)
        .map_or("", |code| tree[code].tokens.as_str())
}

/// Language of a code block: first word of its info string.
pub(crate) fn language_of(tree: &Tree, node: NodeId) -> String {
    tree[node]
        .code_block
        .as_ref()
        .map(|data| parse_fence_info(&data.info).0)
        .unwrap_or_default()
}

/// Render a code block into the context buffer.
///
/// `inline_style` forces `style` attributes regardless of the options.
pub(crate) fn render_code_block(
    ctx: &mut RenderContext,
    tree: &Tree,
    node: NodeId,
    inline_style: bool,
) {
    let code = code_of(tree, node);
    let language = language_of(tree, node);
    let options = std::sync::Arc::clone(&ctx.options);

    if language.is_empty() {
        if options.code_syntax_highlight
            && let Some(lexer) = ctx.services.highlighter.analyse(code)
            && let Some(html) = highlight(ctx, &lexer, code, inline_style)
        {
            write_highlighted(ctx, None, &html);
            return;
        }
        let guessed = if options.code_syntax_highlight_detect_lang {
            guess_language(code)
        } else {
            None
        };
        match guessed {
            Some(label) => write_plain(ctx, label, code),
            None => {
                ctx.write("<pre><code>");
                ctx.write_escaped(code);
                ctx.write("</code></pre>\n");
            }
        }
        return;
    }

    if options.is_diagram_language(&language) {
        let mut html = String::from(r#"<div class="language-"#);
        push_escaped(&mut html, &language);
        html.push('"');
        if language.eq_ignore_ascii_case("mindmap") {
            html.push_str(r#" data-code=""#);
            push_escaped(&mut html, &list_to_tree_json(code));
            html.push('"');
        }
        html.push('>');
        push_escaped(&mut html, code);
        html.push_str("</div>\n");
        ctx.write(&html);
        return;
    }

    let code = format_source(ctx, &language, code);
    if options.code_syntax_highlight
        && let Some(lexer) = ctx.services.highlighter.lexer(&language)
        && let Some(html) = highlight(ctx, &lexer, &code, inline_style)
    {
        write_highlighted(ctx, Some(&language), &html);
        return;
    }
    write_plain(ctx, &language, &code);
}

fn write_plain(ctx: &mut RenderContext, language: &str, code: &str) {
    let mut html = String::from(r#"<pre><code class="language-"#);
    push_escaped(&mut html, language);
    html.push_str(r#"">"#);
    push_escaped(&mut html, code);
    html.push_str("</code></pre>\n");
    ctx.write(&html);
}

fn write_highlighted(ctx: &mut RenderContext, language: Option<&str>, html: &str) {
    let mut out = String::from(r#"<pre><code class=""#);
    if let Some(language) = language {
        write!(out, "language-{} ", escape_html(language)).unwrap();
    }
    out.push_str(r#"highlight-chroma">"#);
    out.push_str(html);
    out.push_str("</code></pre>\n");
    ctx.write(&out);
}

/// Run a registered formatter, keeping the source on failure.
fn format_source<'a>(ctx: &RenderContext, language: &str, code: &'a str) -> Cow<'a, str> {
    let Some(formatter) = ctx.services.formatter(language) else {
        return Cow::Borrowed(code);
    };
    match formatter.format(code) {
        Ok(formatted) => Cow::Owned(formatted),
        Err(e) => {
            tracing::debug!(language, error = %e, "Source formatter failed, keeping original");
            Cow::Borrowed(code)
        }
    }
}

fn highlight(ctx: &RenderContext, lexer: &Lexer, code: &str, inline_style: bool) -> Option<String> {
    let style = FormatStyle {
        name: ctx.options.code_syntax_highlight_style_name.clone(),
        inline: inline_style || ctx.options.code_syntax_highlight_inline_style,
        line_numbers: ctx.options.code_syntax_highlight_line_num,
    };
    let highlighter = &ctx.services.highlighter;
    match highlighter
        .tokenize(lexer, code)
        .and_then(|tokens| highlighter.format(&tokens, &style))
    {
        Ok(html) => Some(html),
        Err(e) => {
            tracing::debug!(lexer = lexer.name(), error = %e, "Highlighting failed, using plain text");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lucent_ast::{ParseOptions, parse};
    use pretty_assertions::assert_eq;

    use crate::format::CommandFormatter;
    use crate::options::Options;
    use crate::services::Services;

    fn render(markdown: &str, options: Options) -> String {
        render_with_services(markdown, options, Services::default().without_formatters())
    }

    fn render_with_services(markdown: &str, options: Options, services: Services) -> String {
        let tree = parse(markdown, &ParseOptions::default());
        let block = tree.children(tree.root())[0];
        let mut ctx = RenderContext::new(&tree, Arc::new(options), Arc::new(services));
        render_code_block(&mut ctx, &tree, block, false);
        ctx.out.take()
    }

    fn no_highlight() -> Options {
        Options {
            code_syntax_highlight: false,
            ..Options::default()
        }
    }

    #[test]
    fn test_parse_fence_info_with_attrs() {
        let (lang, attrs) = parse_fence_info("plantuml format=png title='x'");
        assert_eq!(lang, "plantuml");
        assert_eq!(attrs.get("format"), Some(&"png".to_owned()));
        assert_eq!(attrs.get("title"), Some(&"x".to_owned()));
    }

    #[test]
    fn test_parse_fence_info_empty() {
        let (lang, attrs) = parse_fence_info("");
        assert_eq!(lang, "");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_plain_without_language() {
        assert_eq!(
            render("```\na < b\n```\n", no_highlight()),
            "<pre><code>a &lt; b\n</code></pre>\n"
        );
    }

    #[test]
    fn test_guessed_label() {
        let options = Options {
            code_syntax_highlight_detect_lang: true,
            ..no_highlight()
        };
        assert_eq!(
            render("```\npackage main\n```\n", options),
            "<pre><code class=\"language-go\">package main\n</code></pre>\n"
        );
    }

    #[test]
    fn test_highlighted_language() {
        let html = render("```rust\nfn main() {}\n```\n", Options::default());
        assert!(html.starts_with(r#"<pre><code class="language-rust highlight-chroma">"#));
        assert!(html.contains("<span"));
    }

    #[test]
    fn test_unknown_language_matches_unhighlighted() {
        let markdown = "```nosuchlang\nx <y>\n```\n";
        assert_eq!(render(markdown, Options::default()), render(markdown, no_highlight()));
        assert_eq!(
            render(markdown, no_highlight()),
            "<pre><code class=\"language-nosuchlang\">x &lt;y&gt;\n</code></pre>\n"
        );
    }

    fn go_formatter(formatter: CommandFormatter) -> Services {
        Services::default()
            .without_formatters()
            .with_formatter("go", Arc::new(formatter))
    }

    #[test]
    fn test_go_source_is_formatted() {
        let upper = CommandFormatter::new("tr").with_arg("a-z").with_arg("A-Z");
        assert_eq!(
            render_with_services("```go\nfunc  f()\n```\n", no_highlight(), go_formatter(upper)),
            "<pre><code class=\"language-go\">FUNC  F()\n</code></pre>\n"
        );
    }

    #[test]
    fn test_failed_formatter_keeps_source() {
        let failing = CommandFormatter::new("sh").with_arg("-c").with_arg("exit 1");
        assert_eq!(
            render_with_services("```go\nfunc  f()\n```\n", no_highlight(), go_formatter(failing)),
            "<pre><code class=\"language-go\">func  f()\n</code></pre>\n"
        );
    }

    #[test]
    fn test_formatter_only_for_registered_language() {
        let upper = CommandFormatter::new("tr").with_arg("a-z").with_arg("A-Z");
        assert_eq!(
            render_with_services("```rust\nfn f()\n```\n", no_highlight(), go_formatter(upper)),
            "<pre><code class=\"language-rust\">fn f()\n</code></pre>\n"
        );
    }

    #[test]
    fn test_diagram_placeholder() {
        assert_eq!(
            render("```mermaid\ngraph TD; A-->B\n```\n", Options::default()),
            "<div class=\"language-mermaid\">graph TD; A--&gt;B\n</div>\n"
        );
    }

    #[test]
    fn test_mindmap_data_code() {
        let html = render("```mindmap\n- A\n  - B\n```\n", Options::default());
        assert!(html.starts_with(
            r#"<div class="language-mindmap" data-code="{&quot;name&quot;:&quot;A&quot;,&quot;children&quot;:[{&quot;name&quot;:&quot;B&quot;}]}">"#
        ));
    }

    #[test]
    fn test_guess_language_table() {
        assert_eq!(guess_language("#!/bin/bash\necho"), Some("bash"));
        assert_eq!(guess_language("fn main() {}"), Some("rust"));
        assert_eq!(guess_language("def f(x):\n  pass"), Some("python"));
        assert_eq!(guess_language("SELECT * FROM t"), Some("sql"));
        assert_eq!(guess_language("hello there"), None);
    }
}
