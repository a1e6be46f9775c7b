//! Correct the casing of well-known technical terms.

use std::collections::HashMap;
use std::sync::LazyLock;

static TERMS: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    [
        "GitHub",
        "GitLab",
        "JavaScript",
        "TypeScript",
        "JSON",
        "HTML",
        "CSS",
        "Markdown",
        "iOS",
        "macOS",
        "iPhone",
        "iPad",
        "MySQL",
        "PostgreSQL",
        "SQLite",
        "MongoDB",
        "jQuery",
        "WeChat",
        "YouTube",
        "WordPress",
        "PHP",
        "HTTP",
        "HTTPS",
        "URL",
        "SQL",
        "Mermaid",
        "ECharts",
        "LaTeX",
        "KaTeX",
    ]
    .into_iter()
    .map(|term| (term.to_ascii_lowercase(), term))
    .collect()
});

/// Replace mis-cased terms in `text`.
///
/// Matching is whole-word over ASCII alphanumeric runs and ASCII
/// case-insensitive, so terms embedded in CJK text are fixed too.
///
/// ```
/// use lucent_render::fix_term_typo;
///
/// assert_eq!(fix_term_typo("push to github"), "push to GitHub");
/// assert_eq!(fix_term_typo("用javascript写"), "用JavaScript写");
/// assert_eq!(fix_term_typo("githubber"), "githubber");
/// ```
#[must_use]
pub fn fix_term_typo(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(|c: char| c.is_ascii_alphanumeric()) {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        let word = &rest[..end];
        match TERMS.get(word.to_ascii_lowercase().as_str()) {
            Some(term) => out.push_str(term),
            None => out.push_str(word),
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}
