//! Collaborators reached by the renderers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::format::{CommandFormatter, SourceFormatter};
use crate::highlight::{Highlighter, SyntectHighlighter};
use crate::sanitize::{AmmoniaSanitizer, Sanitizer};

/// Highlighter, sanitizer and per-language source formatters.
///
/// Shared by every renderer of a document, including the fresh renderers
/// used for footnote definitions.
#[derive(Clone)]
pub struct Services {
    pub highlighter: Arc<dyn Highlighter>,
    pub sanitizer: Arc<dyn Sanitizer>,
    formatters: HashMap<String, Arc<dyn SourceFormatter>>,
}

impl Default for Services {
    /// syntect, ammonia and `gofmt` for `go` and `golang`.
    fn default() -> Self {
        let gofmt: Arc<dyn SourceFormatter> = Arc::new(CommandFormatter::gofmt());
        Self::new(Arc::new(SyntectHighlighter), Arc::new(AmmoniaSanitizer))
            .with_formatter("go", Arc::clone(&gofmt))
            .with_formatter("golang", gofmt)
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<&str> = self.formatters.keys().map(String::as_str).collect();
        languages.sort_unstable();
        f.debug_struct("Services")
            .field("formatters", &languages)
            .finish_non_exhaustive()
    }
}

impl Services {
    /// Services without any source formatter.
    #[must_use]
    pub fn new(highlighter: Arc<dyn Highlighter>, sanitizer: Arc<dyn Sanitizer>) -> Self {
        Self {
            highlighter,
            sanitizer,
            formatters: HashMap::new(),
        }
    }

    /// Register a formatter for `language` (matched case-insensitively).
    #[must_use]
    pub fn with_formatter(mut self, language: &str, formatter: Arc<dyn SourceFormatter>) -> Self {
        self.formatters
            .insert(language.to_ascii_lowercase(), formatter);
        self
    }

    #[must_use]
    pub fn without_formatters(mut self) -> Self {
        self.formatters.clear();
        self
    }

    #[must_use]
    pub fn formatter(&self, language: &str) -> Option<&dyn SourceFormatter> {
        self.formatters
            .get(&language.to_ascii_lowercase())
            .map(AsRef::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_formatters() {
        let services = Services::default();
        assert!(services.formatter("go").is_some());
        assert!(services.formatter("GoLang").is_some());
        assert!(services.formatter("rust").is_none());
        assert!(services.without_formatters().formatter("go").is_none());
    }

    #[test]
    fn test_debug_lists_languages() {
        let debug = format!("{:?}", Services::default());
        assert!(debug.contains(r#"["go", "golang"]"#));
    }
}
