//! Rendering options shared by all backends.

/// Immutable rendering configuration.
///
/// Backends receive it behind an `Arc` and never mutate it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Delegate fenced code to the highlighter.
    pub code_syntax_highlight: bool,
    /// Emit `style` attributes instead of classes.
    pub code_syntax_highlight_inline_style: bool,
    /// Theme used in inline-style mode.
    pub code_syntax_highlight_style_name: String,
    pub code_syntax_highlight_line_num: bool,
    /// Guess a language label for code blocks without an info string.
    pub code_syntax_highlight_detect_lang: bool,
    /// Languages rendered client-side; emitted as placeholders.
    pub diagram_languages: Vec<String>,
    /// Route raw HTML and images through the sanitizer.
    pub sanitize: bool,
    /// Space out CJK and non-CJK runs.
    pub auto_space: bool,
    pub fix_term_typo: bool,
    #[cfg_attr(feature = "serde", serde(alias = "soft_break2_hard_break"))]
    pub soft_break_to_hard_break: bool,
    pub heading_id: bool,
    pub heading_anchor: bool,
    pub toc: bool,
    pub kramdown_block_ial: bool,
    /// Attribute name used for the IAL `id` entry.
    pub kramdown_ial_id_render_name: String,
    pub gfm_task_list_item_class: String,
    /// Placeholder `src` for lazily loaded images; the real source moves to
    /// `data-src`.
    pub image_lazy_loading: Option<String>,
    /// Prefix for relative link and image destinations.
    pub link_base: String,
    /// Path of the current document; relative destinations resolve against
    /// its directory.
    pub link_path: String,
    pub protyle_contenteditable: bool,
    /// Mark remote images in the block dialect.
    pub protyle_mark_net_img: bool,
    pub chinese_paragraph_beginning_space: bool,
    /// First `data-node-index` value.
    pub node_index_start: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            code_syntax_highlight: true,
            code_syntax_highlight_inline_style: false,
            code_syntax_highlight_style_name: "InspiredGitHub".to_owned(),
            code_syntax_highlight_line_num: false,
            code_syntax_highlight_detect_lang: false,
            diagram_languages: ["mermaid", "echarts", "abc", "graphviz", "mindmap"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            sanitize: false,
            auto_space: false,
            fix_term_typo: false,
            soft_break_to_hard_break: false,
            heading_id: false,
            heading_anchor: false,
            toc: true,
            kramdown_block_ial: false,
            kramdown_ial_id_render_name: "id".to_owned(),
            gfm_task_list_item_class: "vditor-task".to_owned(),
            image_lazy_loading: None,
            link_base: String::new(),
            link_path: String::new(),
            protyle_contenteditable: true,
            protyle_mark_net_img: false,
            chinese_paragraph_beginning_space: false,
            node_index_start: 1,
        }
    }
}

impl Options {
    /// Whether `language` is rendered client-side.
    #[must_use]
    pub fn is_diagram_language(&self, language: &str) -> bool {
        self.diagram_languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.code_syntax_highlight);
        assert_eq!(options.node_index_start, 1);
        assert_eq!(options.kramdown_ial_id_render_name, "id");
        assert!(options.is_diagram_language("Mermaid"));
        assert!(options.is_diagram_language("mindmap"));
        assert!(!options.is_diagram_language("rust"));
    }
}
