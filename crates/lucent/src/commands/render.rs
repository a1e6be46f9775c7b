//! `lucent render` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use lucent_ast::{Tree, parse};
use lucent_config::{CliSettings, Config};
use lucent_render::{
    EChartsJsonRenderer, Flavor, HtmlRenderer, JsonRenderer, KityMinderJsonRenderer, Options,
    ProtyleRenderer, Renderer,
};

use super::{read_input, write_output};
use crate::error::CliError;
use crate::output::Output;

/// Output format of the render command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Display HTML.
    #[default]
    Html,
    /// HTML with block ids and attributes on every block.
    Preview,
    /// HTML for document export, with inline styles.
    Export,
    /// Block-editor DOM.
    Protyle,
    /// Lossless JSON dump of the tree.
    Json,
    /// ECharts tree built from the top-level list.
    Echarts,
    /// KityMinder outline.
    Kityminder,
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file, or `-` for stdin.
    input: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover lucent.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sanitize raw HTML and images.
    #[arg(long)]
    sanitize: bool,

    /// Disable syntax highlighting of code blocks.
    #[arg(long)]
    no_highlight: bool,

    /// Insert spaces between CJK and Latin text.
    #[arg(long)]
    auto_space: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = self.cli_settings();
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(config = %path.display(), "Loaded configuration");
        }

        let markdown = read_input(&self.input)?;
        let tree = Arc::new(parse(&markdown, &config.parse));
        tracing::info!(nodes = tree.len(), format = ?self.format, "Parsed document");

        let mut renderer = self.renderer(tree, config.render_options());
        let rendered = renderer.render();
        write_output(self.output.as_ref(), &rendered)?;

        if let Some(path) = &self.output {
            Output::new().success(&format!("Rendered {}", path.display()));
        }
        Ok(())
    }

    /// Only flags that were passed override the config file.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            sanitize: self.sanitize.then_some(true),
            code_syntax_highlight: self.no_highlight.then_some(false),
            auto_space: self.auto_space.then_some(true),
            ..Default::default()
        }
    }

    fn renderer(&self, tree: Arc<Tree>, options: Arc<Options>) -> Box<dyn Renderer> {
        match self.format {
            Format::Html => Box::new(HtmlRenderer::new(tree, options)),
            Format::Preview => {
                Box::new(HtmlRenderer::new(tree, options).with_flavor(Flavor::Preview))
            }
            Format::Export => {
                Box::new(HtmlRenderer::new(tree, options).with_flavor(Flavor::Export))
            }
            Format::Protyle => Box::new(ProtyleRenderer::new(tree, options)),
            Format::Json => Box::new(JsonRenderer::new(tree)),
            Format::Echarts => Box::new(EChartsJsonRenderer::new(tree)),
            Format::Kityminder => {
                Box::new(KityMinderJsonRenderer::new(tree).with_title(self.title()))
            }
        }
    }

    /// Mind-map root text: the input's file stem.
    fn title(&self) -> String {
        self.input
            .file_stem()
            .filter(|_| self.input.as_os_str() != "-")
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RenderArgs,
    }

    fn args(argv: &[&str]) -> RenderArgs {
        let mut full = vec!["lucent"];
        full.extend_from_slice(argv);
        TestCli::parse_from(full).args
    }

    #[test]
    fn test_defaults() {
        let args = args(&["doc.md"]);
        assert_eq!(args.format, Format::Html);
        assert!(args.output.is_none());
        let settings = args.cli_settings();
        assert!(settings.sanitize.is_none());
        assert!(settings.code_syntax_highlight.is_none());
        assert!(settings.auto_space.is_none());
    }

    #[test]
    fn test_flags_become_overrides() {
        let args = args(&["doc.md", "--sanitize", "--no-highlight", "--auto-space"]);
        let settings = args.cli_settings();
        assert_eq!(settings.sanitize, Some(true));
        assert_eq!(settings.code_syntax_highlight, Some(false));
        assert_eq!(settings.auto_space, Some(true));
    }

    #[test]
    fn test_format_values() {
        assert_eq!(args(&["-", "-f", "kityminder"]).format, Format::Kityminder);
        assert_eq!(args(&["-", "--format", "protyle"]).format, Format::Protyle);
    }

    #[test]
    fn test_title_from_stem() {
        assert_eq!(args(&["notes/plan.md"]).title(), "plan");
        assert_eq!(args(&["-"]).title(), "");
    }

    #[test]
    fn test_renderer_per_format() {
        let tree = Arc::new(parse("- a\n", &lucent_ast::ParseOptions::default()));
        let options = Arc::new(Options::default());

        let html = args(&["x.md"]).renderer(Arc::clone(&tree), Arc::clone(&options)).render();
        assert_eq!(html, "<ul>\n<li>a</li>\n</ul>\n");

        let echarts = args(&["x.md", "-f", "echarts"])
            .renderer(Arc::clone(&tree), Arc::clone(&options))
            .render();
        assert_eq!(echarts, r#"{"name":"a"}"#);
    }

    #[test]
    fn test_execute_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        let output = dir.path().join("doc.json");
        let config = dir.path().join("lucent.toml");
        std::fs::write(&input, "# Title\n").unwrap();
        std::fs::write(&config, "").unwrap();

        args(&[
            input.to_str().unwrap(),
            "-f",
            "json",
            "-o",
            output.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ])
        .execute()
        .unwrap();

        let json = std::fs::read_to_string(&output).unwrap();
        assert!(json.starts_with(r#"[{"type":"NodeHeading","value":"h1""#));
    }
}
