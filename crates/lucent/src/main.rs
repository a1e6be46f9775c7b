//! Lucent CLI - Markdown tree renderer.
//!
//! Provides commands for:
//! - `render`: Render a Markdown file to HTML, block-editor DOM or JSON
//! - `mindmap`: Convert a Markdown list into an ECharts tree

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{MindmapArgs, RenderArgs};
use output::Output;

/// Lucent - Markdown tree renderer.
#[derive(Parser)]
#[command(name = "lucent", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown document.
    Render(RenderArgs),
    /// Convert a Markdown list into mind-map JSON.
    Mindmap(MindmapArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Mindmap(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_mindmap() {
        let cli = Cli::parse_from(["lucent", "mindmap", "-"]);
        assert!(matches!(cli.command, Commands::Mindmap(_)));
    }

    #[test]
    fn test_verbose_flag() {
        let cli = Cli::parse_from(["lucent", "render", "doc.md", "--verbose"]);
        assert!(matches!(cli.command, Commands::Render(args) if args.verbose));
    }
}
