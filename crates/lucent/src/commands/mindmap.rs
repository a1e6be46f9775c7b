//! `lucent mindmap` command implementation.

use std::path::PathBuf;

use clap::Args;
use lucent_render::list_to_tree_json;

use super::{read_input, write_output};
use crate::error::CliError;

/// Arguments for the mindmap command.
#[derive(Args)]
pub(crate) struct MindmapArgs {
    /// Markdown file holding a nested list, or `-` for stdin.
    input: PathBuf,

    /// Write the JSON here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl MindmapArgs {
    /// Convert the input's top-level list into an ECharts tree.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let markdown = read_input(&self.input)?;
        let json = list_to_tree_json(&markdown);
        tracing::debug!(input = %self.input.display(), bytes = json.len(), "Converted list to tree");
        write_output(self.output.as_ref(), &json)
    }
}
