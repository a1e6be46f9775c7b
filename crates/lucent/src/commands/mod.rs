//! CLI command implementations.

pub(crate) mod mindmap;
pub(crate) mod render;

pub(crate) use mindmap::MindmapArgs;
pub(crate) use render::RenderArgs;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Read `input`, or stdin when it is `-`.
pub(crate) fn read_input(input: &Path) -> Result<String, CliError> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    if !input.is_file() {
        return Err(CliError::Validation(format!(
            "Input file not found: {}",
            input.display()
        )));
    }
    Ok(std::fs::read_to_string(input)?)
}

/// Write `content` to `output`, or stdout when absent.
pub(crate) fn write_output(output: Option<&PathBuf>, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_input(&dir.path().join("missing.md")).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        assert!(err.to_string().contains("missing.md"));
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        write_output(Some(&path), "<p>x</p>\n").unwrap();
        assert_eq!(read_input(&path).unwrap(), "<p>x</p>\n");
    }
}
