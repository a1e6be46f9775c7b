//! Source auto-formatting for code blocks.

use std::io::Write;
use std::process::{Command, Stdio};

/// Formatting failure. The original source is kept.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Formatter failed: {0}")]
    Failed(String),
}

/// Rewrites source code before highlighting.
pub trait SourceFormatter: Send + Sync {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Formatter that pipes source through an external program.
#[derive(Clone, Debug)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `gofmt` reading from stdin.
    #[must_use]
    pub fn gofmt() -> Self {
        Self::new("gofmt")
    }
}

impl SourceFormatter for CommandFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Written on its own thread to avoid a pipe deadlock on large input.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| FormatError::Failed("stdin unavailable".to_owned()))?;
        let input = source.to_owned();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .map_err(|_| FormatError::Failed("stdin writer panicked".to_owned()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            return Err(FormatError::Failed(stderr));
        }
        written?;
        String::from_utf8(output.stdout).map_err(|e| FormatError::Failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cat_is_identity() {
        let formatter = CommandFormatter::new("cat");
        assert_eq!(formatter.format("package main\n").unwrap(), "package main\n");
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let formatter = CommandFormatter::new("lucent-no-such-formatter");
        assert!(matches!(formatter.format("x"), Err(FormatError::Io(_))));
    }

    #[test]
    fn test_non_zero_exit_is_failure() {
        let formatter = CommandFormatter::new("sh").with_arg("-c").with_arg("echo bad >&2; exit 2");
        match formatter.format("x") {
            Err(FormatError::Failed(message)) => assert_eq!(message, "bad"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
