//! Output buffer with scoped sub-buffers.
//!
//! A scope is opened, written into, and then closed by the handler that
//! opened it. Closing returns the scope's text so the caller can
//! post-process it (sanitize, relocate) before appending it to the parent.

/// Append-only text buffer.
#[derive(Debug)]
pub struct OutputBuffer {
    scopes: Vec<String>,
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: vec![String::with_capacity(4096)],
        }
    }

    fn top(&mut self) -> &mut String {
        if self.scopes.is_empty() {
            self.scopes.push(String::new());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn write_str(&mut self, s: &str) {
        self.top().push_str(s);
    }

    pub fn write_char(&mut self, c: char) {
        self.top().push(c);
    }

    /// Last character written, looking through enclosing scopes.
    #[must_use]
    pub fn last_char(&self) -> Option<char> {
        self.scopes.iter().rev().find_map(|s| s.chars().last())
    }

    /// Write a newline unless the output is empty or already ends with one.
    pub fn newline(&mut self) {
        if !matches!(self.last_char(), None | Some('\n')) {
            self.write_char('\n');
        }
    }

    /// Open a sub-buffer. Writes go there until [`pop_scope`](Self::pop_scope).
    pub fn push_scope(&mut self) {
        self.scopes.push(String::new());
    }

    /// Close the innermost sub-buffer and return its content.
    ///
    /// The base buffer is never popped; `None` is returned when no scope is
    /// open.
    pub fn pop_scope(&mut self) -> Option<String> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    /// Number of open sub-buffers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len().saturating_sub(1)
    }

    /// Consume the buffer, flattening any scopes left open.
    #[must_use]
    pub fn take(self) -> String {
        self.scopes.concat()
    }

    /// Move the current content out, leaving an empty buffer behind.
    pub fn take_string(&mut self) -> String {
        std::mem::take(self).take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_is_spliced_by_caller() {
        let mut out = OutputBuffer::new();
        out.write_str("<p>");
        out.push_scope();
        out.write_str("<img>");
        assert_eq!(out.depth(), 1);
        let scope = out.pop_scope().unwrap();
        out.write_str(&scope.to_uppercase());
        out.write_str("</p>");
        assert_eq!(out.take(), "<p><IMG></p>");
    }

    #[test]
    fn test_base_is_never_popped() {
        let mut out = OutputBuffer::new();
        out.write_str("x");
        assert_eq!(out.pop_scope(), None);
        assert_eq!(out.take(), "x");
    }

    #[test]
    fn test_newline() {
        let mut out = OutputBuffer::new();
        out.newline();
        out.write_str("a");
        out.newline();
        out.newline();
        assert_eq!(out.take(), "a\n");
    }

    #[test]
    fn test_last_char_sees_enclosing_scope() {
        let mut out = OutputBuffer::new();
        out.write_str("ab");
        out.push_scope();
        assert_eq!(out.last_char(), Some('b'));
        out.write_char('c');
        assert_eq!(out.last_char(), Some('c'));
    }

    #[test]
    fn test_take_string_resets() {
        let mut out = OutputBuffer::new();
        out.write_str("abc");
        assert_eq!(out.take_string(), "abc");
        assert_eq!(out.last_char(), None);
    }
}
