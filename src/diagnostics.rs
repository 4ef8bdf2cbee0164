/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Diagnostics for predicate and map text.
//!
//! Both syntax errors from the parser and type errors from lowering end up as
//! a [`ParseError`] that quotes the offending source line with a caret run
//! under the reported span.

use crate::ast::SourceSpan;
use std::fmt;

/// Error raised while turning expression text into an [`crate::IntExpr`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// 1-based; `0` for errors without a source position.
    pub line: usize,
    /// 1-based; `0` for errors without a source position.
    pub column: usize,
    /// The quoted source line.
    pub snippet: String,
    /// Carets under the offending span, aligned with `snippet`.
    pub pointer: String,
}

impl ParseError {
    /// An error that cannot be tied to a position in the text.
    pub fn unlocated(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: 0,
            column: 0,
            snippet: String::new(),
            pointer: String::new(),
        }
    }

    /// An error covering `span` of `source`.
    pub fn at(message: impl Into<String>, source: &str, span: &SourceSpan) -> Self {
        let snippet = source
            .lines()
            .nth(span.line.saturating_sub(1))
            .unwrap_or_default()
            .to_string();
        let pointer = caret_run(&snippet, span.column, span.len());
        Self {
            message: message.into(),
            line: span.line,
            column: span.column,
            snippet,
            pointer,
        }
    }

    /// `(line, column)` of the error, if it has one.
    pub fn location(&self) -> Option<(usize, usize)> {
        (self.line > 0 && self.column > 0).then_some((self.line, self.column))
    }
}

/// Spaces up to `column`, then at least one caret. Spans running past the
/// end of the quoted line are cut at the line end.
fn caret_run(snippet: &str, column: usize, width: usize) -> String {
    let line_len = snippet.chars().count();
    let offset = column.saturating_sub(1).min(line_len);
    let width = width.clamp(1, (line_len - offset).max(1));
    let mut pointer = " ".repeat(offset);
    pointer.extend(std::iter::repeat('^').take(width));
    pointer
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some((line, column)) = self.location() {
            write!(
                f,
                "\n  --> {line}:{column}\n   | {}\n   | {}",
                self.snippet, self.pointer
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_run_is_clamped_to_the_line() {
        assert_eq!(caret_run("x + y", 5, 1), "    ^");
        assert_eq!(caret_run("x + y", 3, 40), "  ^^^");
        assert_eq!(caret_run("x", 9, 0), " ^");
        assert_eq!(caret_run("", 1, 3), "^");
    }

    #[test]
    fn unlocated_errors_print_the_message_only() {
        let err = ParseError::unlocated("Incomplete input");
        assert_eq!(err.location(), None);
        assert_eq!(err.to_string(), "Incomplete input");
    }
}
