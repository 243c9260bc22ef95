use std::fmt;

use crate::{error::ErrorCode, span::Span};

/// Extra context pointing at another span, such as the text line that makes
/// a compartment mixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub span: Span,
    pub message: String,
}

/// One parse error.
///
/// ```text
/// error[E001]: unclosed node
///   --> diagram.nomnoml:3:1
///    |
///  3 | [Customer|name
///    | ^ this `[` is never closed
///    |
///    = help: add a closing `]`
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: ErrorCode,
    span: Span,
    message: String,
    notes: Vec<Note>,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Self {
            code,
            span,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, span: Span, message: impl Into<String>) -> Self {
        self.notes.push(Note {
            span,
            message: message.into(),
        });
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Where the problem is.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Text shown under [`span`](Self::span).
    pub fn label(&self) -> &'static str {
        self.code.description()
    }

    pub fn help(&self) -> &'static str {
        self.code.help()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.code, self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_supplies_label_and_help() {
        let diag = Diagnostic::new(ErrorCode::E001, Span::new(0..1), "unclosed node");
        assert_eq!(diag.label(), "this `[` is never closed");
        assert_eq!(diag.help(), "add a closing `]`");
        assert!(diag.notes().is_empty());
    }

    #[test]
    fn test_notes_keep_order() {
        let message = "compartment mixes text and nodes";
        let diag = Diagnostic::new(ErrorCode::E103, Span::new(0..20), message)
            .with_note(Span::new(1..5), "text line here")
            .with_note(Span::new(6..9), "text line here");
        let starts: Vec<_> = diag.notes().iter().map(|note| note.span.start()).collect();
        assert_eq!(starts, vec![1, 6]);
    }

    #[test]
    fn test_display() {
        let diag = Diagnostic::new(ErrorCode::E002, Span::new(3..4), "stray `]`");
        assert_eq!(diag.to_string(), "error[E002]: stray `]`");
    }
}
