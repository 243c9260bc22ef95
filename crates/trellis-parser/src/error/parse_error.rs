use std::fmt;

use crate::error::{Diagnostic, ErrorKind};

pub type Result<T> = std::result::Result<T, Diagnostic>;

/// Every diagnostic of the phase that failed: lexing, parsing, validation or
/// graph building. Never empty when returned by [`parse`](crate::parse).
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The earliest diagnostic in source order of reporting.
    pub fn primary(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }

    pub fn kind(&self) -> ErrorKind {
        self.primary()
            .map_or(ErrorKind::Syntax, |diagnostic| diagnostic.code().kind())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.primary() {
            write!(f, "{first}")?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

/// Lets a phase keep going after a problem and report them all together.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn finish(self) -> std::result::Result<(), ParseError> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(self.diagnostics.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    fn diag(code: ErrorCode, message: &str) -> Diagnostic {
        Diagnostic::new(code, Span::new(0..1), message)
    }

    #[test]
    fn test_empty_collector_succeeds() {
        assert!(DiagnosticCollector::new().finish().is_ok());
    }

    #[test]
    fn test_collector_keeps_every_diagnostic() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(diag(ErrorCode::E002, "stray `]`"));
        collector.emit(diag(ErrorCode::E001, "unclosed node"));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.to_string(), "error[E002]: stray `]` (+1 more)");
    }

    #[test]
    fn test_kind_follows_first_diagnostic() {
        let err = ParseError::from(vec![
            diag(ErrorCode::E200, "relation `->` has no target node"),
            diag(ErrorCode::E106, "node has no name"),
        ]);
        assert_eq!(err.kind(), ErrorKind::Reference);
        assert_eq!(ParseError::from(diag(ErrorCode::E100, "?")).kind(), ErrorKind::Syntax);
    }
}
