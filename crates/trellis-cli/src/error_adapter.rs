//! Turns a [`TrellisError`] into miette reports for the terminal.
//!
//! A parse failure becomes one report per diagnostic, each carrying its
//! error code, the code's help text and the source text so miette can
//! underline the offending span.

use miette::{LabeledSpan, MietteDiagnostic, Report, SourceSpan};

use trellis::TrellisError;
use trellis_parser::{Span, error::Diagnostic};

fn source_span(span: Span) -> SourceSpan {
    (span.start(), span.len()).into()
}

fn diagnostic_report(diagnostic: &Diagnostic, src: &str) -> Report {
    let primary = LabeledSpan::new_primary_with_span(
        Some(diagnostic.label().to_string()),
        source_span(diagnostic.span()),
    );
    let notes = diagnostic
        .notes()
        .iter()
        .map(|note| LabeledSpan::at(source_span(note.span), note.message.clone()));

    let report = MietteDiagnostic::new(diagnostic.message())
        .with_code(diagnostic.code().as_str())
        .with_help(diagnostic.help())
        .with_labels(std::iter::once(primary).chain(notes));
    Report::new(report).with_source_code(src.to_string())
}

/// One report per parser diagnostic, or a single plain report for I/O and
/// configuration failures.
pub fn to_reports(err: &TrellisError) -> Vec<Report> {
    match err {
        TrellisError::Parse { err, src } => err
            .diagnostics()
            .iter()
            .map(|diagnostic| diagnostic_report(diagnostic, src))
            .collect(),
        TrellisError::Io(_) => {
            vec![Report::new(MietteDiagnostic::new(err.to_string()).with_code("trellis::io"))]
        }
    }
}
