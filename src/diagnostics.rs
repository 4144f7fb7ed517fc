//! Diagnostics and error reporting for pepasm
//!
//! Target errors become miette diagnostics with the offending source highlighted.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, SourceSpan};
use thiserror::Error;

use crate::driver::pep10::TargetError;

/// An assembly error with its source context
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(pepasm::assembly))]
pub struct AssemblyDiagnostic {
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl AssemblyDiagnostic {
    pub fn new(file_name: &str, source: &str, error: &TargetError) -> Self {
        Self {
            message: error.message.clone(),
            src: NamedSource::new(file_name, source.to_string()),
            span: error.interval.map(|i| i.span()),
        }
    }
}

/// Wrap every error of a target.
pub fn from_target_errors(file_name: &str, source: &str, errors: &[TargetError]) -> Vec<AssemblyDiagnostic> {
    errors
        .iter()
        .map(|e| AssemblyDiagnostic::new(file_name, source, e))
        .collect()
}

/// Render a diagnostic as text.
///
/// `color` selects miette's ANSI theme; without it the output is plain Unicode, suitable for files and tests.
pub fn render(diagnostic: &dyn Diagnostic, color: bool) -> String {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let mut out = String::new();
    if GraphicalReportHandler::new_themed(theme)
        .render_report(&mut out, diagnostic)
        .is_err()
    {
        out = diagnostic.to_string();
    }
    out
}
