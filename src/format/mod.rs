//! Pep/10 Source Formatter
//!
//! This module formats assembly lines into the canonical four-column layout and builds listings.
//! - `symbol:` column, 9 wide
//! - Mnemonic or dot command column, 8 wide
//! - Argument column, 12 wide
//! - `;comment`
//!
//! Addressing modes equal to the mnemonic's implied default are dropped (`BR main,i` becomes `BR main`).

mod config;
mod listing;
mod writer;

pub use config::{FormatConfig, MnemonicCase};
pub use listing::{hex_listing, listing};
pub use writer::ColumnWriter;

use pepp_core::isa::{directives, mnemonics};
use pepp_core::symbol::SymbolTable;
use pepp_syntax::ast::{Line, LineKind};
use pepp_syntax::intern::StringPool;
use pepp_syntax::parser;
use thiserror::Error;

/// Errors raised while formatting source text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// Format one line as source.
pub fn format_line(line: &Line, symbols: &SymbolTable, config: &FormatConfig) -> String {
    let (operation, arguments) = match &line.kind {
        LineKind::Empty => return String::new(),
        LineKind::Comment { text } => return format!(";{text}"),
        LineKind::Monadic { mnemonic } => (mnemonics::as_str(*mnemonic).to_string(), String::new()),
        LineKind::Dyadic {
            mnemonic,
            mode,
            argument,
        } => {
            let mut text = argument.render(symbols);
            if !mnemonics::can_elide_addressing_mode(*mnemonic, *mode) {
                text.push(',');
                text.push_str(mode.as_str());
            }
            (mnemonics::as_str(*mnemonic).to_string(), text)
        }
        LineKind::Section { name, flags } => (".SECTION".to_string(), format!("\"{name}\", \"{flags}\"")),
        LineKind::Annotate { which, symbol } => (
            format!(".{}", directives::as_str(which.directive())),
            symbols.entry(*symbol).name().to_string(),
        ),
        LineKind::MacroInvocation { name, args, .. } => (format!("@{name}"), args.join(",")),
        other => {
            let Some(directive) = other.directive() else {
                return String::new();
            };
            let arguments = other.argument().map(|a| a.render(symbols)).unwrap_or_default();
            (format!(".{}", directives::as_str(directive)), arguments)
        }
    };

    let operation = match &line.kind {
        LineKind::MacroInvocation { .. } => operation,
        _ => config.mnemonic_case.apply(&operation),
    };
    let symbol = line
        .symbol()
        .map(|id| format!("{}:", symbols.entry(id).name()))
        .unwrap_or_default();

    let mut w = ColumnWriter::new();
    w.column(&symbol, config.symbol_width);
    w.column(&operation, config.mnemonic_width);
    match line.comment() {
        Some(comment) => {
            w.column(&arguments, config.argument_width);
            w.write(";");
            w.write(comment);
        }
        None => w.write(&arguments),
    }
    w.finish().pop().unwrap_or_default()
}

/// Format lines as source, one per row, each ending in a newline.
pub fn format_lines<'a>(
    lines: impl IntoIterator<Item = &'a Line>,
    symbols: &SymbolTable,
    config: &FormatConfig,
) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&format_line(line, symbols, config));
        out.push('\n');
    }
    out
}

/// Format Pep/10 source code with default settings
pub fn format_source(source: &str) -> Result<String, FormatError> {
    format_source_with_config(source, &FormatConfig::default())
}

/// Format Pep/10 source code with custom configuration
///
/// ## Errors
/// - [`FormatError::Syntax`] for the first line that does not parse; nothing is formatted in that case.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn format_source_with_config(source: &str, config: &FormatConfig) -> Result<String, FormatError> {
    let (lines, symbols) = parse_source(source)?;
    Ok(format_lines(&lines, &symbols, config))
}

fn parse_source(source: &str) -> Result<(Vec<Line>, SymbolTable), FormatError> {
    let mut symbols = SymbolTable::new();
    let scope = symbols.add_child(symbols.root());
    let parsed = parser::parse(source, StringPool::shared(), &mut symbols, scope);
    if let Some(first) = parsed.diagnostics.iter().next() {
        return Err(FormatError::Syntax {
            line: first.interval.lower().row as usize + 1,
            message: first.message.clone(),
        });
    }
    Ok((parsed.lines, symbols))
}

/// Check if source code is already formatted
pub fn check_formatted(source: &str) -> Result<bool, FormatError> {
    let formatted = format_source(source)?;
    Ok(source == formatted)
}

/// Describe the rows the formatter would change, by source line number.
///
/// A `layout` change only moves columns or changes case; a `rewrite` changes the text itself (an elided addressing
/// mode, a widened hex constant). `None` when the source is already formatted.
pub fn format_diff(source: &str) -> Result<Option<String>, FormatError> {
    let (lines, symbols) = parse_source(source)?;
    let config = FormatConfig::default();
    let rows: Vec<&str> = source.lines().collect();

    let mut diff = String::new();
    for line in &lines {
        let Some(row) = line.source.as_ref().map(|s| s.lower().row as usize) else {
            continue;
        };
        let before = rows.get(row).copied().unwrap_or_default();
        let after = format_line(line, &symbols, &config);
        if before == after {
            continue;
        }
        let change = if squeeze(before) == squeeze(&after) { "layout" } else { "rewrite" };
        diff.push_str(&format!("{:>4} {change}\n  - {before}\n  + {after}\n", row + 1));
    }
    if !source.is_empty() && !source.ends_with('\n') {
        diff.push_str("     missing newline at end of file\n");
    }

    Ok((!diff.is_empty()).then_some(diff))
}

/// Collapse runs of whitespace and fold case.
fn squeeze(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_uppercase()
}
