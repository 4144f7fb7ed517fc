//! Listings: source annotated with addresses and object code.

use pepp_core::symbol::SymbolTable;
use pepp_syntax::ast::{Line, LineKind};

use super::{ColumnWriter, FormatConfig, format_line};
use crate::driver::pep10::object::encode_line;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// Address, object code and formatted source for each line.
///
/// Object code longer than `bytes_per_line` continues on rows of its own below the line. Macro invocations that were
/// never flattened are skipped, since their bodies carry the code.
pub fn listing<'a>(
    lines: impl IntoIterator<Item = &'a Line>,
    symbols: &SymbolTable,
    config: &FormatConfig,
) -> Vec<String> {
    let per_row = config.bytes_per_line.max(1);
    let mut w = ColumnWriter::new();
    for line in lines {
        if matches!(line.kind, LineKind::MacroInvocation { .. }) {
            continue;
        }
        let address = line.address();
        let bytes = if address.is_some() {
            encode_line(line, symbols)
        } else {
            Vec::new()
        };
        let mut chunks = bytes.chunks(per_row);

        let address = address.map(|a| format!("{:04X}", a.address)).unwrap_or_default();
        w.right(&address, 4);
        w.write("  ");
        w.column(&hex(chunks.next().unwrap_or_default()), 2 * per_row + 1);
        w.write(&format_line(line, symbols, config));
        w.end_row();

        for chunk in chunks {
            w.write("      ");
            w.write(&hex(chunk));
            w.end_row();
        }
    }
    w.finish()
}

/// `AAAA     BYTES ;comment` for every line that produced object code.
pub fn hex_listing<'a>(lines: impl IntoIterator<Item = &'a Line>, symbols: &SymbolTable) -> Vec<String> {
    lines
        .into_iter()
        .filter_map(|line| {
            let address = line.address()?;
            let bytes = encode_line(line, symbols);
            if bytes.is_empty() {
                return None;
            }
            let spaced: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
            let mut row = format!("{:04X}     {}", address.address, spaced.join(" "));
            if let Some(comment) = line.comment() {
                row.push_str(" ;");
                row.push_str(comment);
            }
            Some(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::pep10::{self, Features, Pep10Pipeline};

    fn assembled(source: &str) -> Pep10Pipeline {
        let mut p = pep10::pipeline();
        pep10::add_user(&mut p, source, Features::default());
        assert!(p.assemble());
        p
    }

    #[test]
    fn test_listing_rows() {
        let p = assembled(";prog\nmain: LDWA 5,i\nRET\n.ASCII \"abcd\"\n");
        let lines = pep10::lines(&p.targets()[0]);
        let rows = listing(lines, &p.globals.symbols, &FormatConfig::default());
        assert_eq!(
            rows,
            [
                "             ;prog",
                "0000  C00005 main:    LDWA    5,i",
                "0003  01              RET",
                "0004  616263          .ASCII  \"abcd\"",
                "      64",
            ]
        );
    }

    #[test]
    fn test_hex_listing_skips_lines_without_code() {
        let p = assembled("k: .EQUATE 1\nLDWA k,i ;one\n.BLOCK 0\nRET\n");
        let lines = pep10::lines(&p.targets()[0]);
        let rows = hex_listing(lines, &p.globals.symbols);
        assert_eq!(rows, ["0000     C0 00 01 ;one", "0003     01"]);
    }
}
