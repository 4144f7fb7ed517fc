//! Address assignment.
//!
//! Sections are laid out back to back in the order GroupNodes produced them. The first `.ORG` pins its own address;
//! everything before it is placed so that it ends exactly there, and everything after it follows on. Later `.ORG`s
//! move the location counter again. Without any `.ORG` the program starts at 0.
//!
//! ## Notes
//! - The location counter is an `i64`; lines are stored modulo 0x10000 and the true span goes to the layout body so
//!   WholeProgramSanity can report overflow.
//! - `.ALIGN` padding depends on the address it lands on, so the start in front of an `.ORG` is found by iterating
//!   until it stops moving.

use pepp_core::isa::mnemonics;
use pepp_core::symbol::{LocationKind, SymbolTable, SymbolValue};
use pepp_syntax::ast::{Address, Attribute, Line, LineKind, Value};

use super::{Body, Globals, Pep10Target, Section, Stage, names};
use crate::driver::Transform;

/// Rounds of refinement for the start address in front of an `.ORG`.
const MAX_BACKWARD_PASSES: usize = 8;

const ADDRESS_SPACE: i64 = 0x10000;

/// Assign addresses to lines and values to their symbols.
pub struct AssignAddresses;

impl Transform<Globals, Stage, Body> for AssignAddresses {
    fn name(&self) -> &'static str {
        "assign-addresses"
    }

    fn stage(&self) -> Stage {
        Stage::AssignAddresses
    }

    fn result_stage(&self) -> Stage {
        Stage::WholeProgramSanity
    }

    #[tracing::instrument(skip_all, fields(kind = ?target.kind))]
    fn run(&self, globals: &mut Globals, target: &mut Pep10Target) -> bool {
        let Some(Body::Sections(sections)) = target.bodies.get_mut(names::SECTIONS) else {
            return false;
        };
        assign_equates(sections, &mut globals.symbols);
        let start = start_address(sections, &globals.symbols);
        let span = assign(sections, &mut globals.symbols, start);
        tracing::debug!(start, ?span, "laid out");

        if let Some(Body::Layout(layout)) = target.bodies.get_mut(names::LAYOUT) {
            layout.span = span;
        }
        true
    }
}

/// Give every `.EQUATE` symbol its value: a constant, or an alias when the argument is itself a symbol.
fn assign_equates(sections: &[Section], symbols: &mut SymbolTable) {
    for line in sections.iter().flat_map(|s| s.lines.iter()) {
        let LineKind::Equate { argument } = &line.kind else {
            continue;
        };
        let Some(symbol) = line.symbol() else {
            continue;
        };
        let value = match argument {
            Value::Symbolic(other) => SymbolValue::Alias(*other),
            literal => SymbolValue::constant(literal.literal_value().map_or(0, |v| v as u16)),
        };
        symbols.set_value(symbol, value);
    }
}

/// Bytes `line` occupies when placed at `base`.
pub fn line_size(line: &Line, base: i64, symbols: &SymbolTable) -> i64 {
    match &line.kind {
        LineKind::Monadic { mnemonic } | LineKind::Dyadic { mnemonic, .. } => {
            i64::from(mnemonics::instruction_size(*mnemonic))
        }
        LineKind::Byte { .. } => 1,
        LineKind::Word { .. } => 2,
        LineKind::Ascii { argument } => match argument {
            Value::ShortString { bytes, .. } | Value::LongString { bytes, .. } => bytes.len() as i64,
            _ => 0,
        },
        LineKind::Block { argument } => argument.evaluate(symbols, symbols).map_or(0, i64::from),
        LineKind::Align { argument } => {
            let align = argument.literal_value().unwrap_or(1).max(1);
            (align - base.rem_euclid(align)) % align
        }
        _ => 0,
    }
}

/// The first `.ORG` and its address, as (section index, line index, address).
fn first_org(sections: &[Section]) -> Option<(usize, usize, i64)> {
    sections.iter().enumerate().find_map(|(s, section)| {
        section.lines.iter().enumerate().find_map(|(l, line)| match &line.kind {
            LineKind::Org { argument } => argument.literal_value().map(|v| (s, l, v)),
            _ => None,
        })
    })
}

/// Where the first section starts.
fn start_address(sections: &[Section], symbols: &SymbolTable) -> i64 {
    let Some((org_section, org_line, org)) = first_org(sections) else {
        return 0;
    };
    let before = |start: i64| {
        let mut base = start;
        for (s, section) in sections.iter().enumerate().take(org_section + 1) {
            let count = if s == org_section { org_line } else { section.lines.len() };
            for line in &section.lines[..count] {
                base += line_size(line, base, symbols);
            }
        }
        base - start
    };

    let mut start = org - before(org);
    for _ in 0..MAX_BACKWARD_PASSES {
        let next = org - before(start);
        if next == start {
            break;
        }
        start = next;
    }
    start
}

/// Forward layout from `start`. Returns the half-open span of addressed bytes.
fn assign(sections: &mut [Section], symbols: &mut SymbolTable, start: i64) -> Option<(i64, i64)> {
    let mut base = start;
    let mut span: Option<(i64, i64)> = None;

    for line in sections.iter_mut().flat_map(|s| s.lines.iter_mut()) {
        if let LineKind::Org { argument } = &line.kind {
            if let Some(org) = argument.literal_value() {
                base = org;
            }
            continue;
        }
        if !line.kind.is_addressable() {
            continue;
        }

        let size = line_size(line, base, symbols);
        let address = base.rem_euclid(ADDRESS_SPACE) as u16;
        let size_u32 = u32::try_from(size).unwrap_or(0);
        line.insert(Attribute::Address(Address {
            address,
            size: size_u32,
        }));
        if let Some(symbol) = line.symbol() {
            let kind = match line.kind {
                LineKind::Monadic { .. } | LineKind::Dyadic { .. } => LocationKind::Code,
                _ => LocationKind::Object,
            };
            symbols.set_value(
                symbol,
                SymbolValue::Location {
                    address,
                    size: size_u32,
                    kind,
                },
            );
        }

        span = Some(match span {
            None => (base, base + size),
            Some((lo, hi)) => (lo.min(base), hi.max(base + size)),
        });
        base += size;
    }
    span
}
