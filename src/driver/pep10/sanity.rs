//! Whole-program checks.
//!
//! Checks run in a fixed order and stop at the first kind that fails, so a program that is far too large is not also
//! buried under undefined-symbol errors.

use pepp_core::isa::directives;
use pepp_core::symbol::{DefinitionState, SymbolId, SymbolTable};
use pepp_syntax::ast::{Line, LineKind};

use super::{Body, Features, Globals, Pep10Target, Stage};
use crate::driver::Transform;

/// Largest object a program may produce.
pub const MAX_OBJECT_SIZE: i64 = 0x10000;

/// Reject programs that assembled line by line but do not make sense as a whole.
pub struct WholeProgramSanity {
    pub features: Features,
}

impl Transform<Globals, Stage, Body> for WholeProgramSanity {
    fn name(&self) -> &'static str {
        "whole-program-sanity"
    }

    fn stage(&self) -> Stage {
        Stage::WholeProgramSanity
    }

    fn result_stage(&self) -> Stage {
        Stage::ExportToObject
    }

    #[tracing::instrument(skip_all, fields(kind = ?target.kind))]
    fn run(&self, globals: &mut Globals, target: &mut Pep10Target) -> bool {
        let span = super::layout(target).and_then(|l| l.span);
        let symbols = &globals.symbols;
        let mut lines = super::lines_mut(target);

        if let Some((start, end)) = span {
            if start < 0 || end > MAX_OBJECT_SIZE {
                let first = lines.iter_mut().find(|l| l.kind.is_addressable());
                if let Some(first) = first {
                    first.add_error(format!("Object code must fit within {MAX_OBJECT_SIZE} bytes."));
                }
                return false;
            }
        }
        if !check_overlap(&mut lines) {
            return false;
        }

        if !self.features.is_os && !check_os_only(&mut lines) {
            return false;
        }
        if !self.features.ignore_undefined_symbols && !check_undefined(&mut lines, symbols) {
            return false;
        }
        check_multiply_defined(&mut lines, symbols)
    }
}

/// A backward `.ORG` may place code on top of code laid out earlier.
fn check_overlap(lines: &mut [&mut Line]) -> bool {
    let mut ranges: Vec<(u32, u32, usize)> = lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            let address = line.address()?;
            let start = u32::from(address.address);
            (address.size > 0).then_some((start, start + address.size, index))
        })
        .collect();
    ranges.sort_unstable_by_key(|&(start, _, index)| (start, index));

    let mut ok = true;
    let mut reach = 0;
    for (start, end, index) in ranges {
        if start < reach {
            lines[index].add_error(format!("Object code overlaps at address 0x{start:04X}."));
            ok = false;
        }
        reach = reach.max(end);
    }
    ok
}

fn check_os_only(lines: &mut [&mut Line]) -> bool {
    let mut ok = true;
    for line in lines.iter_mut() {
        let Some(directive) = line.kind.directive() else {
            continue;
        };
        let info = directives::info_for(directive);
        if info.os_only {
            line.add_error(format!("Only operating systems may use .{}.", info.canonical));
            ok = false;
        }
    }
    ok
}

/// The symbol a line uses, as opposed to one it declares.
fn used_symbol(line: &Line) -> Option<SymbolId> {
    match &line.kind {
        LineKind::Annotate { symbol, .. } => Some(*symbol),
        kind => kind.argument().and_then(|a| a.symbol()),
    }
}

fn check_undefined(lines: &mut [&mut Line], symbols: &SymbolTable) -> bool {
    let mut ok = true;
    for line in lines.iter_mut() {
        let Some(id) = used_symbol(line) else {
            continue;
        };
        let entry = symbols.entry(id);
        if entry.state() == DefinitionState::Undefined {
            line.add_error(format!("Undefined symbol {}.", entry.name()));
            ok = false;
        }
    }
    ok
}

fn check_multiply_defined(lines: &mut [&mut Line], symbols: &SymbolTable) -> bool {
    let mut ok = true;
    for line in lines.iter_mut() {
        let Some(id) = line.symbol() else {
            continue;
        };
        let entry = symbols.entry(id);
        if matches!(
            entry.state(),
            DefinitionState::Multiple | DefinitionState::ExternalMultiple
        ) {
            line.add_error(format!("Multiply defined symbol {}.", entry.name()));
            ok = false;
        }
    }
    ok
}
