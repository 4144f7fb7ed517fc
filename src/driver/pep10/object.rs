//! Object code.
//!
//! ## Notes
//! - Operands are big-endian. Symbolic operands that never received a value encode as zero; WholeProgramSanity has
//!   already rejected them unless undefined symbols were explicitly allowed.
//! - `.BLOCK` and `.ALIGN` emit zeros, sized by the address AssignAddresses recorded.
//! - A section is split wherever an `.ORG` moves the location counter, so each [`ObjectSection`] is one contiguous
//!   run of bytes at its own address.

use pepp_core::isa::{mnemonics, vectors};
use pepp_core::symbol::{Binding, DefinitionState, SymbolTable, SymbolType};
use pepp_syntax::ast::{Line, LineKind, SectionFlags, Value};
use serde_json::{Value as Json, json};

use super::{Body, Features, Globals, MmioDirection, Pep10Target, Stage, names};
use crate::driver::Transform;

// ============================================================================
// OBJECT FILE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSection {
    pub name: String,
    pub flags: SectionFlags,
    /// Address of the first byte; 0 for a section without object code.
    pub address: u16,
    pub bytes: Vec<u8>,
}

impl ObjectSection {
    /// One past the last byte.
    pub fn end(&self) -> u32 {
        u32::from(self.address) + self.bytes.len() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSymbol {
    pub name: String,
    pub value: u16,
    pub size: u32,
    pub kind: SymbolType,
    pub binding: Binding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MmioPort {
    pub name: String,
    pub address: u16,
    pub direction: MmioDirection,
}

/// Everything a loader or linker needs from one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectFile {
    pub sections: Vec<ObjectSection>,
    pub symbols: Vec<ObjectSymbol>,
    pub mmio: Vec<MmioPort>,
    pub system_calls: Vec<String>,
}

impl ObjectFile {
    /// Memory image from the lowest section address to the end of the highest section. Gaps are zero.
    pub fn bytes(&self) -> Vec<u8> {
        let filled = self.sections.iter().filter(|s| !s.bytes.is_empty());
        let Some(base) = filled.clone().map(|s| u32::from(s.address)).min() else {
            return Vec::new();
        };
        let end = filled.clone().map(ObjectSection::end).max().unwrap_or(base);

        let mut image = vec![0u8; (end - base) as usize];
        for section in filled {
            let start = (u32::from(section.address) - base) as usize;
            image[start..start + section.bytes.len()].copy_from_slice(&section.bytes);
        }
        image
    }

    /// The Pep/10 loader format: space-separated hex bytes, sixteen per line, closed by `zz`.
    pub fn to_pepo(&self) -> String {
        let bytes = self.bytes();
        let mut out = String::new();
        for chunk in bytes.chunks(16) {
            let row: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
            out.push_str(&row.join(" "));
            out.push(' ');
            out.push('\n');
        }
        out.push_str("zz\n");
        out
    }

    pub fn to_json(&self) -> Json {
        json!({
            "sections": self.sections.iter().map(|s| json!({
                "name": s.name,
                "flags": s.flags.to_string(),
                "address": s.address,
                "size": s.bytes.len(),
            })).collect::<Vec<_>>(),
            "symbols": self.symbols.iter().map(|s| json!({
                "name": s.name,
                "value": s.value,
                "size": s.size,
                "type": symbol_type_name(s.kind),
                "binding": binding_name(s.binding),
            })).collect::<Vec<_>>(),
            "mmio": self.mmio.iter().map(|m| json!({
                "name": m.name,
                "address": m.address,
                "direction": m.direction.as_str(),
            })).collect::<Vec<_>>(),
            "system_calls": self.system_calls,
        })
    }
}

fn symbol_type_name(kind: SymbolType) -> &'static str {
    match kind {
        SymbolType::Empty => "empty",
        SymbolType::Object => "object",
        SymbolType::Code => "code",
        SymbolType::Constant => "constant",
        SymbolType::PtrToSym => "alias",
        SymbolType::Deleted => "deleted",
    }
}

fn binding_name(binding: Binding) -> &'static str {
    match binding {
        Binding::Local => "local",
        Binding::Global => "global",
        Binding::Imported => "imported",
    }
}

// ============================================================================
// ENCODING
// ============================================================================

/// Object bytes of one line. Lines without object code encode to nothing.
pub fn encode_line(line: &Line, symbols: &SymbolTable) -> Vec<u8> {
    let eval = |v: &Value| v.evaluate(symbols, symbols).unwrap_or(0);
    let zeros = || vec![0u8; line.address().map_or(0, |a| a.size as usize)];
    match &line.kind {
        LineKind::Monadic { mnemonic } => mnemonics::opcode_for(*mnemonic, None).into_iter().collect(),
        LineKind::Dyadic {
            mnemonic,
            mode,
            argument,
        } => {
            let Some(opcode) = mnemonics::opcode_for(*mnemonic, Some(*mode)) else {
                return Vec::new();
            };
            let [hi, lo] = eval(argument).to_be_bytes();
            vec![opcode, hi, lo]
        }
        LineKind::Byte { argument } => vec![eval(argument) as u8],
        LineKind::Word { argument } => eval(argument).to_be_bytes().to_vec(),
        LineKind::Ascii { argument } => match argument {
            Value::ShortString { bytes, .. } | Value::LongString { bytes, .. } => bytes.clone(),
            _ => Vec::new(),
        },
        LineKind::Block { .. } | LineKind::Align { .. } => zeros(),
        _ => Vec::new(),
    }
}

// ============================================================================
// TRANSFORM
// ============================================================================

/// Encode every section and build the target's [`ObjectFile`].
pub struct ExportToObject {
    pub features: Features,
}

impl Transform<Globals, Stage, Body> for ExportToObject {
    fn name(&self) -> &'static str {
        "export-to-object"
    }

    fn stage(&self) -> Stage {
        Stage::ExportToObject
    }

    fn result_stage(&self) -> Stage {
        Stage::End
    }

    #[tracing::instrument(skip_all, fields(kind = ?target.kind))]
    fn run(&self, globals: &mut Globals, target: &mut Pep10Target) -> bool {
        let symbols = &globals.symbols;
        let mut object = ObjectFile::default();

        for section in super::sections(target) {
            let first = object.sections.len();
            for line in &section.lines {
                let Some(address) = line.address() else {
                    continue;
                };
                let bytes = encode_line(line, symbols);
                if bytes.is_empty() {
                    continue;
                }
                match object.sections[first..].last_mut() {
                    Some(run) if run.end() == u32::from(address.address) => run.bytes.extend(bytes),
                    _ => object.sections.push(ObjectSection {
                        name: section.name.clone(),
                        flags: section.flags,
                        address: address.address,
                        bytes,
                    }),
                }
            }
            if object.sections.len() == first {
                object.sections.push(ObjectSection {
                    name: section.name.clone(),
                    flags: section.flags,
                    address: section.lines.iter().find_map(|l| l.address()).map_or(0, |a| a.address),
                    bytes: Vec::new(),
                });
            }
        }

        for id in symbols.entries_in(target.scope) {
            let entry = symbols.entry(id);
            if entry.state() == DefinitionState::Undefined {
                continue;
            }
            let resolved = symbols.resolve(id, symbols).unwrap_or_default();
            object.symbols.push(ObjectSymbol {
                name: entry.name().to_string(),
                value: resolved.direct().unwrap_or(0),
                size: resolved.size(),
                kind: resolved.symbol_type(),
                binding: entry.binding(),
            });
        }

        if self.features.is_os {
            if let Some(layout) = super::layout(target) {
                object.system_calls = layout.system_calls.clone();
                object.mmio = layout
                    .mmio
                    .iter()
                    .map(|m| MmioPort {
                        name: m.name.clone(),
                        address: symbols
                            .value(m.symbol, symbols)
                            .or_else(|| vectors::from_name(&m.name).map(|v| v.address))
                            .unwrap_or(0),
                        direction: m.direction,
                    })
                    .collect();
            }
        }

        tracing::debug!(
            sections = object.sections.len(),
            symbols = object.symbols.len(),
            bytes = object.bytes().len(),
            "exported object"
        );
        target.bodies.insert(names::OBJECT.to_string(), Body::Object(object));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::pep10::{self, Features, Pep10Pipeline};

    fn assembled(source: &str) -> Pep10Pipeline {
        let mut p = pep10::pipeline();
        pep10::add_user(&mut p, source, Features::default());
        assert!(p.assemble(), "{:?}", pep10::errors(&p.targets()[0]));
        p
    }

    #[test]
    fn test_encodes_instructions_and_data() {
        let p = assembled("LDWA x,d\nRET\nx: .WORD 0x1234\n.BYTE 'A'\n.ASCII \"hi\"\n.BLOCK 2\n");
        let object = pep10::object(&p.targets()[0]).expect("object body");
        assert_eq!(
            object.bytes(),
            [0xC1, 0x00, 0x04, 0x01, 0x12, 0x34, 0x41, 0x68, 0x69, 0x00, 0x00]
        );
    }

    #[test]
    fn test_org_gap_splits_section() {
        let p = assembled(".ORG 0x0010\n.WORD 2\n.ORG 0x0020\n.WORD 3\n");
        let object = pep10::object(&p.targets()[0]).expect("object body");
        let runs: Vec<_> = object.sections.iter().map(|s| (s.name.as_str(), s.address, s.bytes.len())).collect();
        assert_eq!(runs, [(".text", 0x10, 2), (".text", 0x20, 2)]);

        let mut image = vec![0x00, 0x02];
        image.extend([0u8; 14]);
        image.extend([0x00, 0x03]);
        assert_eq!(object.bytes(), image);
    }

    #[test]
    fn test_pepo_rows_of_sixteen() {
        let p = assembled(".BLOCK 17\n");
        let object = pep10::object(&p.targets()[0]).expect("object body");
        let pepo = object.to_pepo();
        let rows: Vec<_> = pepo.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], "00 ");
        assert_eq!(rows[2], "zz");
    }

    #[test]
    fn test_symbols_carry_type_and_binding() {
        let p = assembled("k: .EQUATE 7\nmain: NOP\nd: .BYTE 1\n");
        let object = pep10::object(&p.targets()[0]).expect("object body");
        let mut summary: Vec<_> = object
            .symbols
            .iter()
            .map(|s| (s.name.as_str(), s.value, s.kind, s.binding))
            .collect();
        summary.sort_by_key(|s| s.0);
        assert_eq!(
            summary,
            [
                ("d", 1, SymbolType::Object, Binding::Local),
                ("k", 7, SymbolType::Constant, Binding::Local),
                ("main", 0, SymbolType::Code, Binding::Local),
            ]
        );
    }
}
