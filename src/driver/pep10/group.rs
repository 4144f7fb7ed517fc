//! Sectioning.

use pepp_core::symbol::SymbolId;
use pepp_syntax::ast::{Annotation, Line, LineKind, SectionFlags};

use super::{Body, Globals, Pep10Target, Stage, names};
use crate::driver::Transform;

/// Name of the section that holds lines before any `.SECTION`.
pub const DEFAULT_SECTION: &str = ".text";

/// A named run of lines sharing flags. Repeated `.SECTION`s of one name are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub flags: SectionFlags,
    pub lines: Vec<Line>,
}

impl Section {
    pub fn new(name: impl Into<String>, flags: SectionFlags) -> Self {
        Self {
            name: name.into(),
            flags,
            lines: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmioDirection {
    Input,
    Output,
}

impl MmioDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            MmioDirection::Input => "input",
            MmioDirection::Output => "output",
        }
    }
}

/// A memory-mapped port declared with `.INPUT` or `.OUTPUT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MmioDeclaration {
    pub name: String,
    pub symbol: SymbolId,
    pub direction: MmioDirection,
}

/// Whole-target facts that are not tied to a single line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    /// `.SCALL` names, in declaration order.
    pub system_calls: Vec<String>,
    pub mmio: Vec<MmioDeclaration>,
    /// Half-open `[start, end)` byte range, set by AssignAddresses. Kept wide so overflow can be reported.
    pub span: Option<(i64, i64)>,
}

impl Layout {
    /// Bytes of object code, zero before addresses are assigned.
    pub fn size(&self) -> i64 {
        self.span.map_or(0, |(start, end)| end - start)
    }
}

/// Split the flat line list into sections and record the OS layout declarations.
pub struct GroupNodes;

impl Transform<Globals, Stage, Body> for GroupNodes {
    fn name(&self) -> &'static str {
        "group-nodes"
    }

    fn stage(&self) -> Stage {
        Stage::GroupNodes
    }

    fn result_stage(&self) -> Stage {
        Stage::RegisterExports
    }

    #[tracing::instrument(skip_all, fields(kind = ?target.kind))]
    fn run(&self, globals: &mut Globals, target: &mut Pep10Target) -> bool {
        let Some(Body::Lines(lines)) = target.bodies.remove(names::LINES) else {
            return false;
        };
        let (sections, layout) = group(lines, globals);
        tracing::debug!(sections = sections.len(), scalls = layout.system_calls.len(), "grouped");
        target.bodies.insert(names::SECTIONS.to_string(), Body::Sections(sections));
        target.bodies.insert(names::LAYOUT.to_string(), Body::Layout(layout));
        true
    }
}

fn group(lines: Vec<Line>, globals: &Globals) -> (Vec<Section>, Layout) {
    let mut sections = vec![Section::new(DEFAULT_SECTION, SectionFlags::DEFAULT)];
    let mut current = 0;
    let mut layout = Layout::default();

    for line in lines {
        match &line.kind {
            LineKind::Section { name, flags } => {
                current = match sections.iter().position(|s| &s.name == name) {
                    Some(index) => index,
                    None => {
                        sections.push(Section::new(name.clone(), *flags));
                        sections.len() - 1
                    }
                };
            }
            LineKind::Annotate { which, symbol } => {
                let name = globals.symbols.entry(*symbol).name().to_string();
                match which {
                    Annotation::Scall => layout.system_calls.push(name),
                    Annotation::Input | Annotation::Output => layout.mmio.push(MmioDeclaration {
                        name,
                        symbol: *symbol,
                        direction: if *which == Annotation::Input {
                            MmioDirection::Input
                        } else {
                            MmioDirection::Output
                        },
                    }),
                    Annotation::Export | Annotation::Import => {}
                }
            }
            _ => {}
        }
        sections[current].lines.push(line);
    }

    if sections[0].lines.is_empty() && sections.len() > 1 {
        sections.remove(0);
    }
    (sections, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::pep10::{self, Features};

    fn grouped(source: &str, os: bool) -> pep10::Pep10Pipeline {
        let mut p = pep10::pipeline();
        if os {
            pep10::add_os(&mut p, source, Features::default());
        } else {
            pep10::add_user(&mut p, source, Features::default());
        }
        assert!(p.assemble_to(Stage::GroupNodes));
        p
    }

    #[test]
    fn test_default_section() {
        let p = grouped("NOP\nRET\n", false);
        let sections = pep10::sections(&p.targets()[0]);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, ".text");
        assert_eq!(sections[0].flags, SectionFlags::DEFAULT);
        assert_eq!(sections[0].lines.len(), 2);
        assert!(!p.targets()[0].bodies.contains_key(names::LINES));
    }

    #[test]
    fn test_repeated_sections_merge_in_first_order() {
        let source = ".SECTION \"a\", \"rw\"\n.BYTE 1\n.SECTION \"b\", \"rx\"\nNOP\n.SECTION \"a\", \"rw\"\n.BYTE 2\n";
        let p = grouped(source, false);
        let sections = pep10::sections(&p.targets()[0]);
        let shape: Vec<_> = sections.iter().map(|s| (s.name.as_str(), s.lines.len())).collect();
        assert_eq!(shape, [("a", 4), ("b", 2)]);
    }

    #[test]
    fn test_leading_lines_keep_default_section() {
        let p = grouped("; header\n.SECTION \"data\", \"rw\"\n.WORD 1\n", false);
        let names: Vec<_> = pep10::sections(&p.targets()[0]).iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, [".text", "data"]);
    }

    #[test]
    fn test_layout_collects_os_declarations() {
        let p = grouped(".SCALL DECI\n.INPUT charIn\n.OUTPUT charOut\n", true);
        let layout = pep10::layout(&p.targets()[0]).expect("layout body");
        assert_eq!(layout.system_calls, ["DECI"]);
        let mmio: Vec<_> = layout.mmio.iter().map(|m| (m.name.as_str(), m.direction)).collect();
        assert_eq!(mmio, [("charIn", MmioDirection::Input), ("charOut", MmioDirection::Output)]);
        assert_eq!(layout.size(), 0);
    }
}
