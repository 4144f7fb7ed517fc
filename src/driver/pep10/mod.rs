//! The Pep/10 assembler pipeline.
//!
//! ## Module Structure
//!
//! - `parse` - Source text to lines
//! - `expand` - Macro inclusion and flattening
//! - `group` - Sectioning and OS layout declarations
//! - `exports` - Global symbols and system-call macros
//! - `addresses` - Address assignment and symbol values
//! - `sanity` - Whole-program checks
//! - `object` - Object code encoding and the object file
//!
//! ## Bodies
//!
//! | name          | written by       | contents                                  |
//! |---------------|------------------|-------------------------------------------|
//! | `source`      | caller           | assembly text                             |
//! | `diagnostics` | Parse            | syntax errors                             |
//! | `lines`       | Parse            | flat line list, until GroupNodes          |
//! | `sections`    | GroupNodes       | lines split by `.SECTION`                 |
//! | `layout`      | GroupNodes       | system calls, MMIO ports, address span    |
//! | `object`      | ExportToObject   | the encoded object file                   |
//!
//! ## Notes
//! - Every transform's result stage is the stage that follows it, so a target's stage names the next thing to do.
//! - The operating system is added first so that its exports and system calls exist when the user program is parsed.

pub mod addresses;
pub mod exports;
pub mod expand;
pub mod group;
pub mod object;
pub mod parse;
pub mod sanity;

use pepp_core::symbol::SymbolTable;
use pepp_syntax::ast::Line;
use pepp_syntax::diagnostics::DiagnosticTable;
use pepp_syntax::intern::{PoolHandle, StringPool};
use pepp_syntax::source::LocationInterval;

use crate::macros::MacroRegistry;

pub use group::{Layout, MmioDeclaration, MmioDirection, Section};
pub use object::ObjectFile;

use super::{Pipeline, Target, TargetKind, Transform};

// ============================================================================
// STAGES AND BODIES
// ============================================================================

/// Pep/10 build stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Start,
    Parse,
    IncludeMacros,
    FlattenMacros,
    GroupNodes,
    RegisterExports,
    AssignAddresses,
    WholeProgramSanity,
    ExportToObject,
    End,
}

impl super::Stage for Stage {
    const FIRST: Self = Stage::Start;
    const LAST: Self = Stage::End;
}

impl Stage {
    pub const ALL: &'static [Stage] = &[
        Stage::Start,
        Stage::Parse,
        Stage::IncludeMacros,
        Stage::FlattenMacros,
        Stage::GroupNodes,
        Stage::RegisterExports,
        Stage::AssignAddresses,
        Stage::WholeProgramSanity,
        Stage::ExportToObject,
        Stage::End,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Parse => "parse",
            Stage::IncludeMacros => "include-macros",
            Stage::FlattenMacros => "flatten-macros",
            Stage::GroupNodes => "group-nodes",
            Stage::RegisterExports => "register-exports",
            Stage::AssignAddresses => "assign-addresses",
            Stage::WholeProgramSanity => "whole-program-sanity",
            Stage::ExportToObject => "export-to-object",
            Stage::End => "end",
        }
    }

    pub fn from_name(name: &str) -> Option<Stage> {
        Stage::ALL.iter().copied().find(|s| s.as_str().eq_ignore_ascii_case(name))
    }

    /// The stage after this one; `End` is its own successor.
    pub fn next(self) -> Stage {
        let index = Stage::ALL.iter().position(|&s| s == self).unwrap_or(Stage::ALL.len() - 1);
        Stage::ALL.get(index + 1).copied().unwrap_or(Stage::End)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-known body names.
pub mod names {
    pub const SOURCE: &str = "source";
    pub const DIAGNOSTICS: &str = "diagnostics";
    pub const LINES: &str = "lines";
    pub const SECTIONS: &str = "sections";
    pub const LAYOUT: &str = "layout";
    pub const OBJECT: &str = "object";
}

/// One representation of a target.
#[derive(Debug, Clone)]
pub enum Body {
    Source(String),
    Diagnostics(DiagnosticTable),
    Lines(Vec<Line>),
    Sections(Vec<Section>),
    Layout(Layout),
    Object(ObjectFile),
}

pub type Pep10Target = Target<Stage, Body>;
pub type Pep10Pipeline = Pipeline<Globals, Stage, Body>;
pub type Pep10Transform = Box<dyn Transform<Globals, Stage, Body>>;

// ============================================================================
// GLOBALS AND FEATURES
// ============================================================================

/// State shared by every target of one build.
#[derive(Debug)]
pub struct Globals {
    /// The linker's table: one child of the root per target.
    pub symbols: SymbolTable,
    pub pool: PoolHandle,
    pub macros: MacroRegistry,
}

impl Default for Globals {
    fn default() -> Self {
        Self::new()
    }
}

impl Globals {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            pool: StringPool::shared(),
            macros: MacroRegistry::new(),
        }
    }
}

/// Per-target switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Features {
    /// The target is an operating system and may use OS-only directives.
    pub is_os: bool,
    /// Accept symbolic arguments that are never defined; they encode as zero.
    pub ignore_undefined_symbols: bool,
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

/// An empty Pep/10 pipeline.
pub fn pipeline() -> Pep10Pipeline {
    Pipeline::new(Globals::new())
}

/// Add an operating-system target.
pub fn add_os(pipeline: &mut Pep10Pipeline, source: &str, features: Features) {
    add(pipeline, TargetKind::Os, source, Features { is_os: true, ..features });
}

/// Add a user-program target.
pub fn add_user(pipeline: &mut Pep10Pipeline, source: &str, features: Features) {
    add(pipeline, TargetKind::User, source, Features { is_os: false, ..features });
}

fn add(pipeline: &mut Pep10Pipeline, kind: TargetKind, source: &str, features: Features) {
    let symbols = &mut pipeline.globals.symbols;
    let scope = symbols.add_child(symbols.root());
    let target = Target::new(kind, scope).with_body(names::SOURCE, Body::Source(source.to_string()));
    pipeline.add_target(target, transforms(features));
}

/// The transforms of a Pep/10 target, in execution order.
pub fn transforms(features: Features) -> Vec<Pep10Transform> {
    vec![
        Box::new(parse::Parse),
        Box::new(expand::IncludeMacros),
        Box::new(expand::FlattenMacros),
        Box::new(group::GroupNodes),
        Box::new(exports::RegisterExports { features }),
        Box::new(addresses::AssignAddresses),
        Box::new(sanity::WholeProgramSanity { features }),
        Box::new(object::ExportToObject { features }),
    ]
}

// ============================================================================
// BODY ACCESS
// ============================================================================

/// Lines of a target: the flat list before GroupNodes, every section's lines after.
pub fn lines(target: &Pep10Target) -> Vec<&Line> {
    match (target.bodies.get(names::SECTIONS), target.bodies.get(names::LINES)) {
        (Some(Body::Sections(sections)), _) => sections.iter().flat_map(|s| s.lines.iter()).collect(),
        (_, Some(Body::Lines(lines))) => lines.iter().collect(),
        _ => Vec::new(),
    }
}

/// Mutable view of every line, in the same order as [`lines`].
pub fn lines_mut(target: &mut Pep10Target) -> Vec<&mut Line> {
    if target.bodies.contains_key(names::SECTIONS) {
        match target.bodies.get_mut(names::SECTIONS) {
            Some(Body::Sections(sections)) => sections.iter_mut().flat_map(|s| s.lines.iter_mut()).collect(),
            _ => Vec::new(),
        }
    } else {
        match target.bodies.get_mut(names::LINES) {
            Some(Body::Lines(lines)) => lines.iter_mut().collect(),
            _ => Vec::new(),
        }
    }
}

pub fn sections(target: &Pep10Target) -> &[Section] {
    match target.bodies.get(names::SECTIONS) {
        Some(Body::Sections(sections)) => sections,
        _ => &[],
    }
}

pub fn layout(target: &Pep10Target) -> Option<&Layout> {
    match target.bodies.get(names::LAYOUT) {
        Some(Body::Layout(layout)) => Some(layout),
        _ => None,
    }
}

pub fn object(target: &Pep10Target) -> Option<&ObjectFile> {
    match target.bodies.get(names::OBJECT) {
        Some(Body::Object(object)) => Some(object),
        _ => None,
    }
}

/// An error found anywhere in a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetError {
    pub interval: Option<LocationInterval>,
    pub message: String,
}

/// Every syntax error and line error of a target, syntax errors first.
pub fn errors(target: &Pep10Target) -> Vec<TargetError> {
    let mut out = Vec::new();
    if let Some(Body::Diagnostics(table)) = target.bodies.get(names::DIAGNOSTICS) {
        out.extend(table.iter().map(|d| TargetError {
            interval: Some(d.interval),
            message: d.message.clone(),
        }));
    }
    for line in lines(target) {
        collect_line_errors(line, line.source, &mut out);
    }
    out
}

/// Lines inside an expansion were parsed from the macro body, so they report at the invocation instead.
fn collect_line_errors(line: &Line, at: Option<LocationInterval>, out: &mut Vec<TargetError>) {
    out.extend(line.errors().iter().map(|message| TargetError {
        interval: at,
        message: message.clone(),
    }));
    if let pepp_syntax::ast::LineKind::MacroInvocation {
        expansion: Some(body), ..
    } = &line.kind
    {
        for inner in body {
            collect_line_errors(inner, at, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names_round_trip() {
        for &stage in Stage::ALL {
            assert_eq!(Stage::from_name(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::from_name("nope"), None);
    }

    #[test]
    fn test_next_stage() {
        assert_eq!(Stage::Start.next(), Stage::Parse);
        assert_eq!(Stage::ExportToObject.next(), Stage::End);
        assert_eq!(Stage::End.next(), Stage::End);
    }

    #[test]
    fn test_transform_results_follow_their_stage() {
        let list = transforms(Features::default());
        assert_eq!(list.len(), 8);
        for pair in list.windows(2) {
            assert_eq!(pair[0].result_stage(), pair[1].stage());
        }
        for t in &list {
            assert_eq!(t.result_stage(), t.stage().next());
        }
    }

    #[test]
    fn test_targets_get_their_own_scope() {
        let mut p = pipeline();
        add_os(&mut p, "", Features::default());
        add_user(&mut p, "", Features::default());
        let [os, user] = p.targets() else {
            panic!("two targets expected");
        };
        assert_ne!(os.scope, user.scope);
        assert_eq!(os.stage, Stage::Start);
    }
}
