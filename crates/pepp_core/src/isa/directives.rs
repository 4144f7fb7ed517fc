//! Define the assembler dot commands (`.BLOCK`, `.EQUATE`, `.SECTION`, ...).
//!
//! Each directive carries the policy bits the assembler pipeline needs: whether it occupies an address in the object
//! code and whether it is only legal in operating-system sources.

/// Stable identifier for every dot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirectiveId {
    Align,
    Ascii,
    Block,
    Byte,
    Equate,
    Export,
    Import,
    Input,
    Output,
    Org,
    Scall,
    Section,
    Word,
}

/// Metadata for a dot command.
#[derive(Debug, Clone, Copy)]
pub struct DirectiveInfo {
    pub id: DirectiveId,
    /// Canonical spelling, uppercase and without the leading dot.
    pub canonical: &'static str,
    /// Whether the directive emits bytes (and therefore receives an address).
    pub addressable: bool,
    /// Whether the directive is only legal in an operating-system source.
    pub os_only: bool,
}

const fn info(id: DirectiveId, canonical: &'static str, addressable: bool, os_only: bool) -> DirectiveInfo {
    DirectiveInfo {
        id,
        canonical,
        addressable,
        os_only,
    }
}

/// Registry of all dot commands.
pub const DIRECTIVES: &[DirectiveInfo] = &[
    info(DirectiveId::Align, "ALIGN", true, false),
    info(DirectiveId::Ascii, "ASCII", true, false),
    info(DirectiveId::Block, "BLOCK", true, false),
    info(DirectiveId::Byte, "BYTE", true, false),
    info(DirectiveId::Equate, "EQUATE", false, false),
    info(DirectiveId::Export, "EXPORT", false, true),
    info(DirectiveId::Import, "IMPORT", false, true),
    info(DirectiveId::Input, "INPUT", false, true),
    info(DirectiveId::Output, "OUTPUT", false, true),
    info(DirectiveId::Org, "ORG", false, false),
    info(DirectiveId::Scall, "SCALL", false, true),
    info(DirectiveId::Section, "SECTION", false, false),
    info(DirectiveId::Word, "WORD", true, false),
];

/// Canonical spelling (no dot).
pub fn as_str(id: DirectiveId) -> &'static str {
    info_for(id).canonical
}

/// Full metadata for a directive.
pub fn info_for(id: DirectiveId) -> &'static DirectiveInfo {
    DIRECTIVES
        .iter()
        .find(|d| d.id == id)
        .expect("INVARIANT: every DirectiveId has a DIRECTIVES entry")
}

/// Case-insensitive lookup by spelling, without the leading dot.
pub fn from_str(s: &str) -> Option<DirectiveId> {
    DIRECTIVES
        .iter()
        .find(|d| d.canonical.eq_ignore_ascii_case(s))
        .map(|d| d.id)
}

/// Alignments accepted by `.ALIGN`.
pub const LEGAL_ALIGNMENTS: &[u16] = &[1, 2, 4, 8];

/// Section flags accepted by `.SECTION`, in canonical order.
pub const SECTION_FLAGS: &[char] = &['r', 'w', 'x', 'z'];
