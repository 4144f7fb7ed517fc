//! Define the Pep/10 instruction mnemonics and their encoding metadata.
//!
//! This module mirrors a keyword registry: a stable [`MnemonicId`] enum, a static [`MNEMONICS`] table carrying the
//! canonical spelling, base opcode, and [`InstructionType`] of each instruction, and helpers that answer addressing-mode
//! questions (which modes are valid, which mode is the default, when a mode may be elided).
//!
//! ## Notes
//! - Spellings are stored uppercase; [`from_str`] is case-insensitive.
//! - Unary instructions assemble to one byte; everything else assembles to an opcode byte plus a two-byte operand
//!   specifier, regardless of how many bytes the instruction later reads from memory.

use super::addressing::AddressingMode;

/// Encoding family of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionType {
    /// Unary, no register field (`RET`, `NOP`).
    UNone,
    /// Unary, register in the low bit (`NEGA`, `ASLX`).
    RNone,
    /// Two addressing modes, `i` and `x`, in the low bit (branches, `CALL`).
    AIx,
    /// All eight modes, no register (`ADDSP`, `SCALL`).
    AaaAll,
    /// All eight modes plus a register.
    RaaaAll,
    /// Like [`InstructionType::RaaaAll`] but immediate mode is illegal (stores).
    RaaaNoI,
}

/// Stable identifier for every Pep/10 mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MnemonicId {
    Ret,
    Sret,
    Movflga,
    Movaflg,
    Movspa,
    Movasp,
    Nop,
    Nega,
    Negx,
    Asla,
    Aslx,
    Asra,
    Asrx,
    Nota,
    Notx,
    Rola,
    Rolx,
    Rora,
    Rorx,
    Br,
    Brle,
    Brlt,
    Breq,
    Brne,
    Brge,
    Brgt,
    Brv,
    Brc,
    Call,
    Scall,
    Addsp,
    Subsp,
    Adda,
    Addx,
    Suba,
    Subx,
    Anda,
    Andx,
    Ora,
    Orx,
    Xora,
    Xorx,
    Cpwa,
    Cpwx,
    Cpba,
    Cpbx,
    Ldwa,
    Ldwx,
    Ldba,
    Ldbx,
    Stwa,
    Stwx,
    Stba,
    Stbx,
}

/// Metadata for a mnemonic.
#[derive(Debug, Clone, Copy)]
pub struct MnemonicInfo {
    pub id: MnemonicId,
    /// Canonical (uppercase) spelling.
    pub canonical: &'static str,
    /// Opcode of the instruction's first (immediate or only) encoding.
    pub opcode: u8,
    pub ty: InstructionType,
}

const fn info(id: MnemonicId, canonical: &'static str, opcode: u8, ty: InstructionType) -> MnemonicInfo {
    MnemonicInfo {
        id,
        canonical,
        opcode,
        ty,
    }
}

use InstructionType as T;
use MnemonicId as M;

/// Registry of all mnemonics, ordered by opcode.
pub const MNEMONICS: &[MnemonicInfo] = &[
    info(M::Ret, "RET", 0x01, T::UNone),
    info(M::Sret, "SRET", 0x02, T::UNone),
    info(M::Movflga, "MOVFLGA", 0x03, T::UNone),
    info(M::Movaflg, "MOVAFLG", 0x04, T::UNone),
    info(M::Movspa, "MOVSPA", 0x05, T::UNone),
    info(M::Movasp, "MOVASP", 0x06, T::UNone),
    info(M::Nop, "NOP", 0x07, T::UNone),
    info(M::Nega, "NEGA", 0x18, T::RNone),
    info(M::Negx, "NEGX", 0x19, T::RNone),
    info(M::Asla, "ASLA", 0x1A, T::RNone),
    info(M::Aslx, "ASLX", 0x1B, T::RNone),
    info(M::Asra, "ASRA", 0x1C, T::RNone),
    info(M::Asrx, "ASRX", 0x1D, T::RNone),
    info(M::Nota, "NOTA", 0x1E, T::RNone),
    info(M::Notx, "NOTX", 0x1F, T::RNone),
    info(M::Rola, "ROLA", 0x20, T::RNone),
    info(M::Rolx, "ROLX", 0x21, T::RNone),
    info(M::Rora, "RORA", 0x22, T::RNone),
    info(M::Rorx, "RORX", 0x23, T::RNone),
    info(M::Br, "BR", 0x24, T::AIx),
    info(M::Brle, "BRLE", 0x26, T::AIx),
    info(M::Brlt, "BRLT", 0x28, T::AIx),
    info(M::Breq, "BREQ", 0x2A, T::AIx),
    info(M::Brne, "BRNE", 0x2C, T::AIx),
    info(M::Brge, "BRGE", 0x2E, T::AIx),
    info(M::Brgt, "BRGT", 0x30, T::AIx),
    info(M::Brv, "BRV", 0x32, T::AIx),
    info(M::Brc, "BRC", 0x34, T::AIx),
    info(M::Call, "CALL", 0x36, T::AIx),
    info(M::Scall, "SCALL", 0x38, T::AaaAll),
    info(M::Addsp, "ADDSP", 0x40, T::AaaAll),
    info(M::Subsp, "SUBSP", 0x48, T::AaaAll),
    info(M::Adda, "ADDA", 0x50, T::RaaaAll),
    info(M::Addx, "ADDX", 0x58, T::RaaaAll),
    info(M::Suba, "SUBA", 0x60, T::RaaaAll),
    info(M::Subx, "SUBX", 0x68, T::RaaaAll),
    info(M::Anda, "ANDA", 0x70, T::RaaaAll),
    info(M::Andx, "ANDX", 0x78, T::RaaaAll),
    info(M::Ora, "ORA", 0x80, T::RaaaAll),
    info(M::Orx, "ORX", 0x88, T::RaaaAll),
    info(M::Xora, "XORA", 0x90, T::RaaaAll),
    info(M::Xorx, "XORX", 0x98, T::RaaaAll),
    info(M::Cpwa, "CPWA", 0xA0, T::RaaaAll),
    info(M::Cpwx, "CPWX", 0xA8, T::RaaaAll),
    info(M::Cpba, "CPBA", 0xB0, T::RaaaAll),
    info(M::Cpbx, "CPBX", 0xB8, T::RaaaAll),
    info(M::Ldwa, "LDWA", 0xC0, T::RaaaAll),
    info(M::Ldwx, "LDWX", 0xC8, T::RaaaAll),
    info(M::Ldba, "LDBA", 0xD0, T::RaaaAll),
    info(M::Ldbx, "LDBX", 0xD8, T::RaaaAll),
    info(M::Stwa, "STWA", 0xE0, T::RaaaNoI),
    info(M::Stwx, "STWX", 0xE8, T::RaaaNoI),
    info(M::Stba, "STBA", 0xF0, T::RaaaNoI),
    info(M::Stbx, "STBX", 0xF8, T::RaaaNoI),
];

/// Canonical spelling for a mnemonic.
pub fn as_str(id: MnemonicId) -> &'static str {
    info_for(id).canonical
}

/// Full metadata for a mnemonic.
pub fn info_for(id: MnemonicId) -> &'static MnemonicInfo {
    MNEMONICS
        .iter()
        .find(|m| m.id == id)
        .expect("INVARIANT: every MnemonicId has a MNEMONICS entry")
}

/// Case-insensitive lookup by spelling.
pub fn from_str(s: &str) -> Option<MnemonicId> {
    MNEMONICS
        .iter()
        .find(|m| m.canonical.eq_ignore_ascii_case(s))
        .map(|m| m.id)
}

/// Whether the mnemonic takes no operand.
pub fn is_unary(id: MnemonicId) -> bool {
    matches!(info_for(id).ty, T::UNone | T::RNone)
}

/// Number of bytes the instruction occupies in the object code.
pub fn instruction_size(id: MnemonicId) -> u16 {
    if is_unary(id) { 1 } else { 3 }
}

/// Whether the mnemonic must be written with an explicit `,mode`.
pub fn requires_addressing_mode(id: MnemonicId) -> bool {
    matches!(info_for(id).ty, T::AaaAll | T::RaaaAll | T::RaaaNoI)
}

/// Addressing mode implied when none is written, if any.
///
/// Only the two-mode family has a default (`i`).
pub fn default_addressing_mode(id: MnemonicId) -> Option<AddressingMode> {
    match info_for(id).ty {
        T::AIx => Some(AddressingMode::I),
        _ => None,
    }
}

/// Whether the formatter may omit the mode because it equals the implied default.
pub fn can_elide_addressing_mode(id: MnemonicId, mode: AddressingMode) -> bool {
    default_addressing_mode(id) == Some(mode)
}

/// Whether `mode` is legal for `id`.
pub fn is_valid_addressing_mode(id: MnemonicId, mode: AddressingMode) -> bool {
    match info_for(id).ty {
        T::UNone | T::RNone => false,
        T::AIx => matches!(mode, AddressingMode::I | AddressingMode::X),
        T::AaaAll | T::RaaaAll => true,
        T::RaaaNoI => mode != AddressingMode::I,
    }
}

/// Encoded opcode byte.
///
/// ## Parameters
/// - `id`: The instruction.
/// - `mode`: The addressing mode; must be `None` for unary instructions.
///
/// ## Returns
/// - `Some(opcode)` when the combination is encodable, `None` otherwise.
pub fn opcode_for(id: MnemonicId, mode: Option<AddressingMode>) -> Option<u8> {
    let info = info_for(id);
    match (info.ty, mode) {
        (T::UNone | T::RNone, None) => Some(info.opcode),
        (T::UNone | T::RNone, Some(_)) => None,
        (_, None) => None,
        (T::AIx, Some(AddressingMode::I)) => Some(info.opcode),
        (T::AIx, Some(AddressingMode::X)) => Some(info.opcode + 1),
        (T::AIx, Some(_)) => None,
        (_, Some(m)) if is_valid_addressing_mode(id, m) => Some(info.opcode + m.aaa_offset()),
        (_, Some(_)) => None,
    }
}
