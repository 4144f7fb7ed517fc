//! Define the Pep/10 addressing modes.
//!
//! Each mode has a canonical lowercase spelling (`i`, `d`, `n`, `s`, `sf`, `x`, `sx`, `sfx`) and an opcode offset used
//! when an instruction encodes all eight modes in its low three bits.
//!
//! ## Notes
//! - Two-mode (`A_ix`) instructions only encode `i` and `x`, in the low bit; see
//!   [`crate::isa::mnemonics::opcode_for`].

/// Stable identifier for every addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressingMode {
    /// Immediate
    I,
    /// Direct
    D,
    /// Indirect
    N,
    /// Stack-relative
    S,
    /// Stack-relative deferred
    Sf,
    /// Indexed
    X,
    /// Stack-indexed
    Sx,
    /// Stack-deferred indexed
    Sfx,
}

/// Registry of all addressing modes, in encoding order.
pub const ADDRESSING_MODES: &[AddressingMode] = &[
    AddressingMode::I,
    AddressingMode::D,
    AddressingMode::N,
    AddressingMode::S,
    AddressingMode::Sf,
    AddressingMode::X,
    AddressingMode::Sx,
    AddressingMode::Sfx,
];

impl AddressingMode {
    /// Canonical (lowercase) spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            AddressingMode::I => "i",
            AddressingMode::D => "d",
            AddressingMode::N => "n",
            AddressingMode::S => "s",
            AddressingMode::Sf => "sf",
            AddressingMode::X => "x",
            AddressingMode::Sx => "sx",
            AddressingMode::Sfx => "sfx",
        }
    }

    /// Offset added to an instruction's base opcode for eight-mode (`AAA`/`RAAA`) instructions.
    pub fn aaa_offset(self) -> u8 {
        match self {
            AddressingMode::I => 0,
            AddressingMode::D => 1,
            AddressingMode::N => 2,
            AddressingMode::S => 3,
            AddressingMode::Sf => 4,
            AddressingMode::X => 5,
            AddressingMode::Sx => 6,
            AddressingMode::Sfx => 7,
        }
    }
}

impl std::fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup by spelling.
///
/// ## Parameters
/// - `s`: Candidate spelling, e.g. `"sfx"` or `"SFX"`.
///
/// ## Returns
/// - `Some(AddressingMode)` on a (case-insensitive) match, `None` otherwise.
pub fn from_str(s: &str) -> Option<AddressingMode> {
    ADDRESSING_MODES.iter().copied().find(|m| m.as_str().eq_ignore_ascii_case(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(from_str("SFX"), Some(AddressingMode::Sfx));
        assert_eq!(from_str("sf"), Some(AddressingMode::Sf));
        assert_eq!(from_str("j"), None);
    }

    #[test]
    fn test_offsets_follow_encoding_order() {
        for (idx, mode) in ADDRESSING_MODES.iter().enumerate() {
            assert_eq!(mode.aaa_offset() as usize, idx);
        }
    }
}
