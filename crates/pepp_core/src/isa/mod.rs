//! Pep/10 ISA vocabulary registries.
//!
//! This module is the “front door” for machine-level vocabulary: instruction mnemonics, addressing modes, assembler
//! dot commands, and the memory-mapped vectors the operating system exposes.
//!
//! The design goal is to avoid stringly-typed checks scattered across the parser and the pipeline. Callers work with
//! **stable IDs** (e.g. [`mnemonics::MnemonicId`], [`directives::DirectiveId`]) and look up spellings, opcodes, and
//! policy via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//! - Lookups by spelling are **case-insensitive**, matching how Pep/10 source is written (`LDWA`, `ldwa`, `.block`).
//!
//! ## Examples
//! ```rust
//! use pepp_core::isa::addressing::AddressingMode;
//! use pepp_core::isa::mnemonics::{self, MnemonicId};
//!
//! assert_eq!(mnemonics::from_str("ldba"), Some(MnemonicId::Ldba));
//! assert_eq!(mnemonics::opcode_for(MnemonicId::Ldba, Some(AddressingMode::D)), Some(0xD1));
//! ```

pub mod addressing;
pub mod directives;
pub mod mnemonics;
pub mod vectors;

pub use addressing::AddressingMode;
pub use directives::DirectiveId;
pub use mnemonics::MnemonicId;
