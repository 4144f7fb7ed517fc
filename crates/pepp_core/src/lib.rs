//! Provide the shared, dependency-free core of the Pep/10 assembler: ISA vocabulary and the symbol table.
//!
//! This crate is intentionally small and dependency-light. It contains the pieces that both the syntax frontend
//! (lexer/parser) and the assembler driver need to agree on:
//! - the canonical ISA vocabulary (mnemonics, addressing modes, dot commands, memory-mapped vectors), and
//! - the hierarchical symbol table that tracks definition state and cross-unit visibility.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no logging, and no parser-specific types.
//! - Contract violations (e.g. handing a [`symbol::SymbolId`] to a table that did not create it) panic with an
//!   `INVARIANT:` message; malformed user input never panics here.

pub mod isa;
pub mod symbol;
