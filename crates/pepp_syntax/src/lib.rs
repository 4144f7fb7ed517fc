//! Syntax frontend for Pep/10 assembly: source cursor, lexer, backtracking token buffer, line IR, and parser.
//!
//! This crate is reused by the assembler driver (`pepasm`) and by the CLI's `fmt`/`lex` tools.
//!
//! ## Notes
//! - This crate is intentionally “syntax-only”: it records names in a symbol table while parsing, but never assigns
//!   addresses or reports whole-program errors such as undefined symbols.
//! - Vocabulary identity (mnemonics, addressing modes, dot commands) comes from `pepp_core::isa` registries.
//!
//! ## Examples
//! ```rust
//! use pepp_core::symbol::SymbolTable;
//! use pepp_syntax::intern::StringPool;
//! use pepp_syntax::parser;
//!
//! let pool = StringPool::shared();
//! let mut symtab = SymbolTable::new();
//! let leaf = symtab.add_child(symtab.root());
//! let parsed = parser::parse("s: .EQUATE 10\n", pool, &mut symtab, leaf);
//! assert!(parsed.diagnostics.is_empty());
//! assert_eq!(parsed.lines.len(), 1);
//! ```
//!
//! ## See also
//! - `pepp_core::symbol` for the table the parser writes declarations and references into.

pub mod ast;
pub mod buffer;
pub mod diagnostics;
pub mod intern;
pub mod lexer;
pub mod parser;
pub mod source;
