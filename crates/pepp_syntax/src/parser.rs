//! Recursive-descent parser for Pep/10 assembly.
//!
//! Converts source text into a list of [`Line`]s, writing symbol declarations and references into a
//! [`SymbolTable`] node as it goes.
//!
//! ## Notes
//! - One statement is one line. A statement that fails records one diagnostic, the rest of its line is skipped, and
//!   parsing resumes on the next line.
//! - Grammar alternatives (instruction, directive, macro invocation) are tried under a [`Checkpoint`] and rolled back
//!   when they do not apply.
//!
//! ## Examples
//!
//! ```rust
//! use pepp_core::symbol::{DefinitionState, SymbolTable};
//! use pepp_syntax::intern::StringPool;
//! use pepp_syntax::parser;
//!
//! let mut symtab = SymbolTable::new();
//! let leaf = symtab.add_child(symtab.root());
//! let parsed = parser::parse("main: LDWA 0x0010,d\nRET\n", StringPool::shared(), &mut symtab, leaf);
//! assert_eq!(parsed.lines.len(), 2);
//! let main = symtab.get(leaf, "main").unwrap();
//! assert_eq!(symtab.entry(main).state(), DefinitionState::Single);
//! ```

use pepp_core::isa::directives::{self, DirectiveId, LEGAL_ALIGNMENTS};
use pepp_core::isa::{addressing, mnemonics};
use pepp_core::symbol::{NodeId, SymbolId, SymbolTable};

use crate::ast::{Annotation, Attribute, Line, LineKind, SectionFlags, Value};
use crate::buffer::{Checkpoint, TokenBuffer};
use crate::diagnostics::{DiagnosticTable, ParserError, SyntaxError};
use crate::intern::PoolHandle;
use crate::lexer::tokens::unescape;
use crate::lexer::{Lexer, PepLexer, Token, TokenKind, TokenMask};

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
