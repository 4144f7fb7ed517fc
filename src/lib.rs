#![forbid(unsafe_code)]
//! pepasm: an assembler for the Pep/10 virtual machine
//!
//! Assembly runs as a staged pipeline over one or two targets (an optional operating system, then the user program).
//! The lexer, parser and symbol table live in the `pepp_syntax` and `pepp_core` crates; this crate holds the pipeline
//! driver, macro registry, formatter and CLI.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents an assembler bug (logic error), use `.expect("INVARIANT: reason")`
//!   with a clear explanation.

pub mod cli;
pub mod diagnostics;
pub mod driver;
pub mod format;
pub mod macros;

pub use pepp_core::symbol;
pub use pepp_syntax::{ast, intern, lexer, parser};

pub use driver::pep10;
pub use format::{FormatConfig, check_formatted, format_diff, format_source, format_source_with_config};
