//! CLI module for the Pep/10 assembler
//!
//! This module provides the command-line interface for the assembler.
//!
//! ## Commands
//!
//! - `asm <file>` - Assemble a program, optionally against an operating system
//! - `fmt <file>` - Format Pep/10 source files
//! - `lex <file>` - Print the token stream (debug)
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::driver::pep10::Stage;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create an error with a custom exit code.
    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self::new(message, ExitCode(code))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Assembler for the Pep/10 teaching machine
#[derive(Parser, Debug)]
#[command(name = "pepasm")]
#[command(version = VERSION)]
#[command(about = "Assembler for the Pep/10 teaching machine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// What `asm` prints once assembly succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Addresses, object code and formatted source
    #[default]
    Listing,
    /// The object file as JSON
    Json,
    /// Object code per addressed line
    Hex,
    /// Loader format: hex bytes terminated by `zz`
    Pepo,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble a user program
    Asm {
        /// Program to assemble
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Operating system assembled first; its exports and system calls are visible to the program
        #[arg(long, value_name = "OS_FILE")]
        os: Option<PathBuf>,
        /// Stop after this stage (e.g. `assign-addresses`)
        #[arg(long, value_name = "STAGE", value_parser = parse_stage)]
        stage: Option<Stage>,
        /// Encode undefined symbols as zero instead of failing
        #[arg(long)]
        ignore_undefined: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Listing)]
        format: OutputFormat,
        /// Write output here instead of stdout
        #[arg(short = 'o', long = "output", value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Format Pep/10 source files
    Fmt {
        /// File to format
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
        /// Show diff of formatting changes
        #[arg(long)]
        diff: bool,
    },

    /// Tokenize only (debug)
    Lex {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn parse_stage(name: &str) -> Result<Stage, String> {
    Stage::from_name(name).ok_or_else(|| {
        let names: Vec<_> = Stage::ALL.iter().map(|s| s.as_str()).collect();
        format!("unknown stage '{name}', expected one of: {}", names.join(", "))
    })
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Asm {
            file,
            os,
            stage,
            ignore_undefined,
            format,
            output,
        } => commands::assemble_file(&commands::AsmOptions {
            file,
            os,
            stage: stage.unwrap_or(Stage::End),
            ignore_undefined,
            format,
            output,
        }),
        Command::Fmt { file, check, diff } => commands::format_file(&file, check, diff),
        Command::Lex { file } => commands::lex_file(&file),
    }
}

// ============================================================================
// Tests
// ============================================================================
