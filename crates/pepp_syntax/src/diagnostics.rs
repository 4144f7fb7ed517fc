//! Parser errors and the table they are collected in.
//!
//! A parse never stops at the first error: each failing statement records one entry in a [`DiagnosticTable`] keyed by
//! the source interval the parser had consumed, and parsing resumes on the next line.

use thiserror::Error;

use crate::source::LocationInterval;

/// Everything the Pep/10 parser can reject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error("Unexpected token {0}.")]
    TokenInvalid(String),
    #[error("Expected a newline.")]
    TokenMissingNewline,
    #[error("Invalid mnemonic \"{0}\".")]
    MnemonicInvalid(String),
    #[error("Symbol declarations must be 7 characters or fewer.")]
    SymbolDeclarationTooLong,
    #[error("This directive requires a symbol declaration.")]
    SymbolDeclarationRequired,
    #[error("This directive does not allow a symbol declaration.")]
    SymbolDeclarationForbidden,
    #[error("Missing argument.")]
    ArgumentMissing,
    #[error("Argument must fit in 1 byte.")]
    ArgumentExceeded1Byte,
    #[error("Argument must fit in 2 bytes.")]
    ArgumentExceeded2Bytes,
    #[error("Expected a numeric argument.")]
    ArgumentExpectedNumeric,
    #[error("Expected a hexadecimal argument.")]
    ArgumentExpectedHex,
    #[error("Expected an identifier argument.")]
    ArgumentExpectedIdentifier,
    #[error("Expected a string argument.")]
    ArgumentExpectedString,
    #[error("Argument must be 1, 2, 4, or 8.")]
    ArgumentExpectedPowerOfTwo,
    #[error("Missing addressing mode after \",\".")]
    AddressingModeMissing,
    #[error("Invalid addressing mode.")]
    AddressingModeInvalid,
    #[error("Addressing mode \"{0}\" is not valid for this mnemonic.")]
    AddressingModeInvalidForMnemonic(String),
    #[error("This mnemonic requires an addressing mode.")]
    AddressingModeRequired,
    #[error("Invalid dot command \".{0}\".")]
    DotInvalid(String),
    #[error(".SECTION expects a string name.")]
    SectionStringName,
    #[error(".SECTION expects two arguments.")]
    SectionTwoArgs,
    #[error(".SECTION expects a string of flags.")]
    SectionStringFlags,
}

/// A parser error pinned to the source it was raised over.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{interval}: {error}")]
pub struct SyntaxError {
    pub error: ParserError,
    pub interval: LocationInterval,
}

/// One recorded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub interval: LocationInterval,
    pub message: String,
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticTable {
    entries: Vec<Diagnostic>,
}

impl DiagnosticTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, interval: LocationInterval, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            interval,
            message: message.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<SyntaxError> for Diagnostic {
    fn from(e: SyntaxError) -> Self {
        Diagnostic {
            interval: e.interval,
            message: e.error.to_string(),
        }
    }
}
