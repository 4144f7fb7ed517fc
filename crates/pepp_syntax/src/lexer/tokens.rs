//! Token types for the Pep/10 lexer.
//!
//! Name-like payloads (identifiers, symbol declarations, dot commands, macro names, comments, string literals) are
//! interned; see [`crate::intern`].
//!
//! ## Notes
//! - Character and string literals keep their escapes verbatim so the formatter can reproduce them exactly. Use
//!   [`unescape`] to get the bytes they denote.
//! - [`TokenMask`] lets the token buffer test “any of these kinds” without matching on payloads.

use crate::intern::{Interned, StringPool};
use crate::source::LocationInterval;

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// How an integer literal was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerFormat {
    /// Written with a leading `-`.
    SignedDec,
    UnsignedDec,
    Hex,
}

/// Kind of token produced by the lexer, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// End of a line.
    Empty,
    /// End of input; repeated forever once reached.
    EoF,
    /// Text the lexer could not classify.
    Invalid,
    /// Punctuation. Only `,` exists in Pep/10 source.
    Literal(char),
    /// `name:`, without the colon.
    SymbolDeclaration(Interned),
    Identifier(Interned),
    /// `@name`, without the `@`.
    MacroInvocation(Interned),
    /// `.name`, without the dot.
    DotCommand(Interned),
    Integer { value: i64, format: IntegerFormat },
    /// `;text`, without the semicolon.
    InlineComment(Interned),
    /// Contents between the quotes, escapes verbatim.
    CharacterConstant(Interned),
    /// Contents between the quotes, escapes verbatim.
    StringConstant(Interned),
}

/// A token with its kind and source interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub interval: LocationInterval,
}

impl Token {
    pub fn new(kind: TokenKind, interval: LocationInterval) -> Self {
        Self { kind, interval }
    }

    /// The single mask bit this token's kind occupies.
    pub fn mask(&self) -> TokenMask {
        match self.kind {
            TokenKind::Empty => TokenMask::EMPTY,
            TokenKind::EoF => TokenMask::EOF,
            TokenKind::Invalid => TokenMask::INVALID,
            TokenKind::Literal(_) => TokenMask::LITERAL,
            TokenKind::SymbolDeclaration(_) => TokenMask::SYMBOL_DECLARATION,
            TokenKind::Identifier(_) => TokenMask::IDENTIFIER,
            TokenKind::MacroInvocation(_) => TokenMask::MACRO_INVOCATION,
            TokenKind::DotCommand(_) => TokenMask::DOT_COMMAND,
            TokenKind::Integer { .. } => TokenMask::INTEGER,
            TokenKind::InlineComment(_) => TokenMask::INLINE_COMMENT,
            TokenKind::CharacterConstant(_) => TokenMask::CHARACTER_CONSTANT,
            TokenKind::StringConstant(_) => TokenMask::STRING_CONSTANT,
        }
    }

    /// Source-like spelling of the payload, without sigils (`:`, `.`, `@`, `;`) or quotes.
    pub fn text(&self, pool: &StringPool) -> String {
        match &self.kind {
            TokenKind::Empty | TokenKind::EoF | TokenKind::Invalid => String::new(),
            TokenKind::Literal(c) => c.to_string(),
            TokenKind::SymbolDeclaration(id)
            | TokenKind::Identifier(id)
            | TokenKind::MacroInvocation(id)
            | TokenKind::DotCommand(id)
            | TokenKind::InlineComment(id)
            | TokenKind::CharacterConstant(id)
            | TokenKind::StringConstant(id) => pool.resolve(*id).to_string(),
            TokenKind::Integer { value, format } => format_integer(*value, *format),
        }
    }

    /// Spelling as it would appear in source, sigils and quotes included.
    pub fn source_text(&self, pool: &StringPool) -> String {
        let text = self.text(pool);
        match self.kind {
            TokenKind::SymbolDeclaration(_) => format!("{text}:"),
            TokenKind::MacroInvocation(_) => format!("@{text}"),
            TokenKind::DotCommand(_) => format!(".{text}"),
            TokenKind::InlineComment(_) => format!(";{text}"),
            TokenKind::CharacterConstant(_) => format!("'{text}'"),
            TokenKind::StringConstant(_) => format!("\"{text}\""),
            _ => text,
        }
    }

    /// Debug-style rendering used by `pepasm lex` and parser diagnostics, e.g. `Identifier(LDWA)`.
    pub fn repr(&self, pool: &StringPool) -> String {
        let name = match self.kind {
            TokenKind::Empty => return "Empty".to_string(),
            TokenKind::EoF => return "EoF".to_string(),
            TokenKind::Invalid => return "Invalid".to_string(),
            TokenKind::Literal(_) => "Literal",
            TokenKind::SymbolDeclaration(_) => "SymbolDeclaration",
            TokenKind::Identifier(_) => "Identifier",
            TokenKind::MacroInvocation(_) => "MacroInvocation",
            TokenKind::DotCommand(_) => "DotCommand",
            TokenKind::Integer { .. } => "Integer",
            TokenKind::InlineComment(_) => "InlineComment",
            TokenKind::CharacterConstant(_) => "CharacterConstant",
            TokenKind::StringConstant(_) => "StringConstant",
        };
        format!("{name}({})", self.text(pool))
    }
}

/// Spell an integer the way it was written.
pub fn format_integer(value: i64, format: IntegerFormat) -> String {
    match format {
        IntegerFormat::SignedDec | IntegerFormat::UnsignedDec => value.to_string(),
        IntegerFormat::Hex => format!("0x{value:04X}"),
    }
}

// ============================================================================
// TOKEN MASKS
// ============================================================================

/// Set of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenMask(u32);

impl TokenMask {
    pub const EMPTY: TokenMask = TokenMask(1 << 0);
    pub const EOF: TokenMask = TokenMask(1 << 1);
    pub const INVALID: TokenMask = TokenMask(1 << 2);
    pub const LITERAL: TokenMask = TokenMask(1 << 3);
    pub const SYMBOL_DECLARATION: TokenMask = TokenMask(1 << 4);
    pub const IDENTIFIER: TokenMask = TokenMask(1 << 5);
    pub const MACRO_INVOCATION: TokenMask = TokenMask(1 << 6);
    pub const DOT_COMMAND: TokenMask = TokenMask(1 << 7);
    pub const INTEGER: TokenMask = TokenMask(1 << 8);
    pub const INLINE_COMMENT: TokenMask = TokenMask(1 << 9);
    pub const CHARACTER_CONSTANT: TokenMask = TokenMask(1 << 10);
    pub const STRING_CONSTANT: TokenMask = TokenMask(1 << 11);

    /// Every kind.
    pub const ANY: TokenMask = TokenMask((1 << 12) - 1);
    /// Anything except a line or input terminator.
    pub const NOT_TERMINATOR: TokenMask = TokenMask(Self::ANY.0 & !(Self::EMPTY.0 | Self::EOF.0));

    pub const fn union(self, other: TokenMask) -> TokenMask {
        TokenMask(self.0 | other.0)
    }

    pub const fn intersects(self, other: TokenMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for TokenMask {
    type Output = TokenMask;

    fn bitor(self, rhs: TokenMask) -> TokenMask {
        self.union(rhs)
    }
}

// ============================================================================
// ESCAPES
// ============================================================================

/// Decode the escapes of a character or string literal body into bytes.
///
/// ## Returns
/// - `None` if the text contains an escape the lexer would not have accepted.
pub fn unescape(text: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let byte = match chars.next()? {
            'b' => 0x08,
            'f' => 0x0C,
            'n' => b'\n',
            'r' => b'\r',
            't' => b'\t',
            'v' => 0x0B,
            '0' => 0,
            '\\' => b'\\',
            '\'' => b'\'',
            '"' => b'"',
            'x' | 'X' => {
                let hi = chars.next()?.to_digit(16)?;
                let lo = chars.next()?.to_digit(16)?;
                (hi * 16 + lo) as u8
            }
            _ => return None,
        };
        out.push(byte);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_handles_every_escape() {
        assert_eq!(unescape(r"a\n"), Some(vec![b'a', b'\n']));
        assert_eq!(unescape(r"\x41\X7f"), Some(vec![0x41, 0x7F]));
        assert_eq!(unescape(r#"\'\"\\"#), Some(vec![b'\'', b'"', b'\\']));
        assert_eq!(unescape(r"\b\f\v\0\r\t"), Some(vec![0x08, 0x0C, 0x0B, 0, b'\r', b'\t']));
        assert_eq!(unescape(r"\q"), None);
        assert_eq!(unescape("é"), Some(vec![0xC3, 0xA9]));
    }

    #[test]
    fn test_masks_compose() {
        let m = TokenMask::IDENTIFIER | TokenMask::INTEGER;
        assert!(m.intersects(TokenMask::INTEGER));
        assert!(!m.intersects(TokenMask::EMPTY));
        assert!(!TokenMask::NOT_TERMINATOR.intersects(TokenMask::EOF));
        assert!(TokenMask::NOT_TERMINATOR.intersects(TokenMask::INVALID));
    }

    #[test]
    fn test_integer_spelling() {
        assert_eq!(format_integer(-5, IntegerFormat::SignedDec), "-5");
        assert_eq!(format_integer(255, IntegerFormat::Hex), "0x00FF");
    }
}
