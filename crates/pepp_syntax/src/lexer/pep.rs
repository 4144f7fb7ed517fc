//! The Pep/10 lexer.
//!
//! At each position the scanner tries a fixed list of alternatives in priority order and commits to the first that
//! matches. Patterns are anchored regexes tried with [`SeekableData::match_view`].
//!
//! ## Notes
//! - Nothing here fails: text that fits no alternative becomes a one-character `Invalid` token and scanning continues.
//! - Symbol declarations are tried before identifiers so `name:` is one token.
//! - Hex literals are tried before decimals so `0x10` is not `0` followed by `x10`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::tokens::{IntegerFormat, Token, TokenKind};
use super::{Lexer, TokenListener};
use crate::intern::PoolHandle;
use crate::source::{LocationInterval, SeekableData};

// ============================================================================
// PATTERNS
// ============================================================================

fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{pattern})")).expect("INVARIANT: lexer patterns are valid regexes")
}

static DECIMAL: Lazy<Regex> = Lazy::new(|| anchored("[0-9]+"));
static SYMBOL: Lazy<Regex> = Lazy::new(|| anchored("[A-Za-z_][A-Za-z0-9_]*:"));
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| anchored("[A-Za-z_][A-Za-z0-9_]*"));
static MACRO: Lazy<Regex> = Lazy::new(|| anchored("@[A-Za-z_][A-Za-z0-9_]*"));
static DIRECTIVE: Lazy<Regex> = Lazy::new(|| anchored(r"\.[A-Za-z_][A-Za-z0-9_]*"));
static HEX: Lazy<Regex> = Lazy::new(|| anchored("0[xX][0-9A-Fa-f]+"));
static BAD_HEX: Lazy<Regex> = Lazy::new(|| anchored("0[xX]"));
static COMMENT: Lazy<Regex> = Lazy::new(|| anchored(";[^\n]*"));
static CHARACTER: Lazy<Regex> = Lazy::new(|| anchored(r#"'(?:[^'\\\n]|\\[bfnrtv0\\'"]|\\[xX][0-9A-Fa-f]{2})'"#));
static STRING: Lazy<Regex> = Lazy::new(|| anchored(r#""(?:[^"\\\n]|\\[bfnrtv0\\'"]|\\[xX][0-9A-Fa-f]{2})*""#));

/// Parse digits, saturating instead of failing so oversized literals surface as size errors in the parser.
fn parse_saturating(digits: &str, radix: u32, negative: bool) -> i64 {
    match i64::from_str_radix(digits, radix) {
        Ok(v) if negative => -v,
        Ok(v) => v,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}

// ============================================================================
// LEXER
// ============================================================================

/// Lexer for Pep/10 assembly source.
pub struct PepLexer {
    data: SeekableData,
    pool: PoolHandle,
    listeners: Vec<Box<dyn TokenListener>>,
    /// Whether the current line has produced a token since its start.
    line_open: bool,
}

impl PepLexer {
    pub fn new(source: impl Into<String>, pool: PoolHandle) -> Self {
        Self {
            data: SeekableData::new(source),
            pool,
            listeners: Vec::new(),
            line_open: false,
        }
    }

    fn intern(&self, text: &str) -> crate::intern::Interned {
        self.pool.borrow_mut().intern(text)
    }

    /// Commit `len` bytes as one token.
    fn take(&mut self, len: usize, kind: impl FnOnce(&Self, &str) -> TokenKind) -> Token {
        self.data.advance(len);
        let kind = kind(self, self.data.select());
        Token::new(kind, self.data.interval())
    }

    fn scan(&mut self) -> Token {
        loop {
            let Some(next) = self.data.peek() else {
                let at = self.data.location();
                let kind = if self.line_open { TokenKind::Empty } else { TokenKind::EoF };
                return Token::new(kind, LocationInterval::new(at, at));
            };

            match next {
                '\n' => {
                    self.data.advance(1);
                    let interval = self.data.interval();
                    self.data.newline();
                    return Token::new(TokenKind::Empty, interval);
                }
                '\r' => self.data.skip(1),
                c if c.is_whitespace() => self.data.skip(c.len_utf8()),
                ',' => return self.take(1, |_, _| TokenKind::Literal(',')),
                '+' | '-' => {
                    let negative = next == '-';
                    let start = self.data.location();
                    // Compose the sign and digits as one token, then parse only the digits.
                    self.data.advance(1);
                    let Some(len) = self.data.match_view(&DECIMAL).map(str::len) else {
                        return Token::new(TokenKind::Invalid, self.data.interval());
                    };
                    self.data.advance(len);
                    let digits = &self.data.select()[1..];
                    let value = parse_saturating(digits, 10, negative);
                    let format = if negative { IntegerFormat::SignedDec } else { IntegerFormat::UnsignedDec };
                    return Token::new(
                        TokenKind::Integer { value, format },
                        LocationInterval::new(start, self.data.location()),
                    );
                }
                _ => return self.scan_word(next),
            }
        }
    }

    fn scan_word(&mut self, next: char) -> Token {
        let d = &self.data;
        if let Some(len) = d.match_view(&SYMBOL).map(str::len) {
            return self.take(len, |lx, text| TokenKind::SymbolDeclaration(lx.intern(&text[..text.len() - 1])));
        }
        if let Some(len) = d.match_view(&IDENTIFIER).map(str::len) {
            return self.take(len, |lx, text| TokenKind::Identifier(lx.intern(text)));
        }
        if let Some(len) = d.match_view(&MACRO).map(str::len) {
            return self.take(len, |lx, text| TokenKind::MacroInvocation(lx.intern(&text[1..])));
        }
        if let Some(len) = d.match_view(&DIRECTIVE).map(str::len) {
            return self.take(len, |lx, text| TokenKind::DotCommand(lx.intern(&text[1..])));
        }
        if next == '.' {
            return self.take(1, |_, _| TokenKind::Invalid);
        }
        if let Some(len) = d.match_view(&HEX).map(str::len) {
            return self.take(len, |_, text| TokenKind::Integer {
                value: parse_saturating(&text[2..], 16, false),
                format: IntegerFormat::Hex,
            });
        }
        if let Some(len) = d.match_view(&BAD_HEX).map(str::len) {
            return self.take(len, |_, _| TokenKind::Invalid);
        }
        if let Some(len) = d.match_view(&DECIMAL).map(str::len) {
            return self.take(len, |_, text| TokenKind::Integer {
                value: parse_saturating(text, 10, false),
                format: IntegerFormat::UnsignedDec,
            });
        }
        if let Some(len) = d.match_view(&COMMENT).map(str::len) {
            return self.take(len, |lx, text| TokenKind::InlineComment(lx.intern(&text[1..])));
        }
        if next == '\'' {
            return match d.match_view(&CHARACTER).map(str::len) {
                Some(len) => self.take(len, |lx, text| {
                    TokenKind::CharacterConstant(lx.intern(&text[1..text.len() - 1]))
                }),
                None => self.take(1, |_, _| TokenKind::Invalid),
            };
        }
        if next == '"' {
            return match d.match_view(&STRING).map(str::len) {
                Some(len) => self.take(len, |lx, text| TokenKind::StringConstant(lx.intern(&text[1..text.len() - 1]))),
                None => self.take(1, |_, _| TokenKind::Invalid),
            };
        }
        self.take(next.len_utf8(), |_, _| TokenKind::Invalid)
    }
}

impl Lexer for PepLexer {
    fn input_remains(&self) -> bool {
        self.data.input_remains() || self.line_open
    }

    fn next_token(&mut self) -> Token {
        let token = self.scan();
        self.line_open = !matches!(token.kind, TokenKind::Empty | TokenKind::EoF);
        for listener in &mut self.listeners {
            listener.on_token(&token);
        }
        self.data.skip(0);
        token
    }

    fn data(&self) -> &SeekableData {
        &self.data
    }

    fn synchronize(&mut self) -> LocationInterval {
        self.line_open = false;
        super::skip_line(&mut self.data)
    }

    fn data_mut(&mut self) -> &mut SeekableData {
        &mut self.data
    }

    fn pool(&self) -> &PoolHandle {
        &self.pool
    }

    fn listeners_mut(&mut self) -> &mut Vec<Box<dyn TokenListener>> {
        &mut self.listeners
    }
}

/// Lex a whole source into tokens, ending with the first `EoF`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str, pool: PoolHandle) -> Vec<Token> {
    let mut lexer = PepLexer::new(source, pool);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.kind == TokenKind::EoF;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}
