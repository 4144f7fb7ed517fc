//! Lexers for Pep/10 assembly.
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (`TokenKind`, `Token`, `TokenMask`, `IntegerFormat`) and escape decoding
//! - `pep` - The Pep/10 ordered-alternative scanner
//!
//! The [`Lexer`] trait is what the token buffer pulls from. Every lexer owns a [`SeekableData`] cursor, hands its
//! produced tokens to registered [`TokenListener`]s, and can resynchronize at the next line.

pub mod pep;
pub mod tokens;

pub use pep::PepLexer;
pub use tokens::{IntegerFormat, Token, TokenKind, TokenMask};

use crate::intern::PoolHandle;
use crate::source::{LocationInterval, SeekableData};

/// Observer of every token a lexer produces.
pub trait TokenListener {
    fn on_token(&mut self, token: &Token);
}

/// Listener that traces each token; handy with `RUST_LOG=pepp_syntax=trace`.
pub struct TracingListener {
    pool: PoolHandle,
}

impl TracingListener {
    pub fn new(pool: PoolHandle) -> Self {
        Self { pool }
    }
}

impl TokenListener for TracingListener {
    fn on_token(&mut self, token: &Token) {
        tracing::trace!(token = %token.repr(&self.pool.borrow()), at = %token.interval, "lexed");
    }
}

/// A source of tokens.
pub trait Lexer {
    /// Whether another call to [`Lexer::next_token`] can produce something other than `EoF`.
    fn input_remains(&self) -> bool;

    /// Produce the next token and notify listeners.
    fn next_token(&mut self) -> Token;

    fn data(&self) -> &SeekableData;

    fn data_mut(&mut self) -> &mut SeekableData;

    /// Pool that payload handles in produced tokens refer to.
    fn pool(&self) -> &PoolHandle;

    fn listeners_mut(&mut self) -> &mut Vec<Box<dyn TokenListener>>;

    fn add_listener(&mut self, listener: Box<dyn TokenListener>) {
        self.listeners_mut().push(listener);
    }

    /// Discard input up to and including the next newline, without producing tokens.
    ///
    /// Only safe once the caller has consumed every token already lexed from the current line; see
    /// [`TokenBuffer::skip_line`](crate::buffer::TokenBuffer::skip_line).
    ///
    /// ## Returns
    /// - The interval that was skipped.
    fn synchronize(&mut self) -> LocationInterval {
        skip_line(self.data_mut())
    }
}

/// Advance `data` past the next newline.
pub fn skip_line(data: &mut SeekableData) -> LocationInterval {
    let from = data.location();
    while let Some(c) = data.peek() {
        data.skip(c.len_utf8());
        if c == '\n' {
            data.newline();
            data.skip(0);
            break;
        }
    }
    LocationInterval::new(from, data.location())
}
