//! Backtracking token buffer.
//!
//! The buffer pulls tokens from a [`Lexer`] on demand and remembers every token matched since the last time no
//! [`Checkpoint`] was alive. A checkpoint records the current head; rolling it back rewinds the head so the parser can try
//! another grammar alternative without re-lexing.
//!
//! ## Notes
//! - [`TokenBuffer`] is a cheap handle (`Rc<RefCell<_>>`). A [`Checkpoint`] holds its own handle, so a parser can keep a
//!   checkpoint alive while it continues to call `match_*` on the buffer.
//! - History is discarded only when the number of live checkpoints drops to zero. Checkpoints may be released in any
//!   order.
//! - Rolling back to a head that a newer checkpoint has already passed is allowed; the newer checkpoint simply becomes
//!   stale.
//!
//! ## Examples
//! ```rust
//! use pepp_syntax::buffer::TokenBuffer;
//! use pepp_syntax::intern::StringPool;
//! use pepp_syntax::lexer::{PepLexer, TokenMask};
//!
//! let buffer = TokenBuffer::new(PepLexer::new("NOP\n", StringPool::shared()));
//! let cp = buffer.checkpoint();
//! assert!(buffer.match_mask(TokenMask::IDENTIFIER).is_some());
//! cp.rollback();
//! assert!(buffer.peek(TokenMask::IDENTIFIER).is_some());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::lexer::{Lexer, Token, TokenKind, TokenMask};
use crate::source::LocationInterval;

struct Inner<L> {
    lexer: L,
    /// Matched history followed by lookahead.
    tokens: Vec<Token>,
    /// Index of the first unmatched token.
    head: usize,
    live_checkpoints: usize,
}

impl<L: Lexer> Inner<L> {
    /// Make sure `tokens[head]` exists.
    fn fill(&mut self) {
        if self.head == self.tokens.len() {
            let token = self.lexer.next_token();
            self.tokens.push(token);
        }
    }

    fn peek_if(&mut self, accept: impl FnOnce(&Token) -> bool) -> Option<Token> {
        self.fill();
        let token = &self.tokens[self.head];
        accept(token).then(|| token.clone())
    }

    fn match_if(&mut self, accept: impl FnOnce(&Token) -> bool) -> Option<Token> {
        let token = self.peek_if(accept)?;
        // EoF is sticky: matching it never moves past the end of input.
        if token.kind != TokenKind::EoF {
            self.head += 1;
        }
        Some(token)
    }

    fn release_history(&mut self) {
        self.tokens.drain(..self.head);
        self.head = 0;
    }
}

/// Memoizing, rewindable view over a lexer.
pub struct TokenBuffer<L> {
    inner: Rc<RefCell<Inner<L>>>,
}

impl<L> Clone for TokenBuffer<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<L: Lexer> TokenBuffer<L> {
    pub fn new(lexer: L) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                lexer,
                tokens: Vec::new(),
                head: 0,
                live_checkpoints: 0,
            })),
        }
    }

    /// Next token if its kind is in `mask`; never advances.
    pub fn peek(&self, mask: TokenMask) -> Option<Token> {
        self.inner.borrow_mut().peek_if(|t| t.mask().intersects(mask))
    }

    /// Next token if it is the literal `text`; never advances.
    pub fn peek_literal(&self, text: &str) -> Option<Token> {
        self.inner.borrow_mut().peek_if(|t| is_literal(t, text))
    }

    /// Next token regardless of kind; never advances.
    pub fn peek_any(&self) -> Token {
        self.peek(TokenMask::ANY).expect("INVARIANT: every token kind is in TokenMask::ANY")
    }

    /// Like [`TokenBuffer::peek`], but consumes the token on success.
    pub fn match_mask(&self, mask: TokenMask) -> Option<Token> {
        self.inner.borrow_mut().match_if(|t| t.mask().intersects(mask))
    }

    /// Like [`TokenBuffer::peek_literal`], but consumes the token on success.
    pub fn match_literal(&self, text: &str) -> Option<Token> {
        self.inner.borrow_mut().match_if(|t| is_literal(t, text))
    }

    /// Whether unmatched tokens are buffered or the lexer has more input.
    pub fn input_remains(&self) -> bool {
        let inner = self.inner.borrow();
        let lookahead = inner.tokens[inner.head..]
            .iter()
            .any(|t| t.kind != TokenKind::EoF);
        lookahead || (inner.head == inner.tokens.len() && inner.lexer.input_remains())
    }

    /// Number of tokens held, matched history and lookahead together.
    pub fn count_buffered_tokens(&self) -> usize {
        self.inner.borrow().tokens.len()
    }

    /// Number of tokens matched since history was last released.
    pub fn count_matched_tokens(&self) -> usize {
        self.inner.borrow().head
    }

    /// Source interval covered by the matched history, or `None` when nothing has been matched.
    pub fn matched_interval(&self) -> Option<LocationInterval> {
        let inner = self.inner.borrow();
        let matched = &inner.tokens[..inner.head];
        let first = matched.first()?;
        let last = matched.last()?;
        Some(first.interval.merge(&last.interval))
    }

    /// Interval of the next token, for diagnostics about something that is missing.
    pub fn next_interval(&self) -> LocationInterval {
        self.peek_any().interval
    }

    /// Start a scoped backtracking point at the current head.
    pub fn checkpoint(&self) -> Checkpoint<L> {
        let mut inner = self.inner.borrow_mut();
        inner.live_checkpoints += 1;
        Checkpoint {
            buffer: self.clone(),
            head: inner.head,
        }
    }

    /// Discard the rest of the current line, newline included.
    ///
    /// Buffered lookahead is matched away token by token. If it runs out before a newline, the lexer skips the remaining
    /// raw text so nothing else on the line is tokenized. Stops without consuming at end of input.
    pub fn skip_line(&self) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        while let Some(token) = inner.tokens.get(inner.head) {
            match token.kind {
                TokenKind::EoF => return,
                TokenKind::Empty => {
                    inner.head += 1;
                    return;
                }
                _ => inner.head += 1,
            }
        }
        let skipped = inner.lexer.synchronize();
        tracing::trace!(at = %skipped, "skipped unlexed text");
    }

    /// Run `f` against the underlying lexer.
    pub fn with_lexer<R>(&self, f: impl FnOnce(&mut L) -> R) -> R {
        f(&mut self.inner.borrow_mut().lexer)
    }
}

fn is_literal(token: &Token, text: &str) -> bool {
    match token.kind {
        TokenKind::Literal(c) => text.chars().eq(std::iter::once(c)),
        _ => false,
    }
}

/// A scoped rewind point; see the module docs.
pub struct Checkpoint<L: Lexer> {
    buffer: TokenBuffer<L>,
    head: usize,
}

impl<L: Lexer> Checkpoint<L> {
    /// Rewind the buffer to where this checkpoint was taken.
    pub fn rollback(&self) {
        self.buffer.inner.borrow_mut().head = self.head;
    }
}

impl<L: Lexer> Drop for Checkpoint<L> {
    fn drop(&mut self) {
        let mut inner = self.buffer.inner.borrow_mut();
        inner.live_checkpoints -= 1;
        if inner.live_checkpoints == 0 {
            inner.release_history();
        }
    }
}
