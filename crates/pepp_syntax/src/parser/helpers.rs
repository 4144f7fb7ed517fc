/// Token-stream helpers and error recovery.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Spelling tokens back out of the interning pool (`text`, `source_text`)
/// - Building located errors (`fail`, `fail_at`)
/// - Line-level error recovery (`synchronize`)
impl<'t> Parser<'t> {
    /// Payload text of a token, without sigils or quotes.
    fn text(&self, token: &Token) -> String {
        token.text(&self.pool.borrow())
    }

    /// Token text as written in source, sigils and quotes included.
    fn source_text(&self, token: &Token) -> String {
        token.source_text(&self.pool.borrow())
    }

    /// An error covering everything the current statement has matched so far.
    ///
    /// Falls back to the next token when nothing has been matched.
    fn fail(&self, error: ParserError) -> SyntaxError {
        let interval = self
            .buffer
            .matched_interval()
            .unwrap_or_else(|| self.buffer.next_interval());
        SyntaxError { error, interval }
    }

    fn fail_at(&self, error: ParserError, interval: crate::source::LocationInterval) -> SyntaxError {
        SyntaxError { error, interval }
    }

    /// Reject a symbol declaration on a directive that cannot carry one.
    fn forbid_symbol(&self, symbol: Option<SymbolId>) -> ParseResult<()> {
        match symbol {
            Some(_) => Err(self.fail(ParserError::SymbolDeclarationForbidden)),
            None => Ok(()),
        }
    }

    /// Skip to the start of the next line.
    ///
    /// Tokens already lexed are consumed first; the rest of the line is skipped by the lexer unlexed. Runs under its own
    /// checkpoint so the skipped tokens are released when it returns.
    fn synchronize(&mut self) {
        let _cp: Checkpoint<PepLexer> = self.buffer.checkpoint();
        self.buffer.skip_line();
    }
}
