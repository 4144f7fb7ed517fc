/// Argument parsing.
///
/// Every helper here consumes at most one argument token. Identifiers become symbol references in the parser's scope.
impl<'t> Parser<'t> {
    /// `argument := INTEGER | IDENTIFIER | CHARACTER | STRING`
    fn argument(&mut self) -> Option<Value> {
        let token = self.buffer.peek(ARGUMENT)?;
        let value = match &token.kind {
            TokenKind::Integer { value, format } => Value::Integer {
                value: *value,
                format: *format,
            },
            TokenKind::Identifier(_) => {
                let name = self.text(&token);
                Value::Symbolic(self.symtab.reference(self.scope, &name))
            }
            TokenKind::CharacterConstant(_) => {
                let text = self.text(&token);
                let bytes = unescape(&text).unwrap_or_default();
                Value::Character { text, bytes }
            }
            TokenKind::StringConstant(_) => {
                let text = self.text(&token);
                let bytes = unescape(&text).unwrap_or_default();
                if bytes.len() <= 2 {
                    Value::ShortString { text, bytes }
                } else {
                    Value::LongString { text, bytes }
                }
            }
            _ => return None,
        };
        self.buffer.match_mask(ARGUMENT);
        Some(value)
    }

    /// A numeric argument no wider than `max_bytes`.
    fn numeric_argument(&mut self, max_bytes: usize) -> ParseResult<Value> {
        let Some(argument) = self.argument() else {
            return Err(self.fail(ParserError::ArgumentMissing));
        };
        if !argument.is_numeric() {
            return Err(self.fail(ParserError::ArgumentExpectedNumeric));
        }
        if argument.required_bytes() > max_bytes {
            let error = if max_bytes == 1 {
                ParserError::ArgumentExceeded1Byte
            } else {
                ParserError::ArgumentExceeded2Bytes
            };
            return Err(self.fail(error));
        }
        Ok(argument)
    }

    /// A bare identifier, returned by name without touching the symbol table.
    fn identifier_argument(&mut self) -> ParseResult<String> {
        match self.buffer.match_mask(TokenMask::IDENTIFIER) {
            Some(token) => Ok(self.text(&token)),
            None => Err(self.fail(ParserError::ArgumentExpectedIdentifier)),
        }
    }

    /// Body of a string literal, escapes kept.
    fn string_argument(&mut self) -> Option<String> {
        let token = self.buffer.match_mask(TokenMask::STRING_CONSTANT)?;
        Some(self.text(&token))
    }
}
