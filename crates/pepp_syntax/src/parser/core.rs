/// Longest accepted symbol declaration, in characters.
pub const MAX_SYMBOL_LENGTH: usize = 7;

/// Tokens that can start an argument.
const ARGUMENT: TokenMask = TokenMask::INTEGER
    .union(TokenMask::IDENTIFIER)
    .union(TokenMask::CHARACTER_CONSTANT)
    .union(TokenMask::STRING_CONSTANT);

type ParseResult<T> = Result<T, SyntaxError>;

/// Parser state
pub struct Parser<'t> {
    buffer: TokenBuffer<PepLexer>,
    pool: PoolHandle,
    symtab: &'t mut SymbolTable,
    /// Node that declarations and references are recorded in.
    scope: NodeId,
    diagnostics: DiagnosticTable,
}

/// Core grammar: statements and the alternatives a statement can hold.
impl<'t> Parser<'t> {
    pub fn new(source: &str, pool: PoolHandle, symtab: &'t mut SymbolTable, scope: NodeId) -> Self {
        Self::with_lexer(PepLexer::new(source, pool.clone()), pool, symtab, scope)
    }

    /// Parse from an already configured lexer, e.g. one with listeners attached.
    pub fn with_lexer(lexer: PepLexer, pool: PoolHandle, symtab: &'t mut SymbolTable, scope: NodeId) -> Self {
        Self {
            buffer: TokenBuffer::new(lexer),
            pool,
            symtab,
            scope,
            diagnostics: DiagnosticTable::new(),
        }
    }

    /// Parse every statement.
    pub fn parse(mut self) -> Parsed {
        let mut lines = Vec::new();
        while self.buffer.input_remains() {
            match self.statement() {
                Ok(line) => lines.push(line),
                Err(e) => {
                    tracing::debug!(at = %e.interval, error = %e.error, "statement rejected");
                    self.diagnostics.add_message(e.interval, e.error.to_string());
                    self.synchronize();
                }
            }
        }
        Parsed {
            lines,
            diagnostics: self.diagnostics,
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// `statement := EMPTY | COMMENT EMPTY | [SYMBOL] line EMPTY`
    fn statement(&mut self) -> ParseResult<Line> {
        let _cp = self.buffer.checkpoint();

        if let Some(token) = self.buffer.match_mask(TokenMask::EMPTY) {
            return Ok(Line::new(LineKind::Empty).with_source(token.interval));
        }

        let line = if let Some(token) = self.buffer.match_mask(TokenMask::INLINE_COMMENT) {
            Line::new(LineKind::Comment {
                text: self.text(&token),
            })
        } else {
            let symbol = self.symbol_declaration()?;
            match self.line(symbol)? {
                Some(line) => line,
                None => {
                    let next = self.buffer.peek_any();
                    let repr = next.repr(&self.pool.borrow());
                    return Err(self.fail_at(ParserError::TokenInvalid(repr), next.interval));
                }
            }
        };

        let source = self.buffer.matched_interval();
        if self.buffer.match_mask(TokenMask::EMPTY).is_none() && self.buffer.input_remains() {
            let next = self.buffer.next_interval();
            return Err(self.fail_at(ParserError::TokenMissingNewline, next));
        }
        Ok(match source {
            Some(source) => line.with_source(source),
            None => line,
        })
    }

    fn symbol_declaration(&mut self) -> ParseResult<Option<SymbolId>> {
        let Some(token) = self.buffer.match_mask(TokenMask::SYMBOL_DECLARATION) else {
            return Ok(None);
        };
        let name = self.text(&token);
        if name.chars().count() > MAX_SYMBOL_LENGTH {
            return Err(self.fail(ParserError::SymbolDeclarationTooLong));
        }
        Ok(Some(self.symtab.define(self.scope, &name)))
    }

    /// `line := (instruction | directive | macro) [COMMENT]`
    fn line(&mut self, symbol: Option<SymbolId>) -> ParseResult<Option<Line>> {
        let mut line = if let Some(line) = self.instruction()? {
            line
        } else if let Some(line) = self.directive(symbol)? {
            line
        } else if let Some(line) = self.macro_invocation()? {
            line
        } else {
            return Ok(None);
        };

        if let Some(token) = self.buffer.match_mask(TokenMask::INLINE_COMMENT) {
            line.insert(Attribute::Comment(self.text(&token)));
        }
        if let Some(symbol) = symbol.filter(|_| line.symbol().is_none()) {
            line.insert(Attribute::SymbolDeclaration(symbol));
        }
        Ok(Some(line))
    }

    // ========================================================================
    // Instructions
    // ========================================================================

    /// `instruction := MNEMONIC | MNEMONIC argument [, MODE]`
    fn instruction(&mut self) -> ParseResult<Option<Line>> {
        let cp = self.buffer.checkpoint();
        let Some(token) = self.buffer.match_mask(TokenMask::IDENTIFIER) else {
            cp.rollback();
            return Ok(None);
        };
        let name = self.text(&token);
        let Some(mnemonic) = mnemonics::from_str(&name) else {
            return Err(self.fail(ParserError::MnemonicInvalid(name)));
        };
        if mnemonics::is_unary(mnemonic) {
            return Ok(Some(Line::new(LineKind::Monadic { mnemonic })));
        }

        let Some(argument) = self.argument() else {
            return Err(self.fail(ParserError::ArgumentMissing));
        };
        if argument.required_bytes() > 2 {
            return Err(self.fail(ParserError::ArgumentExceeded2Bytes));
        }

        let mode = if self.buffer.match_literal(",").is_some() {
            let Some(token) = self.buffer.match_mask(TokenMask::IDENTIFIER) else {
                return Err(self.fail(ParserError::AddressingModeMissing));
            };
            let text = self.text(&token);
            let Some(mode) = addressing::from_str(&text) else {
                return Err(self.fail(ParserError::AddressingModeInvalid));
            };
            if !mnemonics::is_valid_addressing_mode(mnemonic, mode) {
                return Err(self.fail(ParserError::AddressingModeInvalidForMnemonic(text.to_uppercase())));
            }
            mode
        } else if mnemonics::requires_addressing_mode(mnemonic) {
            return Err(self.fail(ParserError::AddressingModeRequired));
        } else {
            match mnemonics::default_addressing_mode(mnemonic) {
                Some(mode) => mode,
                None => return Err(self.fail(ParserError::AddressingModeRequired)),
            }
        };

        Ok(Some(Line::new(LineKind::Dyadic {
            mnemonic,
            mode,
            argument,
        })))
    }

    // ========================================================================
    // Directives
    // ========================================================================

    /// `directive := DOT arguments`, with the argument shape depending on the dot command.
    fn directive(&mut self, symbol: Option<SymbolId>) -> ParseResult<Option<Line>> {
        let cp = self.buffer.checkpoint();
        let Some(token) = self.buffer.match_mask(TokenMask::DOT_COMMAND) else {
            cp.rollback();
            return Ok(None);
        };
        let name = self.text(&token).to_uppercase();
        let Some(directive) = directives::from_str(&name) else {
            return Err(self.fail(ParserError::DotInvalid(name)));
        };

        let kind = match directive {
            DirectiveId::Align => {
                let argument = self.argument();
                let legal = argument
                    .as_ref()
                    .and_then(Value::literal_value)
                    .and_then(|v| u16::try_from(v).ok())
                    .is_some_and(|v| LEGAL_ALIGNMENTS.contains(&v));
                match argument {
                    Some(argument) if legal => LineKind::Align { argument },
                    _ => return Err(self.fail(ParserError::ArgumentExpectedPowerOfTwo)),
                }
            }
            DirectiveId::Ascii => match self.argument() {
                Some(argument) if argument.is_string() => LineKind::Ascii { argument },
                Some(_) => return Err(self.fail(ParserError::ArgumentExpectedString)),
                None => return Err(self.fail(ParserError::ArgumentMissing)),
            },
            DirectiveId::Block => LineKind::Block {
                argument: self.numeric_argument(2)?,
            },
            DirectiveId::Byte => LineKind::Byte {
                argument: self.numeric_argument(1)?,
            },
            DirectiveId::Word => LineKind::Word {
                argument: self.numeric_argument(2)?,
            },
            DirectiveId::Equate => {
                let argument = self.numeric_argument(2)?;
                if symbol.is_none() {
                    return Err(self.fail(ParserError::SymbolDeclarationRequired));
                }
                LineKind::Equate { argument }
            }
            DirectiveId::Export
            | DirectiveId::Import
            | DirectiveId::Input
            | DirectiveId::Output
            | DirectiveId::Scall => {
                let name = self.identifier_argument()?;
                self.forbid_symbol(symbol)?;
                LineKind::Annotate {
                    which: annotation_for(directive),
                    symbol: self.symtab.reference(self.scope, &name),
                }
            }
            DirectiveId::Org => {
                let argument = match self.argument() {
                    Some(argument) if argument.is_hex() => argument,
                    _ => return Err(self.fail(ParserError::ArgumentExpectedHex)),
                };
                if argument.required_bytes() > 2 {
                    return Err(self.fail(ParserError::ArgumentExceeded2Bytes));
                }
                self.forbid_symbol(symbol)?;
                LineKind::Org { argument }
            }
            DirectiveId::Section => self.section(symbol)?,
        };
        Ok(Some(Line::new(kind)))
    }

    /// `.SECTION "name", "flags"`
    fn section(&mut self, symbol: Option<SymbolId>) -> ParseResult<LineKind> {
        let Some(name) = self.string_argument() else {
            return Err(self.fail(ParserError::SectionStringName));
        };
        if self.buffer.match_literal(",").is_none() {
            return Err(self.fail(ParserError::SectionTwoArgs));
        }
        let Some(flags) = self.string_argument() else {
            return Err(self.fail(ParserError::SectionStringFlags));
        };
        self.forbid_symbol(symbol)?;
        let Some(flags) = SectionFlags::parse(&flags) else {
            return Err(self.fail(ParserError::SectionStringFlags));
        };
        Ok(LineKind::Section { name, flags })
    }

    // ========================================================================
    // Macro invocations
    // ========================================================================

    /// `macro := @NAME [arg {, arg}]`; arguments are kept as source text for substitution.
    fn macro_invocation(&mut self) -> ParseResult<Option<Line>> {
        let cp = self.buffer.checkpoint();
        let Some(token) = self.buffer.match_mask(TokenMask::MACRO_INVOCATION) else {
            cp.rollback();
            return Ok(None);
        };
        let name = self.text(&token);
        let mut args = Vec::new();
        if let Some(first) = self.buffer.match_mask(ARGUMENT) {
            args.push(self.source_text(&first));
            while self.buffer.match_literal(",").is_some() {
                let Some(next) = self.buffer.match_mask(ARGUMENT) else {
                    return Err(self.fail(ParserError::ArgumentMissing));
                };
                args.push(self.source_text(&next));
            }
        }
        Ok(Some(Line::new(LineKind::MacroInvocation {
            name,
            args,
            expansion: None,
        })))
    }
}

fn annotation_for(directive: DirectiveId) -> Annotation {
    match directive {
        DirectiveId::Export => Annotation::Export,
        DirectiveId::Import => Annotation::Import,
        DirectiveId::Input => Annotation::Input,
        DirectiveId::Output => Annotation::Output,
        _ => Annotation::Scall,
    }
}
