/// Lines and diagnostics produced by one parse.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub lines: Vec<Line>,
    pub diagnostics: DiagnosticTable,
}

/// Parse Pep/10 source into [`Line`]s.
///
/// This is the main public entrypoint for parsing.
///
/// ## Parameters
/// - `source`: Assembly text.
/// - `pool`: Interning pool shared with the rest of the build.
/// - `symtab`: Table receiving declarations (`define`) and references (`reference`).
/// - `scope`: Node of `symtab` the source belongs to.
///
/// ## Returns
/// - Every line that parsed, plus one diagnostic per line that did not.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn parse(source: &str, pool: PoolHandle, symtab: &mut SymbolTable, scope: NodeId) -> Parsed {
    let parsed = Parser::new(source, pool, symtab, scope).parse();
    tracing::debug!(
        lines = parsed.lines.len(),
        errors = parsed.diagnostics.len(),
        "parsed"
    );
    parsed
}

/// Like [`parse`], tracing every token the lexer produces.
pub fn parse_traced(source: &str, pool: PoolHandle, symtab: &mut SymbolTable, scope: NodeId) -> Parsed {
    let mut lexer = PepLexer::new(source, pool.clone());
    lexer.add_listener(Box::new(crate::lexer::TracingListener::new(pool.clone())));
    Parser::with_lexer(lexer, pool, symtab, scope).parse()
}
