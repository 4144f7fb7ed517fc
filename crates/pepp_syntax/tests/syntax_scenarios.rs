//! End-to-end lexer and parser scenarios over realistic Pep/10 snippets.

use std::cell::RefCell;
use std::rc::Rc;

use pepp_core::symbol::{DefinitionState, SymbolTable};
use pepp_syntax::intern::StringPool;
use pepp_syntax::lexer::pep::lex;
use pepp_syntax::lexer::{IntegerFormat, Lexer, PepLexer, Token, TokenKind, TokenListener};
use pepp_syntax::parser;

fn token_dump(source: &str) -> String {
    let pool = StringPool::shared();
    let tokens = lex(source, pool.clone());
    let pool = pool.borrow();
    tokens
        .iter()
        .map(|t| format!("{} {}", t.interval, t.repr(&pool)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn equate_tokens_and_definition() {
    let pool = StringPool::shared();
    let tokens = lex("s: .EQUATE 10", pool.clone());
    assert_eq!(
        tokens[2].kind,
        TokenKind::Integer {
            value: 10,
            format: IntegerFormat::UnsignedDec
        }
    );

    let mut symtab = SymbolTable::new();
    let leaf = symtab.add_child(symtab.root());
    let parsed = parser::parse("s: .EQUATE 10", pool, &mut symtab, leaf);
    assert!(parsed.diagnostics.is_empty());
    let s = symtab.get(leaf, "s").expect("declared");
    assert_eq!(symtab.entry(s).state(), DefinitionState::Single);
}

#[test]
fn token_stream_snapshot() {
    insta::assert_snapshot!(token_dump("x: .WORD -1 ;neg\n  LDBA 'a',i\n"), @r"
    1:1 SymbolDeclaration(x)
    1:4 DotCommand(WORD)
    1:10 Integer(-1)
    1:13 InlineComment(neg)
    1:17 Empty
    2:3 Identifier(LDBA)
    2:8 CharacterConstant(a)
    2:11 Literal(,)
    2:12 Identifier(i)
    2:13 Empty
    3:1 EoF
    ");
}

struct Collect(Rc<RefCell<Vec<Token>>>);

impl TokenListener for Collect {
    fn on_token(&mut self, token: &Token) {
        self.0.borrow_mut().push(token.clone());
    }
}

#[test]
fn listeners_see_every_token() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut lexer = PepLexer::new("NOP\nRET", StringPool::shared());
    lexer.add_listener(Box::new(Collect(Rc::clone(&seen))));
    while lexer.next_token().kind != TokenKind::EoF {}
    assert_eq!(seen.borrow().len(), 5);
}

#[test]
fn every_failing_line_reports_once() {
    let source = "\
main: LDWA 1,q
      STWA x
      FOO
x:    .BLOCK 2
      RET
";
    let mut symtab = SymbolTable::new();
    let leaf = symtab.add_child(symtab.root());
    let parsed = parser::parse(source, StringPool::shared(), &mut symtab, leaf);
    let rows: Vec<_> = parsed.diagnostics.iter().map(|d| d.interval.lower().row).collect();
    assert_eq!(rows, [0, 1, 2]);
    assert_eq!(parsed.lines.len(), 2);
}
