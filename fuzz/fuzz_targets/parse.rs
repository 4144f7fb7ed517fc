#![no_main]

use libfuzzer_sys::fuzz_target;
use pepasm::lexer::pep::lex;
use pepasm::parser;
use pepasm::symbol::SymbolTable;
use pepasm::intern::StringPool;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Fuzz the lexer on its own, then the parser on top of it
        let _ = lex(s, StringPool::shared());
        let mut symbols = SymbolTable::new();
        let scope = symbols.add_child(symbols.root());
        let _ = parser::parse(s, StringPool::shared(), &mut symbols, scope);
    }
});
