//! String interning for identifiers, dot commands, comments and string literals.
//!
//! Tokens carry an [`Interned`] handle instead of an owned `String`. The pool is shared by the lexer, every token it
//! produced, and the assembler driver, so it lives behind a [`PoolHandle`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Handle to a string stored in a [`StringPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interned(u32);

/// Shared, single-threaded handle to a pool.
pub type PoolHandle = Rc<RefCell<StringPool>>;

/// Append-only arena of unique strings.
#[derive(Debug, Default)]
pub struct StringPool {
    strings: Vec<String>,
    index: HashMap<String, Interned>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh pool behind a shareable handle.
    pub fn shared() -> PoolHandle {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Store `s` if it is new and return its handle. Equal strings always get the same handle.
    pub fn intern(&mut self, s: &str) -> Interned {
        if let Some(&id) = self.index.get(s) {
            return id;
        }
        let id = Interned(u32::try_from(self.strings.len()).expect("INVARIANT: string pool size fits in u32"));
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), id);
        id
    }

    /// Text for a handle issued by this pool.
    pub fn resolve(&self, id: Interned) -> &str {
        self.strings
            .get(id.0 as usize)
            .map(String::as_str)
            .expect("INVARIANT: Interned handle was issued by this pool")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
