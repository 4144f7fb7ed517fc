//! Macro registry and argument substitution.
//!
//! A macro is a named body of assembly text with a fixed number of positional parameters. Invocations (`@NAME a, b`)
//! are expanded by the IncludeMacros stage; this module only stores declarations and performs the textual
//! substitution of `$1..$N`.
//!
//! ## Notes
//! - Names are looked up case-insensitively and stored under their uppercase spelling.
//! - Substitution is purely textual: `$12` means parameter twelve, never parameter one followed by `2`.

use std::collections::BTreeMap;

use thiserror::Error;

/// Machine a macro body is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    Pep10,
}

/// A registered macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDeclaration {
    pub name: String,
    pub arg_count: usize,
    pub body: String,
    pub architecture: Architecture,
}

impl MacroDeclaration {
    pub fn new(name: impl Into<String>, arg_count: usize, body: impl Into<String>) -> Self {
        Self {
            name: name.into().to_uppercase(),
            arg_count,
            body: body.into(),
            architecture: Architecture::Pep10,
        }
    }

    /// The system-call macro registered for each `.SCALL name` in the operating system.
    ///
    /// `@name arg, mode` loads the call's entry address and traps with the caller's operand.
    pub fn system_call(name: &str) -> Self {
        Self::new(name, 2, format!("LDWA {name},i\nSCALL $1,$2\n"))
    }
}

/// Errors raised while registering or expanding macros.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacroError {
    #[error("Macro @{0} does not exist.")]
    NoSuchMacro(String),
    #[error("Macro @{name} expects {expected} argument(s), got {found}.")]
    WrongArity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Macro @{0} is already defined.")]
    Duplicate(String),
    #[error("Macro @{0} invokes itself.")]
    Loop(String),
}

/// Name → declaration map shared by every target of a build.
#[derive(Debug, Clone, Default)]
pub struct MacroRegistry {
    macros: BTreeMap<String, MacroDeclaration>,
}

impl MacroRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a macro.
    ///
    /// ## Errors
    /// - [`MacroError::Duplicate`] if a macro of the same (case-folded) name exists; the registry is unchanged.
    pub fn register(&mut self, declaration: MacroDeclaration) -> Result<(), MacroError> {
        let key = declaration.name.to_uppercase();
        if self.macros.contains_key(&key) {
            return Err(MacroError::Duplicate(declaration.name));
        }
        tracing::debug!(name = %key, args = declaration.arg_count, "registered macro");
        self.macros.insert(key, declaration);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&MacroDeclaration> {
        self.macros.get(&name.to_uppercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Body of `name` with its parameters replaced by `args`.
    ///
    /// ## Errors
    /// - [`MacroError::NoSuchMacro`] when `name` is not registered.
    /// - [`MacroError::WrongArity`] when `args.len()` differs from the declared count.
    pub fn expand(&self, name: &str, args: &[String]) -> Result<String, MacroError> {
        let declaration = self
            .find(name)
            .ok_or_else(|| MacroError::NoSuchMacro(name.to_string()))?;
        if declaration.arg_count != args.len() {
            return Err(MacroError::WrongArity {
                name: declaration.name.clone(),
                expected: declaration.arg_count,
                found: args.len(),
            });
        }
        Ok(substitute(&declaration.body, args))
    }
}

/// Replace `$N` (1-based) in `body` with `args[N - 1]`. References past the end are left untouched.
pub fn substitute(body: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(at) = rest.find('$') {
        out.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let replacement = after[..digits]
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| args.get(i));
        match replacement {
            Some(arg) => {
                out.push_str(arg);
                rest = &after[digits..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_substitute_positional() {
        assert_eq!(substitute("LDWA $1,$2", &args(&["x", "d"])), "LDWA x,d");
        assert_eq!(substitute("$2$1", &args(&["a", "b"])), "ba");
    }

    #[test]
    fn test_substitute_leaves_unknown_references() {
        assert_eq!(substitute("cost: $ $3 $0", &args(&["a"])), "cost: $ $3 $0");
    }

    #[test]
    fn test_substitute_multi_digit() {
        let many: Vec<String> = (1..=12).map(|n| format!("a{n}")).collect();
        assert_eq!(substitute("$12 $1", &many), "a12 a1");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut registry = MacroRegistry::new();
        registry
            .register(MacroDeclaration::new("deci", 2, "SCALL $1,$2"))
            .expect("fresh name");
        assert!(registry.contains("DECI"));
        assert_eq!(registry.expand("Deci", &args(&["n", "d"])), Ok("SCALL n,d".to_string()));
    }

    #[test]
    fn test_expand_errors() {
        let mut registry = MacroRegistry::new();
        registry
            .register(MacroDeclaration::new("ONE", 1, "NOP"))
            .expect("fresh name");
        assert_eq!(registry.expand("TWO", &[]), Err(MacroError::NoSuchMacro("TWO".into())));
        assert_eq!(
            registry.expand("one", &[]),
            Err(MacroError::WrongArity {
                name: "ONE".into(),
                expected: 1,
                found: 0
            })
        );
        assert_eq!(
            registry.register(MacroDeclaration::new("one", 0, "")),
            Err(MacroError::Duplicate("ONE".into()))
        );
    }

    #[test]
    fn test_system_call_body() {
        let decl = MacroDeclaration::system_call("DECI");
        assert_eq!(decl.arg_count, 2);
        assert_eq!(substitute(&decl.body, &args(&["num", "d"])), "LDWA DECI,i\nSCALL num,d\n");
    }
}
