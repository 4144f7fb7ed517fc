//! Macro stages.
//!
//! IncludeMacros parses each invocation's substituted body and stores it on the invocation line, recursively.
//! FlattenMacros then splices those bodies into the line list between a pair of bracketing comments:
//!
//! ```text
//! ;@DECI num,d
//!          LDWA    DECI,i
//!          SCALL   num,d
//! ;End @DECI
//! ```

use pepp_core::symbol::NodeId;
use pepp_syntax::ast::{Attribute, Line, LineKind, Value};
use pepp_syntax::lexer::IntegerFormat;
use pepp_syntax::parser;

use super::{Body, Globals, Pep10Target, Stage, names};
use crate::driver::Transform;
use crate::macros::MacroError;

// ============================================================================
// INCLUDE
// ============================================================================

/// Expand every macro invocation in place.
pub struct IncludeMacros;

impl Transform<Globals, Stage, Body> for IncludeMacros {
    fn name(&self) -> &'static str {
        "include-macros"
    }

    fn stage(&self) -> Stage {
        Stage::IncludeMacros
    }

    fn result_stage(&self) -> Stage {
        Stage::FlattenMacros
    }

    #[tracing::instrument(skip_all, fields(kind = ?target.kind))]
    fn run(&self, globals: &mut Globals, target: &mut Pep10Target) -> bool {
        let Some(Body::Lines(lines)) = target.bodies.get_mut(names::LINES) else {
            return false;
        };
        let mut stack = Vec::new();
        let mut ok = true;
        for line in lines.iter_mut() {
            ok &= include(globals, target.scope, line, &mut stack);
        }
        ok
    }
}

/// Expand one line if it is an invocation.
///
/// `stack` holds the (uppercase) names of the invocations currently being expanded.
fn include(globals: &mut Globals, scope: NodeId, line: &mut Line, stack: &mut Vec<String>) -> bool {
    let (name, args) = match &line.kind {
        LineKind::MacroInvocation { name, args, .. } => (name.clone(), args.clone()),
        _ => return true,
    };

    let key = name.to_uppercase();
    if stack.contains(&key) {
        line.add_error(MacroError::Loop(name).to_string());
        return false;
    }
    let text = match globals.macros.expand(&name, &args) {
        Ok(text) => text,
        Err(e) => {
            line.add_error(e.to_string());
            return false;
        }
    };

    let parsed = parser::parse(&text, globals.pool.clone(), &mut globals.symbols, scope);
    let mut ok = parsed.diagnostics.is_empty();
    for d in parsed.diagnostics.iter() {
        line.add_error(format!("In @{name}: {}", d.message));
    }

    let mut body = parsed.lines;
    // Drop the blank line a trailing newline in the body produces.
    while body.last().is_some_and(|l| l.kind == LineKind::Empty) {
        body.pop();
    }

    stack.push(key);
    for inner in body.iter_mut() {
        ok &= include(globals, scope, inner, stack);
    }
    stack.pop();

    if let LineKind::MacroInvocation { expansion, .. } = &mut line.kind {
        *expansion = Some(body);
    }
    ok
}

// ============================================================================
// FLATTEN
// ============================================================================

/// Replace every expanded invocation with its body.
pub struct FlattenMacros;

impl Transform<Globals, Stage, Body> for FlattenMacros {
    fn name(&self) -> &'static str {
        "flatten-macros"
    }

    fn stage(&self) -> Stage {
        Stage::FlattenMacros
    }

    fn result_stage(&self) -> Stage {
        Stage::GroupNodes
    }

    #[tracing::instrument(skip_all, fields(kind = ?target.kind))]
    fn run(&self, _globals: &mut Globals, target: &mut Pep10Target) -> bool {
        let Some(Body::Lines(lines)) = target.bodies.remove(names::LINES) else {
            return false;
        };
        let mut flat = Vec::with_capacity(lines.len());
        flatten(lines, &mut flat);
        target.bodies.insert(names::LINES.to_string(), Body::Lines(flat));
        true
    }
}

fn flatten(lines: Vec<Line>, out: &mut Vec<Line>) {
    for mut line in lines {
        let LineKind::MacroInvocation { name, args, expansion } = &mut line.kind else {
            out.push(line);
            continue;
        };
        let Some(body) = expansion.take() else {
            out.push(line);
            continue;
        };
        let header = if args.is_empty() {
            format!("@{name}")
        } else {
            format!("@{name} {}", args.join(","))
        };
        let footer = format!("End @{name}");

        let mut open = Line::new(LineKind::Comment { text: header });
        open.source = line.source;
        out.push(open);

        let start = out.len();
        flatten(body, out);
        if let Some(symbol) = line.symbol() {
            let first = out[start..].iter_mut().find(|l| l.kind.is_addressable());
            match first {
                Some(first) if first.symbol().is_none() => first.insert(Attribute::SymbolDeclaration(symbol)),
                _ => {
                    let mut anchor = Line::new(LineKind::Block {
                        argument: Value::Integer {
                            value: 0,
                            format: IntegerFormat::UnsignedDec,
                        },
                    });
                    anchor.insert(Attribute::SymbolDeclaration(symbol));
                    out.insert(start, anchor);
                }
            }
        }

        let mut close = Line::new(LineKind::Comment { text: footer });
        close.source = line.source;
        out.push(close);
        for spliced in &mut out[start..] {
            spliced.source = line.source;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::pep10::{self, Features};
    use crate::macros::MacroDeclaration;

    fn run_to_flatten(source: &str, macros: &[MacroDeclaration]) -> (pep10::Pep10Pipeline, bool) {
        let mut p = pep10::pipeline();
        for m in macros {
            p.globals.macros.register(m.clone()).expect("unique macro names");
        }
        pep10::add_user(&mut p, source, Features::default());
        let ok = p.assemble_to(Stage::FlattenMacros);
        (p, ok)
    }

    fn kinds(p: &pep10::Pep10Pipeline) -> Vec<String> {
        pep10::lines(&p.targets()[0])
            .iter()
            .map(|l| match &l.kind {
                LineKind::Comment { text } => format!(";{text}"),
                LineKind::Monadic { mnemonic } => format!("{mnemonic:?}"),
                LineKind::Dyadic { mnemonic, .. } => format!("{mnemonic:?}"),
                other => format!("{other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_expansion_is_bracketed() {
        let (p, ok) = run_to_flatten("@TWICE\n", &[MacroDeclaration::new("TWICE", 0, "NOP\nNOP\n")]);
        assert!(ok);
        assert_eq!(kinds(&p), [";@TWICE", "Nop", "Nop", ";End @TWICE"]);
    }

    #[test]
    fn test_nested_macros_flatten_in_order() {
        let macros = [
            MacroDeclaration::new("OUTER", 1, "@INNER $1\nRET\n"),
            MacroDeclaration::new("INNER", 1, "LDWA $1,i\n"),
        ];
        let (p, ok) = run_to_flatten("@OUTER 5\n", &macros);
        assert!(ok);
        assert_eq!(
            kinds(&p),
            [";@OUTER 5", ";@INNER 5", "Ldwa", ";End @INNER", "Ret", ";End @OUTER"]
        );
    }

    #[test]
    fn test_symbol_moves_to_first_addressable_line() {
        let (p, ok) = run_to_flatten("here: @ONE\n", &[MacroDeclaration::new("ONE", 0, ";c\nNOP\n")]);
        assert!(ok);
        let lines = pep10::lines(&p.targets()[0]);
        let nop = lines
            .iter()
            .find(|l| matches!(l.kind, LineKind::Monadic { .. }))
            .expect("expanded NOP");
        assert!(nop.symbol().is_some());
    }

    #[test]
    fn test_symbol_gets_anchor_when_taken() {
        let (p, ok) = run_to_flatten("here: @ONE\n", &[MacroDeclaration::new("ONE", 0, "x: NOP\n")]);
        assert!(ok);
        let lines = pep10::lines(&p.targets()[0]);
        assert!(matches!(lines[1].kind, LineKind::Block { .. }));
        assert!(lines[1].symbol().is_some());
        assert!(lines[2].symbol().is_some());
    }

    #[test]
    fn test_macro_errors_land_on_invocation() {
        let macros = [
            MacroDeclaration::new("SELF", 0, "@SELF\n"),
            MacroDeclaration::new("BAD", 0, "LDWA\n"),
        ];
        let (p, ok) = run_to_flatten("@SELF\n@BAD\n@MISSING\n@BAD 1\n", &macros);
        assert!(!ok);
        let target = &p.targets()[0];
        assert_eq!(target.stage, Stage::IncludeMacros);
        let messages: Vec<_> = pep10::errors(target).into_iter().map(|e| e.message).collect();
        assert_eq!(
            messages,
            [
                "Macro @SELF invokes itself.",
                "In @BAD: Missing argument.",
                "Macro @MISSING does not exist.",
                "Macro @BAD expects 0 argument(s), got 1.",
            ]
        );
    }
}
