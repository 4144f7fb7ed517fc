//! Parse stage: `source` → `lines` + `diagnostics`.

use pepp_syntax::parser;

use super::{Body, Globals, Pep10Target, Stage, names};
use crate::driver::Transform;

/// Parse the target's source against its scope in the shared symbol table.
pub struct Parse;

impl Transform<Globals, Stage, Body> for Parse {
    fn name(&self) -> &'static str {
        "parse"
    }

    fn stage(&self) -> Stage {
        Stage::Parse
    }

    fn result_stage(&self) -> Stage {
        Stage::IncludeMacros
    }

    #[tracing::instrument(skip_all, fields(kind = ?target.kind))]
    fn run(&self, globals: &mut Globals, target: &mut Pep10Target) -> bool {
        let Some(Body::Source(source)) = target.bodies.get(names::SOURCE) else {
            tracing::warn!("target has no source body");
            return false;
        };
        let parsed = parser::parse(source, globals.pool.clone(), &mut globals.symbols, target.scope);
        let ok = parsed.diagnostics.is_empty();
        target.bodies.insert(names::LINES.to_string(), Body::Lines(parsed.lines));
        target
            .bodies
            .insert(names::DIAGNOSTICS.to_string(), Body::Diagnostics(parsed.diagnostics));
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::pep10::{self, Features};

    #[test]
    fn test_parse_failure_keeps_start_stage() {
        let mut p = pep10::pipeline();
        pep10::add_user(&mut p, "LDWA\nRET\n", Features::default());
        assert!(!p.assemble());
        let target = &p.targets()[0];
        assert_eq!(target.stage, Stage::Start);
        assert_eq!(pep10::errors(target).len(), 1);
        assert_eq!(pep10::lines(target).len(), 1);
    }
}
