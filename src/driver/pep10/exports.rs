//! Global symbols and system-call macros.
//!
//! Only an operating system publishes symbols. A user program that writes `.EXPORT` or `.SCALL` is rejected later by
//! WholeProgramSanity, so here its annotations are simply skipped.

use pepp_syntax::ast::{Annotation, LineKind};

use super::{Body, Features, Globals, Pep10Target, Stage};
use crate::driver::Transform;
use crate::macros::MacroDeclaration;

/// Mark `.EXPORT`/`.SCALL` names global and register a macro per system call.
pub struct RegisterExports {
    pub features: Features,
}

impl Transform<Globals, Stage, Body> for RegisterExports {
    fn name(&self) -> &'static str {
        "register-exports"
    }

    fn stage(&self) -> Stage {
        Stage::RegisterExports
    }

    fn result_stage(&self) -> Stage {
        Stage::AssignAddresses
    }

    #[tracing::instrument(skip_all, fields(kind = ?target.kind, is_os = self.features.is_os))]
    fn run(&self, globals: &mut Globals, target: &mut Pep10Target) -> bool {
        if !self.features.is_os {
            return true;
        }
        let scope = target.scope;
        let mut ok = true;
        for line in super::lines_mut(target) {
            let (which, symbol) = match &line.kind {
                LineKind::Annotate { which, symbol } => (*which, *symbol),
                _ => continue,
            };
            if !matches!(which, Annotation::Export | Annotation::Scall) {
                continue;
            }
            let name = globals.symbols.entry(symbol).name().to_string();
            globals.symbols.mark_global(scope, &name);
            tracing::debug!(%name, "exported");

            if which == Annotation::Scall {
                if let Err(e) = globals.macros.register(MacroDeclaration::system_call(&name)) {
                    line.add_error(e.to_string());
                    ok = false;
                }
            }
        }
        ok
    }
}
