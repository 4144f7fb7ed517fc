//! Staged build driver.
//!
//! A [`Pipeline`] owns shared `Globals` and a list of [`Target`]s, each paired with the ordered [`Transform`]s that
//! build it. Every target carries a stage tag drawn from a totally ordered [`Stage`] type; a transform that succeeds
//! moves its target's tag forward to the transform's result stage, and one that fails leaves the tag where it was.
//!
//! ## Module Structure
//!
//! - `pep10` - Stage order, bodies, globals and transforms for the Pep/10 assembler
//!
//! ## Notes
//! - Targets run one after another, in the order they were added, each to completion. Later targets therefore see
//!   everything earlier targets wrote into the globals (exported symbols, registered macros).
//! - A target stops at its first failing transform; the remaining targets still run.
//!
//! ## Examples
//! ```rust
//! use pepasm::driver::pep10::{self, Features, Stage};
//!
//! let mut pipeline = pep10::pipeline();
//! pep10::add_user(&mut pipeline, "main: LDWA 1,i\nRET\n", Features::default());
//! assert!(pipeline.assemble());
//! assert_eq!(pipeline.targets()[0].stage, Stage::End);
//! ```

pub mod pep10;

use std::collections::BTreeMap;
use std::fmt::Debug;

use pepp_core::symbol::NodeId;

/// A totally ordered set of build stages.
pub trait Stage: Copy + Ord + Debug {
    /// Stage every target starts in.
    const FIRST: Self;
    /// Stage of a fully built target.
    const LAST: Self;
}

/// Which program unit a target builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    User,
    Os,
}

/// One unit being built.
#[derive(Debug)]
pub struct Target<S, B> {
    pub kind: TargetKind,
    /// Node of the shared symbol table this unit declares its names in.
    pub scope: NodeId,
    pub stage: S,
    /// Named representations of the unit; transforms add to and rewrite these.
    pub bodies: BTreeMap<String, B>,
}

impl<S: Stage, B> Target<S, B> {
    pub fn new(kind: TargetKind, scope: NodeId) -> Self {
        Self {
            kind,
            scope,
            stage: S::FIRST,
            bodies: BTreeMap::new(),
        }
    }

    pub fn with_body(mut self, name: &str, body: B) -> Self {
        self.bodies.insert(name.to_string(), body);
        self
    }
}

/// One build step.
pub trait Transform<G, S, B> {
    fn name(&self) -> &'static str;

    /// Stage this transform performs.
    fn stage(&self) -> S;

    /// Stage the target is in after this transform succeeds.
    fn result_stage(&self) -> S;

    /// Run the step.
    ///
    /// ## Returns
    /// - `false` to fail the build for this target. Diagnostics are recorded on the bodies and symbols touched.
    fn run(&self, globals: &mut G, target: &mut Target<S, B>) -> bool;
}

type Transforms<G, S, B> = Vec<Box<dyn Transform<G, S, B>>>;

/// Drives targets through their transforms.
pub struct Pipeline<G, S, B> {
    pub globals: G,
    targets: Vec<Target<S, B>>,
    transforms: Vec<Transforms<G, S, B>>,
}

impl<G, S: Stage, B> Pipeline<G, S, B> {
    pub fn new(globals: G) -> Self {
        Self {
            globals,
            targets: Vec::new(),
            transforms: Vec::new(),
        }
    }

    /// Add a target with the transforms that build it, in execution order.
    pub fn add_target(&mut self, target: Target<S, B>, transforms: Transforms<G, S, B>) {
        self.targets.push(target);
        self.transforms.push(transforms);
    }

    pub fn targets(&self) -> &[Target<S, B>] {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut [Target<S, B>] {
        &mut self.targets
    }

    pub fn target(&self, kind: TargetKind) -> Option<&Target<S, B>> {
        self.targets.iter().find(|t| t.kind == kind)
    }

    /// Run every transform.
    pub fn assemble(&mut self) -> bool {
        self.assemble_to(S::LAST)
    }

    /// Run the transforms that perform stages up to and including `until`.
    ///
    /// Transforms whose result a target has already reached are skipped, so calling this repeatedly with later stages
    /// resumes where the previous call stopped.
    ///
    /// ## Returns
    /// - `true` if no transform failed.
    #[tracing::instrument(skip_all, fields(until = ?until, targets = self.targets.len()))]
    pub fn assemble_to(&mut self, until: S) -> bool {
        let mut ok = true;
        for (target, transforms) in self.targets.iter_mut().zip(&self.transforms) {
            for transform in transforms {
                if transform.stage() > until || target.stage >= transform.result_stage() {
                    continue;
                }
                if transform.run(&mut self.globals, target) {
                    tracing::debug!(
                        transform = transform.name(),
                        kind = ?target.kind,
                        from = ?target.stage,
                        to = ?transform.result_stage(),
                        "stage complete"
                    );
                    target.stage = transform.result_stage();
                } else {
                    tracing::warn!(transform = transform.name(), kind = ?target.kind, "transform failed");
                    ok = false;
                    break;
                }
            }
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pepp_core::symbol::SymbolTable;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Toy {
        A,
        B,
        C,
        Done,
    }

    impl Stage for Toy {
        const FIRST: Self = Toy::A;
        const LAST: Self = Toy::Done;
    }

    struct Step {
        stage: Toy,
        result: Toy,
        succeed: bool,
    }

    impl Transform<Vec<&'static str>, Toy, u32> for Step {
        fn name(&self) -> &'static str {
            "step"
        }

        fn stage(&self) -> Toy {
            self.stage
        }

        fn result_stage(&self) -> Toy {
            self.result
        }

        fn run(&self, log: &mut Vec<&'static str>, target: &mut Target<Toy, u32>) -> bool {
            log.push(if target.kind == TargetKind::Os { "os" } else { "user" });
            *target.bodies.entry("runs".into()).or_default() += 1;
            self.succeed
        }
    }

    fn steps(fail_at: Option<Toy>) -> Transforms<Vec<&'static str>, Toy, u32> {
        [(Toy::A, Toy::B), (Toy::B, Toy::C), (Toy::C, Toy::Done)]
            .into_iter()
            .map(|(stage, result)| {
                Box::new(Step {
                    stage,
                    result,
                    succeed: fail_at != Some(stage),
                }) as Box<dyn Transform<_, _, _>>
            })
            .collect()
    }

    fn pipeline(os_fail: Option<Toy>, user_fail: Option<Toy>) -> Pipeline<Vec<&'static str>, Toy, u32> {
        let mut symbols = SymbolTable::new();
        let os = symbols.add_child(symbols.root());
        let user = symbols.add_child(symbols.root());
        let mut p = Pipeline::new(Vec::new());
        p.add_target(Target::new(TargetKind::Os, os), steps(os_fail));
        p.add_target(Target::new(TargetKind::User, user), steps(user_fail));
        p
    }

    #[test]
    fn test_success_reaches_last_stage() {
        let mut p = pipeline(None, None);
        assert!(p.assemble());
        assert!(p.targets().iter().all(|t| t.stage == Toy::Done));
        assert_eq!(p.globals, ["os", "os", "os", "user", "user", "user"]);
    }

    #[test]
    fn test_failure_freezes_stage_and_other_targets_continue() {
        let mut p = pipeline(Some(Toy::B), None);
        assert!(!p.assemble());
        let os = p.target(TargetKind::Os).expect("os target");
        assert_eq!(os.stage, Toy::B);
        assert_eq!(os.bodies["runs"], 2);
        assert_eq!(p.target(TargetKind::User).expect("user target").stage, Toy::Done);
    }

    #[test]
    fn test_assemble_to_is_resumable() {
        let mut p = pipeline(None, None);
        assert!(p.assemble_to(Toy::A));
        assert!(p.targets().iter().all(|t| t.stage == Toy::B));
        assert!(p.assemble_to(Toy::B));
        assert!(p.targets().iter().all(|t| t.stage == Toy::C));
        assert_eq!(p.globals.len(), 4);
        assert!(p.assemble());
        assert_eq!(p.globals.len(), 6);
    }
}
