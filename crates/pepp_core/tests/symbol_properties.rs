//! Property-based tests for the symbol table.
//!
//! These check the cross-leaf rules under arbitrary operation orders, which hand-written cases only sample.

use pepp_core::symbol::{Binding, DefinitionState, NodeId, SymbolTable, TraversalPolicy};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    MarkGlobal,
    Define,
}

fn leaves(st: &mut SymbolTable, n: usize) -> Vec<NodeId> {
    let root = st.root();
    (0..n).map(|_| st.add_child(root)).collect()
}

/// A random tree as a parent list: node `i + 1` hangs under one of the nodes `0..=i`.
fn tree(st: &mut SymbolTable, parents: &[prop::sample::Index]) -> Vec<NodeId> {
    let mut nodes = vec![st.root()];
    for (i, parent) in parents.iter().enumerate() {
        let parent = nodes[parent.index(i + 1)];
        nodes.push(st.add_child(parent));
    }
    nodes
}

/// Every leaf marks `x` global and defines it once, in a shuffled interleaving.
fn global_clash_schedule() -> impl Strategy<Value = (usize, Vec<(usize, Op)>)> {
    (2usize..6).prop_flat_map(|n| {
        let ops: Vec<(usize, Op)> = (0..n).flat_map(|i| [(i, Op::MarkGlobal), (i, Op::Define)]).collect();
        (Just(n), Just(ops).prop_shuffle())
    })
}

proptest! {
    /// Property: a name made global and defined in several leaves is ExternalMultiple everywhere, whatever the order.
    #[test]
    fn external_multiple_is_order_independent((n, ops) in global_clash_schedule()) {
        let mut st = SymbolTable::new();
        let leaves = leaves(&mut st, n);
        for (leaf, op) in ops {
            match op {
                Op::MarkGlobal => { st.mark_global(leaves[leaf], "x"); }
                Op::Define => { st.define(leaves[leaf], "x"); }
            }
        }
        for leaf in leaves {
            let id = st.get(leaf, "x").expect("every leaf touched x");
            prop_assert_eq!(st.entry(id).state(), DefinitionState::ExternalMultiple);
        }
    }

    /// Property: local definition counts saturate at Multiple.
    #[test]
    fn local_definitions_saturate(count in 0usize..6) {
        let mut st = SymbolTable::new();
        let root = st.root();
        let id = st.reference(root, "loop");
        for _ in 0..count {
            st.define(root, "loop");
        }
        let expected = match count {
            0 => DefinitionState::Undefined,
            1 => DefinitionState::Single,
            _ => DefinitionState::Multiple,
        };
        prop_assert_eq!(st.entry(id).state(), expected);
        prop_assert_eq!(st.entry(id).binding(), Binding::Local);
    }

    /// Property: every importer observes the exporter's single definition, whether it referenced before or after the
    /// name became global.
    #[test]
    fn exports_reach_every_importer(importers in 1usize..6, early in proptest::collection::vec(any::<bool>(), 6)) {
        let mut st = SymbolTable::new();
        let all = leaves(&mut st, importers + 1);
        let (exporter, users) = all.split_first().expect("at least two leaves");

        for (user, _) in users.iter().zip(&early).filter(|(_, e)| **e) {
            st.reference(*user, "charIn");
        }
        st.mark_global(*exporter, "charIn");
        for (user, _) in users.iter().zip(&early).filter(|(_, e)| !**e) {
            st.reference(*user, "charIn");
        }
        st.define(*exporter, "charIn");

        for user in users {
            let id = st.get(*user, "charIn").expect("referenced");
            prop_assert_eq!(st.entry(id).binding(), Binding::Imported);
            prop_assert_eq!(st.entry(id).state(), DefinitionState::Single);
        }
        prop_assert!(st.exists(*exporter, "charIn", TraversalPolicy::Siblings));
    }

    /// Property: reference never changes an existing entry.
    #[test]
    fn reference_is_stable(names in proptest::collection::vec("[a-z]{1,7}", 1..20)) {
        let mut st = SymbolTable::new();
        let root = st.root();
        let first: Vec<_> = names.iter().map(|n| st.reference(root, n)).collect();
        let second: Vec<_> = names.iter().map(|n| st.reference(root, n)).collect();
        prop_assert_eq!(first, second);
    }

    /// Property: a wider traversal policy never finds less than a narrower one.
    #[test]
    fn visibility_is_monotonic(
        parents in proptest::collection::vec(any::<prop::sample::Index>(), 0..12),
        placements in proptest::collection::vec(any::<prop::sample::Index>(), 0..4),
        query in any::<prop::sample::Index>(),
    ) {
        let mut st = SymbolTable::new();
        let nodes = tree(&mut st, &parents);
        for at in &placements {
            st.reference(nodes[at.index(nodes.len())], "x");
        }
        let node = nodes[query.index(nodes.len())];

        let children = st.exists(node, "x", TraversalPolicy::Children);
        let siblings = st.exists(node, "x", TraversalPolicy::Siblings);
        let whole = st.exists(node, "x", TraversalPolicy::WholeTree);
        prop_assert!(!children || siblings);
        prop_assert!(!siblings || whole);
        prop_assert_eq!(whole, !placements.is_empty());
    }
}
