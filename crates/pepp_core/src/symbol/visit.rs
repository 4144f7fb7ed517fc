//! Scoped traversal over a symbol table tree.

use super::table::{NodeId, SymbolTable};
use super::value::SymbolId;

/// Which part of the tree a name search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalPolicy {
    /// The starting node and all of its descendants.
    Children,
    /// The starting node's parent and all of its descendants (the node itself when it is the root).
    Siblings,
    /// Every node reachable from the root.
    WholeTree,
}

impl SymbolTable {
    /// Every entry named `name` within the region `policy` selects, in depth-first order.
    pub fn select(&self, node: NodeId, name: &str, policy: TraversalPolicy) -> Vec<SymbolId> {
        let start = match policy {
            TraversalPolicy::Children => node,
            TraversalPolicy::Siblings => self.parent(node).unwrap_or(node),
            TraversalPolicy::WholeTree => self.root(),
        };

        let mut found = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if let Some(id) = self.get(current, name) {
                found.push(id);
            }
            // Push in reverse so children are visited in insertion order.
            stack.extend(self.children(current).iter().rev().copied());
        }
        found
    }

    /// Whether any entry named `name` exists in the region `policy` selects.
    pub fn exists(&self, node: NodeId, name: &str, policy: TraversalPolicy) -> bool {
        !self.select(node, name, policy).is_empty()
    }
}
