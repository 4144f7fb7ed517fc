//! Hierarchical symbol table.
//!
//! A table is a tree of nodes stored in an arena. Each node owns a name → entry map; entries are stored in a flat
//! vector so a [`SymbolId`] stays valid for the life of the tree. Inner nodes and leaves are the same type: in
//! practice the linker keeps one leaf per translation unit under a shared root.
//!
//! ## Notes
//! - [`SymbolTable::reference`], [`SymbolTable::define`], [`SymbolTable::mark_global`] and
//!   [`SymbolTable::import`] are the only operations that change an entry's [`Binding`] or [`DefinitionState`].
//! - Ids are bound to the tree that issued them. Handing a foreign [`SymbolId`] or [`NodeId`] to a table panics.
//!
//! ## Examples
//! ```rust
//! use pepp_core::symbol::{Binding, DefinitionState, SymbolTable};
//!
//! let mut st = SymbolTable::new();
//! let os = st.add_child(st.root());
//! let user = st.add_child(st.root());
//!
//! st.mark_global(os, "charIn");
//! st.define(os, "charIn");
//! let r = st.reference(user, "charIn");
//! assert_eq!(st.entry(r).binding(), Binding::Imported);
//! assert_eq!(st.entry(r).state(), DefinitionState::Single);
//! ```

use std::collections::BTreeMap;

use super::value::{SymbolId, SymbolValue, TableId};

/// How many definitions an entry has seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefinitionState {
    Undefined,
    Single,
    Multiple,
    /// Defined in more than one translation unit.
    ExternalMultiple,
}

impl DefinitionState {
    /// State after one more definition.
    fn advance(self) -> Self {
        match self {
            DefinitionState::Undefined => DefinitionState::Single,
            DefinitionState::Single | DefinitionState::Multiple => DefinitionState::Multiple,
            DefinitionState::ExternalMultiple => DefinitionState::ExternalMultiple,
        }
    }
}

/// Visibility of an entry across nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Local,
    Global,
    Imported,
}

/// Handle to a node in one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    table: TableId,
    index: u32,
}

/// A named entry.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    name: String,
    node: NodeId,
    state: DefinitionState,
    binding: Binding,
    value: SymbolValue,
}

impl SymbolEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node the entry lives in.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn state(&self) -> DefinitionState {
        self.state
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn value(&self) -> SymbolValue {
        self.value
    }
}

#[derive(Debug, Default)]
struct Node {
    parent: Option<u32>,
    children: Vec<u32>,
    names: BTreeMap<String, u32>,
}

/// Lookup of trees by id, used to follow aliases that cross trees.
pub trait SymbolTables {
    fn table(&self, id: TableId) -> Option<&SymbolTable>;
}

impl SymbolTables for SymbolTable {
    fn table(&self, id: TableId) -> Option<&SymbolTable> {
        (id == self.id).then_some(self)
    }
}

impl SymbolTables for [&SymbolTable] {
    fn table(&self, id: TableId) -> Option<&SymbolTable> {
        self.iter().copied().find(|t| t.id == id)
    }
}

/// Alias chains longer than this are treated as cycles.
const MAX_ALIAS_DEPTH: usize = 64;

/// Symbol table tree.
#[derive(Debug)]
pub struct SymbolTable {
    id: TableId,
    nodes: Vec<Node>,
    entries: Vec<SymbolEntry>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a tree containing only a root node.
    pub fn new() -> Self {
        Self {
            id: TableId::fresh(),
            nodes: vec![Node::default()],
            entries: Vec::new(),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        NodeId {
            table: self.id,
            index: 0,
        }
    }

    // ============================================================================
    // TREE SHAPE
    // ============================================================================

    /// Append a new empty child under `parent`.
    pub fn add_child(&mut self, parent: NodeId) -> NodeId {
        let parent_index = self.node_index(parent);
        let index = u32::try_from(self.nodes.len()).expect("INVARIANT: symbol table node count fits in u32");
        self.nodes.push(Node {
            parent: Some(parent_index),
            ..Node::default()
        });
        self.nodes[parent_index as usize].children.push(index);
        NodeId { table: self.id, index }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        let index = self.node_index(node);
        self.nodes[index as usize].parent.map(|p| NodeId {
            table: self.id,
            index: p,
        })
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let index = self.node_index(node);
        self.nodes[index as usize]
            .children
            .iter()
            .map(|&c| NodeId { table: self.id, index: c })
            .collect()
    }

    // ============================================================================
    // LOOKUP
    // ============================================================================

    /// The entry named `name` in exactly this node, if any.
    pub fn get(&self, node: NodeId, name: &str) -> Option<SymbolId> {
        let index = self.node_index(node);
        self.nodes[index as usize]
            .names
            .get(name)
            .map(|&e| SymbolId { table: self.id, index: e })
    }

    pub fn entry(&self, id: SymbolId) -> &SymbolEntry {
        &self.entries[self.entry_index(id)]
    }

    /// Entries of one node, ordered by name.
    pub fn entries_in(&self, node: NodeId) -> Vec<SymbolId> {
        let index = self.node_index(node);
        self.nodes[index as usize]
            .names
            .values()
            .map(|&e| SymbolId { table: self.id, index: e })
            .collect()
    }

    /// Follow aliases until a concrete value is found.
    ///
    /// ## Parameters
    /// - `id`: Entry to start from.
    /// - `tables`: Trees that aliases may point into; `self` is always consulted first.
    ///
    /// ## Returns
    /// - The first non-alias value, or `None` if an alias leads to an unknown tree or the chain is cyclic.
    pub fn resolve<T: SymbolTables + ?Sized>(&self, id: SymbolId, tables: &T) -> Option<SymbolValue> {
        let mut current = id;
        for _ in 0..MAX_ALIAS_DEPTH {
            let owner = if current.table == self.id {
                self
            } else {
                tables.table(current.table)?
            };
            match owner.entry(current).value {
                SymbolValue::Alias(next) => current = next,
                other => return Some(other),
            }
        }
        None
    }

    /// Numeric value of an entry, following aliases.
    ///
    /// `None` when the chain ends in an empty or deleted value, or cannot be followed.
    pub fn value<T: SymbolTables + ?Sized>(&self, id: SymbolId, tables: &T) -> Option<u16> {
        self.resolve(id, tables)?.direct()
    }

    // ============================================================================
    // MUTATION
    // ============================================================================

    /// Return the entry for `name` in `node`, creating it if needed.
    ///
    /// A freshly created entry links to any `Global` entry of the same name elsewhere in the tree: one global makes it
    /// an `Imported` alias of that global, more than one makes it a conflicting `Global` in `ExternalMultiple` state.
    pub fn reference(&mut self, node: NodeId, name: &str) -> SymbolId {
        if let Some(existing) = self.get(node, name) {
            return existing;
        }

        let node_index = self.node_index(node);
        let index = u32::try_from(self.entries.len()).expect("INVARIANT: symbol entry count fits in u32");
        self.entries.push(SymbolEntry {
            name: name.to_string(),
            node,
            state: DefinitionState::Undefined,
            binding: Binding::Local,
            value: SymbolValue::Empty,
        });
        self.nodes[node_index as usize].names.insert(name.to_string(), index);
        let id = SymbolId { table: self.id, index };

        let globals: Vec<SymbolId> = self
            .others_named(id)
            .into_iter()
            .filter(|&o| self.entry(o).binding == Binding::Global)
            .collect();
        match globals.as_slice() {
            [] => {}
            [single] => {
                let state = self.entry(*single).state;
                let e = self.entry_mut(id);
                e.binding = Binding::Imported;
                e.value = SymbolValue::Alias(*single);
                e.state = state;
            }
            _ => {
                let e = self.entry_mut(id);
                e.binding = Binding::Global;
                e.state = DefinitionState::ExternalMultiple;
            }
        }
        id
    }

    /// Record one definition of `name` in `node`.
    ///
    /// Defining an imported name means two units both define it, so the entry becomes `ExternalMultiple`. Defining a
    /// global publishes the new state to every entry importing it.
    pub fn define(&mut self, node: NodeId, name: &str) -> SymbolId {
        let id = self.reference(node, name);
        match self.entry(id).binding {
            Binding::Imported => self.entry_mut(id).state = DefinitionState::ExternalMultiple,
            Binding::Local => {
                let e = self.entry_mut(id);
                e.state = e.state.advance();
            }
            Binding::Global => {
                let state = self.entry(id).state.advance();
                self.entry_mut(id).state = state;
                for other in self.others_named(id) {
                    let o = self.entry_mut(other);
                    if o.binding == Binding::Imported && o.state != DefinitionState::ExternalMultiple {
                        o.value = SymbolValue::Alias(id);
                        o.state = state;
                    }
                }
            }
        }
        id
    }

    /// Make `name` in `node` visible to every other node.
    ///
    /// Another global of the same name is a conflict: both become `ExternalMultiple`. Same-named locals elsewhere
    /// become imports of this entry; a local that was already defined keeps a record of the clash as
    /// `ExternalMultiple`.
    pub fn mark_global(&mut self, node: NodeId, name: &str) -> SymbolId {
        let id = self.reference(node, name);
        {
            let e = self.entry_mut(id);
            if e.binding == Binding::Imported {
                e.value = SymbolValue::Empty;
            }
            e.binding = Binding::Global;
        }

        for other in self.others_named(id) {
            match self.entry(other).binding {
                Binding::Global => {
                    self.entry_mut(other).state = DefinitionState::ExternalMultiple;
                    self.entry_mut(id).state = DefinitionState::ExternalMultiple;
                }
                Binding::Local => {
                    let mine = self.entry(id).state;
                    let o = self.entry_mut(other);
                    o.state = if o.state == DefinitionState::Undefined {
                        mine
                    } else {
                        DefinitionState::ExternalMultiple
                    };
                    o.binding = Binding::Imported;
                    o.value = SymbolValue::Alias(id);
                }
                Binding::Imported => {}
            }
        }
        id
    }

    /// Bring `name` from another tree into `node` as an `Imported` alias.
    ///
    /// The import counts as one local definition: a name already defined here becomes `Multiple`, and the exporter's
    /// own state is not copied.
    ///
    /// ## Parameters
    /// - `node`: Destination node in this tree.
    /// - `other`: Tree to import from.
    /// - `other_node`: Node of `other` that must directly contain `name`.
    ///
    /// ## Returns
    /// - The local entry, or `None` if `other_node` has no such name (nothing is created in that case).
    pub fn import(&mut self, node: NodeId, other: &SymbolTable, other_node: NodeId, name: &str) -> Option<SymbolId> {
        let target = other.get(other_node, name)?;
        let id = self.define(node, name);
        let e = self.entry_mut(id);
        e.binding = Binding::Imported;
        e.value = SymbolValue::Alias(target);
        Some(id)
    }

    /// Replace the value of an entry. Binding and state are untouched.
    pub fn set_value(&mut self, id: SymbolId, value: SymbolValue) {
        self.entry_mut(id).value = value;
    }

    // ============================================================================
    // HELPERS
    // ============================================================================

    fn others_named(&self, id: SymbolId) -> Vec<SymbolId> {
        let name = self.entry(id).name.clone();
        self.select(self.root(), &name, super::TraversalPolicy::WholeTree)
            .into_iter()
            .filter(|&o| o != id)
            .collect()
    }

    fn entry_mut(&mut self, id: SymbolId) -> &mut SymbolEntry {
        let index = self.entry_index(id);
        &mut self.entries[index]
    }

    fn entry_index(&self, id: SymbolId) -> usize {
        assert!(
            id.table == self.id && (id.index as usize) < self.entries.len(),
            "INVARIANT: SymbolId {id:?} was not issued by table {:?}",
            self.id
        );
        id.index as usize
    }

    fn node_index(&self, node: NodeId) -> u32 {
        assert!(
            node.table == self.id && (node.index as usize) < self.nodes.len(),
            "INVARIANT: NodeId {node:?} was not issued by table {:?}",
            self.id
        );
        node.index
    }
}
