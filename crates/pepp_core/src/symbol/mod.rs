//! Symbol tables for multi-unit assembly.
//!
//! See [`table`] for the tree and its mutation rules, [`value`] for what an entry holds, and [`visit`] for scoped
//! name searches.

pub mod table;
pub mod value;
pub mod visit;

pub use table::{Binding, DefinitionState, NodeId, SymbolEntry, SymbolTable, SymbolTables};
pub use value::{LocationKind, SymbolId, SymbolType, SymbolValue, TableId};
pub use visit::TraversalPolicy;
