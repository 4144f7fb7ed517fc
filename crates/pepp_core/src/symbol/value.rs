//! Values carried by symbol entries.
//!
//! A value is either nothing yet, a constant from `.EQUATE`, an address assigned by the layout pass, or an alias to
//! another entry (possibly in another table). Aliases are how imports and `.EQUATE other` share a value without
//! copying it.

use std::sync::atomic::{AtomicU32, Ordering};

/// Identity of a symbol table tree.
///
/// Every [`crate::symbol::SymbolTable`] draws a fresh id from a process-wide counter, so a [`SymbolId`] can say
/// unambiguously which tree it points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(u32);

static NEXT_TABLE_ID: AtomicU32 = AtomicU32::new(1);

impl TableId {
    pub(crate) fn fresh() -> Self {
        TableId(NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Fully-qualified handle to an entry: which tree, and which entry inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId {
    pub(crate) table: TableId,
    pub(crate) index: u32,
}

impl SymbolId {
    /// Tree that owns this entry.
    pub fn table(self) -> TableId {
        self.table
    }
}

/// What kind of thing a symbol names, as far as the object file cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    Empty,
    Object,
    Code,
    Constant,
    /// Forwards to another entry.
    PtrToSym,
    Deleted,
}

/// What a located symbol labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    /// An instruction.
    Code,
    /// Data (`.BLOCK`, `.WORD`, ...).
    Object,
}

/// The value slot of a symbol entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolValue {
    #[default]
    Empty,
    /// An `.EQUATE` constant; `mask` limits the significant bits.
    Constant { value: u16, mask: u16 },
    /// An address assigned by layout.
    Location { address: u16, size: u32, kind: LocationKind },
    /// Value lives in another entry, possibly in another tree.
    Alias(SymbolId),
    Deleted,
}

impl SymbolValue {
    /// A full-width constant.
    pub fn constant(value: u16) -> Self {
        SymbolValue::Constant { value, mask: 0xFFFF }
    }

    /// Numeric value when it is known without following aliases.
    ///
    /// Aliases return `None`; use [`crate::symbol::SymbolTable::value`] to follow them.
    pub fn direct(&self) -> Option<u16> {
        match *self {
            SymbolValue::Constant { value, mask } => Some(value & mask),
            SymbolValue::Location { address, .. } => Some(address),
            SymbolValue::Empty | SymbolValue::Alias(_) | SymbolValue::Deleted => None,
        }
    }

    pub fn symbol_type(&self) -> SymbolType {
        match *self {
            SymbolValue::Empty => SymbolType::Empty,
            SymbolValue::Constant { .. } => SymbolType::Constant,
            SymbolValue::Location { kind: LocationKind::Code, .. } => SymbolType::Code,
            SymbolValue::Location { kind: LocationKind::Object, .. } => SymbolType::Object,
            SymbolValue::Alias(_) => SymbolType::PtrToSym,
            SymbolValue::Deleted => SymbolType::Deleted,
        }
    }

    /// Size in bytes of the labelled object; anything but a location is zero-sized.
    pub fn size(&self) -> u32 {
        match *self {
            SymbolValue::Location { size, .. } => size,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ids_are_unique() {
        let a = TableId::fresh();
        let b = TableId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn test_direct_values() {
        assert_eq!(SymbolValue::constant(10).direct(), Some(10));
        assert_eq!(SymbolValue::Constant { value: 0x1FF, mask: 0xFF }.direct(), Some(0xFF));
        let loc = SymbolValue::Location {
            address: 0x20,
            size: 3,
            kind: LocationKind::Code,
        };
        assert_eq!(loc.direct(), Some(0x20));
        assert_eq!(loc.size(), 3);
        assert_eq!(loc.symbol_type(), SymbolType::Code);
        assert_eq!(SymbolValue::Empty.direct(), None);
    }
}
