//! Memory-mapped vectors at the top of the Pep/10 address space.
//!
//! The operating system declares its character devices with `.INPUT`/`.OUTPUT`; when the declaring symbol has no
//! resolvable value the exporter falls back to the well-known vector address below.

/// A named, fixed address in high memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryVector {
    pub name: &'static str,
    pub address: u16,
}

const fn vector(name: &'static str, address: u16) -> MemoryVector {
    MemoryVector { name, address }
}

/// Registry of the standard vectors.
pub const VECTORS: &[MemoryVector] = &[
    vector("trapHnd", 0xFFF7),
    vector("dispatch", 0xFFF9),
    vector("osSP", 0xFFFB),
    vector("charIn", 0xFFFD),
    vector("charOut", 0xFFFE),
    vector("pwrOff", 0xFFFF),
];

/// Case-sensitive lookup by name; symbol names are case-sensitive in Pep/10 sources.
pub fn from_name(name: &str) -> Option<&'static MemoryVector> {
    VECTORS.iter().find(|v| v.name == name)
}
