//! Line IR for Pep/10 assembly.
//!
//! A parsed program is a flat list of [`Line`]s. Each line has a closed [`LineKind`] holding only the fields that kind
//! needs, plus a small ordered map of extra attributes that later passes attach (symbol declaration, comment, address,
//! errors).
//!
//! ## Notes
//! - [`Line::attribute`] is the one place that answers “does this line have X?”, whether X is an intrinsic field of the
//!   kind or an attached attribute.
//! - Symbolic arguments hold a [`SymbolId`] into the table the line was parsed against.

use std::collections::BTreeMap;
use std::fmt;

use pepp_core::isa::directives::DirectiveId;
use pepp_core::isa::{AddressingMode, MnemonicId};
use pepp_core::symbol::{SymbolId, SymbolTable, SymbolTables};

use crate::lexer::IntegerFormat;
use crate::lexer::tokens::format_integer;
use crate::source::LocationInterval;

// ============================================================================
// ARGUMENT VALUES
// ============================================================================

/// An instruction or directive argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer { value: i64, format: IntegerFormat },
    /// `text` is the literal body with escapes kept; `bytes` is what it encodes.
    Character { text: String, bytes: Vec<u8> },
    /// A string literal of at most two bytes, usable wherever a number is.
    ShortString { text: String, bytes: Vec<u8> },
    LongString { text: String, bytes: Vec<u8> },
    Symbolic(SymbolId),
}

impl Value {
    /// Bytes needed to hold the value.
    ///
    /// Symbols are always two bytes wide; an unsigned literal needs as many bytes as its magnitude, a signed literal as
    /// many as its two's-complement form.
    pub fn required_bytes(&self) -> usize {
        match self {
            Value::Integer { value, format } => match format {
                IntegerFormat::SignedDec => signed_width(*value),
                IntegerFormat::UnsignedDec | IntegerFormat::Hex => unsigned_width(value.unsigned_abs()),
            },
            Value::Character { bytes, .. } | Value::ShortString { bytes, .. } | Value::LongString { bytes, .. } => {
                bytes.len()
            }
            Value::Symbolic(_) => 2,
        }
    }

    /// Whether the value can stand where a number is expected.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::LongString { .. })
    }

    pub fn is_hex(&self) -> bool {
        matches!(
            self,
            Value::Integer {
                format: IntegerFormat::Hex,
                ..
            }
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::ShortString { .. } | Value::LongString { .. })
    }

    /// Value known without consulting a symbol table.
    ///
    /// Characters and short strings pack big-endian. Long strings and symbols have no literal value.
    pub fn literal_value(&self) -> Option<i64> {
        match self {
            Value::Integer { value, .. } => Some(*value),
            Value::Character { bytes, .. } | Value::ShortString { bytes, .. } => {
                Some(bytes.iter().fold(0i64, |acc, b| (acc << 8) | i64::from(*b)))
            }
            Value::LongString { .. } | Value::Symbolic(_) => None,
        }
    }

    /// Numeric value truncated to 16 bits, following symbol aliases through `tables`.
    ///
    /// ## Returns
    /// - `None` for long strings and for symbols without a value.
    pub fn evaluate<T: SymbolTables + ?Sized>(&self, table: &SymbolTable, tables: &T) -> Option<u16> {
        match self {
            Value::Symbolic(id) => table.value(*id, tables),
            other => other.literal_value().map(|v| v as u16),
        }
    }

    /// The symbol this value names, if it is symbolic.
    pub fn symbol(&self) -> Option<SymbolId> {
        match self {
            Value::Symbolic(id) => Some(*id),
            _ => None,
        }
    }

    /// Spelling as it would appear in source.
    pub fn render(&self, table: &SymbolTable) -> String {
        match self {
            Value::Integer { value, format } => format_integer(*value, *format),
            Value::Character { text, .. } => format!("'{text}'"),
            Value::ShortString { text, .. } | Value::LongString { text, .. } => format!("\"{text}\""),
            Value::Symbolic(id) => table.entry(*id).name().to_string(),
        }
    }
}

fn unsigned_width(v: u64) -> usize {
    let bits = 64 - v.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

fn signed_width(v: i64) -> usize {
    (1..=8)
        .find(|&n| {
            let bits = 8 * n as u32;
            if bits >= 64 {
                return true;
            }
            let min = -(1i64 << (bits - 1));
            let max = (1i64 << (bits - 1)) - 1;
            (min..=max).contains(&v)
        })
        .unwrap_or(8)
}

// ============================================================================
// LINE KINDS
// ============================================================================

/// Directives that only annotate a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotation {
    Export,
    Import,
    Input,
    Output,
    Scall,
}

impl Annotation {
    pub fn directive(self) -> DirectiveId {
        match self {
            Annotation::Export => DirectiveId::Export,
            Annotation::Import => DirectiveId::Import,
            Annotation::Input => DirectiveId::Input,
            Annotation::Output => DirectiveId::Output,
            Annotation::Scall => DirectiveId::Scall,
        }
    }
}

/// Access flags of a `.SECTION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SectionFlags {
    pub r: bool,
    pub w: bool,
    pub x: bool,
    pub z: bool,
}

impl SectionFlags {
    /// Flags of the implicit `.text` section.
    pub const DEFAULT: SectionFlags = SectionFlags {
        r: true,
        w: true,
        x: true,
        z: false,
    };

    /// Parse a flag string such as `"rwx"`; any letter outside `rwxz` rejects the whole string.
    pub fn parse(text: &str) -> Option<SectionFlags> {
        let mut flags = SectionFlags::default();
        for c in text.chars() {
            match c.to_ascii_lowercase() {
                'r' => flags.r = true,
                'w' => flags.w = true,
                'x' => flags.x = true,
                'z' => flags.z = true,
                _ => return None,
            }
        }
        Some(flags)
    }
}

impl fmt::Display for SectionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, c) in [(self.r, 'r'), (self.w, 'w'), (self.x, 'x'), (self.z, 'z')] {
            if set {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// What a line is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Empty,
    /// A line holding only a comment; `text` excludes the `;`.
    Comment { text: String },
    Monadic { mnemonic: MnemonicId },
    Dyadic { mnemonic: MnemonicId, mode: AddressingMode, argument: Value },
    Align { argument: Value },
    Ascii { argument: Value },
    Block { argument: Value },
    Byte { argument: Value },
    Word { argument: Value },
    Equate { argument: Value },
    Org { argument: Value },
    Section { name: String, flags: SectionFlags },
    Annotate { which: Annotation, symbol: SymbolId },
    /// `@name args`; `expansion` is filled in once the macro body has been included.
    MacroInvocation { name: String, args: Vec<String>, expansion: Option<Vec<Line>> },
}

impl LineKind {
    /// Directive this kind was written with, if it is a directive.
    pub fn directive(&self) -> Option<DirectiveId> {
        Some(match self {
            LineKind::Align { .. } => DirectiveId::Align,
            LineKind::Ascii { .. } => DirectiveId::Ascii,
            LineKind::Block { .. } => DirectiveId::Block,
            LineKind::Byte { .. } => DirectiveId::Byte,
            LineKind::Word { .. } => DirectiveId::Word,
            LineKind::Equate { .. } => DirectiveId::Equate,
            LineKind::Org { .. } => DirectiveId::Org,
            LineKind::Section { .. } => DirectiveId::Section,
            LineKind::Annotate { which, .. } => which.directive(),
            LineKind::Empty
            | LineKind::Comment { .. }
            | LineKind::Monadic { .. }
            | LineKind::Dyadic { .. }
            | LineKind::MacroInvocation { .. } => return None,
        })
    }

    /// Whether the line occupies memory (and so may receive an address).
    pub fn is_addressable(&self) -> bool {
        match self {
            LineKind::Monadic { .. } | LineKind::Dyadic { .. } => true,
            _ => self
                .directive()
                .is_some_and(|d| pepp_core::isa::directives::info_for(d).addressable),
        }
    }

    /// The argument value of kinds that have exactly one.
    pub fn argument(&self) -> Option<&Value> {
        match self {
            LineKind::Dyadic { argument, .. }
            | LineKind::Align { argument }
            | LineKind::Ascii { argument }
            | LineKind::Block { argument }
            | LineKind::Byte { argument }
            | LineKind::Word { argument }
            | LineKind::Equate { argument }
            | LineKind::Org { argument } => Some(argument),
            LineKind::Empty
            | LineKind::Comment { .. }
            | LineKind::Monadic { .. }
            | LineKind::Section { .. }
            | LineKind::Annotate { .. }
            | LineKind::MacroInvocation { .. } => None,
        }
    }
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// Keys of [`Attribute`]s, in the order they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKind {
    Mnemonic,
    AddressingMode,
    Argument,
    SymbolDeclaration,
    Comment,
    Address,
    Errors,
}

/// Where a line was placed in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub address: u16,
    pub size: u32,
}

/// A property of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Mnemonic(MnemonicId),
    AddressingMode(AddressingMode),
    Argument(Value),
    SymbolDeclaration(SymbolId),
    Comment(String),
    Address(Address),
    Errors(Vec<String>),
}

impl Attribute {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::Mnemonic(_) => AttributeKind::Mnemonic,
            Attribute::AddressingMode(_) => AttributeKind::AddressingMode,
            Attribute::Argument(_) => AttributeKind::Argument,
            Attribute::SymbolDeclaration(_) => AttributeKind::SymbolDeclaration,
            Attribute::Comment(_) => AttributeKind::Comment,
            Attribute::Address(_) => AttributeKind::Address,
            Attribute::Errors(_) => AttributeKind::Errors,
        }
    }
}

/// One line of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    /// Source span, absent for synthesized lines.
    pub source: Option<LocationInterval>,
    attributes: BTreeMap<AttributeKind, Attribute>,
}

impl Line {
    pub fn new(kind: LineKind) -> Self {
        Self {
            kind,
            source: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_source(mut self, source: LocationInterval) -> Self {
        self.source = Some(source);
        self
    }

    /// Look up a property of the line, intrinsic or attached.
    pub fn attribute(&self, kind: AttributeKind) -> Option<Attribute> {
        match kind {
            AttributeKind::Mnemonic => match &self.kind {
                LineKind::Monadic { mnemonic } | LineKind::Dyadic { mnemonic, .. } => {
                    Some(Attribute::Mnemonic(*mnemonic))
                }
                _ => None,
            },
            AttributeKind::AddressingMode => match &self.kind {
                LineKind::Dyadic { mode, .. } => Some(Attribute::AddressingMode(*mode)),
                _ => None,
            },
            AttributeKind::Argument => self.kind.argument().cloned().map(Attribute::Argument),
            AttributeKind::SymbolDeclaration => match &self.kind {
                // `.EXPORT` and friends name their symbol as an argument, not a declaration.
                LineKind::Annotate { .. } => None,
                _ => self.attributes.get(&kind).cloned(),
            },
            AttributeKind::Comment | AttributeKind::Address | AttributeKind::Errors => {
                self.attributes.get(&kind).cloned()
            }
        }
    }

    /// Attach an attribute, replacing one of the same kind. Intrinsic kinds are ignored.
    pub fn insert(&mut self, attribute: Attribute) {
        match attribute.kind() {
            AttributeKind::Mnemonic | AttributeKind::AddressingMode | AttributeKind::Argument => {}
            kind => {
                self.attributes.insert(kind, attribute);
            }
        }
    }

    pub fn remove(&mut self, kind: AttributeKind) -> Option<Attribute> {
        self.attributes.remove(&kind)
    }

    pub fn symbol(&self) -> Option<SymbolId> {
        match self.attribute(AttributeKind::SymbolDeclaration) {
            Some(Attribute::SymbolDeclaration(id)) => Some(id),
            _ => None,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self.attributes.get(&AttributeKind::Comment) {
            Some(Attribute::Comment(text)) => Some(text),
            _ => None,
        }
    }

    pub fn address(&self) -> Option<Address> {
        match self.attributes.get(&AttributeKind::Address) {
            Some(Attribute::Address(a)) => Some(*a),
            _ => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self.attributes.get(&AttributeKind::Errors) {
            Some(Attribute::Errors(errors)) => errors,
            _ => &[],
        }
    }

    /// Append an error message to the line.
    pub fn add_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.attributes.get_mut(&AttributeKind::Errors) {
            Some(Attribute::Errors(errors)) => errors.push(message),
            _ => {
                self.attributes.insert(AttributeKind::Errors, Attribute::Errors(vec![message]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_bytes() {
        let int = |value, format| Value::Integer { value, format };
        assert_eq!(int(255, IntegerFormat::UnsignedDec).required_bytes(), 1);
        assert_eq!(int(256, IntegerFormat::UnsignedDec).required_bytes(), 2);
        assert_eq!(int(0xFFFF, IntegerFormat::Hex).required_bytes(), 2);
        assert_eq!(int(0x10000, IntegerFormat::Hex).required_bytes(), 3);
        assert_eq!(int(-128, IntegerFormat::SignedDec).required_bytes(), 1);
        assert_eq!(int(-129, IntegerFormat::SignedDec).required_bytes(), 2);
        assert_eq!(int(-32769, IntegerFormat::SignedDec).required_bytes(), 3);
        assert_eq!(int(0, IntegerFormat::UnsignedDec).required_bytes(), 1);
    }

    #[test]
    fn test_short_string_packs_big_endian() {
        let v = Value::ShortString {
            text: "AB".into(),
            bytes: b"AB".to_vec(),
        };
        assert_eq!(v.literal_value(), Some(0x4142));
        assert!(v.is_numeric());
        assert!(v.is_string());
    }

    #[test]
    fn test_section_flags() {
        assert_eq!(SectionFlags::parse("RX").map(|f| f.to_string()), Some("rx".into()));
        assert_eq!(SectionFlags::parse("rq"), None);
        assert_eq!(SectionFlags::DEFAULT.to_string(), "rwx");
    }

    #[test]
    fn test_attribute_accessor_covers_intrinsics() {
        let mut line = Line::new(LineKind::Dyadic {
            mnemonic: MnemonicId::Ldwa,
            mode: AddressingMode::I,
            argument: Value::Integer {
                value: 1,
                format: IntegerFormat::UnsignedDec,
            },
        });
        assert_eq!(
            line.attribute(AttributeKind::Mnemonic),
            Some(Attribute::Mnemonic(MnemonicId::Ldwa))
        );
        assert!(line.attribute(AttributeKind::Comment).is_none());
        line.insert(Attribute::Comment("hi".into()));
        line.insert(Attribute::Mnemonic(MnemonicId::Ret));
        assert_eq!(line.comment(), Some("hi"));
        assert_eq!(
            line.attribute(AttributeKind::Mnemonic),
            Some(Attribute::Mnemonic(MnemonicId::Ldwa))
        );
    }

    #[test]
    fn test_errors_accumulate() {
        let mut line = Line::new(LineKind::Empty);
        assert!(line.errors().is_empty());
        line.add_error("a");
        line.add_error("b");
        assert_eq!(line.errors(), ["a", "b"]);
    }

    #[test]
    fn test_addressable_kinds() {
        let zero = Value::Integer {
            value: 0,
            format: IntegerFormat::UnsignedDec,
        };
        assert!(LineKind::Block { argument: zero.clone() }.is_addressable());
        assert!(!LineKind::Equate { argument: zero }.is_addressable());
        assert!(LineKind::Monadic { mnemonic: MnemonicId::Ret }.is_addressable());
        assert!(!LineKind::Empty.is_addressable());
    }
}
