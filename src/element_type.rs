//! Element types.
//!
//! An [`ElementType`] describes how a single scalar element is laid out in memory: its [`ElementKind`], its size in bytes, and its [`ByteOrder`].
//!
//! Element types are usually created from numpy-style string tags such as `">i4"` or `"float64"`, see [`ElementType::parse_source`] and [`ElementType::parse_destination`].

mod endianness;
mod type_tag;

pub use endianness::{ByteOrder, Endianness, NATIVE_ENDIAN};

use derive_more::Display;
use serde::de::Error;
use thiserror::Error;

use crate::element::Element;

/// The kind of a scalar element.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum ElementKind {
    /// A boolean stored in one byte.
    #[display("bool")]
    Bool,
    /// A signed two's complement integer.
    #[display("int")]
    Int,
    /// An unsigned integer.
    #[display("uint")]
    UInt,
    /// An IEEE 754 floating point number.
    #[display("float")]
    Float,
    /// A complex number composed of two IEEE 754 floating point numbers.
    #[display("complex")]
    Complex,
    /// Opaque bytes.
    #[display("raw")]
    RawBits,
}

impl ElementKind {
    /// Returns the numpy type code character of this kind.
    #[must_use]
    pub const fn type_code(self) -> char {
        match self {
            Self::Bool => 'b',
            Self::Int => 'i',
            Self::UInt => 'u',
            Self::Float => 'f',
            Self::Complex => 'c',
            Self::RawBits => 'V',
        }
    }

    /// Returns true if `size` is a valid element size for this kind.
    #[must_use]
    pub const fn supports_size(self, size: usize) -> bool {
        match self {
            Self::Bool => size == 1,
            Self::Int | Self::UInt => matches!(size, 1 | 2 | 4 | 8),
            Self::Float => matches!(size, 2 | 4 | 8),
            Self::Complex => matches!(size, 8 | 16),
            Self::RawBits => size > 0,
        }
    }

    /// Returns true if this kind holds a numeric value that can be cast to another numeric kind.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::RawBits)
    }
}

/// An unsupported element type error.
#[derive(Debug, Error)]
#[error("unsupported element type {_0}")]
pub struct UnsupportedElementTypeError(String);

impl UnsupportedElementTypeError {
    /// Create a new unsupported element type error.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }
}

/// An element type.
///
/// Two element types are equal if their kind, size, and *effective* byte order match.
/// That is, [`ByteOrder::Native`] compares equal to the explicit order of the platform.
#[derive(Copy, Clone, Debug)]
pub struct ElementType {
    kind: ElementKind,
    size: usize,
    byte_order: ByteOrder,
}

impl ElementType {
    /// Create a new element type.
    ///
    /// The byte order of a single-byte element type is always [`ByteOrder::NotApplicable`].
    ///
    /// # Errors
    /// Returns [`UnsupportedElementTypeError`] if `size` is not supported for `kind`.
    pub fn new(
        kind: ElementKind,
        size: usize,
        byte_order: ByteOrder,
    ) -> Result<Self, UnsupportedElementTypeError> {
        if kind.supports_size(size) {
            Ok(Self::new_unchecked(kind, size, byte_order))
        } else {
            Err(UnsupportedElementTypeError(format!("{kind} of size {size}")))
        }
    }

    const fn new_unchecked(kind: ElementKind, size: usize, byte_order: ByteOrder) -> Self {
        let byte_order = if Self::is_order_dependent_size(kind, size) {
            match byte_order {
                ByteOrder::NotApplicable => ByteOrder::Native,
                order => order,
            }
        } else {
            ByteOrder::NotApplicable
        };
        Self {
            kind,
            size,
            byte_order,
        }
    }

    const fn is_order_dependent_size(kind: ElementKind, size: usize) -> bool {
        !matches!(kind, ElementKind::RawBits) && size > 1
    }

    /// Create the native order element type of the Rust element `T`.
    #[must_use]
    pub const fn native<T: Element>() -> Self {
        Self::new_unchecked(T::KIND, T::SIZE, ByteOrder::Native)
    }

    /// Parse a source element type tag.
    ///
    /// The byte order defaults to big endian unless the tag starts with an order sigil (`>`, `<`, `=`, `|`).
    ///
    /// # Errors
    /// Returns [`UnsupportedElementTypeError`] if `tag` is not a recognised element type.
    pub fn parse_source(tag: &str) -> Result<Self, UnsupportedElementTypeError> {
        type_tag::parse_type_tag(tag, ByteOrder::Big)
    }

    /// Parse a destination element type tag.
    ///
    /// The byte order defaults to the native byte order unless the tag starts with an order sigil (`>`, `<`, `=`, `|`).
    ///
    /// # Errors
    /// Returns [`UnsupportedElementTypeError`] if `tag` is not a recognised element type.
    pub fn parse_destination(tag: &str) -> Result<Self, UnsupportedElementTypeError> {
        type_tag::parse_type_tag(tag, ByteOrder::Native)
    }

    /// Returns the element kind.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Returns the element size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the byte order as specified.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Returns the effective endianness, or [`None`] if the element type is not order dependent.
    #[must_use]
    pub const fn endianness(&self) -> Option<Endianness> {
        self.byte_order.effective()
    }

    /// Returns true if the element type is stored in the native byte order (or is not order dependent).
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.endianness().map_or(true, Endianness::is_native)
    }

    /// Return this element type with a new byte order.
    #[must_use]
    pub const fn with_byte_order(&self, byte_order: ByteOrder) -> Self {
        Self::new_unchecked(self.kind, self.size, byte_order)
    }

    /// Return this element type with the native byte order.
    #[must_use]
    pub const fn to_native(&self) -> Self {
        self.with_byte_order(ByteOrder::Native)
    }

    /// Returns the size in bytes of the unit that is byte swapped when changing endianness.
    ///
    /// This is the element size, except for complex numbers where each component is swapped independently.
    #[must_use]
    pub const fn swap_size(&self) -> usize {
        match self.kind {
            ElementKind::Complex => self.size / 2,
            ElementKind::RawBits => 1,
            _ => self.size,
        }
    }

    /// Returns true if converting from `self` to `other` only requires swapping bytes.
    #[must_use]
    pub fn needs_swap(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.size == other.size
            && matches!(
                (self.endianness(), other.endianness()),
                (Some(a), Some(b)) if a != b
            )
    }

    /// Returns true if elements of this type can be converted to elements of type `other`.
    ///
    /// Numeric kinds can be converted to any other numeric kind with casting semantics.
    /// Raw bits can only be copied to raw bits of the same size.
    #[must_use]
    pub fn can_convert_to(&self, other: &Self) -> bool {
        if self.kind.is_numeric() && other.kind.is_numeric() {
            true
        } else {
            self.kind == other.kind && self.size == other.size
        }
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.size == other.size
            && self.endianness() == other.endianness()
    }
}

impl Eq for ElementType {}

impl std::hash::Hash for ElementType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.size.hash(state);
        self.endianness().hash(state);
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.byte_order.sigil(),
            self.kind.type_code(),
            self.size
        )
    }
}

impl std::str::FromStr for ElementType {
    type Err = UnsupportedElementTypeError;

    /// Parse with the destination defaults, so an unmarked tag is native.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_destination(s)
    }
}

impl serde::Serialize for ElementType {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ElementType {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(d)?;
        if let serde_json::Value::String(string) = value {
            Self::parse_destination(&string).map_err(|err| D::Error::custom(err.to_string()))
        } else {
            Err(D::Error::custom(
                "element type: a string tag such as \">i4\" or \"float64\"",
            ))
        }
    }
}

/// An element type specification.
///
/// A [`ElementTypeSpec::Concrete`] element type is used as-is, whereas a [`ElementTypeSpec::Tag`] is parsed with a default byte order that depends on whether it describes a source or a destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementTypeSpec<'a> {
    /// A concrete element type.
    Concrete(ElementType),
    /// A string tag, such as `">i4"`, `"f8"`, or `"uint16"`.
    Tag(&'a str),
}

impl ElementTypeSpec<'_> {
    /// Resolve a source element type. Tags without an order sigil are big endian.
    ///
    /// # Errors
    /// Returns [`UnsupportedElementTypeError`] if the tag is not a recognised element type.
    pub fn resolve_source(&self) -> Result<ElementType, UnsupportedElementTypeError> {
        match self {
            Self::Concrete(element_type) => Ok(*element_type),
            Self::Tag(tag) => ElementType::parse_source(tag),
        }
    }

    /// Resolve a destination element type. Tags without an order sigil are native.
    ///
    /// # Errors
    /// Returns [`UnsupportedElementTypeError`] if the tag is not a recognised element type.
    pub fn resolve_destination(&self) -> Result<ElementType, UnsupportedElementTypeError> {
        match self {
            Self::Concrete(element_type) => Ok(*element_type),
            Self::Tag(tag) => ElementType::parse_destination(tag),
        }
    }
}

impl From<ElementType> for ElementTypeSpec<'_> {
    fn from(element_type: ElementType) -> Self {
        Self::Concrete(element_type)
    }
}

impl<'a> From<&'a str> for ElementTypeSpec<'a> {
    fn from(tag: &'a str) -> Self {
        Self::Tag(tag)
    }
}
