use derive_more::Display;

/// The endianness of each element in an array, either `big` or `little`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum Endianness {
    /// Little endian.
    Little,

    /// Big endian.
    Big,
}

impl Endianness {
    /// Return true if the endianness matches the endianness of the CPU.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == NATIVE_ENDIAN
    }
}

/// The endianness of the CPU.
pub const NATIVE_ENDIAN: Endianness = if cfg!(target_endian = "big") {
    Endianness::Big
} else {
    Endianness::Little
};

/// The byte order of an [`ElementType`](super::ElementType).
///
/// Unlike [`Endianness`], a byte order can defer to the platform ([`ByteOrder::Native`]) or be irrelevant ([`ByteOrder::NotApplicable`]) for single-byte elements.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum ByteOrder {
    /// Big endian (`>`).
    #[display(">")]
    Big,
    /// Little endian (`<`).
    #[display("<")]
    Little,
    /// The byte order of the platform (`=`).
    #[display("=")]
    Native,
    /// Not order dependent (`|`).
    #[display("|")]
    NotApplicable,
}

impl ByteOrder {
    /// Return the order sigil character.
    #[must_use]
    pub const fn sigil(self) -> char {
        match self {
            Self::Big => '>',
            Self::Little => '<',
            Self::Native => '=',
            Self::NotApplicable => '|',
        }
    }

    /// Parse an order sigil character.
    #[must_use]
    pub const fn from_sigil(sigil: char) -> Option<Self> {
        match sigil {
            '>' => Some(Self::Big),
            '<' => Some(Self::Little),
            '=' => Some(Self::Native),
            '|' => Some(Self::NotApplicable),
            _ => None,
        }
    }

    /// Return the effective endianness, resolving [`ByteOrder::Native`] to [`NATIVE_ENDIAN`].
    ///
    /// Returns [`None`] for [`ByteOrder::NotApplicable`].
    #[must_use]
    pub const fn effective(self) -> Option<Endianness> {
        match self {
            Self::Big => Some(Endianness::Big),
            Self::Little => Some(Endianness::Little),
            Self::Native => Some(NATIVE_ENDIAN),
            Self::NotApplicable => None,
        }
    }
}

impl From<Endianness> for ByteOrder {
    fn from(endianness: Endianness) -> Self {
        match endianness {
            Endianness::Big => Self::Big,
            Endianness::Little => Self::Little,
        }
    }
}
