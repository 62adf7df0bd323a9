//! Parsing of numpy-style element type tags.

use super::{ByteOrder, ElementKind, ElementType, UnsupportedElementTypeError};

/// Parse an element type `tag`, using `default_order` if the tag has no leading order sigil.
pub(super) fn parse_type_tag(
    tag: &str,
    default_order: ByteOrder,
) -> Result<ElementType, UnsupportedElementTypeError> {
    let err = || UnsupportedElementTypeError::new(tag);

    let mut chars = tag.chars();
    let (byte_order, body) = match chars.next().and_then(ByteOrder::from_sigil) {
        Some(byte_order) => (byte_order, chars.as_str()),
        None => (default_order, tag),
    };

    let (kind, size) = parse_body(body).ok_or_else(err)?;
    ElementType::new(kind, size, byte_order).map_err(|_| err())
}

fn parse_body(body: &str) -> Option<(ElementKind, usize)> {
    use ElementKind as K;
    let named = match body {
        "bool" | "?" => Some((K::Bool, 1)),
        "int8" | "b" => Some((K::Int, 1)),
        "int16" | "h" => Some((K::Int, 2)),
        "int32" | "i" => Some((K::Int, 4)),
        "int64" | "l" | "q" => Some((K::Int, 8)),
        "uint8" | "B" => Some((K::UInt, 1)),
        "uint16" | "H" => Some((K::UInt, 2)),
        "uint32" | "I" => Some((K::UInt, 4)),
        "uint64" | "L" | "Q" => Some((K::UInt, 8)),
        "float16" | "e" => Some((K::Float, 2)),
        "float32" | "f" => Some((K::Float, 4)),
        "float64" | "d" => Some((K::Float, 8)),
        "complex64" | "F" => Some((K::Complex, 8)),
        "complex128" | "D" => Some((K::Complex, 16)),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    let mut chars = body.chars();
    let kind = match chars.next()? {
        'b' | '?' => K::Bool,
        'i' => K::Int,
        'u' => K::UInt,
        'f' => K::Float,
        'c' => K::Complex,
        'V' | 'S' | 'a' => K::RawBits,
        _ => return None,
    };
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let size = digits.parse::<usize>().ok()?;
    kind.supports_size(size).then_some((kind, size))
}

#[cfg(test)]
mod tests {
    use crate::element_type::{ElementType, NATIVE_ENDIAN};

    use super::*;

    #[test]
    fn type_tag_default_order() {
        let source = ElementType::parse_source("i4").unwrap();
        assert_eq!(source.kind(), ElementKind::Int);
        assert_eq!(source.size(), 4);
        assert_eq!(source.byte_order(), ByteOrder::Big);

        let destination = ElementType::parse_destination("i4").unwrap();
        assert_eq!(destination.byte_order(), ByteOrder::Native);
        assert_eq!(destination.endianness(), Some(NATIVE_ENDIAN));
    }

    #[test]
    fn type_tag_explicit_order() {
        assert_eq!(
            ElementType::parse_source("<f8").unwrap().byte_order(),
            ByteOrder::Little
        );
        assert_eq!(
            ElementType::parse_destination(">f8").unwrap().byte_order(),
            ByteOrder::Big
        );
        assert_eq!(
            ElementType::parse_source("=u2").unwrap().byte_order(),
            ByteOrder::Native
        );
        // `|` on a multi-byte type resolves to the native order
        assert_eq!(
            ElementType::parse_source("|u2").unwrap().byte_order(),
            ByteOrder::Native
        );
        assert_eq!(
            ElementType::parse_source(">u1").unwrap().byte_order(),
            ByteOrder::NotApplicable
        );
    }

    #[test]
    fn type_tag_names_and_codes() {
        let cases = [
            ("bool", ElementKind::Bool, 1),
            ("?", ElementKind::Bool, 1),
            ("b1", ElementKind::Bool, 1),
            ("b", ElementKind::Int, 1),
            ("int16", ElementKind::Int, 2),
            ("h", ElementKind::Int, 2),
            ("i", ElementKind::Int, 4),
            ("q", ElementKind::Int, 8),
            ("uint8", ElementKind::UInt, 1),
            ("H", ElementKind::UInt, 2),
            ("u4", ElementKind::UInt, 4),
            ("Q", ElementKind::UInt, 8),
            ("float16", ElementKind::Float, 2),
            ("e", ElementKind::Float, 2),
            ("f", ElementKind::Float, 4),
            ("d", ElementKind::Float, 8),
            ("F", ElementKind::Complex, 8),
            ("c16", ElementKind::Complex, 16),
            ("complex64", ElementKind::Complex, 8),
            ("V3", ElementKind::RawBits, 3),
            ("S10", ElementKind::RawBits, 10),
        ];
        for (tag, kind, size) in cases {
            let element_type = ElementType::parse_source(tag).unwrap();
            assert_eq!(element_type.kind(), kind, "{tag}");
            assert_eq!(element_type.size(), size, "{tag}");
        }
    }

    #[test]
    fn type_tag_display_round_trip() {
        for tag in [">i4", "<i2", "=f8", "|u1", "|b1", ">c16", "|V7"] {
            let element_type = ElementType::parse_source(tag).unwrap();
            assert_eq!(element_type.to_string(), tag);
        }
    }

    #[test]
    fn type_tag_invalid() {
        for tag in ["", ">", "i3", "f1", "c4", "x4", "u", "V0", "i-4", "int128", "<<i4"] {
            assert!(ElementType::parse_source(tag).is_err(), "{tag}");
        }
        assert_eq!(
            ElementType::parse_source("x4").unwrap_err().to_string(),
            "unsupported element type x4"
        );
    }
}
