//! Rust element types.
//!
//! The [`Element`] trait associates a Rust scalar type with an [`ElementKind`] and size, and reads or writes a single element with a given [`Endianness`].

use half::f16;
use num::complex::{Complex32, Complex64};

use crate::element_type::{ElementKind, ElementType, Endianness};

/// A trait representing a Rust array element type.
pub trait Element: bytemuck::NoUninit + Copy + Send + Sync {
    /// The element kind.
    const KIND: ElementKind;

    /// The element size in bytes.
    const SIZE: usize;

    /// Read an element from exactly [`Element::SIZE`] bytes.
    ///
    /// # Panics
    /// Panics if `bytes.len()` is not [`Element::SIZE`].
    #[must_use]
    fn read(bytes: &[u8], endianness: Endianness) -> Self;

    /// Write an element to exactly [`Element::SIZE`] bytes.
    ///
    /// # Panics
    /// Panics if `bytes.len()` is not [`Element::SIZE`].
    fn write(self, bytes: &mut [u8], endianness: Endianness);

    /// Returns true if `element_type` holds elements of this type.
    #[must_use]
    fn matches(element_type: &ElementType) -> bool {
        element_type.kind() == Self::KIND && element_type.size() == Self::SIZE
    }
}

impl Element for bool {
    const KIND: ElementKind = ElementKind::Bool;
    const SIZE: usize = 1;

    fn read(bytes: &[u8], _endianness: Endianness) -> Self {
        assert_eq!(bytes.len(), 1);
        bytes[0] != 0
    }

    fn write(self, bytes: &mut [u8], _endianness: Endianness) {
        assert_eq!(bytes.len(), 1);
        bytes[0] = u8::from(self);
    }
}

macro_rules! impl_element_primitive {
    ($raw_type:ty, $kind:expr) => {
        impl Element for $raw_type {
            const KIND: ElementKind = $kind;
            const SIZE: usize = core::mem::size_of::<$raw_type>();

            fn read(bytes: &[u8], endianness: Endianness) -> Self {
                let bytes: [u8; core::mem::size_of::<$raw_type>()] = bytes.try_into().unwrap();
                match endianness {
                    Endianness::Big => <$raw_type>::from_be_bytes(bytes),
                    Endianness::Little => <$raw_type>::from_le_bytes(bytes),
                }
            }

            fn write(self, bytes: &mut [u8], endianness: Endianness) {
                let value = match endianness {
                    Endianness::Big => self.to_be_bytes(),
                    Endianness::Little => self.to_le_bytes(),
                };
                bytes.copy_from_slice(&value);
            }
        }
    };
}

impl_element_primitive!(i8, ElementKind::Int);
impl_element_primitive!(i16, ElementKind::Int);
impl_element_primitive!(i32, ElementKind::Int);
impl_element_primitive!(i64, ElementKind::Int);
impl_element_primitive!(u8, ElementKind::UInt);
impl_element_primitive!(u16, ElementKind::UInt);
impl_element_primitive!(u32, ElementKind::UInt);
impl_element_primitive!(u64, ElementKind::UInt);
impl_element_primitive!(f16, ElementKind::Float);
impl_element_primitive!(f32, ElementKind::Float);
impl_element_primitive!(f64, ElementKind::Float);

macro_rules! impl_element_complex {
    ($complex_type:ty, $component:ty) => {
        impl Element for $complex_type {
            const KIND: ElementKind = ElementKind::Complex;
            const SIZE: usize = 2 * core::mem::size_of::<$component>();

            fn read(bytes: &[u8], endianness: Endianness) -> Self {
                let (re, im) = bytes.split_at(core::mem::size_of::<$component>());
                Self::new(
                    <$component>::read(re, endianness),
                    <$component>::read(im, endianness),
                )
            }

            fn write(self, bytes: &mut [u8], endianness: Endianness) {
                let (re, im) = bytes.split_at_mut(core::mem::size_of::<$component>());
                self.re.write(re, endianness);
                self.im.write(im, endianness);
            }
        }
    };
}

impl_element_complex!(Complex32, f32);
impl_element_complex!(Complex64, f64);
