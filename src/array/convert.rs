//! Element conversion between element types.

use half::f16;
use num::{
    cast::AsPrimitive,
    complex::{Complex32, Complex64},
};
use rayon::prelude::*;

use crate::{
    config::global_config,
    element::Element,
    element_type::{ElementKind, ElementType, Endianness, NATIVE_ENDIAN},
};

use super::ArrayError;

/// The number of elements converted per task when converting in parallel.
const PARALLEL_BLOCK_ELEMENTS: usize = 4096;

/// Convert the elements in `src_bytes` of type `src_type` into `dst_bytes` of type `dst_type`.
///
/// Identical element types are copied, element types that only differ in byte order are copied and byte swapped, and all other element types are cast element-wise.
/// Casts follow the semantics of Rust `as` casts: integers wrap, floats saturate when converted to integers, and the imaginary component is discarded when converting complex numbers to real numbers.
///
/// # Errors
/// Returns an [`ArrayError`] if
///  - `src_type` cannot be converted to `dst_type`,
///  - `src_bytes` is not a whole number of elements, or
///  - `src_bytes` and `dst_bytes` hold a different number of elements.
pub fn convert_elements(
    src_type: &ElementType,
    src_bytes: &[u8],
    dst_type: &ElementType,
    dst_bytes: &mut [u8],
) -> Result<(), ArrayError> {
    if !src_type.can_convert_to(dst_type) {
        return Err(ArrayError::IncompatibleConversion(*src_type, *dst_type));
    }
    if src_bytes.len() % src_type.size() != 0 {
        return Err(ArrayError::NotWholeElements(
            src_bytes.len(),
            src_type.size(),
        ));
    }
    let num_elements = src_bytes.len() / src_type.size();
    if dst_bytes.len() != num_elements * dst_type.size() {
        return Err(ArrayError::ElementCountMismatch(
            num_elements,
            dst_bytes.len() / dst_type.size(),
        ));
    }

    let threshold = global_config().parallel_conversion_threshold();
    if threshold > 0 && num_elements >= threshold {
        src_bytes
            .par_chunks(PARALLEL_BLOCK_ELEMENTS * src_type.size())
            .zip(dst_bytes.par_chunks_mut(PARALLEL_BLOCK_ELEMENTS * dst_type.size()))
            .for_each(|(src, dst)| convert_block(src_type, src, dst_type, dst));
    } else {
        convert_block(src_type, src_bytes, dst_type, dst_bytes);
    }
    Ok(())
}

fn convert_block(src_type: &ElementType, src: &[u8], dst_type: &ElementType, dst: &mut [u8]) {
    if src_type == dst_type || is_order_independent_copy(src_type, dst_type) {
        dst.copy_from_slice(src);
    } else if src_type.needs_swap(dst_type) {
        dst.copy_from_slice(src);
        reverse_endianness(dst, dst_type.swap_size());
    } else {
        let src_endianness = src_type.endianness().unwrap_or(NATIVE_ENDIAN);
        let dst_endianness = dst_type.endianness().unwrap_or(NATIVE_ENDIAN);
        for (src, dst) in std::iter::zip(
            src.chunks_exact(src_type.size()),
            dst.chunks_exact_mut(dst_type.size()),
        ) {
            let value = Scalar::read(src_type, src, src_endianness);
            value.write(dst_type, dst, dst_endianness);
        }
    }
}

/// Same kind and size, where at least one side has no byte order.
fn is_order_independent_copy(src_type: &ElementType, dst_type: &ElementType) -> bool {
    src_type.kind() == dst_type.kind()
        && src_type.size() == dst_type.size()
        && (src_type.endianness().is_none() || dst_type.endianness().is_none())
}

fn reverse_endianness(v: &mut [u8], swap_size: usize) {
    match swap_size {
        2 => {
            let swap = |chunk: &mut [u8]| {
                let bytes = u16::from_ne_bytes(chunk.try_into().unwrap());
                chunk.copy_from_slice(bytes.swap_bytes().to_ne_bytes().as_slice());
            };
            v.chunks_exact_mut(2).for_each(swap);
        }
        4 => {
            let swap = |chunk: &mut [u8]| {
                let bytes = u32::from_ne_bytes(chunk.try_into().unwrap());
                chunk.copy_from_slice(bytes.swap_bytes().to_ne_bytes().as_slice());
            };
            v.chunks_exact_mut(4).for_each(swap);
        }
        8 => {
            let swap = |chunk: &mut [u8]| {
                let bytes = u64::from_ne_bytes(chunk.try_into().unwrap());
                chunk.copy_from_slice(bytes.swap_bytes().to_ne_bytes().as_slice());
            };
            v.chunks_exact_mut(8).for_each(swap);
        }
        _ => {}
    }
}

/// An intermediate scalar value for element-wise casts.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Complex(f64, f64),
}

#[allow(clippy::cast_possible_truncation)]
impl Scalar {
    fn read(element_type: &ElementType, bytes: &[u8], endianness: Endianness) -> Self {
        use ElementKind as K;
        match (element_type.kind(), element_type.size()) {
            (K::Bool, _) => Self::Bool(bool::read(bytes, endianness)),
            (K::Int, 1) => Self::Int(i64::from(i8::read(bytes, endianness))),
            (K::Int, 2) => Self::Int(i64::from(i16::read(bytes, endianness))),
            (K::Int, 4) => Self::Int(i64::from(i32::read(bytes, endianness))),
            (K::Int, _) => Self::Int(i64::read(bytes, endianness)),
            (K::UInt, 1) => Self::UInt(u64::from(u8::read(bytes, endianness))),
            (K::UInt, 2) => Self::UInt(u64::from(u16::read(bytes, endianness))),
            (K::UInt, 4) => Self::UInt(u64::from(u32::read(bytes, endianness))),
            (K::UInt, _) => Self::UInt(u64::read(bytes, endianness)),
            (K::Float, 2) => Self::Float(f16::read(bytes, endianness).to_f64()),
            (K::Float, 4) => Self::Float(f64::from(f32::read(bytes, endianness))),
            (K::Float, _) => Self::Float(f64::read(bytes, endianness)),
            (K::Complex, 8) => {
                let value = Complex32::read(bytes, endianness);
                Self::Complex(f64::from(value.re), f64::from(value.im))
            }
            (K::Complex, _) => {
                let value = Complex64::read(bytes, endianness);
                Self::Complex(value.re, value.im)
            }
            (K::RawBits, _) => unreachable!("raw bits are never cast"),
        }
    }

    fn write(self, element_type: &ElementType, bytes: &mut [u8], endianness: Endianness) {
        use ElementKind as K;
        match (element_type.kind(), element_type.size()) {
            (K::Bool, _) => self.as_bool().write(bytes, endianness),
            (K::Int, 1) => self.cast::<i8>().write(bytes, endianness),
            (K::Int, 2) => self.cast::<i16>().write(bytes, endianness),
            (K::Int, 4) => self.cast::<i32>().write(bytes, endianness),
            (K::Int, _) => self.cast::<i64>().write(bytes, endianness),
            (K::UInt, 1) => self.cast::<u8>().write(bytes, endianness),
            (K::UInt, 2) => self.cast::<u16>().write(bytes, endianness),
            (K::UInt, 4) => self.cast::<u32>().write(bytes, endianness),
            (K::UInt, _) => self.cast::<u64>().write(bytes, endianness),
            (K::Float, 2) => f16::from_f64(self.cast::<f64>()).write(bytes, endianness),
            (K::Float, 4) => self.cast::<f32>().write(bytes, endianness),
            (K::Float, _) => self.cast::<f64>().write(bytes, endianness),
            (K::Complex, 8) => {
                let (re, im) = self.as_complex();
                Complex32::new(re as f32, im as f32).write(bytes, endianness);
            }
            (K::Complex, _) => {
                let (re, im) = self.as_complex();
                Complex64::new(re, im).write(bytes, endianness);
            }
            (K::RawBits, _) => unreachable!("raw bits are never cast"),
        }
    }

    fn as_bool(self) -> bool {
        match self {
            Self::Bool(v) => v,
            Self::Int(v) => v != 0,
            Self::UInt(v) => v != 0,
            Self::Float(v) => v != 0.0,
            Self::Complex(re, im) => re != 0.0 || im != 0.0,
        }
    }

    /// Cast to `T` with `as` semantics, discarding any imaginary component.
    fn cast<T>(self) -> T
    where
        T: Copy + 'static,
        i64: AsPrimitive<T>,
        u64: AsPrimitive<T>,
        f64: AsPrimitive<T>,
    {
        match self {
            Self::Bool(v) => u64::from(v).as_(),
            Self::Int(v) => v.as_(),
            Self::UInt(v) => v.as_(),
            Self::Float(v) | Self::Complex(v, _) => v.as_(),
        }
    }

    fn as_complex(self) -> (f64, f64) {
        match self {
            Self::Complex(re, im) => (re, im),
            other => (other.cast::<f64>(), 0.0),
        }
    }
}
