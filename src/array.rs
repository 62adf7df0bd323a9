//! Typed arrays and array views.
//!
//! A [`TypedArray`] owns the bytes of a multidimensional array with shape `[groups, dims..]`, where `dims` is the grouping applied on top of the flat element stream and `groups` is the length of the leading axis.
//! An [`ArrayView`] is the read-only borrowed counterpart, typically produced by reinterpreting a chunk of raw bytes.
//!
//! Bytes are stored in the byte order of the array [`ElementType`], which need not be the native byte order.
//! Use [`TypedArray::to_elements`] or [`TypedArray::to_ndarray`] to decode elements into Rust values.

mod convert;

pub use convert::convert_elements;

use std::ops::Range;

use itertools::Itertools;
use thiserror::Error;

use crate::{
    config::global_config,
    element::Element,
    element_type::{ElementType, NATIVE_ENDIAN},
};

/// The dimensions of a group of elements.
///
/// An empty `Dims` means each group is a single element.
pub type Dims = Vec<usize>;

/// Returns the number of elements in a group with dimensions `dims`.
///
/// The product of empty dimensions is 1.
#[must_use]
pub fn dims_product(dims: &[usize]) -> usize {
    dims.iter().product()
}

/// Format dimensions as a tuple, e.g. `(3, 4)`.
pub(crate) fn format_dims(dims: &[usize]) -> String {
    format!("({})", dims.iter().join(", "))
}

/// An out of bounds range error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("range {start}..{stop} is out of bounds for length {len}")]
pub struct RangeOutOfBoundsError {
    start: usize,
    stop: usize,
    len: usize,
}

impl RangeOutOfBoundsError {
    /// Create a new out of bounds range error.
    #[must_use]
    pub const fn new(start: usize, stop: usize, len: usize) -> Self {
        Self { start, stop, len }
    }
}

/// Resolve the range `start..stop` over a sequence of length `len`.
///
/// If `strict`, a reversed range or a range extending beyond `len` is an error.
/// Otherwise the range is clamped to `0..len` like sequence slicing.
///
/// # Errors
/// Returns [`RangeOutOfBoundsError`] if `strict` and the range is invalid.
pub(crate) fn resolve_range(
    start: usize,
    stop: usize,
    len: usize,
    strict: bool,
) -> Result<Range<usize>, RangeOutOfBoundsError> {
    if start <= stop && stop <= len {
        Ok(start..stop)
    } else if strict {
        Err(RangeOutOfBoundsError::new(start, stop, len))
    } else {
        tracing::warn!(start, stop, len, "clamping an out of bounds range");
        let stop = stop.min(len);
        Ok(start.min(stop)..stop)
    }
}

/// Array errors.
#[derive(Debug, Error)]
pub enum ArrayError {
    /// The number of bytes is not a whole number of elements.
    #[error("got {_0} bytes, which is not a multiple of the element size {_1}")]
    NotWholeElements(usize, usize),
    /// The number of bytes does not match the shape.
    #[error("got {_0} bytes, expected {_1}")]
    InvalidBytesLength(usize, usize),
    /// The number of elements is not a whole number of groups.
    #[error("cannot reshape {_0} elements into groups of {_1}")]
    NotWholeGroups(usize, usize),
    /// Dimensions must be positive.
    #[error("dimensions {} must be positive", format_dims(.0))]
    ZeroDimension(Dims),
    /// The element type cannot be converted.
    #[error("cannot convert elements of type {_0} to {_1}")]
    IncompatibleConversion(ElementType, ElementType),
    /// The number of source and destination elements differ.
    #[error("got {_0} source elements for {_1} destination elements")]
    ElementCountMismatch(usize, usize),
    /// The array element type does not hold the requested Rust element type.
    #[error("element type {_0} does not hold {_1}")]
    IncompatibleElementType(ElementType, &'static str),
    /// An out of bounds range.
    #[error(transparent)]
    RangeOutOfBounds(#[from] RangeOutOfBoundsError),
    /// An ndarray shape error.
    #[cfg(feature = "ndarray")]
    #[error(transparent)]
    ShapeError(#[from] ndarray::ShapeError),
}

/// Check that all of `dims` are positive.
///
/// # Errors
/// Returns [`ArrayError::ZeroDimension`] if any of `dims` are zero.
pub fn validate_dims(dims: &[usize]) -> Result<(), ArrayError> {
    if dims.contains(&0) {
        Err(ArrayError::ZeroDimension(dims.to_vec()))
    } else {
        Ok(())
    }
}

fn array_shape(num_groups: usize, dims: &[usize]) -> Dims {
    std::iter::once(num_groups)
        .chain(dims.iter().copied())
        .collect()
}

fn decode_elements<T: Element>(
    element_type: &ElementType,
    bytes: &[u8],
) -> Result<Vec<T>, ArrayError> {
    if !T::matches(element_type) {
        return Err(ArrayError::IncompatibleElementType(
            *element_type,
            std::any::type_name::<T>(),
        ));
    }
    let endianness = element_type.endianness().unwrap_or(NATIVE_ENDIAN);
    Ok(bytes
        .chunks_exact(T::SIZE)
        .map(|bytes| T::read(bytes, endianness))
        .collect())
}

/// An owned, element typed, multidimensional array.
///
/// The shape of the array is `[groups, dims..]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedArray {
    element_type: ElementType,
    shape: Dims,
    bytes: Vec<u8>,
}

impl TypedArray {
    /// Create a new zero initialised array with `num_groups` groups of `dims` elements.
    ///
    /// # Errors
    /// Returns [`ArrayError::ZeroDimension`] if any of `dims` are zero.
    pub fn new(
        element_type: ElementType,
        num_groups: usize,
        dims: &[usize],
    ) -> Result<Self, ArrayError> {
        validate_dims(dims)?;
        let size = num_groups * dims_product(dims) * element_type.size();
        Ok(Self {
            element_type,
            shape: array_shape(num_groups, dims),
            bytes: vec![0; size],
        })
    }

    /// Create an array from `bytes` encoded with `element_type`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if any of `dims` are zero or the length of `bytes` does not match the shape.
    pub fn from_bytes(
        element_type: ElementType,
        num_groups: usize,
        dims: &[usize],
        bytes: Vec<u8>,
    ) -> Result<Self, ArrayError> {
        validate_dims(dims)?;
        let expected = num_groups * dims_product(dims) * element_type.size();
        if bytes.len() != expected {
            return Err(ArrayError::InvalidBytesLength(bytes.len(), expected));
        }
        Ok(Self {
            element_type,
            shape: array_shape(num_groups, dims),
            bytes,
        })
    }

    /// Create a native byte order array from `elements`, grouped by `dims`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if any of `dims` are zero or the number of elements is not a multiple of the product of `dims`.
    pub fn from_elements<T: Element>(elements: &[T], dims: &[usize]) -> Result<Self, ArrayError> {
        validate_dims(dims)?;
        let group_size = dims_product(dims);
        if elements.len() % group_size != 0 {
            return Err(ArrayError::NotWholeGroups(elements.len(), group_size));
        }
        Ok(Self {
            element_type: ElementType::native::<T>(),
            shape: array_shape(elements.len() / group_size, dims),
            bytes: bytemuck::cast_slice::<T, u8>(elements).to_vec(),
        })
    }

    /// Returns the element type.
    #[must_use]
    pub const fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    /// Returns the shape `[groups, dims..]`.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of groups, the length of the leading axis.
    #[must_use]
    pub fn num_groups(&self) -> usize {
        self.shape[0]
    }

    /// Returns the dimensions of each group, all dimensions after the first.
    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.shape[1..]
    }

    /// Returns the number of elements in each group.
    #[must_use]
    pub fn group_size(&self) -> usize {
        dims_product(self.dims())
    }

    /// Returns the total number of elements.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        dims_product(&self.shape)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the underlying bytes mutably.
    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Convert into the underlying bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Returns a read-only view of the array.
    #[must_use]
    pub fn view(&self) -> ArrayView<'_> {
        ArrayView {
            element_type: self.element_type,
            shape: self.shape.clone(),
            bytes: &self.bytes,
        }
    }

    /// Retain only the groups `start..stop` along the leading axis.
    ///
    /// # Errors
    /// Returns [`ArrayError::RangeOutOfBounds`] if the range exceeds the number of groups and [strict ranges](crate::config::Config#strict-ranges) are enabled.
    pub fn slice_groups(mut self, start: usize, stop: usize) -> Result<Self, ArrayError> {
        let range = resolve_range(
            start,
            stop,
            self.num_groups(),
            global_config().strict_ranges(),
        )?;
        let group_bytes = self.group_size() * self.element_type.size();
        self.bytes.truncate(range.end * group_bytes);
        self.bytes.drain(..range.start * group_bytes);
        self.shape[0] = range.len();
        Ok(self)
    }

    /// Decode the elements of the array into a [`Vec`] in lexicographical order.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if the array element type does not hold `T`.
    pub fn to_elements<T: Element>(&self) -> Result<Vec<T>, ArrayError> {
        decode_elements(&self.element_type, &self.bytes)
    }

    #[cfg(feature = "ndarray")]
    /// Decode the array into an [`ndarray::ArrayD`].
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the array element type does not hold `T`.
    pub fn to_ndarray<T: Element>(&self) -> Result<ndarray::ArrayD<T>, ArrayError> {
        self.view().to_ndarray()
    }
}

/// A read-only view of an element typed, multidimensional array.
///
/// The shape of the view is `[groups, dims..]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayView<'a> {
    element_type: ElementType,
    shape: Dims,
    bytes: &'a [u8],
}

impl<'a> ArrayView<'a> {
    /// Reinterpret `bytes` as a flat run of elements of `element_type`.
    ///
    /// # Errors
    /// Returns [`ArrayError::NotWholeElements`] if the length of `bytes` is not a multiple of the element size.
    pub fn new_flat(element_type: ElementType, bytes: &'a [u8]) -> Result<Self, ArrayError> {
        if bytes.len() % element_type.size() != 0 {
            return Err(ArrayError::NotWholeElements(
                bytes.len(),
                element_type.size(),
            ));
        }
        Ok(Self {
            element_type,
            shape: vec![bytes.len() / element_type.size()],
            bytes,
        })
    }

    /// Create a view of `bytes` with `num_groups` groups of `dims` elements.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if any of `dims` are zero or the length of `bytes` does not match the shape.
    pub fn from_bytes(
        element_type: ElementType,
        num_groups: usize,
        dims: &[usize],
        bytes: &'a [u8],
    ) -> Result<Self, ArrayError> {
        validate_dims(dims)?;
        let expected = num_groups * dims_product(dims) * element_type.size();
        if bytes.len() != expected {
            return Err(ArrayError::InvalidBytesLength(bytes.len(), expected));
        }
        Ok(Self {
            element_type,
            shape: array_shape(num_groups, dims),
            bytes,
        })
    }

    /// Regroup the elements of the view into groups of `dims` elements.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if any of `dims` are zero or the number of elements is not a multiple of the product of `dims`.
    pub fn regroup(self, dims: &[usize]) -> Result<Self, ArrayError> {
        validate_dims(dims)?;
        let num_elements = self.num_elements();
        let group_size = dims_product(dims);
        if num_elements % group_size != 0 {
            return Err(ArrayError::NotWholeGroups(num_elements, group_size));
        }
        Ok(Self {
            shape: array_shape(num_elements / group_size, dims),
            ..self
        })
    }

    /// Returns the element type.
    #[must_use]
    pub const fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    /// Returns the shape `[groups, dims..]`.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of groups, the length of the leading axis.
    #[must_use]
    pub fn num_groups(&self) -> usize {
        self.shape[0]
    }

    /// Returns the dimensions of each group, all dimensions after the first.
    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.shape[1..]
    }

    /// Returns the number of elements in each group.
    #[must_use]
    pub fn group_size(&self) -> usize {
        dims_product(self.dims())
    }

    /// Returns the total number of elements.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        dims_product(&self.shape)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns a view of the groups `start..stop` along the leading axis.
    ///
    /// # Errors
    /// Returns [`ArrayError::RangeOutOfBounds`] if the range exceeds the number of groups and [strict ranges](crate::config::Config#strict-ranges) are enabled.
    pub fn slice_groups(&self, start: usize, stop: usize) -> Result<Self, ArrayError> {
        let range = resolve_range(
            start,
            stop,
            self.num_groups(),
            global_config().strict_ranges(),
        )?;
        Ok(self.slice_groups_in_bounds(range))
    }

    /// Returns a view of the groups in `range`, which must be within the number of groups.
    pub(crate) fn slice_groups_in_bounds(&self, range: Range<usize>) -> Self {
        debug_assert!(range.start <= range.end && range.end <= self.num_groups());
        let group_bytes = self.group_size() * self.element_type.size();
        Self {
            element_type: self.element_type,
            shape: array_shape(range.len(), self.dims()),
            bytes: &self.bytes[range.start * group_bytes..range.end * group_bytes],
        }
    }

    /// Copy the view into a [`TypedArray`].
    #[must_use]
    pub fn to_owned_array(&self) -> TypedArray {
        TypedArray {
            element_type: self.element_type,
            shape: self.shape.clone(),
            bytes: self.bytes.to_vec(),
        }
    }

    /// Decode the elements of the view into a [`Vec`] in lexicographical order.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if the view element type does not hold `T`.
    pub fn to_elements<T: Element>(&self) -> Result<Vec<T>, ArrayError> {
        decode_elements(&self.element_type, self.bytes)
    }

    #[cfg(feature = "ndarray")]
    /// Decode the view into an [`ndarray::ArrayD`].
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the view element type does not hold `T`.
    pub fn to_ndarray<T: Element>(&self) -> Result<ndarray::ArrayD<T>, ArrayError> {
        let elements = self.to_elements::<T>()?;
        Ok(ndarray::ArrayD::from_shape_vec(
            ndarray::IxDyn(&self.shape),
            elements,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_product_empty() {
        assert_eq!(dims_product(&[]), 1);
        assert_eq!(dims_product(&[3, 4]), 12);
        assert_eq!(format_dims(&[3, 4]), "(3, 4)");
        assert_eq!(format_dims(&[]), "()");
    }

    #[test]
    fn resolve_range_strict_and_clamped() {
        assert_eq!(resolve_range(1, 3, 4, true), Ok(1..3));
        assert_eq!(
            resolve_range(1, 5, 4, true),
            Err(RangeOutOfBoundsError::new(1, 5, 4))
        );
        assert!(resolve_range(3, 1, 4, true).is_err());
        assert_eq!(resolve_range(1, 5, 4, false), Ok(1..4));
        assert_eq!(resolve_range(6, 9, 4, false), Ok(4..4));
        assert_eq!(resolve_range(3, 1, 4, false), Ok(1..1));
    }

    #[test]
    fn typed_array_shape() {
        let array = TypedArray::new(ElementType::native::<f32>(), 5, &[3, 4]).unwrap();
        assert_eq!(array.shape(), &[5, 3, 4]);
        assert_eq!(array.dims(), &[3, 4]);
        assert_eq!(array.num_groups(), 5);
        assert_eq!(array.group_size(), 12);
        assert_eq!(array.num_elements(), 60);
        assert_eq!(array.as_bytes().len(), 240);
        assert!(matches!(
            TypedArray::new(ElementType::native::<f32>(), 5, &[3, 0]),
            Err(ArrayError::ZeroDimension(_))
        ));
    }

    #[test]
    fn typed_array_from_elements() {
        let array = TypedArray::from_elements(&[1u16, 2, 3, 4, 5, 6], &[3]).unwrap();
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array.to_elements::<u16>().unwrap(), vec![1, 2, 3, 4, 5, 6]);
        assert!(matches!(
            array.to_elements::<i16>(),
            Err(ArrayError::IncompatibleElementType(_, _))
        ));
        assert!(matches!(
            TypedArray::from_elements(&[1u16, 2, 3, 4], &[3]),
            Err(ArrayError::NotWholeGroups(4, 3))
        ));
    }

    #[test]
    fn typed_array_non_native_bytes() {
        let element_type = ElementType::parse_source(">u2").unwrap();
        let array = TypedArray::from_bytes(element_type, 2, &[], vec![0, 1, 1, 0]).unwrap();
        assert_eq!(array.to_elements::<u16>().unwrap(), vec![1, 256]);
        assert!(matches!(
            TypedArray::from_bytes(element_type, 3, &[], vec![0, 1, 1, 0]),
            Err(ArrayError::InvalidBytesLength(4, 6))
        ));
    }

    #[test]
    fn typed_array_slice_groups() {
        let array = TypedArray::from_elements(&[0i32, 1, 2, 3, 4, 5, 6, 7], &[2]).unwrap();
        let sliced = array.clone().slice_groups(1, 3).unwrap();
        assert_eq!(sliced.shape(), &[2, 2]);
        assert_eq!(sliced.to_elements::<i32>().unwrap(), vec![2, 3, 4, 5]);
        assert!(array.slice_groups(2, 5).is_err());
    }

    #[test]
    fn array_view_regroup() {
        let bytes: Vec<u8> = (0..12).collect();
        let view = ArrayView::new_flat(ElementType::native::<u8>(), &bytes).unwrap();
        assert_eq!(view.shape(), &[12]);
        let view = view.regroup(&[2, 3]).unwrap();
        assert_eq!(view.shape(), &[2, 2, 3]);
        let sliced = view.slice_groups(1, 2).unwrap();
        assert_eq!(sliced.as_bytes(), &bytes[6..12]);
        assert_eq!(sliced.to_owned_array().shape(), &[1, 2, 3]);
        assert!(matches!(
            view.regroup(&[5]),
            Err(ArrayError::NotWholeGroups(12, 5))
        ));
        assert!(matches!(
            ArrayView::new_flat(ElementType::native::<u32>(), &bytes[..7]),
            Err(ArrayError::NotWholeElements(7, 4))
        ));
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn typed_array_to_ndarray() {
        let array = TypedArray::from_elements(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[3]).unwrap();
        let ndarray = array.to_ndarray::<f64>().unwrap();
        assert_eq!(ndarray.shape(), &[2, 3]);
        assert_eq!(ndarray[[1, 2]], 6.0);
    }
}
