//! Interpretations of chunked raw bytes as typed arrays.
//!
//! An interpretation describes how the raw bytes of a field are read (the *source* element type and dimensions) and how the assembled result is typed and grouped (the *destination* element type and dimensions).
//! There are two interpretations:
//!  - [`TypedView`] allocates a new destination array for each assembly, and
//!  - [`TargetedView`] writes into a caller supplied [`TypedArray`](crate::array::TypedArray), enforcing its capacity.
//!
//! [`View`] wraps either behind one interface.
//!
//! ## Assembly
//! An array covering a range of entries is assembled from chunks of raw bytes as follows:
//!  1. [`Interpretation::num_items`] (or [`Interpretation::source_num_items`]) gives the number of items in each chunk,
//!  2. `allocate_destination` is called once for the total number of items,
//!  3. each chunk is reinterpreted with [`Interpretation::read_chunk`] and copied into the destination with `fill`, in increasing non-overlapping item ranges,
//!  4. `clip_destination` optionally trims the destination to the requested entries, and
//!  5. `finalize` consumes the destination and returns the result.
//!
//! ```rust
//! # use numinterp::interpretation::{Interpretation, TypedView};
//! let view = TypedView::new(">u4", &[])?;
//! let bytes = [0, 0, 0, 1, 0, 0, 0, 2];
//! let num_items = view.num_items(bytes.len());
//! let mut destination = view.allocate_destination(num_items, 2)?;
//! let chunk = view.read_chunk(&bytes, None, 0, 2)?;
//! view.fill(&chunk, &mut destination, 0, num_items, 0, 2)?;
//! let array = view.finalize(destination);
//! assert_eq!(array.to_elements::<u32>()?, vec![1, 2]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod targeted_view;
mod typed_view;
mod view;

pub use targeted_view::{TargetedArray, TargetedDestination, TargetedView};
pub use typed_view::TypedView;
pub use view::{Destination, View, ViewOutput};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    array::{
        convert_elements, dims_product, format_dims, resolve_range, validate_dims, ArrayError,
        ArrayView, Dims, RangeOutOfBoundsError,
    },
    config::global_config,
    element_type::{ElementType, UnsupportedElementTypeError},
};

/// An interpretation error.
#[derive(Debug, Error)]
pub enum InterpretationError {
    /// A run of source elements is not a whole number of source groups.
    #[error("cannot reshape {num_elements} elements as {} (groups of {product})", format_dims(.dims))]
    ShapeMismatch {
        /// The number of elements.
        num_elements: usize,
        /// The source dimensions.
        dims: Dims,
        /// The product of the source dimensions.
        product: usize,
    },
    /// The total number of items is not a whole number of destination groups.
    #[error("cannot reshape {num_items} items as {} (groups of {product})", format_dims(.dims))]
    ReshapeMismatch {
        /// The number of items.
        num_items: usize,
        /// The destination dimensions.
        dims: Dims,
        /// The product of the destination dimensions.
        product: usize,
    },
    /// The caller supplied destination array is too small.
    #[error("cannot put {num_items} items into an array of {capacity} items")]
    CapacityExceeded {
        /// The number of items.
        num_items: usize,
        /// The number of elements in the destination array.
        capacity: usize,
    },
    /// The source element type cannot be converted to the destination element type.
    #[error("cannot convert elements of type {_0} to {_1}")]
    IncompatibleConversion(ElementType, ElementType),
    /// A fill item range does not fit the destination or does not match the source.
    #[error("cannot fill items {item_start}..{item_stop} of a destination with {num_items} items from a source with {num_source_items} items")]
    FillRangeMismatch {
        /// The first item to fill.
        item_start: usize,
        /// The item after the last item to fill.
        item_stop: usize,
        /// The number of items in the source.
        num_source_items: usize,
        /// The number of items in the destination.
        num_items: usize,
    },
    /// An entry or group range is out of bounds.
    #[error(transparent)]
    RangeOutOfBounds(#[from] RangeOutOfBoundsError),
    /// Raw bytes are not a whole number of source elements.
    #[error("got {_0} bytes, which is not a multiple of the element size {_1}")]
    InvalidBytesLength(usize, usize),
    /// The caller supplied destination array is already lent to another assembly.
    #[error("the destination array is already in use by another assembly")]
    DestinationInUse,
    /// An unsupported element type.
    #[error(transparent)]
    UnsupportedElementType(#[from] UnsupportedElementTypeError),
    /// An array error.
    #[error(transparent)]
    Array(#[from] ArrayError),
}

/// The interpretation capabilities shared by [`TypedView`], [`TargetedView`], and [`View`].
pub trait Interpretation {
    /// Returns the element type of the raw source bytes.
    fn source_element_type(&self) -> &ElementType;

    /// Returns the dimensions of each group of source elements.
    fn source_dims(&self) -> &[usize];

    /// Returns the element type of the destination.
    fn dest_element_type(&self) -> &ElementType;

    /// Returns the dimensions of each group of destination elements.
    fn dest_dims(&self) -> &[usize];

    /// Returns true if `other` produces the same destination element type and dimensions.
    ///
    /// Compatible interpretations of a field can share one assembly.
    fn compatible(&self, other: &dyn Interpretation) -> bool {
        self.dest_element_type() == other.dest_element_type()
            && self.dest_dims() == other.dest_dims()
    }

    /// Returns the number of source items in `num_bytes` raw bytes.
    ///
    /// `num_bytes` is expected to be a multiple of the source element size.
    fn num_items(&self, num_bytes: usize) -> usize {
        num_bytes / self.source_element_type().size()
    }

    /// Returns the number of items in a `source` that is already a shaped array, such as the output of another view.
    fn source_num_items(&self, source: &ArrayView) -> usize {
        dims_product(source.shape())
    }

    /// Reinterpret the raw bytes of a chunk as source elements grouped by the source dimensions, and return the groups for the local entries `local_entry_start..local_entry_stop`.
    ///
    /// No bytes are copied.
    /// `offsets` are the global item offsets of a chunk of variable length entries and are unused for fixed size elements.
    ///
    /// # Errors
    /// Returns an [`InterpretationError`] if
    ///  - the length of `data` is not a multiple of the source element size,
    ///  - the number of elements is not a multiple of the product of the source dimensions ([`InterpretationError::ShapeMismatch`]), or
    ///  - the entry range is out of bounds and [strict ranges](crate::config::Config#strict-ranges) are enabled.
    fn read_chunk<'a>(
        &self,
        data: &'a [u8],
        offsets: Option<&[usize]>,
        local_entry_start: usize,
        local_entry_stop: usize,
    ) -> Result<ArrayView<'a>, InterpretationError> {
        let _ = offsets;
        read_chunk(
            self.source_element_type(),
            self.source_dims(),
            data,
            local_entry_start,
            local_entry_stop,
        )
    }
}

fn read_chunk<'a>(
    element_type: &ElementType,
    dims: &[usize],
    data: &'a [u8],
    local_entry_start: usize,
    local_entry_stop: usize,
) -> Result<ArrayView<'a>, InterpretationError> {
    validate_dims(dims)?;
    let flat = ArrayView::new_flat(*element_type, data)
        .map_err(|_| InterpretationError::InvalidBytesLength(data.len(), element_type.size()))?;
    let num_elements = flat.num_elements();
    let product = dims_product(dims);
    if num_elements % product != 0 {
        return Err(InterpretationError::ShapeMismatch {
            num_elements,
            dims: dims.to_vec(),
            product,
        });
    }
    let grouped = flat.regroup(dims)?;
    let range = resolve_range(
        local_entry_start,
        local_entry_stop,
        grouped.num_groups(),
        global_config().strict_ranges(),
    )?;
    Ok(grouped.slice_groups_in_bounds(range))
}

/// Returns the number of destination groups holding `num_items` items.
fn destination_groups(num_items: usize, dims: &[usize]) -> Result<usize, InterpretationError> {
    validate_dims(dims)?;
    let product = dims_product(dims);
    if num_items % product == 0 {
        Ok(num_items / product)
    } else {
        Err(InterpretationError::ReshapeMismatch {
            num_items,
            dims: dims.to_vec(),
            product,
        })
    }
}

/// Convert all items of `source` into the flattened destination items `item_start..item_stop`.
fn fill_items(
    source: &ArrayView,
    dest_element_type: &ElementType,
    dest_bytes: &mut [u8],
    item_start: usize,
    item_stop: usize,
) -> Result<(), InterpretationError> {
    let source_element_type = source.element_type();
    if !source_element_type.can_convert_to(dest_element_type) {
        return Err(InterpretationError::IncompatibleConversion(
            *source_element_type,
            *dest_element_type,
        ));
    }
    let num_items = dest_bytes.len() / dest_element_type.size();
    let num_source_items = source.num_elements();
    if item_start > item_stop || item_stop > num_items || item_stop - item_start != num_source_items
    {
        return Err(InterpretationError::FillRangeMismatch {
            item_start,
            item_stop,
            num_source_items,
            num_items,
        });
    }
    tracing::trace!(item_start, item_stop, "fill");
    let size = dest_element_type.size();
    convert_elements(
        source_element_type,
        source.as_bytes(),
        dest_element_type,
        &mut dest_bytes[item_start * size..item_stop * size],
    )?;
    Ok(())
}

fn validate_conversion(
    source: &ElementType,
    dest: &ElementType,
) -> Result<(), InterpretationError> {
    if source.can_convert_to(dest) {
        Ok(())
    } else {
        Err(InterpretationError::IncompatibleConversion(*source, *dest))
    }
}

/// A serialisable description of a [`TypedView`].
///
/// Element types are string tags: a source tag without an order sigil is big endian and a destination tag without an order sigil is native.
/// The destination element type and dimensions default to those of the source if absent.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct InterpretationMetadata {
    /// The source element type tag.
    pub source_type: String,
    /// The destination element type tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_type: Option<String>,
    /// The source dimensions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_dims: Dims,
    /// The destination dimensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_dims: Option<Dims>,
}

impl InterpretationMetadata {
    /// Create interpretation metadata for a `source_type` tag with default destination and no source dimensions.
    #[must_use]
    pub fn new(source_type: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            dest_type: None,
            source_dims: Vec::new(),
            dest_dims: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::element_type::ElementType;

    use super::*;

    #[test]
    fn read_chunk_flat() {
        let element_type = ElementType::parse_source(">u2").unwrap();
        let data = [0, 1, 0, 2, 0, 3, 0, 4];
        let chunk = read_chunk(&element_type, &[], &data, 1, 3).unwrap();
        assert_eq!(chunk.shape(), &[2]);
        assert_eq!(chunk.as_bytes(), &data[2..6]);
        assert_eq!(chunk.to_elements::<u16>().unwrap(), vec![2, 3]);
    }

    #[test]
    fn read_chunk_grouped() {
        let element_type = ElementType::parse_source("u1").unwrap();
        let data: Vec<u8> = (0..12).collect();
        let chunk = read_chunk(&element_type, &[2, 2], &data, 1, 3).unwrap();
        assert_eq!(chunk.shape(), &[2, 2, 2]);
        assert_eq!(chunk.as_bytes(), &data[4..12]);
    }

    #[test]
    fn read_chunk_shape_mismatch() {
        let element_type = ElementType::parse_source("u1").unwrap();
        let data: Vec<u8> = (0..10).collect();
        let err = read_chunk(&element_type, &[3], &data, 0, 1).unwrap_err();
        assert!(matches!(
            err,
            InterpretationError::ShapeMismatch {
                num_elements: 10,
                product: 3,
                ..
            }
        ));
        assert_eq!(err.to_string(), "cannot reshape 10 elements as (3) (groups of 3)");
    }

    #[test]
    fn read_chunk_invalid_bytes_length() {
        let element_type = ElementType::parse_source("i4").unwrap();
        assert!(matches!(
            read_chunk(&element_type, &[], &[0; 6], 0, 1),
            Err(InterpretationError::InvalidBytesLength(6, 4))
        ));
    }

    #[test]
    fn read_chunk_out_of_bounds() {
        let element_type = ElementType::parse_source("i4").unwrap();
        assert!(matches!(
            read_chunk(&element_type, &[], &[0; 8], 1, 3),
            Err(InterpretationError::RangeOutOfBounds(_))
        ));
    }

    #[test]
    fn destination_groups_reshape() {
        assert_eq!(destination_groups(24, &[3, 4]).unwrap(), 2);
        assert_eq!(destination_groups(7, &[]).unwrap(), 7);
        let err = destination_groups(25, &[3, 4]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot reshape 25 items as (3, 4) (groups of 12)"
        );
    }

    #[test]
    fn fill_items_range_checks() {
        let source_type = ElementType::parse_source(">i2").unwrap();
        let data = [0, 1, 0, 2];
        let source = ArrayView::new_flat(source_type, &data).unwrap();
        let dest_type = ElementType::native::<i16>();
        let mut dest = vec![0u8; 8];
        fill_items(&source, &dest_type, &mut dest, 1, 3).unwrap();
        assert_eq!(
            dest,
            [0i16, 1, 2, 0]
                .iter()
                .flat_map(|v| v.to_ne_bytes())
                .collect::<Vec<u8>>()
        );
        for (start, stop) in [(0, 1), (3, 5), (3, 1)] {
            assert!(matches!(
                fill_items(&source, &dest_type, &mut dest, start, stop),
                Err(InterpretationError::FillRangeMismatch { .. })
            ));
        }
    }

    #[test]
    fn interpretation_metadata_serde() {
        let json = r#"{"source_type":"f4","source_dims":[3]}"#;
        let metadata: InterpretationMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.source_type, "f4");
        assert_eq!(metadata.dest_type, None);
        assert_eq!(metadata.source_dims, vec![3]);
        assert_eq!(metadata.dest_dims, None);
        assert_eq!(metadata.to_string(), json);
        assert!(serde_json::from_str::<InterpretationMetadata>(
            r#"{"source_type":"f4","unknown":1}"#
        )
        .is_err());
    }
}
