use crate::{
    array::{format_dims, resolve_range, validate_dims, ArrayView, Dims, TypedArray},
    config::global_config,
    element_type::{ElementType, ElementTypeSpec},
};

use super::{
    destination_groups, fill_items, validate_conversion, Interpretation, InterpretationError,
    InterpretationMetadata, TargetedView,
};

/// An interpretation of raw bytes as a source element type and dimensions, converted to a destination element type and dimensions in a newly allocated [`TypedArray`].
///
/// The destination element type defaults to the source element type in the native byte order, and the destination dimensions default to the source dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedView {
    source_type: ElementType,
    dest_type: ElementType,
    source_dims: Dims,
    dest_dims: Dims,
}

impl TypedView {
    /// Create a new typed view with a default destination.
    ///
    /// A `source_type` tag without an order sigil is big endian.
    ///
    /// # Errors
    /// Returns an [`InterpretationError`] if the element type is not supported or any of `source_dims` are zero.
    pub fn new<'a>(
        source_type: impl Into<ElementTypeSpec<'a>>,
        source_dims: &[usize],
    ) -> Result<Self, InterpretationError> {
        Self::new_with_destination(source_type, None, source_dims, None)
    }

    /// Create a new typed view with an optional destination element type and dimensions.
    ///
    /// A `source_type` tag without an order sigil is big endian, and a `dest_type` tag without an order sigil is native.
    ///
    /// # Errors
    /// Returns an [`InterpretationError`] if
    ///  - an element type is not supported,
    ///  - any dimensions are zero, or
    ///  - the source element type cannot be converted to the destination element type.
    pub fn new_with_destination<'a>(
        source_type: impl Into<ElementTypeSpec<'a>>,
        dest_type: Option<ElementTypeSpec<'_>>,
        source_dims: &[usize],
        dest_dims: Option<&[usize]>,
    ) -> Result<Self, InterpretationError> {
        let source_type = source_type.into().resolve_source()?;
        let dest_type = match dest_type {
            Some(dest_type) => dest_type.resolve_destination()?,
            None => source_type.to_native(),
        };
        let dest_dims = dest_dims.unwrap_or(source_dims);
        validate_dims(source_dims)?;
        validate_dims(dest_dims)?;
        validate_conversion(&source_type, &dest_type)?;
        Ok(Self {
            source_type,
            dest_type,
            source_dims: source_dims.to_vec(),
            dest_dims: dest_dims.to_vec(),
        })
    }

    /// Create a new typed view from [`InterpretationMetadata`].
    ///
    /// # Errors
    /// Returns an [`InterpretationError`] if the metadata is invalid.
    pub fn new_with_metadata(metadata: &InterpretationMetadata) -> Result<Self, InterpretationError> {
        Self::new_with_destination(
            metadata.source_type.as_str(),
            metadata.dest_type.as_deref().map(ElementTypeSpec::from),
            &metadata.source_dims,
            metadata.dest_dims.as_deref(),
        )
    }

    /// Returns the [`InterpretationMetadata`] of the view.
    ///
    /// The destination is omitted where it matches the default.
    #[must_use]
    pub fn metadata(&self) -> InterpretationMetadata {
        InterpretationMetadata {
            source_type: self.source_type.to_string(),
            dest_type: self
                .has_custom_dest_type()
                .then(|| self.dest_type.to_string()),
            source_dims: self.source_dims.clone(),
            dest_dims: (self.dest_dims != self.source_dims).then(|| self.dest_dims.clone()),
        }
    }

    fn has_custom_dest_type(&self) -> bool {
        self.dest_type != self.source_type.to_native()
    }

    /// Return a new view with the same source and a new destination element type and dimensions.
    ///
    /// A [`None`] destination element type or dimensions resets to the default.
    ///
    /// # Errors
    /// Returns an [`InterpretationError`] if the destination is invalid or the source element type cannot be converted to it.
    pub fn retype(
        &self,
        dest_type: Option<ElementTypeSpec<'_>>,
        dest_dims: Option<&[usize]>,
    ) -> Result<Self, InterpretationError> {
        Self::new_with_destination(self.source_type, dest_type, &self.source_dims, dest_dims)
    }

    /// Return a [`TargetedView`] with the same source that writes into `target`.
    ///
    /// # Errors
    /// Returns [`InterpretationError::IncompatibleConversion`] if the source element type cannot be converted to the element type of `target`.
    pub fn to_targeted<'b>(
        &self,
        target: &'b mut TypedArray,
    ) -> Result<TargetedView<'b>, InterpretationError> {
        TargetedView::new(self.source_type, target, &self.source_dims)
    }

    /// Allocate a destination array for `num_items` items.
    ///
    /// The destination has shape `[num_items / product(dest_dims), dest_dims..]`.
    /// `num_entries` is unused for fixed size elements.
    ///
    /// # Errors
    /// Returns [`InterpretationError::ReshapeMismatch`] if `num_items` is not a multiple of the product of the destination dimensions.
    pub fn allocate_destination(
        &self,
        num_items: usize,
        num_entries: usize,
    ) -> Result<TypedArray, InterpretationError> {
        let num_groups = destination_groups(num_items, &self.dest_dims)?;
        tracing::debug!(
            num_items,
            num_entries,
            num_groups,
            dest_type = %self.dest_type,
            "allocating destination"
        );
        Ok(TypedArray::new(self.dest_type, num_groups, &self.dest_dims)?)
    }

    /// Convert all items of `source` into the flattened `destination` items `item_start..item_stop`.
    ///
    /// `skip_entries` and `num_entries` are unused for fixed size elements.
    /// Fills of one assembly are expected in increasing non-overlapping item ranges; overlapping fills overwrite earlier items.
    ///
    /// # Errors
    /// Returns an [`InterpretationError`] if the item range does not fit `destination` or does not match the number of items in `source`, or the elements cannot be converted.
    pub fn fill(
        &self,
        source: &ArrayView,
        destination: &mut TypedArray,
        item_start: usize,
        item_stop: usize,
        skip_entries: usize,
        num_entries: usize,
    ) -> Result<(), InterpretationError> {
        let _ = (skip_entries, num_entries);
        fill_array(source, destination, item_start, item_stop)
    }

    /// Clip `destination` to the groups `start..stop` along its leading axis.
    ///
    /// # Errors
    /// Returns [`InterpretationError::RangeOutOfBounds`] if the range exceeds the number of groups and [strict ranges](crate::config::Config#strict-ranges) are enabled.
    pub fn clip_destination(
        &self,
        destination: TypedArray,
        start: usize,
        stop: usize,
    ) -> Result<TypedArray, InterpretationError> {
        clip_array(destination, start, stop)
    }

    /// Finalize an assembly, returning `destination` unchanged.
    #[must_use]
    pub fn finalize(&self, destination: TypedArray) -> TypedArray {
        finalize_array(destination)
    }
}

pub(super) fn fill_array(
    source: &ArrayView,
    destination: &mut TypedArray,
    item_start: usize,
    item_stop: usize,
) -> Result<(), InterpretationError> {
    let dest_type = *destination.element_type();
    fill_items(
        source,
        &dest_type,
        destination.as_bytes_mut(),
        item_start,
        item_stop,
    )
}

pub(super) fn clip_array(
    destination: TypedArray,
    start: usize,
    stop: usize,
) -> Result<TypedArray, InterpretationError> {
    let range = resolve_range(
        start,
        stop,
        destination.num_groups(),
        global_config().strict_ranges(),
    )?;
    Ok(destination.slice_groups(range.start, range.end)?)
}

pub(super) fn finalize_array(destination: TypedArray) -> TypedArray {
    tracing::debug!(shape = ?destination.shape(), "finalized destination");
    destination
}

impl Interpretation for TypedView {
    fn source_element_type(&self) -> &ElementType {
        &self.source_type
    }

    fn source_dims(&self) -> &[usize] {
        &self.source_dims
    }

    fn dest_element_type(&self) -> &ElementType {
        &self.dest_type
    }

    fn dest_dims(&self) -> &[usize] {
        &self.dest_dims
    }
}

impl std::fmt::Display for TypedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut args = vec![format!("{:?}", self.source_type.to_string())];
        if self.has_custom_dest_type() {
            args.push(format!("{:?}", self.dest_type.to_string()));
        }
        if !self.source_dims.is_empty() {
            args.push(format_dims(&self.source_dims));
        }
        if self.dest_dims != self.source_dims {
            args.push(format_dims(&self.dest_dims));
        }
        write!(f, "TypedView({})", args.join(", "))
    }
}
